use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Stdio};

use log::debug;
use nix::unistd::{fork, ForkResult};

use super::builtins::{self, Builtin};
use super::error::{ShellError, ShellResult};
use super::parser::ast::Segment;

/// 启动一个命令段的两种结局：前台跑完拿到状态码，或后台立即返回子进程 pid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    Finished(i32),
    Spawned(i32),
}

/// 外部程序：前台时阻塞等待并返回归一化的退出状态，后台时立即返回 pid。
/// spawn 失败只折算成状态码上报，不影响会话继续。
pub fn run_external(segment: &Segment, foreground: bool) -> ShellResult<Launched> {
    let mut command = Command::new(&segment.argv[0]);
    command
        .args(&segment.argv[1..])
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    if foreground {
        debug!("前台执行外部命令: {:?}", segment.argv);
        let status = command.status().map_err(ShellError::Spawn)?;
        Ok(Launched::Finished(normalize_status(status)))
    } else {
        let child = command.spawn().map_err(ShellError::Spawn)?;
        debug!("后台执行外部命令: {:?} pid={}", segment.argv, child.id());
        Ok(Launched::Spawned(child.id() as i32))
    }
}

/// 后台内建命令在 fork 出的子进程里执行 handler，shell 主循环从不等它。
/// 已知副作用：`cd &` 只改子进程的工作目录，对 shell 会话不可见。
pub fn run_builtin_background(builtin: Builtin, segment: &Segment) -> ShellResult<Launched> {
    // fork 安全性：子进程只调用 handler 并立即退出，不回到主循环
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!("后台执行内建命令: {:?} pid={}", segment.argv, child);
            Ok(Launched::Spawned(child.as_raw()))
        }
        Ok(ForkResult::Child) => {
            let status = match builtins::run(builtin, &segment.argv) {
                Ok(status) => status,
                Err(err) => {
                    eprintln!("{}", err);
                    err.status()
                }
            };
            std::process::exit(status);
        }
        Err(errno) => Err(ShellError::Spawn(io::Error::from_raw_os_error(
            errno as i32,
        ))),
    }
}

/// 信号终止时子进程的退出状态在本模型里未定义，按 128+signo 归一化
fn normalize_status(status: ExitStatus) -> i32 {
    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}
