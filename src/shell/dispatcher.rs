use log::debug;

use super::builtins::{self, Builtin};
use super::error::ShellResult;
use super::job_manager::{Job, JobManager, ProcessWaiter, SysWaiter};
use super::launcher::{self, Launched};
use super::parser::ast::{ControlOp, Segment};
use super::parser::Parser;

/// 一个批次的结局。`quit` 对整个会话是终止性的。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub status: i32,
    pub quit: bool,
}

/// 调度循环：按顺序走一行的命令段序列，套前台/后台策略，
/// 把后台子进程喂给作业表。作业表由外部构造注入，循环自身
/// 只保留跨批次的最近状态码。
pub struct Dispatcher<W = SysWaiter> {
    jobs: JobManager<W>,
    last_status: i32,
}

impl Dispatcher<SysWaiter> {
    pub fn new() -> Self {
        Self::with_jobs(JobManager::new())
    }
}

impl Default for Dispatcher<SysWaiter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: ProcessWaiter> Dispatcher<W> {
    pub fn with_jobs(jobs: JobManager<W>) -> Self {
        Self {
            jobs,
            last_status: 0,
        }
    }

    /// 提示符用：最近一个前台命令（或失败）的状态码
    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    /// 会话收尾时仍未回收的后台作业
    pub fn pending_jobs(&self) -> &[Job] {
        self.jobs.jobs()
    }

    pub fn dispatch_line(&mut self, line: &str) -> DispatchOutcome {
        let segments = Parser::new(line).parse();
        self.dispatch(&segments)
    }

    /// 批次入口：先做一遍回收，再按源顺序消费命令段；
    /// 遇到 exit 立即停止，不再消费剩余命令段。
    pub fn dispatch(&mut self, segments: &[Segment]) -> DispatchOutcome {
        // 后台作业的完成只在这里被发现，天然有一个提示符周期的延迟
        for (pid, status) in self.jobs.reap() {
            println!("Value returned by the process with pid {}: {}", pid, status);
        }

        // exit 捎带的是本批次的累计状态，每个批次从 0 起算；
        // 跨批次的 last_status 只喂给提示符
        let mut batch_status = 0;

        for segment in segments {
            // 连续操作符产出的空命令按空操作处理
            if segment.is_empty() {
                continue;
            }

            // 每个命令只解析一次内建名，之后都用解析结果
            let builtin = Builtin::lookup(&segment.argv[0]);

            if builtin == Some(Builtin::Exit) {
                let status = segment
                    .argv
                    .get(1)
                    .and_then(|arg| arg.parse().ok())
                    .unwrap_or(batch_status);
                debug!("收到 exit，终止会话: status={}", status);
                return DispatchOutcome { status, quit: true };
            }

            let foreground = segment.op != ControlOp::Background;
            match self.dispatch_segment(builtin, segment, foreground) {
                Ok(Launched::Finished(status)) => {
                    batch_status = status;
                    self.last_status = status;
                }
                Ok(Launched::Spawned(pid)) => {
                    self.jobs.add_job(pid, segment.command_line());
                }
                // 唯一的恢复边界：失败折算成非零状态码加一条诊断，批次继续
                Err(err) => {
                    eprintln!("{}", err);
                    batch_status = err.status();
                    self.last_status = batch_status;
                }
            }
        }

        DispatchOutcome {
            status: batch_status,
            quit: false,
        }
    }

    fn dispatch_segment(
        &mut self,
        builtin: Option<Builtin>,
        segment: &Segment,
        foreground: bool,
    ) -> ShellResult<Launched> {
        match builtin {
            Some(builtin) if foreground => {
                builtins::run(builtin, &segment.argv).map(Launched::Finished)
            }
            // 后台内建也在子进程里执行，shell 循环从不被它阻塞
            Some(builtin) => launcher::run_builtin_background(builtin, segment),
            None => launcher::run_external(segment, foreground),
        }
    }
}
