use std::error::Error;
use std::io::Write;

use log::{debug, error, warn};

use crate::shell::dispatcher::Dispatcher;
use crate::shell::prompt;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::utils::config::Config;

/// 交互主循环：读一行、切段、调度，直到 exit 或 EOF。
/// `run` 的返回值作为整个进程的退出码。
pub struct Shell<'a> {
    readline: ReadlineManager<'a>,
    dispatcher: Dispatcher,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ReadlineError> {
        Ok(Self {
            readline: ReadlineManager::new(config)?,
            dispatcher: Dispatcher::new(),
        })
    }

    pub fn run(&mut self) -> Result<i32, Box<dyn Error>> {
        debug!("初始化 xiaosh...");
        self.readline.load_history()?;
        debug!("xiaosh 准备就绪...");

        let status = self.run_loop()?;

        // 未回收的后台作业随会话一起被放弃，只留痕迹
        for job in self.dispatcher.pending_jobs() {
            warn!("会话结束时仍有未回收的后台作业: {}", job);
        }

        self.readline.save_history()?;
        debug!("退出 xiaosh...");
        Ok(status)
    }

    fn run_loop(&mut self) -> Result<i32, Box<dyn Error>> {
        loop {
            std::io::stdout().flush()?;
            let prompt = prompt::render(self.dispatcher.last_status());

            match self.readline.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.readline.add_history(&line)?;
                    }
                    // 空行也要走一遍调度：批次开头的回收只在那里发生
                    let outcome = self.dispatcher.dispatch_line(&line);
                    if outcome.quit {
                        return Ok(outcome.status);
                    }
                }
                Err(ReadlineError::Eof) => {
                    // 干净的输入结束，没有待执行命令，退出码 0
                    warn!("接收到 EOF，退出 xiaosh...");
                    return Ok(0);
                }
                Err(ReadlineError::Interrupted) => {
                    warn!("接收到中断，丢弃当前行...");
                    continue;
                }
                Err(err) => {
                    error!("readline 错误: {}", err);
                    return Err(err.into());
                }
            }
        }
    }
}
