use std::fmt;

use log::{debug, warn};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// 一次非阻塞探测的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaped {
    /// 正常退出，携带退出码
    Exited(i32),
    /// 被信号终止，携带信号编号
    Signaled(i32),
    StillAlive,
    /// 进程已不可等待（如 ECHILD），无状态可报
    Gone,
}

/// 进程等待原语的接口，调度循环只通过它探测子进程，
/// 测试用脚本化的假实现替换掉 waitpid
pub trait ProcessWaiter {
    fn try_wait(&mut self, pid: i32) -> Reaped;
}

/// 默认实现：waitpid(WNOHANG)，从不阻塞
pub struct SysWaiter;

impl ProcessWaiter for SysWaiter {
    fn try_wait(&mut self, pid: i32) -> Reaped {
        match waitpid(Pid::from_raw(pid), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => Reaped::StillAlive,
            Ok(WaitStatus::Exited(_, status)) => Reaped::Exited(status),
            Ok(WaitStatus::Signaled(_, signal, _)) => Reaped::Signaled(signal as i32),
            // 停止/继续等状态留在表里，下一轮再探测
            Ok(_) => Reaped::StillAlive,
            Err(errno) => {
                warn!("waitpid({}) 失败: {}", pid, errno);
                Reaped::Gone
            }
        }
    }
}

/// 一个尚未回收的后台作业
#[derive(Debug, Clone)]
pub struct Job {
    pub pid: i32,
    pub command: String,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.pid, self.command)
    }
}

/// 在途后台作业表。pid 在表里最多出现一次；
/// 作业在首次探测到完成时移除并上报，之后不再出现。
pub struct JobManager<W = SysWaiter> {
    jobs: Vec<Job>,
    waiter: W,
}

impl JobManager<SysWaiter> {
    pub fn new() -> Self {
        Self::with_waiter(SysWaiter)
    }
}

impl<W: ProcessWaiter> JobManager<W> {
    pub fn with_waiter(waiter: W) -> Self {
        Self {
            jobs: Vec::new(),
            waiter,
        }
    }

    pub fn add_job(&mut self, pid: i32, command: String) {
        if self.jobs.iter().any(|job| job.pid == pid) {
            warn!("pid {} 已在作业表中，忽略重复登记", pid);
            return;
        }
        debug!("登记后台作业: [{}] {}", pid, command);
        self.jobs.push(Job { pid, command });
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// 回收一遍：对每个在途作业做一次非阻塞探测，完成的移出表并
    /// 返回 `(pid, 退出状态)`。被信号终止的按 128+signo 归一化。
    pub fn reap(&mut self) -> Vec<(i32, i32)> {
        let mut finished = Vec::new();
        let mut index = 0;
        while index < self.jobs.len() {
            let pid = self.jobs[index].pid;
            match self.waiter.try_wait(pid) {
                Reaped::StillAlive => index += 1,
                Reaped::Exited(status) => {
                    self.jobs.remove(index);
                    finished.push((pid, status));
                }
                Reaped::Signaled(signal) => {
                    self.jobs.remove(index);
                    finished.push((pid, 128 + signal));
                }
                Reaped::Gone => {
                    // 没有状态可上报，只能从表里丢掉
                    self.jobs.remove(index);
                }
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// 脚本化的假等待原语：pid 不在表里就一直 StillAlive
    struct ScriptedWaiter {
        outcomes: HashMap<i32, Reaped>,
    }

    impl ScriptedWaiter {
        fn new(outcomes: &[(i32, Reaped)]) -> Self {
            Self {
                outcomes: outcomes.iter().copied().collect(),
            }
        }
    }

    impl ProcessWaiter for ScriptedWaiter {
        fn try_wait(&mut self, pid: i32) -> Reaped {
            self.outcomes
                .get(&pid)
                .copied()
                .unwrap_or(Reaped::StillAlive)
        }
    }

    #[test]
    fn test_finished_job_reported_exactly_once() {
        let waiter = ScriptedWaiter::new(&[(42, Reaped::Exited(7))]);
        let mut jobs = JobManager::with_waiter(waiter);
        jobs.add_job(42, "sleep 1".to_string());

        assert_eq!(jobs.reap(), vec![(42, 7)]);
        // 任意多次再回收都不会重复上报
        assert!(jobs.reap().is_empty());
        assert!(jobs.reap().is_empty());
        assert!(jobs.jobs().is_empty());
    }

    #[test]
    fn test_pending_job_stays_in_table() {
        let waiter = ScriptedWaiter::new(&[]);
        let mut jobs = JobManager::with_waiter(waiter);
        jobs.add_job(10, "sleep 60".to_string());

        assert!(jobs.reap().is_empty());
        assert_eq!(jobs.jobs().len(), 1);
        assert_eq!(jobs.jobs()[0].pid, 10);
    }

    #[test]
    fn test_duplicate_pid_is_not_registered_twice() {
        let waiter = ScriptedWaiter::new(&[]);
        let mut jobs = JobManager::with_waiter(waiter);
        jobs.add_job(5, "a".to_string());
        jobs.add_job(5, "b".to_string());
        assert_eq!(jobs.jobs().len(), 1);
    }

    #[test]
    fn test_signaled_job_status_is_normalized() {
        let waiter = ScriptedWaiter::new(&[(9, Reaped::Signaled(15))]);
        let mut jobs = JobManager::with_waiter(waiter);
        jobs.add_job(9, "doomed".to_string());
        assert_eq!(jobs.reap(), vec![(9, 128 + 15)]);
    }

    #[test]
    fn test_gone_job_is_dropped_silently() {
        let waiter = ScriptedWaiter::new(&[(3, Reaped::Gone)]);
        let mut jobs = JobManager::with_waiter(waiter);
        jobs.add_job(3, "lost".to_string());
        assert!(jobs.reap().is_empty());
        assert!(jobs.jobs().is_empty());
    }

    #[test]
    fn test_reap_preserves_remaining_order() {
        let waiter = ScriptedWaiter::new(&[(2, Reaped::Exited(0))]);
        let mut jobs = JobManager::with_waiter(waiter);
        jobs.add_job(1, "first".to_string());
        jobs.add_job(2, "second".to_string());
        jobs.add_job(3, "third".to_string());

        assert_eq!(jobs.reap(), vec![(2, 0)]);
        let pids: Vec<i32> = jobs.jobs().iter().map(|job| job.pid).collect();
        assert_eq!(pids, vec![1, 3]);
    }
}
