use std::fmt;
use std::io;

pub type ShellResult<T> = Result<T, ShellError>;

/// 内建命令和文件系统操作在检测点产出的失败。
/// 唯一的恢复边界是调度循环：转成非零状态码加一条 stderr 诊断，
/// 单个命令段失败不会中断本批次，也不会终止会话。
#[derive(Debug)]
pub enum ShellError {
    /// 内建命令参数个数不对，携带该命令固定的诊断文本
    Arity(&'static str),
    /// 源文件不存在
    NotFound(String),
    /// 源不是普通文件
    WrongType(String),
    /// 子进程创建失败
    Spawn(io::Error),
    /// 底层系统调用失败
    Os(io::Error),
}

impl ShellError {
    /// 调度边界把失败折算成的状态码
    pub fn status(&self) -> i32 {
        match self {
            ShellError::Arity(_) => 1,
            ShellError::NotFound(_) => 1,
            ShellError::WrongType(_) => 2,
            ShellError::Spawn(_) => libc::EXIT_FAILURE,
            ShellError::Os(err) => err.raw_os_error().unwrap_or(1),
        }
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Arity(message) => write!(f, "{}", message),
            ShellError::NotFound(path) => {
                write!(f, "{}: No such file or directory", path)
            }
            ShellError::WrongType(path) => write!(f, "{}: Not a regular file", path),
            ShellError::Spawn(_) => write!(f, "Error when trying to create child process"),
            ShellError::Os(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Spawn(err) | ShellError::Os(err) => Some(err),
            _ => None,
        }
    }
}

impl From<nix::Error> for ShellError {
    fn from(errno: nix::Error) -> Self {
        ShellError::Os(io::Error::from_raw_os_error(errno as i32))
    }
}
