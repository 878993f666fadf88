use std::env;
use std::io::{self, Write};

use log::debug;

use super::error::{ShellError, ShellResult};
use super::fs;

/// 内建命令集是封闭的：按命令名解析一次，解析失败即外部程序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Echo,
    Cd,
    Cp,
    Mv,
    Exit,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "echo" => Some(Builtin::Echo),
            "cd" => Some(Builtin::Cd),
            "cp" => Some(Builtin::Cp),
            "mv" => Some(Builtin::Mv),
            "exit" => Some(Builtin::Exit),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Echo => "echo",
            Builtin::Cd => "cd",
            Builtin::Cp => "cp",
            Builtin::Mv => "mv",
            Builtin::Exit => "exit",
        }
    }
}

/// 内建命令的统一契约：`(argv) -> 状态码`，argv[0] 是命令名
pub fn run(builtin: Builtin, argv: &[String]) -> ShellResult<i32> {
    debug!("执行内建命令: {} {:?}", builtin.name(), &argv[1..]);
    match builtin {
        Builtin::Echo => echo(argv),
        Builtin::Cd => cd(argv),
        Builtin::Cp => cp(argv),
        Builtin::Mv => mv(argv),
        // exit 由调度循环特判，不会走到这里
        Builtin::Exit => Ok(0),
    }
}

fn echo(argv: &[String]) -> ShellResult<i32> {
    let mut stdout = io::stdout().lock();
    echo_to(argv, &mut stdout)?;
    Ok(0)
}

/// 参数以单个空格拼接，末尾换行；零参数时只输出换行
pub(crate) fn echo_to(argv: &[String], out: &mut impl Write) -> ShellResult<()> {
    writeln!(out, "{}", argv[1..].join(" ")).map_err(ShellError::Os)
}

fn cd(argv: &[String]) -> ShellResult<i32> {
    if argv.len() != 2 {
        return Err(ShellError::Arity("ERROR: Too many arguments"));
    }
    let path = shellexpand::tilde(&argv[1]);
    env::set_current_dir(path.as_ref()).map_err(ShellError::Os)?;
    Ok(0)
}

fn cp(argv: &[String]) -> ShellResult<i32> {
    match argv.len() {
        3 => fs::copy_file(&argv[1], &argv[2], false)?,
        4 if argv[1] == "-a" => fs::copy_file(&argv[2], &argv[3], true)?,
        _ => return Err(ShellError::Arity("Syntax is incorrect")),
    }
    Ok(0)
}

fn mv(argv: &[String]) -> ShellResult<i32> {
    if argv.len() != 3 {
        return Err(ShellError::Arity("Syntax is incorrect"));
    }
    fs::move_file(&argv[1], &argv[2])?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_lookup_resolves_builtin_set() {
        assert_eq!(Builtin::lookup("echo"), Some(Builtin::Echo));
        assert_eq!(Builtin::lookup("cd"), Some(Builtin::Cd));
        assert_eq!(Builtin::lookup("cp"), Some(Builtin::Cp));
        assert_eq!(Builtin::lookup("mv"), Some(Builtin::Mv));
        assert_eq!(Builtin::lookup("exit"), Some(Builtin::Exit));
        assert_eq!(Builtin::lookup("ls"), None);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_echo_joins_with_single_spaces() {
        let argv: Vec<String> = ["echo", "hello", "world"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut out = Vec::new();
        echo_to(&argv, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello world\n");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_echo_without_arguments() {
        // 零参数边界：只有一个换行，不出现下溢
        let argv = vec!["echo".to_string()];
        let mut out = Vec::new();
        echo_to(&argv, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\n");
    }

    #[test]
    fn test_cd_arity_error_leaves_cwd_alone() {
        let before = std::env::current_dir();
        let argv: Vec<String> = ["cd", "a", "b"].iter().map(|s| s.to_string()).collect();
        let result = run(Builtin::Cd, &argv);
        match result {
            Err(ShellError::Arity(message)) => {
                assert_eq!(message, "ERROR: Too many arguments")
            }
            other => panic!("expected arity error, got {:?}", other),
        }
        assert_eq!(
            before.ok(),
            std::env::current_dir().ok(),
            "cwd must not change on arity failure"
        );
    }

    #[test]
    fn test_cp_rejects_unknown_flag() {
        let argv: Vec<String> = ["cp", "-r", "a", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        match run(Builtin::Cp, &argv) {
            Err(ShellError::Arity(message)) => assert_eq!(message, "Syntax is incorrect"),
            other => panic!("expected arity error, got {:?}", other),
        }
    }

    #[test]
    fn test_mv_requires_two_paths() {
        let argv: Vec<String> = ["mv", "only-one"].iter().map(|s| s.to_string()).collect();
        match run(Builtin::Mv, &argv) {
            Err(ShellError::Arity(message)) => assert_eq!(message, "Syntax is incorrect"),
            other => panic!("expected arity error, got {:?}", other),
        }
    }
}
