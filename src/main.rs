use log::debug;

use crate::shell::Shell;
use crate::utils::config::Config;
use crate::utils::log::init_logger;

mod shell;
mod utils;

fn main() {
    let config = Config::new();
    init_logger(&config);
    debug!("配置加载成功: {}", config.history_file.display());

    let mut shell = match Shell::new(&config) {
        Ok(shell) => shell,
        Err(err) => {
            eprintln!("xiao: 无法初始化 readline: {}", err);
            std::process::exit(libc::EXIT_FAILURE);
        }
    };
    match shell.run() {
        // 会话退出码等于遇到 exit 时累计的状态码，EOF 正常结束时为 0
        Ok(status) => std::process::exit(status),
        Err(err) => {
            eprintln!("xiao: {}", err);
            std::process::exit(libc::EXIT_FAILURE);
        }
    }
}
