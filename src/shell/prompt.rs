use std::env;
use std::io::IsTerminal;

use colored::Colorize;
use nix::unistd::gethostname;
use once_cell::sync::Lazy;

use crate::utils::path::current_dir;

static HOSTNAME: Lazy<String> = Lazy::new(|| {
    gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_default()
});

/// `用户@主机:工作目录 $> `，上一条命令失败时收尾换成 `$< `。
/// stdin 不是终端时不渲染颜色。
pub fn render(last_status: i32) -> String {
    let user = env::var("USER").unwrap_or_default();
    let symbol = if last_status == 0 { "$> " } else { "$< " };

    if std::io::stdin().is_terminal() {
        format!(
            "{}@{}:{} {}",
            user.green(),
            HOSTNAME.green(),
            current_dir().blue(),
            if last_status == 0 {
                symbol.normal()
            } else {
                symbol.red()
            }
        )
    } else {
        format!("{}@{}:{} {}", user, &*HOSTNAME, current_dir(), symbol)
    }
}
