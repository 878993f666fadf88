use std::env;

use log::error;

pub fn current_dir() -> String {
    let current_dir = match env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            error!("xiao: PROMPT: env current_dir error: {}", err);
            return String::new();
        }
    };

    match current_dir.to_str() {
        Some(dir) => dir.to_string(),
        None => {
            error!("xiao: PROMPT: to_str error");
            String::new()
        }
    }
}
