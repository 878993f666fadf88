mod builtins;
mod dispatcher;
mod error;
mod fs;
mod job_manager;
mod launcher;
mod parser;
mod prompt;
mod readline;
mod shell;

pub use shell::Shell;
