pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod sync;
pub mod watch;
