//! CLI 模块负责解析命令行参数并分发到会话操作。

mod runner;

pub mod args;
pub mod context;

pub use runner::run;
