//! # 命令执行模块
//!
//! 实现 cif2qe 的主流程。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli.rs`, `parsers/`, `pseudo/`, `qe/`, `models/`, `utils/`
//! - 子模块: generate

pub mod generate;

use crate::cli::Cli;
use crate::error::Result;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    generate::execute(cli)
}
