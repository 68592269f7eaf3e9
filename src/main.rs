//! # cif2qe - CIF 到 Quantum ESPRESSO 输入文件生成器
//!
//! 读取 CIF 晶体结构，构建超胞，为每个元素选择赝势文件，
//! 并生成 pw.x 的 SCF / NSCF 输入文件和 LOBSTER 成键分析输入文件。
//!
//! ## 工作流程
//! 1. 解析 CIF 结构文件
//! 2. 按 `--sc` 构建对角超胞
//! 3. 统计元素组成
//! 4. 从赝势目录为每个元素选择一个赝势（交互式或 `--max-valence` 自动）
//! 5. 计算能带数 / 电子数 / 自旋通道
//! 6. 写出 `pw.scf.in`、`remove_sym/pw.scf.in`、`remove_sym/lobsterin`
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli.rs      (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (CIF 与赝势元数据解析器)
//!   │     ├── pseudo/    (赝势选择)
//!   │     ├── qe/        (QE / LOBSTER 输入写出)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod pseudo;
mod qe;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
