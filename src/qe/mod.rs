//! # Quantum ESPRESSO / LOBSTER 输入写出模块
//!
//! 组装并写出 pw.x 输入文件（SCF 与去对称 NSCF）以及
//! LOBSTER 成键分析输入文件。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 使用 `models/`, `utils/elements.rs`
//! - 子模块: input, kpoints, lobster

pub mod input;
pub mod kpoints;
pub mod lobster;

pub use input::{band_counts, generate_pw_input, BandCounts, PwInput};
