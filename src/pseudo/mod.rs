//! # 赝势选择模块
//!
//! 为结构中的每个元素从赝势目录中挑选一个赝势文件。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 使用 `parsers/pseudo.rs`, `models/`, `utils/output.rs`
//! - 子模块: selector

pub mod selector;

pub use selector::{select_pseudopotentials, SelectorConfig};
