//! # 工具函数模块
//!
//! 提供美化输出与原子质量数据。
//!
//! ## 依赖关系
//! - 被 `commands/`, `pseudo/`, `qe/` 模块使用
//! - 子模块: elements, output

pub mod elements;
pub mod output;
