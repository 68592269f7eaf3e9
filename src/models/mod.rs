//! # 数据模型模块
//!
//! 定义晶体结构与赝势选择结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `pseudo/`, `qe/`, `commands/` 使用
//! - 子模块: structure, pseudo

pub mod pseudo;
pub mod structure;

pub use pseudo::{PpCandidate, PpSelection};
pub use structure::{Atom, Crystal, ElementCount, Lattice};
