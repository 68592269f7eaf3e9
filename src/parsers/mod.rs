//! # 解析器模块
//!
//! 提供 CIF 结构文件与赝势元数据文件的解析器。
//!
//! ## 依赖关系
//! - 被 `pseudo/`, `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: cif, pseudo

pub mod cif;
pub mod pseudo;
