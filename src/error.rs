//! # 统一错误处理模块
//!
//! 定义 cif2qe 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// cif2qe 统一错误类型
#[derive(Error, Debug)]
pub enum Cif2QeError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Malformed pseudopotential metadata: {path}\nReason: {reason}")]
    MalformedPseudo { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 赝势 / 元素数据错误
    // ─────────────────────────────────────────────────────────────
    #[error("No pseudopotential found for element '{element}'")]
    NoPseudopotential { element: String },

    #[error("Unknown element symbol: '{element}' (no atomic mass on record)")]
    UnknownElement { element: String },

    // ─────────────────────────────────────────────────────────────
    // 参数 / 交互错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Interactive input ended before a pseudopotential was chosen")]
    InputClosed,

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, Cif2QeError>;
