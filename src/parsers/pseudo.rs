//! # 赝势元数据解析器
//!
//! 解析赝势文件头部的价电子组态段，统计原子轨道数与价电子数。
//!
//! ## 格式说明
//! ```text
//! ...
//! Valence configuration:
//! nl  pn  l   occ       Rcut    Rcut US       E pseu
//! 3S  1   0  2.00      1.200      1.500    -0.753663
//! 3P  2   1  0.00      1.200      1.500    -0.201323
//! Generation configuration:
//! ...
//! ```
//! 每个数据行：第 0 列壳层标签，第 2 列角量子数 l，第 3 列占据数。
//! 占据数严格为正（或启用极化壳层时无条件）的壳层被计入：
//! n_aos += 2l+1，n_el += trunc(occ)。
//!
//! 两处哨兵扫描都有界：文件在哨兵行之前结束时返回
//! `MalformedPseudo` 错误，而不是无限循环。
//!
//! ## 依赖关系
//! - 被 `pseudo/selector.rs` 使用
//! - 使用 `models/pseudo.rs`

use crate::error::{Cif2QeError, Result};
use crate::models::PpCandidate;
use std::fs;
use std::path::Path;

const VALENCE_SENTINEL: &str = "Valence configuration:";
const GENERATION_SENTINEL: &str = "Generation configuration:";

/// 解析赝势元数据文件
pub fn parse_pseudo_file(path: &Path, use_polarization: bool) -> Result<PpCandidate> {
    let content = fs::read_to_string(path).map_err(|e| Cif2QeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("pseudopotential");

    parse_pseudo_content(&content, file_name, use_polarization)
}

/// 从字符串内容解析价电子组态。
/// 纯函数：结果只依赖内容与极化开关，重复解析结果一致。
pub fn parse_pseudo_content(
    content: &str,
    file_name: &str,
    use_polarization: bool,
) -> Result<PpCandidate> {
    let malformed = |reason: String| Cif2QeError::MalformedPseudo {
        path: file_name.to_string(),
        reason,
    };

    let mut lines = content.lines();

    // 扫描到价电子组态哨兵行（有界：迭代器耗尽即报错）
    loop {
        match lines.next() {
            Some(line) if line.trim() == VALENCE_SENTINEL => break,
            Some(_) => continue,
            None => {
                return Err(malformed(format!(
                    "reached end of file before '{}' line",
                    VALENCE_SENTINEL
                )))
            }
        }
    }

    // 跳过列头行
    if lines.next().is_none() {
        return Err(malformed(
            "file ends immediately after the valence sentinel".to_string(),
        ));
    }

    let mut shells: Vec<String> = Vec::new();
    let mut n_aos: u32 = 0;
    let mut n_el: u32 = 0;

    loop {
        let line = match lines.next() {
            Some(line) => line,
            None => {
                return Err(malformed(format!(
                    "reached end of file before '{}' line",
                    GENERATION_SENTINEL
                )))
            }
        };

        let trimmed = line.trim();
        if trimmed == GENERATION_SENTINEL {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(malformed(format!(
                "valence shell line '{}' has fewer than 4 columns",
                trimmed
            )));
        }

        let l: u32 = tokens[2].parse().map_err(|_| {
            malformed(format!(
                "invalid angular momentum '{}' in line '{}'",
                tokens[2], trimmed
            ))
        })?;
        let occupation: f64 = tokens[3].parse().map_err(|_| {
            malformed(format!(
                "invalid occupation '{}' in line '{}'",
                tokens[3], trimmed
            ))
        })?;

        if occupation > 0.0 || use_polarization {
            shells.push(tokens[0].to_string());
            n_aos += 2 * l + 1;
            n_el += occupation.trunc() as u32;
        }
    }

    Ok(PpCandidate {
        file_name: file_name.to_string(),
        shells,
        n_aos,
        n_el,
    })
}
