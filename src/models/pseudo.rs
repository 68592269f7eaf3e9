//! # 赝势数据模型
//!
//! 定义赝势候选（解析单个元数据文件得到）与按元素的最终选择结果。
//!
//! ## 依赖关系
//! - 被 `parsers/pseudo.rs`, `pseudo/selector.rs`, `qe/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 一个赝势候选：由单个元数据文件的价电子组态解析得到
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpCandidate {
    /// 赝势文件名
    pub file_name: String,

    /// 计入的价壳层标签，按文件中的出现顺序
    pub shells: Vec<String>,

    /// 原子轨道数：每个计入壳层贡献 2l+1
    pub n_aos: u32,

    /// 价电子数：每个计入壳层贡献 trunc(occupation)
    pub n_el: u32,
}

impl PpCandidate {
    /// 壳层标签的逗号连接形式，如 "3d,4s"
    pub fn shell_list(&self) -> String {
        self.shells.join(",")
    }
}

/// 按元素的赝势选择结果，保持插入（即元素首次出现）顺序。
/// 不变量：输入组装前，结构中每个元素必须且只能有一个选择。
#[derive(Debug, Clone, Default)]
pub struct PpSelection {
    entries: Vec<(String, PpCandidate)>,
}

impl PpSelection {
    pub fn new() -> Self {
        PpSelection {
            entries: Vec::new(),
        }
    }

    /// 记录一个元素的选择；同一元素重复插入时覆盖旧值
    pub fn insert(&mut self, symbol: impl Into<String>, choice: PpCandidate) {
        let symbol = symbol.into();
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some((_, existing)) => *existing = choice,
            None => self.entries.push((symbol, choice)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&PpCandidate> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PpCandidate)> {
        self.entries.iter().map(|(s, c)| (s.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
