//! # 晶体结构数据模型
//!
//! 定义统一的晶体结构表示：晶格、原子列表、元素组成统计与对角超胞展开。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `qe/`, `commands/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let alpha_rad = alpha.to_radians();
        let beta_rad = beta.to_radians();
        let gamma_rad = gamma.to_radians();

        // 计算晶格向量
        let cos_alpha = alpha_rad.cos();
        let cos_beta = beta_rad.cos();
        let cos_gamma = gamma_rad.cos();
        let sin_gamma = gamma_rad.sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();
        let c_vec = [c1, c2, c3];

        Lattice {
            matrix: [a_vec, b_vec, c_vec],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let a_vec = self.matrix[0];
        let b_vec = self.matrix[1];
        let c_vec = self.matrix[2];

        let a = (a_vec[0].powi(2) + a_vec[1].powi(2) + a_vec[2].powi(2)).sqrt();
        let b = (b_vec[0].powi(2) + b_vec[1].powi(2) + b_vec[2].powi(2)).sqrt();
        let c = (c_vec[0].powi(2) + c_vec[1].powi(2) + c_vec[2].powi(2)).sqrt();

        let dot_bc: f64 = b_vec.iter().zip(c_vec.iter()).map(|(x, y)| x * y).sum();
        let dot_ac: f64 = a_vec.iter().zip(c_vec.iter()).map(|(x, y)| x * y).sum();
        let dot_ab: f64 = a_vec.iter().zip(b_vec.iter()).map(|(x, y)| x * y).sum();

        let alpha = (dot_bc / (b * c)).acos().to_degrees();
        let beta = (dot_ac / (a * c)).acos().to_degrees();
        let gamma = (dot_ab / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 倒格子矢量矩阵 (inv(M) 的转置，不含 2π 因子)
    /// 行向量 b_i 满足 a_i · b_j = δ_ij
    pub fn reciprocal(&self) -> [[f64; 3]; 3] {
        let m = self.matrix;
        let det = self.volume();

        // 逆矩阵的列即倒格子矢量的行
        let inv = [
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
            ],
        ];

        [
            [inv[0][0], inv[1][0], inv[2][0]],
            [inv[0][1], inv[1][1], inv[2][1]],
            [inv[0][2], inv[1][2], inv[2][2]],
        ]
    }
}

/// 原子信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],

    /// 可选：原子标签（用于区分同种元素的不同位置）
    pub label: Option<String>,
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// 元素组成条目：元素符号与该元素的原子数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCount {
    pub symbol: String,
    pub count: usize,
}

/// 晶体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,

    /// 来源文件格式
    pub source_format: Option<String>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
            source_format: None,
        }
    }

    /// 计算化学式（按符号排序，作为输出目录的命名键）
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for atom in &self.atoms {
            *counts.entry(atom.element.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 构建对角超胞：沿三个晶格矢量分别复制 sx, sy, sz 倍。
    /// 复制矩阵的非对角项恒为零，晶格行向量按倍数缩放，
    /// 分数坐标重新映射到展开后的晶胞。
    pub fn supercell(&self, sx: u32, sy: u32, sz: u32) -> Crystal {
        let mult = [sx as f64, sy as f64, sz as f64];

        let mut matrix = self.lattice.matrix;
        for (row, m) in matrix.iter_mut().zip(mult.iter()) {
            for v in row.iter_mut() {
                *v *= m;
            }
        }

        let mut atoms = Vec::with_capacity(self.atoms.len() * (sx * sy * sz) as usize);
        for i in 0..sx {
            for j in 0..sy {
                for k in 0..sz {
                    let shift = [i as f64, j as f64, k as f64];
                    for atom in &self.atoms {
                        let position = [
                            (atom.position[0] + shift[0]) / mult[0],
                            (atom.position[1] + shift[1]) / mult[1],
                            (atom.position[2] + shift[2]) / mult[2],
                        ];
                        atoms.push(Atom::new(atom.element.clone(), position));
                    }
                }
            }
        }

        let mut expanded = Crystal::new(self.name.clone(), Lattice::from_vectors(matrix), atoms);
        expanded.source_format = self.source_format.clone();
        expanded
    }

    /// 元素组成统计：按首次出现顺序去重，统计每个元素的原子数
    pub fn element_inventory(&self) -> Vec<ElementCount> {
        let mut inventory: Vec<ElementCount> = Vec::new();

        for atom in &self.atoms {
            match inventory.iter_mut().find(|e| e.symbol == atom.element) {
                Some(entry) => entry.count += 1,
                None => inventory.push(ElementCount {
                    symbol: atom.element.clone(),
                    count: 1,
                }),
            }
        }

        inventory
    }
}
