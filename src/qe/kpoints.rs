//! # k 点网格生成
//!
//! 由目标 k 点间距推导 Monkhorst-Pack 网格：
//! 每个方向 n_i = ceil(2π |b_i| / spacing)，至少为 1。
//! b_i 为不含 2π 因子的倒格子矢量。
//!
//! ## 依赖关系
//! - 被 `qe/input.rs` 使用
//! - 使用 `models/structure.rs`

use crate::models::Lattice;

/// 由 k 点间距（单位 1/Å）计算自动网格
pub fn kspacing_to_grid(lattice: &Lattice, spacing: f64) -> [u32; 3] {
    let reciprocal = lattice.reciprocal();
    let mut grid = [1u32; 3];

    for (i, row) in reciprocal.iter().enumerate() {
        let norm = (row[0].powi(2) + row[1].powi(2) + row[2].powi(2)).sqrt();
        let n = (2.0 * std::f64::consts::PI * norm / spacing).ceil();
        grid[i] = n.max(1.0) as u32;
    }

    grid
}
