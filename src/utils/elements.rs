//! # 原子质量数据库
//!
//! 提供 QE ATOMIC_SPECIES 卡片所需的标准原子量查询。
//!
//! ## 数据来源
//! IUPAC 标准原子量（常规值，amu）
//!
//! ## 依赖关系
//! - 被 `qe/input.rs` 使用
//! - 纯静态数据，无外部依赖

use std::collections::HashMap;
use std::sync::LazyLock;

/// 标准原子量表 (元素符号 -> amu)
/// 覆盖 H 到 Bi 以及 Th, U；放射性元素取最长寿命同位素质量
const MASSES: &[(&str, f64)] = &[
    // 第 1-2 周期
    ("H", 1.008),
    ("He", 4.0026),
    ("Li", 6.94),
    ("Be", 9.0122),
    ("B", 10.81),
    ("C", 12.011),
    ("N", 14.007),
    ("O", 15.999),
    ("F", 18.998),
    ("Ne", 20.180),
    // 第 3 周期
    ("Na", 22.990),
    ("Mg", 24.305),
    ("Al", 26.982),
    ("Si", 28.085),
    ("P", 30.974),
    ("S", 32.06),
    ("Cl", 35.45),
    ("Ar", 39.948),
    // 第 4 周期
    ("K", 39.098),
    ("Ca", 40.078),
    ("Sc", 44.956),
    ("Ti", 47.867),
    ("V", 50.942),
    ("Cr", 51.996),
    ("Mn", 54.938),
    ("Fe", 55.845),
    ("Co", 58.933),
    ("Ni", 58.693),
    ("Cu", 63.546),
    ("Zn", 65.38),
    ("Ga", 69.723),
    ("Ge", 72.630),
    ("As", 74.922),
    ("Se", 78.971),
    ("Br", 79.904),
    ("Kr", 83.798),
    // 第 5 周期
    ("Rb", 85.468),
    ("Sr", 87.62),
    ("Y", 88.906),
    ("Zr", 91.224),
    ("Nb", 92.906),
    ("Mo", 95.95),
    ("Tc", 98.0),
    ("Ru", 101.07),
    ("Rh", 102.91),
    ("Pd", 106.42),
    ("Ag", 107.87),
    ("Cd", 112.41),
    ("In", 114.82),
    ("Sn", 118.71),
    ("Sb", 121.76),
    ("Te", 127.60),
    ("I", 126.90),
    ("Xe", 131.29),
    // 第 6 周期
    ("Cs", 132.91),
    ("Ba", 137.33),
    ("La", 138.91),
    ("Ce", 140.12),
    ("Pr", 140.91),
    ("Nd", 144.24),
    ("Pm", 145.0),
    ("Sm", 150.36),
    ("Eu", 151.96),
    ("Gd", 157.25),
    ("Tb", 158.93),
    ("Dy", 162.50),
    ("Ho", 164.93),
    ("Er", 167.26),
    ("Tm", 168.93),
    ("Yb", 173.05),
    ("Lu", 174.97),
    ("Hf", 178.49),
    ("Ta", 180.95),
    ("W", 183.84),
    ("Re", 186.21),
    ("Os", 190.23),
    ("Ir", 192.22),
    ("Pt", 195.08),
    ("Au", 196.97),
    ("Hg", 200.59),
    ("Tl", 204.38),
    ("Pb", 207.2),
    ("Bi", 208.98),
    // 锕系（常用）
    ("Th", 232.04),
    ("U", 238.03),
];

static ATOMIC_MASSES: LazyLock<HashMap<&'static str, f64>> =
    LazyLock::new(|| MASSES.iter().copied().collect());

/// 查询元素的标准原子量 (amu)
pub fn atomic_mass(symbol: &str) -> Option<f64> {
    ATOMIC_MASSES.get(symbol).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_mass_known_elements() {
        assert!((atomic_mass("H").unwrap() - 1.008).abs() < 1e-6);
        assert!((atomic_mass("Fe").unwrap() - 55.845).abs() < 1e-6);
        assert!((atomic_mass("U").unwrap() - 238.03).abs() < 1e-6);
    }

    #[test]
    fn test_atomic_mass_unknown_symbol() {
        assert!(atomic_mass("Xx").is_none());
        assert!(atomic_mass("fe").is_none()); // 大小写敏感
    }

    #[test]
    fn test_atomic_mass_no_duplicate_symbols() {
        use std::collections::HashSet;
        let symbols: HashSet<&str> = MASSES.iter().map(|(s, _)| *s).collect();
        assert_eq!(symbols.len(), MASSES.len());
    }
}
