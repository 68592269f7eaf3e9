//! # CIF 格式解析器
//!
//! 解析本工具所需的 CIF 子集：晶胞参数与原子位置循环。
//!
//! ## CIF 格式说明
//! ```text
//! data_NaCl
//! _cell_length_a    5.640
//! _cell_length_b    5.640
//! _cell_length_c    5.640
//! _cell_angle_alpha 90.0
//! _cell_angle_beta  90.0
//! _cell_angle_gamma 90.0
//!
//! loop_
//! _atom_site_label
//! _atom_site_type_symbol
//! _atom_site_fract_x
//! _atom_site_fract_y
//! _atom_site_fract_z
//! Na1 Na 0.0 0.0 0.0
//! Cl1 Cl 0.5 0.5 0.5
//! ```
//!
//! 数值允许携带标准不确定度后缀（如 `5.640(2)`），解析前用正则去除。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Cif2QeError, Result};
use crate::models::{Atom, Crystal, Lattice};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// 标准不确定度后缀，如 "5.640(2)" 中的 "(2)"
static SU_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\d+\)").unwrap());

/// 解析 CIF 文件
pub fn parse_cif_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| Cif2QeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_cif_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("structure"),
    )
}

/// 从字符串内容解析 CIF 格式
pub fn parse_cif_content(content: &str, default_name: &str) -> Result<Crystal> {
    let lines: Vec<&str> = content.lines().collect();

    let mut name = default_name.to_string();
    let mut cell: [Option<f64>; 6] = [None; 6];
    let mut atoms: Vec<Atom> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();

        if line.is_empty() || line.starts_with('#') {
            i += 1;
            continue;
        }

        if let Some(block) = line.strip_prefix("data_") {
            if !block.is_empty() {
                name = block.to_string();
            }
            i += 1;
            continue;
        }

        let lower = line.to_lowercase();
        if lower.starts_with("_cell_") {
            // 晶胞参数：标签与数值同行
            let tags = [
                "_cell_length_a",
                "_cell_length_b",
                "_cell_length_c",
                "_cell_angle_alpha",
                "_cell_angle_beta",
                "_cell_angle_gamma",
            ];
            for (slot, tag) in tags.iter().enumerate() {
                if lower.starts_with(tag) {
                    let value = line.split_whitespace().nth(1).ok_or_else(|| {
                        Cif2QeError::ParseError {
                            format: "cif".to_string(),
                            path: default_name.to_string(),
                            reason: format!("missing value for {}", tag),
                        }
                    })?;
                    cell[slot] = Some(parse_numeric(value, default_name)?);
                    break;
                }
            }
            i += 1;
            continue;
        }

        if lower == "loop_" {
            // 收集循环列头
            let mut headers: Vec<String> = Vec::new();
            let mut j = i + 1;
            while j < lines.len() && lines[j].trim().starts_with('_') {
                headers.push(lines[j].trim().to_lowercase());
                j += 1;
            }

            if headers.iter().any(|h| h == "_atom_site_fract_x") {
                let parsed = parse_atom_loop(&lines, j, &headers, default_name)?;
                atoms = parsed.0;
                i = parsed.1;
                continue;
            }

            i = j;
            continue;
        }

        i += 1;
    }

    let [a, b, c, alpha, beta, gamma] = cell;
    let (a, b, c) = match (a, b, c) {
        (Some(a), Some(b), Some(c)) => (a, b, c),
        _ => {
            return Err(Cif2QeError::ParseError {
                format: "cif".to_string(),
                path: default_name.to_string(),
                reason: "missing _cell_length_a/b/c".to_string(),
            })
        }
    };
    // 角度缺省为 90 度（正交晶系 CIF 偶尔省略）
    let lattice = Lattice::from_parameters(
        a,
        b,
        c,
        alpha.unwrap_or(90.0),
        beta.unwrap_or(90.0),
        gamma.unwrap_or(90.0),
    );

    if atoms.is_empty() {
        return Err(Cif2QeError::ParseError {
            format: "cif".to_string(),
            path: default_name.to_string(),
            reason: "no atom sites found (_atom_site_fract_* loop missing or empty)".to_string(),
        });
    }

    let mut crystal = Crystal::new(name, lattice, atoms);
    crystal.source_format = Some("cif".to_string());

    Ok(crystal)
}

/// 解析原子位置循环的数据行，返回 (原子列表, 下一行行号)
fn parse_atom_loop(
    lines: &[&str],
    start: usize,
    headers: &[String],
    default_name: &str,
) -> Result<(Vec<Atom>, usize)> {
    let col = |tag: &str| headers.iter().position(|h| h == tag);

    let ix = col("_atom_site_fract_x");
    let iy = col("_atom_site_fract_y");
    let iz = col("_atom_site_fract_z");
    let (ix, iy, iz) = match (ix, iy, iz) {
        (Some(x), Some(y), Some(z)) => (x, y, z),
        _ => {
            return Err(Cif2QeError::ParseError {
                format: "cif".to_string(),
                path: default_name.to_string(),
                reason: "incomplete _atom_site_fract_x/y/z columns".to_string(),
            })
        }
    };

    // 元素符号优先取 type_symbol，退化到 label（去掉序号后缀）
    let i_symbol = col("_atom_site_type_symbol");
    let i_label = col("_atom_site_label");
    if i_symbol.is_none() && i_label.is_none() {
        return Err(Cif2QeError::ParseError {
            format: "cif".to_string(),
            path: default_name.to_string(),
            reason: "neither _atom_site_type_symbol nor _atom_site_label present".to_string(),
        });
    }

    let mut atoms = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty()
            || line.starts_with('_')
            || line.starts_with('#')
            || line.to_lowercase() == "loop_"
            || line.starts_with("data_")
        {
            break;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < headers.len() {
            // 数据行列数不足：跳过（常见于尾部的注释性行）
            i += 1;
            continue;
        }

        let raw_symbol = match (i_symbol, i_label) {
            (Some(s), _) => tokens[s],
            (None, Some(l)) => tokens[l],
            (None, None) => unreachable!(),
        };
        let element = normalize_symbol(raw_symbol).ok_or_else(|| Cif2QeError::ParseError {
            format: "cif".to_string(),
            path: default_name.to_string(),
            reason: format!("cannot derive element symbol from '{}'", raw_symbol),
        })?;

        let position = [
            parse_numeric(tokens[ix], default_name)?,
            parse_numeric(tokens[iy], default_name)?,
            parse_numeric(tokens[iz], default_name)?,
        ];

        let mut atom = Atom::new(element, position);
        if let Some(l) = i_label {
            atom = atom.with_label(tokens[l]);
        }
        atoms.push(atom);
        i += 1;
    }

    Ok((atoms, i))
}

/// 解析可能带不确定度后缀的数值
fn parse_numeric(token: &str, path: &str) -> Result<f64> {
    let cleaned = SU_SUFFIX.replace_all(token, "");
    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| Cif2QeError::ParseError {
            format: "cif".to_string(),
            path: path.to_string(),
            reason: format!("invalid numeric value '{}'", token),
        })
}

/// 从标签或符号列提取规范化的元素符号：
/// 取前导字母，首字母大写其余小写（"FE2+" -> "Fe", "na1" -> "Na"）
fn normalize_symbol(raw: &str) -> Option<String> {
    let alpha: String = raw.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if alpha.is_empty() {
        return None;
    }
    // 元素符号至多两个字母
    let alpha = &alpha[..alpha.len().min(2)];
    let mut chars = alpha.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();
    Some(format!("{}{}", first, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NACL_CIF: &str = r#"
data_NaCl
_cell_length_a    5.6402(12)
_cell_length_b    5.6402
_cell_length_c    5.6402
_cell_angle_alpha 90.0
_cell_angle_beta  90.0
_cell_angle_gamma 90.0

loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Na1 Na 0.0 0.0 0.0
Cl1 Cl 0.5 0.5 0.5
"#;

    #[test]
    fn test_parse_cif_basic() {
        let crystal = parse_cif_content(NACL_CIF, "nacl").unwrap();
        assert_eq!(crystal.name, "NaCl");
        assert_eq!(crystal.atoms.len(), 2);
        assert_eq!(crystal.atoms[0].element, "Na");
        assert_eq!(crystal.atoms[1].element, "Cl");

        let (a, _, _, _, _, gamma) = crystal.lattice.parameters();
        assert!((a - 5.6402).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_cif_label_only() {
        let content = r#"
data_Fe
_cell_length_a 2.87
_cell_length_b 2.87
_cell_length_c 2.87
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
FE1 0.0 0.0 0.0
FE2 0.5 0.5 0.5
"#;
        let crystal = parse_cif_content(content, "fe").unwrap();
        assert_eq!(crystal.atoms.len(), 2);
        assert_eq!(crystal.atoms[0].element, "Fe");
        assert_eq!(crystal.atoms[0].label, Some("FE1".to_string()));
    }

    #[test]
    fn test_parse_cif_uncertainty_suffix() {
        let v = parse_numeric("0.3333(4)", "x").unwrap();
        assert!((v - 0.3333).abs() < 1e-9);
    }

    #[test]
    fn test_parse_cif_missing_cell_fails() {
        let content = r#"
data_broken
loop_
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Na 0.0 0.0 0.0
"#;
        assert!(parse_cif_content(content, "broken").is_err());
    }

    #[test]
    fn test_parse_cif_no_atoms_fails() {
        let content = r#"
data_empty
_cell_length_a 5.0
_cell_length_b 5.0
_cell_length_c 5.0
"#;
        assert!(parse_cif_content(content, "empty").is_err());
    }

    #[test]
    fn test_parse_cif_skips_unrelated_loop() {
        let content = r#"
data_SiO2
_cell_length_a 4.913
_cell_length_b 4.913
_cell_length_c 5.405
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 120

loop_
_symmetry_equiv_pos_as_xyz
'x, y, z'

loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Si1 Si 0.4697 0.0 0.0
O1 O 0.4135 0.2669 0.1191
"#;
        let crystal = parse_cif_content(content, "sio2").unwrap();
        assert_eq!(crystal.atoms.len(), 2);
        assert_eq!(crystal.atoms[0].element, "Si");
        assert_eq!(crystal.atoms[1].element, "O");
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("FE2+").as_deref(), Some("Fe"));
        assert_eq!(normalize_symbol("na1").as_deref(), Some("Na"));
        assert_eq!(normalize_symbol("O").as_deref(), Some("O"));
        assert_eq!(normalize_symbol("123"), None);
    }
}
