//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。cif2qe 只有一个命令，
//! 参数直接挂在顶层 `Cli` 上。
//!
//! ## 参数
//! - `CIF`: 输入结构文件路径（必需）
//! - `--sc "x y z"`: 对角超胞倍数，解析期校验为正整数
//! - `--metal`: 金属体系，启用展宽占据
//! - `--max-valence`: 跳过交互，总是选取原子轨道数最多的赝势
//! - `--use-polarization`: 计入零占据的极化壳层
//! - `--pp-dir`: 赝势目录，可由环境变量 `PP_DIR` 提供
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 参数传递给 `commands/generate.rs`

use clap::Parser;
use std::path::PathBuf;

/// cif2qe - Generate Quantum ESPRESSO and LOBSTER input decks from CIF structures
#[derive(Parser, Debug)]
#[command(name = "cif2qe")]
#[command(version)]
#[command(about = "Generate Quantum ESPRESSO and LOBSTER input decks from CIF structures", long_about = None)]
pub struct Cli {
    /// Path to the input CIF structure file
    pub cif: PathBuf,

    /// Supercell multipliers along the lattice vectors, e.g. "2 2 1"
    #[arg(long, default_value = "1 1 1", value_parser = parse_supercell)]
    pub sc: Supercell,

    /// Treat the system as metallic (cold-smearing occupations)
    #[arg(long, default_value_t = false)]
    pub metal: bool,

    /// Always pick the candidate with the most atomic orbitals, no prompts
    #[arg(long, alias = "max_valence", default_value_t = false)]
    pub max_valence: bool,

    /// Include zero-occupation polarization shells in orbital/electron counts
    #[arg(long, alias = "use_polarization", default_value_t = false)]
    pub use_polarization: bool,

    /// Directory containing pseudopotential files
    #[arg(long, env = "PP_DIR")]
    pub pp_dir: PathBuf,
}

/// 对角超胞倍数（只支持沿晶格矢量的整数倍复制）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supercell {
    pub sx: u32,
    pub sy: u32,
    pub sz: u32,
}

/// 解析 `--sc "x y z"`，三个正整数，空白分隔
fn parse_supercell(s: &str) -> Result<Supercell, String> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(format!(
            "expected three whitespace-separated integers, got '{}'",
            s
        ));
    }

    let mut values = [0u32; 3];
    for (i, part) in parts.iter().enumerate() {
        let v: u32 = part
            .parse()
            .map_err(|_| format!("'{}' is not a valid integer multiplier", part))?;
        if v == 0 {
            return Err("supercell multipliers must be positive".to_string());
        }
        values[i] = v;
    }

    Ok(Supercell {
        sx: values[0],
        sy: values[1],
        sz: values[2],
    })
}
