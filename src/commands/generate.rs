//! # 主流程实现
//!
//! 解析 CIF → 构建超胞 → 统计组成 → 选择赝势 →
//! 写出 SCF / NSCF / lobsterin 输入文件。
//!
//! ## 输出布局（以结构化学式为根目录）
//! ```text
//! Fe2O3/
//!   ├── Fe.pbe.UPF            (选中的赝势)
//!   ├── O.pbe.UPF
//!   ├── Fe2O3.cif             (原始 CIF 的副本)
//!   ├── pw.scf.in             (SCF)
//!   └── remove_sym/
//!         ├── pw.scf.in       (NSCF，去对称重启)
//!         └── lobsterin       (成键分析输入)
//! ```
//!
//! 中途失败时已写出的文件保持原样，不做回滚。
//!
//! ## 依赖关系
//! - 使用 `cli.rs` 定义的参数
//! - 使用 `parsers/cif.rs`, `pseudo/selector.rs`, `qe/`
//! - 使用 `utils/output.rs`

use crate::cli::Cli;
use crate::error::{Cif2QeError, Result};
use crate::models::{ElementCount, PpSelection};
use crate::parsers::cif;
use crate::pseudo::{select_pseudopotentials, SelectorConfig};
use crate::qe::{self, input::KSPACING, lobster};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 组成 / 赝势摘要行
#[derive(Debug, Clone, Tabled)]
struct SpeciesRow {
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "Atoms")]
    atoms: usize,
    #[tabled(rename = "Pseudopotential")]
    pseudopotential: String,
    #[tabled(rename = "n_AOs")]
    n_aos: u32,
    #[tabled(rename = "n_el")]
    n_el: u32,
}

/// 执行主流程
pub fn execute(args: Cli) -> Result<()> {
    output::print_header("Generating Quantum ESPRESSO input deck");

    let crystal = cif::parse_cif_file(&args.cif)?;
    output::print_info(&format!(
        "Read '{}' ({} atoms)",
        args.cif.display(),
        crystal.atoms.len()
    ));

    let sc = args.sc;
    let crystal = crystal.supercell(sc.sx, sc.sy, sc.sz);
    if (sc.sx, sc.sy, sc.sz) != (1, 1, 1) {
        output::print_info(&format!(
            "Expanded to {}x{}x{} supercell ({} atoms)",
            sc.sx,
            sc.sy,
            sc.sz,
            crystal.atoms.len()
        ));
    }

    let inventory = crystal.element_inventory();
    let run_name = crystal.formula();
    let run_dir = PathBuf::from(&run_name);
    let remove_sym_dir = run_dir.join("remove_sym");

    fs::create_dir_all(&remove_sym_dir).map_err(|e| Cif2QeError::FileWriteError {
        path: remove_sym_dir.display().to_string(),
        source: e,
    })?;

    let config = SelectorConfig {
        pp_dir: &args.pp_dir,
        stage_dir: &run_dir,
        max_valence: args.max_valence,
        use_polarization: args.use_polarization,
    };
    let selection = select_pseudopotentials(&config, &inventory)?;

    // 原始 CIF 的副本随输入文件归档
    let cif_copy = run_dir.join(format!("{}.cif", run_name));
    fs::copy(&args.cif, &cif_copy).map_err(|e| Cif2QeError::FileWriteError {
        path: cif_copy.display().to_string(),
        source: e,
    })?;

    let counts = qe::band_counts(&inventory, &selection)?;
    let scf = qe::PwInput::scf(&run_name, &counts, args.metal);
    let nscf = scf.to_nscf();

    write_text(
        &run_dir.join("pw.scf.in"),
        &qe::generate_pw_input(&scf, &crystal, &selection, KSPACING)?,
    )?;
    write_text(
        &remove_sym_dir.join("pw.scf.in"),
        &qe::generate_pw_input(&nscf, &crystal, &selection, KSPACING)?,
    )?;
    write_text(
        &remove_sym_dir.join("lobsterin"),
        &lobster::generate_lobsterin(&selection),
    )?;

    print_summary(&inventory, &selection);
    output::print_info(&format!(
        "nbnd = {}, valence electrons = {}, nspin = {}",
        counts.n_bands,
        counts.n_el_tot,
        counts.nspin()
    ));
    output::print_done(&format!("Input deck written to '{}'", run_dir.display()));

    Ok(())
}

/// 打印组成 / 赝势摘要表
fn print_summary(inventory: &[ElementCount], selection: &PpSelection) {
    let rows: Vec<SpeciesRow> = inventory
        .iter()
        .filter_map(|element| {
            selection.get(&element.symbol).map(|choice| SpeciesRow {
                element: element.symbol.clone(),
                atoms: element.count,
                pseudopotential: choice.file_name.clone(),
                n_aos: choice.n_aos,
                n_el: choice.n_el,
            })
        })
        .collect();

    let table = Table::new(&rows);
    println!("{}", table);
}

/// 写出文本文件，失败时附带路径上下文
fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Cif2QeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
