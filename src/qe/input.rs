//! # pw.x 输入文件组装与写出
//!
//! 由结构、元素组成与赝势选择计算能带数 / 总价电子数 / 自旋通道，
//! 组装 SCF 输入配置并派生去对称的 NSCF 重启配置，
//! 最后写出完整的 pw.x 输入文本（namelist + 卡片）。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 使用 `models/`, `qe/kpoints.rs`, `utils/elements.rs`

use crate::error::{Cif2QeError, Result};
use crate::models::{Crystal, ElementCount, PpSelection};
use crate::qe::kpoints::kspacing_to_grid;
use crate::utils::elements::atomic_mass;

/// 平面波截断能 (Ry)
pub const ECUTWFC_RY: f64 = 60.0;

/// SCF 收敛阈值
pub const CONV_THR: f64 = 1.0e-10;

/// 电子步数上限
pub const ELECTRON_MAXSTEP: u32 = 100;

/// 金属体系的展宽宽度 (Ry)
pub const DEGAUSS_RY: f64 = 0.01;

/// k 点间距 (1/Å)
pub const KSPACING: f64 = 0.025;

/// &CONTROL namelist
#[derive(Debug, Clone)]
pub struct ControlSection {
    pub calculation: String,
    pub prefix: String,
    pub outdir: String,
    pub wf_collect: bool,
    pub pseudo_dir: String,
}

/// 金属占据处理参数（cold smearing）
#[derive(Debug, Clone)]
pub struct SmearingParams {
    pub smearing: String,
    pub degauss: f64,
}

/// &SYSTEM namelist
#[derive(Debug, Clone)]
pub struct SystemSection {
    pub nosym: bool,
    pub ecutwfc: f64,
    pub nbnd: u32,
    pub nspin: u32,
    pub smearing: Option<SmearingParams>,
}

/// &ELECTRONS namelist：SCF 求解参数，或 NSCF 从文件重启
#[derive(Debug, Clone)]
pub enum ElectronsSection {
    Scf { conv_thr: f64, electron_maxstep: u32 },
    RestartFromFile,
}

/// 一份完整的 pw.x 输入配置
#[derive(Debug, Clone)]
pub struct PwInput {
    pub control: ControlSection,
    pub system: SystemSection,
    pub electrons: ElectronsSection,
}

/// 能带 / 电子数统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandCounts {
    /// n_bands = Σ 元素原子数 × 该元素赝势的 n_aos
    pub n_bands: u32,

    /// n_el_tot = Σ 元素原子数 × 该元素赝势的 n_el
    pub n_el_tot: u32,
}

impl BandCounts {
    /// 自旋通道数：总价电子数为偶取 1（闭壳层），为奇取 2
    pub fn nspin(&self) -> u32 {
        if self.n_el_tot % 2 == 0 {
            1
        } else {
            2
        }
    }
}

/// 按元素组成加权统计能带数与总价电子数。
/// 组成清单中的元素缺少赝势选择时报错（每个元素必须恰有一个选择）。
pub fn band_counts(inventory: &[ElementCount], selection: &PpSelection) -> Result<BandCounts> {
    let mut n_bands: u32 = 0;
    let mut n_el_tot: u32 = 0;

    for element in inventory {
        let choice =
            selection
                .get(&element.symbol)
                .ok_or_else(|| Cif2QeError::NoPseudopotential {
                    element: element.symbol.clone(),
                })?;
        n_bands += element.count as u32 * choice.n_aos;
        n_el_tot += element.count as u32 * choice.n_el;
    }

    Ok(BandCounts { n_bands, n_el_tot })
}

impl PwInput {
    /// SCF 输入：对称开启，固定截断能与收敛参数；
    /// `metal` 开启 cold smearing 占据
    pub fn scf(prefix: &str, counts: &BandCounts, metal: bool) -> PwInput {
        let smearing = if metal {
            Some(SmearingParams {
                smearing: "cold".to_string(),
                degauss: DEGAUSS_RY,
            })
        } else {
            None
        };

        PwInput {
            control: ControlSection {
                calculation: "scf".to_string(),
                prefix: prefix.to_string(),
                outdir: "./".to_string(),
                wf_collect: true,
                pseudo_dir: "./".to_string(),
            },
            system: SystemSection {
                nosym: false,
                ecutwfc: ECUTWFC_RY,
                nbnd: counts.n_bands,
                nspin: counts.nspin(),
                smearing,
            },
            electrons: ElectronsSection::Scf {
                conv_thr: CONV_THR,
                electron_maxstep: ELECTRON_MAXSTEP,
            },
        }
    }

    /// 派生 NSCF 重启输入：关闭对称，电子密度从先前计算读取
    pub fn to_nscf(&self) -> PwInput {
        let mut nscf = self.clone();
        nscf.control.calculation = "nscf".to_string();
        nscf.system.nosym = true;
        nscf.electrons = ElectronsSection::RestartFromFile;
        nscf
    }
}

/// 生成完整的 pw.x 输入文本
pub fn generate_pw_input(
    input: &PwInput,
    crystal: &Crystal,
    selection: &PpSelection,
    kspacing: f64,
) -> Result<String> {
    let inventory = crystal.element_inventory();
    let mut out = String::new();

    write_control(&mut out, &input.control);
    write_system(&mut out, &input.system, crystal.atoms.len(), inventory.len());
    write_electrons(&mut out, &input.electrons);
    write_atomic_species(&mut out, &inventory, selection)?;
    write_atomic_positions(&mut out, crystal);
    write_kpoints(&mut out, crystal, kspacing);
    write_cell_parameters(&mut out, crystal);

    Ok(out)
}

fn fortran_bool(b: bool) -> &'static str {
    if b {
        ".true."
    } else {
        ".false."
    }
}

fn write_control(out: &mut String, control: &ControlSection) {
    out.push_str("&CONTROL\n");
    out.push_str(&format!("   calculation      = '{}'\n", control.calculation));
    out.push_str(&format!("   prefix           = '{}'\n", control.prefix));
    out.push_str(&format!("   outdir           = '{}'\n", control.outdir));
    out.push_str(&format!(
        "   wf_collect       = {}\n",
        fortran_bool(control.wf_collect)
    ));
    out.push_str(&format!("   pseudo_dir       = '{}'\n", control.pseudo_dir));
    out.push_str("/\n");
}

fn write_system(out: &mut String, system: &SystemSection, nat: usize, ntyp: usize) {
    out.push_str("&SYSTEM\n");
    out.push_str("   ibrav            = 0\n");
    out.push_str(&format!("   nat              = {}\n", nat));
    out.push_str(&format!("   ntyp             = {}\n", ntyp));
    out.push_str(&format!(
        "   nosym            = {}\n",
        fortran_bool(system.nosym)
    ));
    out.push_str(&format!("   ecutwfc          = {}\n", system.ecutwfc));
    out.push_str(&format!("   nbnd             = {}\n", system.nbnd));
    out.push_str(&format!("   nspin            = {}\n", system.nspin));

    if let Some(ref smearing) = system.smearing {
        out.push_str("   occupations      = 'smearing'\n");
        out.push_str(&format!("   smearing         = '{}'\n", smearing.smearing));
        out.push_str(&format!("   degauss          = {}\n", smearing.degauss));
    }

    out.push_str("/\n");
}

fn write_electrons(out: &mut String, electrons: &ElectronsSection) {
    out.push_str("&ELECTRONS\n");
    match electrons {
        ElectronsSection::Scf {
            conv_thr,
            electron_maxstep,
        } => {
            out.push_str(&format!("   conv_thr         = {:e}\n", conv_thr));
            out.push_str(&format!("   electron_maxstep = {}\n", electron_maxstep));
        }
        ElectronsSection::RestartFromFile => {
            out.push_str("   startingpot      = 'file'\n");
        }
    }
    out.push_str("/\n\n");
}

fn write_atomic_species(
    out: &mut String,
    inventory: &[ElementCount],
    selection: &PpSelection,
) -> Result<()> {
    out.push_str("ATOMIC_SPECIES\n");
    for element in inventory {
        let mass =
            atomic_mass(&element.symbol).ok_or_else(|| Cif2QeError::UnknownElement {
                element: element.symbol.clone(),
            })?;
        let choice =
            selection
                .get(&element.symbol)
                .ok_or_else(|| Cif2QeError::NoPseudopotential {
                    element: element.symbol.clone(),
                })?;
        out.push_str(&format!(
            "{} {} {}\n",
            element.symbol, mass, choice.file_name
        ));
    }
    out.push('\n');

    Ok(())
}

fn write_atomic_positions(out: &mut String, crystal: &Crystal) {
    // 晶体（分数）坐标
    out.push_str("ATOMIC_POSITIONS {crystal}\n");
    for atom in &crystal.atoms {
        out.push_str(&format!(
            "{:3} {:16.10} {:16.10} {:16.10}\n",
            atom.element, atom.position[0], atom.position[1], atom.position[2]
        ));
    }
    out.push('\n');
}

fn write_kpoints(out: &mut String, crystal: &Crystal, kspacing: f64) {
    let grid = kspacing_to_grid(&crystal.lattice, kspacing);
    out.push_str("K_POINTS {automatic}\n");
    out.push_str(&format!("{} {} {} 0 0 0\n\n", grid[0], grid[1], grid[2]));
}

fn write_cell_parameters(out: &mut String, crystal: &Crystal) {
    out.push_str("CELL_PARAMETERS {angstrom}\n");
    for row in &crystal.lattice.matrix {
        out.push_str(&format!(
            "{:16.10} {:16.10} {:16.10}\n",
            row[0], row[1], row[2]
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice, PpCandidate};

    fn selection_for(symbol: &str, n_aos: u32, n_el: u32) -> PpSelection {
        let mut selection = PpSelection::new();
        selection.insert(
            symbol,
            PpCandidate {
                file_name: format!("{}.pbe.UPF", symbol),
                shells: vec!["3s".to_string(), "3p".to_string()],
                n_aos,
                n_el,
            },
        );
        selection
    }

    fn two_atom_crystal(symbol: &str) -> Crystal {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        Crystal::new(
            symbol,
            lattice,
            vec![
                Atom::new(symbol, [0.0, 0.0, 0.0]),
                Atom::new(symbol, [0.5, 0.5, 0.5]),
            ],
        )
    }

    #[test]
    fn test_band_counts_even_electrons() {
        // 2 个原子，n_aos=9, n_el=4 -> nbnd=18, n_el_tot=8, nspin=1
        let inventory = vec![ElementCount {
            symbol: "Si".to_string(),
            count: 2,
        }];
        let selection = selection_for("Si", 9, 4);

        let counts = band_counts(&inventory, &selection).unwrap();
        assert_eq!(counts.n_bands, 18);
        assert_eq!(counts.n_el_tot, 8);
        assert_eq!(counts.nspin(), 1);
    }

    #[test]
    fn test_band_counts_odd_electrons_open_shell() {
        // 3 个原子，每原子 5 个电子 -> 15，开壳层 nspin=2
        let inventory = vec![ElementCount {
            symbol: "P".to_string(),
            count: 3,
        }];
        let selection = selection_for("P", 9, 5);

        let counts = band_counts(&inventory, &selection).unwrap();
        assert_eq!(counts.n_el_tot, 15);
        assert_eq!(counts.nspin(), 2);
    }

    #[test]
    fn test_band_counts_missing_choice_fails() {
        let inventory = vec![ElementCount {
            symbol: "Fe".to_string(),
            count: 1,
        }];
        let selection = PpSelection::new();

        let err = band_counts(&inventory, &selection).unwrap_err();
        assert!(matches!(err, Cif2QeError::NoPseudopotential { .. }));
    }

    #[test]
    fn test_scf_input_content() {
        let crystal = two_atom_crystal("Si");
        let selection = selection_for("Si", 9, 4);
        let counts = band_counts(&crystal.element_inventory(), &selection).unwrap();

        let scf = PwInput::scf("Si2", &counts, false);
        let text = generate_pw_input(&scf, &crystal, &selection, KSPACING).unwrap();

        assert!(text.contains("calculation      = 'scf'"));
        assert!(text.contains("prefix           = 'Si2'"));
        assert!(text.contains("wf_collect       = .true."));
        assert!(text.contains("nosym            = .false."));
        assert!(text.contains("ecutwfc          = 60"));
        assert!(text.contains("nbnd             = 18"));
        assert!(text.contains("nspin            = 1"));
        assert!(text.contains("conv_thr         = 1e-10"));
        assert!(text.contains("electron_maxstep = 100"));
        assert!(text.contains("nat              = 2"));
        assert!(text.contains("ntyp             = 1"));
        assert!(text.contains("Si 28.085 Si.pbe.UPF"));
        assert!(text.contains("ATOMIC_POSITIONS {crystal}"));
        assert!(text.contains("K_POINTS {automatic}"));
        assert!(text.contains("51 51 51 0 0 0"));
        assert!(text.contains("CELL_PARAMETERS {angstrom}"));
        // 非金属：不写展宽参数
        assert!(!text.contains("occupations"));
        assert!(!text.contains("degauss"));
    }

    #[test]
    fn test_scf_input_metal_smearing() {
        let counts = BandCounts {
            n_bands: 18,
            n_el_tot: 8,
        };
        let crystal = two_atom_crystal("Si");
        let selection = selection_for("Si", 9, 4);

        let scf = PwInput::scf("Si2", &counts, true);
        let text = generate_pw_input(&scf, &crystal, &selection, KSPACING).unwrap();

        assert!(text.contains("occupations      = 'smearing'"));
        assert!(text.contains("smearing         = 'cold'"));
        assert!(text.contains("degauss          = 0.01"));
    }

    #[test]
    fn test_nscf_derived_from_scf() {
        let counts = BandCounts {
            n_bands: 18,
            n_el_tot: 8,
        };
        let crystal = two_atom_crystal("Si");
        let selection = selection_for("Si", 9, 4);

        let nscf = PwInput::scf("Si2", &counts, false).to_nscf();
        let text = generate_pw_input(&nscf, &crystal, &selection, KSPACING).unwrap();

        assert!(text.contains("calculation      = 'nscf'"));
        assert!(text.contains("nosym            = .true."));
        assert!(text.contains("startingpot      = 'file'"));
        // NSCF 的 &ELECTRONS 只含重启参数
        assert!(!text.contains("conv_thr"));
        assert!(!text.contains("electron_maxstep"));
        // 能带数等系统参数保持不变
        assert!(text.contains("nbnd             = 18"));
    }

    #[test]
    fn test_unknown_element_mass_fails() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let crystal = Crystal::new("Xx", lattice, vec![Atom::new("Xx", [0.0, 0.0, 0.0])]);
        let selection = selection_for("Xx", 1, 1);
        let scf = PwInput::scf(
            "Xx",
            &BandCounts {
                n_bands: 1,
                n_el_tot: 1,
            },
            false,
        );

        let err = generate_pw_input(&scf, &crystal, &selection, KSPACING).unwrap_err();
        assert!(matches!(err, Cif2QeError::UnknownElement { .. }));
    }
}
