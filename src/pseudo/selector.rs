//! # 赝势选择器
//!
//! 对每个元素：列出赝势目录中文件名形如 `<符号>.*` 的候选，
//! 解析价电子组态，按原子轨道数排序，自动（`--max-valence`）
//! 或交互式选定一个，并把选中的文件复制到运行输出目录。
//!
//! ## 选择规则
//! - 候选按文件名排序，保证确定性
//! - 最大 n_aos 胜出；并列时取排序后最靠前的候选（严格大于扫描）
//! - 交互输入的有效范围是 [1, 候选数]，其余输入一律重新提示
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 使用 `parsers/pseudo.rs`, `models/`, `utils/output.rs`
//! - 使用 `walkdir`, `glob`, `tabled` crate

use crate::error::{Cif2QeError, Result};
use crate::models::{ElementCount, PpCandidate, PpSelection};
use crate::parsers::pseudo::parse_pseudo_file;
use crate::utils::output;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use walkdir::WalkDir;

/// 选择器配置：赝势目录是显式传入的配置值，而非全局状态
#[derive(Debug, Clone, Copy)]
pub struct SelectorConfig<'a> {
    /// 赝势源目录
    pub pp_dir: &'a Path,

    /// 运行输出目录，选中的赝势复制到这里
    pub stage_dir: &'a Path,

    /// 跳过交互，总是选取原子轨道数最多的候选
    pub max_valence: bool,

    /// 计入零占据的极化壳层
    pub use_polarization: bool,
}

/// 候选列表行
#[derive(Debug, Clone, Tabled)]
struct CandidateRow {
    #[tabled(rename = "No.")]
    number: usize,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Valence shells")]
    shells: String,
    #[tabled(rename = "n_AOs")]
    n_aos: u32,
    #[tabled(rename = "n_el")]
    n_el: u32,
}

/// 为组成清单中的每个元素选择一个赝势（交互输入来自 stdin）
pub fn select_pseudopotentials(
    config: &SelectorConfig,
    inventory: &[ElementCount],
) -> Result<PpSelection> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    select_with_reader(config, inventory, &mut reader)
}

/// 与 `select_pseudopotentials` 相同，但交互输入来自任意 `BufRead`，
/// 便于用脚本化输入做测试
pub fn select_with_reader<R: BufRead>(
    config: &SelectorConfig,
    inventory: &[ElementCount],
    reader: &mut R,
) -> Result<PpSelection> {
    if !config.pp_dir.is_dir() {
        return Err(Cif2QeError::DirectoryNotFound {
            path: config.pp_dir.display().to_string(),
        });
    }

    let mut selection = PpSelection::new();

    for element in inventory {
        let files = collect_candidate_files(config.pp_dir, &element.symbol)?;
        if files.is_empty() {
            return Err(Cif2QeError::NoPseudopotential {
                element: element.symbol.clone(),
            });
        }

        let candidates: Vec<PpCandidate> = files
            .iter()
            .map(|path| parse_pseudo_file(path, config.use_polarization))
            .collect::<Result<_>>()?;

        let best = index_of_max_aos(&candidates);

        let chosen = if config.max_valence {
            output::print_info(&format!(
                "{}: auto-selected '{}' (n_AOs: {}, n_el: {})",
                element.symbol, candidates[best].file_name, candidates[best].n_aos,
                candidates[best].n_el
            ));
            best
        } else {
            print_candidate_table(&element.symbol, &candidates, best);
            let picked = prompt_selection(reader, candidates.len())?;
            output::print_info(&format!(
                "{}: selected '{}'",
                element.symbol, candidates[picked].file_name
            ));
            picked
        };

        stage_file(&files[chosen], config.stage_dir)?;
        selection.insert(element.symbol.clone(), candidates[chosen].clone());
    }

    Ok(selection)
}

/// 列出赝势目录下文件名匹配 `<符号>.*` 的常规文件，按名称排序。
/// 符号后紧跟字面量点，因此 "Fe" 的候选不会混入 "Fer" 的文件。
fn collect_candidate_files(pp_dir: &Path, symbol: &str) -> Result<Vec<PathBuf>> {
    let pattern = glob::Pattern::new(&format!("{}.*", symbol)).map_err(|e| {
        Cif2QeError::InvalidArgument(format!("invalid element symbol '{}': {}", symbol, e))
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(pp_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            if let Some(name) = entry.file_name().to_str() {
                if pattern.matches(name) {
                    files.push(entry.path().to_path_buf());
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// 最大 n_aos 候选的下标；并列时保留最先出现者（严格大于才更新）
fn index_of_max_aos(candidates: &[PpCandidate]) -> usize {
    let mut best = 0;
    let mut max_aos = candidates[0].n_aos;

    for (i, candidate) in candidates.iter().enumerate().skip(1) {
        if candidate.n_aos > max_aos {
            best = i;
            max_aos = candidate.n_aos;
        }
    }

    best
}

/// 打印某元素的候选列表
fn print_candidate_table(symbol: &str, candidates: &[PpCandidate], best: usize) {
    output::print_header(&format!("Pseudopotential candidates for {}", symbol));

    let rows: Vec<CandidateRow> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| CandidateRow {
            number: i + 1,
            file: c.file_name.clone(),
            shells: c.shell_list(),
            n_aos: c.n_aos,
            n_el: c.n_el,
        })
        .collect();

    let table = Table::new(&rows);
    println!("{}", table);

    output::print_info(&format!("Candidate with most atomic orbitals: {}", best + 1));
}

/// 读取一个合法的候选编号（1 起始），返回 0 起始下标。
/// 非法输入（非数字、越界）重新提示，不限次数；
/// 输入流关闭视为致命错误，避免死循环。
fn prompt_selection<R: BufRead>(reader: &mut R, n: usize) -> Result<usize> {
    loop {
        print!("Which pseudopotential should be used? [1-{}]: ", n);
        io::stdout().flush().ok();

        let mut line = String::new();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|e| Cif2QeError::Other(format!("failed to read selection: {}", e)))?;
        if bytes == 0 {
            return Err(Cif2QeError::InputClosed);
        }

        match line.trim().parse::<usize>() {
            Ok(i) if (1..=n).contains(&i) => return Ok(i - 1),
            _ => output::print_warning(&format!(
                "Invalid selection. Please provide a number between 1 and {}.",
                n
            )),
        }
    }
}

/// 把选中的赝势文件复制到运行输出目录
fn stage_file(source: &Path, stage_dir: &Path) -> Result<()> {
    let file_name = source.file_name().ok_or_else(|| {
        Cif2QeError::Other(format!("invalid pseudopotential path: {}", source.display()))
    })?;
    let target = stage_dir.join(file_name);

    fs::copy(source, &target).map_err(|e| Cif2QeError::FileWriteError {
        path: target.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn candidate(name: &str, n_aos: u32) -> PpCandidate {
        PpCandidate {
            file_name: name.to_string(),
            shells: vec!["3d".to_string()],
            n_aos,
            n_el: 6,
        }
    }

    /// 测试用临时目录，Drop 时清理
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(tag: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "cif2qe_{}_{}_{:?}",
                tag,
                std::process::id(),
                std::thread::current().id()
            ));
            fs::create_dir_all(&dir).unwrap();
            ScratchDir(dir)
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    const FE_META: &str = "\
Valence configuration:
nl  pn  l   occ
3D  3   2  6.00
4S  4   0  2.00
Generation configuration:
";

    const FE_META_SMALL: &str = "\
Valence configuration:
nl  pn  l   occ
4S  4   0  2.00
Generation configuration:
";

    #[test]
    fn test_index_of_max_aos_picks_maximum() {
        let candidates = vec![candidate("a", 4), candidate("b", 9), candidate("c", 6)];
        assert_eq!(index_of_max_aos(&candidates), 1);
    }

    #[test]
    fn test_index_of_max_aos_tie_breaks_to_first() {
        let candidates = vec![candidate("a", 9), candidate("b", 9), candidate("c", 4)];
        assert_eq!(index_of_max_aos(&candidates), 0);
    }

    #[test]
    fn test_prompt_selection_valid_first_try() {
        let mut input = Cursor::new("2\n");
        assert_eq!(prompt_selection(&mut input, 3).unwrap(), 1);
    }

    #[test]
    fn test_prompt_selection_reprompts_on_garbage() {
        // 非数字、零、越界都重新提示，最终接受 2
        let mut input = Cursor::new("abc\n0\n99\n2\n");
        assert_eq!(prompt_selection(&mut input, 3).unwrap(), 1);
    }

    #[test]
    fn test_prompt_selection_closed_input_fails() {
        let mut input = Cursor::new("");
        assert!(matches!(
            prompt_selection(&mut input, 3),
            Err(Cif2QeError::InputClosed)
        ));
    }

    #[test]
    fn test_collect_candidate_files_prefix_dot_semantics() {
        let dir = ScratchDir::new("collect");
        for name in ["Fe.pbe.UPF", "Fe.pz.UPF", "Fer.UPF", "F.UPF", "notes.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        let files = collect_candidate_files(dir.path(), "Fe").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        // 排序后只剩精确前缀 "Fe." 的文件
        assert_eq!(names, vec!["Fe.pbe.UPF", "Fe.pz.UPF"]);
    }

    #[test]
    fn test_select_with_reader_interactive() {
        let pp_dir = ScratchDir::new("ppdir_int");
        let stage_dir = ScratchDir::new("stage_int");
        fs::write(pp_dir.path().join("Fe.a.UPF"), FE_META_SMALL).unwrap();
        fs::write(pp_dir.path().join("Fe.b.UPF"), FE_META).unwrap();

        let config = SelectorConfig {
            pp_dir: pp_dir.path(),
            stage_dir: stage_dir.path(),
            max_valence: false,
            use_polarization: false,
        };
        let inventory = vec![ElementCount {
            symbol: "Fe".to_string(),
            count: 2,
        }];

        // 先给一次非法输入，再选第 1 个（排序后为 Fe.a.UPF）
        let mut input = Cursor::new("nope\n1\n");
        let selection = select_with_reader(&config, &inventory, &mut input).unwrap();

        let choice = selection.get("Fe").unwrap();
        assert_eq!(choice.file_name, "Fe.a.UPF");
        assert_eq!(choice.n_aos, 1);
        assert!(stage_dir.path().join("Fe.a.UPF").exists());
    }

    #[test]
    fn test_select_with_reader_max_valence() {
        let pp_dir = ScratchDir::new("ppdir_max");
        let stage_dir = ScratchDir::new("stage_max");
        fs::write(pp_dir.path().join("Fe.a.UPF"), FE_META_SMALL).unwrap();
        fs::write(pp_dir.path().join("Fe.b.UPF"), FE_META).unwrap();

        let config = SelectorConfig {
            pp_dir: pp_dir.path(),
            stage_dir: stage_dir.path(),
            max_valence: true,
            use_polarization: false,
        };
        let inventory = vec![ElementCount {
            symbol: "Fe".to_string(),
            count: 2,
        }];

        // 无交互输入也能完成
        let mut input = Cursor::new("");
        let selection = select_with_reader(&config, &inventory, &mut input).unwrap();

        let choice = selection.get("Fe").unwrap();
        assert_eq!(choice.file_name, "Fe.b.UPF");
        assert_eq!(choice.n_aos, 6);
        assert!(stage_dir.path().join("Fe.b.UPF").exists());
    }

    #[test]
    fn test_select_missing_element_fails() {
        let pp_dir = ScratchDir::new("ppdir_missing");
        let stage_dir = ScratchDir::new("stage_missing");
        fs::write(pp_dir.path().join("Fe.a.UPF"), FE_META).unwrap();

        let config = SelectorConfig {
            pp_dir: pp_dir.path(),
            stage_dir: stage_dir.path(),
            max_valence: true,
            use_polarization: false,
        };
        let inventory = vec![ElementCount {
            symbol: "O".to_string(),
            count: 1,
        }];

        let mut input = Cursor::new("");
        let err = select_with_reader(&config, &inventory, &mut input).unwrap_err();
        assert!(matches!(err, Cif2QeError::NoPseudopotential { .. }));
    }

    #[test]
    fn test_select_missing_pp_dir_fails() {
        let stage_dir = ScratchDir::new("stage_nodir");
        let config = SelectorConfig {
            pp_dir: Path::new("/nonexistent/pp_dir"),
            stage_dir: stage_dir.path(),
            max_valence: true,
            use_polarization: false,
        };

        let mut input = Cursor::new("");
        let err = select_with_reader(&config, &[], &mut input).unwrap_err();
        assert!(matches!(err, Cif2QeError::DirectoryNotFound { .. }));
    }
}
