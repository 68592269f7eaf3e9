//! # LOBSTER 成键分析输入写出
//!
//! 固定模板（能量窗口、投影保存、基组标识）加上每个元素一行
//! `basisfunctions`，列出所选赝势的价壳层（空格分隔）。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 使用 `models/pseudo.rs`

use crate::models::PpSelection;

/// 生成 lobsterin 文本
pub fn generate_lobsterin(selection: &PpSelection) -> String {
    let mut out = String::from(
        "cohpstartenergy -1\n\
         cohpendenergy 1\n\
         cohpsteps 2\n\
         \n\
         saveprojectiontofile\n\
         skipmadelungenergy\n\
         \n\
         basisset pbevaspfit2015\n\
         \n",
    );

    for (symbol, choice) in selection.iter() {
        out.push_str(&format!(
            "basisfunctions {} {}\n",
            symbol,
            choice.shell_list().replace(',', " ")
        ));
    }

    out
}
