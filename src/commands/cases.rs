//! # cases 命令实现
//!
//! 列出 29 个扩展 Bravais 情形及其模板规模。
//!
//! ## 依赖关系
//! - 使用 `kpath/template.rs`
//! - 使用 `utils/output.rs`

use crate::utils::output;
use bandpath::error::Result;
use bandpath::kpath::PathTemplate;
use bandpath::ExtendedCase;

use std::path::Path;
use tabled::{Table, Tabled};

/// 情形表格行
#[derive(Debug, Clone, Tabled)]
struct CaseRow {
    #[tabled(rename = "Case")]
    case: String,
    #[tabled(rename = "Bravais")]
    bravais: String,
    #[tabled(rename = "Parameters")]
    parameters: usize,
    #[tabled(rename = "Points")]
    points: usize,
    #[tabled(rename = "Segments")]
    segments: usize,
    #[tabled(rename = "Path")]
    path: String,
}

/// 执行 cases 命令
pub fn execute(template_dir: Option<&Path>) -> Result<()> {
    output::print_header("Extended Bravais lattice cases");

    let rows = ExtendedCase::ALL
        .iter()
        .map(|&case| {
            let template = PathTemplate::load(case, template_dir)?;
            Ok(CaseRow {
                case: case.to_string(),
                bravais: case.bravais().to_string(),
                parameters: template.parameters.len(),
                points: template.points.len(),
                segments: template.path.len(),
                path: describe_path(&template.path),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    println!("{}\n", Table::new(rows));
    Ok(())
}

/// 将路径写成 `GAMMA-X-M|Z-R` 形式
fn describe_path(path: &[(String, String)]) -> String {
    let mut text = String::new();
    let mut last: Option<&str> = None;
    for (start, stop) in path {
        match last {
            Some(prev) if prev == start => {}
            Some(_) => {
                text.push('|');
                text.push_str(start);
            }
            None => text.push_str(start),
        }
        text.push('-');
        text.push_str(stop);
        last = Some(stop);
    }
    text
}
