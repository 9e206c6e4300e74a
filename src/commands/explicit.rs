//! # explicit 命令实现
//!
//! 计算显式 k 点序列并写出 CSV 或 JSON。
//! CSV 每行一个 k 点：下标、标签、一维坐标、分数坐标、笛卡尔坐标。
//!
//! ## 依赖关系
//! - 使用 `cli/explicit.rs` 定义的参数
//! - 使用 `kpath::get_explicit_k_path`
//! - 使用 `utils/output.rs`

use super::{format_coord, load_structure, write_json};
use crate::cli::explicit::{ExplicitArgs, ExplicitFormat};
use crate::utils::output;
use bandpath::error::{BandpathError, Result};
use bandpath::{get_explicit_k_path, ExplicitKPathResult};

use std::path::Path;
use tabled::{Table, Tabled};

/// 路径段表格行
#[derive(Debug, Clone, Tabled)]
struct SegmentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Points")]
    points: usize,
    #[tabled(rename = "Length (1/Å)")]
    length: String,
}

/// 执行 explicit 命令
pub fn execute(args: ExplicitArgs) -> Result<()> {
    output::print_header("Explicit k-point path");

    let (input, oracle) = load_structure(&args.input, &args.engine)?;
    let result = get_explicit_k_path(&input.structure, oracle.as_ref(), &args.engine.to_options())?;

    output::print_field("Structure", &input.name);
    output::print_field(
        "Space group",
        format!(
            "{} ({})",
            result.path.spacegroup_number, result.path.spacegroup_international
        ),
    );
    output::print_field("Extended case", result.path.bravais_lattice_extended);
    output::print_field("Reference distance", args.engine.reference_distance);
    output::print_diagnostics(&result.path.edge_case_diagnostics);

    let rows: Vec<SegmentRow> = result
        .explicit_segments
        .iter()
        .enumerate()
        .map(|(i, &(start, end))| SegmentRow {
            index: i + 1,
            from: result.explicit_kpoints_labels[start].clone(),
            to: result.explicit_kpoints_labels[end - 1].clone(),
            points: end - start,
            length: format!(
                "{:.4}",
                result.explicit_kpoints_linearcoord[end - 1]
                    - result.explicit_kpoints_linearcoord[start]
            ),
        })
        .collect();
    println!("\n{}\n", Table::new(rows));

    let format = args.format.unwrap_or_else(|| infer_format(&args.output));
    match format {
        ExplicitFormat::Csv => write_csv(&args.output, &result)?,
        ExplicitFormat::Json => write_json(&args.output, &result)?,
    }

    output::print_done(&format!(
        "{} k-points in {} segments written to '{}'",
        result.explicit_kpoints_rel.len(),
        result.explicit_segments.len(),
        args.output.display()
    ));

    Ok(())
}

fn infer_format(path: &Path) -> ExplicitFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => ExplicitFormat::Json,
        _ => ExplicitFormat::Csv,
    }
}

/// 写出 CSV
pub fn write_csv(path: &Path, result: &ExplicitKPathResult) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "index", "label", "linearcoord", "k1", "k2", "k3", "kx", "ky", "kz",
    ])?;

    for i in 0..result.explicit_kpoints_rel.len() {
        let rel = result.explicit_kpoints_rel[i];
        let abs = result.explicit_kpoints_abs[i];
        wtr.write_record([
            i.to_string(),
            result.explicit_kpoints_labels[i].clone(),
            format!("{:.8}", result.explicit_kpoints_linearcoord[i]),
            format_coord(rel[0], 10),
            format_coord(rel[1], 10),
            format_coord(rel[2], 10),
            format_coord(abs[0], 10),
            format_coord(abs[1], 10),
            format_coord(abs[2], 10),
        ])?;
    }

    wtr.flush().map_err(|e| BandpathError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
