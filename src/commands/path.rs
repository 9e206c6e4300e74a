//! # path 命令实现
//!
//! ## 功能
//! - 读取结构并计算高对称点与推荐路径
//! - 终端表格输出，或 JSON 输出
//! - 可选写出原胞 POSCAR
//!
//! ## 依赖关系
//! - 使用 `cli/path.rs` 定义的参数
//! - 使用 `kpath::get_path`, `parsers/poscar.rs`
//! - 使用 `utils/output.rs`

use super::{format_coord, load_structure, write_json};
use crate::cli::path::PathArgs;
use crate::utils::output;
use bandpath::error::Result;
use bandpath::models::Crystal;
use bandpath::parsers::poscar;
use bandpath::{get_path, KPathResult};

use std::path::Path;
use tabled::{Table, Tabled};

/// 高对称点表格行
#[derive(Debug, Clone, Tabled)]
struct PointRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "k1")]
    k1: String,
    #[tabled(rename = "k2")]
    k2: String,
    #[tabled(rename = "k3")]
    k3: String,
}

/// 路径段表格行
#[derive(Debug, Clone, Tabled)]
struct SegmentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
}

/// 执行 path 命令
pub fn execute(args: PathArgs) -> Result<()> {
    let (input, oracle) = load_structure(&args.input, &args.engine)?;
    let result = get_path(&input.structure, oracle.as_ref(), &args.engine.to_options())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_header(&format!("k-path for {}", input.name));
        print_summary(&result);
    }

    if let Some(out) = &args.output {
        write_json(out, &result)?;
        if !args.json {
            output::print_success(&format!("Result written to '{}'", out.display()));
        }
    }

    if let Some(out) = &args.poscar {
        write_primitive_poscar(out, &input.name, &result)?;
        if !args.json {
            output::print_success(&format!("Primitive cell written to '{}'", out.display()));
        }
    }

    Ok(())
}

/// 打印计算摘要
pub fn print_summary(result: &KPathResult) {
    output::print_field(
        "Space group",
        format!("{} ({})", result.spacegroup_number, result.spacegroup_international),
    );
    output::print_field("Bravais lattice", result.bravais_lattice);
    output::print_field("Extended case", result.bravais_lattice_extended);
    output::print_field("Inversion symmetry", yes_no(result.has_inversion_symmetry));
    output::print_field("Augmented path", yes_no(result.augmented_path));
    output::print_field("Primitive atoms", result.primitive_positions.len());
    output::print_field(
        "Volume orig/conv",
        format!("{:.4}", result.volume_original_wrt_conv),
    );
    output::print_field(
        "Volume orig/prim",
        format!("{:.4}", result.volume_original_wrt_prim),
    );
    output::print_diagnostics(&result.edge_case_diagnostics);

    let points: Vec<PointRow> = result
        .point_coords
        .iter()
        .map(|(label, c)| PointRow {
            label: label.clone(),
            k1: format_coord(c[0], 6),
            k2: format_coord(c[1], 6),
            k3: format_coord(c[2], 6),
        })
        .collect();
    println!("\n{}", Table::new(points));

    let segments: Vec<SegmentRow> = result
        .path
        .iter()
        .enumerate()
        .map(|(i, (from, to))| SegmentRow {
            index: i + 1,
            from: from.clone(),
            to: to.clone(),
        })
        .collect();
    println!("\n{}\n", Table::new(segments));
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// 写出原胞 POSCAR
pub fn write_primitive_poscar(path: &Path, name: &str, result: &KPathResult) -> Result<()> {
    let structure = result.primitive_structure()?;
    let crystal = Crystal::from_structure(
        format!("{} primitive cell ({})", name, result.bravais_lattice_extended),
        &structure,
    );
    poscar::write_poscar_file(path, &crystal)
}
