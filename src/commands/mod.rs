//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `symmetry/`, `kpath/`, `utils/`
//! - 子模块: path, explicit, batch, cases

pub mod batch;
pub mod cases;
pub mod explicit;
pub mod path;

use crate::cli::options::EngineArgs;
use crate::cli::Commands;
use bandpath::error::{BandpathError, Result};
use bandpath::parsers::{self, StructureInput};
use bandpath::symmetry::{PrecomputedOracle, StandardizedCellOracle, SymmetryOracle};

use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Path(args) => path::execute(args),
        Commands::Explicit(args) => explicit::execute(args),
        Commands::Batch(args) => batch::execute(args),
        Commands::Cases { template_dir } => cases::execute(template_dir.as_deref()),
    }
}

/// 读入结构并选择对称性 oracle
///
/// 优先级：输入文件中的 `symmetry` > 命令行 `--spacegroup` > 输入文件中的 `spacegroup`
pub fn load_structure(
    input: &Path,
    engine: &EngineArgs,
) -> Result<(StructureInput, Box<dyn SymmetryOracle>)> {
    let structure = parsers::parse_structure_file(input)?;

    let oracle: Box<dyn SymmetryOracle> = match (&structure.symmetry, engine.spacegroup) {
        (Some(info), _) => Box::new(PrecomputedOracle::new(info.clone())?),
        (None, Some(spacegroup)) => Box::new(StandardizedCellOracle::new(spacegroup)),
        (None, None) => match structure.spacegroup {
            Some(spacegroup) => Box::new(StandardizedCellOracle::new(spacegroup)),
            None => {
                return Err(BandpathError::InvalidArgument(format!(
                    "no space group for '{}': pass --spacegroup or provide 'spacegroup'/'symmetry' in a JSON input",
                    input.display()
                )))
            }
        },
    };

    Ok((structure, oracle))
}

/// 以缩进 JSON 写出
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| BandpathError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// 坐标格式化
pub fn format_coord(x: f64, precision: usize) -> String {
    // 避免打印 -0.000000
    let x = if x.abs() < 0.5 * 10f64.powi(-(precision as i32)) { 0.0 } else { x };
    format!("{:.*}", precision, x)
}
