//! # path 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/path.rs`

use super::options::EngineArgs;
use clap::Args;
use std::path::PathBuf;

/// path 子命令参数
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Input structure file (POSCAR/CONTCAR/*.vasp or *.json)
    pub input: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Print the full result as JSON to stdout instead of tables
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write the full result as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the primitive cell in POSCAR format to this file
    #[arg(long)]
    pub poscar: Option<PathBuf>,
}
