//! # explicit 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/explicit.rs`

use super::options::EngineArgs;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 显式路径输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExplicitFormat {
    /// One row per k-point
    Csv,
    /// Full result including the path data
    Json,
}

/// explicit 子命令参数
#[derive(Args, Debug)]
pub struct ExplicitArgs {
    /// Input structure file (POSCAR/CONTCAR/*.vasp or *.json)
    pub input: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Output file
    #[arg(short, long, default_value = "kpath.csv")]
    pub output: PathBuf,

    /// Output format (inferred from the output extension if omitted)
    #[arg(short, long, value_enum)]
    pub format: Option<ExplicitFormat>,
}
