//! # batch 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/batch.rs`

use super::options::EngineArgs;
use clap::Args;
use std::path::PathBuf;

/// batch 子命令参数
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory containing structure files
    pub input_dir: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// File name patterns, comma separated
    #[arg(short, long, default_value = "POSCAR*,CONTCAR*,*.vasp,*.json")]
    pub pattern: String,

    /// Search subdirectories recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Output directory for the JSON results (default: next to each input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Also compute the explicit k-point list
    #[arg(long, default_value_t = false)]
    pub explicit: bool,

    /// Number of parallel jobs (0 = number of CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing result files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
