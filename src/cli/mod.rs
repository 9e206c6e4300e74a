//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `path`: 高对称点与推荐路径
//! - `explicit`: 显式 k 点序列
//! - `batch`: 目录批量处理
//! - `cases`: 列出所有扩展情形
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: options, path, explicit, batch

pub mod batch;
pub mod explicit;
pub mod options;
pub mod path;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bandpath - 能带结构的标准 k 点路径
#[derive(Parser)]
#[command(name = "bandpath")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Standardized k-point paths for band structure calculations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Compute high-symmetry points and the suggested path for a structure
    Path(path::PathArgs),

    /// Compute the explicit, evenly sampled list of k-points along the path
    Explicit(explicit::ExplicitArgs),

    /// Process every structure file in a directory in parallel
    Batch(batch::BatchArgs),

    /// List the extended Bravais cases and their path templates
    Cases {
        /// Directory overriding the built-in path templates
        #[arg(long, env = "BANDPATH_TEMPLATE_DIR")]
        template_dir: Option<PathBuf>,
    },
}
