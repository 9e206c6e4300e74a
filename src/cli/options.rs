//! # 公共计算选项
//!
//! `path`、`explicit`、`batch` 共用的参数，对应库中的 `PathOptions`。
//! 数值选项可以由环境变量给出。
//!
//! ## 依赖关系
//! - 被 `cli/path.rs`, `cli/explicit.rs`, `cli/batch.rs` 使用

use bandpath::PathOptions;
use clap::Args;
use std::path::PathBuf;

/// 公共计算选项
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Space group number (1-230) of the standardized input cell.
    /// Not needed when a JSON input carries `spacegroup` or `symmetry`
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=230))]
    pub spacegroup: Option<u32>,

    /// Do not assume time-reversal symmetry (adds inversion images for non-centrosymmetric crystals)
    #[arg(long, default_value_t = false)]
    pub no_time_reversal: bool,

    /// Threshold for edge-case detection between classification branches
    #[arg(long, env = "BANDPATH_THRESHOLD", default_value_t = 1e-7)]
    pub threshold: f64,

    /// Symmetry tolerance passed to the symmetry analysis
    #[arg(long, env = "BANDPATH_SYMPREC", default_value_t = 1e-5)]
    pub symprec: f64,

    /// Spacing between k-points of the explicit path (1/Å)
    #[arg(long, env = "BANDPATH_REFERENCE_DISTANCE", default_value_t = 0.025)]
    pub reference_distance: f64,

    /// Wrap primitive-cell fractional coordinates into [0, 1)
    #[arg(long, default_value_t = false)]
    pub wrap: bool,

    /// Directory overriding the built-in path templates
    #[arg(long, env = "BANDPATH_TEMPLATE_DIR")]
    pub template_dir: Option<PathBuf>,
}

impl EngineArgs {
    /// 转换为库的选项
    pub fn to_options(&self) -> PathOptions {
        PathOptions {
            with_time_reversal: !self.no_time_reversal,
            threshold: self.threshold,
            symprec: self.symprec,
            reference_distance: self.reference_distance,
            wrap_primitive_positions: self.wrap,
            template_dir: self.template_dir.clone(),
        }
    }
}
