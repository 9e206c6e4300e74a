//! # 日志初始化
//!
//! 安装 `tracing-subscriber` 的 fmt 订阅者，日志写到 stderr，
//! 使 stdout 上的 JSON 输出保持可解析。
//! `RUST_LOG` 优先；否则 `--verbose` 时为 `debug`，默认只输出错误
//! （边界提示由命令本身以 `[WARN]` 打印）。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 使用 `tracing-subscriber`

use tracing_subscriber::EnvFilter;

/// 默认日志级别
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "bandpath=debug"
    } else {
        "error"
    }
}

/// 初始化全局日志订阅者
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // 已安装过订阅者时忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
