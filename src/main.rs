//! # bandpath - 能带结构的标准 k 点路径
//!
//! 命令行前端：读取结构文件，调用 `bandpath` 库计算 k 点路径。
//!
//! ## 子命令
//! - `path`     - 高对称点与推荐路径
//! - `explicit` - 显式 k 点序列 (CSV/JSON)
//! - `batch`    - 目录批量处理
//! - `cases`    - 列出扩展 Bravais 情形
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── bandpath (库: parsers / symmetry / kpath)
//!   ├── batch/      (并行批处理)
//!   └── utils/      (输出、进度条、日志)
//! ```

mod batch;
mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    utils::logging::init(cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
