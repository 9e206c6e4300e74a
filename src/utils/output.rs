//! # 终端输出
//!
//! 带标签的状态行、标题栏与对齐的 `名称 ..... 值` 摘要。
//! 错误与警告写到 stderr，使 `--json` 输出可直接重定向。
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `main.rs` 使用
//! - 使用 `colored` 着色

use bandpath::EdgeCaseDiagnostic;
use colored::{ColoredString, Colorize};

/// 摘要字段名的显示宽度
const FIELD_WIDTH: usize = 22;
/// 标题栏与分隔线宽度
const RULE_WIDTH: usize = 60;

#[derive(Clone, Copy)]
enum Status {
    Ok,
    Done,
    Info,
    Warn,
    Err,
}

impl Status {
    fn tag(self) -> ColoredString {
        match self {
            Status::Ok => "[OK]".green(),
            Status::Done => "[DONE]".green(),
            Status::Info => "[*]".blue(),
            Status::Warn => "[WARN]".yellow(),
            Status::Err => "[ERR]".red(),
        }
        .bold()
    }

    fn to_stderr(self) -> bool {
        matches!(self, Status::Warn | Status::Err)
    }
}

fn emit(status: Status, msg: &str) {
    if status.to_stderr() {
        eprintln!("{} {}", status.tag(), msg);
    } else {
        println!("{} {}", status.tag(), msg);
    }
}

pub fn print_success(msg: &str) {
    emit(Status::Ok, msg);
}

pub fn print_error(msg: &str) {
    emit(Status::Err, msg);
}

pub fn print_warning(msg: &str) {
    emit(Status::Warn, msg);
}

pub fn print_info(msg: &str) {
    emit(Status::Info, msg);
}

pub fn print_done(msg: &str) {
    emit(Status::Done, msg);
}

/// 打印一行 `名称 ..... 值`
pub fn print_field(name: &str, value: impl std::fmt::Display) {
    let dots = ".".repeat(FIELD_WIDTH.saturating_sub(name.chars().count() + 1));
    println!("  {} {} {}", name, dots.dimmed(), value.to_string().bold());
}

/// 边界情形提示按警告输出
pub fn print_diagnostics(diagnostics: &[EdgeCaseDiagnostic]) {
    for diagnostic in diagnostics {
        print_warning(&format!("edge case: {}", diagnostic));
    }
}

fn rule() -> ColoredString {
    "─".repeat(RULE_WIDTH).dimmed()
}

pub fn print_header(title: &str) {
    println!("\n{}\n  {}\n{}\n", rule(), title.bold(), rule());
}

pub fn print_separator() {
    println!("{}", rule());
}
