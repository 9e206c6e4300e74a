//! # 统一错误处理模块
//!
//! 定义 bandpath 的所有错误类型，使用 `thiserror` 派生。
//! 计算核心的五类致命错误与前端（文件、参数、序列化）错误共用一个枚举。
//! 边界情况提示 (`EdgeCaseDiagnostic`) 不是错误，随结果一起返回。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// bandpath 统一错误类型
#[derive(Error, Debug)]
pub enum BandpathError {
    // ─────────────────────────────────────────────────────────────
    // 计算核心错误
    // ─────────────────────────────────────────────────────────────
    #[error("Symmetry detection failed: {0}")]
    SymmetryDetection(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Invalid path template for {case} ({file}): {reason}")]
    Template {
        case: String,
        file: String,
        reason: String,
    },

    #[error("Expression evaluation failed: {0}")]
    Evaluation(String),

    #[error("Primitive cell construction failed: {0}")]
    PrimitiveCell(String),

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl BandpathError {
    /// 构造模板错误
    pub fn template(case: &str, file: &str, reason: impl Into<String>) -> Self {
        BandpathError::Template {
            case: case.to_string(),
            file: file.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, BandpathError>;
