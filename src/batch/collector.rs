//! # 文件收集器
//!
//! 在输入目录中按文件名模式查找结构文件。
//! 模式在构造时编译，非法模式立即报错；按后缀排除先前批处理写出的结果文件。
//!
//! ## 依赖关系
//! - 被 `commands/batch.rs` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 匹配文件名

use bandpath::error::{BandpathError, Result};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    root: PathBuf,
    patterns: Vec<Pattern>,
    excluded_suffixes: Vec<String>,
    recursive: bool,
}

impl FileCollector {
    /// 以逗号分隔的 glob 模式创建收集器；空模式匹配所有文件
    pub fn new(root: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let mut patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    BandpathError::InvalidArgument(format!("Invalid pattern '{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if patterns.is_empty() {
            patterns.push(Pattern::new("*").map_err(|e| {
                BandpathError::InvalidArgument(format!("Invalid pattern '*': {}", e))
            })?);
        }

        Ok(Self {
            root: root.into(),
            patterns,
            excluded_suffixes: Vec::new(),
            recursive: false,
        })
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 忽略文件名以 `suffix` 结尾的文件
    pub fn exclude_suffix(mut self, suffix: &str) -> Self {
        self.excluded_suffixes.push(suffix.to_string());
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        !self.excluded_suffixes.iter().any(|s| name.ends_with(s.as_str()))
            && self.patterns.iter().any(|p| p.matches(name))
    }

    /// 收集匹配文件，按路径排序；输入本身是文件时直接返回
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }
        if !self.root.is_dir() {
            return Err(BandpathError::FileNotFound {
                path: self.root.display().to_string(),
            });
        }

        let depth = if self.recursive { usize::MAX } else { 1 };
        let mut found = Vec::new();
        for entry in WalkDir::new(&self.root).max_depth(depth) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.accepts(entry.path()) {
                found.push(entry.into_path());
            }
        }

        found.sort();
        Ok(found)
    }
}
