//! # 批量执行器
//!
//! 在指定大小的 rayon 线程池中处理文件列表，进度条显示当前文件，
//! 各文件结果按输入顺序汇总为 `BatchSummary`。
//!
//! ## 依赖关系
//! - 被 `commands/batch.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 并行, `num_cpus` 决定默认线程数

use crate::utils::progress;
use bandpath::error::{BandpathError, Result};

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 单个输入文件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// 已写出结果文件
    Written(PathBuf),
    /// 结果已存在
    Skipped(PathBuf),
    Failed { input: PathBuf, error: String },
}

/// 批量处理汇总
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: usize,
    pub skipped: usize,
    /// (输入文件, 错误信息)，按输入顺序
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.written + self.skipped + self.failed()
    }
}

impl Extend<FileOutcome> for BatchSummary {
    fn extend<I: IntoIterator<Item = FileOutcome>>(&mut self, outcomes: I) {
        for outcome in outcomes {
            match outcome {
                FileOutcome::Written(_) => self.written += 1,
                FileOutcome::Skipped(_) => self.skipped += 1,
                FileOutcome::Failed { input, error } => self.failures.push((input, error)),
            }
        }
    }
}

impl FromIterator<FileOutcome> for BatchSummary {
    fn from_iter<I: IntoIterator<Item = FileOutcome>>(outcomes: I) -> Self {
        let mut summary = BatchSummary::default();
        summary.extend(outcomes);
        summary
    }
}

/// 固定线程数的批量执行器
pub struct BatchRunner {
    threads: usize,
}

impl BatchRunner {
    /// `jobs == 0` 时使用全部 CPU 核
    pub fn new(jobs: usize) -> Self {
        Self {
            threads: if jobs == 0 { num_cpus::get() } else { jobs },
        }
    }

    pub fn jobs(&self) -> usize {
        self.threads
    }

    /// 对每个文件调用 `process`，返回汇总
    pub fn run<F>(&self, files: &[PathBuf], process: F) -> Result<BatchSummary>
    where
        F: Fn(&Path) -> FileOutcome + Sync + Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| {
                BandpathError::InvalidArgument(format!("Failed to build thread pool: {}", e))
            })?;

        let bar = progress::create_progress_bar(files.len() as u64, "Processing");
        let outcomes: Vec<FileOutcome> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    if let Some(name) = file.file_name() {
                        bar.set_message(name.to_string_lossy().into_owned());
                    }
                    let outcome = process(file.as_path());
                    bar.inc(1);
                    outcome
                })
                .collect()
        });
        bar.finish_and_clear();

        Ok(outcomes.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_keeps_input_order() {
        let files: Vec<PathBuf> = (0..9).map(|i| PathBuf::from(format!("POSCAR_{}", i))).collect();
        let summary = BatchRunner::new(3)
            .run(&files, |file| {
                let index: usize = file
                    .to_string_lossy()
                    .trim_start_matches("POSCAR_")
                    .parse()
                    .unwrap_or(0);
                match index % 3 {
                    0 => FileOutcome::Written(file.with_extension("kpath.json")),
                    1 => FileOutcome::Skipped(file.to_path_buf()),
                    _ => FileOutcome::Failed {
                        input: file.to_path_buf(),
                        error: "classification failed".to_string(),
                    },
                }
            })
            .unwrap();

        assert_eq!(summary.total(), 9);
        assert_eq!((summary.written, summary.skipped, summary.failed()), (3, 3, 3));
        let failed: Vec<_> = summary.failures.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(
            failed,
            vec![PathBuf::from("POSCAR_2"), PathBuf::from("POSCAR_5"), PathBuf::from("POSCAR_8")]
        );
    }

    #[test]
    fn test_empty_batch() {
        let summary = BatchRunner::new(1).run(&[], |_| unreachable!()).unwrap();
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn test_zero_jobs_uses_all_cpus() {
        assert_eq!(BatchRunner::new(0).jobs(), num_cpus::get());
    }
}
