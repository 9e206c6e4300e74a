//! # batch 命令实现
//!
//! 对目录中的所有结构文件并行计算 k 点路径，每个结构写出一个 JSON。
//!
//! ## 功能
//! - glob 模式收集文件（可递归）
//! - rayon 并行处理，进度条反馈
//! - 已存在的结果默认跳过
//! - 成功/跳过/失败统计
//!
//! ## 依赖关系
//! - 使用 `cli/batch.rs` 定义的参数
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `kpath/` 计算路径

use super::{load_structure, write_json};
use crate::batch::{BatchRunner, FileCollector, FileOutcome};
use crate::cli::batch::BatchArgs;
use crate::cli::options::EngineArgs;
use crate::utils::output;
use bandpath::error::{BandpathError, Result};
use bandpath::parsers;
use bandpath::{get_explicit_k_path, get_path, PathOptions};

use std::fs;
use std::path::{Path, PathBuf};

/// 结果文件后缀，收集输入时排除
const RESULT_SUFFIX: &str = ".kpath.json";
/// 摘要中逐条列出的失败数上限
const MAX_REPORTED_FAILURES: usize = 10;

/// 批量处理配置
struct BatchConfig {
    engine: EngineArgs,
    options: PathOptions,
    input_dir: PathBuf,
    output_dir: Option<PathBuf>,
    explicit: bool,
    overwrite: bool,
}

/// 执行 batch 命令
pub fn execute(args: BatchArgs) -> Result<()> {
    output::print_header("Batch k-path generation");

    if !args.input_dir.is_dir() {
        return Err(BandpathError::FileNotFound {
            path: args.input_dir.display().to_string(),
        });
    }

    let options = args.engine.to_options();
    options.validate()?;

    let files: Vec<PathBuf> = FileCollector::new(&args.input_dir, &args.pattern)?
        .recursive(args.recursive)
        .exclude_suffix(RESULT_SUFFIX)
        .collect()?
        .into_iter()
        .filter(|path| parsers::is_structure_file(path))
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} structure files", files.len()));

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).map_err(|e| BandpathError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }

    let config = BatchConfig {
        engine: args.engine.clone(),
        options,
        input_dir: args.input_dir.clone(),
        output_dir: args.output_dir.clone(),
        explicit: args.explicit,
        overwrite: args.overwrite,
    };

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Using {} parallel jobs", runner.jobs()));
    let summary = runner.run(&files, |file| process_file(file, &config))?;

    output::print_separator();
    output::print_field("Files", summary.total());
    output::print_field("Written", summary.written);
    output::print_field("Skipped (exists)", summary.skipped);
    output::print_field("Failed", summary.failed());

    for (input, error) in summary.failures.iter().take(MAX_REPORTED_FAILURES) {
        output::print_error(&format!("{}: {}", input.display(), error));
    }
    if summary.failed() > MAX_REPORTED_FAILURES {
        output::print_warning(&format!(
            "... and {} more failures",
            summary.failed() - MAX_REPORTED_FAILURES
        ));
    }
    if summary.failed() == 0 {
        output::print_done("Batch complete");
    }

    Ok(())
}

/// 结果文件路径：未指定输出目录时放在输入旁边；
/// 否则以相对输入目录的路径命名，避免不同子目录中的同名文件冲突
fn output_path(input: &Path, input_dir: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("structure");

    match output_dir {
        None => input.with_file_name(format!("{}{}", file_name, RESULT_SUFFIX)),
        Some(dir) => {
            let relative = input
                .strip_prefix(input_dir)
                .ok()
                .and_then(|p| p.to_str())
                .unwrap_or(file_name);
            let flat: String = relative
                .chars()
                .map(|c| if c == '/' || c == '\\' { '_' } else { c })
                .collect();
            dir.join(format!("{}{}", flat, RESULT_SUFFIX))
        }
    }
}

/// 处理单个文件；结果已存在且未要求覆盖时跳过
fn process_file(input: &Path, config: &BatchConfig) -> FileOutcome {
    let output_file = output_path(input, &config.input_dir, config.output_dir.as_deref());

    if output_file.exists() && !config.overwrite {
        tracing::debug!("Skipping {}: {} exists", input.display(), output_file.display());
        return FileOutcome::Skipped(output_file);
    }

    match compute_and_write(input, &output_file, config) {
        Ok(()) => FileOutcome::Written(output_file),
        Err(e) => FileOutcome::Failed {
            input: input.to_path_buf(),
            error: e.to_string(),
        },
    }
}

fn compute_and_write(input: &Path, output_file: &Path, config: &BatchConfig) -> Result<()> {
    let (structure, oracle) = load_structure(input, &config.engine)?;

    if config.explicit {
        let result = get_explicit_k_path(&structure.structure, oracle.as_ref(), &config.options)?;
        write_json(output_file, &result)
    } else {
        let result = get_path(&structure.structure, oracle.as_ref(), &config.options)?;
        write_json(output_file, &result)
    }
}
