//! # 解析器模块
//!
//! 读取结构文件，转换为计算核心使用的 `CrystalStructure`。
//! 支持 VASP POSCAR/CONTCAR 与 JSON。
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `batch/` 使用
//! - 使用 `models/` 数据模型, `symmetry::SymmetryInfo`
//! - 子模块: poscar, json

pub mod json;
pub mod poscar;

use crate::error::{BandpathError, Result};
use crate::models::CrystalStructure;
use crate::symmetry::SymmetryInfo;
use std::path::Path;

/// 读入的结构及输入文件附带的对称性信息
#[derive(Debug, Clone)]
pub struct StructureInput {
    pub name: String,
    pub structure: CrystalStructure,
    pub spacegroup: Option<u32>,
    pub symmetry: Option<SymmetryInfo>,
}

/// 文件名是否像可解析的结构文件
pub fn is_structure_file(path: &Path) -> bool {
    detect_format(path).is_some()
}

fn detect_format(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => Some("json"),
        "vasp" | "poscar" => Some("poscar"),
        _ => {
            // POSCAR/CONTCAR 通常无扩展名
            let name = path.file_name().and_then(|n| n.to_str())?;
            (name.starts_with("POSCAR") || name.starts_with("CONTCAR")).then_some("poscar")
        }
    }
}

/// 从文件路径推断格式并解析
pub fn parse_structure_file(path: &Path) -> Result<StructureInput> {
    if !path.exists() {
        return Err(BandpathError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    match detect_format(path) {
        Some("json") => json::parse_json_file(path),
        Some(_) => {
            let crystal = poscar::parse_poscar_file(path)?;
            Ok(StructureInput {
                structure: crystal.to_structure()?,
                spacegroup: crystal.spacegroup,
                name: crystal.name,
                symmetry: None,
            })
        }
        None => Err(BandpathError::UnsupportedFormat(format!(
            "Cannot determine format for: {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&PathBuf::from("a/b/Si.json")), Some("json"));
        assert_eq!(detect_format(&PathBuf::from("POSCAR")), Some("poscar"));
        assert_eq!(detect_format(&PathBuf::from("run/CONTCAR_relaxed")), Some("poscar"));
        assert_eq!(detect_format(&PathBuf::from("NaCl.vasp")), Some("poscar"));
        assert_eq!(detect_format(&PathBuf::from("Si.cif")), None);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_structure_file(Path::new("/nonexistent/POSCAR")).unwrap_err();
        assert!(matches!(err, BandpathError::FileNotFound { .. }));
    }
}
