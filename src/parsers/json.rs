//! # JSON 结构文件
//!
//! ```json
//! {
//!   "name": "Si",
//!   "lattice": [[0, 2.7, 2.7], [2.7, 0, 2.7], [2.7, 2.7, 0]],
//!   "positions": [[0, 0, 0], [0.25, 0.25, 0.25]],
//!   "types": [14, 14],
//!   "spacegroup": 227,
//!   "symmetry": { ... }
//! }
//! ```
//!
//! `spacegroup` 与 `symmetry` 都是可选的；`symmetry` 与 `SymmetryInfo`
//! 的字段一致，由外部对称性程序预先算好。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `serde_json`, `models/`, `symmetry::SymmetryInfo`

use super::StructureInput;
use crate::error::{BandpathError, Result};
use crate::models::{CrystalStructure, Lattice};
use crate::symmetry::SymmetryInfo;

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct JsonStructure {
    #[serde(default)]
    name: Option<String>,
    lattice: [[f64; 3]; 3],
    positions: Vec<[f64; 3]>,
    types: Vec<u32>,
    #[serde(default)]
    spacegroup: Option<u32>,
    #[serde(default)]
    symmetry: Option<SymmetryInfo>,
}

/// 解析 JSON 结构文件
pub fn parse_json_file(path: &Path) -> Result<StructureInput> {
    let content = fs::read_to_string(path).map_err(|e| BandpathError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let default_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");

    parse_json_content(&content, default_name).map_err(|e| match e {
        BandpathError::JsonError(source) => BandpathError::ParseError {
            format: "json".to_string(),
            path: path.display().to_string(),
            reason: source.to_string(),
        },
        other => other,
    })
}

/// 从字符串内容解析 JSON 结构
pub fn parse_json_content(content: &str, default_name: &str) -> Result<StructureInput> {
    let raw: JsonStructure = serde_json::from_str(content)?;

    let structure =
        CrystalStructure::new(Lattice::from_vectors(raw.lattice), raw.positions, raw.types)?;

    Ok(StructureInput {
        name: raw.name.unwrap_or_else(|| default_name.to_string()),
        structure,
        spacegroup: raw.spacegroup.or(raw.symmetry.as_ref().map(|s| s.spacegroup_number)),
        symmetry: raw.symmetry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let content = r#"{
            "lattice": [[4, 0, 0], [0, 4, 0], [0, 0, 6]],
            "positions": [[0, 0, 0]],
            "types": [26]
        }"#;
        let input = parse_json_content(content, "fe").unwrap();
        assert_eq!(input.name, "fe");
        assert_eq!(input.structure.num_atoms(), 1);
        assert!(input.spacegroup.is_none());
        assert!(input.symmetry.is_none());
    }

    #[test]
    fn test_parse_with_symmetry() {
        let content = r#"{
            "name": "Cu",
            "lattice": [[0, 1.8, 1.8], [1.8, 0, 1.8], [1.8, 1.8, 0]],
            "positions": [[0, 0, 0]],
            "types": [29],
            "symmetry": {
                "conv_lattice": [[3.6, 0, 0], [0, 3.6, 0], [0, 0, 3.6]],
                "conv_positions": [[0, 0, 0], [0, 0.5, 0.5], [0.5, 0, 0.5], [0.5, 0.5, 0]],
                "conv_types": [29, 29, 29, 29],
                "spacegroup_number": 225,
                "has_inversion": true,
                "transformation_matrix": [[-1, 1, 1], [1, -1, 1], [1, 1, -1]]
            }
        }"#;
        let input = parse_json_content(content, "unused").unwrap();
        assert_eq!(input.name, "Cu");
        assert_eq!(input.spacegroup, Some(225));
        let symmetry = input.symmetry.unwrap();
        assert_eq!(symmetry.conv_types.len(), 4);
        assert!((symmetry.transformation_determinant() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let content = r#"{
            "lattice": [[4, 0, 0], [0, 4, 0], [0, 0, 4]],
            "positions": [[0, 0, 0], [0.5, 0.5, 0.5]],
            "types": [1]
        }"#;
        assert!(matches!(
            parse_json_content(content, "bad"),
            Err(BandpathError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_json_content("{ \"lattice\": 3 }", "bad"),
            Err(BandpathError::JsonError(_))
        ));
    }
}
