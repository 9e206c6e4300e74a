//! # 预计算 oracle
//!
//! 包装由外部工具（例如 spglib 的 Python 绑定）预先算好并存入 JSON 的
//! `SymmetryInfo`，使用前做基本一致性检查。
//!
//! ## 依赖关系
//! - 实现 `symmetry::SymmetryOracle`
//! - 由 `commands/` 用 JSON 输入中的 `symmetry` 字段构造

use super::{SymmetryInfo, SymmetryOracle};
use crate::error::{BandpathError, Result};
use crate::models::CrystalStructure;

/// 返回固定 `SymmetryInfo` 的 oracle
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedOracle {
    info: SymmetryInfo,
}

impl PrecomputedOracle {
    /// 校验并包装预计算结果
    pub fn new(info: SymmetryInfo) -> Result<Self> {
        if !(1..=230).contains(&info.spacegroup_number) {
            return Err(BandpathError::SymmetryDetection(format!(
                "space group number {} out of range 1-230",
                info.spacegroup_number
            )));
        }
        if info.conv_positions.len() != info.conv_types.len() {
            return Err(BandpathError::SymmetryDetection(format!(
                "conventional cell has {} positions but {} species ids",
                info.conv_positions.len(),
                info.conv_types.len()
            )));
        }
        if info.transformation_determinant().abs() < 1e-8 {
            return Err(BandpathError::SymmetryDetection(
                "transformation matrix is singular".to_string(),
            ));
        }
        info.conventional_structure()
            .map_err(|e| BandpathError::SymmetryDetection(e.to_string()))?;

        Ok(PrecomputedOracle { info })
    }

    pub fn info(&self) -> &SymmetryInfo {
        &self.info
    }
}

impl SymmetryOracle for PrecomputedOracle {
    fn analyze(&self, _structure: &CrystalStructure, _symprec: f64) -> Result<SymmetryInfo> {
        Ok(self.info.clone())
    }
}
