//! # 标准惯用晶胞 oracle
//!
//! 调用者声明输入结构已经是标准惯用晶胞，并给出空间群号。
//! 此 oracle 只检查晶格度规是否与该空间群的晶系族相符，
//! 不做任何对称操作的搜索。
//!
//! ## 依赖关系
//! - 实现 `symmetry::SymmetryOracle`
//! - 使用 `symmetry/spacegroup.rs`

use super::{spacegroup_data, SymmetryInfo, SymmetryOracle, IDENTITY};
use crate::error::{BandpathError, Result};
use crate::models::{CellParameters, CrystalFamily, CrystalStructure};

use tracing::debug;

/// 由调用者提供空间群号的 oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardizedCellOracle {
    pub spacegroup: u32,
}

impl StandardizedCellOracle {
    pub fn new(spacegroup: u32) -> Self {
        StandardizedCellOracle { spacegroup }
    }
}

impl SymmetryOracle for StandardizedCellOracle {
    fn analyze(&self, structure: &CrystalStructure, symprec: f64) -> Result<SymmetryInfo> {
        let data = spacegroup_data(self.spacegroup)
            .map_err(|e| BandpathError::SymmetryDetection(e.to_string()))?;
        let params = structure.lattice.parameters();

        check_metric(data.family, &params, symprec).map_err(|reason| {
            BandpathError::SymmetryDetection(format!(
                "cell is not a standardized conventional cell for space group {} ({}): {}",
                data.number, data.symbol, reason
            ))
        })?;

        debug!(
            spacegroup = data.number,
            symbol = data.symbol,
            "accepted standardized conventional cell"
        );

        Ok(SymmetryInfo {
            conv_lattice: structure.lattice,
            conv_positions: structure.positions.clone(),
            conv_types: structure.types.clone(),
            spacegroup_number: data.number,
            has_inversion: data.has_inversion,
            transformation_matrix: IDENTITY,
        })
    }
}

/// 按晶系族检查晶格度规
fn check_metric(family: CrystalFamily, p: &CellParameters, symprec: f64) -> std::result::Result<(), String> {
    let same_length = |x: f64, y: f64| (x - y).abs() <= symprec * x.max(y);
    let right_angle = |cos: f64| cos.abs() <= symprec;

    let right_angles = right_angle(p.cos_alpha) && right_angle(p.cos_beta) && right_angle(p.cos_gamma);

    match family {
        CrystalFamily::Triclinic => Ok(()),
        CrystalFamily::Monoclinic => {
            if right_angle(p.cos_alpha) && right_angle(p.cos_gamma) {
                Ok(())
            } else {
                Err("monoclinic cell requires alpha = gamma = 90 degrees (unique axis b)".to_string())
            }
        }
        CrystalFamily::Orthorhombic => {
            if right_angles {
                Ok(())
            } else {
                Err("orthorhombic cell requires all angles at 90 degrees".to_string())
            }
        }
        CrystalFamily::Tetragonal => {
            if right_angles && same_length(p.a, p.b) {
                Ok(())
            } else {
                Err("tetragonal cell requires a = b and all angles at 90 degrees".to_string())
            }
        }
        CrystalFamily::Hexagonal => {
            if right_angle(p.cos_alpha)
                && right_angle(p.cos_beta)
                && (p.cos_gamma + 0.5).abs() <= symprec
                && same_length(p.a, p.b)
            {
                Ok(())
            } else {
                Err("hexagonal cell requires a = b, alpha = beta = 90 and gamma = 120 degrees".to_string())
            }
        }
        CrystalFamily::Cubic => {
            if right_angles && same_length(p.a, p.b) && same_length(p.b, p.c) {
                Ok(())
            } else {
                Err("cubic cell requires a = b = c and all angles at 90 degrees".to_string())
            }
        }
    }
}
