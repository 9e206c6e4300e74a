//! # 对称性分析接口
//!
//! 计算核心本身不做对称性检测，而是通过 `SymmetryOracle` trait 获取
//! 标准惯用晶胞、空间群号、反演标志以及原始晶胞到惯用晶胞的变换矩阵。
//! 任何外部对称性库都可以通过实现该 trait 接入。
//!
//! ## 功能
//! - `SymmetryInfo`: oracle 返回的数据
//! - `SymmetryOracle`: oracle 接口，`niggli_reduce` 有默认实现
//! - `StandardizedCellOracle`: 输入已是标准惯用晶胞，由调用者给出空间群号
//! - `PrecomputedOracle`: 包装外部预先算好的 `SymmetryInfo`
//!
//! ## 依赖关系
//! - 被 `kpath/` 与 `commands/` 使用
//! - 子模块: spacegroup, niggli, standardized, precomputed

pub mod niggli;
pub mod precomputed;
pub mod spacegroup;
pub mod standardized;

pub use precomputed::PrecomputedOracle;
pub use spacegroup::{spacegroup_data, SpaceGroupData};
pub use standardized::StandardizedCellOracle;

use crate::error::Result;
use crate::models::{CrystalStructure, Lattice};

use serde::{Deserialize, Serialize};

/// 对称性分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryInfo {
    /// 标准惯用晶胞
    pub conv_lattice: Lattice,

    /// 惯用晶胞中的分数坐标
    pub conv_positions: Vec<[f64; 3]>,

    /// 惯用晶胞中的物种编号
    pub conv_types: Vec<u32>,

    /// 空间群号 (1-230)
    pub spacegroup_number: u32,

    /// 点群是否含反演中心
    pub has_inversion: bool,

    /// 原始晶胞到惯用晶胞的变换矩阵：L_conv^T = L_orig^T · M
    pub transformation_matrix: [[f64; 3]; 3],
}

impl SymmetryInfo {
    /// 惯用晶胞对应的结构
    pub fn conventional_structure(&self) -> Result<CrystalStructure> {
        CrystalStructure::new(
            self.conv_lattice,
            self.conv_positions.clone(),
            self.conv_types.clone(),
        )
    }

    /// 变换矩阵的行列式，即惯用晶胞相对原始晶胞的体积比
    pub fn transformation_determinant(&self) -> f64 {
        let m = &self.transformation_matrix;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }
}

/// 单位矩阵
pub const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// 对称性分析服务
///
/// 实现必须是无状态（或只读）的，以便在多线程批处理中共享。
pub trait SymmetryOracle: Send + Sync {
    /// 分析结构，返回标准惯用晶胞等信息
    ///
    /// 找不到自洽的对称性时返回 `BandpathError::SymmetryDetection`。
    fn analyze(&self, structure: &CrystalStructure, symprec: f64) -> Result<SymmetryInfo>;

    /// Niggli 约化（默认使用 Křivý–Gruber 算法）
    fn niggli_reduce(&self, lattice: &Lattice, eps: f64) -> Result<Lattice> {
        niggli::niggli_reduce(lattice, eps)
    }
}
