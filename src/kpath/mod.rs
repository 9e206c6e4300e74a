//! # k 点路径计算核心
//!
//! 数据流：
//! 结构 → `SymmetryOracle` → `classify` (扩展情形 + 惯用晶胞)
//! → `build_primitive` (原胞与变换矩阵)
//! → `PathTemplate` + `evaluate_points` (高对称点坐标)
//! → `assemble` (路径，必要时补充反演像)
//! → `discretize` (显式路径)
//!
//! 每次调用只依赖输入与选项，不读写全局状态，可在多线程中并发使用。
//!
//! ## 依赖关系
//! - 被 `lib.rs` 导出，被 `commands/` 使用
//! - 子模块: classify, primitive, formula, template, evaluate, assemble, explicit

pub mod assemble;
pub mod classify;
pub mod evaluate;
pub mod explicit;
pub mod formula;
pub mod primitive;
pub mod template;

pub use assemble::{assemble, AssembledPath, GAMMA};
pub use classify::{classify, Classification, EdgeCaseDiagnostic};
pub use evaluate::{evaluate_points, PointCoords};
pub use explicit::{discretize, ExplicitKPath};
pub use primitive::{build_primitive, PrimitiveCell, PrimitiveTransform};
pub use template::PathTemplate;

use crate::error::{BandpathError, Result};
use crate::models::{BravaisLattice, CrystalStructure, ExtendedCase, Lattice};
use crate::symmetry::{spacegroup_data, SymmetryOracle};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// 路径计算选项
#[derive(Debug, Clone, PartialEq)]
pub struct PathOptions {
    /// 是否假定时间反演对称（k 与 -k 等价）
    pub with_time_reversal: bool,
    /// 分支边界判定阈值
    pub threshold: f64,
    /// 传给对称性分析的容差
    pub symprec: f64,
    /// 显式路径的采样间距（倒空间长度单位）
    pub reference_distance: f64,
    /// 原胞坐标是否折回 [0, 1)
    pub wrap_primitive_positions: bool,
    /// 自定义模板目录，`None` 时使用内置模板
    pub template_dir: Option<PathBuf>,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            with_time_reversal: true,
            threshold: 1e-7,
            symprec: 1e-5,
            reference_distance: 0.025,
            wrap_primitive_positions: false,
            template_dir: None,
        }
    }
}

impl PathOptions {
    /// 检查数值选项
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold >= 0.0) {
            return Err(BandpathError::InvalidArgument(format!(
                "threshold must be non-negative, got {}",
                self.threshold
            )));
        }
        if !(self.symprec > 0.0) {
            return Err(BandpathError::InvalidArgument(format!(
                "symprec must be positive, got {}",
                self.symprec
            )));
        }
        if !(self.reference_distance > 0.0) {
            return Err(BandpathError::InvalidArgument(format!(
                "reference distance must be positive, got {}",
                self.reference_distance
            )));
        }
        Ok(())
    }
}

/// `get_path` 的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KPathResult {
    pub point_coords: PointCoords,
    pub path: Vec<(String, String)>,
    pub has_inversion_symmetry: bool,
    pub augmented_path: bool,
    pub bravais_lattice: BravaisLattice,
    pub bravais_lattice_extended: ExtendedCase,
    pub conv_lattice: Lattice,
    pub conv_positions: Vec<[f64; 3]>,
    pub conv_types: Vec<u32>,
    pub primitive_lattice: Lattice,
    pub primitive_positions: Vec<[f64; 3]>,
    pub primitive_types: Vec<u32>,
    pub reciprocal_primitive_lattice: Lattice,
    pub primitive_transformation_matrix: [[f64; 3]; 3],
    pub inverse_primitive_transformation_matrix: [[i32; 3]; 3],
    /// 输入晶胞相对惯用晶胞的体积比
    pub volume_original_wrt_conv: f64,
    /// 输入晶胞相对原胞的体积比
    pub volume_original_wrt_prim: f64,
    pub spacegroup_number: u32,
    pub spacegroup_international: String,
    /// 边界提示，至多一条
    pub edge_case_diagnostics: Vec<EdgeCaseDiagnostic>,
    /// 惯用晶胞原子 → 原胞原子下标
    pub conv_prim_atom_mapping: Vec<usize>,
}

impl KPathResult {
    /// 原胞结构
    pub fn primitive_structure(&self) -> Result<CrystalStructure> {
        CrystalStructure::new(
            self.primitive_lattice,
            self.primitive_positions.clone(),
            self.primitive_types.clone(),
        )
    }
}

/// `get_explicit_k_path` 的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitKPathResult {
    #[serde(flatten)]
    pub path: KPathResult,
    pub explicit_kpoints_rel: Vec<[f64; 3]>,
    pub explicit_kpoints_abs: Vec<[f64; 3]>,
    pub explicit_kpoints_labels: Vec<String>,
    pub explicit_kpoints_linearcoord: Vec<f64>,
    pub explicit_segments: Vec<(usize, usize)>,
}

/// 计算标准化的高对称点与推荐路径
pub fn get_path(
    structure: &CrystalStructure,
    oracle: &dyn SymmetryOracle,
    options: &PathOptions,
) -> Result<KPathResult> {
    options.validate()?;

    let info = oracle.analyze(structure, options.symprec)?;
    let spacegroup = spacegroup_data(info.spacegroup_number)
        .map_err(|e| BandpathError::SymmetryDetection(e.to_string()))?;
    debug!(
        spacegroup = info.spacegroup_number,
        symbol = spacegroup.symbol,
        "symmetry analysed"
    );

    let classification = classify(
        info.spacegroup_number,
        &info.conv_lattice,
        &info.conv_positions,
        options.threshold,
        oracle,
    )?;
    debug!(case = %classification.case, "extended Bravais case resolved");

    let primitive = build_primitive(
        &classification.conv_lattice,
        &classification.conv_positions,
        &info.conv_types,
        classification.bravais,
        options.wrap_primitive_positions,
    )?;

    let template = PathTemplate::load(classification.case, options.template_dir.as_deref())?;
    let cell = classification.conv_lattice.parameters();
    let points = evaluate_points(&template, &cell)?;

    let assembled = assemble(
        points,
        template.path.clone(),
        info.has_inversion,
        options.with_time_reversal,
    );
    if assembled.augmented {
        debug!("path augmented with inversion images");
    }

    let reciprocal_primitive_lattice = primitive.lattice.reciprocal()?;
    let volume_original_wrt_conv = info.transformation_determinant();
    let volume_original_wrt_prim =
        volume_original_wrt_conv * primitive.transform.volume_ratio() as f64;

    Ok(KPathResult {
        point_coords: assembled.point_coords,
        path: assembled.path,
        has_inversion_symmetry: info.has_inversion,
        augmented_path: assembled.augmented,
        bravais_lattice: classification.bravais,
        bravais_lattice_extended: classification.case,
        conv_lattice: classification.conv_lattice,
        conv_positions: classification.conv_positions,
        conv_types: info.conv_types,
        primitive_lattice: primitive.lattice,
        primitive_positions: primitive.positions,
        primitive_types: primitive.types,
        reciprocal_primitive_lattice,
        primitive_transformation_matrix: primitive.transform.p,
        inverse_primitive_transformation_matrix: primitive.transform.inv_p,
        volume_original_wrt_conv,
        volume_original_wrt_prim,
        spacegroup_number: info.spacegroup_number,
        spacegroup_international: spacegroup.symbol.to_string(),
        edge_case_diagnostics: classification.diagnostic.into_iter().collect(),
        conv_prim_atom_mapping: primitive.mapping,
    })
}

/// 计算路径并按 `reference_distance` 离散为显式 k 点序列
pub fn get_explicit_k_path(
    structure: &CrystalStructure,
    oracle: &dyn SymmetryOracle,
    options: &PathOptions,
) -> Result<ExplicitKPathResult> {
    let path = get_path(structure, oracle, options)?;
    let explicit = discretize(
        &path.point_coords,
        &path.path,
        &path.reciprocal_primitive_lattice,
        options.reference_distance,
    )?;

    Ok(ExplicitKPathResult {
        path,
        explicit_kpoints_rel: explicit.kpoints_rel,
        explicit_kpoints_abs: explicit.kpoints_abs,
        explicit_kpoints_labels: explicit.labels,
        explicit_kpoints_linearcoord: explicit.linearcoord,
        explicit_segments: explicit.segments,
    })
}
