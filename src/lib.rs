//! # bandpath - 能带结构的标准 k 点路径
//!
//! 给定晶体结构与对称性分析结果，判定扩展 Bravais 情形，构造原胞，
//! 求出高对称点坐标与推荐路径，并可离散为均匀采样的显式 k 点序列。
//!
//! ```no_run
//! use bandpath::{get_explicit_k_path, CrystalStructure, Lattice, PathOptions, StandardizedCellOracle};
//!
//! let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 6.0]]);
//! let structure = CrystalStructure::new(lattice, vec![[0.0, 0.0, 0.0]], vec![26])?;
//! let oracle = StandardizedCellOracle::new(123);
//! let result = get_explicit_k_path(&structure, &oracle, &PathOptions::default())?;
//! println!("{} points", result.explicit_kpoints_rel.len());
//! # Ok::<(), bandpath::BandpathError>(())
//! ```
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── kpath/      (判定、原胞、模板、求值、组装、离散)
//!   │     ├── symmetry/  (oracle 接口、空间群表、Niggli 约化)
//!   │     └── models/    (数据模型)
//!   ├── parsers/    (POSCAR / JSON)
//!   └── error.rs    (错误处理)
//! ```

pub mod error;
pub mod kpath;
pub mod models;
pub mod parsers;
pub mod symmetry;

pub use error::{BandpathError, Result};
pub use kpath::{
    get_explicit_k_path, get_path, EdgeCaseDiagnostic, ExplicitKPathResult, KPathResult,
    PathOptions,
};
pub use models::{BravaisLattice, CrystalStructure, ExtendedCase, Lattice};
pub use symmetry::{PrecomputedOracle, StandardizedCellOracle, SymmetryInfo, SymmetryOracle};
