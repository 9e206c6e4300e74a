//! # 数据模型模块
//!
//! 定义晶体结构、晶胞参数与 Bravais 晶格分类的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `symmetry/`, `kpath/` 和 `commands/` 使用
//! - 子模块: structure, bravais, elements

pub mod bravais;
pub mod elements;
pub mod structure;

pub use bravais::{BravaisLattice, CrystalFamily, ExtendedCase};
pub use structure::{Atom, CellParameters, Crystal, CrystalStructure, Lattice};
