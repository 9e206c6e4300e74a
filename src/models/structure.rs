//! # 晶体结构数据模型
//!
//! 定义晶格、计算核心使用的 `CrystalStructure` 以及带元素名的 `Crystal`。
//!
//! 约定：晶格矩阵的三行依次为 a, b, c 三个实空间向量；
//! 倒格子同样按行存放，满足 `real · reciprocal^T = 2π I`。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `symmetry/`, `kpath/` 使用
//! - 使用 `models/elements.rs` 完成元素符号与原子序数的映射
//! - 使用 `nalgebra` 进行矩阵求逆

use crate::error::{BandpathError, Result};
use crate::models::elements;

use nalgebra::{Matrix3, RowVector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 奇异矩阵判定阈值
const SINGULAR_EPS: f64 = 1e-12;

/// 晶胞参数：三个长度与三个夹角的余弦
///
/// α 为 b 与 c 的夹角，β 为 a 与 c 的夹角，γ 为 a 与 b 的夹角。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub cos_alpha: f64,
    pub cos_beta: f64,
    pub cos_gamma: f64,
}

impl CellParameters {
    /// sin β（β 取 0..π，故恒为非负）
    pub fn sin_beta(&self) -> f64 {
        (1.0 - self.cos_beta * self.cos_beta).sqrt()
    }
}

/// 晶格参数表示（序列化为 3x3 嵌套数组）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 由三个长度与三个夹角（度）构造：a 沿 x 轴，b 在 xy 平面内
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Lattice::from_cell(&CellParameters {
            a,
            b,
            c,
            cos_alpha: alpha.to_radians().cos(),
            cos_beta: beta.to_radians().cos(),
            cos_gamma: gamma.to_radians().cos(),
        })
    }

    /// 由 `CellParameters` 构造，取向同 [`Lattice::from_parameters`]
    pub fn from_cell(p: &CellParameters) -> Self {
        let sin_gamma = (1.0 - p.cos_gamma * p.cos_gamma).sqrt();
        let cx = p.cos_beta;
        let cy = (p.cos_alpha - p.cos_beta * p.cos_gamma) / sin_gamma;
        let cz = (1.0 - cx * cx - cy * cy).max(0.0).sqrt();

        Lattice {
            matrix: [
                [p.a, 0.0, 0.0],
                [p.b * p.cos_gamma, p.b * sin_gamma, 0.0],
                [p.c * cx, p.c * cy, p.c * cz],
            ],
        }
    }

    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 转为 nalgebra 矩阵（行即晶格向量）
    pub fn to_matrix3(&self) -> Matrix3<f64> {
        let m = &self.matrix;
        Matrix3::new(
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        )
    }

    /// 从 nalgebra 矩阵创建（行即晶格向量）
    pub fn from_matrix3(m: &Matrix3<f64>) -> Self {
        Lattice {
            matrix: std::array::from_fn(|i| std::array::from_fn(|j| m[(i, j)])),
        }
    }

    /// 获取晶胞参数（长度与夹角余弦）
    pub fn parameters(&self) -> CellParameters {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let a = norm(&a_vec);
        let b = norm(&b_vec);
        let c = norm(&c_vec);

        CellParameters {
            a,
            b,
            c,
            cos_alpha: dot(&b_vec, &c_vec) / (b * c),
            cos_beta: dot(&a_vec, &c_vec) / (a * c),
            cos_gamma: dot(&a_vec, &b_vec) / (a * b),
        }
    }

    /// 计算晶格体积（带符号，右手系为正）
    pub fn volume(&self) -> f64 {
        self.to_matrix3().determinant()
    }

    /// 倒格子：`2π · inv(L)^T`，行向量为倒格矢
    ///
    /// 对倒格子再求一次倒格子即回到实空间晶格。
    pub fn reciprocal(&self) -> Result<Lattice> {
        let inv = self.inverse()?;
        Ok(Lattice::from_matrix3(&(inv.transpose() * (2.0 * PI))))
    }

    /// 晶格矩阵的逆
    pub fn inverse(&self) -> Result<Matrix3<f64>> {
        let m = self.to_matrix3();
        if m.determinant().abs() < SINGULAR_EPS {
            return Err(BandpathError::InvalidStructure(
                "lattice vectors are linearly dependent".to_string(),
            ));
        }
        m.try_inverse().ok_or_else(|| {
            BandpathError::InvalidStructure("lattice matrix is not invertible".to_string())
        })
    }

    /// 分数坐标转笛卡尔坐标：`frac · L`
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let cart = RowVector3::new(frac[0], frac[1], frac[2]) * self.to_matrix3();
        [cart[0], cart[1], cart[2]]
    }

    /// 笛卡尔坐标转分数坐标：`cart · inv(L)`
    pub fn cart_to_frac(&self, cart: [f64; 3]) -> Result<[f64; 3]> {
        let frac = RowVector3::new(cart[0], cart[1], cart[2]) * self.inverse()?;
        Ok([frac[0], frac[1], frac[2]])
    }
}

fn dot(x: &[f64; 3], y: &[f64; 3]) -> f64 {
    x.iter().zip(y.iter()).map(|(p, q)| p * q).sum()
}

fn norm(x: &[f64; 3]) -> f64 {
    dot(x, x).sqrt()
}

/// 计算核心使用的晶体结构：晶格 + 分数坐标 + 物种编号
///
/// 物种编号为正整数，不要求是原子序数，只要求不同物种互不相同。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrystalStructure {
    pub lattice: Lattice,
    pub positions: Vec<[f64; 3]>,
    pub types: Vec<u32>,
}

impl CrystalStructure {
    /// 创建并校验结构
    pub fn new(lattice: Lattice, positions: Vec<[f64; 3]>, types: Vec<u32>) -> Result<Self> {
        if positions.len() != types.len() {
            return Err(BandpathError::InvalidStructure(format!(
                "{} positions but {} species ids",
                positions.len(),
                types.len()
            )));
        }
        if positions.is_empty() {
            return Err(BandpathError::InvalidStructure(
                "structure contains no atoms".to_string(),
            ));
        }
        if types.iter().any(|&t| t == 0) {
            return Err(BandpathError::InvalidStructure(
                "species ids must be positive integers".to_string(),
            ));
        }
        lattice.inverse()?;

        Ok(CrystalStructure {
            lattice,
            positions,
            types,
        })
    }

    /// 原子数
    pub fn num_atoms(&self) -> usize {
        self.positions.len()
    }
}

/// 原子信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 带元素名的晶体结构（文件读写使用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,

    /// 空间群编号（输入文件显式给出时）
    pub spacegroup: Option<u32>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
            spacegroup: None,
        }
    }

    /// 转换为计算核心的结构：元素符号映射为原子序数
    ///
    /// 无法识别的符号（如 VASP 4 格式的占位名）按出现顺序编号为 1001, 1002, ...
    pub fn to_structure(&self) -> Result<CrystalStructure> {
        let mut unknown: Vec<&str> = Vec::new();
        let types = self
            .atoms
            .iter()
            .map(|atom| match elements::atomic_number(&atom.element) {
                Some(z) => z,
                None => {
                    let idx = match unknown.iter().position(|s| *s == atom.element) {
                        Some(i) => i,
                        None => {
                            unknown.push(&atom.element);
                            unknown.len() - 1
                        }
                    };
                    1001 + idx as u32
                }
            })
            .collect();
        let positions = self.atoms.iter().map(|a| a.position).collect();

        CrystalStructure::new(self.lattice, positions, types)
    }

    /// 从计算核心的结构重建（原子序数映射回元素符号）
    pub fn from_structure(name: impl Into<String>, structure: &CrystalStructure) -> Self {
        let atoms = structure
            .positions
            .iter()
            .zip(structure.types.iter())
            .map(|(pos, &z)| {
                let element = elements::symbol(z)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("X{}", z));
                Atom::new(element, *pos)
            })
            .collect();
        Crystal::new(name, structure.lattice, atoms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monoclinic_parameters_round_trip() {
        let lattice = Lattice::from_parameters(5.1, 6.3, 7.2, 90.0, 104.5, 90.0);
        let p = lattice.parameters();

        assert!((p.a - 5.1).abs() < 1e-9);
        assert!((p.b - 6.3).abs() < 1e-9);
        assert!((p.c - 7.2).abs() < 1e-9);
        assert!(p.cos_alpha.abs() < 1e-12);
        assert!((p.cos_beta - 104.5_f64.to_radians().cos()).abs() < 1e-12);
        assert!((p.sin_beta() - 104.5_f64.to_radians().sin()).abs() < 1e-12);
        assert!((Lattice::from_cell(&p).matrix[2][0] - lattice.matrix[2][0]).abs() < 1e-12);
    }

    #[test]
    fn test_tetragonal_volume() {
        let lattice = Lattice::from_parameters(3.9, 3.9, 12.5, 90.0, 90.0, 90.0);
        assert!((lattice.volume() - 3.9 * 3.9 * 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_hexagonal_orientation() {
        let lattice = Lattice::from_parameters(2.46, 2.46, 6.7, 90.0, 90.0, 120.0);
        assert!((lattice.matrix[1][0] + 1.23).abs() < 1e-9);
        assert!(lattice.matrix[1][2].abs() < 1e-12);
        assert!((lattice.parameters().cos_gamma + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_reciprocal_orthogonality() {
        let lattice = Lattice::from_parameters(3.0, 4.0, 5.0, 80.0, 95.0, 110.0);
        let rec = lattice.reciprocal().unwrap();

        for i in 0..3 {
            for j in 0..3 {
                let d: f64 = (0..3)
                    .map(|k| lattice.matrix[i][k] * rec.matrix[j][k])
                    .sum();
                let expected = if i == j { 2.0 * PI } else { 0.0 };
                assert!((d - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_reciprocal_is_involution() {
        let lattice = Lattice::from_parameters(3.0, 4.0, 5.0, 80.0, 95.0, 110.0);
        let back = lattice.reciprocal().unwrap().reciprocal().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert!((back.matrix[i][j] - lattice.matrix[i][j]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_frac_cart_conversion() {
        let lattice = Lattice::from_parameters(3.0, 4.0, 5.0, 80.0, 95.0, 110.0);
        let frac = [0.1, 0.25, 0.7];
        let back = lattice.cart_to_frac(lattice.frac_to_cart(frac)).unwrap();
        for k in 0..3 {
            assert!((back[k] - frac[k]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_singular_lattice_rejected() {
        let lattice = Lattice::from_vectors([[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(lattice.reciprocal().is_err());
        assert!(CrystalStructure::new(lattice, vec![[0.0; 3]], vec![1]).is_err());
    }

    #[test]
    fn test_structure_length_mismatch() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let result = CrystalStructure::new(lattice, vec![[0.0; 3], [0.5; 3]], vec![1]);
        assert!(matches!(result, Err(BandpathError::InvalidStructure(_))));
    }

    #[test]
    fn test_crystal_to_structure_species_ids() {
        let lattice = Lattice::from_parameters(4.36, 4.36, 4.36, 90.0, 90.0, 90.0);
        let atoms = vec![
            Atom::new("Si", [0.0, 0.0, 0.0]),
            Atom::new("C", [0.25, 0.25, 0.25]),
            Atom::new("X1", [0.5, 0.5, 0.5]),
            Atom::new("X1", [0.75, 0.75, 0.75]),
        ];
        let crystal = Crystal::new("SiC", lattice, atoms);
        let structure = crystal.to_structure().unwrap();

        assert_eq!(structure.types, vec![14, 6, 1001, 1001]);
        assert_eq!(structure.num_atoms(), 4);

        let rebuilt = Crystal::from_structure("SiC", &structure);
        assert_eq!(rebuilt.atoms[0].element, "Si");
        assert_eq!(rebuilt.atoms[1].element, "C");
    }
}
