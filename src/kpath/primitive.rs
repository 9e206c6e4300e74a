//! # 原胞构造
//!
//! 由标准惯用晶胞与 Bravais 晶格查表得到有理变换矩阵 P 及其整数逆 invP：
//! - 原胞晶格: `L_prim = P^T · L_conv`（按行存放晶格向量）
//! - 原胞坐标: `x_prim = invP · x_conv`
//!
//! 惯用晶胞中在原胞坐标下模 1 相等的原子归为一组，每组大小必须等于
//! `det(invP)`，且组内物种唯一。每组取第一个原子作为原胞中的代表。
//!
//! mC 与 oA 使用与路径模板一致的心化约定，不可替换为通用的原胞搜索。
//!
//! ## 依赖关系
//! - 被 `kpath/mod.rs` 使用
//! - 使用 `models/`

use crate::error::{BandpathError, Result};
use crate::models::{BravaisLattice, Lattice};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// 原子归组的坐标容差
const GROUPING_TOLERANCE: f64 = 1e-6;

const IDENTITY_P: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
const IDENTITY_INV: [[i32; 3]; 3] = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];

/// 惯用晶胞与原胞之间的变换矩阵
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveTransform {
    /// P：惯用晶胞基 → 原胞基
    pub p: [[f64; 3]; 3],
    /// invP：P 的逆，整数矩阵
    pub inv_p: [[i32; 3]; 3],
}

impl PrimitiveTransform {
    /// 查表获取变换矩阵
    pub fn for_lattice(bravais: BravaisLattice) -> Self {
        let (p, inv_p) = match bravais {
            BravaisLattice::CP
            | BravaisLattice::TP
            | BravaisLattice::HP
            | BravaisLattice::OP
            | BravaisLattice::MP
            | BravaisLattice::AP => (IDENTITY_P, IDENTITY_INV),
            BravaisLattice::CF | BravaisLattice::OF => (
                half([[0.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]]),
                [[-1, 1, 1], [1, -1, 1], [1, 1, -1]],
            ),
            BravaisLattice::CI | BravaisLattice::TI | BravaisLattice::OI => (
                half([[-1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, -1.0]]),
                [[0, 1, 1], [1, 0, 1], [1, 1, 0]],
            ),
            BravaisLattice::HR => (
                scale(
                    [[2.0, -1.0, -1.0], [1.0, 1.0, -2.0], [1.0, 1.0, 1.0]],
                    1.0 / 3.0,
                ),
                [[1, 0, 1], [-1, 1, 1], [0, -1, 1]],
            ),
            BravaisLattice::OC => (
                half([[1.0, 1.0, 0.0], [-1.0, 1.0, 0.0], [0.0, 0.0, 2.0]]),
                [[1, -1, 0], [1, 1, 0], [0, 0, 1]],
            ),
            BravaisLattice::OA => (
                half([[0.0, 0.0, 2.0], [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0]]),
                [[0, 1, -1], [0, 1, 1], [1, 0, 0]],
            ),
            BravaisLattice::MC => (
                half([[1.0, -1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0, 2.0]]),
                [[1, 1, 0], [-1, 1, 0], [0, 0, 1]],
            ),
        };
        PrimitiveTransform { p, inv_p }
    }

    /// det(invP)，即惯用晶胞与原胞的体积比
    pub fn volume_ratio(&self) -> i32 {
        let m = &self.inv_p;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// `P^T · L`
    pub fn primitive_lattice(&self, conv: &Lattice) -> Lattice {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..3).map(|k| self.p[k][i] * conv.matrix[k][j]).sum();
            }
        }
        Lattice::from_vectors(rows)
    }

    /// `invP · x`
    pub fn to_primitive_coords(&self, x: [f64; 3]) -> [f64; 3] {
        let m = &self.inv_p;
        let mut out = [0.0; 3];
        for (i, value) in out.iter_mut().enumerate() {
            *value = (0..3).map(|k| m[i][k] as f64 * x[k]).sum();
        }
        out
    }
}

fn scale(m: [[f64; 3]; 3], factor: f64) -> [[f64; 3]; 3] {
    m.map(|row| row.map(|x| x * factor))
}

fn half(m: [[f64; 3]; 3]) -> [[f64; 3]; 3] {
    scale(m, 0.5)
}

/// 原胞构造结果
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveCell {
    pub lattice: Lattice,
    pub positions: Vec<[f64; 3]>,
    pub types: Vec<u32>,
    pub transform: PrimitiveTransform,
    /// 惯用晶胞原子 → 原胞原子下标
    pub mapping: Vec<usize>,
}

/// 模 1 意义下的坐标差是否为零
fn same_modulo_one(x: f64, y: f64) -> bool {
    ((x - y + 0.5).rem_euclid(1.0) - 0.5).abs() < GROUPING_TOLERANCE
}

/// 由标准惯用晶胞构造原胞
///
/// `wrap` 为 true 时原胞分数坐标折回 [0, 1)；否则保留原值，
/// 使每个原胞原子的笛卡尔坐标与惯用晶胞中的某个原子重合。
pub fn build_primitive(
    lattice: &Lattice,
    positions: &[[f64; 3]],
    types: &[u32],
    bravais: BravaisLattice,
    wrap: bool,
) -> Result<PrimitiveCell> {
    if positions.len() != types.len() {
        return Err(BandpathError::PrimitiveCell(format!(
            "{} positions but {} species ids",
            positions.len(),
            types.len()
        )));
    }

    let transform = PrimitiveTransform::for_lattice(bravais);
    let ratio = transform.volume_ratio();
    if ratio <= 0 {
        return Err(BandpathError::PrimitiveCell(format!(
            "transformation for {} has non-positive determinant {}",
            bravais, ratio
        )));
    }
    let ratio = ratio as usize;

    let candidates: Vec<[f64; 3]> = positions
        .iter()
        .map(|&x| transform.to_primitive_coords(x))
        .collect();

    // 每个原子与之模 1 重合的原子集合；一致时同组原子得到同一集合
    let mut groups: BTreeMap<Vec<usize>, usize> = BTreeMap::new();
    for xi in &candidates {
        let members: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, xj)| (0..3).all(|k| same_modulo_one(xi[k], xj[k])))
            .map(|(j, _)| j)
            .collect();
        *groups.entry(members).or_insert(0) += 1;
    }

    let wrong: Vec<String> = groups
        .iter()
        .filter(|(members, &count)| count != ratio || members.len() != ratio)
        .map(|(members, _)| format!("{:?}", members))
        .collect();
    if !wrong.is_empty() {
        return Err(BandpathError::PrimitiveCell(format!(
            "found groups of atoms whose size differs from {}: {}",
            ratio,
            wrong.join(", ")
        )));
    }

    let mixed: Vec<String> = groups
        .keys()
        .filter(|members| members.iter().any(|&j| types[j] != types[members[0]]))
        .map(|members| format!("{:?}", members))
        .collect();
    if !mixed.is_empty() {
        return Err(BandpathError::PrimitiveCell(format!(
            "atoms fall on top of each other but have different species: {}",
            mixed.join(", ")
        )));
    }

    let mut mapping = vec![usize::MAX; positions.len()];
    let mut prim_positions = Vec::with_capacity(groups.len());
    let mut prim_types = Vec::with_capacity(groups.len());
    for (prim_idx, members) in groups.keys().enumerate() {
        for &j in members {
            mapping[j] = prim_idx;
        }
        let representative = members[0];
        let mut x = candidates[representative];
        if wrap {
            x = x.map(|v| v.rem_euclid(1.0));
        }
        prim_positions.push(x);
        prim_types.push(types[representative]);
    }
    if mapping.contains(&usize::MAX) {
        return Err(BandpathError::PrimitiveCell(
            "unable to map every conventional atom to the primitive cell".to_string(),
        ));
    }

    debug!(
        %bravais,
        volume_ratio = ratio,
        num_atoms = prim_positions.len(),
        "built primitive cell"
    );

    Ok(PrimitiveCell {
        lattice: transform.primitive_lattice(lattice),
        positions: prim_positions,
        types: prim_types,
        transform,
        mapping,
    })
}
