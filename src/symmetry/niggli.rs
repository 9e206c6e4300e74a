//! # Niggli 约化
//!
//! Křivý–Gruber 算法（带容差的 Grosse-Kunstleve 形式），
//! 将任意晶格基约化为 Niggli 约化基。约化只改变基的选取，不改变晶格本身，
//! 行列式（含手性）保持不变。
//!
//! ## 依赖关系
//! - 被 `symmetry/mod.rs` 中 `SymmetryOracle::niggli_reduce` 的默认实现使用
//! - 使用 `nalgebra::Vector3`

use crate::error::{BandpathError, Result};
use crate::models::Lattice;

use nalgebra::Vector3;
use tracing::trace;

/// 最大迭代次数
const MAX_ITERATIONS: usize = 1000;

/// G6 度规参数 (A, B, C, ξ, η, ζ)
struct Metric {
    a: f64,
    b: f64,
    c: f64,
    xi: f64,
    eta: f64,
    zeta: f64,
}

impl Metric {
    fn from_basis(basis: &[Vector3<f64>; 3]) -> Self {
        let [a, b, c] = basis;
        Metric {
            a: a.dot(a),
            b: b.dot(b),
            c: c.dot(c),
            xi: 2.0 * b.dot(c),
            eta: 2.0 * a.dot(c),
            zeta: 2.0 * a.dot(b),
        }
    }
}

fn sign_with_tolerance(x: f64, eps: f64) -> i32 {
    if x > eps {
        1
    } else if x < -eps {
        -1
    } else {
        0
    }
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Niggli 约化
///
/// `eps` 为相对容差，实际比较使用 `eps · V^(2/3)`（与 G6 参数同量纲）。
pub fn niggli_reduce(lattice: &Lattice, eps: f64) -> Result<Lattice> {
    let volume = lattice.volume().abs();
    if volume < 1e-12 {
        return Err(BandpathError::InvalidStructure(
            "cannot reduce a degenerate lattice".to_string(),
        ));
    }
    let tol = eps * volume.powf(2.0 / 3.0);

    let m = &lattice.matrix;
    let mut basis = [
        Vector3::new(m[0][0], m[0][1], m[0][2]),
        Vector3::new(m[1][0], m[1][1], m[1][2]),
        Vector3::new(m[2][0], m[2][1], m[2][2]),
    ];

    for iteration in 0..MAX_ITERATIONS {
        if !reduction_step(&mut basis, tol) {
            trace!(iterations = iteration, "Niggli reduction converged");
            let rows = basis.map(|v| [v[0], v[1], v[2]]);
            return Ok(Lattice::from_vectors(rows));
        }
    }

    Err(BandpathError::SymmetryDetection(format!(
        "Niggli reduction did not converge within {} iterations",
        MAX_ITERATIONS
    )))
}

/// 执行一轮约化；若基发生改变需重新开始则返回 true
fn reduction_step(basis: &mut [Vector3<f64>; 3], tol: f64) -> bool {
    let g = Metric::from_basis(basis);

    // N1: A <= B
    if g.a > g.b + tol || ((g.a - g.b).abs() <= tol && g.xi.abs() > g.eta.abs() + tol) {
        let [a, b, c] = *basis;
        *basis = [-b, -a, -c];
        return true;
    }

    // N2: B <= C
    if g.b > g.c + tol || ((g.b - g.c).abs() <= tol && g.eta.abs() > g.zeta.abs() + tol) {
        let [a, b, c] = *basis;
        *basis = [-a, -c, -b];
        return true;
    }

    // N3 / N4: 统一 ξ, η, ζ 的符号
    let l = sign_with_tolerance(g.xi, tol);
    let m = sign_with_tolerance(g.eta, tol);
    let n = sign_with_tolerance(g.zeta, tol);
    let mut flips = [1.0_f64; 3];
    if l * m * n == 1 {
        for (flip, s) in flips.iter_mut().zip([l, m, n]) {
            if s == -1 {
                *flip = -1.0;
            }
        }
    } else {
        let mut zero_slot = None;
        for (idx, s) in [l, m, n].into_iter().enumerate() {
            match s {
                1 => flips[idx] = -1.0,
                0 => zero_slot = Some(idx),
                _ => {}
            }
        }
        if flips[0] * flips[1] * flips[2] < 0.0 {
            if let Some(idx) = zero_slot {
                flips[idx] = -1.0;
            }
        }
    }
    // 翻转 (i, j, k) 作用于 (a, b, c)；乘积恒为 +1，手性不变
    for (vector, flip) in basis.iter_mut().zip(flips) {
        *vector *= flip;
    }

    let g = Metric::from_basis(basis);

    // N5
    if g.xi.abs() > g.b + tol
        || ((g.b - g.xi).abs() <= tol && 2.0 * g.eta < g.zeta - tol)
        || ((g.b + g.xi).abs() <= tol && g.zeta < -tol)
    {
        let s = sign(g.xi);
        basis[2] -= basis[1] * s;
        return true;
    }

    // N6
    if g.eta.abs() > g.a + tol
        || ((g.a - g.eta).abs() <= tol && 2.0 * g.xi < g.zeta - tol)
        || ((g.a + g.eta).abs() <= tol && g.zeta < -tol)
    {
        let s = sign(g.eta);
        basis[2] -= basis[0] * s;
        return true;
    }

    // N7
    if g.zeta.abs() > g.a + tol
        || ((g.a - g.zeta).abs() <= tol && 2.0 * g.xi < g.eta - tol)
        || ((g.a + g.zeta).abs() <= tol && g.eta < -tol)
    {
        let s = sign(g.zeta);
        basis[1] -= basis[0] * s;
        return true;
    }

    // N8
    let sum = g.xi + g.eta + g.zeta + g.a + g.b;
    if sum < -tol || (sum.abs() <= tol && 2.0 * (g.a + g.eta) + g.zeta > tol) {
        basis[2] += basis[0] + basis[1];
        return true;
    }

    false
}
