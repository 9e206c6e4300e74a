//! # 扩展 Bravais 情形判定
//!
//! 由空间群号得到晶系族与心化字母，再由分派表中对应的判定函数
//! 根据惯用晶胞的几何参数选出扩展情形（例如 tI1 / tI2）。
//!
//! 判定接近分支边界（差值小于阈值）时记录一条边界提示；
//! 每个结构至多保留一条提示（首条）。提示随结果返回，不写入任何全局状态。
//!
//! 三斜晶系 (aP) 会先在倒空间做 Niggli 约化，再经置换与符号翻转
//! 化为全锐角或全钝角的标准形式；返回新的惯用晶胞与坐标，输入不被修改。
//!
//! ## 依赖关系
//! - 被 `kpath/mod.rs` 使用
//! - 使用 `symmetry/` (空间群表与 Niggli 约化), `models/`

use crate::error::{BandpathError, Result};
use crate::models::{BravaisLattice, CellParameters, ExtendedCase, Lattice};
use crate::symmetry::{spacegroup_data, SymmetryOracle};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// 倒空间 Niggli 约化的相对容差
const NIGGLI_EPS: f64 = 1e-5;

/// hP1 对应的空间群
const HP1_SPACEGROUPS: [u32; 15] = [
    143, 144, 145, 146, 147, 148, 149, 151, 153, 157, 159, 160, 161, 162, 163,
];

/// 边界情形提示（非错误）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCaseDiagnostic {
    pub message: String,
}

impl fmt::Display for EdgeCaseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// 判定过程中收集提示，只保留第一条
#[derive(Debug, Default)]
struct Diagnostics {
    first: Option<EdgeCaseDiagnostic>,
}

impl Diagnostics {
    fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.first.is_none() {
            warn!(%message, "edge case detected");
            self.first = Some(EdgeCaseDiagnostic { message });
        } else {
            debug!(%message, "additional edge case suppressed");
        }
    }

    /// `|x - y| < threshold` 时记录提示
    fn check_near(&mut self, x: f64, y: f64, threshold: f64, message: impl FnOnce() -> String) {
        if (x - y).abs() < threshold {
            self.note(message());
        }
    }
}

/// 判定结果
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub bravais: BravaisLattice,
    pub case: ExtendedCase,
    /// 后续步骤使用的惯用晶胞（aP 为标准化后的晶胞，其他情形与输入相同）
    pub conv_lattice: Lattice,
    pub conv_positions: Vec<[f64; 3]>,
    pub diagnostic: Option<EdgeCaseDiagnostic>,
}

/// 判定函数的输入
struct ResolverInput<'a> {
    spacegroup: u32,
    cell: CellParameters,
    lattice: &'a Lattice,
    positions: &'a [[f64; 3]],
    threshold: f64,
    oracle: &'a dyn SymmetryOracle,
}

/// 判定函数的输出
struct Resolution {
    case: ExtendedCase,
    canonical: Option<(Lattice, Vec<[f64; 3]>)>,
}

impl From<ExtendedCase> for Resolution {
    fn from(case: ExtendedCase) -> Self {
        Resolution {
            case,
            canonical: None,
        }
    }
}

type Resolver = fn(&ResolverInput<'_>, &mut Diagnostics) -> Result<Resolution>;

/// 分派表：Bravais 晶格 → 判定函数
const RESOLVERS: [(BravaisLattice, Resolver); 15] = [
    (BravaisLattice::CP, resolve_cp),
    (BravaisLattice::CF, resolve_cf),
    (BravaisLattice::CI, resolve_ci),
    (BravaisLattice::TP, resolve_tp),
    (BravaisLattice::TI, resolve_ti),
    (BravaisLattice::OP, resolve_op),
    (BravaisLattice::OF, resolve_of),
    (BravaisLattice::OI, resolve_oi),
    (BravaisLattice::OC, resolve_oc),
    (BravaisLattice::OA, resolve_oa),
    (BravaisLattice::HP, resolve_hp),
    (BravaisLattice::HR, resolve_hr),
    (BravaisLattice::MP, resolve_mp),
    (BravaisLattice::MC, resolve_mc),
    (BravaisLattice::AP, resolve_ap),
];

/// 判定扩展 Bravais 情形
pub fn classify(
    spacegroup: u32,
    lattice: &Lattice,
    positions: &[[f64; 3]],
    threshold: f64,
    oracle: &dyn SymmetryOracle,
) -> Result<Classification> {
    let bravais = spacegroup_data(spacegroup)
        .and_then(|data| data.bravais_lattice())
        .map_err(|e| BandpathError::Classification(e.to_string()))?;

    let resolver = RESOLVERS
        .iter()
        .find(|(b, _)| *b == bravais)
        .map(|(_, r)| *r)
        .ok_or_else(|| {
            BandpathError::Classification(format!("no resolver for Bravais lattice {}", bravais))
        })?;

    let input = ResolverInput {
        spacegroup,
        cell: lattice.parameters(),
        lattice,
        positions,
        threshold,
        oracle,
    };
    let mut diagnostics = Diagnostics::default();
    let resolution = resolver(&input, &mut diagnostics)?;

    if resolution.case.bravais() != bravais {
        return Err(BandpathError::Classification(format!(
            "internal error: case {} does not belong to {}",
            resolution.case, bravais
        )));
    }

    let (conv_lattice, conv_positions) = resolution
        .canonical
        .unwrap_or_else(|| (*lattice, positions.to_vec()));

    debug!(%bravais, case = %resolution.case, spacegroup, "classified lattice");

    Ok(Classification {
        bravais,
        case: resolution.case,
        conv_lattice,
        conv_positions,
        diagnostic: diagnostics.first,
    })
}

// ─────────────────────────────────────────────────────────────
// 立方 / 四方
// ─────────────────────────────────────────────────────────────

/// 195-206 为情形 1，207-230 为情形 2
fn cubic_subrange(spacegroup: u32, first: ExtendedCase, second: ExtendedCase) -> Result<Resolution> {
    match spacegroup {
        195..=206 => Ok(first.into()),
        207..=230 => Ok(second.into()),
        _ => Err(BandpathError::Classification(format!(
            "space group {} is not cubic but the lattice is {}",
            spacegroup,
            first.bravais()
        ))),
    }
}

fn resolve_cp(input: &ResolverInput<'_>, _: &mut Diagnostics) -> Result<Resolution> {
    cubic_subrange(input.spacegroup, ExtendedCase::CP1, ExtendedCase::CP2)
}

fn resolve_cf(input: &ResolverInput<'_>, _: &mut Diagnostics) -> Result<Resolution> {
    cubic_subrange(input.spacegroup, ExtendedCase::CF1, ExtendedCase::CF2)
}

fn resolve_ci(_: &ResolverInput<'_>, _: &mut Diagnostics) -> Result<Resolution> {
    Ok(ExtendedCase::CI1.into())
}

fn resolve_tp(_: &ResolverInput<'_>, _: &mut Diagnostics) -> Result<Resolution> {
    Ok(ExtendedCase::TP1.into())
}

fn resolve_ti(input: &ResolverInput<'_>, diagnostics: &mut Diagnostics) -> Result<Resolution> {
    let CellParameters { a, c, .. } = input.cell;
    diagnostics.check_near(c, a, input.threshold, || {
        "tI lattice, but a almost equal to c".to_string()
    });
    Ok(if c <= a { ExtendedCase::TI1 } else { ExtendedCase::TI2 }.into())
}

// ─────────────────────────────────────────────────────────────
// 正交
// ─────────────────────────────────────────────────────────────

fn resolve_op(_: &ResolverInput<'_>, _: &mut Diagnostics) -> Result<Resolution> {
    Ok(ExtendedCase::OP1.into())
}

fn resolve_of(input: &ResolverInput<'_>, diagnostics: &mut Diagnostics) -> Result<Resolution> {
    let CellParameters { a, b, c, .. } = input.cell;
    let (ia, ib, ic) = (1.0 / (a * a), 1.0 / (b * b), 1.0 / (c * c));

    diagnostics.check_near(ia, ib + ic, input.threshold, || {
        "oF lattice, but 1/a^2 almost equal to 1/b^2 + 1/c^2".to_string()
    });
    diagnostics.check_near(ic, ia + ib, input.threshold, || {
        "oF lattice, but 1/c^2 almost equal to 1/a^2 + 1/b^2".to_string()
    });

    let case = if ia > ib + ic {
        ExtendedCase::OF1
    } else if ic > ia + ib {
        ExtendedCase::OF2
    } else {
        // 1/a², 1/b², 1/c² 构成三角形的三边
        ExtendedCase::OF3
    };
    Ok(case.into())
}

fn resolve_oi(input: &ResolverInput<'_>, diagnostics: &mut Diagnostics) -> Result<Resolution> {
    let CellParameters { a, b, c, .. } = input.cell;
    // (长度, 序号, 情形, 轴名)；按 (长度, 序号) 降序
    let mut vectors = [
        (c, 1, ExtendedCase::OI1, 'c'),
        (b, 3, ExtendedCase::OI3, 'b'),
        (a, 2, ExtendedCase::OI2, 'a'),
    ];
    vectors.sort_by(|x, y| {
        y.0.partial_cmp(&x.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| y.1.cmp(&x.1))
    });

    let (longest, second) = (vectors[0], vectors[1]);
    diagnostics.check_near(longest.0, second.0, input.threshold, || {
        format!(
            "oI lattice, but the two longest vectors {} and {} have almost the same length",
            longest.3, second.3
        )
    });
    Ok(longest.2.into())
}

fn resolve_oc(input: &ResolverInput<'_>, diagnostics: &mut Diagnostics) -> Result<Resolution> {
    let CellParameters { a, b, .. } = input.cell;
    diagnostics.check_near(b, a, input.threshold, || {
        "oC lattice, but a almost equal to b".to_string()
    });
    Ok(if a <= b { ExtendedCase::OC1 } else { ExtendedCase::OC2 }.into())
}

fn resolve_oa(input: &ResolverInput<'_>, diagnostics: &mut Diagnostics) -> Result<Resolution> {
    let CellParameters { b, c, .. } = input.cell;
    diagnostics.check_near(b, c, input.threshold, || {
        "oA lattice, but b almost equal to c".to_string()
    });
    Ok(if b <= c { ExtendedCase::OA1 } else { ExtendedCase::OA2 }.into())
}

// ─────────────────────────────────────────────────────────────
// 六方 / 三方
// ─────────────────────────────────────────────────────────────

fn resolve_hp(input: &ResolverInput<'_>, _: &mut Diagnostics) -> Result<Resolution> {
    let case = if HP1_SPACEGROUPS.contains(&input.spacegroup) {
        ExtendedCase::HP1
    } else {
        ExtendedCase::HP2
    };
    Ok(case.into())
}

fn resolve_hr(input: &ResolverInput<'_>, diagnostics: &mut Diagnostics) -> Result<Resolution> {
    let CellParameters { a, c, .. } = input.cell;
    let (lhs, rhs) = (3f64.sqrt() * a, 2f64.sqrt() * c);
    diagnostics.check_near(lhs, rhs, input.threshold, || {
        "hR lattice, but sqrt(3)a almost equal to sqrt(2)c".to_string()
    });
    Ok(if lhs <= rhs { ExtendedCase::HR1 } else { ExtendedCase::HR2 }.into())
}

// ─────────────────────────────────────────────────────────────
// 单斜
// ─────────────────────────────────────────────────────────────

fn resolve_mp(_: &ResolverInput<'_>, _: &mut Diagnostics) -> Result<Resolution> {
    Ok(ExtendedCase::MP1.into())
}

fn resolve_mc(input: &ResolverInput<'_>, diagnostics: &mut Diagnostics) -> Result<Resolution> {
    let cell = input.cell;
    let CellParameters { a, b, c, cos_beta, .. } = cell;
    let sin_beta = cell.sin_beta();

    diagnostics.check_near(b, a * sin_beta, input.threshold, || {
        "mC lattice, but b almost equal to a*sin(beta)".to_string()
    });
    if b < a * sin_beta {
        return Ok(ExtendedCase::MC1.into());
    }

    let face = -a * cos_beta / c + a * a * sin_beta * sin_beta / (b * b);
    diagnostics.check_near(face, 1.0, input.threshold, || {
        "mC lattice, but -a*cos(beta)/c + a^2*sin(beta)^2/b^2 almost equal to 1".to_string()
    });
    // 十二面体布里渊区为 mC2
    Ok(if face <= 1.0 { ExtendedCase::MC2 } else { ExtendedCase::MC3 }.into())
}

// ─────────────────────────────────────────────────────────────
// 三斜
// ─────────────────────────────────────────────────────────────

/// 置换矩阵的作用：新行向量依次取原来的第几行
const PERMUTATIONS: [[usize; 3]; 3] = [[1, 2, 0], [2, 0, 1], [0, 1, 2]];

fn resolve_ap(input: &ResolverInput<'_>, diagnostics: &mut Diagnostics) -> Result<Resolution> {
    let reciprocal = input.lattice.reciprocal()?;
    let reduced = input.oracle.niggli_reduce(&reciprocal, NIGGLI_EPS)?;
    let real2 = reduced.reciprocal()?;

    // 使 |ka·kb·cos kγ| 最小
    let k = reduced.parameters();
    let conditions = [
        (k.b * k.c * k.cos_alpha).abs(),
        (k.c * k.a * k.cos_beta).abs(),
        (k.a * k.b * k.cos_gamma).abs(),
    ];
    let smallest = argmin(&conditions);
    let perm = PERMUTATIONS[smallest];
    let real3 = Lattice::from_vectors([
        real2.matrix[perm[0]],
        real2.matrix[perm[1]],
        real2.matrix[perm[2]],
    ]);

    let k3 = real3.reciprocal()?.parameters();
    for (cos, name) in [
        (k3.cos_alpha, "k_alpha3"),
        (k3.cos_beta, "k_beta3"),
        (k3.cos_gamma, "k_gamma3"),
    ] {
        if cos.abs() < input.threshold {
            diagnostics.note(format!(
                "aP lattice, but the {} angle is almost equal to 90 degrees",
                name
            ));
        }
    }

    let flips = sign_flips(k3.cos_alpha > 0.0, k3.cos_beta > 0.0, k3.cos_gamma > 0.0);
    let mut final_rows = real3.matrix;
    for (row, flip) in final_rows.iter_mut().zip(flips) {
        for x in row.iter_mut() {
            *x *= flip;
        }
    }
    let final_lattice = Lattice::from_vectors(final_rows);

    let kf = final_lattice.reciprocal()?.parameters();
    let cosines = [kf.cos_alpha, kf.cos_beta, kf.cos_gamma];
    let case = if cosines.iter().all(|&x| x <= 0.0) {
        ExtendedCase::AP2
    } else if cosines.iter().all(|&x| x >= 0.0) {
        ExtendedCase::AP3
    } else {
        return Err(BandpathError::Classification(format!(
            "aP lattice is neither all-obtuse nor all-acute in reciprocal space: \
             cos(k_alpha)={:.6}, cos(k_beta)={:.6}, cos(k_gamma)={:.6}",
            cosines[0], cosines[1], cosines[2]
        )));
    };

    // 笛卡尔坐标不变，改写为新基下的分数坐标
    let positions = input
        .positions
        .iter()
        .map(|&frac| final_lattice.cart_to_frac(input.lattice.frac_to_cart(frac)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Resolution {
        case,
        canonical: Some((final_lattice, positions)),
    })
}

/// 由倒格子夹角余弦的符号选取对角翻转，使三者同号
fn sign_flips(alpha_acute: bool, beta_acute: bool, gamma_acute: bool) -> [f64; 3] {
    match (alpha_acute, beta_acute, gamma_acute) {
        (true, true, true) | (false, false, false) => [1.0, 1.0, 1.0],
        (true, false, false) | (false, true, true) => [1.0, -1.0, -1.0],
        (false, true, false) | (true, false, true) => [-1.0, 1.0, -1.0],
        (false, false, true) | (true, true, false) => [-1.0, -1.0, 1.0],
    }
}

/// 第一个最小值的下标
fn argmin(values: &[f64; 3]) -> usize {
    let mut best = 0;
    for (idx, &value) in values.iter().enumerate().skip(1) {
        if value < values[best] {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::StandardizedCellOracle;

    const THRESHOLD: f64 = 1e-7;

    fn run(spacegroup: u32, lattice: Lattice) -> Classification {
        let oracle = StandardizedCellOracle::new(spacegroup);
        classify(spacegroup, &lattice, &[[0.0, 0.0, 0.0]], THRESHOLD, &oracle).unwrap()
    }

    fn ortho(a: f64, b: f64, c: f64) -> Lattice {
        Lattice::from_vectors([[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]])
    }

    fn case_of(spacegroup: u32, lattice: Lattice) -> ExtendedCase {
        run(spacegroup, lattice).case
    }

    #[test]
    fn test_cubic_subranges() {
        assert_eq!(case_of(200, ortho(4.0, 4.0, 4.0)), ExtendedCase::CP1);
        assert_eq!(case_of(221, ortho(4.0, 4.0, 4.0)), ExtendedCase::CP2);
        assert_eq!(case_of(202, ortho(5.0, 5.0, 5.0)), ExtendedCase::CF1);
        assert_eq!(case_of(225, ortho(5.0, 5.0, 5.0)), ExtendedCase::CF2);
        assert_eq!(case_of(229, ortho(3.0, 3.0, 3.0)), ExtendedCase::CI1);
    }

    #[test]
    fn test_primitive_families() {
        assert_eq!(case_of(123, ortho(4.0, 4.0, 6.0)), ExtendedCase::TP1);
        assert_eq!(case_of(62, ortho(4.0, 5.0, 6.0)), ExtendedCase::OP1);
        let mono = Lattice::from_parameters(4.0, 5.0, 6.0, 90.0, 100.0, 90.0);
        assert_eq!(case_of(14, mono), ExtendedCase::MP1);
    }

    #[test]
    fn test_body_centred_tetragonal() {
        assert_eq!(case_of(139, ortho(4.0, 4.0, 3.0)), ExtendedCase::TI1);
        assert_eq!(case_of(139, ortho(4.0, 4.0, 6.0)), ExtendedCase::TI2);

        let result = run(139, ortho(4.0, 4.0, 6.0));
        assert!(result.diagnostic.is_none());
    }

    #[test]
    fn test_ti_edge_case_single_diagnostic() {
        let result = run(139, ortho(4.0, 4.0, 4.0 + 1e-9));
        assert_eq!(result.case, ExtendedCase::TI2);
        assert_eq!(
            result.diagnostic.unwrap().message,
            "tI lattice, but a almost equal to c"
        );

        let result = run(139, ortho(4.0, 4.0, 4.0));
        assert_eq!(result.case, ExtendedCase::TI1);
        assert!(result.diagnostic.is_some());
    }

    #[test]
    fn test_face_centred_orthorhombic() {
        assert_eq!(case_of(69, ortho(3.0, 5.0, 6.0)), ExtendedCase::OF1);
        assert_eq!(case_of(69, ortho(4.0, 5.0, 2.0)), ExtendedCase::OF2);
        assert_eq!(case_of(69, ortho(4.0, 5.0, 6.0)), ExtendedCase::OF3);
    }

    #[test]
    fn test_of_reciprocal_triangle_boundaries() {
        // 1/12² = 1/15² + 1/20²
        let result = run(69, ortho(12.0, 15.0, 20.0));
        assert_eq!(result.case, ExtendedCase::OF3);
        assert_eq!(
            result.diagnostic.unwrap().message,
            "oF lattice, but 1/a^2 almost equal to 1/b^2 + 1/c^2"
        );

        let result = run(69, ortho(20.0, 15.0, 12.0));
        assert_eq!(result.case, ExtendedCase::OF3);
        assert_eq!(
            result.diagnostic.unwrap().message,
            "oF lattice, but 1/c^2 almost equal to 1/a^2 + 1/b^2"
        );
    }

    #[test]
    fn test_of_keeps_first_of_two_diagnostics() {
        // 阈值放宽到两个比较都落在边界附近
        let oracle = StandardizedCellOracle::new(69);
        let lattice = ortho(12.0, 15.0, 20.0);
        let result = classify(69, &lattice, &[[0.0, 0.0, 0.0]], 0.05, &oracle).unwrap();
        assert_eq!(result.case, ExtendedCase::OF3);
        assert_eq!(
            result.diagnostic.unwrap().message,
            "oF lattice, but 1/a^2 almost equal to 1/b^2 + 1/c^2"
        );
    }

    #[test]
    fn test_body_centred_orthorhombic() {
        assert_eq!(case_of(71, ortho(3.0, 4.0, 6.0)), ExtendedCase::OI1);
        assert_eq!(case_of(71, ortho(6.0, 3.0, 4.0)), ExtendedCase::OI2);
        assert_eq!(case_of(71, ortho(3.0, 6.0, 4.0)), ExtendedCase::OI3);

        // b 与 c 等长时 b 优先
        let result = run(71, ortho(3.0, 6.0, 6.0));
        assert_eq!(result.case, ExtendedCase::OI3);
        assert_eq!(
            result.diagnostic.unwrap().message,
            "oI lattice, but the two longest vectors b and c have almost the same length"
        );
    }

    #[test]
    fn test_base_centred_orthorhombic() {
        assert_eq!(case_of(65, ortho(3.0, 5.0, 4.0)), ExtendedCase::OC1);
        assert_eq!(case_of(65, ortho(5.0, 3.0, 4.0)), ExtendedCase::OC2);
        assert_eq!(case_of(38, ortho(9.0, 3.0, 5.0)), ExtendedCase::OA1);
        assert_eq!(case_of(38, ortho(9.0, 5.0, 3.0)), ExtendedCase::OA2);

        let result = run(38, ortho(9.0, 3.0, 3.0));
        assert_eq!(result.case, ExtendedCase::OA1);
        assert_eq!(result.diagnostic.unwrap().message, "oA lattice, but b almost equal to c");

        let result = run(65, ortho(4.0 + 1e-9, 4.0, 5.0));
        assert_eq!(result.case, ExtendedCase::OC2);
        assert_eq!(result.diagnostic.unwrap().message, "oC lattice, but a almost equal to b");

        assert!(run(65, ortho(3.0, 5.0, 4.0)).diagnostic.is_none());
    }

    #[test]
    fn test_hexagonal_and_rhombohedral() {
        let hex = Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        assert_eq!(case_of(143, hex), ExtendedCase::HP1);
        assert_eq!(case_of(191, hex), ExtendedCase::HP2);

        let tall = Lattice::from_parameters(3.0, 3.0, 9.0, 90.0, 90.0, 120.0);
        assert_eq!(case_of(166, tall), ExtendedCase::HR1);
        let flat = Lattice::from_parameters(5.0, 5.0, 3.0, 90.0, 90.0, 120.0);
        assert_eq!(case_of(166, flat), ExtendedCase::HR2);
    }

    #[test]
    fn test_hr_edge_case() {
        // sqrt(3)·a = sqrt(2)·c
        let a = 3.0;
        let c = a * 1.5f64.sqrt();
        let lattice = Lattice::from_vectors([
            [a, 0.0, 0.0],
            [-a / 2.0, a * 3f64.sqrt() / 2.0, 0.0],
            [0.0, 0.0, c],
        ]);
        let result = run(166, lattice);
        assert_eq!(result.case, ExtendedCase::HR1);
        assert_eq!(
            result.diagnostic.unwrap().message,
            "hR lattice, but sqrt(3)a almost equal to sqrt(2)c"
        );
    }

    #[test]
    fn test_base_centred_monoclinic() {
        let mc = |a, b, c| Lattice::from_parameters(a, b, c, 90.0, 100.0, 90.0);
        assert_eq!(case_of(12, mc(6.0, 3.0, 5.0)), ExtendedCase::MC1);
        assert_eq!(case_of(12, mc(4.0, 6.0, 5.0)), ExtendedCase::MC2);
        assert_eq!(case_of(12, mc(4.0, 4.0, 5.0)), ExtendedCase::MC3);
    }

    #[test]
    fn test_mc_edge_case() {
        let b = 6.0 * 100f64.to_radians().sin();
        let lattice = Lattice::from_parameters(6.0, b, 5.0, 90.0, 100.0, 90.0);
        let result = run(12, lattice);
        assert_eq!(
            result.diagnostic.unwrap().message,
            "mC lattice, but b almost equal to a*sin(beta)"
        );
    }

    #[test]
    fn test_mc_twelve_face_edge_case() {
        // c 取使 -a·cosβ/c + a²sin²β/b² 恰为 1 的值，再略微放大
        let (a, b, beta) = (4.0, 6.0, 100f64);
        let (cos_beta, sin_beta) = (beta.to_radians().cos(), beta.to_radians().sin());
        let c = -a * cos_beta / (1.0 - a * a * sin_beta * sin_beta / (b * b)) * (1.0 + 1e-10);

        let result = run(12, Lattice::from_parameters(a, b, c, 90.0, beta, 90.0));
        assert_eq!(result.case, ExtendedCase::MC2);
        assert_eq!(
            result.diagnostic.unwrap().message,
            "mC lattice, but -a*cos(beta)/c + a^2*sin(beta)^2/b^2 almost equal to 1"
        );

        // 远离边界时无提示
        assert!(run(12, Lattice::from_parameters(a, b, 2.0 * c, 90.0, beta, 90.0))
            .diagnostic
            .is_none());
    }

    #[test]
    fn test_triclinic_right_angles_single_diagnostic() {
        // 三个倒格子夹角都是 90 度，只保留第一条提示
        let result = run(1, ortho(3.0, 4.0, 5.0));
        assert_eq!(result.case, ExtendedCase::AP2);
        assert_eq!(
            result.diagnostic.unwrap().message,
            "aP lattice, but the k_alpha3 angle is almost equal to 90 degrees"
        );
    }

    #[test]
    fn test_triclinic_canonical_form() {
        let lattice = Lattice::from_parameters(4.0, 5.0, 6.0, 100.0, 110.0, 120.0);
        let positions = [[0.1, 0.2, 0.3], [0.6, 0.5, 0.9]];
        let oracle = StandardizedCellOracle::new(2);
        let result = classify(2, &lattice, &positions, THRESHOLD, &oracle).unwrap();
        assert_eq!(result.case, ExtendedCase::AP3);

        let k = result.conv_lattice.reciprocal().unwrap().parameters();
        assert!(k.cos_alpha >= 0.0 && k.cos_beta >= 0.0 && k.cos_gamma >= 0.0);
        assert!((result.conv_lattice.volume().abs() - lattice.volume().abs()).abs() < 1e-8);

        // 笛卡尔坐标保持不变
        for (old, new) in positions.iter().zip(result.conv_positions.iter()) {
            let x = lattice.frac_to_cart(*old);
            let y = result.conv_lattice.frac_to_cart(*new);
            for k in 0..3 {
                assert!((x[k] - y[k]).abs() < 1e-9);
            }
        }

        // 对标准化后的晶胞再次判定，结果一致
        let again = classify(
            2,
            &result.conv_lattice,
            &result.conv_positions,
            THRESHOLD,
            &oracle,
        )
        .unwrap();
        assert_eq!(again.case, result.case);
    }

    #[test]
    fn test_triclinic_all_obtuse() {
        let lattice = Lattice::from_parameters(3.0, 4.0, 5.0, 80.0, 95.0, 110.0);
        let result = run(1, lattice);
        assert_eq!(result.case, ExtendedCase::AP2);
        let k = result.conv_lattice.reciprocal().unwrap().parameters();
        assert!(k.cos_alpha <= 0.0 && k.cos_beta <= 0.0 && k.cos_gamma <= 0.0);
    }

    #[test]
    fn test_invalid_spacegroup() {
        let oracle = StandardizedCellOracle::new(1);
        let result = classify(0, &ortho(1.0, 1.0, 1.0), &[[0.0; 3]], THRESHOLD, &oracle);
        assert!(matches!(result, Err(BandpathError::Classification(_))));
    }

    #[test]
    fn test_case_belongs_to_spacegroup_family() {
        for spacegroup in [1, 5, 16, 22, 38, 44, 75, 79, 143, 146, 168, 195, 196, 197] {
            let lattice = match spacegroup {
                143 | 146 | 168 => Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 120.0),
                5 => Lattice::from_parameters(4.0, 5.0, 6.0, 90.0, 100.0, 90.0),
                195..=197 => ortho(4.0, 4.0, 4.0),
                75 | 79 => ortho(4.0, 4.0, 6.0),
                _ => ortho(3.0, 4.0, 5.0),
            };
            let result = run(spacegroup, lattice);
            let data = spacegroup_data(spacegroup).unwrap();
            assert_eq!(result.case.bravais().family(), data.family);
            assert_eq!(result.bravais, data.bravais_lattice().unwrap());
        }
    }
}
