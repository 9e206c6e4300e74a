//! # k 参数公式
//!
//! 路径模板中的 k 参数表达式属于一个封闭、已知的集合。
//! 每条表达式字符串在加载时被翻译为一个带标签的 `Formula` 变体，
//! 求值时只做闭式数值计算，不存在任意字符串求值。
//!
//! 未登记的表达式在翻译阶段即报错 (`BandpathError::Evaluation`)。
//!
//! ## 依赖关系
//! - 被 `kpath/template.rs` (翻译) 与 `kpath/evaluate.rs` (求值) 使用
//! - 使用 `models::CellParameters`

use crate::error::{BandpathError, Result};
use crate::models::CellParameters;

use std::collections::BTreeMap;

/// 晶格长度轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    A,
    B,
    C,
}

impl Axis {
    fn length(self, cell: &CellParameters) -> f64 {
        match self {
            Axis::A => cell.a,
            Axis::B => cell.b,
            Axis::C => cell.c,
        }
    }
}

/// 平方比项 `sign · x² / y²`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioTerm {
    pub sign: f64,
    pub num: Axis,
    pub den: Axis,
}

impl RatioTerm {
    fn value(&self, cell: &CellParameters) -> f64 {
        let x = self.num.length(cell);
        let y = self.den.length(cell);
        self.sign * x * x / (y * y)
    }
}

/// 单斜晶系专用的闭式表达式（β 为 a 与 c 的夹角）
#[derive(Debug, Clone, PartialEq)]
pub enum MonoclinicFormula {
    /// `(offset + a/c·cosβ) · scale / sin²β`
    CosBetaOverSinSquared { offset: f64, scale: f64 },
    /// `(a²/b² + (1 + a/c·cosβ)/sin²β) / 4`
    RatioPlusCosBeta,
    /// `-a·c·cosβ / (2b²)`
    NegativeCosBetaOverB,
    /// `constant + coef · p · c·cosβ / a`
    ParamCosBeta { constant: f64, coef: f64, param: String },
    /// `3/4 - b² / (4 a² sin²β)`
    ThreeQuartersMinusRatio,
    /// `p/2 + a²/(4b²) + a·c·cosβ/(2b²)`
    HalfParamPlusRatio { param: String },
    /// `p - (3/4 - p) · a·cosβ / c`
    ParamShiftCosBeta { param: String },
    /// `c / (2a·cosβ) · (1 - 4p + a²sin²β / b²)`
    ParamFaceCondition { param: String },
    /// `-1/4 + q/2 - p · c·cosβ / a`
    HalfParamMinusParamCosBeta { half: String, param: String },
}

/// 带标签的公式
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// 常数
    Constant(f64),
    /// 引用晶胞参数或已定义的 k 参数
    Param(String),
    /// `(1 + Σ terms) / 4`
    QuarterRatioSum(Vec<RatioTerm>),
    /// `(x² + sign·y²) / (4 z²)`
    QuarterSquareSum {
        first: Axis,
        second: Axis,
        sign: f64,
        over: Axis,
    },
    /// `constant + factor · x² / y²`
    ScaledRatio {
        constant: f64,
        factor: f64,
        num: Axis,
        den: Axis,
    },
    /// `constant + coef · p · x² / y²`
    ParamRatio {
        constant: f64,
        coef: f64,
        param: String,
        num: Axis,
        den: Axis,
    },
    /// `constant + Σ coef · p`
    Linear {
        constant: f64,
        terms: Vec<(f64, String)>,
    },
    /// 单斜晶系闭式
    Monoclinic(MonoclinicFormula),
}

fn quarter(terms: &[(f64, Axis, Axis)]) -> Formula {
    Formula::QuarterRatioSum(
        terms
            .iter()
            .map(|&(sign, num, den)| RatioTerm { sign, num, den })
            .collect(),
    )
}

fn linear(constant: f64, terms: &[(f64, &str)]) -> Formula {
    Formula::Linear {
        constant,
        terms: terms.iter().map(|&(c, p)| (c, p.to_string())).collect(),
    }
}

impl Formula {
    /// 将表达式字符串翻译为公式
    pub fn from_expression(expr: &str) -> Result<Formula> {
        use Axis::{A, B, C};
        use MonoclinicFormula as M;

        let formula = match expr.trim() {
            // 正交 / 四方: (1 + Σ ±x²/y²) / 4
            "(1+a*a/b/b)/4" => quarter(&[(1.0, A, B)]),
            "(1+a*a/c/c)/4" => quarter(&[(1.0, A, C)]),
            "(1+b*b/a/a)/4" => quarter(&[(1.0, B, A)]),
            "(1+b*b/c/c)/4" => quarter(&[(1.0, B, C)]),
            "(1+c*c/a/a)/4" => quarter(&[(1.0, C, A)]),
            "(1+c*c/b/b)/4" => quarter(&[(1.0, C, B)]),
            "(1+a*a/b/b+a*a/c/c)/4" => quarter(&[(1.0, A, B), (1.0, A, C)]),
            "(1+a*a/b/b-a*a/c/c)/4" => quarter(&[(1.0, A, B), (-1.0, A, C)]),
            "(1+b*b/a/a-b*b/c/c)/4" => quarter(&[(1.0, B, A), (-1.0, B, C)]),
            "(1+c*c/a/a+c*c/b/b)/4" => quarter(&[(1.0, C, A), (1.0, C, B)]),
            "(1+c*c/a/a-c*c/b/b)/4" => quarter(&[(1.0, C, A), (-1.0, C, B)]),
            "(1+c*c/b/b-c*c/a/a)/4" => quarter(&[(1.0, C, B), (-1.0, C, A)]),

            // 体心正交: (x² ± y²) / 4z²
            "(a*a+b*b)/4/c/c" => square_sum(A, B, 1.0, C),
            "(a*a-c*c)/4/b/b" => square_sum(A, C, -1.0, B),
            "(b*b+c*c)/4/a/a" => square_sum(B, C, 1.0, A),
            "(b*b-a*a)/4/c/c" => square_sum(B, A, -1.0, C),
            "(c*c+a*a)/4/b/b" => square_sum(C, A, 1.0, B),
            "(c*c-b*b)/4/a/a" => square_sum(C, B, -1.0, A),

            // 比值
            "a*a/2/c/c" => scaled_ratio(0.0, 0.5, A, C),
            "a*a/4/c/c" => scaled_ratio(0.0, 0.25, A, C),
            "1/6-c*c/9/a/a" => scaled_ratio(1.0 / 6.0, -1.0 / 9.0, C, A),
            "1-Z*b*b/a/a" => Formula::ParamRatio {
                constant: 1.0,
                coef: -1.0,
                param: "Z".to_string(),
                num: B,
                den: A,
            },

            // 参数的线性组合
            "1+Z-2*M" => linear(1.0, &[(1.0, "Z"), (-2.0, "M")]),
            "1/2+Z" => linear(0.5, &[(1.0, "Z")]),
            "1/2-2*Z" => linear(0.5, &[(-2.0, "Z")]),
            "1/3+D" => linear(1.0 / 3.0, &[(1.0, "D")]),
            "2*F-Z" => linear(0.0, &[(2.0, "F"), (-1.0, "Z")]),
            "5/6-2*D" => linear(5.0 / 6.0, &[(-2.0, "D")]),
            "E-2*D" => linear(0.0, &[(1.0, "E"), (-2.0, "D")]),

            // 单斜
            "(1+a/c*cosbeta)/2/sinbeta/sinbeta" => Formula::Monoclinic(M::CosBetaOverSinSquared {
                offset: 1.0,
                scale: 0.5,
            }),
            "(2+a/c*cosbeta)/4/sinbeta/sinbeta" => Formula::Monoclinic(M::CosBetaOverSinSquared {
                offset: 2.0,
                scale: 0.25,
            }),
            "(a*a/b/b+(1+a/c*cosbeta)/sinbeta/sinbeta)/4" => Formula::Monoclinic(M::RatioPlusCosBeta),
            "-a*c*cosbeta/2/b/b" => Formula::Monoclinic(M::NegativeCosBetaOverB),
            "1/2+E*c*cosbeta/a" => Formula::Monoclinic(M::ParamCosBeta {
                constant: 0.5,
                coef: 1.0,
                param: "E".to_string(),
            }),
            "1/2-2*Z*c*cosbeta/a" => Formula::Monoclinic(M::ParamCosBeta {
                constant: 0.5,
                coef: -2.0,
                param: "Z".to_string(),
            }),
            "3/4-b*b/4/a/a/sinbeta/sinbeta" => Formula::Monoclinic(M::ThreeQuartersMinusRatio),
            "E/2+a*a/4/b/b+a*c*cosbeta/2/b/b" => Formula::Monoclinic(M::HalfParamPlusRatio {
                param: "E".to_string(),
            }),
            "S-(3/4-S)*a*cosbeta/c" => Formula::Monoclinic(M::ParamShiftCosBeta {
                param: "S".to_string(),
            }),
            "c/2/a/cosbeta*(1-4*U+a*a*sinbeta*sinbeta/b/b)" => {
                Formula::Monoclinic(M::ParamFaceCondition {
                    param: "U".to_string(),
                })
            }
            "-1/4+W/2-Z*c*cosbeta/a" => Formula::Monoclinic(M::HalfParamMinusParamCosBeta {
                half: "W".to_string(),
                param: "Z".to_string(),
            }),

            other => {
                if let Some(value) = parse_fraction(other) {
                    Formula::Constant(value)
                } else if is_identifier(other) {
                    Formula::Param(other.to_string())
                } else {
                    return Err(BandpathError::Evaluation(format!(
                        "expression '{}' is not in the formula table",
                        other
                    )));
                }
            }
        };

        Ok(formula)
    }

    /// 公式引用的 k 参数名（不含晶胞参数）
    pub fn references(&self) -> Vec<&str> {
        let names: Vec<&str> = match self {
            Formula::Constant(_)
            | Formula::QuarterRatioSum(_)
            | Formula::QuarterSquareSum { .. }
            | Formula::ScaledRatio { .. } => Vec::new(),
            Formula::Param(name) | Formula::ParamRatio { param: name, .. } => vec![name.as_str()],
            Formula::Linear { terms, .. } => terms.iter().map(|(_, name)| name.as_str()).collect(),
            Formula::Monoclinic(m) => match m {
                MonoclinicFormula::ParamCosBeta { param, .. }
                | MonoclinicFormula::HalfParamPlusRatio { param }
                | MonoclinicFormula::ParamShiftCosBeta { param }
                | MonoclinicFormula::ParamFaceCondition { param } => vec![param.as_str()],
                MonoclinicFormula::HalfParamMinusParamCosBeta { half, param } => {
                    vec![half.as_str(), param.as_str()]
                }
                _ => Vec::new(),
            },
        };
        names.into_iter().filter(|name| !is_cell_symbol(name)).collect()
    }

    /// 求值
    ///
    /// `params` 为已求得的 k 参数；名为 `a`, `b`, `c`, `cosalpha`,
    /// `cosbeta`, `cosgamma` 的引用取自晶胞参数。
    pub fn evaluate(&self, cell: &CellParameters, params: &BTreeMap<String, f64>) -> Result<f64> {
        let lookup = |name: &str| -> Result<f64> {
            cell_value(cell, name)
                .or_else(|| params.get(name).copied())
                .ok_or_else(|| {
                    BandpathError::Evaluation(format!("undefined parameter '{}'", name))
                })
        };

        let value = match self {
            Formula::Constant(v) => *v,
            Formula::Param(name) => lookup(name)?,
            Formula::QuarterRatioSum(terms) => {
                (1.0 + terms.iter().map(|t| t.value(cell)).sum::<f64>()) / 4.0
            }
            Formula::QuarterSquareSum {
                first,
                second,
                sign,
                over,
            } => {
                let x = first.length(cell);
                let y = second.length(cell);
                let z = over.length(cell);
                (x * x + sign * y * y) / (4.0 * z * z)
            }
            Formula::ScaledRatio {
                constant,
                factor,
                num,
                den,
            } => {
                let x = num.length(cell);
                let y = den.length(cell);
                constant + factor * x * x / (y * y)
            }
            Formula::ParamRatio {
                constant,
                coef,
                param,
                num,
                den,
            } => {
                let x = num.length(cell);
                let y = den.length(cell);
                constant + coef * lookup(param)? * x * x / (y * y)
            }
            Formula::Linear { constant, terms } => {
                let mut total = *constant;
                for (coef, name) in terms {
                    total += coef * lookup(name)?;
                }
                total
            }
            Formula::Monoclinic(m) => evaluate_monoclinic(m, cell, &lookup)?,
        };

        Ok(value)
    }
}

fn square_sum(first: Axis, second: Axis, sign: f64, over: Axis) -> Formula {
    Formula::QuarterSquareSum {
        first,
        second,
        sign,
        over,
    }
}

fn scaled_ratio(constant: f64, factor: f64, num: Axis, den: Axis) -> Formula {
    Formula::ScaledRatio {
        constant,
        factor,
        num,
        den,
    }
}

fn evaluate_monoclinic(
    formula: &MonoclinicFormula,
    cell: &CellParameters,
    lookup: &dyn Fn(&str) -> Result<f64>,
) -> Result<f64> {
    let CellParameters { a, b, c, cos_beta, .. } = *cell;
    let sin2 = 1.0 - cos_beta * cos_beta;

    let value = match formula {
        MonoclinicFormula::CosBetaOverSinSquared { offset, scale } => {
            (offset + a / c * cos_beta) * scale / sin2
        }
        MonoclinicFormula::RatioPlusCosBeta => (a * a / (b * b) + (1.0 + a / c * cos_beta) / sin2) / 4.0,
        MonoclinicFormula::NegativeCosBetaOverB => -a * c * cos_beta / (2.0 * b * b),
        MonoclinicFormula::ParamCosBeta {
            constant,
            coef,
            param,
        } => constant + coef * lookup(param)? * c * cos_beta / a,
        MonoclinicFormula::ThreeQuartersMinusRatio => 0.75 - b * b / (4.0 * a * a * sin2),
        MonoclinicFormula::HalfParamPlusRatio { param } => {
            lookup(param)? / 2.0 + a * a / (4.0 * b * b) + a * c * cos_beta / (2.0 * b * b)
        }
        MonoclinicFormula::ParamShiftCosBeta { param } => {
            let p = lookup(param)?;
            p - (0.75 - p) * a * cos_beta / c
        }
        MonoclinicFormula::ParamFaceCondition { param } => {
            let p = lookup(param)?;
            c / (2.0 * a * cos_beta) * (1.0 - 4.0 * p + a * a * sin2 / (b * b))
        }
        MonoclinicFormula::HalfParamMinusParamCosBeta { half, param } => {
            -0.25 + lookup(half)? / 2.0 - lookup(param)? * c * cos_beta / a
        }
    };

    Ok(value)
}

/// 晶胞参数的符号名
fn cell_value(cell: &CellParameters, name: &str) -> Option<f64> {
    match name {
        "a" => Some(cell.a),
        "b" => Some(cell.b),
        "c" => Some(cell.c),
        "cosalpha" => Some(cell.cos_alpha),
        "cosbeta" => Some(cell.cos_beta),
        "cosgamma" => Some(cell.cos_gamma),
        "sinbeta" => Some(cell.sin_beta()),
        _ => None,
    }
}

fn is_cell_symbol(name: &str) -> bool {
    matches!(
        name,
        "a" | "b" | "c" | "cosalpha" | "cosbeta" | "cosgamma" | "sinbeta"
    )
}

/// 解析 `n` 或 `n/m` 形式的字面分数
pub fn parse_fraction(token: &str) -> Option<f64> {
    match token.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => token.parse().ok(),
    }
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lattice;

    fn cell(a: f64, b: f64, c: f64, beta: f64) -> CellParameters {
        Lattice::from_parameters(a, b, c, 90.0, beta, 90.0).parameters()
    }

    fn eval(expr: &str, cell: &CellParameters, params: &[(&str, f64)]) -> f64 {
        let env: BTreeMap<String, f64> = params.iter().map(|&(k, v)| (k.to_string(), v)).collect();
        Formula::from_expression(expr).unwrap().evaluate(cell, &env).unwrap()
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_fraction("1/2"), Some(0.5));
        assert_eq!(parse_fraction("-1/2"), Some(-0.5));
        assert_eq!(parse_fraction("3/8"), Some(0.375));
        assert_eq!(parse_fraction("0"), Some(0.0));
        assert_eq!(parse_fraction("1/0"), None);
        assert_eq!(parse_fraction("1-Z"), None);
    }

    #[test]
    fn test_quarter_ratio_sum() {
        let p = cell(2.0, 4.0, 8.0, 90.0);
        assert!((eval("(1+a*a/b/b)/4", &p, &[]) - 0.3125).abs() < 1e-12);
        assert!((eval("(1+a*a/b/b-a*a/c/c)/4", &p, &[]) - (1.0 + 0.25 - 0.0625) / 4.0).abs() < 1e-12);
        assert!((eval("(1+c*c/a/a+c*c/b/b)/4", &p, &[]) - (1.0 + 16.0 + 4.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_square_sum_and_ratios() {
        let p = cell(2.0, 4.0, 8.0, 90.0);
        assert!((eval("(a*a+b*b)/4/c/c", &p, &[]) - 20.0 / 256.0).abs() < 1e-12);
        assert!((eval("(b*b-a*a)/4/c/c", &p, &[]) - 12.0 / 256.0).abs() < 1e-12);
        assert!((eval("a*a/2/c/c", &p, &[]) - 4.0 / 128.0).abs() < 1e-12);
        assert!((eval("1/6-c*c/9/a/a", &p, &[]) - (1.0 / 6.0 - 64.0 / 36.0)).abs() < 1e-12);
        assert!((eval("1-Z*b*b/a/a", &p, &[("Z", 0.1)]) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_linear_combinations() {
        let p = cell(2.0, 4.0, 8.0, 90.0);
        let params = [("Z", 0.3), ("M", 0.1), ("D", 0.2), ("E", 0.7), ("F", 0.4)];
        assert!((eval("1+Z-2*M", &p, &params) - 1.1).abs() < 1e-12);
        assert!((eval("1/2-2*Z", &p, &params) + 0.1).abs() < 1e-12);
        assert!((eval("5/6-2*D", &p, &params) - (5.0 / 6.0 - 0.4)).abs() < 1e-12);
        assert!((eval("E-2*D", &p, &params) - 0.3).abs() < 1e-12);
        assert!((eval("2*F-Z", &p, &params) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_monoclinic_formulas() {
        let p = cell(5.0, 4.0, 6.0, 110.0);
        let cb = p.cos_beta;
        let s2 = 1.0 - cb * cb;

        let zeta = eval("(2+a/c*cosbeta)/4/sinbeta/sinbeta", &p, &[]);
        assert!((zeta - (2.0 + 5.0 / 6.0 * cb) / 4.0 / s2).abs() < 1e-12);

        let eta = eval("1/2-2*Z*c*cosbeta/a", &p, &[("Z", zeta)]);
        assert!((eta - (0.5 - 2.0 * zeta * 6.0 * cb / 5.0)).abs() < 1e-12);

        let psi = eval("3/4-b*b/4/a/a/sinbeta/sinbeta", &p, &[]);
        assert!((psi - (0.75 - 16.0 / 100.0 / s2)).abs() < 1e-12);

        let phi = eval("S-(3/4-S)*a*cosbeta/c", &p, &[("S", psi)]);
        assert!((phi - (psi - (0.75 - psi) * 5.0 * cb / 6.0)).abs() < 1e-12);

        let mu = eval("(a*a/b/b+(1+a/c*cosbeta)/sinbeta/sinbeta)/4", &p, &[]);
        assert!((mu - (25.0 / 16.0 + (1.0 + 5.0 / 6.0 * cb) / s2) / 4.0).abs() < 1e-12);

        let w = eval("c/2/a/cosbeta*(1-4*U+a*a*sinbeta*sinbeta/b/b)", &p, &[("U", 0.2)]);
        assert!((w - 6.0 / 10.0 / cb * (1.0 - 0.8 + 25.0 * s2 / 16.0)).abs() < 1e-12);
    }

    #[test]
    fn test_delta_uses_omega_and_zeta() {
        let p = cell(6.0, 5.7, 4.0, 110.0);
        let cb = p.cos_beta;
        let d = eval("-1/4+W/2-Z*c*cosbeta/a", &p, &[("W", 0.32), ("Z", 0.41)]);
        assert!((d - (-0.25 + 0.16 - 0.41 * 4.0 * cb / 6.0)).abs() < 1e-12);

        let formula = Formula::from_expression("-1/4+W/2-Z*c*cosbeta/a").unwrap();
        assert_eq!(formula.references(), vec!["W", "Z"]);
    }

    #[test]
    fn test_references_skip_cell_symbols() {
        assert!(Formula::from_expression("c").unwrap().references().is_empty());
        assert!(Formula::from_expression("(1+a*a/b/b)/4").unwrap().references().is_empty());
        assert_eq!(
            Formula::from_expression("E-2*D").unwrap().references(),
            vec!["E", "D"]
        );
        assert_eq!(Formula::from_expression("1-Z*b*b/a/a").unwrap().references(), vec!["Z"]);
    }

    #[test]
    fn test_param_reference() {
        let p = cell(2.0, 4.0, 8.0, 90.0);
        assert!((eval("c", &p, &[]) - 8.0).abs() < 1e-12);
        assert!((eval("Q", &p, &[("Q", 0.42)]) - 0.42).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_expression_rejected() {
        let result = Formula::from_expression("a*a*a");
        assert!(matches!(result, Err(BandpathError::Evaluation(_))));
    }

    #[test]
    fn test_undefined_parameter_rejected() {
        let p = cell(2.0, 4.0, 8.0, 90.0);
        let formula = Formula::from_expression("1/2+Z").unwrap();
        let result = formula.evaluate(&p, &BTreeMap::new());
        assert!(matches!(result, Err(BandpathError::Evaluation(_))));
    }
}
