//! # 高对称点坐标求值
//!
//! 以晶胞参数为初始环境，按文件顺序求出 k 参数，
//! 再为每个参数 x 补充别名 `-x`, `1-x`, `-1+x`, `1/2-x`, `1/2+x`，
//! 最后求出每个点的三个坐标。纯函数，无副作用。
//!
//! ## 依赖关系
//! - 被 `kpath/mod.rs` 使用
//! - 使用 `kpath/template.rs`, `kpath/formula.rs`

use super::formula::parse_fraction;
use super::template::PathTemplate;
use crate::error::{BandpathError, Result};
use crate::models::CellParameters;

use std::collections::BTreeMap;

/// 点标签到分数坐标（相对原胞倒格子）的映射
pub type PointCoords = BTreeMap<String, [f64; 3]>;

/// 按文件顺序求 k 参数；后面的表达式可以引用前面的参数
pub fn evaluate_parameters(
    template: &PathTemplate,
    cell: &CellParameters,
) -> Result<BTreeMap<String, f64>> {
    let mut params = BTreeMap::new();
    for parameter in &template.parameters {
        let value = parameter.formula.evaluate(cell, &params).map_err(|e| {
            BandpathError::Evaluation(format!(
                "{} (parameter {} = {} in {})",
                e, parameter.name, parameter.expression, template.case
            ))
        })?;
        params.insert(parameter.name.clone(), value);
    }
    Ok(params)
}

/// 为每个参数补充别名
pub fn extend_parameters(params: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let mut extended = BTreeMap::new();
    for (name, &x) in params {
        extended.insert(name.clone(), x);
        extended.insert(format!("-{}", name), -x);
        extended.insert(format!("1-{}", name), 1.0 - x);
        extended.insert(format!("-1+{}", name), -1.0 + x);
        extended.insert(format!("1/2-{}", name), 0.5 - x);
        extended.insert(format!("1/2+{}", name), 0.5 + x);
    }
    extended
}

/// 求出模板中所有点的坐标
pub fn evaluate_points(template: &PathTemplate, cell: &CellParameters) -> Result<PointCoords> {
    let params = evaluate_parameters(template, cell)?;
    let extended = extend_parameters(&params);

    let mut points = PointCoords::new();
    for point in &template.points {
        let mut coords = [0.0; 3];
        for (value, token) in coords.iter_mut().zip(point.coords.iter()) {
            *value = resolve_coordinate(token, &extended).map_err(|e| {
                BandpathError::Evaluation(format!("{} (point {} in {})", e, point.label, template.case))
            })?;
        }
        points.insert(point.label.clone(), coords);
    }
    Ok(points)
}

/// 坐标表达式：字面分数、参数名或别名
fn resolve_coordinate(token: &str, extended: &BTreeMap<String, f64>) -> Result<f64> {
    if let Some(value) = parse_fraction(token) {
        return Ok(value);
    }
    extended
        .get(token)
        .copied()
        .ok_or_else(|| BandpathError::Evaluation(format!("undefined coordinate expression '{}'", token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtendedCase, Lattice};

    #[test]
    fn test_extend_parameters() {
        let mut params = BTreeMap::new();
        params.insert("Z".to_string(), 0.3);
        let extended = extend_parameters(&params);

        assert_eq!(extended.len(), 6);
        assert!((extended["Z"] - 0.3).abs() < 1e-12);
        assert!((extended["-Z"] + 0.3).abs() < 1e-12);
        assert!((extended["1-Z"] - 0.7).abs() < 1e-12);
        assert!((extended["-1+Z"] + 0.7).abs() < 1e-12);
        assert!((extended["1/2-Z"] - 0.2).abs() < 1e-12);
        assert!((extended["1/2+Z"] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_ti1_points() {
        let template = PathTemplate::builtin(ExtendedCase::TI1).unwrap();
        let cell = Lattice::from_parameters(4.0, 4.0, 3.0, 90.0, 90.0, 90.0).parameters();
        let points = evaluate_points(&template, &cell).unwrap();

        let e = (1.0 + 9.0 / 16.0) / 4.0;
        let z = points["Z"];
        assert!((z[0] - e).abs() < 1e-12);
        assert!((z[1] - e).abs() < 1e-12);
        assert!((z[2] + e).abs() < 1e-12);

        let z0 = points["Z_0"];
        assert!((z0[0] + e).abs() < 1e-12);
        assert!((z0[1] - (1.0 - e)).abs() < 1e-12);

        assert_eq!(points["M"], [-0.5, 0.5, 0.5]);
        assert_eq!(points["GAMMA"], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mc3_k4_uses_delta() {
        let template = PathTemplate::builtin(ExtendedCase::MC3).unwrap();
        let cell = Lattice::from_parameters(6.0, 5.7, 4.0, 90.0, 110.0, 90.0).parameters();
        let params = evaluate_parameters(&template, &cell).unwrap();

        let delta = -0.25 + params["W"] / 2.0 - params["Z"] * 4.0 * cell.cos_beta / 6.0;
        assert!((params["D"] - delta).abs() < 1e-12);

        let points = evaluate_points(&template, &cell).unwrap();
        let k4 = points["K_4"];
        assert!((k4[0] - (1.0 - params["F"])).abs() < 1e-12);
        assert!((k4[1] - params["F"]).abs() < 1e-12);
        assert!((k4[2] - delta).abs() < 1e-12);
        assert!((k4[2] - 0.00264).abs() < 1e-4);
    }

    #[test]
    fn test_every_template_evaluates() {
        // 每个情形取一个满足其分支条件的晶胞
        let cells = [
            (ExtendedCase::TI2, (3.0, 3.0, 5.0, 90.0)),
            (ExtendedCase::OF1, (3.0, 5.0, 6.0, 90.0)),
            (ExtendedCase::OF2, (4.0, 5.0, 2.0, 90.0)),
            (ExtendedCase::OF3, (4.0, 5.0, 6.0, 90.0)),
            (ExtendedCase::OI1, (3.0, 4.0, 6.0, 90.0)),
            (ExtendedCase::OI2, (6.0, 3.0, 4.0, 90.0)),
            (ExtendedCase::OI3, (3.0, 6.0, 4.0, 90.0)),
            (ExtendedCase::HR1, (3.0, 3.0, 9.0, 90.0)),
            (ExtendedCase::HR2, (5.0, 5.0, 3.0, 90.0)),
            (ExtendedCase::MC1, (6.0, 3.0, 5.0, 100.0)),
            (ExtendedCase::MC2, (4.0, 6.0, 5.0, 100.0)),
            (ExtendedCase::MC3, (4.0, 4.5, 5.0, 100.0)),
        ];
        for (case, (a, b, c, beta)) in cells {
            let template = PathTemplate::builtin(case).unwrap();
            let cell = Lattice::from_parameters(a, b, c, 90.0, beta, 90.0).parameters();
            let points = evaluate_points(&template, &cell).unwrap();
            for (from, to) in &template.path {
                assert!(points.contains_key(from) && points.contains_key(to));
            }
            for coords in points.values() {
                assert!(coords.iter().all(|x| x.is_finite()), "{}", case);
            }
        }
    }

    #[test]
    fn test_undefined_alias_rejected() {
        let template = PathTemplate::parse(
            ExtendedCase::CP1,
            "",
            "GAMMA 0 0 0\nX 0 1/2+Q 0\n",
            "GAMMA X\n",
        )
        .unwrap();
        let cell = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0).parameters();
        let result = evaluate_points(&template, &cell);
        assert!(matches!(result, Err(BandpathError::Evaluation(_))));
    }
}
