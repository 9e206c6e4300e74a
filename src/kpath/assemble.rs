//! # 路径组装
//!
//! 结构既无反演中心、调用者又不假定时间反演对称时，布里渊区中
//! k 与 -k 不再等价，需要补充反演像：除 Γ 点外的每个点 `X` 增加 `X'`
//! (坐标取反)，并为每段路径追加一段由带撇标签组成的镜像路径。
//!
//! ## 依赖关系
//! - 被 `kpath/mod.rs` 使用
//! - 使用 `kpath/evaluate.rs` 的 `PointCoords`

use super::evaluate::PointCoords;

/// 布里渊区中心的标签，永不加撇
pub const GAMMA: &str = "GAMMA";

/// 组装后的点与路径
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPath {
    pub point_coords: PointCoords,
    pub path: Vec<(String, String)>,
    pub augmented: bool,
}

/// 是否需要补充反演像
pub fn needs_augmentation(has_inversion: bool, with_time_reversal: bool) -> bool {
    !has_inversion && !with_time_reversal
}

fn primed(label: &str) -> String {
    if label == GAMMA {
        label.to_string()
    } else {
        format!("{}'", label)
    }
}

/// 组装路径，必要时补充反演像
pub fn assemble(
    mut point_coords: PointCoords,
    mut path: Vec<(String, String)>,
    has_inversion: bool,
    with_time_reversal: bool,
) -> AssembledPath {
    let augmented = needs_augmentation(has_inversion, with_time_reversal);

    if augmented {
        let mirrored: Vec<(String, [f64; 3])> = point_coords
            .iter()
            .filter(|(label, _)| label.as_str() != GAMMA)
            .map(|(label, c)| (primed(label), [-c[0], -c[1], -c[2]]))
            .collect();
        point_coords.extend(mirrored);

        let mirrored_path: Vec<(String, String)> = path
            .iter()
            .map(|(start, stop)| (primed(start), primed(stop)))
            .collect();
        path.extend(mirrored_path);
    }

    AssembledPath {
        point_coords,
        path,
        augmented,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (PointCoords, Vec<(String, String)>) {
        let mut points = PointCoords::new();
        points.insert("GAMMA".to_string(), [0.0, 0.0, 0.0]);
        points.insert("X".to_string(), [0.0, 0.5, 0.0]);
        points.insert("M".to_string(), [0.5, 0.5, 0.0]);
        let path = vec![
            ("GAMMA".to_string(), "X".to_string()),
            ("X".to_string(), "M".to_string()),
        ];
        (points, path)
    }

    #[test]
    fn test_no_augmentation_with_inversion_or_time_reversal() {
        for (has_inv, trs) in [(true, true), (true, false), (false, true)] {
            let (points, path) = sample();
            let result = assemble(points.clone(), path.clone(), has_inv, trs);
            assert!(!result.augmented);
            assert_eq!(result.point_coords, points);
            assert_eq!(result.path, path);
        }
    }

    #[test]
    fn test_augmentation_adds_inverted_points() {
        let (points, path) = sample();
        let result = assemble(points, path, false, false);

        assert!(result.augmented);
        assert_eq!(result.point_coords.len(), 5);
        assert_eq!(result.point_coords["X'"], [-0.0, -0.5, -0.0]);
        assert_eq!(result.point_coords["M'"], [-0.5, -0.5, -0.0]);
        assert!(!result.point_coords.contains_key("GAMMA'"));

        assert_eq!(result.path.len(), 4);
        assert_eq!(result.path[2], ("GAMMA".to_string(), "X'".to_string()));
        assert_eq!(result.path[3], ("X'".to_string(), "M'".to_string()));
        for (start, stop) in &result.path {
            assert!(result.point_coords.contains_key(start));
            assert!(result.point_coords.contains_key(stop));
        }
    }
}
