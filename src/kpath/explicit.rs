//! # 显式 k 点路径
//!
//! 将 (点坐标, 路径) 按参考间距离散为一串均匀采样的 k 点，
//! 并记录标签、一维绘图坐标以及每段在序列中的半开区间。
//!
//! 相邻两段首尾标签相同时，共用的点只出现一次，下一段的起点下标
//! 回退一位（"连续"）；否则两段之间是一个"断点"，
//! 即 `segments[i-1].1 == segments[i].0`。
//!
//! ## 依赖关系
//! - 被 `kpath/mod.rs` 使用
//! - 使用 `models::Lattice` (倒格子)

use super::evaluate::PointCoords;
use crate::error::{BandpathError, Result};
use crate::models::Lattice;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// 离散后的显式路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitKPath {
    /// 分数坐标（相对原胞倒格子）
    pub kpoints_rel: Vec<[f64; 3]>,
    /// 笛卡尔坐标
    pub kpoints_abs: Vec<[f64; 3]>,
    /// 高对称点标签，非端点为空串
    pub labels: Vec<String>,
    /// 一维绘图坐标
    pub linearcoord: Vec<f64>,
    /// 每段的 [start, end) 下标区间
    pub segments: Vec<(usize, usize)>,
}

impl ExplicitKPath {
    pub fn len(&self) -> usize {
        self.kpoints_rel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kpoints_rel.is_empty()
    }
}

/// 一段路径上的采样点数：`max(2, round(L / d))`
pub fn num_points(length: f64, reference_distance: f64) -> usize {
    ((length / reference_distance).round() as usize).max(2)
}

fn to_absolute(rel: [f64; 3], reciprocal: &Lattice) -> [f64; 3] {
    reciprocal.frac_to_cart(rel)
}

/// 离散路径
pub fn discretize(
    points: &PointCoords,
    path: &[(String, String)],
    reciprocal: &Lattice,
    reference_distance: f64,
) -> Result<ExplicitKPath> {
    if !(reference_distance > 0.0) {
        return Err(BandpathError::InvalidArgument(format!(
            "reference distance must be positive, got {}",
            reference_distance
        )));
    }

    let lookup = |label: &str| -> Result<[f64; 3]> {
        points.get(label).copied().ok_or_else(|| {
            BandpathError::InvalidArgument(format!("path references unknown point '{}'", label))
        })
    };

    let mut kpoints_rel: Vec<[f64; 3]> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    let mut linearcoord: Vec<f64> = Vec::new();
    let mut segments = Vec::with_capacity(path.len());
    let mut previous_linearcoord = 0.0;

    for (start_label, stop_label) in path {
        let start = lookup(start_label)?;
        let stop = lookup(stop_label)?;

        let start_abs = to_absolute(start, reciprocal);
        let stop_abs = to_absolute(stop, reciprocal);
        let length = (0..3)
            .map(|k| (stop_abs[k] - start_abs[k]).powi(2))
            .sum::<f64>()
            .sqrt();
        let n = num_points(length, reference_distance);

        let mut segment_start = labels.len();
        for i in 0..n {
            if i == 0 && labels.last() == Some(start_label) {
                // 与上一段末点重合
                segment_start -= 1;
                continue;
            }

            let t = i as f64 / (n - 1) as f64;
            let (coords, label) = if i == 0 {
                (start, start_label.clone())
            } else if i == n - 1 {
                (stop, stop_label.clone())
            } else {
                let mut x = [0.0; 3];
                for k in 0..3 {
                    x[k] = start[k] + (stop[k] - start[k]) * t;
                }
                (x, String::new())
            };

            kpoints_rel.push(coords);
            labels.push(label);
            linearcoord.push(previous_linearcoord + length * t);
        }

        previous_linearcoord += length;
        segments.push((segment_start, labels.len()));
    }

    let kpoints_abs = kpoints_rel
        .iter()
        .map(|&rel| to_absolute(rel, reciprocal))
        .collect();

    debug!(
        num_points = kpoints_rel.len(),
        num_segments = segments.len(),
        "discretized explicit k-path"
    );

    Ok(ExplicitKPath {
        kpoints_rel,
        kpoints_abs,
        labels,
        linearcoord,
        segments,
    })
}
