//! 깊이 축의 등폭 구간 구성

use anyhow::{bail, ensure, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// 깊이 축을 덮는 등폭 구간들
///
/// 전체 범위는 `[floor(min) - 0.5, ceil(max) + 0.5]`이며,
/// 각 구간은 우측 폐구간 `(e_j, e_{j+1}]`로 배정된다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthBins {
    lo: f64,
    width: f64,
    num_bins: usize,
}

impl DepthBins {
    /// 깊이 배열에서 구간 축을 구성
    ///
    /// 유한한 깊이 값이 하나도 없으면 실패한다.
    pub fn from_depths(depth: &Array1<f64>, num_bins: usize) -> Result<Self> {
        ensure!(num_bins >= 1, "num_bins는 1 이상이어야 함: {}", num_bins);

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &d in depth.iter().filter(|d| d.is_finite()) {
            min = min.min(d);
            max = max.max(d);
        }
        if !min.is_finite() || !max.is_finite() {
            bail!("깊이 축에 유한한 값이 없음");
        }

        let lo = min.floor() - 0.5;
        let hi = max.ceil() + 0.5;
        Ok(Self {
            lo,
            width: (hi - lo) / num_bins as f64,
            num_bins,
        })
    }

    /// 깊이 d가 속하는 구간 인덱스
    ///
    /// 경계값이 정확히 에지에 떨어지면 왼쪽 구간에 배정된다 (우측 폐구간).
    pub fn bucketize(&self, d: f64) -> usize {
        let pos = ((d - self.lo) / self.width).ceil() as isize - 1;
        pos.clamp(0, self.num_bins as isize - 1) as usize
    }

    /// 구간 j의 중점 깊이
    pub fn midpoint(&self, j: usize) -> f64 {
        self.lo + (j as f64 + 0.5) * self.width
    }

    /// 구간 경계 에지 (num_bins + 1개, 오름차순)
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.num_bins)
            .map(|j| self.lo + j as f64 * self.width)
            .collect()
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn width(&self) -> f64 {
        self.width
    }
}
