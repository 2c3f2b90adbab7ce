//! 깊이 기반 스팟 집계기
//!
//! 스팟×유전자 카운트 행렬을 깊이 축의 등폭 구간으로 묶어
//! 구간별 카운트/노출/다수결 레이블/셀타입 분해를 만든다.

use std::collections::HashMap;

use anyhow::{ensure, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::config::BinConfig;
use super::edges::DepthBins;
use super::rates::log_rates;
use super::segments::group_segments;

/// 셀타입별 집계 테이블
///
/// 입력 전체에서 관측된 셀타입을 정렬해 한 번 열거하고,
/// 그 순서로 고정된 크기의 테이블을 채운다. 어떤 bin에 해당 셀타입
/// 스팟이 없으면 해당 열은 0으로 남는다 (누락이 아님).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellTypeTable {
    /// 정렬된 셀타입 이름 (테이블 인덱스와 일치)
    pub names: Vec<String>,
    /// 셀타입별 유전자×bin 카운트 행렬
    pub counts: Vec<Array2<f64>>,
    /// 셀타입별 bin 노출 벡터
    pub exposure: Vec<Array1<f64>>,
}

impl CellTypeTable {
    /// 셀타입 이름으로 (카운트, 노출) 조회
    pub fn get(&self, name: &str) -> Option<(&Array2<f64>, &Array1<f64>)> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some((&self.counts[idx], &self.exposure[idx]))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// binning 결과 요약
///
/// 모든 필드는 살아남은 bin 인덱스 기준으로 정렬되어 있으며
/// `bin_depths`는 항상 순증가한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinnedSummary {
    /// 살아남은 bin들의 중점 깊이 (순증가)
    pub bin_depths: Array1<f64>,
    /// 유전자×bin 의사카운트 합산 행렬
    pub counts: Array2<f64>,
    /// bin별 노출 (구성 스팟 노출의 합)
    pub exposure: Array1<f64>,
    /// bin별 다수결 레이어 레이블
    pub labels: Vec<usize>,
    /// bin별 구성 스팟의 셀타입 레이블 (집계하지 않고 그대로 보존)
    pub cell_types: Vec<Vec<String>>,
    /// bin별 구성 스팟 인덱스 (입력 스팟으로의 역추적용)
    pub members: Vec<Vec<usize>>,
    /// 셀타입별 분해 집계
    pub per_cell_type: CellTypeTable,
    /// 다수결 레이블 기준 bin 인덱스 세그먼트
    pub segments: Vec<Vec<usize>>,
}

impl BinnedSummary {
    /// 살아남은 bin 개수
    pub fn num_bins(&self) -> usize {
        self.bin_depths.len()
    }

    /// 중점 깊이로 구성 스팟 인덱스 조회
    pub fn members_at_depth(&self, depth: f64) -> Option<&[usize]> {
        let idx = self.bin_depths.iter().position(|&d| d == depth)?;
        Some(&self.members[idx])
    }

    /// bin별 로그 비율 (0 노출은 NaN 센티널)
    pub fn log_rates(&self) -> Array2<f64> {
        log_rates(&self.counts, &self.exposure)
    }
}

/// 스팟 테이블을 깊이 구간으로 집계
///
/// * `counts` - 스팟×유전자 원시 카운트 행렬 (N×G)
/// * `depth` - 스팟별 깊이 좌표 (N)
/// * `layer_labels` - 스팟별 레이어 레이블 (N)
/// * `cell_types` - 스팟별 셀타입 레이블 (N)
///
/// 노출은 의도적으로 비대칭이다: UMI 필터 이전의 전체 의사카운트 행렬에서
/// 스팟별 행합으로 미리 계산한 뒤, bin 구성원으로 부분집합만 합산한다.
pub fn bin_spots(
    counts: &Array2<f64>,
    depth: &Array1<f64>,
    layer_labels: &[usize],
    cell_types: &[String],
    config: &BinConfig,
) -> Result<BinnedSummary> {
    let n = counts.nrows();
    let g = counts.ncols();
    ensure!(
        depth.len() == n,
        "깊이 배열 길이 불일치: 스팟 {}개, 깊이 {}개",
        n,
        depth.len()
    );
    ensure!(
        layer_labels.len() == n,
        "레이어 레이블 길이 불일치: 스팟 {}개, 레이블 {}개",
        n,
        layer_labels.len()
    );
    ensure!(
        cell_types.len() == n,
        "셀타입 배열 길이 불일치: 스팟 {}개, 셀타입 {}개",
        n,
        cell_types.len()
    );

    // 1. 의사카운트 행렬과 스팟별 노출은 필터링 이전 전체 행렬에서 계산
    let pseudo = counts.mapv(|c| c + config.pseudocount);
    let spot_exposure = pseudo.sum_axis(Axis(1));
    let raw_totals = counts.sum_axis(Axis(1));

    // 2. 구간 축 구성 (유한 깊이 검증 포함)
    let bins = DepthBins::from_depths(depth, config.num_bins)?;

    // 3. UMI 필터를 통과한 스팟만 구간에 배정
    let mut assigned: Vec<Vec<usize>> = vec![Vec::new(); config.num_bins];
    for i in 0..n {
        let d = depth[i];
        if !d.is_finite() || raw_totals[i] <= config.umi_threshold {
            continue;
        }
        assigned[bins.bucketize(d)].push(i);
    }

    // 4. 빈 구간 제거, 깊이 오름차순 유지
    let surviving: Vec<usize> = (0..config.num_bins)
        .filter(|&b| !assigned[b].is_empty())
        .collect();
    let b_count = surviving.len();

    // 5. 셀타입 사전 열거 (정렬된 고정 테이블)
    let mut names: Vec<String> = cell_types.to_vec();
    names.sort();
    names.dedup();
    let ct_index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    let mut binned_counts = Array2::<f64>::zeros((g, b_count));
    let mut binned_exposure = Array1::<f64>::zeros(b_count);
    let mut binned_labels = Vec::with_capacity(b_count);
    let mut binned_cell_types = Vec::with_capacity(b_count);
    let mut ct_counts = vec![Array2::<f64>::zeros((g, b_count)); names.len()];
    let mut ct_exposure = vec![Array1::<f64>::zeros(b_count); names.len()];

    // 6. 구간별 집계
    for (b, &src) in surviving.iter().enumerate() {
        for &i in &assigned[src] {
            let row = pseudo.row(i);
            {
                let mut col = binned_counts.column_mut(b);
                col += &row;
            }
            binned_exposure[b] += spot_exposure[i];

            let ct = ct_index[cell_types[i].as_str()];
            {
                let mut col = ct_counts[ct].column_mut(b);
                col += &row;
            }
            ct_exposure[ct][b] += spot_exposure[i];
        }
        binned_labels.push(majority_label(
            assigned[src].iter().map(|&i| layer_labels[i]),
        ));
        binned_cell_types.push(
            assigned[src]
                .iter()
                .map(|&i| cell_types[i].clone())
                .collect::<Vec<_>>(),
        );
    }

    let bin_depths = Array1::from_iter(surviving.iter().map(|&b| bins.midpoint(b)));
    let members: Vec<Vec<usize>> = surviving.iter().map(|&b| assigned[b].clone()).collect();

    // 7. 레이블 세그먼트: L = 입력 최대 레이블 + 1
    let num_layers = layer_labels.iter().max().map(|&m| m + 1).unwrap_or(0);
    let segments = group_segments(&binned_labels, num_layers);

    log::debug!(
        "binning 완료: 스팟 {}개 중 {}개 유지, bin {}/{}개 생존, 셀타입 {}종",
        n,
        members.iter().map(|m| m.len()).sum::<usize>(),
        b_count,
        config.num_bins,
        names.len()
    );

    Ok(BinnedSummary {
        bin_depths,
        counts: binned_counts,
        exposure: binned_exposure,
        labels: binned_labels,
        cell_types: binned_cell_types,
        members,
        per_cell_type: CellTypeTable {
            names,
            counts: ct_counts,
            exposure: ct_exposure,
        },
        segments,
    })
}

/// 최빈 레이블, 동률이면 가장 작은 레이블
fn majority_label(labels: impl Iterator<Item = usize>) -> usize {
    let mut freq: HashMap<usize, usize> = HashMap::new();
    for l in labels {
        *freq.entry(l).or_insert(0) += 1;
    }
    let mut best: Option<(usize, usize)> = None;
    for (&label, &count) in &freq {
        best = match best {
            Some((bl, bc)) if count < bc || (count == bc && label > bl) => Some((bl, bc)),
            _ => Some((label, count)),
        };
    }
    best.map(|(label, _)| label).unwrap_or(0)
}
