use serde::{Deserialize, Serialize};

/// 깊이 binning 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinConfig {
    /// 깊이 축을 나누는 등폭 구간 개수
    pub num_bins: usize,
    /// 합산 전 모든 원시 카운트에 더해지는 의사카운트
    pub pseudocount: f64,
    /// 총 원시 카운트가 이 값 이하인 스팟은 집계에서 완전히 제외
    pub umi_threshold: f64,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            num_bins: 70,
            pseudocount: 1.0,
            umi_threshold: 500.0,
        }
    }
}

impl BinConfig {
    /// 구간 개수만 지정하는 생성자
    pub fn new(num_bins: usize) -> Self {
        Self {
            num_bins,
            ..Default::default()
        }
    }

    pub fn with_thresholds(num_bins: usize, pseudocount: f64, umi_threshold: f64) -> Self {
        Self {
            num_bins,
            pseudocount,
            umi_threshold,
        }
    }
}
