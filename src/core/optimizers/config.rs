use serde::{Deserialize, Serialize};

/// 모멘텀 SGD 구성
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgdConfig {
    /// 학습률
    pub learning_rate: f64,
    /// 모멘텀 계수 (0이면 순수 경사하강)
    pub momentum: f64,
    /// L2 방식 가중치 감쇠 (그래디언트에 더해짐)
    pub weight_decay: f64,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            momentum: 0.0,
            weight_decay: 0.0,
        }
    }
}

/// Adam 구성
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdamConfig {
    /// 학습률
    pub learning_rate: f64,
    /// 1차 모멘트 지수 감쇠율
    pub beta1: f64,
    /// 2차 모멘트 지수 감쇠율
    pub beta2: f64,
    /// 수치 안정성을 위한 작은 값
    pub eps: f64,
    /// L2 방식 가중치 감쇠 (그래디언트에 더해짐)
    pub weight_decay: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            weight_decay: 0.0,
        }
    }
}
