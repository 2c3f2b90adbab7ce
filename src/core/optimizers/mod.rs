//! 옵티마이저 모듈
//!
//! 두 옵티마이저 모두 `candle_nn::Optimizer` 트레이트로 모델 `Var`들을
//! 제자리에서 갱신한다. 학습 중 파라미터를 변경하는 유일한 경로다.

pub mod adam;
pub mod config;
pub mod momentum;

pub use adam::Adam;
pub use config::{AdamConfig, SgdConfig};
pub use momentum::MomentumSgd;

use serde::{Deserialize, Serialize};

/// 트레이너가 선택하는 옵티마이저 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerType {
    Sgd,
    Adam,
}

impl Default for OptimizerType {
    fn default() -> Self {
        Self::Sgd
    }
}
