use candle_core::{Result, Tensor};
use serde::{Deserialize, Serialize};

/// 활성화 함수 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Relu,
    Gelu,
    Silu,
    Tanh,
}

impl Default for Activation {
    fn default() -> Self {
        Self::Relu
    }
}

impl Activation {
    /// 텐서에 활성화 함수 적용
    pub fn apply(&self, x: &Tensor) -> Result<Tensor> {
        match self {
            Self::Relu => x.relu(),
            Self::Gelu => x.gelu(),
            Self::Silu => x.silu(),
            Self::Tanh => x.tanh(),
        }
    }
}
