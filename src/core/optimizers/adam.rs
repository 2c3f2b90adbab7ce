//! Adam(적응적 모멘트 추정) 옵티마이저

use candle_core::backprop::GradStore;
use candle_core::{Result, Tensor, Var};
use candle_nn::Optimizer;

use super::config::AdamConfig;

/// 파라미터별 모멘트 상태
#[derive(Debug)]
struct MomentState {
    var: Var,
    /// 1차 모멘트
    m: Tensor,
    /// 2차 모멘트
    v: Tensor,
}

/// 편향 보정을 포함한 Adam 옵티마이저
///
/// 가중치 감쇠는 분리형이 아니라 L2 항으로 그래디언트에 합산된다.
#[derive(Debug)]
pub struct Adam {
    states: Vec<MomentState>,
    /// 시간 스텝
    t: usize,
    config: AdamConfig,
}

impl Adam {
    /// 현재 시간 스텝
    pub fn step_count(&self) -> usize {
        self.t
    }

    /// 모멘트 상태와 시간 스텝 초기화
    pub fn reset(&mut self) -> Result<()> {
        self.t = 0;
        for state in self.states.iter_mut() {
            state.m = state.var.zeros_like()?;
            state.v = state.var.zeros_like()?;
        }
        Ok(())
    }
}

impl Optimizer for Adam {
    type Config = AdamConfig;

    fn new(vars: Vec<Var>, config: AdamConfig) -> Result<Self> {
        let states = vars
            .into_iter()
            .map(|var| {
                let m = var.zeros_like()?;
                let v = var.zeros_like()?;
                Ok(MomentState { var, m, v })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            states,
            t: 0,
            config,
        })
    }

    fn step(&mut self, grads: &GradStore) -> Result<()> {
        self.t += 1;
        let b1 = self.config.beta1;
        let b2 = self.config.beta2;
        // 편향 보정 계수
        let correction1 = 1.0 - b1.powi(self.t as i32);
        let correction2 = 1.0 - b2.powi(self.t as i32);

        for state in self.states.iter_mut() {
            if let Some(grad) = grads.get(&state.var) {
                let grad = if self.config.weight_decay > 0.0 {
                    ((state.var.as_tensor() * self.config.weight_decay)? + grad)?
                } else {
                    grad.clone()
                };
                state.m = ((&state.m * b1)? + (&grad * (1.0 - b1))?)?;
                state.v = ((&state.v * b2)? + (grad.sqr()? * (1.0 - b2))?)?;

                let m_hat = (&state.m / correction1)?;
                let v_hat = (&state.v / correction2)?;
                let denom = (v_hat.sqrt()? + self.config.eps)?;
                let delta = ((m_hat / denom)? * self.config.learning_rate)?;
                state.var.set(&state.var.sub(&delta)?)?;
            }
        }
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.config.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.config.learning_rate = lr;
    }
}
