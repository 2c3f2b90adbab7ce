//! 모멘텀(Momentum) 경사하강 옵티마이저

use candle_core::backprop::GradStore;
use candle_core::{Result, Tensor, Var};
use candle_nn::Optimizer;

use super::config::SgdConfig;

/// 속도(velocity) 항을 가진 경사하강 옵티마이저
///
/// 갱신식: g ← g + wd·θ, v ← μ·v + g, θ ← θ − lr·v.
/// μ = 0이면 순수 경사하강과 동일하다.
#[derive(Debug)]
pub struct MomentumSgd {
    vars: Vec<Var>,
    velocity: Vec<Tensor>,
    config: SgdConfig,
}

impl MomentumSgd {
    /// 속도 상태 초기화
    pub fn reset_velocity(&mut self) -> Result<()> {
        for (var, vel) in self.vars.iter().zip(self.velocity.iter_mut()) {
            *vel = var.zeros_like()?;
        }
        Ok(())
    }

    pub fn momentum(&self) -> f64 {
        self.config.momentum
    }
}

impl Optimizer for MomentumSgd {
    type Config = SgdConfig;

    fn new(vars: Vec<Var>, config: SgdConfig) -> Result<Self> {
        let velocity = vars
            .iter()
            .map(|v| v.zeros_like())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            vars,
            velocity,
            config,
        })
    }

    fn step(&mut self, grads: &GradStore) -> Result<()> {
        for (var, vel) in self.vars.iter().zip(self.velocity.iter_mut()) {
            if let Some(grad) = grads.get(var) {
                // 1. 가중치 감쇠를 그래디언트에 합산
                let grad = if self.config.weight_decay > 0.0 {
                    ((var.as_tensor() * self.config.weight_decay)? + grad)?
                } else {
                    grad.clone()
                };
                // 2. 속도 갱신: v = μ·v + g
                *vel = ((&*vel * self.config.momentum)? + &grad)?;
                // 3. 파라미터 갱신: θ = θ − lr·v
                var.set(&var.sub(&(&*vel * self.config.learning_rate)?)?)?;
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
