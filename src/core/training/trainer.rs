//! 공간 모델 학습 루프
//!
//! 좌표 S(N×2)와 목표 발현 A(N×G)로 모델을 경사하강 학습시키고
//! 에포크별 손실 궤적을 돌려준다.

use std::path::PathBuf;

use anyhow::{ensure, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::Optimizer;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::checkpoint::save_checkpoint;
use crate::core::model::{Activation, SpatialModel, SpatialModelConfig};
use crate::core::optimizers::{Adam, AdamConfig, MomentumSgd, OptimizerType, SgdConfig};

/// 제곱오차 손실 축약 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReduction {
    Mean,
    Sum,
}

impl Default for LossReduction {
    fn default() -> Self {
        Self::Mean
    }
}

/// 학습 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// 임베딩 네트워크 은닉층 폭 (모델을 새로 만들 때만 사용)
    pub s_hidden: Vec<usize>,
    /// 발현 네트워크 은닉층 폭 (모델을 새로 만들 때만 사용)
    pub a_hidden: Vec<usize>,
    /// 활성화 함수
    pub activation: Activation,
    /// 학습 에포크 수
    pub epochs: usize,
    /// None이면 에포크마다 전체 배치 한 번의 갱신
    pub batch_size: Option<usize>,
    /// 이 간격의 배수 에포크(0 포함)마다 진행 신호와 저장
    pub checkpoint: usize,
    /// 체크포인트 저장 디렉토리 (None이면 저장하지 않음)
    pub save_path: Option<PathBuf>,
    /// 손실 축약 방식
    pub loss_reduction: LossReduction,
    /// 옵티마이저 종류
    pub optimizer: OptimizerType,
    /// 학습률
    pub learning_rate: f64,
    /// 가중치 감쇠
    pub weight_decay: f64,
    /// 모멘텀 계수 (SGD에서만 사용)
    pub momentum: f64,
    /// 초기화와 에포크별 순열을 재현 가능하게 만드는 시드
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            s_hidden: Vec::new(),
            a_hidden: Vec::new(),
            activation: Activation::default(),
            epochs: 1000,
            batch_size: None,
            checkpoint: 100,
            save_path: None,
            loss_reduction: LossReduction::default(),
            optimizer: OptimizerType::default(),
            learning_rate: 1e-3,
            weight_decay: 0.0,
            momentum: 0.0,
            seed: 0,
        }
    }
}

/// 옵티마이저 선택 디스패치
enum TrainOptimizer {
    Sgd(MomentumSgd),
    Adam(Adam),
}

impl TrainOptimizer {
    fn backward_step(&mut self, loss: &Tensor) -> candle_core::Result<()> {
        match self {
            Self::Sgd(opt) => opt.backward_step(loss),
            Self::Adam(opt) => opt.backward_step(loss),
        }
    }
}

/// 평균/합 축약 제곱오차
fn mse_loss(
    pred: &Tensor,
    target: &Tensor,
    reduction: LossReduction,
) -> candle_core::Result<Tensor> {
    match reduction {
        LossReduction::Mean => candle_nn::loss::mse(pred, target),
        LossReduction::Sum => (pred - target)?.sqr()?.sum_all(),
    }
}

/// 공간 모델 학습
///
/// * `s` - 스팟 좌표 텐서 (N×2)
/// * `a` - 목표 발현 텐서 (N×G)
/// * `model` - 이어서 학습할 모델. None이면 설정의 은닉층 폭으로 새로 구성
///
/// 반환값은 학습된 모델과 길이 `epochs`의 에포크별 손실 궤적.
/// 발산이나 NaN 손실은 막지 않으므로 궤적으로 호출자가 감시한다.
pub fn train(
    s: &Tensor,
    a: &Tensor,
    model: Option<SpatialModel>,
    config: &TrainConfig,
    device: &Device,
) -> Result<(SpatialModel, Vec<f32>)> {
    let (n, coord_dim) = s.dims2()?;
    ensure!(coord_dim == 2, "좌표 텐서는 N×2여야 함: N×{}", coord_dim);
    let (a_rows, num_genes) = a.dims2()?;
    ensure!(
        a_rows == n,
        "좌표 {}행과 발현 {}행이 일치하지 않음",
        n,
        a_rows
    );
    ensure!(config.checkpoint >= 1, "체크포인트 간격은 1 이상이어야 함");
    if let Some(batch_size) = config.batch_size {
        ensure!(batch_size >= 1, "배치 크기는 1 이상이어야 함");
    }

    let mut rng = StdRng::seed_from_u64(config.seed);

    // 1. 모델이 없으면 목표 특징 차원에 맞춰 새로 구성
    let model = match model {
        Some(m) => {
            ensure!(
                m.num_genes() == num_genes,
                "모델 출력 차원 {}와 데이터 특징 차원 {}가 일치하지 않음",
                m.num_genes(),
                num_genes
            );
            m
        }
        None => {
            let model_config = SpatialModelConfig {
                num_genes,
                s_hidden: config.s_hidden.clone(),
                a_hidden: config.a_hidden.clone(),
                activation: config.activation,
            };
            SpatialModel::new(&model_config, &mut rng, device)?
        }
    };

    // 2. 옵티마이저 구성
    let mut opt = match config.optimizer {
        OptimizerType::Sgd => TrainOptimizer::Sgd(MomentumSgd::new(
            model.all_vars(),
            SgdConfig {
                learning_rate: config.learning_rate,
                momentum: config.momentum,
                weight_decay: config.weight_decay,
            },
        )?),
        OptimizerType::Adam => TrainOptimizer::Adam(Adam::new(
            model.all_vars(),
            AdamConfig {
                learning_rate: config.learning_rate,
                weight_decay: config.weight_decay,
                ..Default::default()
            },
        )?),
    };

    let mut loss_list = vec![0.0f32; config.epochs];

    // 3. 에포크 루프
    for epoch in 0..config.epochs {
        if epoch % config.checkpoint == 0 {
            log::info!("epoch: {}", epoch);
            if let Some(dir) = &config.save_path {
                let path = save_checkpoint(&model, dir, epoch)?;
                log::debug!("체크포인트 저장: {}", path.display());
            }
        }

        match config.batch_size {
            None => {
                // 전체 배치 한 번의 순전파/역전파/갱신
                let loss = mse_loss(&model.forward(s)?, a, config.loss_reduction)?;
                loss_list[epoch] += loss.to_scalar::<f32>()?;
                opt.backward_step(&loss)?;
            }
            Some(batch_size) => {
                // 에포크마다 새로 뽑은 순열을 연속 구간으로 잘라 미니배치 구성.
                // 구간별 손실은 평균이 아니라 합으로 에포크 항목에 누적된다.
                let mut permutation: Vec<usize> = (0..n).collect();
                permutation.shuffle(&mut rng);

                for chunk in permutation.chunks(batch_size) {
                    let idx: Vec<u32> = chunk.iter().map(|&i| i as u32).collect();
                    let idx = Tensor::from_vec(idx, chunk.len(), device)?;
                    let s_batch = s.index_select(&idx, 0)?;
                    let a_batch = a.index_select(&idx, 0)?;

                    let loss =
                        mse_loss(&model.forward(&s_batch)?, &a_batch, config.loss_reduction)?;
                    loss_list[epoch] += loss.to_scalar::<f32>()?;
                    opt.backward_step(&loss)?;
                }
            }
        }
    }

    Ok((model, loss_list))
}
