//! 공간 전사체 발현 분석 라이브러리
//!
//! 스팟 단위 카운트를 깊이 축으로 binning 집계하고, 2차원 좌표를
//! 1차원 공간 임베딩을 거쳐 발현 프로파일로 보내는 신경망을 학습한다.

pub mod core;

// 핵심 모듈들 재수출
pub use self::core::{
    // binning 집계
    bin_spots, log_rates, BinConfig, BinnedSummary, CellTypeTable, DepthBins,
    // 공간 모델
    Activation, Affine, FeedForward, SpatialModel, SpatialModelConfig,
    // 옵티마이저
    Adam, AdamConfig, MomentumSgd, OptimizerType, SgdConfig,
    // 학습
    save_checkpoint, train, LossReduction, TrainConfig,
};

// 편의 타입 별칭들
pub type LossTrajectory = Vec<f32>;
