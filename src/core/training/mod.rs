//! 학습 루프 모듈

pub mod checkpoint;
pub mod trainer;

pub use checkpoint::save_checkpoint;
pub use trainer::{train, LossReduction, TrainConfig};

#[cfg(test)]
pub mod __tests__;
