//! 공간 모델 모듈

pub mod activation;
pub mod linear;
pub mod spatial;

pub use activation::Activation;
pub use linear::Affine;
pub use spatial::{FeedForward, SpatialModel, SpatialModelConfig};
