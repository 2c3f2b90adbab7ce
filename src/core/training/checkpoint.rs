//! 학습 체크포인트 저장

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::model::SpatialModel;

/// 에포크 번호를 붙여 모델 상태를 저장하고 파일 경로를 돌려줌
///
/// 디렉토리가 없으면 만든다. 저장은 동기적인 단발 쓰기다.
pub fn save_checkpoint(model: &SpatialModel, dir: &Path, epoch: usize) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("체크포인트 디렉토리 생성 실패: {}", dir.display()))?;
    let path = dir.join(format!("model_epoch_{}.safetensors", epoch));
    model
        .save(&path)
        .with_context(|| format!("체크포인트 저장 실패: {}", path.display()))?;
    Ok(path)
}
