//! 공간 좌표 → 상대 깊이 → 발현 프로파일 모델
//!
//! 임베딩 네트워크 f_S: R² → R와 발현 네트워크 f_A: R → R^G를
//! 순서대로 합성한 2단 함수 근사기.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{bail, Device, Module, Result, Tensor, Var};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::activation::Activation;
use super::linear::Affine;

/// 아핀 스택 피드포워드 네트워크
///
/// 마지막 층을 제외한 모든 층 사이에 활성화가 들어간다.
#[derive(Debug)]
pub struct FeedForward {
    layers: Vec<Affine>,
    activation: Activation,
}

impl FeedForward {
    /// 전체 차원 체인으로 스택 구성 (예: `[2, 50, 1]`)
    pub fn init<R: Rng>(
        dims: &[usize],
        activation: Activation,
        rng: &mut R,
        device: &Device,
    ) -> Result<Self> {
        if dims.len() < 2 {
            bail!("차원 체인에는 입력과 출력이 모두 필요함: {:?}", dims);
        }
        let mut layers = Vec::with_capacity(dims.len() - 1);
        for w in dims.windows(2) {
            layers.push(Affine::init(w[0], w[1], rng, device)?);
        }
        Ok(Self { layers, activation })
    }

    /// `{prefix}.{i}.weight` / `{prefix}.{i}.bias` 이름 규약으로 복원
    pub fn from_tensors(
        prefix: &str,
        tensors: &HashMap<String, Tensor>,
        activation: Activation,
    ) -> Result<Self> {
        let mut layers = Vec::new();
        loop {
            let w_key = format!("{}.{}.weight", prefix, layers.len());
            let b_key = format!("{}.{}.bias", prefix, layers.len());
            match (tensors.get(&w_key), tensors.get(&b_key)) {
                (Some(w), Some(b)) => layers.push(Affine::from_tensors(w, b)?),
                _ => break,
            }
        }
        if layers.is_empty() {
            bail!("'{}' 레이어 텐서가 없음", prefix);
        }
        Ok(Self { layers, activation })
    }

    pub fn layers(&self) -> &[Affine] {
        &self.layers
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn in_dim(&self) -> usize {
        self.layers[0].in_dim()
    }

    pub fn out_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim()
    }
}

impl Module for FeedForward {
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let last = self.layers.len() - 1;
        let mut h = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            h = layer.forward(&h)?;
            if i != last {
                h = self.activation.apply(&h)?;
            }
        }
        Ok(h)
    }
}

/// 공간 모델 구성
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialModelConfig {
    /// 유전자/특징 개수 G
    pub num_genes: usize,
    /// 임베딩 네트워크 은닉층 폭 (예: [50]은 폭 50 은닉층 하나)
    pub s_hidden: Vec<usize>,
    /// 발현 네트워크 은닉층 폭 (예: [10, 10]은 폭 10 은닉층 둘)
    pub a_hidden: Vec<usize>,
    /// 활성화 함수
    pub activation: Activation,
}

impl SpatialModelConfig {
    pub fn new(num_genes: usize, s_hidden: Vec<usize>, a_hidden: Vec<usize>) -> Self {
        Self {
            num_genes,
            s_hidden,
            a_hidden,
            activation: Activation::default(),
        }
    }
}

/// 2차원 공간 좌표를 스칼라 상대 깊이로 보낸 뒤 발현 벡터로 펼치는 모델
///
/// 확률적 레이어가 없으므로 파라미터가 고정이면 평가는 결정적이다.
#[derive(Debug)]
pub struct SpatialModel {
    /// 임베딩 네트워크 f_S: R² → R
    spatial_embedding: FeedForward,
    /// 발현 네트워크 f_A: R → R^G
    expression_function: FeedForward,
}

impl SpatialModel {
    /// 설정과 시드된 rng로 새 모델 생성
    pub fn new<R: Rng>(
        config: &SpatialModelConfig,
        rng: &mut R,
        device: &Device,
    ) -> Result<Self> {
        if config.num_genes == 0 {
            bail!("num_genes는 1 이상이어야 함");
        }
        if config
            .s_hidden
            .iter()
            .chain(config.a_hidden.iter())
            .any(|&w| w == 0)
        {
            bail!("은닉층 폭은 0일 수 없음");
        }

        let mut s_dims = vec![2];
        s_dims.extend_from_slice(&config.s_hidden);
        s_dims.push(1);

        let mut a_dims = vec![1];
        a_dims.extend_from_slice(&config.a_hidden);
        a_dims.push(config.num_genes);

        Ok(Self {
            spatial_embedding: FeedForward::init(&s_dims, config.activation, rng, device)?,
            expression_function: FeedForward::init(&a_dims, config.activation, rng, device)?,
        })
    }

    /// 좌표 배치의 스칼라 상대 깊이 (N×2 → N×1)
    pub fn embed(&self, s: &Tensor) -> Result<Tensor> {
        self.spatial_embedding.forward(s)
    }

    /// 유전자/특징 개수 G
    pub fn num_genes(&self) -> usize {
        self.expression_function.out_dim()
    }

    pub fn spatial_embedding(&self) -> &FeedForward {
        &self.spatial_embedding
    }

    pub fn expression_function(&self) -> &FeedForward {
        &self.expression_function
    }

    /// 옵티마이저에 넘길 학습 파라미터 전체
    pub fn all_vars(&self) -> Vec<Var> {
        let mut vars = Vec::new();
        for net in [&self.spatial_embedding, &self.expression_function] {
            for layer in net.layers() {
                vars.push(layer.weight().clone());
                vars.push(layer.bias().clone());
            }
        }
        vars
    }

    /// 체크포인트 저장용 이름→텐서 맵
    pub fn named_tensors(&self) -> HashMap<String, Tensor> {
        let mut tensors = HashMap::new();
        for (prefix, net) in [
            ("spatial_embedding", &self.spatial_embedding),
            ("expression_function", &self.expression_function),
        ] {
            for (i, layer) in net.layers().iter().enumerate() {
                tensors.insert(
                    format!("{}.{}.weight", prefix, i),
                    layer.weight().as_tensor().clone(),
                );
                tensors.insert(
                    format!("{}.{}.bias", prefix, i),
                    layer.bias().as_tensor().clone(),
                );
            }
        }
        tensors
    }

    /// 모델 상태를 safetensors 파일로 저장
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        candle_core::safetensors::save(&self.named_tensors(), path)
    }

    /// 저장된 파일에서 모델 복원
    ///
    /// 레이어 구조는 텐서 형상에서 유도되므로 설정 없이 활성화만 지정한다.
    pub fn load<P: AsRef<Path>>(path: P, activation: Activation, device: &Device) -> Result<Self> {
        let tensors = candle_core::safetensors::load(path, device)?;
        let spatial_embedding = FeedForward::from_tensors("spatial_embedding", &tensors, activation)?;
        let expression_function =
            FeedForward::from_tensors("expression_function", &tensors, activation)?;
        if spatial_embedding.out_dim() != 1 || expression_function.in_dim() != 1 {
            bail!("임베딩 출력과 발현 입력 차원은 1이어야 함");
        }
        Ok(Self {
            spatial_embedding,
            expression_function,
        })
    }
}

impl Module for SpatialModel {
    fn forward(&self, s: &Tensor) -> Result<Tensor> {
        let z = self.spatial_embedding.forward(s)?;
        self.expression_function.forward(&z)
    }
}
