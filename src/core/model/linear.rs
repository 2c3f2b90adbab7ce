//! 학습 가능한 아핀 변환 레이어

use candle_core::{bail, Device, Module, Result, Tensor, Var};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// 아핀 변환 한 층: y = x·Wᵀ + b
///
/// 가중치는 옵티마이저가 제자리에서 갱신할 수 있도록 `Var`로 보관한다.
#[derive(Debug)]
pub struct Affine {
    /// 가중치 (out, in)
    weight: Var,
    /// 편향 (out,)
    bias: Var,
    in_dim: usize,
    out_dim: usize,
}

impl Affine {
    /// U(-k, k), k = 1/√in 초기화로 새 레이어 생성
    ///
    /// 난수는 호출자의 시드 가능한 rng에서 뽑는다.
    pub fn init<R: Rng>(
        in_dim: usize,
        out_dim: usize,
        rng: &mut R,
        device: &Device,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            bail!("아핀 레이어 차원은 0일 수 없음: {}x{}", out_dim, in_dim);
        }
        let k = (1.0 / in_dim as f64).sqrt() as f32;
        let dist = Uniform::new(-k, k);
        let w: Vec<f32> = (0..out_dim * in_dim).map(|_| dist.sample(rng)).collect();
        let b: Vec<f32> = (0..out_dim).map(|_| dist.sample(rng)).collect();

        Ok(Self {
            weight: Var::from_tensor(&Tensor::from_vec(w, (out_dim, in_dim), device)?)?,
            bias: Var::from_tensor(&Tensor::from_vec(b, out_dim, device)?)?,
            in_dim,
            out_dim,
        })
    }

    /// 저장된 가중치/편향 텐서에서 복원
    pub fn from_tensors(weight: &Tensor, bias: &Tensor) -> Result<Self> {
        let (out_dim, in_dim) = weight.dims2()?;
        if bias.dims1()? != out_dim {
            bail!(
                "편향 길이 {}가 가중치 출력 차원 {}와 다름",
                bias.dims1()?,
                out_dim
            );
        }
        Ok(Self {
            weight: Var::from_tensor(weight)?,
            bias: Var::from_tensor(bias)?,
            in_dim,
            out_dim,
        })
    }

    pub fn weight(&self) -> &Var {
        &self.weight
    }

    pub fn bias(&self) -> &Var {
        &self.bias
    }

    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    pub fn out_dim(&self) -> usize {
        self.out_dim
    }
}

impl Module for Affine {
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        x.matmul(&self.weight.t()?)?
            .broadcast_add(self.bias.as_tensor())
    }
}
