//! 카운트/노출 로그 비율 계산

use ndarray::{Array1, Array2};

/// 유전자×bin 카운트 행렬과 bin별 노출로부터 로그 비율을 계산
///
/// 노출이 0인 bin은 나눗셈 대신 NaN 센티널을 채운다.
/// 카운트가 0인 칸은 ln(0) = -inf가 그대로 전파된다.
pub fn log_rates(counts: &Array2<f64>, exposure: &Array1<f64>) -> Array2<f64> {
    let (g, b) = counts.dim();
    let mut rates = Array2::<f64>::zeros((g, b));
    for bi in 0..b {
        let e = exposure[bi];
        for gi in 0..g {
            rates[[gi, bi]] = if e > 0.0 {
                (counts[[gi, bi]] / e).ln()
            } else {
                f64::NAN
            };
        }
    }
    rates
}
