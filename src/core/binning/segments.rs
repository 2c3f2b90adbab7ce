/// 다수결 레이블 기준으로 bin 인덱스를 레이어별 세그먼트로 분할
///
/// `segments[l]` = 다수결 레이블이 l인 bin 인덱스들.
/// 정렬이 아니라 그룹화이므로 각 세그먼트 내 순서는 깊이 오름차순 그대로 유지된다.
pub fn group_segments(labels: &[usize], num_layers: usize) -> Vec<Vec<usize>> {
    let mut segments = vec![Vec::new(); num_layers];
    for (b, &l) in labels.iter().enumerate() {
        if l < num_layers {
            segments[l].push(b);
        }
    }
    segments
}
