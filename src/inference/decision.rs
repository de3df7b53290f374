/// Index and value of the highest score. The first index wins a tie and NaN
/// never wins. `None` when there is no comparable score.
pub fn top_class(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;

    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }

    best
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits
        .iter()
        .cloned()
        .filter(|l| !l.is_nan())
        .fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().filter(|e| !e.is_nan()).sum();

    if sum == 0.0 || !sum.is_finite() {
        return exps;
    }
    exps.into_iter().map(|e| e / sum).collect()
}
