/// Average session score, `None` for an empty history
pub fn mean_score(scores: &[i64]) -> Option<f64> {
    match scores.len() {
        0 => None,
        n => Some(scores.iter().sum::<i64>() as f64 / n as f64),
    }
}

/// Share of correct answers as a rounded percentage; 0 when nothing was asked
pub fn accuracy_percent(correct: u32, asked: u32) -> f64 {
    match asked {
        0 => 0.0,
        n => ((correct as f64 / n as f64) * 100.0).round(),
    }
}
