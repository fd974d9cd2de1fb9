/// Keeps the difficulty denominator away from zero for unseen words
pub const EPSILON: f64 = 1e-6;
/// Lowest selection weight any word can get, so every word stays reachable
pub const WEIGHT_FLOOR: f64 = 1e-3;

pub const MIN_SETTING: u8 = 1;
pub const NEUTRAL_SETTING: u8 = 3;
pub const MAX_SETTING: u8 = 5;

/// Difficulty in [0, 1] from answer history: 1 = never answered correctly, 0 = always correct.
pub fn word_difficulty(display_count: u32, correct_count: u32) -> f64 {
    1.0 - (correct_count as f64 / (display_count as f64 + EPSILON))
}

/// Sampling weight for a word given the user's difficulty setting (1-5).
///
/// Setting 3 samples uniformly. Lower settings raise `1 - difficulty` to the
/// distance from 3, favouring easy words; higher settings raise `difficulty`
/// the same way, favouring hard ones.
pub fn selection_weight(word_difficulty: f64, user_setting: u8) -> f64 {
    let setting = user_setting.clamp(MIN_SETTING, MAX_SETTING) as i32;
    let bias = setting - NEUTRAL_SETTING as i32;
    let difficulty = word_difficulty.clamp(0.0, 1.0);

    let weight = match bias {
        b if b < 0 => (1.0 - difficulty).powi(b.abs()),
        b if b > 0 => difficulty.powi(b),
        _ => 1.0,
    };

    weight.max(WEIGHT_FLOOR)
}
