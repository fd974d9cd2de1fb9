use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const BASE_POINTS: i64 = 10;
pub const PENALTY_POINTS: i64 = 10;
pub const PENALTY_TIME_SECS: u32 = 10;
pub const MAX_HP_USES: u32 = 3;
pub const MAX_SPEED_BONUS: i64 = 10;

/// How revealing the answer is paid for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PenaltyPolicy {
    /// Deduct points from the running score
    Score { points: i64 },
    /// Deduct seconds from the session timer
    Time { seconds: u32 },
    /// Free reveals, but only `max_uses` of them ("HP")
    Limit { max_uses: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShowAnswerConfig {
    pub enabled: bool,
    pub policy: PenaltyPolicy,
}

impl Default for ShowAnswerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: PenaltyPolicy::Score {
                points: PENALTY_POINTS,
            },
        }
    }
}

impl ShowAnswerConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn score(points: i64) -> Self {
        Self {
            enabled: true,
            policy: PenaltyPolicy::Score { points },
        }
    }

    pub fn time(seconds: u32) -> Self {
        Self {
            enabled: true,
            policy: PenaltyPolicy::Time { seconds },
        }
    }

    pub fn limit(max_uses: u32) -> Self {
        Self {
            enabled: true,
            policy: PenaltyPolicy::Limit { max_uses },
        }
    }
}

/// Parses `off`, `points[:N]`, `time[:N]` or `limit[:N]`. A bare policy name
/// takes its usual amount: 10 points, 10 seconds, 3 uses.
impl FromStr for ShowAnswerConfig {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRevealPolicy(raw.to_string());
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("off") {
            return Ok(Self::disabled());
        }
        let (kind, amount) = match raw.split_once(':') {
            Some((kind, amount)) => (kind, Some(amount.trim())),
            None => (raw, None),
        };
        match kind.to_ascii_lowercase().as_str() {
            "points" => {
                let points = amount.map_or(Ok(PENALTY_POINTS), str::parse);
                points.map(Self::score).map_err(|_| invalid())
            }
            "time" => {
                let seconds = amount.map_or(Ok(PENALTY_TIME_SECS), str::parse);
                seconds.map(Self::time).map_err(|_| invalid())
            }
            "limit" => {
                let uses = amount.map_or(Ok(MAX_HP_USES), str::parse);
                uses.map(Self::limit).map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }
}

/// Result of scoring one submitted answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDelta {
    pub total: i64,
    pub delta: i64,
    pub correct: bool,
}

/// Result of a show-answer request; callers render it as-is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevealOutcome {
    pub allowed: bool,
    pub score_delta: i64,
    /// `None` means reveals are unlimited
    pub remaining_uses: Option<u32>,
    pub time_penalty_secs: f64,
    pub new_score: i64,
    /// Expected answer, present only when the reveal was allowed
    pub answer: Option<String>,
}

impl RevealOutcome {
    pub fn denied(score: i64, remaining_uses: Option<u32>) -> Self {
        Self {
            allowed: false,
            score_delta: 0,
            remaining_uses,
            time_penalty_secs: 0.0,
            new_score: score,
            answer: None,
        }
    }
}

/// Bonus for a fast correct answer in Speed mode.
///
/// `round(MAX_SPEED_BONUS * (1 - clamp(response / budget, 0, 1)))`
pub fn speed_bonus(response_secs: f64, budget_secs: f64) -> i64 {
    if budget_secs <= 0.0 || !response_secs.is_finite() {
        return 0;
    }
    let ratio = (response_secs / budget_secs).clamp(0.0, 1.0);
    ((MAX_SPEED_BONUS as f64) * (1.0 - ratio)).round() as i64
}

/// Running score plus the reveal budget for one session
#[derive(Debug, Clone)]
pub struct ScoreManager {
    score: i64,
    wrong_penalty: i64,
    show_config: ShowAnswerConfig,
    reveals_used: u32,
}

impl ScoreManager {
    pub fn new(show_config: ShowAnswerConfig, wrong_penalty: i64) -> Self {
        Self {
            score: 0,
            wrong_penalty: wrong_penalty.max(0),
            show_config,
            reveals_used: 0,
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn reveals_used(&self) -> u32 {
        self.reveals_used
    }

    pub fn show_config(&self) -> &ShowAnswerConfig {
        &self.show_config
    }

    /// Remaining reveals under the limit policy, `None` otherwise
    pub fn remaining_uses(&self) -> Option<u32> {
        match self.show_config.policy {
            PenaltyPolicy::Limit { max_uses } => Some(max_uses.saturating_sub(self.reveals_used)),
            _ => None,
        }
    }

    /// Score a submitted answer. `bonus` is only added to correct answers.
    pub fn apply_answer(&mut self, correct: bool, bonus: i64) -> ScoreDelta {
        let delta = if correct {
            BASE_POINTS + bonus.clamp(0, MAX_SPEED_BONUS)
        } else {
            -self.wrong_penalty
        };
        self.score += delta;
        ScoreDelta {
            total: self.score,
            delta,
            correct,
        }
    }

    /// Charge for a reveal under the configured policy.
    ///
    /// The time policy only reports a penalty when a timer is running; applying
    /// it to the timer is left to the caller that owns the timer.
    pub fn reveal(&mut self, timer_active: bool) -> RevealOutcome {
        if !self.show_config.enabled {
            return RevealOutcome::denied(self.score, None);
        }

        let (score_delta, time_penalty_secs) = match self.show_config.policy {
            PenaltyPolicy::Score { points } => (-points.max(0), 0.0),
            PenaltyPolicy::Time { seconds } => {
                let secs = if timer_active { seconds as f64 } else { 0.0 };
                (0, secs)
            }
            PenaltyPolicy::Limit { max_uses } => {
                if self.reveals_used >= max_uses {
                    return RevealOutcome::denied(self.score, Some(0));
                }
                (0, 0.0)
            }
        };

        self.score += score_delta;
        self.reveals_used += 1;

        RevealOutcome {
            allowed: true,
            score_delta,
            remaining_uses: self.remaining_uses(),
            time_penalty_secs,
            new_score: self.score,
            answer: None,
        }
    }
}
