use crate::difficulty::{MAX_SETTING, MIN_SETTING};
use crate::error::ConfigError;
use crate::scoring::{ScoreManager, ShowAnswerConfig, PENALTY_POINTS};
use crate::word::{Direction, Mode};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything chosen up front for one session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub direction: Direction,
    /// 1 (favour easy words) to 5 (favour hard words)
    pub difficulty: u8,
    pub question_limit: Option<u32>,
    pub time_limit_secs: Option<u32>,
    /// Per-question budget for the Speed mode bonus; falls back to the session limit
    pub question_time_secs: Option<u32>,
    pub show_answer: ShowAnswerConfig,
    pub wrong_penalty: i64,
    pub multiple_choice: bool,
}

impl SessionConfig {
    fn base(mode: Mode, direction: Direction, difficulty: u8) -> Self {
        Self {
            mode,
            direction,
            difficulty,
            question_limit: None,
            time_limit_secs: None,
            question_time_secs: None,
            show_answer: ShowAnswerConfig::default(),
            wrong_penalty: PENALTY_POINTS,
            multiple_choice: false,
        }
    }

    pub fn endless(direction: Direction, difficulty: u8) -> Self {
        Self::base(Mode::Endless, direction, difficulty)
    }

    pub fn speed(direction: Direction, difficulty: u8, seconds: u32) -> Self {
        Self {
            time_limit_secs: Some(seconds),
            ..Self::base(Mode::Speed, direction, difficulty)
        }
    }

    pub fn testing(direction: Direction, difficulty: u8, questions: u32) -> Self {
        Self {
            question_limit: Some(questions),
            ..Self::base(Mode::Testing, direction, difficulty)
        }
    }

    pub fn with_show_answer(mut self, show_answer: ShowAnswerConfig) -> Self {
        self.show_answer = show_answer;
        self
    }

    pub fn with_wrong_penalty(mut self, points: i64) -> Self {
        self.wrong_penalty = points;
        self
    }

    pub fn with_question_limit(mut self, questions: u32) -> Self {
        self.question_limit = Some(questions);
        self
    }

    pub fn with_time_limit(mut self, seconds: u32) -> Self {
        self.time_limit_secs = Some(seconds);
        self
    }

    pub fn with_question_time(mut self, seconds: u32) -> Self {
        self.question_time_secs = Some(seconds);
        self
    }

    pub fn with_multiple_choice(mut self, enabled: bool) -> Self {
        self.multiple_choice = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SETTING..=MAX_SETTING).contains(&self.difficulty) {
            return Err(ConfigError::DifficultyOutOfRange(self.difficulty));
        }
        if self.time_limit_secs == Some(0) || self.question_time_secs == Some(0) {
            return Err(ConfigError::NonPositiveTimeLimit);
        }
        if self.question_limit == Some(0) {
            return Err(ConfigError::NonPositiveQuestionLimit);
        }
        match self.mode {
            Mode::Speed if self.time_limit_secs.is_none() => Err(ConfigError::MissingTimeLimit),
            Mode::Testing if self.question_limit.is_none() => {
                Err(ConfigError::MissingQuestionLimit)
            }
            _ => Ok(()),
        }
    }

    /// Seconds a Speed mode answer is measured against for the bonus
    pub fn bonus_budget_secs(&self) -> Option<f64> {
        match self.mode {
            Mode::Speed => self
                .question_time_secs
                .or(self.time_limit_secs)
                .map(|s| s as f64),
            _ => None,
        }
    }
}

/// The card currently in front of the user
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub word_id: i64,
    pub prompt: String,
    pub expected_answer: String,
    pub direction: Direction,
    /// Shuffled options when multiple choice is on, empty otherwise
    pub choices: Vec<String>,
    pub revealed: bool,
    pub penalty: i64,
    pub time_penalty_secs: f64,
    pub(crate) shown_at: Duration,
}

/// One asked card as it ended up; appended in order and never changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub word_id: i64,
    pub prompt: String,
    pub expected_answer: String,
    pub given_answer: Option<String>,
    pub correct: bool,
    pub revealed: bool,
    pub penalty: i64,
    pub time_penalty_secs: f64,
}

impl QuestionRecord {
    pub(crate) fn from_card(card: &Card, given_answer: Option<String>, correct: bool) -> Self {
        Self {
            word_id: card.word_id,
            prompt: card.prompt.clone(),
            expected_answer: card.expected_answer.clone(),
            given_answer,
            correct,
            revealed: card.revealed,
            penalty: card.penalty,
            time_penalty_secs: card.time_penalty_secs,
        }
    }
}

/// Returned from every answer submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub is_correct: bool,
    pub correct_answer: String,
    pub new_score: i64,
    pub delta: i64,
    pub speed_bonus: i64,
    pub finished: bool,
}

/// Mutable progress of a running session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub config: SessionConfig,
    pub current: Option<Card>,
    pub asked: u32,
    pub correct: u32,
    pub finished: bool,
    pub started_at: DateTime<Local>,
    pub ended_at: Option<DateTime<Local>>,
    pub(crate) scores: ScoreManager,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Self {
        let scores = ScoreManager::new(config.show_answer, config.wrong_penalty);
        Self {
            config,
            current: None,
            asked: 0,
            correct: 0,
            finished: false,
            started_at: Local::now(),
            ended_at: None,
            scores,
        }
    }

    pub fn score(&self) -> i64 {
        self.scores.score()
    }

    pub fn revealed(&self) -> u32 {
        self.scores.reveals_used()
    }

    pub fn remaining_reveals(&self) -> Option<u32> {
        self.scores.remaining_uses()
    }

    pub(crate) fn reached_question_limit(&self) -> bool {
        self.config
            .question_limit
            .is_some_and(|limit| self.asked >= limit)
    }

    pub(crate) fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.ended_at = Some(Local::now());
        }
    }
}

/// What gets persisted when a session ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub mode: Mode,
    pub direction: Direction,
    pub score: i64,
    pub total_asked: u32,
    pub total_correct: u32,
    pub total_revealed: u32,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub results: Vec<QuestionRecord>,
}

impl SessionSummary {
    pub fn accuracy(&self) -> f64 {
        crate::util::accuracy_percent(self.total_correct, self.total_asked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_constructors_validate() {
        assert!(SessionConfig::endless(Direction::Mixed, 3).validate().is_ok());
        assert!(SessionConfig::speed(Direction::Mixed, 3, 60).validate().is_ok());
        assert!(SessionConfig::testing(Direction::Mixed, 3, 10)
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_bad_difficulty() {
        assert_eq!(
            SessionConfig::endless(Direction::Mixed, 0).validate(),
            Err(ConfigError::DifficultyOutOfRange(0))
        );
        assert_eq!(
            SessionConfig::endless(Direction::Mixed, 6).validate(),
            Err(ConfigError::DifficultyOutOfRange(6))
        );
    }

    #[test]
    fn rejects_zero_limits() {
        assert_eq!(
            SessionConfig::speed(Direction::Mixed, 3, 0).validate(),
            Err(ConfigError::NonPositiveTimeLimit)
        );
        assert_eq!(
            SessionConfig::testing(Direction::Mixed, 3, 0).validate(),
            Err(ConfigError::NonPositiveQuestionLimit)
        );
    }

    #[test]
    fn rejects_modes_missing_their_limit() {
        let mut speed = SessionConfig::speed(Direction::Mixed, 3, 10);
        speed.time_limit_secs = None;
        assert_eq!(speed.validate(), Err(ConfigError::MissingTimeLimit));

        let mut testing = SessionConfig::testing(Direction::Mixed, 3, 10);
        testing.question_limit = None;
        assert_eq!(testing.validate(), Err(ConfigError::MissingQuestionLimit));
    }

    #[test]
    fn bonus_budget_only_in_speed_mode() {
        let speed = SessionConfig::speed(Direction::Mixed, 3, 120);
        assert_eq!(speed.bonus_budget_secs(), Some(120.0));
        assert_eq!(speed.with_question_time(15).bonus_budget_secs(), Some(15.0));
        assert_eq!(
            SessionConfig::endless(Direction::Mixed, 3)
                .with_time_limit(60)
                .bonus_budget_secs(),
            None
        );
    }

    #[test]
    fn finish_is_sticky() {
        let mut state = SessionState::new(SessionConfig::endless(Direction::Mixed, 3));
        state.finish();
        let ended = state.ended_at;
        state.finish();
        assert!(state.finished);
        assert_eq!(state.ended_at, ended);
    }
}
