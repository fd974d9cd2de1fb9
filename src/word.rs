use crate::difficulty::word_difficulty;
use serde::{Deserialize, Serialize};

/// A vocabulary pair with the performance counters used for adaptive selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub english: String,
    pub vietnamese: String,
    pub part_of_speech: Option<String>,
    pub display_count: u32,
    pub correct_count: u32,
    pub difficulty: f64,
}

impl Word {
    pub fn new(id: i64, english: impl Into<String>, vietnamese: impl Into<String>) -> Self {
        Self {
            id,
            english: english.into(),
            vietnamese: vietnamese.into(),
            part_of_speech: None,
            display_count: 0,
            correct_count: 0,
            difficulty: word_difficulty(0, 0),
        }
    }

    pub fn with_part_of_speech(mut self, part: impl Into<String>) -> Self {
        self.part_of_speech = Some(part.into());
        self
    }

    /// Count one showing of this word and refresh the cached difficulty.
    pub fn record_answer(&mut self, correct: bool) {
        self.display_count += 1;
        if correct {
            self.correct_count += 1;
        }
        self.difficulty = word_difficulty(self.display_count, self.correct_count);
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[strum(serialize = "eng_to_vn")]
    #[value(name = "en-vi")]
    EnglishToVietnamese,
    #[strum(serialize = "vn_to_eng")]
    #[value(name = "vi-en")]
    VietnameseToEnglish,
    #[strum(serialize = "mixed")]
    Mixed,
}

impl Direction {
    /// Text shown to the user. `Mixed` is never a resolved direction and falls back to English.
    pub fn prompt_for<'a>(&self, word: &'a Word) -> &'a str {
        match self {
            Direction::VietnameseToEnglish => &word.vietnamese,
            _ => &word.english,
        }
    }

    pub fn answer_for<'a>(&self, word: &'a Word) -> &'a str {
        match self {
            Direction::VietnameseToEnglish => &word.english,
            _ => &word.vietnamese,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    Endless,
    Speed,
    Testing,
}

/// Trim and case-fold an answer for comparison.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

pub fn answers_match(given: &str, expected: &str) -> bool {
    normalize_answer(given) == normalize_answer(expected)
}
