use crate::difficulty::selection_weight;
use crate::word::{normalize_answer, Direction, Word};
use itertools::Itertools;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Upper bound on how many recently shown words are held back from selection
pub const MAX_RECENT_WINDOW: usize = 10;
/// Wrong options offered next to the right one in multiple choice
pub const MAX_DISTRACTORS: usize = 3;

/// Weighted card picker with a short no-repeat memory.
///
/// The word list is fixed for the lifetime of a session; only the cached
/// records are refreshed through [`CardSelector::update_word`] as answers
/// change their difficulty.
#[derive(Debug)]
pub struct CardSelector {
    words: Vec<Word>,
    difficulty_setting: u8,
    recent: VecDeque<i64>,
    window_capacity: usize,
    rng: StdRng,
}

impl CardSelector {
    pub fn new(words: Vec<Word>, difficulty_setting: u8) -> Self {
        Self::with_rng(words, difficulty_setting, StdRng::from_entropy())
    }

    pub fn with_rng(words: Vec<Word>, difficulty_setting: u8, rng: StdRng) -> Self {
        let window_capacity = MAX_RECENT_WINDOW.min(words.len() / 10);
        Self {
            words,
            difficulty_setting,
            recent: VecDeque::with_capacity(window_capacity),
            window_capacity,
            rng,
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn window_capacity(&self) -> usize {
        self.window_capacity
    }

    /// Ids currently held back, oldest first
    pub fn recent(&self) -> impl Iterator<Item = &i64> {
        self.recent.iter()
    }

    pub fn get(&self, id: i64) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }

    /// Replace the cached copy of a word after its stats changed.
    pub fn update_word(&mut self, word: Word) {
        if let Some(slot) = self.words.iter_mut().find(|w| w.id == word.id) {
            *slot = word;
        }
    }

    /// Draw the next card and resolve `Mixed` into a concrete direction.
    pub fn select(&mut self, direction: Direction) -> Option<(&Word, Direction)> {
        if self.words.is_empty() {
            return None;
        }

        let mut pool: Vec<usize> = (0..self.words.len())
            .filter(|&i| !self.recent.contains(&self.words[i].id))
            .collect();
        if pool.is_empty() {
            log::debug!("selection pool exhausted, clearing recent window");
            self.recent.clear();
            pool = (0..self.words.len()).collect();
        }

        let weights: Vec<f64> = pool
            .iter()
            .map(|&i| selection_weight(self.words[i].difficulty, self.difficulty_setting))
            .collect();

        let pick = match WeightedIndex::new(&weights) {
            Ok(dist) => pool[dist.sample(&mut self.rng)],
            Err(_) => pool[self.rng.gen_range(0..pool.len())],
        };

        if self.window_capacity > 0 {
            self.recent.push_back(self.words[pick].id);
            while self.recent.len() > self.window_capacity {
                self.recent.pop_front();
            }
        }

        let resolved = self.resolve_direction(direction);
        Some((&self.words[pick], resolved))
    }

    /// Repeated [`select`](Self::select) returning owned cards.
    pub fn select_multiple(&mut self, count: usize, direction: Direction) -> Vec<(Word, Direction)> {
        let mut cards = Vec::with_capacity(count);
        for _ in 0..count {
            match self.select(direction) {
                Some((word, dir)) => cards.push((word.clone(), dir)),
                None => break,
            }
        }
        cards
    }

    /// Shuffled options for a card: the expected answer plus up to three
    /// distinct answers taken from other words in the same direction.
    pub fn build_choices(&mut self, expected: &str, direction: Direction) -> Vec<String> {
        let expected_key = normalize_answer(expected);
        let pool: Vec<&str> = self
            .words
            .iter()
            .map(|w| direction.answer_for(w))
            .filter(|text| !text.trim().is_empty())
            .unique_by(|text| normalize_answer(text))
            .filter(|text| normalize_answer(text) != expected_key)
            .collect();

        let mut choices: Vec<String> = pool
            .choose_multiple(&mut self.rng, MAX_DISTRACTORS)
            .map(|text| text.to_string())
            .collect();
        choices.push(expected.to_string());
        choices.shuffle(&mut self.rng);
        choices
    }

    fn resolve_direction(&mut self, direction: Direction) -> Direction {
        match direction {
            Direction::Mixed => {
                if self.rng.gen_bool(0.5) {
                    Direction::EnglishToVietnamese
                } else {
                    Direction::VietnameseToEnglish
                }
            }
            fixed => fixed,
        }
    }
}
