use crate::error::Result;
use crate::session::SessionSummary;
use crate::word::Word;

/// Read side and stat updates for the vocabulary the engine draws from
pub trait WordStore {
    /// All candidate words in a stable order
    fn list_words(&self) -> Result<Vec<Word>>;

    /// Count one showing of `word_id` and recompute its difficulty.
    /// Returns the updated record, or `None` if the id is unknown.
    fn update_word_stats(&mut self, word_id: i64, is_correct: bool) -> Result<Option<Word>>;
}

/// Destination for finished session summaries
pub trait ResultSink {
    fn save_session_result(&mut self, summary: &SessionSummary) -> Result<()>;
}

/// Stores that can take new vocabulary (used by the importer)
pub trait WordInserter {
    /// Whether this exact english/vietnamese pair is already stored
    fn contains_word(&self, english: &str, vietnamese: &str) -> Result<bool>;

    fn insert_word(
        &mut self,
        english: &str,
        vietnamese: &str,
        part_of_speech: Option<&str>,
    ) -> Result<i64>;
}

/// In-process store for tests and throwaway sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    words: Vec<Word>,
    sessions: Vec<SessionSummary>,
}

impl MemoryStore {
    pub fn new(words: Vec<Word>) -> Self {
        Self {
            words,
            sessions: Vec::new(),
        }
    }

    pub fn word(&self, id: i64) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }
}

impl WordStore for MemoryStore {
    fn list_words(&self) -> Result<Vec<Word>> {
        Ok(self.words.clone())
    }

    fn update_word_stats(&mut self, word_id: i64, is_correct: bool) -> Result<Option<Word>> {
        Ok(self
            .words
            .iter_mut()
            .find(|w| w.id == word_id)
            .map(|word| {
                word.record_answer(is_correct);
                word.clone()
            }))
    }
}

impl ResultSink for MemoryStore {
    fn save_session_result(&mut self, summary: &SessionSummary) -> Result<()> {
        self.sessions.push(summary.clone());
        Ok(())
    }
}

impl WordInserter for MemoryStore {
    fn contains_word(&self, english: &str, vietnamese: &str) -> Result<bool> {
        Ok(self
            .words
            .iter()
            .any(|w| w.english == english && w.vietnamese == vietnamese))
    }

    fn insert_word(
        &mut self,
        english: &str,
        vietnamese: &str,
        part_of_speech: Option<&str>,
    ) -> Result<i64> {
        let id = self.words.iter().map(|w| w.id).max().unwrap_or(0) + 1;
        let mut word = Word::new(id, english, vietnamese);
        word.part_of_speech = part_of_speech.map(str::to_string);
        self.words.push(word);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_unknown_id_is_noop() {
        let mut store = MemoryStore::new(vec![Word::new(1, "a", "b")]);
        assert!(store.update_word_stats(42, true).unwrap().is_none());
        assert_eq!(store.word(1).unwrap().display_count, 0);
    }

    #[test]
    fn update_increments_counters() {
        let mut store = MemoryStore::new(vec![Word::new(1, "a", "b")]);
        let updated = store.update_word_stats(1, true).unwrap().unwrap();
        assert_eq!(updated.display_count, 1);
        assert_eq!(updated.correct_count, 1);
        assert!(updated.difficulty < 1e-5);
        assert_eq!(store.word(1), Some(&updated));
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut store = MemoryStore::default();
        let a = store.insert_word("one", "một", None).unwrap();
        let b = store.insert_word("two", "hai", Some("num")).unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(store.word(2).unwrap().part_of_speech.as_deref(), Some("num"));
    }

    #[test]
    fn contains_word_needs_both_sides() {
        let mut store = MemoryStore::default();
        store.insert_word("bank", "ngân hàng", None).unwrap();
        assert!(store.contains_word("bank", "ngân hàng").unwrap());
        assert!(!store.contains_word("bank", "bờ sông").unwrap());
        assert!(!store.contains_word("Bank", "ngân hàng").unwrap());
    }
}
