use crate::app_dirs::AppDirs;
use crate::difficulty::word_difficulty;
use crate::error::Result;
use crate::session::SessionSummary;
use crate::store::{ResultSink, WordInserter, WordStore};
use crate::word::Word;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        english TEXT NOT NULL,
        vietnamese TEXT NOT NULL,
        part_of_speech TEXT,
        display_count INTEGER NOT NULL DEFAULT 0,
        correct_count INTEGER NOT NULL DEFAULT 0,
        difficulty REAL NOT NULL DEFAULT 1.0
    );
    CREATE INDEX IF NOT EXISTS idx_words_english ON words(english);
    CREATE INDEX IF NOT EXISTS idx_words_vietnamese ON words(vietnamese);
    CREATE INDEX IF NOT EXISTS idx_words_part_of_speech ON words(part_of_speech);

    CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_key TEXT NOT NULL,
        mode TEXT NOT NULL,
        direction TEXT NOT NULL,
        score INTEGER NOT NULL,
        total_questions INTEGER NOT NULL,
        correct_count INTEGER NOT NULL,
        revealed_count INTEGER NOT NULL,
        start_ts TEXT NOT NULL,
        end_ts TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS session_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id INTEGER NOT NULL REFERENCES sessions(id),
        position INTEGER NOT NULL,
        word_id INTEGER NOT NULL,
        asked_text TEXT NOT NULL,
        expected_answer TEXT NOT NULL,
        given_answer TEXT,
        correct BOOLEAN NOT NULL,
        revealed BOOLEAN NOT NULL,
        penalty INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_session_results_session ON session_results(session_id);
"#;

const WORD_COLUMNS: &str =
    "id, english, vietnamese, part_of_speech, display_count, correct_count, difficulty";

/// A stored session row, as listed in history
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: i64,
    pub mode: String,
    pub direction: String,
    pub score: i64,
    pub total_questions: u32,
    pub correct_count: u32,
    pub revealed_count: u32,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
}

/// SQLite-backed vocabulary and session history
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at the default location, creating it if needed
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("takcard.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        log::debug!("Opening word database at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn word_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn get_word(&self, id: i64) -> Result<Option<Word>> {
        let word = self
            .conn
            .query_row(
                &format!("SELECT {WORD_COLUMNS} FROM words WHERE id = ?1"),
                [id],
                word_from_row,
            )
            .optional()?;
        Ok(word)
    }

    /// Case-insensitive substring match on either language.
    ///
    /// Matched in Rust rather than with `LIKE`: SQLite's `lower()` only folds
    /// ASCII, and `%`/`_` in the query must stay literal.
    pub fn search_words(&self, query: &str) -> Result<Vec<Word>> {
        let needle = query.trim().to_lowercase();
        let mut words = self.list_words()?;
        words.retain(|w| {
            w.english.to_lowercase().contains(&needle)
                || w.vietnamese.to_lowercase().contains(&needle)
        });
        Ok(words)
    }

    pub fn filter_by_part_of_speech(&self, part: &str) -> Result<Vec<Word>> {
        self.query_words(
            &format!(
                "SELECT {WORD_COLUMNS} FROM words \
                 WHERE lower(part_of_speech) = ?1 ORDER BY english"
            ),
            [part.to_lowercase()],
        )
    }

    /// Most recent sessions first
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, mode, direction, score, total_questions, correct_count,
                   revealed_count, start_ts, end_ts
            FROM sessions
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok(SessionRecord {
                id: row.get(0)?,
                mode: row.get(1)?,
                direction: row.get(2)?,
                score: row.get(3)?,
                total_questions: row.get(4)?,
                correct_count: row.get(5)?,
                revealed_count: row.get(6)?,
                started_at: parse_timestamp(row, 7)?,
                ended_at: parse_timestamp(row, 8)?,
            })
        })?;

        let mut sessions = Vec::new();
        for session in rows {
            sessions.push(session?);
        }
        Ok(sessions)
    }

    fn query_words<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Word>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, word_from_row)?;

        let mut words = Vec::new();
        for word in rows {
            words.push(word?);
        }
        Ok(words)
    }
}

fn word_from_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get(0)?,
        english: row.get(1)?,
        vietnamese: row.get(2)?,
        part_of_speech: row.get(3)?,
        display_count: row.get(4)?,
        correct_count: row.get(5)?,
        difficulty: row.get(6)?,
    })
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Local>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "timestamp".to_string(), rusqlite::types::Type::Text)
        })
}

impl WordStore for SqliteStore {
    fn list_words(&self) -> Result<Vec<Word>> {
        self.query_words(
            &format!("SELECT {WORD_COLUMNS} FROM words ORDER BY english"),
            [],
        )
    }

    fn update_word_stats(&mut self, word_id: i64, is_correct: bool) -> Result<Option<Word>> {
        let Some(mut word) = self.get_word(word_id)? else {
            log::warn!("Stats update for unknown word {word_id}");
            return Ok(None);
        };
        word.record_answer(is_correct);
        self.conn.execute(
            "UPDATE words SET display_count = ?1, correct_count = ?2, difficulty = ?3 WHERE id = ?4",
            params![
                word.display_count,
                word.correct_count,
                word.difficulty,
                word.id
            ],
        )?;
        Ok(Some(word))
    }
}

impl ResultSink for SqliteStore {
    fn save_session_result(&mut self, summary: &SessionSummary) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO sessions
            (session_key, mode, direction, score, total_questions, correct_count,
             revealed_count, start_ts, end_ts)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                summary.session_id,
                summary.mode.to_string(),
                summary.direction.to_string(),
                summary.score,
                summary.total_asked,
                summary.total_correct,
                summary.total_revealed,
                summary.started_at.to_rfc3339(),
                summary.ended_at.to_rfc3339(),
            ],
        )?;
        let session_row = tx.last_insert_rowid();

        for (position, result) in summary.results.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO session_results
                (session_id, position, word_id, asked_text, expected_answer,
                 given_answer, correct, revealed, penalty)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    session_row,
                    position as i64,
                    result.word_id,
                    result.prompt,
                    result.expected_answer,
                    result.given_answer,
                    result.correct,
                    result.revealed,
                    result.penalty,
                ],
            )?;
        }

        tx.commit()?;
        log::info!(
            "Saved session {} with {} results",
            summary.session_id,
            summary.results.len()
        );
        Ok(())
    }
}

impl WordInserter for SqliteStore {
    fn contains_word(&self, english: &str, vietnamese: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM words WHERE english = ?1 AND vietnamese = ?2 LIMIT 1",
                [english, vietnamese],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_word(
        &mut self,
        english: &str,
        vietnamese: &str,
        part_of_speech: Option<&str>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO words (english, vietnamese, part_of_speech, difficulty) VALUES (?1, ?2, ?3, ?4)",
            params![english, vietnamese, part_of_speech, word_difficulty(0, 0)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_word("water", "nước", Some("noun")).unwrap();
        store.insert_word("run", "chạy", Some("verb")).unwrap();
        store.insert_word("apple", "quả táo", Some("Noun")).unwrap();
        store
    }

    #[test]
    fn list_words_orders_by_english() {
        let store = seeded_store();
        let words = store.list_words().unwrap();
        let english: Vec<&str> = words.iter().map(|w| w.english.as_str()).collect();
        assert_eq!(english, vec!["apple", "run", "water"]);
        assert!(words.iter().all(|w| (w.difficulty - 1.0).abs() < 1e-5));
    }

    #[test]
    fn update_word_stats_persists() {
        let mut store = seeded_store();
        let updated = store.update_word_stats(2, false).unwrap().unwrap();
        assert_eq!(updated.display_count, 1);
        assert_eq!(updated.correct_count, 0);

        store.update_word_stats(2, true).unwrap();
        let reread = store.get_word(2).unwrap().unwrap();
        assert_eq!((reread.display_count, reread.correct_count), (2, 1));
        assert!((reread.difficulty - word_difficulty(2, 1)).abs() < 1e-9);
    }

    #[test]
    fn update_unknown_word_is_noop() {
        let mut store = seeded_store();
        assert!(store.update_word_stats(99, true).unwrap().is_none());
        assert_eq!(store.word_count().unwrap(), 3);
    }

    #[test]
    fn search_matches_either_language() {
        let store = seeded_store();
        assert_eq!(store.search_words("WAT").unwrap().len(), 1);
        assert_eq!(store.search_words("chạy").unwrap()[0].english, "run");
        assert!(store.search_words("zzz").unwrap().is_empty());
    }

    #[test]
    fn search_folds_vietnamese_case_and_keeps_wildcards_literal() {
        let mut store = seeded_store();
        store.insert_word("wish", "Ước", None).unwrap();
        store.insert_word("100%", "một trăm phần trăm", None).unwrap();

        let hits = store.search_words("ước").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].english, "wish");

        let hits = store.search_words("%").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].english, "100%");
        assert!(store.search_words("w_ter").unwrap().is_empty());
    }

    #[test]
    fn contains_word_matches_exact_pair() {
        let store = seeded_store();
        assert!(store.contains_word("water", "nước").unwrap());
        assert!(!store.contains_word("water", "chạy").unwrap());
    }

    #[test]
    fn filter_part_of_speech_ignores_case() {
        let store = seeded_store();
        let nouns = store.filter_by_part_of_speech("NOUN").unwrap();
        assert_eq!(nouns.len(), 2);
    }
}
