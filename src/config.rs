use crate::app_dirs::AppDirs;
use crate::scoring::{ShowAnswerConfig, PENALTY_POINTS};
use crate::session::SessionConfig;
use crate::word::{Direction, Mode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User defaults remembered between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    pub direction: Direction,
    pub difficulty: u8,
    pub question_count: u32,
    pub time_limit_secs: u32,
    pub show_answer: ShowAnswerConfig,
    pub wrong_penalty: i64,
    pub multiple_choice: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Endless,
            direction: Direction::EnglishToVietnamese,
            difficulty: 3,
            question_count: 20,
            time_limit_secs: 300,
            show_answer: ShowAnswerConfig::default(),
            wrong_penalty: PENALTY_POINTS,
            multiple_choice: false,
        }
    }
}

impl From<&Settings> for SessionConfig {
    fn from(s: &Settings) -> Self {
        let config = match s.mode {
            Mode::Endless => SessionConfig::endless(s.direction, s.difficulty),
            Mode::Speed => SessionConfig::speed(s.direction, s.difficulty, s.time_limit_secs),
            Mode::Testing => SessionConfig::testing(s.direction, s.difficulty, s.question_count),
        };
        config
            .with_show_answer(s.show_answer)
            .with_wrong_penalty(s.wrong_penalty)
            .with_multiple_choice(s.multiple_choice)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::settings_path().unwrap_or_else(|| PathBuf::from("takcard_settings.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Settings>(&bytes) {
                Ok(settings) => return settings,
                Err(e) => log::warn!("Ignoring unreadable settings {}: {e}", self.path.display()),
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::PenaltyPolicy;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Settings::default());
    }

    #[test]
    fn save_and_load_custom_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let store = FileConfigStore::with_path(&path);
        let settings = Settings {
            mode: Mode::Speed,
            direction: Direction::Mixed,
            difficulty: 5,
            question_count: 7,
            time_limit_secs: 90,
            show_answer: ShowAnswerConfig::limit(2),
            wrong_penalty: 0,
            multiple_choice: true,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, br#"{"difficulty": 1, "mode": "testing"}"#).unwrap();
        let settings = FileConfigStore::with_path(&path).load();
        assert_eq!(settings.difficulty, 1);
        assert_eq!(settings.mode, Mode::Testing);
        assert_eq!(settings.question_count, 20);
    }

    #[test]
    fn settings_convert_to_session_config() {
        let settings = Settings {
            mode: Mode::Testing,
            question_count: 12,
            show_answer: ShowAnswerConfig::time(10),
            ..Settings::default()
        };
        let config = SessionConfig::from(&settings);
        assert_eq!(config.mode, Mode::Testing);
        assert_eq!(config.question_limit, Some(12));
        assert_eq!(config.time_limit_secs, None);
        assert_eq!(config.show_answer.policy, PenaltyPolicy::Time { seconds: 10 });
        assert!(config.validate().is_ok());
    }
}
