use directories::ProjectDirs;
use std::path::PathBuf;

/// Overrides every default location when set, e.g. for portable installs.
pub const HOME_ENV: &str = "TAKCARD_HOME";

const DB_FILE: &str = "words.db";
const SETTINGS_FILE: &str = "settings.json";

/// Where the word database and the settings file live
pub struct AppDirs;

impl AppDirs {
    /// `$TAKCARD_HOME/words.db`, else `~/.local/state/takcard/words.db`,
    /// else the platform data dir.
    pub fn db_path() -> Option<PathBuf> {
        if let Some(home) = Self::override_dir() {
            return Some(home.join(DB_FILE));
        }
        match std::env::var_os("HOME") {
            Some(home) => Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("takcard")
                    .join(DB_FILE),
            ),
            None => Self::project().map(|dirs| dirs.data_local_dir().join(DB_FILE)),
        }
    }

    pub fn settings_path() -> Option<PathBuf> {
        if let Some(home) = Self::override_dir() {
            return Some(home.join(SETTINGS_FILE));
        }
        Self::project().map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    fn override_dir() -> Option<PathBuf> {
        std::env::var_os(HOME_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "takcard")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // single test so the env var is never raced by a sibling test
    #[test]
    fn override_dir_wins_for_both_files() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(HOME_ENV, dir.path());
        assert_eq!(AppDirs::db_path(), Some(dir.path().join("words.db")));
        assert_eq!(
            AppDirs::settings_path(),
            Some(dir.path().join("settings.json"))
        );

        std::env::set_var(HOME_ENV, "");
        let db = AppDirs::db_path().unwrap();
        assert!(db.ends_with("takcard/words.db"));
        std::env::remove_var(HOME_ENV);
    }
}
