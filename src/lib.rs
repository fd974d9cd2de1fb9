// Library surface shared by the `takcard` binary and the integration tests.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod db;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod import;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod store;
pub mod timer;
pub mod util;
pub mod word;

pub use engine::SessionEngine;
pub use error::{ConfigError, Error, Result};
pub use session::{AnswerResult, Card, SessionConfig, SessionSummary};
pub use word::{Direction, Mode, Word};
