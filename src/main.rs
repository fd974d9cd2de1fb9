use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use takcard::config::{ConfigStore, FileConfigStore, Settings};
use takcard::db::SqliteStore;
use takcard::import::import_csv_file;
use takcard::scoring::ShowAnswerConfig;
use takcard::store::WordStore;
use takcard::timer::TimerEvent;
use takcard::util::mean_score;
use takcard::{Direction, Mode, SessionConfig, SessionEngine, Word};
use unicode_width::UnicodeWidthStr;

/// adaptive english-vietnamese vocabulary flashcards
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Flashcard drills that adapt to the words you keep missing, with endless, timed and test sessions."
)]
struct Cli {
    /// word database to use (defaults to the local state directory)
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// settings file to use (defaults to the user config directory)
    #[clap(long, global = true)]
    settings: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// import vocabulary from a csv file with english,vietnamese[,part_of_speech] columns
    Import { path: PathBuf },

    /// list the dictionary
    Words {
        /// only words containing this text in either language
        #[clap(short, long)]
        search: Option<String>,

        /// only words with this part of speech
        #[clap(short, long)]
        pos: Option<String>,
    },

    /// run a quiz session
    Quiz(QuizArgs),

    /// show recent sessions
    History {
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// show or change saved defaults
    Settings(SettingsArgs),
}

#[derive(clap::Args, Debug)]
struct QuizArgs {
    #[clap(short, long, value_enum)]
    mode: Option<Mode>,

    #[clap(short, long, value_enum)]
    direction: Option<Direction>,

    /// 1 favours easy words, 5 favours hard words
    #[clap(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=5))]
    difficulty: Option<u8>,

    /// number of questions, ends the session in any mode
    #[clap(short, long)]
    questions: Option<u32>,

    /// time limit in seconds, ends the session in any mode
    #[clap(short, long)]
    time: Option<u32>,

    /// offer four options per card
    #[clap(long)]
    choices: bool,
}

#[derive(clap::Args, Debug)]
struct SettingsArgs {
    #[clap(long, value_enum)]
    mode: Option<Mode>,

    #[clap(long, value_enum)]
    direction: Option<Direction>,

    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    difficulty: Option<u8>,

    #[clap(long)]
    questions: Option<u32>,

    #[clap(long)]
    time: Option<u32>,

    /// points lost for a wrong answer
    #[clap(long)]
    wrong_penalty: Option<i64>,

    /// reveal policy: points[:n], time[:secs], limit[:uses] or off
    #[clap(long)]
    reveal: Option<ShowAnswerConfig>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config_store = match &cli.settings {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let open_store = || match &cli.db {
        Some(path) => SqliteStore::open(path),
        None => SqliteStore::open_default(),
    };

    match cli.command {
        Command::Import { ref path } => {
            let mut store = open_store()?;
            let report = import_csv_file(&mut store, path)?;
            println!(
                "imported {} words ({} skipped, {} bad rows), {} in dictionary",
                report.imported,
                report.skipped,
                report.errors,
                store.word_count()?
            );
        }
        Command::Words { ref search, ref pos } => {
            let store = open_store()?;
            let words = match (search, pos) {
                (Some(q), _) => store.search_words(q)?,
                (None, Some(p)) => store.filter_by_part_of_speech(p)?,
                (None, None) => store.list_words()?,
            };
            print_words(&words);
        }
        Command::Quiz(ref args) => {
            let settings = config_store.load();
            let config = quiz_config(&settings, args);
            let mut engine = SessionEngine::new(open_store()?);
            if !engine.start_session(config)? {
                println!("no words in the dictionary, import some with `takcard import`");
                return Ok(());
            }
            run_quiz(&mut engine)?;
        }
        Command::History { limit } => {
            let store = open_store()?;
            let sessions = store.recent_sessions(limit)?;
            for s in &sessions {
                println!(
                    "{}  {:<8} {:<10} score {:>5}  {}/{} correct  {} revealed",
                    s.started_at.format("%Y-%m-%d %H:%M"),
                    s.mode,
                    s.direction,
                    s.score,
                    s.correct_count,
                    s.total_questions,
                    s.revealed_count
                );
            }
            let scores: Vec<i64> = sessions.iter().map(|s| s.score).collect();
            if let Some(avg) = mean_score(&scores) {
                println!("average score {avg:.1} over {} sessions", sessions.len());
            }
        }
        Command::Settings(ref args) => {
            let mut settings = config_store.load();
            if apply_settings(&mut settings, args) {
                config_store.save(&settings)?;
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

fn quiz_config(settings: &Settings, args: &QuizArgs) -> SessionConfig {
    let mut settings = settings.clone();
    if let Some(mode) = args.mode {
        settings.mode = mode;
    }
    if let Some(direction) = args.direction {
        settings.direction = direction;
    }
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
    }
    if let Some(q) = args.questions {
        settings.question_count = q;
    }
    if let Some(t) = args.time {
        settings.time_limit_secs = t;
    }
    settings.multiple_choice |= args.choices;

    let mut config = SessionConfig::from(&settings);
    if let Some(q) = args.questions {
        config = config.with_question_limit(q);
    }
    if let Some(t) = args.time {
        config = config.with_time_limit(t);
    }
    config
}

fn apply_settings(settings: &mut Settings, args: &SettingsArgs) -> bool {
    let before = settings.clone();
    if let Some(mode) = args.mode {
        settings.mode = mode;
    }
    if let Some(direction) = args.direction {
        settings.direction = direction;
    }
    if let Some(d) = args.difficulty {
        settings.difficulty = d;
    }
    if let Some(q) = args.questions {
        settings.question_count = q;
    }
    if let Some(t) = args.time {
        settings.time_limit_secs = t;
    }
    if let Some(p) = args.wrong_penalty {
        settings.wrong_penalty = p;
    }
    if let Some(reveal) = args.reveal {
        settings.show_answer = reveal;
    }
    *settings != before
}

fn print_words(words: &[Word]) {
    let width = words
        .iter()
        .map(|w| UnicodeWidthStr::width(w.english.as_str()))
        .max()
        .unwrap_or(0);
    for w in words {
        let pad = width - UnicodeWidthStr::width(w.english.as_str());
        println!(
            "{}{}  {}  [{}] seen {} correct {} difficulty {:.2}",
            w.english,
            " ".repeat(pad),
            w.vietnamese,
            w.part_of_speech.as_deref().unwrap_or("-"),
            w.display_count,
            w.correct_count,
            w.difficulty
        );
    }
}

fn run_quiz(engine: &mut SessionEngine<SqliteStore>) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("type the translation, `?` to reveal, empty line or `:q` to stop");
    'session: while let Some(card) = engine.next_card() {
        let remaining = engine
            .time_remaining()
            .map(|t| format!(" ({t:.0}s left)"))
            .unwrap_or_default();
        println!("\n{}{}", card.prompt, remaining);
        for (i, choice) in card.choices.iter().enumerate() {
            println!("  {}) {}", i + 1, choice);
        }

        loop {
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                break 'session;
            };
            let line = line?;
            if engine.tick() == Some(TimerEvent::Expired) {
                println!("time is up");
                break 'session;
            }

            let input = line.trim();
            if input.is_empty() || input == ":q" {
                break 'session;
            }
            if input == "?" {
                let outcome = engine.show_answer();
                match outcome.answer {
                    Some(answer) if outcome.allowed => {
                        let uses = outcome
                            .remaining_uses
                            .map(|u| format!(", {u} reveals left"))
                            .unwrap_or_default();
                        println!("answer: {answer} ({:+} points{uses})", outcome.score_delta);
                    }
                    _ => println!("no reveals available"),
                }
                if engine.is_finished() {
                    println!("time is up");
                    break 'session;
                }
                continue;
            }

            let answer = choice_or_text(&card.choices, input);
            if let Some(result) = engine.submit_answer(answer)? {
                if result.is_correct {
                    println!("correct ({:+}), score {}", result.delta, result.new_score);
                } else {
                    println!(
                        "wrong, it was `{}` ({:+}), score {}",
                        result.correct_answer, result.delta, result.new_score
                    );
                }
            }
            break;
        }
    }

    if let Some(summary) = engine.finish() {
        println!(
            "\nscore {}  {}/{} correct ({}%)  {} revealed",
            summary.score,
            summary.total_correct,
            summary.total_asked,
            summary.accuracy(),
            summary.total_revealed
        );
    }
    engine.save_to_store()?;
    Ok(())
}

/// A number picks one of the offered choices, anything else is the answer itself
fn choice_or_text<'a>(choices: &'a [String], input: &'a str) -> &'a str {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| choices.get(i))
        .map(String::as_str)
        .unwrap_or(input)
}
