use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::scoring::{speed_bonus, RevealOutcome};
use crate::selector::CardSelector;
use crate::session::{
    AnswerResult, Card, QuestionRecord, SessionConfig, SessionState, SessionSummary,
};
use crate::store::{ResultSink, WordStore};
use crate::timer::{CountdownTimer, TimerEvent};
use crate::word::answers_match;
use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Drives one session at a time: configured, in progress, finished.
///
/// Every call is synchronous; the caller's event loop decides when to poll
/// [`tick`](Self::tick). A finished session is never resumed, calling
/// [`start_session`](Self::start_session) again builds a fresh state.
#[derive(Debug)]
pub struct SessionEngine<S: WordStore, C: Clock + Clone = SystemClock> {
    store: S,
    clock: C,
    seed: Option<u64>,
    selector: Option<CardSelector>,
    timer: Option<CountdownTimer<C>>,
    state: Option<SessionState>,
    records: Vec<QuestionRecord>,
}

impl<S: WordStore> SessionEngine<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock::new())
    }
}

impl<S: WordStore, C: Clock + Clone> SessionEngine<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            seed: None,
            selector: None,
            timer: None,
            state: None,
            records: Vec::new(),
        }
    }

    /// Fix the random source so card order is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.state.as_ref().and_then(|s| s.current.as_ref())
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    pub fn time_remaining(&self) -> Option<f64> {
        self.timer.as_ref().map(|t| t.remaining())
    }

    /// Begin a new session.
    ///
    /// Returns `Ok(false)` when the store has no words; the session is then
    /// created already finished.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<bool> {
        config.validate()?;
        let words = self.store.list_words()?;

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let selector = CardSelector::with_rng(words, config.difficulty, rng);

        self.records.clear();
        self.timer = None;
        let mut state = SessionState::new(config);

        if selector.is_empty() {
            log::warn!("No words available, session cannot start");
            state.finish();
            self.state = Some(state);
            self.selector = None;
            return Ok(false);
        }

        if let Some(secs) = state.config.time_limit_secs {
            let mut timer = CountdownTimer::new(secs as f64, self.clock.clone());
            timer.start();
            self.timer = Some(timer);
        }

        log::info!(
            "Started {} session ({}, difficulty {}) with {} words",
            state.config.mode,
            state.config.direction,
            state.config.difficulty,
            selector.words().len()
        );

        self.selector = Some(selector);
        self.state = Some(state);
        Ok(true)
    }

    /// Advance to the next card, or `None` once the session is over.
    ///
    /// A card still pending from the previous call is recorded as unanswered.
    pub fn next_card(&mut self) -> Option<Card> {
        let state = self.state.as_ref()?;
        if state.finished {
            return None;
        }
        if state.reached_question_limit() {
            self.end_session();
            return None;
        }

        let state = self.state.as_mut()?;
        let selector = self.selector.as_mut()?;

        if let Some(skipped) = state.current.take() {
            self.records
                .push(QuestionRecord::from_card(&skipped, None, false));
        }

        let (word_id, prompt, expected_answer, direction) = {
            let (word, direction) = selector.select(state.config.direction)?;
            (
                word.id,
                direction.prompt_for(word).to_string(),
                direction.answer_for(word).to_string(),
                direction,
            )
        };
        let choices = if state.config.multiple_choice {
            selector.build_choices(&expected_answer, direction)
        } else {
            Vec::new()
        };

        let card = Card {
            word_id,
            prompt,
            expected_answer,
            direction,
            choices,
            revealed: false,
            penalty: 0,
            time_penalty_secs: 0.0,
            shown_at: self.clock.now(),
        };
        state.asked += 1;
        state.current = Some(card.clone());
        Some(card)
    }

    /// Check an answer against the current card and update score and word stats.
    pub fn submit_answer(&mut self, answer: &str) -> Result<Option<AnswerResult>> {
        let Some(state) = self.state.as_mut() else {
            return Ok(None);
        };
        if state.finished {
            return Ok(None);
        }
        let Some(card) = state.current.clone() else {
            return Ok(None);
        };

        let is_correct = answers_match(answer, &card.expected_answer);
        if let Some(updated) = self.store.update_word_stats(card.word_id, is_correct)? {
            if let Some(selector) = self.selector.as_mut() {
                selector.update_word(updated);
            }
        }
        state.current = None;

        let bonus = match state.config.bonus_budget_secs() {
            Some(budget) if is_correct && !card.revealed => {
                let response = self.clock.now().saturating_sub(card.shown_at);
                speed_bonus(response.as_secs_f64(), budget)
            }
            _ => 0,
        };
        let scored = state.scores.apply_answer(is_correct, bonus);
        if is_correct {
            state.correct += 1;
        }
        self.records.push(QuestionRecord::from_card(
            &card,
            Some(answer.to_string()),
            is_correct,
        ));

        log::debug!(
            "Answer for word {} was {} ({:+} points)",
            card.word_id,
            if is_correct { "correct" } else { "wrong" },
            scored.delta
        );

        let limit_reached = state.reached_question_limit();
        if limit_reached {
            self.end_session();
        }

        Ok(Some(AnswerResult {
            is_correct,
            correct_answer: card.expected_answer,
            new_score: scored.total,
            delta: scored.delta,
            speed_bonus: if is_correct { bonus } else { 0 },
            finished: limit_reached,
        }))
    }

    /// Reveal the current answer, paying for it under the configured policy.
    /// Does not advance to the next card.
    pub fn show_answer(&mut self) -> RevealOutcome {
        let Some(state) = self.state.as_mut() else {
            return RevealOutcome::denied(0, None);
        };
        if state.finished || state.current.is_none() {
            return RevealOutcome::denied(state.score(), state.remaining_reveals());
        }

        let timer_active = self.timer.as_ref().is_some_and(|t| t.is_running());
        let mut outcome = state.scores.reveal(timer_active);
        if !outcome.allowed {
            log::debug!("Reveal refused, none left");
            return outcome;
        }

        if let Some(card) = state.current.as_mut() {
            card.revealed = true;
            card.penalty -= outcome.score_delta;
            card.time_penalty_secs += outcome.time_penalty_secs;
            outcome.answer = Some(card.expected_answer.clone());
        }

        if outcome.time_penalty_secs > 0.0 {
            if let Some(timer) = self.timer.as_mut() {
                if timer.deduct(outcome.time_penalty_secs) == TimerEvent::Expired {
                    log::info!("Time penalty used up the clock");
                    self.end_session();
                }
            }
        }
        outcome
    }

    /// Poll the session timer. Ends the session when it runs out.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        let event = self.timer.as_mut()?.tick();
        self.on_timer_event(event);
        Some(event)
    }

    /// Freeze the session timer. Time already run out still ends the session.
    pub fn pause(&mut self) -> Option<TimerEvent> {
        let event = self.timer.as_mut()?.pause();
        self.on_timer_event(event);
        Some(event)
    }

    pub fn resume(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.resume();
        }
    }

    /// `true` when the session has ended or none was started
    pub fn is_finished(&self) -> bool {
        self.state.as_ref().map_or(true, |s| s.finished)
    }

    /// End the session on user request and return its summary.
    pub fn finish(&mut self) -> Option<SessionSummary> {
        self.end_session();
        self.summary()
    }

    /// Summary of the finished session, `None` while it is still running
    pub fn summary(&self) -> Option<SessionSummary> {
        let state = self.state.as_ref().filter(|s| s.finished)?;
        Some(SessionSummary {
            session_id: state.started_at.format("%Y%m%d-%H%M%S%.3f").to_string(),
            mode: state.config.mode,
            direction: state.config.direction,
            score: state.score(),
            total_asked: state.asked,
            total_correct: state.correct,
            total_revealed: state.revealed(),
            started_at: state.started_at,
            ended_at: state.ended_at.unwrap_or_else(Local::now),
            results: self.records.clone(),
        })
    }

    pub fn save_summary<R: ResultSink>(&self, sink: &mut R) -> Result<()> {
        let summary = self.summary().ok_or(Error::NoSession)?;
        sink.save_session_result(&summary)
    }

    fn on_timer_event(&mut self, event: TimerEvent) {
        if event == TimerEvent::Expired {
            log::info!("Session timer expired");
            self.end_session();
        }
    }

    fn end_session(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.finished {
            return;
        }
        if let Some(pending) = state.current.take() {
            self.records
                .push(QuestionRecord::from_card(&pending, None, false));
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.stop();
        }
        state.finish();
        log::info!(
            "Session ended: {}/{} correct, score {}",
            state.correct,
            state.asked,
            state.score()
        );
    }
}

impl<S: WordStore + ResultSink, C: Clock + Clone> SessionEngine<S, C> {
    /// Persist the finished session into the same store the words came from.
    pub fn save_to_store(&mut self) -> Result<()> {
        let summary = self.summary().ok_or(Error::NoSession)?;
        self.store.save_session_result(&summary)
    }
}
