use crate::clock::Clock;
use std::time::Duration;

/// What a timer poll observed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    /// Not running: never started, stopped, paused, or already expired
    Idle,
    Running { remaining: f64 },
    /// Remaining time just hit zero. Reported once per timer.
    Expired,
}

/// Countdown for timed sessions.
///
/// Owns no thread; the caller polls [`tick`](Self::tick). Remaining time is
/// recomputed from clock deltas, so skipped or redundant ticks cause no drift.
#[derive(Debug)]
pub struct CountdownTimer<C: Clock> {
    clock: C,
    total: f64,
    remaining: f64,
    running: bool,
    expired: bool,
    last_tick: Duration,
    paused_at: Option<Duration>,
}

impl<C: Clock> CountdownTimer<C> {
    pub fn new(seconds: f64, clock: C) -> Self {
        let now = clock.now();
        let total = seconds.max(0.0);
        Self {
            clock,
            total,
            remaining: total,
            running: false,
            expired: false,
            last_tick: now,
            paused_at: None,
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn start(&mut self) {
        if self.expired {
            return;
        }
        self.running = true;
        self.paused_at = None;
        self.last_tick = self.clock.now();
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.paused_at = None;
    }

    /// Freeze the countdown, accounting for time elapsed up to now.
    pub fn pause(&mut self) -> TimerEvent {
        let event = self.tick();
        if self.running {
            self.paused_at = Some(self.clock.now());
        }
        event
    }

    /// Continue after [`pause`](Self::pause); the paused window is not charged.
    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = self.clock.now().saturating_sub(paused_at);
            self.last_tick += paused_for;
        }
    }

    pub fn tick(&mut self) -> TimerEvent {
        if !self.running || self.paused_at.is_some() {
            return TimerEvent::Idle;
        }
        let now = self.clock.now();
        let elapsed = now.saturating_sub(self.last_tick).as_secs_f64();
        self.last_tick = now;
        self.remaining = (self.remaining - elapsed).max(0.0);
        self.check_expired()
    }

    /// Take `seconds` off the clock as a penalty.
    pub fn deduct(&mut self, seconds: f64) -> TimerEvent {
        if seconds <= 0.0 || self.expired {
            return if self.running {
                TimerEvent::Running {
                    remaining: self.remaining,
                }
            } else {
                TimerEvent::Idle
            };
        }
        self.remaining = (self.remaining - seconds).max(0.0);
        if !self.running {
            return TimerEvent::Idle;
        }
        self.check_expired()
    }

    fn check_expired(&mut self) -> TimerEvent {
        if self.remaining <= 0.0 {
            self.running = false;
            self.paused_at = None;
            if !self.expired {
                self.expired = true;
                return TimerEvent::Expired;
            }
            return TimerEvent::Idle;
        }
        TimerEvent::Running {
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use assert_matches::assert_matches;

    fn timer(secs: f64) -> (CountdownTimer<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (CountdownTimer::new(secs, clock.clone()), clock)
    }

    #[test]
    fn idle_until_started() {
        let (mut t, clock) = timer(10.0);
        clock.advance_secs(3.0);
        assert_eq!(t.tick(), TimerEvent::Idle);
        assert_eq!(t.remaining(), 10.0);
    }

    #[test]
    fn expires_once_after_enough_ticks() {
        let (mut t, clock) = timer(10.0);
        t.start();

        let mut expirations = 0;
        for _ in 0..11 {
            clock.advance_secs(1.0);
            if t.tick() == TimerEvent::Expired {
                expirations += 1;
            }
        }
        assert!(t.is_expired());
        assert_eq!(t.remaining(), 0.0);
        assert_eq!(expirations, 1);

        clock.advance_secs(1.0);
        assert_eq!(t.tick(), TimerEvent::Idle);
        assert_eq!(t.deduct(5.0), TimerEvent::Idle);
    }

    #[test]
    fn skipped_ticks_do_not_drift() {
        let (mut t, clock) = timer(10.0);
        t.start();
        clock.advance_secs(2.5);
        clock.advance_secs(1.5);
        assert_matches!(t.tick(), TimerEvent::Running { remaining } if (remaining - 6.0).abs() < 1e-6);
        // redundant tick with no elapsed time
        assert_matches!(t.tick(), TimerEvent::Running { remaining } if (remaining - 6.0).abs() < 1e-6);
    }

    #[test]
    fn deduct_can_expire() {
        let (mut t, _clock) = timer(10.0);
        t.start();
        assert_matches!(t.deduct(4.0), TimerEvent::Running { .. });
        assert_eq!(t.deduct(10.0), TimerEvent::Expired);
        assert_eq!(t.remaining(), 0.0);
        assert!(!t.is_running());
    }

    #[test]
    fn non_positive_deduction_is_ignored() {
        let (mut t, _clock) = timer(10.0);
        t.start();
        assert_matches!(t.deduct(0.0), TimerEvent::Running { remaining } if remaining == 10.0);
        assert_matches!(t.deduct(-3.0), TimerEvent::Running { remaining } if remaining == 10.0);
    }

    #[test]
    fn pause_window_is_not_charged() {
        let (mut t, clock) = timer(10.0);
        t.start();
        clock.advance_secs(2.0);
        t.pause();
        assert!(t.is_paused());

        clock.advance_secs(30.0);
        assert_eq!(t.tick(), TimerEvent::Idle);

        t.resume();
        clock.advance_secs(1.0);
        assert_matches!(t.tick(), TimerEvent::Running { remaining } if (remaining - 7.0).abs() < 1e-6);
    }

    #[test]
    fn stop_halts_countdown() {
        let (mut t, clock) = timer(5.0);
        t.start();
        clock.advance_secs(1.0);
        t.tick();
        t.stop();
        clock.advance_secs(10.0);
        assert_eq!(t.tick(), TimerEvent::Idle);
        assert!((t.remaining() - 4.0).abs() < 1e-6);
        assert!(!t.is_expired());
    }
}
