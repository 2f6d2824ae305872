use std::time::{Duration, Instant};

use crate::Query;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Typing { deadline: Instant },
    Settled,
}

/// Timer the runtime should arm on behalf of a debouncer.
///
/// Only the timer carrying the debouncer's current generation may settle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTimer {
    pub generation: u64,
    pub deadline: Instant,
}

/// Turns raw keystroke text into a settled query after a quiet period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    quiet_period: Duration,
    raw: String,
    settled: Query,
    generation: u64,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            raw: String::new(),
            settled: Query::unfiltered(),
            generation: 0,
            state: DebounceState::Idle,
        }
    }

    /// Records a keystroke and restarts the quiet period.
    pub fn keystroke(&mut self, text: impl Into<String>, now: Instant) -> DebounceTimer {
        self.raw = text.into();
        self.generation += 1;
        let deadline = now + self.quiet_period;
        self.state = DebounceState::Typing { deadline };
        DebounceTimer {
            generation: self.generation,
            deadline,
        }
    }

    /// Settles the raw text if `generation` is still the pending timer.
    pub fn fire(&mut self, generation: u64) -> Option<Query> {
        if generation != self.generation || !matches!(self.state, DebounceState::Typing { .. }) {
            return None;
        }
        self.settled = Query::settle(&self.raw);
        self.state = DebounceState::Settled;
        Some(self.settled.clone())
    }

    /// Clock-driven variant of [`Debouncer::fire`].
    pub fn poll(&mut self, now: Instant) -> Option<Query> {
        match self.state {
            DebounceState::Typing { deadline } if now >= deadline => self.fire(self.generation),
            _ => None,
        }
    }

    /// Drops the pending timer; the raw text stays unsettled.
    pub fn cancel(&mut self) {
        if matches!(self.state, DebounceState::Typing { .. }) {
            self.generation += 1;
            self.state = DebounceState::Idle;
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn settled(&self) -> &Query {
        &self.settled
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn burst_of_keystrokes_settles_once_after_last() {
        let t = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.keystroke("a", t);
        debouncer.keystroke("as", t + ms(50));
        debouncer.keystroke("asp", t + ms(100));

        let mut settles = Vec::new();
        for step in (0..=700).step_by(10) {
            if let Some(query) = debouncer.poll(t + ms(step)) {
                settles.push((step, query));
            }
        }
        assert_eq!(settles, vec![(600, Query::settle("asp"))]);
    }

    #[test]
    fn superseded_timer_is_ignored() {
        let t = Instant::now();
        let mut debouncer = Debouncer::default();
        let first = debouncer.keystroke("x", t);
        let second = debouncer.keystroke("xy", t + ms(10));

        assert_eq!(debouncer.fire(first.generation), None);
        assert_eq!(debouncer.fire(second.generation), Some(Query::settle("xy")));
        assert_eq!(debouncer.state(), DebounceState::Settled);
    }

    #[test]
    fn cancel_prevents_late_settle() {
        let t = Instant::now();
        let mut debouncer = Debouncer::default();
        let timer = debouncer.keystroke("late", t);
        debouncer.cancel();

        assert_eq!(debouncer.fire(timer.generation), None);
        assert_eq!(debouncer.poll(t + ms(10_000)), None);
        assert!(debouncer.settled().is_unfiltered());
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }
}
