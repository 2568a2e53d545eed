//! Deferred, cancellable wakeup scheduling for the scramble loop.
//!
//! The animator never sleeps or blocks; it records a single pending wakeup
//! (a frame tick or a pause timer) and asks the scheduler whether that
//! wakeup has fired. [`TickScheduler`] answers from the wall clock and
//! drives the real UI; [`FakeScheduler`] answers from a manually advanced
//! clock so tests can step frames synchronously.

use std::time::{Duration, Instant};

/// Nominal frame period (~60 fps, mirroring a display refresh callback).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Opaque handle to one pending wakeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(u64);

/// Deferred-callback scheduling.
pub trait Scheduler {
    /// Request a wakeup on the next animation frame.
    fn schedule_frame(&mut self) -> Token;

    /// Request a wakeup after the given delay.
    fn schedule_delay(&mut self, delay: Duration) -> Token;

    /// Cancel a pending wakeup. Unknown, fired, and already-cancelled
    /// tokens are ignored.
    fn cancel(&mut self, token: Token);

    /// Consume `token` if its wakeup time has arrived. Returns `false`
    /// for wakeups that are still pending, cancelled, or already fired.
    fn fire(&mut self, token: Token) -> bool;
}

/// Wall-clock scheduler used by the application event loop.
#[derive(Debug, Default)]
pub struct TickScheduler {
    next: u64,
    pending: Vec<(Token, Instant)>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, delay: Duration) -> Token {
        let token = Token(self.next);
        self.next += 1;
        self.pending.push((token, Instant::now() + delay));
        token
    }
}

impl Scheduler for TickScheduler {
    fn schedule_frame(&mut self) -> Token {
        self.push(FRAME_INTERVAL)
    }

    fn schedule_delay(&mut self, delay: Duration) -> Token {
        self.push(delay)
    }

    fn cancel(&mut self, token: Token) {
        self.pending.retain(|(t, _)| *t != token);
    }

    fn fire(&mut self, token: Token) -> bool {
        let now = Instant::now();
        match self
            .pending
            .iter()
            .position(|(t, due)| *t == token && *due <= now)
        {
            Some(pos) => {
                self.pending.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Deterministic scheduler for tests: its clock only advances via
/// [`FakeScheduler::advance`].
#[derive(Debug, Default)]
pub struct FakeScheduler {
    now: Duration,
    next: u64,
    pending: Vec<(Token, Duration)>,
}

impl FakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the fake clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Number of wakeups not yet fired or cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn push(&mut self, delay: Duration) -> Token {
        let token = Token(self.next);
        self.next += 1;
        self.pending.push((token, self.now + delay));
        token
    }
}

impl Scheduler for FakeScheduler {
    fn schedule_frame(&mut self) -> Token {
        self.push(FRAME_INTERVAL)
    }

    fn schedule_delay(&mut self, delay: Duration) -> Token {
        self.push(delay)
    }

    fn cancel(&mut self, token: Token) {
        self.pending.retain(|(t, _)| *t != token);
    }

    fn fire(&mut self, token: Token) -> bool {
        match self
            .pending
            .iter()
            .position(|(t, due)| *t == token && *due <= self.now)
        {
            Some(pos) => {
                self.pending.remove(pos);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_wakeup_fires_only_after_advance() {
        let mut sched = FakeScheduler::new();
        let token = sched.schedule_frame();
        assert!(!sched.fire(token));
        sched.advance(FRAME_INTERVAL);
        assert!(sched.fire(token));
    }

    #[test]
    fn fired_token_is_single_use() {
        let mut sched = FakeScheduler::new();
        let token = sched.schedule_delay(Duration::from_millis(10));
        sched.advance(Duration::from_millis(10));
        assert!(sched.fire(token));
        assert!(!sched.fire(token));
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn cancel_prevents_fire() {
        let mut sched = FakeScheduler::new();
        let token = sched.schedule_delay(Duration::from_millis(5));
        sched.cancel(token);
        sched.advance(Duration::from_millis(100));
        assert!(!sched.fire(token));
    }

    #[test]
    fn cancel_of_unknown_token_is_ignored() {
        let mut sched = FakeScheduler::new();
        let token = sched.schedule_frame();
        sched.cancel(token);
        sched.cancel(token);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn tokens_are_distinct() {
        let mut sched = FakeScheduler::new();
        let a = sched.schedule_frame();
        let b = sched.schedule_frame();
        assert_ne!(a, b);
        sched.advance(FRAME_INTERVAL);
        assert!(sched.fire(a));
        assert!(sched.fire(b));
    }

    #[test]
    fn tick_scheduler_delay_is_not_due_immediately() {
        let mut sched = TickScheduler::new();
        let token = sched.schedule_delay(Duration::from_secs(60));
        assert!(!sched.fire(token));
        sched.cancel(token);
        assert!(!sched.fire(token));
    }
}
