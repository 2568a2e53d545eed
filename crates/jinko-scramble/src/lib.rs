//! Scramble-reveal text animation.
//!
//! Drives a per-character "decode" effect for an arbitrary target string:
//! every character slot shows random noise glyphs until its reveal frame
//! arrives, at which point it settles on the real character. Slots resolve
//! left to right within a fixed frame budget, so short and long labels
//! decode over a comparable wall-clock span. A completed pass pauses
//! briefly and restarts, looping until stopped.
//!
//! Scheduling is abstracted behind the [`Scheduler`] trait so the loop can
//! be driven by wall-clock time in the application and advanced
//! synchronously in tests.

mod animator;
mod chars;
mod scheduler;

pub use animator::{FRAMES_PER_EPOCH, RESTART_DELAY, ScrambleAnimator};
pub use chars::NOISE_CHARS;
pub use scheduler::{FRAME_INTERVAL, FakeScheduler, Scheduler, TickScheduler, Token};
