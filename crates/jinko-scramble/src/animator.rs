//! Per-character scramble-reveal state machine.

use std::time::Duration;

use rand::Rng;
use ratatui::{
    style::{Style, Stylize},
    text::{Line, Span},
};

use crate::chars::NOISE_CHARS;
use crate::scheduler::{Scheduler, Token};

/// Frame budget within which the last slot must resolve, regardless of
/// string length.
pub const FRAMES_PER_EPOCH: u32 = 45;

/// Pause between a completed pass and the restart of the next one.
pub const RESTART_DELAY: Duration = Duration::from_millis(750);

/// One character position in the target string.
#[derive(Debug, Clone)]
struct Slot {
    /// Final character for this position.
    target: char,
    /// Currently displayed glyph.
    shown: char,
    /// Whether this slot has settled on its final character.
    resolved: bool,
}

/// The single outstanding wakeup for an animator.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Frame(Token),
    Pause(Token),
}

/// Frame-driven reveal animation for a fixed target string.
///
/// Each slot's reveal frame is `per_slot_frames * (i + 1)`, with
/// `per_slot_frames = ceil(45 / N)`: a staggered left-to-right wave that
/// finishes within one epoch whatever the string length. At most one
/// wakeup (frame tick or pause timer) is outstanding at any moment.
#[derive(Debug)]
pub struct ScrambleAnimator {
    slots: Vec<Slot>,
    per_slot_frames: u32,
    frame: u32,
    resolved: usize,
    pending: Option<Pending>,
}

impl ScrambleAnimator {
    /// Start a new animation for `target`, scheduling the first wakeup.
    ///
    /// An empty target is immediately complete; it schedules the pause
    /// timer and never draws a noise glyph.
    pub fn start(target: &str, sched: &mut dyn Scheduler) -> Self {
        let slots: Vec<Slot> = target
            .chars()
            .map(|c| Slot {
                target: c,
                shown: noise_char(),
                resolved: false,
            })
            .collect();
        let per_slot_frames = if slots.is_empty() {
            FRAMES_PER_EPOCH
        } else {
            FRAMES_PER_EPOCH.div_ceil(slots.len() as u32)
        };
        let pending = Some(if slots.is_empty() {
            Pending::Pause(sched.schedule_delay(RESTART_DELAY))
        } else {
            Pending::Frame(sched.schedule_frame())
        });
        Self {
            slots,
            per_slot_frames,
            frame: 0,
            resolved: 0,
            pending,
        }
    }

    /// Advance the animation if its pending wakeup has fired.
    pub fn poll(&mut self, sched: &mut dyn Scheduler) {
        match self.pending {
            Some(Pending::Frame(token)) if sched.fire(token) => {
                self.pending = None;
                self.step(sched);
            }
            Some(Pending::Pause(token)) if sched.fire(token) => {
                self.pending = None;
                self.restart();
                self.pending = Some(if self.slots.is_empty() {
                    Pending::Pause(sched.schedule_delay(RESTART_DELAY))
                } else {
                    Pending::Frame(sched.schedule_frame())
                });
            }
            _ => {}
        }
    }

    /// Cancel the pending wakeup, whichever kind. Safe to call with
    /// nothing pending.
    pub fn stop(&mut self, sched: &mut dyn Scheduler) {
        if let Some(pending) = self.pending.take() {
            let (Pending::Frame(token) | Pending::Pause(token)) = pending;
            sched.cancel(token);
        }
    }

    /// One frame tick: noise the unresolved slots whose reveal frame has
    /// not arrived, resolve the ones whose frame has, then schedule the
    /// next wakeup.
    fn step(&mut self, sched: &mut dyn Scheduler) {
        if self.resolved < self.slots.len() {
            for i in self.resolved..self.slots.len() {
                if self.frame < self.per_slot_frames * (i as u32 + 1) {
                    self.slots[i].shown = noise_char();
                } else {
                    self.slots[i].shown = self.slots[i].target;
                    self.slots[i].resolved = true;
                    self.resolved += 1;
                }
            }
            self.frame += 1;
            self.pending = Some(Pending::Frame(sched.schedule_frame()));
        } else {
            self.pending = Some(Pending::Pause(sched.schedule_delay(RESTART_DELAY)));
        }
    }

    /// Reset for the next pass. The settled text stays on screen until
    /// the first frame of the new pass overwrites it with noise.
    fn restart(&mut self) {
        self.frame = 0;
        self.resolved = 0;
        for slot in &mut self.slots {
            slot.resolved = false;
        }
    }

    /// Frame counter within the current pass.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Number of slots settled so far; always a prefix of the string.
    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// Whether every slot has settled on its final character.
    pub fn is_complete(&self) -> bool {
        self.resolved == self.slots.len()
    }

    /// Per-slot resolved flags, in slot order.
    pub fn resolved_mask(&self) -> Vec<bool> {
        self.slots.iter().map(|s| s.resolved).collect()
    }

    /// Currently displayed glyphs.
    pub fn text(&self) -> String {
        self.slots.iter().map(|s| s.shown).collect()
    }

    /// Styled line for rendering: resolved slots bright, noise dim.
    pub fn line(&self) -> Line<'static> {
        let spans: Vec<Span> = self
            .slots
            .iter()
            .map(|slot| {
                if slot.resolved {
                    Span::styled(slot.shown.to_string(), Style::new().white().bold())
                } else {
                    Span::styled(slot.shown.to_string(), Style::new().dark_gray())
                }
            })
            .collect();
        Line::from(spans)
    }
}

/// Draw one uniformly random noise glyph.
fn noise_char() -> char {
    NOISE_CHARS[rand::thread_rng().gen_range(0..NOISE_CHARS.len())]
}
