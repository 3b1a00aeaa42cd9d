//! Sweeps across the eight-channel bank
//!
//! Interlock: a one-way sweep moves the head only when the cursor shows
//! its own start side. Whether it moved or not, it then parks the cursor on
//! its far end. The bidirectional sweep always moves, in whichever
//! direction the cursor allows, and flips the cursor as well.

use embassy_time::{Duration, Timer};

use super::Outcome;
use crate::registry::OutputBank;
use crate::state::SharedState;
use crate::types::SweepDirection;

/// Width of the moving head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SweepWindow {
    /// Only the head channel is lit
    Single,
    /// The head plus the next channel it is about to enter
    Overlap,
}

/// Walk the head from one end of the bank to the other.
///
/// The bank is cleared first; the far-end channel is left lit.
pub async fn walk<B: OutputBank>(bank: &mut B, direction: SweepDirection, window: SweepWindow, step: Duration) {
    let len = bank.len();
    assert!(len >= 2, "sweep bank needs at least two channels, has {}", len);

    bank.fill(false);
    for pos in 0..len - 1 {
        let head = direction.index(pos, len);
        bank.set_level(head, true);
        if window == SweepWindow::Overlap {
            bank.set_level(direction.index(pos + 1, len), true);
        }
        Timer::after(step).await;
        bank.set_level(head, false);
    }
    bank.set_level(direction.index(len - 1, len), true);
}

/// One-way sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sweep {
    pub direction: SweepDirection,
    pub window: SweepWindow,
}

impl Sweep {
    pub const fn new(direction: SweepDirection, window: SweepWindow) -> Self {
        Self { direction, window }
    }

    pub async fn run_cycle<B: OutputBank>(&self, state: &SharedState, bank: &mut B, step: Duration) -> Outcome {
        let outcome = if state.cursor() == self.direction.start() {
            walk(bank, self.direction, self.window, step).await;
            Outcome::Rendered
        } else {
            debug!("Sweep {:?} skipped, cursor at {:?}", self.direction, state.cursor());
            Outcome::Skipped
        };
        state.set_cursor(self.direction.end());
        outcome
    }
}

/// Sweep that alternates direction on every wake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidirectionalSweep {
    pub window: SweepWindow,
}

impl BidirectionalSweep {
    pub const fn new(window: SweepWindow) -> Self {
        Self { window }
    }

    pub async fn run_cycle<B: OutputBank>(&self, state: &SharedState, bank: &mut B, step: Duration) -> Outcome {
        let direction = SweepDirection::from_start(state.cursor());
        walk(bank, direction, self.window, step).await;
        state.set_cursor(direction.end());
        Outcome::Rendered
    }
}
