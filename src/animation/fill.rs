//! Whole-bank effects: solid fills and the serial bridge mirror

use embassy_time::{Duration, Timer};

use super::Outcome;
use crate::registry::OutputBank;
use crate::state::SharedState;

/// Drive every channel of the bank to one level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub level: bool,
}

impl Fill {
    pub const fn new(level: bool) -> Self {
        Self { level }
    }

    pub fn run_cycle<B: OutputBank>(&self, bank: &mut B) -> Outcome {
        bank.fill(self.level);
        Outcome::Rendered
    }
}

/// Copies the commanded link mask onto the bank at a fixed refresh rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankMirror;

impl BankMirror {
    pub async fn run_cycle<B: OutputBank>(&self, state: &SharedState, bank: &mut B, refresh: Duration) -> Outcome {
        bank.apply_mask(state.link_mask() as u32);
        Timer::after(refresh).await;
        Outcome::Rendered
    }
}
