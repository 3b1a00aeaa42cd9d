//! Heartbeat blinker for the two-channel blink bank

use embassy_time::{Duration, Timer};

use super::Outcome;
use crate::registry::OutputBank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlinkStyle {
    /// Light exactly one channel per period, in turn
    Cycle,
    /// Read back one channel per period and invert it
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blinker {
    style: BlinkStyle,
    next: usize,
}

impl Blinker {
    pub const fn new(style: BlinkStyle) -> Self {
        Self { style, next: 0 }
    }

    /// Channel the next cycle works on
    pub fn next_channel(&self) -> usize {
        self.next
    }

    pub async fn run_cycle<B: OutputBank>(&mut self, bank: &mut B, period: Duration) -> Outcome {
        let len = bank.len();
        assert!(len > 0, "blink bank is empty");
        let index = self.next;

        match self.style {
            BlinkStyle::Cycle => {
                bank.set_level(index, true);
                Timer::after(period).await;
                bank.set_level(index, false);
            }
            BlinkStyle::Toggle => {
                let lit = bank.level(index);
                bank.set_level(index, !lit);
                Timer::after(period).await;
            }
        }

        self.next = (index + 1) % len;
        Outcome::Rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::testing::RecordingBank;
    use embassy_futures::block_on;

    const PERIOD: Duration = Duration::from_millis(1);

    #[test]
    fn cycle_lights_one_channel_at_a_time() {
        let mut bank = RecordingBank::new(2);
        let mut blinker = Blinker::new(BlinkStyle::Cycle);

        for expected in [0, 1, 0] {
            bank.clear_log();
            block_on(blinker.run_cycle(&mut bank, PERIOD));
            let touched: std::vec::Vec<_> = bank.writes.iter().map(|w| (w.index, w.on)).collect();
            assert_eq!(touched, [(expected, true), (expected, false)]);
            assert!(bank.lit().is_empty());
        }
    }

    #[test]
    fn index_wraps_modulo_bank_size() {
        let mut bank = RecordingBank::new(3);
        let mut blinker = Blinker::new(BlinkStyle::Cycle);
        for _ in 0..3 {
            block_on(blinker.run_cycle(&mut bank, PERIOD));
        }
        assert_eq!(blinker.next_channel(), 0);
    }

    #[test]
    fn toggle_inverts_read_back_level() {
        let mut bank = RecordingBank::new(2);
        bank.levels[1] = true;
        let mut blinker = Blinker::new(BlinkStyle::Toggle);

        block_on(blinker.run_cycle(&mut bank, PERIOD));
        block_on(blinker.run_cycle(&mut bank, PERIOD));
        assert_eq!(bank.levels, [true, false]);

        block_on(blinker.run_cycle(&mut bank, PERIOD));
        assert_eq!(bank.levels, [false, false]);
    }
}
