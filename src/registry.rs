//! Output device registry
//!
//! Fixed table of every LED channel, grouped into banks, plus the
//! `OutputBank` seam the animation tasks draw through. On target a bank is
//! an array of `embassy_rp` outputs; in tests it is a recording mock.

use core::ops::Range;

use embedded_hal::digital::StatefulOutputPin;

use crate::config::{BLINK_BANK_LEN, BLINK_PINS, RGB_BANK_LEN, RGB_GROUPS, RGB_PINS, SWEEP_BANK_LEN, SWEEP_PINS};

/// Named group of output channels animated as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BankId {
    /// Two-channel heartbeat bank
    Blink,
    /// Eight-channel strip shared by sweeps, fills and the serial bridge
    Sweep,
    /// Three RGB LEDs, three channels each
    Rgb,
}

impl BankId {
    pub const ALL: [BankId; 3] = [BankId::Blink, BankId::Sweep, BankId::Rgb];

    pub const fn len(self) -> usize {
        match self {
            BankId::Blink => BLINK_BANK_LEN,
            BankId::Sweep => SWEEP_BANK_LEN,
            BankId::Rgb => RGB_BANK_LEN,
        }
    }

    const fn pins(self) -> &'static [u8] {
        match self {
            BankId::Blink => &BLINK_PINS,
            BankId::Sweep => &SWEEP_PINS,
            BankId::Rgb => &RGB_PINS,
        }
    }
}

/// One controllable line. Immutable after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputChannel {
    /// GPIO number driving the LED
    pub id: u8,
    pub group: BankId,
}

/// Look up the physical line behind `index` of `bank`
pub fn channel(bank: BankId, index: usize) -> OutputChannel {
    let pins = bank.pins();
    assert!(index < pins.len(), "channel {} outside {:?} bank", index, bank);
    OutputChannel {
        id: pins[index],
        group: bank,
    }
}

/// Every channel of `bank`, in bank index order
pub fn channels(bank: BankId) -> impl Iterator<Item = OutputChannel> {
    (0..bank.len()).map(move |index| channel(bank, index))
}

/// Colour component inside one RGB group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RgbComponent {
    Red = 0,
    Green = 1,
    Blue = 2,
}

/// Bank indices of the three channels of an RGB group
pub fn rgb_group(group: usize) -> Range<usize> {
    assert!(group < RGB_GROUPS, "rgb group {} out of range", group);
    group * 3..group * 3 + 3
}

/// Bank index of a single colour component
pub fn rgb_channel(group: usize, component: RgbComponent) -> usize {
    rgb_group(group).start + component as usize
}

// ===================================================================
// Bank Abstraction
// ===================================================================

/// Addressable bank of on/off outputs
pub trait OutputBank {
    /// Number of channels in the bank
    fn len(&self) -> usize;

    /// Drive one channel. Hardware writes are assumed to succeed.
    fn set_level(&mut self, index: usize, on: bool);

    /// Read back the level last driven onto a channel
    fn level(&mut self, index: usize) -> bool;

    /// Drive every channel to the same level
    fn fill(&mut self, on: bool) {
        for index in 0..self.len() {
            self.set_level(index, on);
        }
    }

    /// Drive channel `i` from bit `i` of `mask`
    fn apply_mask(&mut self, mask: u32) {
        for index in 0..self.len() {
            self.set_level(index, mask & (1 << index) != 0);
        }
    }
}

/// Bank backed by an array of GPIO outputs
pub struct PinBank<P, const N: usize> {
    pins: [P; N],
}

impl<P: StatefulOutputPin, const N: usize> PinBank<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        Self { pins }
    }
}

impl<P: StatefulOutputPin, const N: usize> OutputBank for PinBank<P, N> {
    fn len(&self) -> usize {
        N
    }

    fn set_level(&mut self, index: usize, on: bool) {
        assert!(index < N, "channel {} outside bank of {}", index, N);
        let pin = &mut self.pins[index];
        let _ = if on { pin.set_high() } else { pin.set_low() };
    }

    fn level(&mut self, index: usize) -> bool {
        assert!(index < N, "channel {} outside bank of {}", index, N);
        self.pins[index].is_set_high().unwrap_or(false)
    }
}
