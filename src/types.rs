//! Common types and data structures used across the ledswitch application
//!
//! This module contains small value types shared by the input monitor,
//! the animation tasks and the serial bridge.

use crate::config::INPUT_COUNT;

/// Normalized switch level. Raw lines are active-low; nothing past the
/// I/O boundary ever sees the raw polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchLevel {
    Pressed,
    Released,
}

impl SwitchLevel {
    /// Convert a raw pin reading from an active-low switch (pull-up, closes to ground)
    pub const fn from_active_low(is_high: bool) -> Self {
        if is_high {
            SwitchLevel::Released
        } else {
            SwitchLevel::Pressed
        }
    }

    pub const fn is_pressed(self) -> bool {
        matches!(self, SwitchLevel::Pressed)
    }
}

/// End of the sweep bank where the last sweep settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cursor {
    Left,
    Right,
}

impl Cursor {
    pub const fn opposite(self) -> Self {
        match self {
            Cursor::Left => Cursor::Right,
            Cursor::Right => Cursor::Left,
        }
    }

    pub(crate) const fn to_raw(self) -> u8 {
        match self {
            Cursor::Left => 0,
            Cursor::Right => 1,
        }
    }

    pub(crate) fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Cursor::Left,
            1 => Cursor::Right,
            other => panic!("impossible cursor state {}", other),
        }
    }
}

/// Direction a sweep head travels along the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SweepDirection {
    /// Starts at channel 0, settles on the last channel
    LeftToRight,
    /// Starts at the last channel, settles on channel 0
    RightToLeft,
}

impl SweepDirection {
    /// Side the cursor must show before this sweep may run
    pub const fn start(self) -> Cursor {
        match self {
            SweepDirection::LeftToRight => Cursor::Left,
            SweepDirection::RightToLeft => Cursor::Right,
        }
    }

    /// Side the head settles on
    pub const fn end(self) -> Cursor {
        self.start().opposite()
    }

    /// Sweep that starts from the given side
    pub const fn from_start(start: Cursor) -> Self {
        match start {
            Cursor::Left => SweepDirection::LeftToRight,
            Cursor::Right => SweepDirection::RightToLeft,
        }
    }

    /// Bank index of the `step`th channel visited
    pub fn index(self, step: usize, len: usize) -> usize {
        assert!(step < len, "sweep step {} outside bank of {}", step, len);
        match self {
            SweepDirection::LeftToRight => step,
            SweepDirection::RightToLeft => len - 1 - step,
        }
    }
}

/// Debounced switch state for communicating between tasks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    /// Array of button states - true if pressed, false if released
    pub buttons: [bool; INPUT_COUNT],
    /// Whether any button state has changed since last report
    pub changed: bool,
}

impl ButtonState {
    /// Create new button state with all buttons released
    pub const fn new() -> Self {
        Self {
            buttons: [false; INPUT_COUNT],
            changed: false,
        }
    }

    /// Check if a specific button is pressed
    pub fn is_pressed(&self, button_index: usize) -> bool {
        self.buttons.get(button_index).copied().unwrap_or(false)
    }

    /// Set button state and mark as changed if different
    pub fn set_button(&mut self, button_index: usize, pressed: bool) {
        if let Some(slot) = self.buttons.get_mut(button_index) {
            if *slot != pressed {
                *slot = pressed;
                self.changed = true;
            }
        }
    }
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::new()
    }
}

/// Current application version, from the package manifest
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_low_reading_is_normalized() {
        assert_eq!(SwitchLevel::from_active_low(false), SwitchLevel::Pressed);
        assert_eq!(SwitchLevel::from_active_low(true), SwitchLevel::Released);
    }

    #[test]
    fn sweep_directions_mirror_each_other() {
        assert_eq!(SweepDirection::LeftToRight.start(), Cursor::Left);
        assert_eq!(SweepDirection::LeftToRight.end(), Cursor::Right);
        assert_eq!(SweepDirection::RightToLeft.index(0, 8), 7);
        assert_eq!(SweepDirection::RightToLeft.index(7, 8), 0);
        assert_eq!(SweepDirection::from_start(Cursor::Right), SweepDirection::RightToLeft);
    }

    #[test]
    #[should_panic]
    fn sweep_index_past_the_bank_panics() {
        SweepDirection::LeftToRight.index(8, 8);
    }

    #[test]
    fn button_state_tracks_changes() {
        let mut state = ButtonState::new();
        state.set_button(1, false);
        assert!(!state.changed);
        state.set_button(1, true);
        assert!(state.changed);
        assert!(state.is_pressed(1));
        assert!(!state.is_pressed(INPUT_COUNT + 3));
    }

    #[test]
    fn version_comes_from_the_manifest() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
