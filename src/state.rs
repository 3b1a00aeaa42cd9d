//! Shared animation and brightness state
//!
//! Process-wide values written by the input monitor (and the serial
//! bridge) and read by the animation tasks. Single values live in atomics;
//! everything that must change together sits behind a critical-section
//! mutex so a reader never observes half of an update.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant};
use portable_atomic::{AtomicU8, Ordering};

use crate::config::{DEFAULT_BRIGHTNESS, INPUT_COUNT, MAX_BRIGHTNESS, RGB_GROUPS};
use crate::types::Cursor;

/// Brightness of every RGB group, `0..=max`
pub type Levels = [u8; RGB_GROUPS];

/// Click timing kept per input for double-click detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickCounter {
    pub count: u8,
    pub last: Instant,
}

impl ClickCounter {
    pub const fn new() -> Self {
        Self {
            count: 0,
            last: Instant::from_ticks(0),
        }
    }

    /// Register a qualifying press. Returns true when it completes a double-click.
    ///
    /// A press more than `timeout` after the previous one starts a fresh
    /// window with a count of 1.
    pub fn register(&mut self, now: Instant, timeout: Duration) -> bool {
        if self.count == 1 && now.saturating_duration_since(self.last) <= timeout {
            self.count = 0;
            return true;
        }
        self.count = 1;
        self.last = now;
        false
    }
}

impl Default for ClickCounter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SharedState {
    cursor: AtomicU8,
    brightness: Mutex<CriticalSectionRawMutex, Cell<Levels>>,
    clicks: Mutex<CriticalSectionRawMutex, Cell<[ClickCounter; INPUT_COUNT]>>,
    link_mask: AtomicU8,
    max_brightness: u8,
}

impl SharedState {
    /// Defaults: cursor on the left, every group at mid-scale, no clicks
    pub const fn new() -> Self {
        Self::with_scale(MAX_BRIGHTNESS, DEFAULT_BRIGHTNESS)
    }

    /// State on a custom brightness scale with every group at `initial`
    pub const fn with_scale(max_brightness: u8, initial: u8) -> Self {
        assert!(initial <= max_brightness);
        Self {
            cursor: AtomicU8::new(Cursor::Left.to_raw()),
            brightness: Mutex::new(Cell::new([initial; RGB_GROUPS])),
            clicks: Mutex::new(Cell::new([ClickCounter::new(); INPUT_COUNT])),
            link_mask: AtomicU8::new(0),
            max_brightness,
        }
    }

    // ===============================================================
    // Sweep cursor
    // ===============================================================

    pub fn cursor(&self) -> Cursor {
        Cursor::from_raw(self.cursor.load(Ordering::Acquire))
    }

    pub fn set_cursor(&self, cursor: Cursor) {
        self.cursor.store(cursor.to_raw(), Ordering::Release);
    }

    // ===============================================================
    // Brightness
    // ===============================================================

    pub fn max_brightness(&self) -> u8 {
        self.max_brightness
    }

    pub fn levels(&self) -> Levels {
        self.brightness.lock(Cell::get)
    }

    pub fn level(&self, group: usize) -> u8 {
        self.levels()[group]
    }

    /// Overwrite every level. Values above the scale are clamped.
    pub fn set_levels(&self, levels: Levels) {
        let max = self.max_brightness;
        self.brightness.lock(|cell| cell.set(levels.map(|level| level.min(max))));
    }

    /// Move up to `step` from group `from` to group `to` in one atomic update.
    ///
    /// The amount actually moved is limited by what `from` holds and what
    /// `to` can still take, so the sum of the pair never changes and
    /// neither side leaves `0..=max`.
    pub fn transfer(&self, from: usize, to: usize, step: u8) -> Levels {
        assert!(from < RGB_GROUPS && to < RGB_GROUPS && from != to, "bad transfer pair {}->{}", from, to);
        let max = self.max_brightness;
        self.brightness.lock(|cell| {
            let mut levels = cell.get();
            let moved = step.min(levels[from]).min(max - levels[to]);
            levels[from] -= moved;
            levels[to] += moved;
            cell.set(levels);
            levels
        })
    }

    /// Raise or lower one group by `delta`, clamped to `0..=max`
    pub fn adjust(&self, group: usize, delta: i16) -> Levels {
        assert!(group < RGB_GROUPS, "rgb group {} out of range", group);
        let max = self.max_brightness;
        self.brightness.lock(|cell| {
            let mut levels = cell.get();
            levels[group] = clamp_step(levels[group], delta, max);
            cell.set(levels);
            levels
        })
    }

    /// Raise or lower every group by `delta`, clamped to `0..=max`
    pub fn adjust_all(&self, delta: i16) -> Levels {
        let max = self.max_brightness;
        self.brightness.lock(|cell| {
            let levels = cell.get().map(|level| clamp_step(level, delta, max));
            cell.set(levels);
            levels
        })
    }

    // ===============================================================
    // Click counters
    // ===============================================================

    /// Register a press on `input`; true when it completes a double-click
    pub fn register_click(&self, input: usize, now: Instant, timeout: Duration) -> bool {
        self.clicks.lock(|cell| {
            let mut clicks = cell.get();
            let double = clicks[input].register(now, timeout);
            cell.set(clicks);
            double
        })
    }

    pub fn click_counter(&self, input: usize) -> ClickCounter {
        self.clicks.lock(|cell| cell.get()[input])
    }

    // ===============================================================
    // Serial bridge mask
    // ===============================================================

    pub fn link_mask(&self) -> u8 {
        self.link_mask.load(Ordering::Acquire)
    }

    pub fn set_link_mask(&self, mask: u8) {
        self.link_mask.store(mask, Ordering::Release);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp before subtracting so the unsigned level can never wrap
fn clamp_step(level: u8, delta: i16, max: u8) -> u8 {
    let next = (level as i16).saturating_add(delta).clamp(0, max as i16);
    next as u8
}
