//! RGB brightness rendering
//!
//! `Pwm` keeps every group switched at a fixed frame period, on for a
//! share of the frame proportional to its level. `LevelBar` shows each
//! level as a three-step bar (red, green, blue) and renders once per wake.

use embassy_time::{Duration, Instant, Timer};

use super::Outcome;
use crate::config::RGB_GROUPS;
use crate::registry::{rgb_channel, rgb_group, OutputBank, RgbComponent};
use crate::state::{Levels, SharedState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderMode {
    Pwm,
    LevelBar,
}

/// On-time of one group inside a frame of `period`
///
/// Integer truncation: `level * period / max`.
pub fn on_time(level: u8, max: u8, period: Duration) -> Duration {
    assert!(max > 0 && level <= max, "level {} outside 0..={}", level, max);
    Duration::from_ticks(level as u64 * period.as_ticks() / max as u64)
}

/// On-times of every group for one frame
pub fn pwm_schedule(levels: Levels, max: u8, period: Duration) -> [Duration; RGB_GROUPS] {
    levels.map(|level| on_time(level, max, period))
}

/// Channels of the level bar as (red, green, blue)
pub fn level_bar(level: u8, max: u8) -> [bool; 3] {
    [level > 0, level > max / 10, level == max]
}

fn set_group<B: OutputBank>(bank: &mut B, group: usize, on: bool) {
    for index in rgb_group(group) {
        bank.set_level(index, on);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessRenderer {
    pub mode: RenderMode,
}

impl BrightnessRenderer {
    pub const fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    pub async fn run_cycle<B: OutputBank>(&self, state: &SharedState, bank: &mut B, period: Duration) -> Outcome {
        match self.mode {
            RenderMode::Pwm => render_frame(state, bank, period).await,
            RenderMode::LevelBar => render_bars(state, bank),
        }
        Outcome::Rendered
    }
}

/// One PWM frame: everything with a non-zero level on at the frame start,
/// each group off at its own on-time, frame closed at `period`.
async fn render_frame<B: OutputBank>(state: &SharedState, bank: &mut B, period: Duration) {
    let schedule = pwm_schedule(state.levels(), state.max_brightness(), period);
    let start = Instant::now();
    let zero = Duration::from_ticks(0);

    for (group, on) in schedule.iter().enumerate() {
        set_group(bank, group, *on > zero);
    }

    let mut order: [usize; RGB_GROUPS] = core::array::from_fn(|group| group);
    order.sort_unstable_by_key(|&group| schedule[group]);
    for group in order {
        let on = schedule[group];
        // Dark groups never came on; full groups stay on into the next frame
        if on == zero || on >= period {
            continue;
        }
        Timer::at(start + on).await;
        set_group(bank, group, false);
    }

    Timer::at(start + period).await;
}

fn render_bars<B: OutputBank>(state: &SharedState, bank: &mut B) {
    let max = state.max_brightness();
    for (group, level) in state.levels().into_iter().enumerate() {
        let [red, green, blue] = level_bar(level, max);
        bank.set_level(rgb_channel(group, RgbComponent::Red), red);
        bank.set_level(rgb_channel(group, RgbComponent::Green), green);
        bank.set_level(rgb_channel(group, RgbComponent::Blue), blue);
    }
    trace!("Level bars {:?}", state.levels());
}
