//! Input monitor: switch polling, debouncing and dispatch
//!
//! The monitor polls every switch once per poll interval, confirms presses
//! through a settle delay, and turns each confirmed press into the action
//! its binding names: waking an animation, moving brightness, or feeding
//! the double-click detector. It never suspends; it only sleeps between
//! polls.

use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::InputPin;

use crate::config::INPUT_COUNT;
use crate::context::Context;
use crate::state::Levels;
use crate::tasks::TaskId;
use crate::types::{ButtonState, SwitchLevel};

// ===================================================================
// Input Lines
// ===================================================================

/// Source of normalized switch levels
pub trait InputLines {
    fn read(&mut self, line: usize) -> SwitchLevel;
}

/// Active-low switches on GPIO inputs with pull-ups
pub struct PinInputs<P, const N: usize> {
    pins: [P; N],
}

impl<P: InputPin, const N: usize> PinInputs<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        Self { pins }
    }
}

impl<P: InputPin, const N: usize> InputLines for PinInputs<P, N> {
    fn read(&mut self, line: usize) -> SwitchLevel {
        // A failed read counts as an open switch
        self.pins[line]
            .is_high()
            .map(SwitchLevel::from_active_low)
            .unwrap_or(SwitchLevel::Released)
    }
}

// ===================================================================
// Debouncing
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Released,
    PressEdgeDetected { since: Instant },
    Pressed,
}

/// Confirmed transition out of the debouncer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Pressed,
    Released,
}

/// Per-input press confirmation
///
/// An active read after an inactive one only opens a press edge. The press
/// is confirmed by the first active read at least `settle` later; an
/// inactive read in between drops the edge as contact bounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    state: DebounceState,
}

impl Debouncer {
    pub const fn new() -> Self {
        Self {
            state: DebounceState::Released,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.state == DebounceState::Pressed
    }

    pub fn update(&mut self, level: SwitchLevel, now: Instant, settle: Duration) -> Option<Edge> {
        match (self.state, level) {
            (DebounceState::Released, SwitchLevel::Pressed) => {
                self.state = DebounceState::PressEdgeDetected { since: now };
                None
            }
            (DebounceState::PressEdgeDetected { since }, SwitchLevel::Pressed) => {
                if now.saturating_duration_since(since) >= settle {
                    self.state = DebounceState::Pressed;
                    Some(Edge::Pressed)
                } else {
                    None
                }
            }
            (DebounceState::PressEdgeDetected { .. }, SwitchLevel::Released) => {
                self.state = DebounceState::Released;
                None
            }
            (DebounceState::Pressed, SwitchLevel::Released) => {
                self.state = DebounceState::Released;
                Some(Edge::Released)
            }
            (DebounceState::Released, SwitchLevel::Released) | (DebounceState::Pressed, SwitchLevel::Pressed) => None,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

// ===================================================================
// Bindings
// ===================================================================

/// What a confirmed press on one input does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputAction {
    None,
    /// Resume the task if it is idle
    Wake(TaskId),
    /// Move `step` from one RGB group to another, sum preserved
    Transfer { from: usize, to: usize, step: u8 },
    /// Raise or lower one RGB group
    Adjust { group: usize, delta: i16 },
    /// Raise or lower every RGB group
    AdjustAll { delta: i16 },
    /// Resume the task on the second press within the double-click timeout
    DoubleClick(TaskId),
}

/// Two inputs held together wake a third task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboBinding {
    pub first: usize,
    pub second: usize,
    pub task: TaskId,
}

impl ComboBinding {
    pub const fn members(&self) -> [usize; 2] {
        [self.first, self.second]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputBindings {
    pub actions: [InputAction; INPUT_COUNT],
    pub combo: Option<ComboBinding>,
}

impl InputBindings {
    pub const fn new(actions: [InputAction; INPUT_COUNT]) -> Self {
        Self { actions, combo: None }
    }

    pub const fn with_combo(mut self, first: usize, second: usize, task: TaskId) -> Self {
        assert!(first < INPUT_COUNT && second < INPUT_COUNT && first != second);
        self.combo = Some(ComboBinding { first, second, task });
        self
    }
}

/// Result of one confirmed press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// Resume requested; `woke` is false when the task was busy or absent
    Wake { task: TaskId, woke: bool },
    /// Brightness changed to these levels
    Brightness(Levels),
    /// First press of a possible double-click
    Click { input: usize },
}

// ===================================================================
// Monitor
// ===================================================================

pub struct InputMonitor<'a, I> {
    ctx: &'a Context,
    inputs: I,
    bindings: InputBindings,
    debouncers: [Debouncer; INPUT_COUNT],
    buttons: ButtonState,
}

impl<'a, I: InputLines> InputMonitor<'a, I> {
    pub fn new(ctx: &'a Context, inputs: I, bindings: InputBindings) -> Self {
        Self {
            ctx,
            inputs,
            bindings,
            debouncers: [Debouncer::new(); INPUT_COUNT],
            buttons: ButtonState::new(),
        }
    }

    /// Latest debounced button state
    pub fn buttons(&self) -> ButtonState {
        self.buttons
    }

    /// One poll of every input at time `now`
    pub fn poll(&mut self, now: Instant) -> heapless::Vec<Dispatch, INPUT_COUNT> {
        let settle = self.ctx.timing.debounce;
        let mut dispatched = heapless::Vec::new();
        let mut confirmed = [false; INPUT_COUNT];
        self.buttons.changed = false;

        for input in 0..INPUT_COUNT {
            let level = self.inputs.read(input);
            match self.debouncers[input].update(level, now, settle) {
                Some(Edge::Pressed) => {
                    debug!("Switch {} pressed", input);
                    self.buttons.set_button(input, true);
                    confirmed[input] = true;
                }
                Some(Edge::Released) => {
                    debug!("Switch {} released", input);
                    self.buttons.set_button(input, false);
                }
                None => {}
            }
        }

        // Both members held, at least one new this poll: the combo replaces their own actions
        if let Some(combo) = self.bindings.combo {
            let members = combo.members();
            let held = members.iter().all(|&m| self.debouncers[m].is_pressed());
            if held && members.iter().any(|&m| confirmed[m]) {
                info!("Switches {} + {} held together", combo.first, combo.second);
                // One dispatch per input, capacity always suffices
                let _ = dispatched.push(self.wake(combo.task));
                for m in members {
                    confirmed[m] = false;
                }
            }
        }

        for input in (0..INPUT_COUNT).filter(|&i| confirmed[i]) {
            if let Some(dispatch) = self.on_press(input, now) {
                let _ = dispatched.push(dispatch);
            }
        }

        if self.buttons.changed {
            self.ctx.buttons.signal(self.buttons);
        }
        dispatched
    }

    fn on_press(&self, input: usize, now: Instant) -> Option<Dispatch> {
        let state = &self.ctx.state;
        match self.bindings.actions[input] {
            InputAction::None => None,
            InputAction::Wake(task) => Some(self.wake(task)),
            InputAction::Transfer { from, to, step } => {
                let levels = state.transfer(from, to, step);
                Some(self.brightness_changed(levels))
            }
            InputAction::Adjust { group, delta } => {
                let levels = state.adjust(group, delta);
                Some(self.brightness_changed(levels))
            }
            InputAction::AdjustAll { delta } => {
                let levels = state.adjust_all(delta);
                Some(self.brightness_changed(levels))
            }
            InputAction::DoubleClick(task) => {
                if state.register_click(input, now, self.ctx.timing.double_click_timeout) {
                    info!("Double-click on switch {}", input);
                    Some(self.wake(task))
                } else {
                    Some(Dispatch::Click { input })
                }
            }
        }
    }

    fn wake(&self, task: TaskId) -> Dispatch {
        let woke = self.ctx.tasks.resume_if_idle(task);
        Dispatch::Wake { task, woke }
    }

    fn brightness_changed(&self, levels: Levels) -> Dispatch {
        debug!("Brightness {:?}", levels);
        // Level-bar rendering sleeps until woken; PWM never sleeps
        self.ctx.tasks.resume_if_idle(TaskId::BrightnessRenderer);
        Dispatch::Brightness(levels)
    }

    /// Task body: poll forever
    pub async fn run(mut self) -> ! {
        info!("Input monitor started with {} switches", INPUT_COUNT);
        loop {
            self.poll(Instant::now());
            Timer::after(self.ctx.timing.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timing;
    use crate::state::SharedState;
    use crate::tasks::TaskPhase;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct Switches {
        levels: [SwitchLevel; INPUT_COUNT],
    }

    impl Switches {
        fn open() -> Self {
            Self {
                levels: [SwitchLevel::Released; INPUT_COUNT],
            }
        }
    }

    impl InputLines for &mut Switches {
        fn read(&mut self, line: usize) -> SwitchLevel {
            self.levels[line]
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn press(monitor: &mut InputMonitor<'_, &mut Switches>, input: usize, t: u64) -> heapless::Vec<Dispatch, INPUT_COUNT> {
        monitor.inputs.levels[input] = SwitchLevel::Pressed;
        assert!(monitor.poll(at(t)).is_empty());
        let confirmed = monitor.poll(at(t + 50));
        monitor.inputs.levels[input] = SwitchLevel::Released;
        monitor.poll(at(t + 60));
        confirmed
    }

    fn context(state: SharedState) -> Context {
        Context::new(state, Timing::new())
    }

    #[test]
    fn bounce_counts_as_one_press() {
        let settle = Duration::from_millis(50);
        let mut debouncer = Debouncer::new();

        assert_eq!(debouncer.update(SwitchLevel::Pressed, at(0), settle), None);
        assert_eq!(debouncer.update(SwitchLevel::Released, at(5), settle), None);
        assert_eq!(debouncer.update(SwitchLevel::Pressed, at(10), settle), None);
        // 50 ms after the first edge but only 45 after the bounce
        assert_eq!(debouncer.update(SwitchLevel::Pressed, at(55), settle), None);
        assert_eq!(debouncer.update(SwitchLevel::Pressed, at(60), settle), Some(Edge::Pressed));
        assert_eq!(debouncer.update(SwitchLevel::Pressed, at(200), settle), None);
        assert_eq!(debouncer.update(SwitchLevel::Released, at(210), settle), Some(Edge::Released));
    }

    #[test]
    fn active_low_pins_are_normalized() {
        struct Line(bool);
        impl ErrorType for Line {
            type Error = Infallible;
        }
        impl InputPin for Line {
            fn is_high(&mut self) -> Result<bool, Infallible> {
                Ok(self.0)
            }
            fn is_low(&mut self) -> Result<bool, Infallible> {
                Ok(!self.0)
            }
        }

        let mut inputs = PinInputs::new([Line(true), Line(false)]);
        assert_eq!(inputs.read(0), SwitchLevel::Released);
        assert_eq!(inputs.read(1), SwitchLevel::Pressed);
    }

    #[test]
    fn transfer_clamps_at_the_end_of_the_scale() {
        let ctx = context(SharedState::with_scale(10, 5));
        let mut switches = Switches::open();
        let bindings = InputBindings::new([
            InputAction::Transfer { from: 0, to: 2, step: 1 },
            InputAction::None,
            InputAction::None,
            InputAction::None,
        ]);
        let mut monitor = InputMonitor::new(&ctx, &mut switches, bindings);

        for i in 0..6 {
            press(&mut monitor, 0, i * 100);
        }
        assert_eq!(ctx.state.levels(), [0, 5, 10]);
    }

    #[test]
    fn double_click_wakes_on_second_press_in_time() {
        let ctx = context(SharedState::new());
        ctx.tasks.mark_spawned(TaskId::AllOn, false);
        let mut switches = Switches::open();
        let bindings = InputBindings::new([
            InputAction::DoubleClick(TaskId::AllOn),
            InputAction::None,
            InputAction::None,
            InputAction::None,
        ]);
        let mut monitor = InputMonitor::new(&ctx, &mut switches, bindings);

        assert_eq!(press(&mut monitor, 0, 0)[..], [Dispatch::Click { input: 0 }]);
        assert_eq!(
            press(&mut monitor, 0, 250)[..],
            [Dispatch::Wake {
                task: TaskId::AllOn,
                woke: true
            }]
        );
        assert_eq!(ctx.state.click_counter(0).count, 0);
    }

    #[test]
    fn slow_second_press_starts_new_window() {
        let ctx = context(SharedState::new());
        ctx.tasks.mark_spawned(TaskId::AllOff, false);
        let mut switches = Switches::open();
        let bindings = InputBindings::new([
            InputAction::None,
            InputAction::DoubleClick(TaskId::AllOff),
            InputAction::None,
            InputAction::None,
        ]);
        let mut monitor = InputMonitor::new(&ctx, &mut switches, bindings);

        press(&mut monitor, 1, 0);
        assert_eq!(press(&mut monitor, 1, 400)[..], [Dispatch::Click { input: 1 }]);
        assert_eq!(ctx.state.click_counter(1).count, 1);
        assert_eq!(ctx.tasks.phase(TaskId::AllOff), TaskPhase::Idle);
    }

    #[test]
    fn wake_of_absent_task_is_dropped() {
        let ctx = context(SharedState::new());
        let mut switches = Switches::open();
        let bindings = InputBindings::new([
            InputAction::Wake(TaskId::SweepLeft),
            InputAction::None,
            InputAction::None,
            InputAction::None,
        ]);
        let mut monitor = InputMonitor::new(&ctx, &mut switches, bindings);

        assert_eq!(
            press(&mut monitor, 0, 0)[..],
            [Dispatch::Wake {
                task: TaskId::SweepLeft,
                woke: false
            }]
        );
    }

    #[test]
    fn held_pair_triggers_combo_task() {
        let ctx = context(SharedState::new());
        for id in [TaskId::SweepLeft, TaskId::SweepRight, TaskId::BidirectionalSweep] {
            ctx.tasks.mark_spawned(id, false);
        }
        let mut switches = Switches::open();
        let bindings = InputBindings::new([
            InputAction::Wake(TaskId::SweepLeft),
            InputAction::Wake(TaskId::SweepRight),
            InputAction::None,
            InputAction::None,
        ])
        .with_combo(0, 1, TaskId::BidirectionalSweep);
        let mut monitor = InputMonitor::new(&ctx, &mut switches, bindings);

        monitor.inputs.levels[0] = SwitchLevel::Pressed;
        monitor.poll(at(0));
        monitor.poll(at(50));
        monitor.inputs.levels[1] = SwitchLevel::Pressed;
        monitor.poll(at(60));
        let dispatched = monitor.poll(at(110));

        assert_eq!(
            dispatched[..],
            [Dispatch::Wake {
                task: TaskId::BidirectionalSweep,
                woke: true
            }]
        );
        // Switch 1's own binding was not used
        assert_eq!(ctx.tasks.phase(TaskId::SweepRight), TaskPhase::Idle);
    }

    #[test]
    fn pair_confirmed_in_one_poll_fires_only_the_combo() {
        let ctx = context(SharedState::new());
        for id in [TaskId::SweepLeft, TaskId::SweepRight, TaskId::BidirectionalSweep] {
            ctx.tasks.mark_spawned(id, false);
        }
        let mut switches = Switches::open();
        let bindings = InputBindings::new([
            InputAction::Wake(TaskId::SweepLeft),
            InputAction::Wake(TaskId::SweepRight),
            InputAction::None,
            InputAction::None,
        ])
        .with_combo(0, 1, TaskId::BidirectionalSweep);
        let mut monitor = InputMonitor::new(&ctx, &mut switches, bindings);

        monitor.inputs.levels[0] = SwitchLevel::Pressed;
        monitor.inputs.levels[1] = SwitchLevel::Pressed;
        assert!(monitor.poll(at(0)).is_empty());
        let dispatched = monitor.poll(at(50));

        assert_eq!(
            dispatched[..],
            [Dispatch::Wake {
                task: TaskId::BidirectionalSweep,
                woke: true
            }]
        );

        // Still held: no repeat
        assert!(monitor.poll(at(100)).is_empty());
    }

    #[test]
    fn combo_member_alone_keeps_its_binding() {
        let ctx = context(SharedState::new());
        ctx.tasks.mark_spawned(TaskId::SweepRight, false);
        let mut switches = Switches::open();
        let bindings = InputBindings::new([
            InputAction::Wake(TaskId::SweepLeft),
            InputAction::Wake(TaskId::SweepRight),
            InputAction::None,
            InputAction::None,
        ])
        .with_combo(0, 1, TaskId::BidirectionalSweep);
        let mut monitor = InputMonitor::new(&ctx, &mut switches, bindings);

        assert_eq!(
            press(&mut monitor, 1, 0)[..],
            [Dispatch::Wake {
                task: TaskId::SweepRight,
                woke: true
            }]
        );
    }

    #[test]
    fn state_changes_are_published() {
        let ctx = context(SharedState::new());
        let mut switches = Switches::open();
        let mut monitor = InputMonitor::new(&ctx, &mut switches, InputBindings::new([InputAction::None; INPUT_COUNT]));

        monitor.inputs.levels[2] = SwitchLevel::Pressed;
        monitor.poll(at(0));
        assert!(!ctx.buttons.signaled());
        monitor.poll(at(50));

        let published = ctx.buttons.try_take().expect("state published");
        assert!(published.is_pressed(2));
        assert!(published.changed);
    }
}
