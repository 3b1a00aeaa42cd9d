//! Controller profiles
//!
//! A profile fixes which tasks exist, what each switch does and how the
//! brightness state is used. Every firmware binary selects one profile at
//! compile time; the spawn code and the banner only see `ProfileConfig`.

use crate::animation::{
    Animation, BankMirror, BidirectionalSweep, BlinkStyle, Blinker, BrightnessRenderer, Fill, RenderMode, Sweep,
    SweepWindow,
};
use crate::buttons::{InputAction, InputBindings};
use crate::config::{
    Timing, BLINK_PERIOD_MS, BRIGHTNESS_STEP, INPUT_COUNT, SLOW_SWEEP_STEP_MS, SWEEP_STEP_MS, TOGGLE_BLINK_PERIOD_MS,
};
use crate::registry::BankId;
use crate::tasks::TaskId;
use crate::types::SweepDirection;

/// How a task is driven once spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRole {
    /// Animation drawing on one bank
    Animate { bank: BankId, animation: Animation },
    /// Switch polling and dispatch
    Monitor,
    /// USB serial command link
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPlan {
    pub id: TaskId,
    pub role: TaskRole,
}

impl TaskPlan {
    const fn animate(id: TaskId, bank: BankId, animation: Animation) -> Self {
        Self {
            id,
            role: TaskRole::Animate { bank, animation },
        }
    }

    const fn monitor() -> Self {
        Self {
            id: TaskId::InputMonitor,
            role: TaskRole::Monitor,
        }
    }

    const fn link() -> Self {
        Self {
            id: TaskId::SerialLink,
            role: TaskRole::Link,
        }
    }

    /// Free-running tasks start in `FreeRunning`, the rest start `Idle`
    pub fn is_free_running(&self) -> bool {
        match self.role {
            TaskRole::Animate { animation, .. } => animation.is_free_running(),
            TaskRole::Monitor | TaskRole::Link => true,
        }
    }
}

/// How brightness levels move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrightnessScheme {
    /// Unused by the profile
    None,
    /// Paired transfer, one group's gain is the other's loss
    Paired,
    /// Clamped increments per group
    Independent,
}

/// Complete controller configuration
pub trait ProfileConfig {
    /// Name shown in the startup banner
    fn name(&self) -> &'static str;

    /// Every task the profile spawns, in spawn order
    fn tasks(&self) -> &'static [TaskPlan];

    fn bindings(&self) -> InputBindings;

    fn timing(&self) -> Timing;

    fn brightness_scheme(&self) -> BrightnessScheme;

    fn has_task(&self, id: TaskId) -> bool {
        self.tasks().iter().any(|plan| plan.id == id)
    }

    fn plan(&self, id: TaskId) -> Option<TaskPlan> {
        self.tasks().iter().copied().find(|plan| plan.id == id)
    }
}

const STEP: i16 = BRIGHTNESS_STEP as i16;

const CYCLE_BLINK: TaskPlan =
    TaskPlan::animate(TaskId::Blinker, BankId::Blink, Animation::Blink(Blinker::new(BlinkStyle::Cycle)));

static BRIGHTNESS_TASKS: [TaskPlan; 5] = [
    TaskPlan::animate(TaskId::Blinker, BankId::Blink, Animation::Blink(Blinker::new(BlinkStyle::Toggle))),
    TaskPlan::animate(
        TaskId::SweepLeft,
        BankId::Sweep,
        Animation::Sweep(Sweep::new(SweepDirection::LeftToRight, SweepWindow::Overlap)),
    ),
    TaskPlan::animate(
        TaskId::SweepRight,
        BankId::Sweep,
        Animation::Sweep(Sweep::new(SweepDirection::RightToLeft, SweepWindow::Overlap)),
    ),
    TaskPlan::animate(
        TaskId::BrightnessRenderer,
        BankId::Rgb,
        Animation::Brightness(BrightnessRenderer::new(RenderMode::Pwm)),
    ),
    TaskPlan::monitor(),
];

static DIMMER_TASKS: [TaskPlan; 3] = [
    CYCLE_BLINK,
    TaskPlan::animate(
        TaskId::BrightnessRenderer,
        BankId::Rgb,
        Animation::Brightness(BrightnessRenderer::new(RenderMode::LevelBar)),
    ),
    TaskPlan::monitor(),
];

static DOUBLE_CLICK_TASKS: [TaskPlan; 4] = [
    CYCLE_BLINK,
    TaskPlan::animate(TaskId::AllOn, BankId::Sweep, Animation::Fill(Fill::new(true))),
    TaskPlan::animate(TaskId::AllOff, BankId::Sweep, Animation::Fill(Fill::new(false))),
    TaskPlan::monitor(),
];

static SNAKES_TASKS: [TaskPlan; 5] = [
    CYCLE_BLINK,
    TaskPlan::animate(
        TaskId::SweepLeft,
        BankId::Sweep,
        Animation::Sweep(Sweep::new(SweepDirection::LeftToRight, SweepWindow::Single)),
    ),
    TaskPlan::animate(
        TaskId::SweepRight,
        BankId::Sweep,
        Animation::Sweep(Sweep::new(SweepDirection::RightToLeft, SweepWindow::Single)),
    ),
    TaskPlan::animate(
        TaskId::BidirectionalSweep,
        BankId::Sweep,
        Animation::Bidirectional(BidirectionalSweep::new(SweepWindow::Single)),
    ),
    TaskPlan::monitor(),
];

static SERIAL_BRIDGE_TASKS: [TaskPlan; 4] = [
    CYCLE_BLINK,
    TaskPlan::animate(TaskId::BankMirror, BankId::Sweep, Animation::Mirror(BankMirror)),
    TaskPlan::monitor(),
    TaskPlan::link(),
];

/// Enum-based profile selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    Brightness,
    Dimmer,
    DoubleClick,
    Snakes,
    SerialBridge,
}

impl Profile {
    pub const ALL: [Profile; 5] = [
        Profile::Brightness,
        Profile::Dimmer,
        Profile::DoubleClick,
        Profile::Snakes,
        Profile::SerialBridge,
    ];
}

impl ProfileConfig for Profile {
    fn name(&self) -> &'static str {
        match self {
            Profile::Brightness => "brightness",
            Profile::Dimmer => "dimmer",
            Profile::DoubleClick => "double-click",
            Profile::Snakes => "snakes",
            Profile::SerialBridge => "serial-bridge",
        }
    }

    fn tasks(&self) -> &'static [TaskPlan] {
        match self {
            Profile::Brightness => &BRIGHTNESS_TASKS,
            Profile::Dimmer => &DIMMER_TASKS,
            Profile::DoubleClick => &DOUBLE_CLICK_TASKS,
            Profile::Snakes => &SNAKES_TASKS,
            Profile::SerialBridge => &SERIAL_BRIDGE_TASKS,
        }
    }

    fn bindings(&self) -> InputBindings {
        match self {
            Profile::Brightness => InputBindings::new([
                InputAction::Transfer {
                    from: 0,
                    to: 2,
                    step: BRIGHTNESS_STEP,
                },
                InputAction::Transfer {
                    from: 2,
                    to: 0,
                    step: BRIGHTNESS_STEP,
                },
                InputAction::Wake(TaskId::SweepLeft),
                InputAction::Wake(TaskId::SweepRight),
            ]),
            Profile::Dimmer => InputBindings::new([
                InputAction::Adjust { group: 0, delta: STEP },
                InputAction::Adjust { group: 1, delta: STEP },
                InputAction::Adjust { group: 2, delta: STEP },
                InputAction::AdjustAll { delta: -STEP },
            ]),
            Profile::DoubleClick => InputBindings::new([
                InputAction::DoubleClick(TaskId::AllOn),
                InputAction::DoubleClick(TaskId::AllOff),
                InputAction::None,
                InputAction::None,
            ]),
            Profile::Snakes => InputBindings::new([
                InputAction::Wake(TaskId::SweepLeft),
                InputAction::Wake(TaskId::SweepRight),
                InputAction::Wake(TaskId::BidirectionalSweep),
                InputAction::None,
            ])
            .with_combo(0, 1, TaskId::BidirectionalSweep),
            // Switches are only reported over the link
            Profile::SerialBridge => InputBindings::new([InputAction::None; INPUT_COUNT]),
        }
    }

    fn timing(&self) -> Timing {
        match self {
            Profile::Brightness => Timing::new()
                .with_blink_period(TOGGLE_BLINK_PERIOD_MS)
                .with_sweep_step(SWEEP_STEP_MS),
            Profile::Snakes => Timing::new()
                .with_blink_period(BLINK_PERIOD_MS)
                .with_sweep_step(SLOW_SWEEP_STEP_MS),
            Profile::Dimmer | Profile::DoubleClick | Profile::SerialBridge => Timing::new(),
        }
    }

    fn brightness_scheme(&self) -> BrightnessScheme {
        match self {
            Profile::Brightness => BrightnessScheme::Paired,
            Profile::Dimmer => BrightnessScheme::Independent,
            Profile::DoubleClick | Profile::Snakes | Profile::SerialBridge => BrightnessScheme::None,
        }
    }
}
