//! Task control: identities, suspend/resume and handle lookup
//!
//! Every task owns a slot in the `TaskRegistry`. A slot pairs a latched
//! wake signal with an atomic phase. `suspend_self` parks the calling task
//! until another task calls `resume`; a resume against a task that was
//! never spawned is silently dropped.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU8, Ordering};

/// Every task the controller knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskId {
    Blinker,
    SweepLeft,
    SweepRight,
    BidirectionalSweep,
    AllOn,
    AllOff,
    BrightnessRenderer,
    BankMirror,
    InputMonitor,
    SerialLink,
}

impl TaskId {
    pub const COUNT: usize = 10;

    pub const ALL: [TaskId; TaskId::COUNT] = [
        TaskId::Blinker,
        TaskId::SweepLeft,
        TaskId::SweepRight,
        TaskId::BidirectionalSweep,
        TaskId::AllOn,
        TaskId::AllOff,
        TaskId::BrightnessRenderer,
        TaskId::BankMirror,
        TaskId::InputMonitor,
        TaskId::SerialLink,
    ];

    /// Task name used for lookups and log lines
    pub const fn name(self) -> &'static str {
        match self {
            TaskId::Blinker => "led_blink",
            TaskId::SweepLeft => "led_snake_l",
            TaskId::SweepRight => "led_snake_r",
            TaskId::BidirectionalSweep => "led_snake_back",
            TaskId::AllOn => "all_on",
            TaskId::AllOff => "all_off",
            TaskId::BrightnessRenderer => "led_brightness",
            TaskId::BankMirror => "set_onoff",
            TaskId::InputMonitor => "switches",
            TaskId::SerialLink => "serial_link",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        TaskId::ALL.into_iter().find(|id| id.name() == name)
    }

    /// Whether this task draws on the shared sweep bank
    pub const fn uses_sweep_bank(self) -> bool {
        matches!(
            self,
            TaskId::SweepLeft
                | TaskId::SweepRight
                | TaskId::BidirectionalSweep
                | TaskId::AllOn
                | TaskId::AllOff
                | TaskId::BankMirror
        )
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Scheduling phase of one task, doubling as its enable flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskPhase {
    /// Never spawned, or spawning failed
    Absent = 0,
    /// Suspended, waiting for a resume
    Idle = 1,
    /// Woken and working through a cycle
    Rendering = 2,
    /// Loops forever without suspending
    FreeRunning = 3,
}

impl TaskPhase {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => TaskPhase::Absent,
            1 => TaskPhase::Idle,
            2 => TaskPhase::Rendering,
            3 => TaskPhase::FreeRunning,
            other => panic!("impossible task phase {}", other),
        }
    }
}

pub struct TaskSlot {
    wake: Signal<CriticalSectionRawMutex, ()>,
    phase: AtomicU8,
}

impl TaskSlot {
    pub const fn new() -> Self {
        Self {
            wake: Signal::new(),
            phase: AtomicU8::new(TaskPhase::Absent as u8),
        }
    }

    pub fn phase(&self) -> TaskPhase {
        TaskPhase::from_raw(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: TaskPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    pub fn is_present(&self) -> bool {
        self.phase() != TaskPhase::Absent
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == TaskPhase::Idle
    }

    /// Park the calling task until resumed
    pub async fn suspend_self(&self) {
        self.set_phase(TaskPhase::Idle);
        self.wake.wait().await;
        self.set_phase(TaskPhase::Rendering);
    }

    /// Wake the task. Returns false (and does nothing) if it does not exist.
    ///
    /// The wake is latched: a resume that lands while the task is still
    /// finishing its cycle is consumed by its next `suspend_self`.
    pub fn resume(&self) -> bool {
        if !self.is_present() {
            return false;
        }
        self.wake.signal(());
        true
    }
}

impl Default for TaskSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// All task slots, indexed by `TaskId`
pub struct TaskRegistry {
    slots: [TaskSlot; TaskId::COUNT],
}

impl TaskRegistry {
    pub const fn new() -> Self {
        const VACANT: TaskSlot = TaskSlot::new();
        Self {
            slots: [VACANT; TaskId::COUNT],
        }
    }

    pub fn slot(&self, id: TaskId) -> &TaskSlot {
        &self.slots[id.index()]
    }

    /// Record a successful spawn. Interlock-driven tasks start idle.
    pub fn mark_spawned(&self, id: TaskId, free_running: bool) {
        let phase = if free_running { TaskPhase::FreeRunning } else { TaskPhase::Idle };
        self.slot(id).set_phase(phase);
    }

    /// Handle lookup by task name; `None` for unknown or never-spawned tasks
    pub fn lookup(&self, name: &str) -> Option<TaskId> {
        TaskId::from_name(name).filter(|&id| self.slot(id).is_present())
    }

    pub fn phase(&self, id: TaskId) -> TaskPhase {
        self.slot(id).phase()
    }

    pub fn resume(&self, id: TaskId) -> bool {
        let resumed = self.slot(id).resume();
        if !resumed {
            debug!("Resume of absent task '{}' ignored", id.name());
        }
        resumed
    }

    /// Resume only a task that is currently suspended
    pub fn resume_if_idle(&self, id: TaskId) -> bool {
        let slot = self.slot(id);
        if !slot.is_idle() {
            debug!("Task '{}' not idle ({:?}), resume skipped", id.name(), slot.phase());
            return false;
        }
        slot.resume()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
