//! Controller context
//!
//! The one object every task receives at spawn time: shared state, task
//! registry, timing and the latest debounced button snapshot.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::config::Timing;
use crate::state::SharedState;
use crate::tasks::TaskRegistry;
use crate::types::ButtonState;

pub struct Context {
    pub state: SharedState,
    pub tasks: TaskRegistry,
    pub timing: Timing,
    /// Latest debounced button state, published on every change
    pub buttons: Signal<CriticalSectionRawMutex, ButtonState>,
}

impl Context {
    pub const fn new(state: SharedState, timing: Timing) -> Self {
        Self {
            state,
            tasks: TaskRegistry::new(),
            timing,
            buttons: Signal::new(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(SharedState::new(), Timing::new())
    }
}
