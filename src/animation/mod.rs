//! Animation tasks
//!
//! Each visual effect is one variant of `Animation`. An `AnimationTask`
//! wraps a variant with its task slot and its bank:
//!
//! - interlock-driven effects (sweeps, fills, level bar) sit in `Idle`
//!   until the input monitor resumes them, render one cycle, then suspend;
//!   the level bar draws the boot levels once before its first suspend
//! - free-running effects (blink, PWM, bank mirror) loop forever and only
//!   give up the processor through their fixed delays
//!
//! The bank is held for the whole cycle, so two effects sharing a bank
//! never interleave their writes.

pub mod blink;
pub mod brightness;
pub mod fill;
pub mod sweep;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;

use crate::context::Context;
use crate::registry::OutputBank;
use crate::tasks::TaskId;

pub use blink::{BlinkStyle, Blinker};
pub use brightness::{level_bar, on_time, pwm_schedule, BrightnessRenderer, RenderMode};
pub use fill::{BankMirror, Fill};
pub use sweep::{walk, BidirectionalSweep, Sweep, SweepWindow};

/// What a single cycle did to its bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Rendered,
    /// The sweep interlock refused to move the head
    Skipped,
}

/// Every effect the controller can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    Blink(Blinker),
    Sweep(Sweep),
    Bidirectional(BidirectionalSweep),
    Fill(Fill),
    Brightness(BrightnessRenderer),
    Mirror(BankMirror),
}

impl Animation {
    /// Free-running effects never suspend themselves
    pub fn is_free_running(&self) -> bool {
        match self {
            Animation::Blink(_) | Animation::Mirror(_) => true,
            Animation::Brightness(renderer) => renderer.mode == RenderMode::Pwm,
            Animation::Sweep(_) | Animation::Bidirectional(_) | Animation::Fill(_) => false,
        }
    }

    /// Effects that show shared state draw it once at boot, before the first suspend
    pub fn renders_on_start(&self) -> bool {
        matches!(self, Animation::Brightness(renderer) if renderer.mode == RenderMode::LevelBar)
    }

    /// Run one full cycle of the effect against `bank`
    pub async fn run_cycle<B: OutputBank>(&mut self, ctx: &Context, bank: &mut B) -> Outcome {
        let timing = &ctx.timing;
        match self {
            Animation::Blink(blinker) => blinker.run_cycle(bank, timing.blink_period).await,
            Animation::Sweep(sweep) => sweep.run_cycle(&ctx.state, bank, timing.sweep_step).await,
            Animation::Bidirectional(sweep) => sweep.run_cycle(&ctx.state, bank, timing.sweep_step).await,
            Animation::Fill(fill) => fill.run_cycle(bank),
            Animation::Brightness(renderer) => renderer.run_cycle(&ctx.state, bank, timing.pwm_period).await,
            Animation::Mirror(mirror) => mirror.run_cycle(&ctx.state, bank, timing.mirror_refresh).await,
        }
    }
}

/// One scheduled animation: effect + slot + bank
pub struct AnimationTask<'a, M: RawMutex, B: OutputBank> {
    id: TaskId,
    animation: Animation,
    ctx: &'a Context,
    bank: &'a Mutex<M, B>,
    /// Next cycle runs without waiting for a resume
    render_pending: bool,
}

impl<'a, M: RawMutex, B: OutputBank> AnimationTask<'a, M, B> {
    pub fn new(id: TaskId, animation: Animation, ctx: &'a Context, bank: &'a Mutex<M, B>) -> Self {
        Self {
            id,
            animation,
            ctx,
            bank,
            render_pending: animation.renders_on_start(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Wait for a resume if needed, then render one cycle
    pub async fn step(&mut self) -> Outcome {
        let free_running = self.animation.is_free_running();
        if self.render_pending {
            self.render_pending = false;
            debug!("Task '{}' drawing initial state", self.id.name());
        } else if !free_running {
            self.ctx.tasks.slot(self.id).suspend_self().await;
            debug!("Task '{}' resumed", self.id.name());
        }

        let outcome = {
            let mut bank = self.bank.lock().await;
            self.animation.run_cycle(self.ctx, &mut *bank).await
        };

        if free_running {
            // Let anything queued on the bank in before the next cycle
            embassy_futures::yield_now().await;
        }
        outcome
    }

    /// Task body: cycle until power-off
    pub async fn run(mut self) -> ! {
        info!("Task '{}' started", self.id.name());
        loop {
            self.step().await;
        }
    }
}
