//! Application supervisor and monitoring
//!
//! Prints the startup banner, then keeps an uptime count and logs a
//! periodic health line: task phases, sweep cursor and brightness.

use embassy_time::{Duration, Timer};

use crate::config::SUPERVISOR_TICK_SECS;
use crate::context::Context;
use crate::profile::{Profile, ProfileConfig, TaskRole};
use crate::registry::{channels, BankId};
use crate::tasks::{TaskId, TaskPhase};
use crate::types::APP_VERSION;

const STATUS_INTERVAL_SECS: u32 = 60;

/// Application supervisor responsible for monitoring and lifecycle management
pub struct AppSupervisor<'a> {
    profile: Profile,
    ctx: &'a Context,
    uptime_seconds: u32,
    last_heartbeat: u32,
}

impl<'a> AppSupervisor<'a> {
    pub fn new(profile: Profile, ctx: &'a Context) -> Self {
        Self {
            profile,
            ctx,
            uptime_seconds: 0,
            last_heartbeat: 0,
        }
    }

    /// Print application startup banner with profile information
    pub fn print_startup_banner(&self) {
        let profile = self.profile;
        let timing = &self.ctx.timing;

        info!("========================================");
        info!("ledswitch v{}", APP_VERSION);
        info!("========================================");
        info!("Hardware: RP2040 (Raspberry Pi Pico)");
        info!("Profile: {}", profile.name());
        info!("Brightness: {:?}, max {}", profile.brightness_scheme(), self.ctx.state.max_brightness());
        info!(
            "Timing: blink {}ms, sweep step {}ms, debounce {}ms",
            timing.blink_period.as_millis(),
            timing.sweep_step.as_millis(),
            timing.debounce.as_millis()
        );
        for bank in BankId::ALL {
            for ch in channels(bank) {
                debug!("Channel {:?} -> GPIO {}", ch.group, ch.id);
            }
        }
        for plan in profile.tasks() {
            match plan.role {
                TaskRole::Animate { bank, .. } => info!("Task: {} on {:?} bank", plan.id.name(), bank),
                TaskRole::Monitor | TaskRole::Link => info!("Task: {}", plan.id.name()),
            }
        }
        info!("========================================");
    }

    /// Print the spawn summary
    pub fn print_init_success(&self, failed: usize) {
        if failed == 0 {
            info!("ledswitch initialized successfully");
        } else {
            warn!("ledswitch running degraded, {} task(s) missing", failed);
        }
    }

    /// Advance the uptime by one tick; true when a status line is due
    fn tick(&mut self) -> bool {
        self.uptime_seconds += SUPERVISOR_TICK_SECS as u32;
        if self.uptime_seconds - self.last_heartbeat >= STATUS_INTERVAL_SECS {
            self.last_heartbeat = self.uptime_seconds;
            return true;
        }
        false
    }

    /// Run the main supervisor loop
    pub async fn run(&mut self) -> ! {
        info!("Application supervisor started");

        loop {
            Timer::after(Duration::from_secs(SUPERVISOR_TICK_SECS)).await;
            if self.tick() {
                self.print_status();
            }
        }
    }

    /// Number of planned tasks that are currently present
    pub fn live_tasks(&self) -> usize {
        TaskId::ALL
            .iter()
            .filter(|&&id| self.profile.has_task(id) && self.ctx.tasks.phase(id) != TaskPhase::Absent)
            .count()
    }

    fn print_status(&self) {
        let minutes = self.uptime_seconds / 60;
        let hours = minutes / 60;
        let remaining_minutes = minutes % 60;

        if hours > 0 {
            info!("Status: Uptime {}h{}m", hours, remaining_minutes);
        } else {
            info!("Status: Uptime {}m", minutes);
        }

        let state = &self.ctx.state;
        info!(
            "Status: {}/{} tasks, cursor {:?}, levels {:?}, link mask {=u8:#x}",
            self.live_tasks(),
            self.profile.tasks().len(),
            state.cursor(),
            state.levels(),
            state.link_mask()
        );
    }

    /// Get current uptime in seconds
    pub fn uptime(&self) -> u32 {
        self.uptime_seconds
    }
}
