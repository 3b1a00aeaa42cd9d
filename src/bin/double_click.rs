//! ledswitch - Double-click firmware
//!
//! - double-click switch 1 to light the whole strip
//! - double-click switch 2 to clear it

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use panic_halt as _;
use defmt_rtt as _;
use static_cell::StaticCell;

use ledswitch::context::Context;
use ledswitch::profile::{Profile, ProfileConfig};
use ledswitch::state::SharedState;
use ledswitch::*;

// Set compile-time profile selection
const PROFILE: Profile = Profile::DoubleClick;

static CONTEXT: StaticCell<Context> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    let ctx: &'static Context = CONTEXT.init(Context::new(SharedState::new(), PROFILE.timing()));

    let mut supervisor = supervisor::AppSupervisor::new(PROFILE, ctx);
    supervisor.print_startup_banner();

    let failed = hardware::spawn_controller(&spawner, p, ctx, &PROFILE);
    info!("{} tasks planned", PROFILE.tasks().len());
    supervisor.print_init_success(failed);

    supervisor.run().await;
}
