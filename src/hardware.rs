//! Hardware bring-up and task spawning
//!
//! Claims the board pins listed in `config`, wraps them in banks and
//! spawns every task the profile plans. A task that fails to spawn is
//! logged and left absent; the rest of the controller keeps running
//! without it.

use embassy_executor::{SpawnError, Spawner};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::usb::Driver;
use embassy_rp::{peripherals, Peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;

use crate::animation::AnimationTask;
use crate::buttons::{InputMonitor, PinInputs};
use crate::config::{BLINK_BANK_LEN, INPUT_COUNT, RGB_BANK_LEN, SWEEP_BANK_LEN};
use crate::context::Context;
use crate::profile::{ProfileConfig, TaskPlan, TaskRole};
use crate::registry::{BankId, PinBank};
use crate::usb::serial_link_task;

pub type BlinkBank = PinBank<Output<'static>, BLINK_BANK_LEN>;
pub type SweepBank = PinBank<Output<'static>, SWEEP_BANK_LEN>;
pub type RgbBank = PinBank<Output<'static>, RGB_BANK_LEN>;
pub type SwitchInputs = PinInputs<Input<'static>, INPUT_COUNT>;

type SharedBank<B> = Mutex<CriticalSectionRawMutex, B>;
type BankTask<B> = AnimationTask<'static, CriticalSectionRawMutex, B>;

static BLINK_BANK: StaticCell<SharedBank<BlinkBank>> = StaticCell::new();
static SWEEP_BANK: StaticCell<SharedBank<SweepBank>> = StaticCell::new();
static RGB_BANK: StaticCell<SharedBank<RgbBank>> = StaticCell::new();

// ===================================================================
// Board
// ===================================================================

/// Every pin the controller drives, claimed once at startup
struct Board {
    blink: &'static SharedBank<BlinkBank>,
    sweep: &'static SharedBank<SweepBank>,
    rgb: &'static SharedBank<RgbBank>,
    switches: Option<SwitchInputs>,
    usb: Option<Driver<'static, peripherals::USB>>,
}

impl Board {
    /// Pin numbers match `config::{BLINK,SWEEP,RGB,SWITCH}_PINS`
    fn new(p: Peripherals) -> Self {
        let blink = PinBank::new([Output::new(p.PIN_25, Level::Low), Output::new(p.PIN_15, Level::Low)]);
        let sweep = PinBank::new([
            Output::new(p.PIN_2, Level::Low),
            Output::new(p.PIN_3, Level::Low),
            Output::new(p.PIN_4, Level::Low),
            Output::new(p.PIN_5, Level::Low),
            Output::new(p.PIN_6, Level::Low),
            Output::new(p.PIN_7, Level::Low),
            Output::new(p.PIN_8, Level::Low),
            Output::new(p.PIN_9, Level::Low),
        ]);
        let rgb = PinBank::new([
            Output::new(p.PIN_10, Level::Low),
            Output::new(p.PIN_11, Level::Low),
            Output::new(p.PIN_12, Level::Low),
            Output::new(p.PIN_13, Level::Low),
            Output::new(p.PIN_14, Level::Low),
            Output::new(p.PIN_16, Level::Low),
            Output::new(p.PIN_17, Level::Low),
            Output::new(p.PIN_18, Level::Low),
            Output::new(p.PIN_19, Level::Low),
        ]);
        let switches = PinInputs::new([
            Input::new(p.PIN_20, Pull::Up),
            Input::new(p.PIN_21, Pull::Up),
            Input::new(p.PIN_22, Pull::Up),
            Input::new(p.PIN_26, Pull::Up),
        ]);

        Self {
            blink: BLINK_BANK.init(Mutex::new(blink)),
            sweep: SWEEP_BANK.init(Mutex::new(sweep)),
            rgb: RGB_BANK.init(Mutex::new(rgb)),
            switches: Some(switches),
            usb: Some(Driver::new(p.USB, crate::Irqs)),
        }
    }
}

// ===================================================================
// Task Wrappers
// ===================================================================

#[embassy_executor::task]
async fn blink_bank_task(task: BankTask<BlinkBank>) {
    task.run().await
}

/// Sweeps, fills and the bank mirror all share the strip
#[embassy_executor::task(pool_size = 3)]
async fn sweep_bank_task(task: BankTask<SweepBank>) {
    task.run().await
}

#[embassy_executor::task]
async fn rgb_bank_task(task: BankTask<RgbBank>) {
    task.run().await
}

#[embassy_executor::task]
async fn input_task(monitor: InputMonitor<'static, SwitchInputs>) {
    monitor.run().await
}

// ===================================================================
// Spawning
// ===================================================================

fn spawn_plan(
    spawner: &Spawner,
    board: &mut Board,
    ctx: &'static Context,
    profile: &impl ProfileConfig,
    plan: &TaskPlan,
) -> Result<(), SpawnError> {
    match plan.role {
        TaskRole::Animate { bank, animation } => match bank {
            BankId::Blink => spawner.spawn(blink_bank_task(AnimationTask::new(plan.id, animation, ctx, board.blink))),
            BankId::Sweep => spawner.spawn(sweep_bank_task(AnimationTask::new(plan.id, animation, ctx, board.sweep))),
            BankId::Rgb => spawner.spawn(rgb_bank_task(AnimationTask::new(plan.id, animation, ctx, board.rgb))),
        },
        TaskRole::Monitor => match board.switches.take() {
            Some(inputs) => spawner.spawn(input_task(InputMonitor::new(ctx, inputs, profile.bindings()))),
            None => Err(SpawnError::Busy),
        },
        TaskRole::Link => match board.usb.take() {
            Some(driver) => spawner.spawn(serial_link_task(driver, ctx)),
            None => Err(SpawnError::Busy),
        },
    }
}

/// Claim the board and spawn every task of `profile`.
///
/// Returns how many tasks could not be created.
pub fn spawn_controller(spawner: &Spawner, p: Peripherals, ctx: &'static Context, profile: &impl ProfileConfig) -> usize {
    info!("Initializing hardware for profile '{}'", profile.name());
    let mut board = Board::new(p);
    let mut failed = 0;

    for plan in profile.tasks() {
        match spawn_plan(spawner, &mut board, ctx, profile, plan) {
            Ok(()) => {
                ctx.tasks.mark_spawned(plan.id, plan.is_free_running());
                debug!("Task '{}' created", plan.id.name());
            }
            Err(e) => {
                failed += 1;
                error!("Unable to create task '{}': {:?}", plan.id.name(), e);
            }
        }
    }

    failed
}
