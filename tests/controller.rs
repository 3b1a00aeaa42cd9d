//! End-to-end runs of the input monitor waking animation tasks

use core::cell::Cell;

use embassy_futures::block_on;
use embassy_futures::join::join;
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Instant;

use ledswitch::animation::{Animation, AnimationTask, Outcome};
use ledswitch::buttons::{Dispatch, InputLines, InputMonitor};
use ledswitch::config::{INPUT_COUNT, SWEEP_BANK_LEN};
use ledswitch::context::Context;
use ledswitch::profile::{Profile, ProfileConfig, TaskRole};
use ledswitch::registry::OutputBank;
use ledswitch::state::SharedState;
use ledswitch::tasks::TaskId;
use ledswitch::types::{Cursor, SwitchLevel};

type Bank = Mutex<CriticalSectionRawMutex, Strip>;

struct Strip([bool; SWEEP_BANK_LEN]);

impl Strip {
    fn lit(&self) -> Vec<usize> {
        (0..SWEEP_BANK_LEN).filter(|&i| self.0[i]).collect()
    }
}

impl OutputBank for Strip {
    fn len(&self) -> usize {
        SWEEP_BANK_LEN
    }

    fn set_level(&mut self, index: usize, on: bool) {
        self.0[index] = on;
    }

    fn level(&mut self, index: usize) -> bool {
        self.0[index]
    }
}

/// Switch panel the test flips between polls
struct Panel(Cell<[SwitchLevel; INPUT_COUNT]>);

impl Panel {
    fn new() -> Self {
        Self(Cell::new([SwitchLevel::Released; INPUT_COUNT]))
    }

    fn set(&self, input: usize, level: SwitchLevel) {
        let mut levels = self.0.get();
        levels[input] = level;
        self.0.set(levels);
    }
}

impl InputLines for &Panel {
    fn read(&mut self, line: usize) -> SwitchLevel {
        self.0.get()[line]
    }
}

struct Bench<'a> {
    panel: &'a Panel,
    monitor: InputMonitor<'a, &'a Panel>,
    now: u64,
}

impl<'a> Bench<'a> {
    fn new(ctx: &'a Context, panel: &'a Panel, profile: Profile) -> Self {
        Self {
            panel,
            monitor: InputMonitor::new(ctx, panel, profile.bindings()),
            now: 0,
        }
    }

    fn poll_at(&mut self, ms: u64) -> heapless::Vec<Dispatch, INPUT_COUNT> {
        self.now = ms;
        self.monitor.poll(Instant::from_millis(ms))
    }

    /// Press and release one switch, starting `gap` ms after the last poll
    fn tap(&mut self, input: usize, gap: u64) -> Vec<Dispatch> {
        let start = self.now + gap;
        self.panel.set(input, SwitchLevel::Pressed);
        self.poll_at(start);
        let dispatched = self.poll_at(start + 60).to_vec();
        self.panel.set(input, SwitchLevel::Released);
        self.poll_at(start + 70);
        dispatched
    }
}

fn sweep_task<'a>(ctx: &'a Context, bank: &'a Bank, profile: Profile, id: TaskId) -> AnimationTask<'a, CriticalSectionRawMutex, Strip> {
    let plan = profile.plan(id).expect("task planned");
    let TaskRole::Animate { animation, .. } = plan.role else {
        panic!("{} is not an animation", id.name());
    };
    ctx.tasks.mark_spawned(id, plan.is_free_running());
    AnimationTask::new(id, animation, ctx, bank)
}

/// Let the task park itself, then tap, then finish its cycle
fn tap_and_step(
    bench: &mut Bench<'_>,
    task: &mut AnimationTask<'_, CriticalSectionRawMutex, Strip>,
    input: usize,
) -> (Outcome, Vec<Dispatch>) {
    block_on(join(task.step(), async {
        yield_now().await;
        bench.tap(input, 100)
    }))
}

fn fast_context(profile: Profile) -> Context {
    Context::new(SharedState::new(), profile.timing().with_sweep_step(1))
}

#[test]
fn snakes_alternate_through_the_cursor() {
    let profile = Profile::Snakes;
    let ctx = fast_context(profile);
    let bank = Mutex::new(Strip([false; SWEEP_BANK_LEN]));
    let panel = Panel::new();
    let mut bench = Bench::new(&ctx, &panel, profile);
    let mut left = sweep_task(&ctx, &bank, profile, TaskId::SweepLeft);
    let mut right = sweep_task(&ctx, &bank, profile, TaskId::SweepRight);

    // Right first: cursor is on the left, so it only parks the cursor
    let (outcome, dispatched) = tap_and_step(&mut bench, &mut right, 1);
    assert_eq!(
        dispatched,
        [Dispatch::Wake {
            task: TaskId::SweepRight,
            woke: true
        }]
    );
    assert_eq!(outcome, Outcome::Skipped);
    assert!(block_on(bank.lock()).lit().is_empty());
    assert_eq!(ctx.state.cursor(), Cursor::Left);

    let (outcome, _) = tap_and_step(&mut bench, &mut left, 0);
    assert_eq!(outcome, Outcome::Rendered);
    assert_eq!(block_on(bank.lock()).lit(), [SWEEP_BANK_LEN - 1]);
    assert_eq!(ctx.state.cursor(), Cursor::Right);

    // Same direction again never renders twice in a row
    let (outcome, _) = tap_and_step(&mut bench, &mut left, 0);
    assert_eq!(outcome, Outcome::Skipped);

    let (outcome, _) = tap_and_step(&mut bench, &mut right, 1);
    assert_eq!(outcome, Outcome::Rendered);
    assert_eq!(block_on(bank.lock()).lit(), [0]);
}

#[test]
fn held_pair_sweeps_back() {
    let profile = Profile::Snakes;
    let ctx = fast_context(profile);
    let bank = Mutex::new(Strip([false; SWEEP_BANK_LEN]));
    let panel = Panel::new();
    let mut bench = Bench::new(&ctx, &panel, profile);
    let mut back = sweep_task(&ctx, &bank, profile, TaskId::BidirectionalSweep);
    // Present but never stepped here
    ctx.tasks.mark_spawned(TaskId::SweepLeft, false);

    let (outcome, dispatched) = block_on(join(back.step(), async {
        yield_now().await;
        panel.set(0, SwitchLevel::Pressed);
        bench.poll_at(0);
        bench.poll_at(60);
        panel.set(1, SwitchLevel::Pressed);
        bench.poll_at(80);
        bench.poll_at(140).to_vec()
    }));

    assert_eq!(
        dispatched,
        [Dispatch::Wake {
            task: TaskId::BidirectionalSweep,
            woke: true
        }]
    );
    assert_eq!(outcome, Outcome::Rendered);
    assert_eq!(block_on(bank.lock()).lit(), [SWEEP_BANK_LEN - 1]);
}

#[test]
fn double_clicks_fill_and_clear_the_strip() {
    let profile = Profile::DoubleClick;
    let ctx = fast_context(profile);
    let bank = Mutex::new(Strip([false; SWEEP_BANK_LEN]));
    let panel = Panel::new();
    let mut bench = Bench::new(&ctx, &panel, profile);
    let mut all_on = sweep_task(&ctx, &bank, profile, TaskId::AllOn);
    let mut all_off = sweep_task(&ctx, &bank, profile, TaskId::AllOff);

    // Slow pair: two single clicks, nothing rendered
    assert_eq!(bench.tap(0, 0), [Dispatch::Click { input: 0 }]);
    assert_eq!(bench.tap(0, 400), [Dispatch::Click { input: 0 }]);

    // Quick second click completes the gesture
    let (outcome, dispatched) = tap_and_step(&mut bench, &mut all_on, 0);
    assert_eq!(
        dispatched,
        [Dispatch::Wake {
            task: TaskId::AllOn,
            woke: true
        }]
    );
    assert_eq!(outcome, Outcome::Rendered);
    assert_eq!(block_on(bank.lock()).lit().len(), SWEEP_BANK_LEN);

    bench.tap(1, 500);
    let (outcome, _) = tap_and_step(&mut bench, &mut all_off, 1);
    assert_eq!(outcome, Outcome::Rendered);
    assert!(block_on(bank.lock()).lit().is_empty());
}

#[test]
fn brightness_transfer_clamps_at_the_scale() {
    let profile = Profile::Brightness;
    let ctx = Context::new(SharedState::with_scale(100, 50), profile.timing());
    let panel = Panel::new();
    let mut bench = Bench::new(&ctx, &panel, profile);

    for _ in 0..5 {
        bench.tap(0, 100);
    }
    assert_eq!(ctx.state.levels(), [0, 50, 100]);

    let dispatched = bench.tap(0, 100);
    assert_eq!(dispatched, [Dispatch::Brightness([0, 50, 100])]);

    bench.tap(1, 100);
    assert_eq!(ctx.state.levels(), [10, 50, 90]);
}

#[test]
fn sweep_bank_tasks_are_interlock_driven() {
    for profile in Profile::ALL {
        for plan in profile.tasks() {
            if let TaskRole::Animate {
                animation: Animation::Sweep(_) | Animation::Bidirectional(_) | Animation::Fill(_),
                ..
            } = plan.role
            {
                assert!(!plan.is_free_running(), "{}", plan.id.name());
            }
        }
    }
}
