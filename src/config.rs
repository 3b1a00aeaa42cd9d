//! Hardware and timing configuration for ledswitch
//! RP2040 (Raspberry Pi Pico) carrying two LED banks, one RGB bank and four switches

use embassy_time::Duration;

// ===================================================================
// Bank Sizes
// ===================================================================

pub const BLINK_BANK_LEN: usize = 2; // Heartbeat pair
pub const SWEEP_BANK_LEN: usize = 8; // Red LED strip
pub const RGB_GROUPS: usize = 3; // RGB LEDs on the board
pub const RGB_BANK_LEN: usize = RGB_GROUPS * 3; // R, G, B per group
pub const INPUT_COUNT: usize = 4; // Push-buttons

// ===================================================================
// GPIO Pin Assignments - Raspberry Pi Pico
// ===================================================================

pub const BLINK_PINS: [u8; BLINK_BANK_LEN] = [25, 15]; // Built-in LED + GPIO 15
pub const SWEEP_PINS: [u8; SWEEP_BANK_LEN] = [2, 3, 4, 5, 6, 7, 8, 9];
pub const RGB_PINS: [u8; RGB_BANK_LEN] = [
    10, 11, 12, // RGB LED 1
    13, 14, 16, // RGB LED 2
    17, 18, 19, // RGB LED 3
];
pub const SWITCH_PINS: [u8; INPUT_COUNT] = [20, 21, 22, 26]; // Active-low, pulled up

// ===================================================================
// Brightness Scale
// ===================================================================

pub const MAX_BRIGHTNESS: u8 = 100;
pub const BRIGHTNESS_STEP: u8 = 10;
pub const DEFAULT_BRIGHTNESS: u8 = MAX_BRIGHTNESS / 2; // Mid-scale

// ===================================================================
// Timing
// ===================================================================

pub const BLINK_PERIOD_MS: u64 = 200;
pub const TOGGLE_BLINK_PERIOD_MS: u64 = 500;
pub const SWEEP_STEP_MS: u64 = 100;
pub const SLOW_SWEEP_STEP_MS: u64 = 200;
pub const PWM_PERIOD_MS: u64 = 20;
pub const DEBOUNCE_MS: u64 = 50;
pub const DOUBLE_CLICK_TIMEOUT_MS: u64 = 300;
pub const INPUT_POLL_MS: u64 = 10;
pub const MIRROR_REFRESH_MS: u64 = 5;
pub const SUPERVISOR_TICK_SECS: u64 = 10;

/// Every delay the tasks use, bundled so one context can be retimed as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Time each blink channel stays lit
    pub blink_period: Duration,
    /// Delay between two moves of a sweep head
    pub sweep_step: Duration,
    /// One full PWM frame of the brightness renderer
    pub pwm_period: Duration,
    /// Settle time between an edge and its confirming re-read
    pub debounce: Duration,
    /// Maximum gap between the two presses of a double-click
    pub double_click_timeout: Duration,
    /// Input monitor sampling interval
    pub poll_interval: Duration,
    /// Bank mirror refresh interval
    pub mirror_refresh: Duration,
}

impl Timing {
    pub const fn new() -> Self {
        Self {
            blink_period: Duration::from_millis(BLINK_PERIOD_MS),
            sweep_step: Duration::from_millis(SWEEP_STEP_MS),
            pwm_period: Duration::from_millis(PWM_PERIOD_MS),
            debounce: Duration::from_millis(DEBOUNCE_MS),
            double_click_timeout: Duration::from_millis(DOUBLE_CLICK_TIMEOUT_MS),
            poll_interval: Duration::from_millis(INPUT_POLL_MS),
            mirror_refresh: Duration::from_millis(MIRROR_REFRESH_MS),
        }
    }

    pub const fn with_blink_period(mut self, ms: u64) -> Self {
        self.blink_period = Duration::from_millis(ms);
        self
    }

    pub const fn with_sweep_step(mut self, ms: u64) -> Self {
        self.sweep_step = Duration::from_millis(ms);
        self
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

// ===================================================================
// USB Serial Bridge
// ===================================================================

pub const USB_VID: u16 = 0xc0de;
pub const USB_PID: u16 = 0xcafe;
pub const USB_MANUFACTURER: &str = "ledswitch";
pub const USB_PRODUCT: &str = "ledswitch serial bridge";
pub const USB_SERIAL: &str = "LEDSWITCH001";
pub const USB_MAX_PACKET: u16 = 64; // RP2040 full-speed limit
pub const LINK_LINE_CAPACITY: usize = 32; // Longest accepted command line
pub const LINK_REPLY_QUEUE: usize = 4;
