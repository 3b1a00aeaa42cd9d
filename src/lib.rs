//! ledswitch - LED/switch animation controller for RP2040
//!
//! Independent Embassy tasks drive three LED banks while an input monitor
//! polls four push-buttons and coordinates them through shared state.
//!
//! ## Firmware Profiles
//! - `brightness`: paired brightness transfer, PWM rendering, two sweeps
//! - `dimmer`: independent brightness groups shown as level bars
//! - `double-click`: all-on / all-off gestures
//! - `snakes`: left, right and bidirectional sweeps, two-button combo
//! - `serial-bridge`: LED commands and button reports over USB serial
//!
//! ## Architecture
//! - **Context**: one `'static` object holding shared state, task slots and timing
//! - **Interlock**: the sweep cursor decides which direction may move
//! - **Suspend/resume**: latched per-task signals, phase doubles as enable flag
//! - **Banks**: async mutexes, held for a whole animation cycle
//!
//! Everything except `hardware` and `usb` builds and tests on the host.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible in every module
mod fmt;

pub mod animation;
pub mod buttons;
pub mod config;
pub mod context;
pub mod profile;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod supervisor;
pub mod tasks;
pub mod types;

#[cfg(feature = "rp2040")]
pub mod hardware;
#[cfg(feature = "rp2040")]
pub mod usb;

#[cfg(feature = "rp2040")]
use embassy_rp::usb::InterruptHandler;
#[cfg(feature = "rp2040")]
use embassy_rp::{bind_interrupts, peripherals};

// USB interrupt binding - shared by all binaries
#[cfg(feature = "rp2040")]
bind_interrupts!(pub struct Irqs {
    USBCTRL_IRQ => InterruptHandler<peripherals::USB>;
});
