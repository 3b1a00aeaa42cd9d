//! Serial bridge line protocol
//!
//! Newline-terminated ASCII commands, one reply line per command:
//!
//! | Command      | Effect                                        |
//! |--------------|-----------------------------------------------|
//! | `LED L <n>`  | light the `n` leftmost sweep channels (0..=8) |
//! | `LED R <n>`  | light the `n` rightmost sweep channels        |
//! | `LED <mask>` | bit `i` of `mask` (0..=255) drives channel i  |
//!
//! Replies are `OK` or `ERR <reason>`. Button changes are pushed
//! unsolicited as `BTN <b0><b1><b2><b3>` with `1` for pressed.

pub mod line;

pub use line::LineBuffer;

use crate::config::{INPUT_COUNT, SWEEP_BANK_LEN};
use crate::state::SharedState;
use crate::types::{ButtonState, Cursor};

/// Parsed command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkCommand {
    /// Light `count` channels starting from one end
    Fill { side: Cursor, count: u8 },
    /// Raw channel bitmask
    Mask(u8),
}

impl LinkCommand {
    /// Bank mask the command asks for
    pub fn to_mask(self) -> u8 {
        match self {
            LinkCommand::Fill { side: Cursor::Left, count } => ((1u16 << count) - 1) as u8,
            LinkCommand::Fill { side: Cursor::Right, count } => (0xff00u16 >> count) as u8,
            LinkCommand::Mask(mask) => mask,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    Empty,
    LineTooLong,
    Encoding,
    UnknownCommand,
    MissingArgument,
    InvalidSide,
    InvalidNumber,
    OutOfRange,
    TrailingInput,
}

impl ParseError {
    /// Full reply line for this error
    pub const fn reply(self) -> &'static str {
        match self {
            ParseError::Empty => "ERR empty line\n",
            ParseError::LineTooLong => "ERR line too long\n",
            ParseError::Encoding => "ERR not ascii\n",
            ParseError::UnknownCommand => "ERR unknown command\n",
            ParseError::MissingArgument => "ERR missing argument\n",
            ParseError::InvalidSide => "ERR side must be L or R\n",
            ParseError::InvalidNumber => "ERR invalid number\n",
            ParseError::OutOfRange => "ERR out of range\n",
            ParseError::TrailingInput => "ERR trailing input\n",
        }
    }
}

pub const REPLY_OK: &str = "OK\n";

pub fn parse_command(line: &str) -> Result<LinkCommand, ParseError> {
    let mut tokens = line.split_ascii_whitespace();

    match tokens.next() {
        None => return Err(ParseError::Empty),
        Some("LED") => {}
        Some(_) => return Err(ParseError::UnknownCommand),
    }

    let argument = tokens.next().ok_or(ParseError::MissingArgument)?;
    let command = match argument {
        "L" | "R" => {
            let side = if argument == "L" { Cursor::Left } else { Cursor::Right };
            let count = parse_number(tokens.next().ok_or(ParseError::MissingArgument)?)?;
            if count > SWEEP_BANK_LEN as u32 {
                return Err(ParseError::OutOfRange);
            }
            LinkCommand::Fill {
                side,
                count: count as u8,
            }
        }
        _ if argument.bytes().all(|b| b.is_ascii_alphabetic()) => return Err(ParseError::InvalidSide),
        _ => {
            let mask = parse_number(argument)?;
            let mask = u8::try_from(mask).map_err(|_| ParseError::OutOfRange)?;
            LinkCommand::Mask(mask)
        }
    };

    if tokens.next().is_some() {
        return Err(ParseError::TrailingInput);
    }
    Ok(command)
}

fn parse_number(token: &str) -> Result<u32, ParseError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidNumber);
    }
    // All digits: the only way to fail is overflow
    token.parse().map_err(|_| ParseError::OutOfRange)
}

/// Apply one command line to the shared state and pick the reply
pub fn handle_line(state: &SharedState, line: &str) -> &'static str {
    match parse_command(line) {
        Ok(command) => {
            let mask = command.to_mask();
            info!("Link command {:?} -> mask {=u8:#x}", command, mask);
            state.set_link_mask(mask);
            REPLY_OK
        }
        Err(error) => {
            warn!("Rejected link command: {:?}", error);
            error.reply()
        }
    }
}

pub const BUTTON_REPORT_LEN: usize = 4 + INPUT_COUNT + 1;

/// `BTN <bits>\n` line for a button snapshot
pub fn format_buttons(buttons: &ButtonState) -> [u8; BUTTON_REPORT_LEN] {
    let mut report = [0u8; BUTTON_REPORT_LEN];
    report[..4].copy_from_slice(b"BTN ");
    for (i, pressed) in buttons.buttons.iter().enumerate() {
        report[4 + i] = if *pressed { b'1' } else { b'0' };
    }
    report[BUTTON_REPORT_LEN - 1] = b'\n';
    report
}
