//! Byte stream to command line assembly

use heapless::{String, Vec};

use super::ParseError;

/// Collects bytes until `\n`. `\r` is dropped; blank lines produce nothing.
///
/// A line longer than `N` is discarded up to its newline and reported once
/// as `LineTooLong`.
pub struct LineBuffer<const N: usize> {
    buf: Vec<u8, N>,
    overflowed: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
        }
    }

    pub fn push(&mut self, byte: u8) -> Option<Result<String<N>, ParseError>> {
        match byte {
            b'\r' => None,
            b'\n' => self.finish(),
            _ if self.overflowed => None,
            _ => {
                if self.buf.push(byte).is_err() {
                    self.overflowed = true;
                    self.buf.clear();
                }
                None
            }
        }
    }

    fn finish(&mut self) -> Option<Result<String<N>, ParseError>> {
        if self.overflowed {
            self.overflowed = false;
            return Some(Err(ParseError::LineTooLong));
        }
        if self.buf.is_empty() {
            return None;
        }
        let bytes = core::mem::take(&mut self.buf);
        Some(String::from_utf8(bytes).map_err(|_| ParseError::Encoding))
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn ok(line: &str) -> Result<std::string::String, ParseError> {
        Ok(line.into())
    }

    fn feed<const N: usize>(buffer: &mut LineBuffer<N>, input: &[u8]) -> Vec<Result<std::string::String, ParseError>> {
        input
            .iter()
            .filter_map(|&b| buffer.push(b))
            .map(|line| line.map(|s| std::string::String::from(s.as_str())))
            .collect()
    }

    #[test]
    fn splits_on_newline_and_drops_carriage_return() {
        let mut buffer = LineBuffer::<16>::new();
        let lines = feed(&mut buffer, b"LED 1\r\nLED L 2\n");
        assert_eq!(lines, [ok("LED 1"), ok("LED L 2")]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut buffer = LineBuffer::<16>::new();
        assert!(feed(&mut buffer, b"\r\n\n").is_empty());
    }

    #[test]
    fn overlong_line_is_reported_once() {
        let mut buffer = LineBuffer::<4>::new();
        let lines = feed(&mut buffer, b"LED 255\nLED\n");
        assert_eq!(lines, [Err(ParseError::LineTooLong), ok("LED")]);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut buffer = LineBuffer::<4>::new();
        assert_eq!(feed(&mut buffer, &[0xff, b'\n']), [Err::<std::string::String, _>(ParseError::Encoding)]);
    }
}
