//! # Console Port
//!
//! Line-oriented prompt/display abstraction used by the menus. The terminal
//! implementation is generic over its reader and writer so sessions can be
//! scripted in tests.

use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Why a prompt produced no usable value
#[derive(Debug, Error)]
pub enum InputError {
    /// Input stream ended
    #[error("input closed")]
    Closed,

    /// Text could not be read as the expected kind of value
    #[error("'{input}' is not a valid {expected}")]
    Invalid {
        expected: &'static str,
        input: String,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Prompt/display port
pub trait Console {
    /// Print `prompt` and read one line without its terminator.
    /// `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Print one line of output
    fn show(&mut self, text: &str) -> io::Result<()>;

    /// Read a line of text
    fn ask_text(&mut self, prompt: &str) -> Result<String, InputError> {
        self.read_line(prompt)?.ok_or(InputError::Closed)
    }

    /// Read a whole number
    fn ask_int(&mut self, prompt: &str) -> Result<i64, InputError> {
        let raw = self.ask_text(prompt)?;
        raw.trim().parse().map_err(|_| InputError::Invalid {
            expected: "whole number",
            input: raw,
        })
    }

    /// Read a decimal number; a comma is accepted as the decimal separator
    fn ask_decimal(&mut self, prompt: &str) -> Result<f64, InputError> {
        let raw = self.ask_text(prompt)?;
        raw.trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(InputError::Invalid {
                expected: "number",
                input: raw,
            })
    }
}

/// Console over any buffered reader and writer
#[derive(Debug)]
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
}

impl TerminalConsole<io::StdinLock<'static>, io::Stdout> {
    /// Console bound to the process stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer (used by tests to inspect output)
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn show(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }
}
