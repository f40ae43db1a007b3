//! Line-oriented operator input.

use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};

use crate::tui::settings;

/// Source of operator input lines.
///
/// `Ok(None)` signals end of input.
pub trait LineInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Blocking stdin reader that prints its prompt on stderr.
#[derive(Debug, Clone, Copy)]
pub struct StdinInput {
    color: bool,
}

impl StdinInput {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl LineInput for StdinInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut err = io::stderr();
        if self.color {
            write!(err, "{}", prompt.with(settings::COLOR_PROMPT).bold())?;
        } else {
            write!(err, "{prompt}")?;
        }
        err.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_line_ending(line)))
    }
}

fn strip_line_ending(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}
