//! Terminal output renderer.
//!
//! Operation results go to stdout so they can be piped; everything else
//! (status, warnings, errors, spinner) goes to stderr.

use crate::tui::progress::{set_progress_enabled, start_progress, ProgressHandle};
use crate::tui::settings;
use crossterm::style::Stylize;

/// Handles all terminal output formatting.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Globally enable/disable live progress spinners.
    pub fn set_progress_enabled(enabled: bool) {
        set_progress_enabled(enabled);
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Print the app/model header line (to stderr).
    pub fn header(&self, model: &str, session_id: &str) {
        if self.color {
            eprintln!(
                "{} {} {}",
                settings::LABEL_APP.with(settings::COLOR_APP_LABEL).bold(),
                model.with(settings::COLOR_MODEL_NAME),
                format!("session {session_id}").with(settings::COLOR_MODEL_NAME),
            );
        } else {
            eprintln!("{} ({model}, session {session_id})", settings::LABEL_APP);
        }
    }

    /// Print raw operation output (to stdout).
    pub fn output(&self, text: &str) {
        if text.ends_with('\n') {
            print!("{text}");
        } else {
            println!("{text}");
        }
    }

    /// Print one assistant chat reply (to stdout).
    pub fn assistant_message(&self, content: &str) {
        if self.color {
            println!(
                "{} {content}",
                settings::LABEL_ASSISTANT
                    .with(settings::COLOR_ASSISTANT_LABEL)
                    .bold()
            );
        } else {
            println!("{} {content}", settings::LABEL_ASSISTANT);
        }
    }

    /// Start a spinner with a status label on stderr.
    pub fn progress(&self, label: &str) -> ProgressHandle {
        start_progress(label.to_string(), self.color)
    }

    /// Print a small section header.
    pub fn section(&self, title: &str) {
        if self.color {
            eprintln!(
                "{} {}",
                settings::GLYPH_SECTION_BULLET.with(settings::COLOR_SECTION_BULLET),
                title.with(settings::COLOR_SECTION_TITLE).bold()
            );
        } else {
            eprintln!("{title}:");
        }
    }

    /// Print a key/value line under a section.
    pub fn field(&self, key: &str, value: &str) {
        if self.color {
            eprintln!(
                "{}{} {}",
                settings::INDENT_1,
                format!("{key}:").with(settings::COLOR_FIELD_KEY),
                value.with(settings::COLOR_FIELD_VALUE),
            );
        } else {
            eprintln!("{}{key}: {value}", settings::INDENT_1);
        }
    }

    /// Print an indented list item.
    pub fn detail(&self, text: &str) {
        if self.color {
            eprintln!(
                "{}{} {}",
                settings::INDENT_1,
                settings::GLYPH_LIST_ITEM.with(settings::COLOR_SECTION_BULLET),
                text.with(settings::COLOR_FIELD_VALUE)
            );
        } else {
            eprintln!("{}{} {text}", settings::INDENT_1, settings::GLYPH_LIST_ITEM);
        }
    }

    /// Print a lifecycle/status line.
    pub fn activity(&self, text: &str) {
        if self.color {
            eprintln!(
                "{} {}",
                settings::GLYPH_SECTION_BULLET.with(settings::COLOR_SECTION_BULLET),
                text.with(settings::COLOR_ACTIVITY_TEXT)
            );
        } else {
            eprintln!("{text}");
        }
    }

    /// Print a success line.
    pub fn success(&self, text: &str) {
        if self.color {
            eprintln!("{}", text.with(settings::COLOR_SUCCESS));
        } else {
            eprintln!("{text}");
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!(
                "{} {msg}",
                settings::LABEL_WARNING.with(settings::COLOR_WARNING).bold()
            );
        } else {
            eprintln!("{} {msg}", settings::LABEL_WARNING);
        }
    }

    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!(
                "{} {msg}",
                settings::LABEL_ERROR.with(settings::COLOR_ERROR).bold()
            );
        } else {
            eprintln!("{} {msg}", settings::LABEL_ERROR);
        }
    }
}
