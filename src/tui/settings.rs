//! Centralized UI settings for terminal output.
//!
//! Prompt strings, glyphs, colors and spinner timing live here.

use crossterm::style::Color;

// ---------------------------------------------------------------------------
// Layout / prompt strings
// ---------------------------------------------------------------------------

pub const INDENT_1: &str = "  ";
pub const PROMPT_CHAT: &str = "you> ";
pub const PROMPT_GENERATE: &str = "Describe what to generate: ";

// ---------------------------------------------------------------------------
// Labels / glyphs
// ---------------------------------------------------------------------------

pub const LABEL_APP: &str = "aide";
pub const LABEL_ASSISTANT: &str = "ai>";
pub const LABEL_WARNING: &str = "warning:";
pub const LABEL_ERROR: &str = "error:";

pub const GLYPH_SECTION_BULLET: &str = "•";
pub const GLYPH_LIST_ITEM: &str = "-";

// ---------------------------------------------------------------------------
// Spinner / progress
// ---------------------------------------------------------------------------

pub const PROGRESS_CLEAR_LINE: &str = "\r\x1b[2K";
pub const PROGRESS_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
pub const PROGRESS_TICK_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

pub const COLOR_PROMPT: Color = Color::Cyan;
pub const COLOR_APP_LABEL: Color = Color::Green;
pub const COLOR_MODEL_NAME: Color = Color::DarkGrey;
pub const COLOR_ASSISTANT_LABEL: Color = Color::Magenta;

pub const COLOR_WARNING: Color = Color::Yellow;
pub const COLOR_ERROR: Color = Color::Red;
pub const COLOR_SUCCESS: Color = Color::Green;

pub const COLOR_SECTION_BULLET: Color = Color::DarkGrey;
pub const COLOR_SECTION_TITLE: Color = Color::Cyan;
pub const COLOR_FIELD_KEY: Color = Color::DarkGrey;
pub const COLOR_FIELD_VALUE: Color = Color::White;
pub const COLOR_ACTIVITY_TEXT: Color = Color::DarkGrey;

pub const COLOR_PROGRESS_FRAME: Color = Color::Cyan;
pub const COLOR_PROGRESS_LABEL: Color = Color::DarkGrey;
pub const COLOR_PROGRESS_ELAPSED: Color = Color::DarkGrey;
