//! Rendering contract consumed by the dispatcher and chat loop.
//!
//! `Renderer` is the terminal implementation; tests substitute a recording
//! sink without coupling to stdout/stderr.

pub use crate::tui::progress::ProgressHandle;
pub use crate::tui::renderer::Renderer;

/// Injectable rendering interface used by orchestration code.
pub trait RenderSink: Send + Sync {
    /// Render the app/model/session header.
    fn header(&self, model: &str, session_id: &str);
    /// Render operation output destined for stdout.
    fn output(&self, text: &str);
    /// Render one assistant chat reply.
    fn assistant_message(&self, content: &str);
    /// Start a progress indicator for a running operation.
    fn progress(&self, label: &str) -> ProgressHandle;
    fn section(&self, title: &str);
    fn field(&self, key: &str, value: &str);
    fn detail(&self, text: &str);
    fn activity(&self, text: &str);
    fn success(&self, text: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

impl RenderSink for Renderer {
    fn header(&self, model: &str, session_id: &str) {
        self.header(model, session_id);
    }

    fn output(&self, text: &str) {
        self.output(text);
    }

    fn assistant_message(&self, content: &str) {
        self.assistant_message(content);
    }

    fn progress(&self, label: &str) -> ProgressHandle {
        self.progress(label)
    }

    fn section(&self, title: &str) {
        self.section(title);
    }

    fn field(&self, key: &str, value: &str) {
        self.field(key, value);
    }

    fn detail(&self, text: &str) {
        self.detail(text);
    }

    fn activity(&self, text: &str) {
        self.activity(text);
    }

    fn success(&self, text: &str) {
        self.success(text);
    }

    fn warn(&self, msg: &str) {
        self.warn(msg);
    }

    fn error(&self, msg: &str) {
        self.error(msg);
    }
}
