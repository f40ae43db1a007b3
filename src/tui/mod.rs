//! Terminal primitives: styled output, spinner and UI constants.

pub mod progress;
pub mod renderer;
pub mod settings;

pub use progress::ProgressHandle;
pub use renderer::Renderer;
