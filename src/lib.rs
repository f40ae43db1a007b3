//! aide: AI-assisted developer commands for the terminal.
//!
//! Subcommands (`generate`, `review`, `refactor`, `docs`, `test`, `chat`,
//! `analyze`, `optimize`, `config`, `sessions`) are mapped by a
//! [`commands::Dispatcher`] onto a [`provider::Invoker`]. Requests and
//! results are typed per operation; every failure surfaces as an
//! [`error::OperationError`] with a stable code.
//!
//! # Quick start
//!
//! ```no_run
//! use aide::provider::{invoke_named, MockInvoker};
//! use aide::types::OperationResult;
//! use serde_json::json;
//!
//! # async fn example() {
//! let invoker = MockInvoker::default();
//! let result = invoke_named(&invoker, "chat", json!({ "model": "claude-3", "message": "hello" }))
//!     .await
//!     .unwrap();
//! if let OperationResult::Chat(reply) = result {
//!     println!("{reply}");
//! }
//! # }
//! ```

pub mod build_info;
pub mod commands;
pub mod config;
pub mod error;
pub mod provider;
pub mod render;
pub mod repl;
pub mod session;
#[cfg(test)]
pub mod testsupport;
pub mod textutil;
pub mod tui;
pub mod types;
