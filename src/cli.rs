//! CLI argument parsing via clap.

use aide::build_info;
use aide::commands::Command as DispatchCommand;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AI-assisted developer commands: generate, review, refactor, document,
/// test, analyze and optimize code, or chat about it.
#[derive(Debug, Parser)]
#[command(
    name = "aide",
    version = build_info::CLI_VERSION,
    after_help = build_info::HELP_BUILD_METADATA
)]
pub struct Args {
    /// Path to config file (default: ./aide.toml or ~/.config/aide/aide.toml).
    #[arg(long = "config", global = true)]
    pub config: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Log debug details to stderr (overridden by RUST_LOG).
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate code of the given type (component, function, api, ...).
    Generate {
        #[arg(value_name = "TYPE")]
        kind: String,
        /// What to generate. Prompted for when omitted.
        #[arg(short = 'p', long = "prompt")]
        prompt: Option<String>,
        #[arg(short = 'l', long = "language")]
        language: Option<String>,
        /// Write the result to a file instead of stdout.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Review files, or the working tree when none are given.
    Review {
        files: Vec<PathBuf>,
        #[arg(long = "focus")]
        focus: Option<String>,
    },
    /// Propose a refactoring of a file or symbol.
    Refactor {
        target: String,
        #[arg(short = 'g', long = "goal")]
        goal: Option<String>,
    },
    /// Generate documentation.
    Docs {
        target: String,
        #[arg(short = 'f', long = "format", default_value = "markdown")]
        format: String,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Generate tests.
    Test {
        target: String,
        #[arg(short = 'f', long = "framework")]
        framework: Option<String>,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Start an interactive chat. Type `exit` to quit.
    Chat {
        /// Model name (default: ai.model).
        #[arg(short = 'm', long = "model")]
        model: Option<String>,
        /// File or topic the conversation is about.
        #[arg(short = 'c', long = "context")]
        context: Option<String>,
        /// Resume or create a saved session under .aide/sessions.
        #[arg(short = 's', long = "session", value_name = "ID")]
        session: Option<String>,
    },
    /// Analyze code and report metrics.
    Analyze {
        target: String,
        #[arg(long = "focus")]
        focus: Option<String>,
    },
    /// Suggest optimizations.
    Optimize {
        target: String,
        #[arg(long = "focus")]
        focus: Option<String>,
    },
    /// List chat sessions saved under .aide/sessions.
    Sessions,
    /// Read or change `ai.*` configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Set `ai.<key>` and save.
    Set { key: String, value: String },
    /// Print `ai.<key>`, or every `ai` setting.
    Get { key: Option<String> },
}

impl Command {
    pub fn into_dispatch(self) -> DispatchCommand {
        match self {
            Self::Generate {
                kind,
                prompt,
                language,
                output,
            } => DispatchCommand::Generate {
                kind,
                prompt,
                language,
                output,
            },
            Self::Review { files, focus } => DispatchCommand::Review { files, focus },
            Self::Refactor { target, goal } => DispatchCommand::Refactor { target, goal },
            Self::Docs {
                target,
                format,
                output,
            } => DispatchCommand::Docs {
                target,
                format,
                output,
            },
            Self::Test {
                target,
                framework,
                output,
            } => DispatchCommand::Test {
                target,
                framework,
                output,
            },
            Self::Chat {
                model,
                context,
                session,
            } => DispatchCommand::Chat {
                model,
                context,
                session,
            },
            Self::Analyze { target, focus } => DispatchCommand::Analyze { target, focus },
            Self::Optimize { target, focus } => DispatchCommand::Optimize { target, focus },
            Self::Sessions => DispatchCommand::Sessions,
            Self::Config {
                command: ConfigCommand::Set { key, value },
            } => DispatchCommand::ConfigSet { key, value },
            Self::Config {
                command: ConfigCommand::Get { key },
            } => DispatchCommand::ConfigGet { key },
        }
    }
}
