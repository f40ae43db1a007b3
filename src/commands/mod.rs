//! Command dispatcher.
//!
//! Maps one parsed subcommand to one operation path: validate inputs, build a
//! typed request, invoke, render. Every failure on a path is rewrapped as an
//! [`OperationError`] carrying that path's [`ErrorCode`] and its input as
//! context.

mod files;
mod format;

pub use files::{read_source_file, read_target, write_output, MAX_SOURCE_BYTES};
pub use format::{format_analysis, format_change_plan, format_review};

use serde_json::{json, Value as JsonValue};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::build_info;
use crate::config::{display_value, parse_value, ConfigStore, NAMESPACE};
use crate::error::{ConfigError, ErrorCode, OperationError, ProviderError};
use crate::provider::{build_invoker, Invoker};
use crate::render::RenderSink;
use crate::repl::{ChatLoop, ChatSummary, LineInput};
use crate::session::{Session, SessionStore, SessionSummary};
use crate::textutil::single_line_preview;
use crate::tui::settings;
use crate::types::{
    AnalysisReport, AnalyzeParams, ChangePlan, DocsParams, GenerateParams, OperationRequest,
    OperationResult, OptimizeParams, RefactorParams, ReviewParams, ReviewReport, TestParams,
};

/// A fully parsed subcommand.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Generate {
        kind: String,
        prompt: Option<String>,
        language: Option<String>,
        output: Option<PathBuf>,
    },
    Review {
        files: Vec<PathBuf>,
        focus: Option<String>,
    },
    Refactor {
        target: String,
        goal: Option<String>,
    },
    Docs {
        target: String,
        format: String,
        output: Option<PathBuf>,
    },
    Test {
        target: String,
        framework: Option<String>,
        output: Option<PathBuf>,
    },
    Chat {
        model: Option<String>,
        context: Option<String>,
        session: Option<String>,
    },
    Analyze {
        target: String,
        focus: Option<String>,
    },
    Optimize {
        target: String,
        focus: Option<String>,
    },
    ConfigSet {
        key: String,
        value: String,
    },
    ConfigGet {
        key: Option<String>,
    },
    /// List saved chat sessions.
    Sessions,
}

/// What a successful command produced; one variant per command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Generate {
        code: String,
        written_to: Option<PathBuf>,
    },
    Review(ReviewReport),
    Refactor(ChangePlan),
    Docs {
        content: String,
        written_to: Option<PathBuf>,
    },
    Test {
        content: String,
        written_to: Option<PathBuf>,
    },
    Chat {
        session: Session,
        summary: ChatSummary,
    },
    Analyze(AnalysisReport),
    Optimize(ChangePlan),
    ConfigSet {
        key: String,
        value: toml::Value,
        saved_to: PathBuf,
    },
    ConfigGet {
        key: Option<String>,
        rendered: String,
    },
    Sessions(Vec<SessionSummary>),
}

/// Runs commands against an invoker, config store and terminal.
///
/// The invoker is built from the config on first use unless one is injected,
/// so `config` and `sessions` work even when the AI settings are broken.
pub struct Dispatcher<'a> {
    invoker: Option<Arc<dyn Invoker>>,
    config: &'a mut ConfigStore,
    renderer: &'a dyn RenderSink,
    input: &'a mut dyn LineInput,
    session_root: Option<PathBuf>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        invoker: Arc<dyn Invoker>,
        config: &'a mut ConfigStore,
        renderer: &'a dyn RenderSink,
        input: &'a mut dyn LineInput,
    ) -> Self {
        Self {
            invoker: Some(invoker),
            config,
            renderer,
            input,
            session_root: None,
        }
    }

    /// Build the invoker from `config` when an operation first needs it.
    pub fn from_config(
        config: &'a mut ConfigStore,
        renderer: &'a dyn RenderSink,
        input: &'a mut dyn LineInput,
    ) -> Self {
        Self {
            invoker: None,
            config,
            renderer,
            input,
            session_root: None,
        }
    }

    /// Store chat sessions under `root` instead of `./.aide`.
    pub fn with_session_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.session_root = Some(root.into());
        self
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, OperationError> {
        let name = command_name(&command);
        tracing::debug!(command = name, "dispatch start");
        let outcome = match command {
            Command::Generate {
                kind,
                prompt,
                language,
                output,
            } => {
                self.generate(&kind, prompt, language, output.as_deref())
                    .await
            }
            Command::Review { files, focus } => self.review(&files, focus).await,
            Command::Refactor { target, goal } => self.refactor(&target, goal).await,
            Command::Docs {
                target,
                format,
                output,
            } => self.docs(&target, &format, output.as_deref()).await,
            Command::Test {
                target,
                framework,
                output,
            } => self.test(&target, framework, output.as_deref()).await,
            Command::Chat {
                model,
                context,
                session,
            } => self.chat(model, context, session).await,
            Command::Analyze { target, focus } => self.analyze(&target, focus).await,
            Command::Optimize { target, focus } => self.optimize(&target, focus).await,
            Command::ConfigSet { key, value } => self.config_set(&key, &value),
            Command::ConfigGet { key } => self.config_get(key.as_deref()),
            Command::Sessions => self.sessions(),
        };
        match &outcome {
            Ok(_) => tracing::debug!(command = name, "dispatch end"),
            Err(err) => tracing::debug!(command = name, code = %err.code, "dispatch failed"),
        }
        outcome
    }

    pub async fn generate(
        &mut self,
        kind: &str,
        prompt: Option<String>,
        language: Option<String>,
        output: Option<&Path>,
    ) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::GenerateFailed;
        let context = json!({ "kind": kind, "prompt": prompt, "language": language });

        let prompt = match prompt {
            Some(prompt) => prompt,
            None => self
                .input
                .read_line(settings::PROMPT_GENERATE)
                .map_err(|e| OperationError::wrap(code, context.clone(), e))?
                .unwrap_or_default(),
        };
        let prompt = prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(OperationError::invalid(code, context, "prompt cannot be empty"));
        }
        tracing::info!(kind, prompt = %single_line_preview(&prompt, 60), "generating");

        let request = OperationRequest::Generate(GenerateParams {
            kind: kind.to_string(),
            prompt,
            language,
        });
        let generated = self
            .invoke(code, request, "Generating...", |result| match result {
                OperationResult::Generate(text) => Some(text),
                _ => None,
            })
            .await?;

        let written_to = self.emit(code, &context, &generated, output)?;
        Ok(CommandOutcome::Generate {
            code: generated,
            written_to,
        })
    }

    pub async fn review(
        &mut self,
        paths: &[PathBuf],
        focus: Option<String>,
    ) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::ReviewFailed;
        let context = json!({
            "files": paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "focus": focus,
        });
        let files = paths
            .iter()
            .map(|path| read_source_file(path))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| OperationError::wrap(code, context.clone(), e))?;
        if files.is_empty() {
            self.renderer.activity("No files given; reviewing the working tree");
        }

        let request = OperationRequest::Review(ReviewParams { files, focus });
        let report = self
            .invoke(code, request, "Reviewing...", |result| match result {
                OperationResult::Review(report) => Some(report),
                _ => None,
            })
            .await?;
        self.renderer.output(&format_review(&report));
        Ok(CommandOutcome::Review(report))
    }

    pub async fn refactor(
        &mut self,
        target: &str,
        goal: Option<String>,
    ) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::RefactorFailed;
        let context = json!({ "target": target, "goal": goal });
        let source = self.target_source(code, &context, target)?;

        let request = OperationRequest::Refactor(RefactorParams {
            target: target.to_string(),
            source,
            goal,
        });
        let plan = self
            .invoke(code, request, "Refactoring...", |result| match result {
                OperationResult::Refactor(plan) => Some(plan),
                _ => None,
            })
            .await?;
        self.renderer.output(&format_change_plan(&plan));
        Ok(CommandOutcome::Refactor(plan))
    }

    pub async fn docs(
        &mut self,
        target: &str,
        format: &str,
        output: Option<&Path>,
    ) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::DocsFailed;
        let context = json!({ "target": target, "format": format });
        let source = self.target_source(code, &context, target)?;

        let request = OperationRequest::Docs(DocsParams {
            target: target.to_string(),
            source,
            format: format.to_string(),
        });
        let content = self
            .invoke(code, request, "Writing docs...", |result| match result {
                OperationResult::Docs(content) => Some(content),
                _ => None,
            })
            .await?;
        let written_to = self.emit(code, &context, &content, output)?;
        Ok(CommandOutcome::Docs {
            content,
            written_to,
        })
    }

    pub async fn test(
        &mut self,
        target: &str,
        framework: Option<String>,
        output: Option<&Path>,
    ) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::TestFailed;
        let context = json!({ "target": target, "framework": framework });
        let source = self.target_source(code, &context, target)?;

        let request = OperationRequest::Test(TestParams {
            target: target.to_string(),
            source,
            framework,
        });
        let content = self
            .invoke(code, request, "Writing tests...", |result| match result {
                OperationResult::Test(content) => Some(content),
                _ => None,
            })
            .await?;
        let written_to = self.emit(code, &context, &content, output)?;
        Ok(CommandOutcome::Test {
            content,
            written_to,
        })
    }

    /// Run an interactive chat. With `session_id`, the session is resumed
    /// from (and saved to) the local session store.
    pub async fn chat(
        &mut self,
        model: Option<String>,
        context: Option<String>,
        session_id: Option<String>,
    ) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::ChatFailed;
        let error_context = json!({ "model": model, "context": context, "session": session_id });
        let wrap = |e: Box<dyn std::error::Error + Send + Sync>| {
            OperationError::wrap(code, error_context.clone(), e)
        };

        let model = match model.filter(|m| !m.trim().is_empty()) {
            Some(model) => model,
            None => self.config.settings().map_err(|e| wrap(e.into()))?.model,
        };
        let invoker = self.resolve_invoker(code, &error_context)?;

        let store = match &session_id {
            Some(_) => Some(self.open_session_store().map_err(|e| wrap(e.into()))?),
            None => None,
        };
        let mut session = match (&store, session_id) {
            (Some(store), Some(id)) => match store.load(&id).map_err(|e| wrap(e.into()))? {
                Some(existing) => {
                    self.renderer.activity(&format!(
                        "Resumed session {} ({} messages)",
                        existing.id(),
                        existing.messages().len()
                    ));
                    existing
                }
                None => Session::with_id(id, model, context),
            },
            _ => Session::new(model, context),
        };

        self.renderer.activity(&build_info::banner_line());
        self.renderer.header(session.model(), session.id());
        self.renderer
            .activity(&format!("Type `{}` to quit", crate::repl::EXIT_COMMAND));

        let chat = ChatLoop::new(invoker.as_ref(), self.renderer);
        let chat = match &store {
            Some(store) => chat.with_store(store),
            None => chat,
        };
        let summary = chat.run(&mut session, &mut *self.input).await?;
        Ok(CommandOutcome::Chat { session, summary })
    }

    pub async fn analyze(
        &mut self,
        target: &str,
        focus: Option<String>,
    ) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::AnalyzeFailed;
        let context = json!({ "target": target, "focus": focus });
        let source = self.target_source(code, &context, target)?;

        let request = OperationRequest::Analyze(AnalyzeParams {
            target: target.to_string(),
            source,
            focus,
        });
        let report = self
            .invoke(code, request, "Analyzing...", |result| match result {
                OperationResult::Analyze(report) => Some(report),
                _ => None,
            })
            .await?;
        self.renderer.output(&format_analysis(&report));
        Ok(CommandOutcome::Analyze(report))
    }

    pub async fn optimize(
        &mut self,
        target: &str,
        focus: Option<String>,
    ) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::OptimizeFailed;
        let context = json!({ "target": target, "focus": focus });
        let source = self.target_source(code, &context, target)?;

        let request = OperationRequest::Optimize(OptimizeParams {
            target: target.to_string(),
            source,
            focus,
        });
        let plan = self
            .invoke(code, request, "Optimizing...", |result| match result {
                OperationResult::Optimize(plan) => Some(plan),
                _ => None,
            })
            .await?;
        self.renderer.output(&format_change_plan(&plan));
        Ok(CommandOutcome::Optimize(plan))
    }

    /// Set `ai.<key>` and save.
    ///
    /// Typed settings are checked on their own before anything changes. The
    /// live store is only replaced once the file is written.
    pub fn config_set(&mut self, key: &str, value: &str) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::ConfigSetFailed;
        let context = json!({ "key": key, "value": value });
        let wrap = |e: ConfigError| OperationError::wrap(code, context.clone(), e);

        let parsed = parse_value(value);
        ConfigStore::check_setting(key, &parsed).map_err(wrap)?;
        let mut candidate = self.config.clone();
        candidate.set(key, parsed.clone()).map_err(wrap)?;
        let saved_to = candidate.save().map_err(wrap)?;
        *self.config = candidate;

        let full_key = qualified_key(key);
        self.renderer.success(&format!(
            "Set {full_key} = {} ({})",
            display_value(&parsed),
            saved_to.display()
        ));
        Ok(CommandOutcome::ConfigSet {
            key: full_key,
            value: parsed,
            saved_to,
        })
    }

    /// Print `ai.<key>`, or the whole `ai` table when `key` is absent.
    pub fn config_get(&self, key: Option<&str>) -> Result<CommandOutcome, OperationError> {
        let code = ErrorCode::ConfigGetFailed;
        let context = json!({ "key": key });
        let lookup = key.unwrap_or("");

        let value = self
            .config
            .get(lookup)
            .map_err(|e| OperationError::wrap(code, context.clone(), e))?
            .ok_or_else(|| {
                OperationError::wrap(
                    code,
                    context.clone(),
                    ConfigError::MissingKey(qualified_key(lookup)),
                )
            })?;
        let rendered = display_value(&value);
        self.renderer.output(&rendered);
        Ok(CommandOutcome::ConfigGet {
            key: key.map(qualified_key),
            rendered,
        })
    }

    /// List saved chat sessions, most recently updated first.
    pub fn sessions(&self) -> Result<CommandOutcome, OperationError> {
        let wrap = |e: crate::error::SessionError| {
            OperationError::wrap(ErrorCode::ChatFailed, json!({ "command": "sessions" }), e)
        };
        let sessions = self.open_session_store().and_then(|store| store.list()).map_err(wrap)?;

        self.renderer.section("sessions");
        if sessions.is_empty() {
            self.renderer.field("saved", "none");
        }
        for session in &sessions {
            self.renderer.field(
                &session.id,
                &format!(
                    "{}, {} messages, updated {}",
                    session.model,
                    session.message_count,
                    session.updated_at.format("%Y-%m-%d %H:%M UTC")
                ),
            );
        }
        if let Some(latest) = sessions.first() {
            self.renderer
                .detail(&format!("resume with `aide chat --session {}`", latest.id));
        }
        Ok(CommandOutcome::Sessions(sessions))
    }

    /// The injected invoker, or one built from the current AI settings.
    fn resolve_invoker(
        &mut self,
        code: ErrorCode,
        context: &JsonValue,
    ) -> Result<Arc<dyn Invoker>, OperationError> {
        if let Some(invoker) = &self.invoker {
            return Ok(Arc::clone(invoker));
        }
        let invoker = self
            .config
            .settings()
            .and_then(|settings| build_invoker(&settings))
            .map_err(|e| OperationError::wrap(code, context.clone(), e))?;
        self.invoker = Some(Arc::clone(&invoker));
        Ok(invoker)
    }

    /// Invoke with a spinner and unpack the result variant matching the
    /// request.
    async fn invoke<T>(
        &mut self,
        code: ErrorCode,
        request: OperationRequest,
        label: &str,
        unpack: impl FnOnce(OperationResult) -> Option<T>,
    ) -> Result<T, OperationError> {
        let kind = request.kind();
        tracing::debug!(operation = %kind, "invoke");
        let invoker = self.resolve_invoker(code, &request.params_json())?;
        let result = {
            let _progress = self.renderer.progress(label);
            invoker.invoke(&request).await
        };
        let wrap = |e: ProviderError| OperationError::wrap(code, request.params_json(), e);
        let result = result.map_err(wrap)?;
        let got = result.kind();
        unpack(result).ok_or_else(|| {
            wrap(ProviderError::Failed(format!(
                "expected a `{kind}` result, got `{got}`"
            )))
        })
    }

    fn target_source(
        &self,
        code: ErrorCode,
        context: &JsonValue,
        target: &str,
    ) -> Result<Option<String>, OperationError> {
        read_target(target).map_err(|e| OperationError::wrap(code, context.clone(), e))
    }

    /// Print generated text, or write it to `output` when given.
    fn emit(
        &self,
        code: ErrorCode,
        context: &JsonValue,
        content: &str,
        output: Option<&Path>,
    ) -> Result<Option<PathBuf>, OperationError> {
        let Some(path) = output else {
            self.renderer.output(content);
            return Ok(None);
        };
        write_output(path, content).map_err(|e| OperationError::wrap(code, context.clone(), e))?;
        self.renderer
            .success(&format!("Wrote {}", path.display()));
        Ok(Some(path.to_path_buf()))
    }

    fn open_session_store(&self) -> Result<SessionStore, crate::error::SessionError> {
        match &self.session_root {
            Some(root) => SessionStore::open(root),
            None => SessionStore::open_default(),
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Generate { .. } => "generate",
        Command::Review { .. } => "review",
        Command::Refactor { .. } => "refactor",
        Command::Docs { .. } => "docs",
        Command::Test { .. } => "test",
        Command::Chat { .. } => "chat",
        Command::Analyze { .. } => "analyze",
        Command::Optimize { .. } => "optimize",
        Command::ConfigSet { .. } => "config set",
        Command::ConfigGet { .. } => "config get",
        Command::Sessions => "sessions",
    }
}

/// `foo.bar` and `ai.foo.bar` both display as `ai.foo.bar`.
fn qualified_key(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() || key == NAMESPACE {
        NAMESPACE.to_string()
    } else if key.starts_with(&format!("{NAMESPACE}.")) {
        key.to_string()
    } else {
        format!("{NAMESPACE}.{key}")
    }
}
