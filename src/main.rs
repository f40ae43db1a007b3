//! CLI entry point for aide.

mod cli;

use aide::commands::Dispatcher;
use aide::config::ConfigStore;
use aide::render::Renderer;
use aide::repl::StdinInput;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Logs always go to stderr so command output on stdout stays pipeable.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "aide=debug" } else { "aide=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::Args::parse();
    init_tracing(args.verbose);

    let renderer = Renderer::new(!args.no_color);
    // Spinner frames would interleave with debug log lines.
    Renderer::set_progress_enabled(!args.verbose);

    let mut config = match ConfigStore::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            renderer.error(&format!("failed to load config: {e}"));
            std::process::exit(1);
        }
    };

    let mut input = StdinInput::new(renderer.color());
    let mut dispatcher = Dispatcher::from_config(&mut config, &renderer, &mut input);
    if let Err(err) = dispatcher.dispatch(args.command.into_dispatch()).await {
        tracing::debug!(context = %err.context, recoverable = err.recoverable, "command failed");
        renderer.error(&err.to_string());
        std::process::exit(1);
    }
}
