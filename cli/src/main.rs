//! CLI entrypoint for Roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use roundtable_application::{
    NoTurnObserver, ObservationFeed, RegistryError, RunRoundtableUseCase, SessionRegistry,
    TurnObserver,
};
use roundtable_domain::{Kickoff, SessionState};
use roundtable_infrastructure::{
    ChatCompletionsClient, ConfigLoader, FileConfig, JsonlTranscriptSink,
};
use roundtable_presentation::{
    Cli, ConsoleFormatter, JsonFormatter, OutputFormat, ProgressReporter, SimpleProgress,
    TranscriptFormatter,
};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Exit code after Ctrl-C, as shells report SIGINT
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&cli)?;

    info!("Starting Roundtable");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let file_config = load_config(&cli)?;
    let personas = file_config.build_persona_registry()?;

    if cli.list_personas {
        println!("{}", ConsoleFormatter::format_personas(&personas));
        return Ok(ExitCode::SUCCESS);
    }

    let topic = match cli.topic.as_deref() {
        Some(t) => t,
        None => bail!("A kickoff topic is required. Use --list-personas to see the panel."),
    };
    let mut kickoff = Kickoff::try_new(topic)?;
    if let Some(recipient) = &cli.recipient {
        kickoff = kickoff.with_recipient(recipient.as_str());
    }

    // === Dependency Injection ===
    let api_key = file_config.resolve_api_key()?;
    let client = Arc::new(ChatCompletionsClient::new(
        &file_config.provider.url,
        &file_config.provider.model,
        api_key,
    ));
    info!(
        "Using provider {} (model {})",
        client.endpoint(),
        client.model()
    );

    let feed = match &file_config.transcript.path {
        Some(path) => match JsonlTranscriptSink::new(path) {
            Some(sink) => {
                info!("Writing transcript to {}", sink.path().display());
                ObservationFeed::with_sink(Arc::new(sink))
            }
            None => {
                warn!("Transcript disabled: could not open {}", path.display());
                ObservationFeed::new()
            }
        },
        None => ObservationFeed::new(),
    };

    let use_case = RunRoundtableUseCase::new(
        client,
        Arc::new(personas.clone()),
        Arc::new(feed),
        file_config.to_roundtable_config(),
    )
    .with_observer(observer_for(&cli));
    let registry = SessionRegistry::new(use_case);

    // Print header
    if !cli.quiet && cli.output == OutputFormat::Text {
        println!();
        println!("+============================================================+");
        println!("|               Roundtable - Advisory Panel                  |");
        println!("+============================================================+");
        println!();
        println!("Topic: {}", kickoff.text());
        println!();
    }

    let id = registry.create(kickoff)?;

    let session = tokio::select! {
        session = registry.wait(&id) => session?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, cancelling session {}", id);
            match registry.cancel(&id) {
                Ok(()) | Err(RegistryError::AlreadyTerminal { .. }) => {}
                Err(e) => return Err(e.into()),
            }
            registry.wait(&id).await?
        }
    };

    let turns = registry.feed().read_all(Some(&id));
    let formatter: Box<dyn TranscriptFormatter> = match cli.output {
        OutputFormat::Text => Box::new(ConsoleFormatter::new(personas)),
        OutputFormat::Json => Box::new(JsonFormatter),
    };
    println!("{}", formatter.format(&session, &turns));

    Ok(match session.state() {
        SessionState::Completed => ExitCode::SUCCESS,
        SessionState::Cancelled => ExitCode::from(EXIT_CANCELLED),
        _ => ExitCode::FAILURE,
    })
}

/// Install the global subscriber: stderr by default, a file with `--log-file`
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Load config files (unless disabled) and apply CLI overrides
fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    if let Some(timeout) = cli.timeout {
        config.roundtable.timeout_seconds = timeout;
    }
    if let Some(max_words) = cli.max_words {
        config.roundtable.max_words = max_words;
    }
    config.validate()?;

    Ok(config)
}

/// Bars on an interactive terminal, plain lines for piped text output,
/// nothing when quiet or when stdout carries JSON
fn observer_for(cli: &Cli) -> Arc<dyn TurnObserver> {
    if cli.quiet {
        Arc::new(NoTurnObserver)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ProgressReporter::new())
    } else if cli.output == OutputFormat::Text {
        Arc::new(SimpleProgress)
    } else {
        Arc::new(NoTurnObserver)
    }
}
