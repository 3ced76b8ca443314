mod helper;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use pdfsh_application::{CommandOutcome, CommandStatus, OutputLine, Shell, ShellServices};
use pdfsh_core::config::{BackendProvider, SecretConfig, ShellConfig};
use pdfsh_core::history::History;
use pdfsh_core::session::Session;
use pdfsh_infrastructure::storage::with_env_fallback;
use pdfsh_infrastructure::{
    ConfigStorage, FileHistoryStore, PdfshPaths, PopplerExtractor, SecretStorage,
    SystemProcessRunner,
};
use pdfsh_interaction::{GoogleDriveClient, GoogleSheetsClient, create_backend};

use crate::helper::ShellHelper;

const PROMPT: &str = "pdfsh> ";

#[derive(Parser, Debug)]
#[command(name = "pdfsh")]
#[command(version, about = "Interactive shell for analyzing PDF documents", long_about = None)]
struct Args {
    /// Path to config.toml (default: <config dir>/pdfsh/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the persisted command history
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Analysis backend, overriding the config file
    #[arg(long, value_name = "local|claude")]
    backend: Option<BackendProvider>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let paths = PdfshPaths::new(None)?;

    // Kept alive for the whole run so buffered log lines are flushed on exit.
    let _log_guard = init_tracing(&paths.logs_dir(), &args.log_level)?;
    tracing::info!("[Main] Starting pdfsh v{}", env!("CARGO_PKG_VERSION"));

    let working_dir = std::env::current_dir().context("Failed to read the current directory")?;
    let mut shell = build_shell(&args, &paths, &working_dir)?;

    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ShellHelper::new(&working_dir)));
    for entry in shell.session().history().iter() {
        let _ = rl.add_history_entry(entry.command_text.as_str());
    }

    render(&shell.banner());
    println!();

    while !shell.is_exited() {
        shell.begin_reading();
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                let outcome = tokio::select! {
                    outcome = shell.execute(&line) => Some(outcome),
                    _ = tokio::signal::ctrl_c() => None,
                };

                match outcome {
                    Some(outcome) => show(&mut rl, &outcome)?,
                    None => {
                        shell.abort_dispatch();
                        println!("{}", "Command interrupted".yellow());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'exit' or press CTRL-D to quit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                shell.end_of_input();
                println!("{}", "Goodbye!".bright_green());
            }
            Err(err) => {
                tracing::error!("[Main] Readline failed: {}", err);
                eprintln!("{}", format!("Error: {err}").red());
                shell.end_of_input();
            }
        }
    }

    tracing::info!("[Main] Exiting");
    Ok(())
}

fn init_tracing(logs_dir: &Path, log_level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(logs_dir, "pdfsh.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    Ok(guard)
}

fn build_shell(args: &Args, paths: &PdfshPaths, working_dir: &Path) -> Result<Shell> {
    let config = load_config(args, paths)?;
    let secrets = load_secrets(paths);

    let history_path = args
        .history_file
        .clone()
        .unwrap_or_else(|| paths.history_file());
    let store = FileHistoryStore::open(&history_path)
        .with_context(|| format!("Failed to open history file {}", history_path.display()))?;
    let history = History::load(Box::new(store), config.history.max_entries)
        .with_context(|| format!("Failed to load history from {}", history_path.display()))?;

    let session = Session::new(Arc::new(PopplerExtractor::new()), history);

    let backend = create_backend(&config.backend, &secrets);
    let runner = SystemProcessRunner::new().with_working_dir(working_dir);
    let mut services = ShellServices::new(backend, Arc::new(runner));

    if let Some(token) = secrets.google_access_token() {
        let drive = GoogleDriveClient::new(token).with_folder(config.google.drive_folder_id.clone());
        services = services.with_cloud_storage(Arc::new(drive));

        if let Some(sheet_id) = &config.google.sheet_id {
            services = services.with_spreadsheet(Arc::new(GoogleSheetsClient::new(token)), sheet_id);
        }
    } else {
        tracing::info!("[Main] No Google access token, Drive and Sheets disabled");
    }

    tracing::info!(
        "[Main] Using {} backend in {}",
        services.backend_name(),
        working_dir.display()
    );
    Ok(Shell::new(session, services, working_dir))
}

fn load_config(args: &Args, paths: &PdfshPaths) -> Result<ShellConfig> {
    let path = args.config.clone().unwrap_or_else(|| paths.config_file());
    let mut config = ConfigStorage::new(&path)
        .load()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    if let Some(provider) = args.backend {
        config.backend.provider = provider;
    }
    Ok(config)
}

/// A broken secret file disables the credentials it holds; the environment
/// still applies.
fn load_secrets(paths: &PdfshPaths) -> SecretConfig {
    SecretStorage::new(paths.secret_file())
        .load()
        .unwrap_or_else(|e| {
            tracing::warn!("[Main] Ignoring secret file: {}", e);
            eprintln!("{}", format!("Warning: {e}").yellow());
            with_env_fallback(SecretConfig::default(), |key| std::env::var(key).ok())
        })
}

fn show(rl: &mut Editor<ShellHelper, DefaultHistory>, outcome: &CommandOutcome) -> Result<()> {
    if outcome.status == CommandStatus::Clear {
        rl.clear_screen()?;
    }
    render(&outcome.lines);
    Ok(())
}

fn render(lines: &[OutputLine]) {
    for line in lines {
        match line {
            OutputLine::Heading(text) => println!("{}", text.bright_magenta().bold()),
            OutputLine::Info(text) => println!("{}", text.bright_black()),
            OutputLine::Success(text) => println!("{}", text.green()),
            OutputLine::Warning(text) => println!("{}", text.yellow()),
            OutputLine::Error(text) => eprintln!("{}", text.red()),
            OutputLine::Body(text) => println!("{text}"),
        }
    }
}
