use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gcf_delete::backend::gcp::GcpBackend;
use gcf_delete::config::Config;
use gcf_delete::delete::{self, confirm::TerminalPrompt, filter::Filter, DeleteOptions};
use gcf_delete::gcp::auth::{self, GcpCredentials};
use gcf_delete::gcp::client::GcpClient;
use gcf_delete::DeleteError;
use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Version injected at compile time via GCF_DELETE_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("GCF_DELETE_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Delete one or more Cloud Functions by name or group name
#[derive(Parser, Debug)]
#[command(name = "gcf-delete", version = VERSION, about, long_about = None)]
struct Args {
    /// Function or group names; dot notation selects a function inside a group
    filters: Vec<String>,

    /// GCP project to use
    #[arg(short, long)]
    project: Option<String>,

    /// Only delete functions in this region. If omitted, matching functions
    /// from all regions are deleted
    #[arg(long)]
    region: Option<String>,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    force: bool,

    /// Never prompt; requires --force to delete anything
    #[arg(long)]
    non_interactive: bool,

    /// Number of functions deleted in parallel
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcf-delete {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcf-delete").join("gcf-delete.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcf-delete").join("gcf-delete.log");
    }
    PathBuf::from("gcf-delete.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: Failed to delete functions: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Wire the real collaborators together and run the command
async fn run(args: Args) -> Result<ExitCode> {
    // Bad filters are reported before any credentials are needed
    if let Err(err) = Filter::parse_all(&args.filters) {
        return Ok(report_failure(&err));
    }

    let config = Config::load();

    let credentials = GcpCredentials::new()
        .await
        .context("Failed to initialize GCP credentials")?;

    let project = match config.effective_project(args.project.as_deref()) {
        Some(project) => project,
        None => credentials.project_id().await.context(
            "No GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project flag",
        )?,
    };
    if !auth::validate_project_id(&project) {
        tracing::warn!("Project id {} does not look like a GCP project id", project);
    }
    tracing::info!("Using project: {}", project);

    let client = GcpClient::with_credentials(&project, config.endpoints(), credentials)?;
    let backend = GcpBackend::new(client, config.poll_settings());

    let options = DeleteOptions {
        project,
        filters: args.filters,
        region: args.region,
        force: args.force,
        concurrency: config.effective_concurrency(args.concurrency),
    };
    let mut prompt = TerminalPrompt::stdio(args.non_interactive);

    match delete::run(&options, &backend, &backend, &backend, &mut prompt).await {
        Ok(report) => {
            report.print();
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Ok(report_failure(&err)),
    }
}

fn report_failure(err: &DeleteError) -> ExitCode {
    if let Some(report) = err.report() {
        report.print();
    }

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {}", cause));
        source = cause.source();
    }

    tracing::error!("{}", message);
    eprintln!("Error: Failed to delete functions: {}", message);
    ExitCode::from(err.exit_code())
}
