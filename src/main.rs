use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use num_format::{Locale, ToFormattedString as _};
use sheetbot::{
    entities::{RunOptions, RunResult},
    errors::PipelineError,
    util::SheetbotUtil,
};
use tracing_subscriber::EnvFilter;

/// Batch spreadsheet pipeline: validates, cleans and deduplicates input
/// files, then writes a benchmark report workbook and flat artifacts.
#[derive(Debug, Parser)]
#[command(name = "sheetbot", version, about)]
struct Cli {
    /// Enable DRY_RUN mode: no real email is ever sent.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true, value_name = "BOOL")]
    dry_run: bool,

    /// Do not open the report or log files after the run.
    #[arg(long)]
    no_open: bool,

    /// Alias for --no-open (useful for servers or CI).
    #[arg(long)]
    headless: bool,

    /// Working directory for the run (input/output folders live here).
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Settings file (default: $SHEETBOT_CONFIG, then ./config.json).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Users file (default: $SHEETBOT_USERS, then ./users.json).
    #[arg(long, value_name = "FILE")]
    users: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    match run(Cli::parse()).await {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, u8::MAX as i32) as u8),
        Err(e) => {
            tracing::error!(error = %e, "sheetbot failed before the pipeline started");
            ExitCode::from(e.exit_code().clamp(0, u8::MAX as i32) as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<RunResult, PipelineError> {
    if let Some(dir) = &cli.work_dir {
        std::env::set_current_dir(dir).map_err(|e| PipelineError::Read {
            path: dir.clone(),
            source: e,
        })?;
    }

    // Environment-style indirection is resolved here, once; components only
    // ever see the explicit settings object.
    let config_path = resolve_path(cli.config, "SHEETBOT_CONFIG", "config.json");
    let users_path = resolve_path(cli.users, "SHEETBOT_USERS", "users.json");

    let mut settings = SheetbotUtil::load_settings(&config_path).await?;
    if settings.log_path.is_none() {
        settings.log_path = std::env::var_os("SHEETBOT_LOG_PATH").map(PathBuf::from);
    }
    let users = SheetbotUtil::load_users(&users_path).await?;

    for dir in [&settings.paths.input_dir, &settings.paths.output_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PipelineError::Write {
                path: dir.clone(),
                detail: e.to_string(),
            })?;
    }

    let mode_label = if cli.dry_run {
        "DRY RUN (safe test)"
    } else {
        "LIVE RUN"
    };
    tracing::info!(mode = mode_label, "running sheetbot pipeline");

    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    let util = SheetbotUtil::new(settings, users, options);
    let result = util.run().await;

    print_summary(&util, &result, mode_label);

    if result.is_success() && !(cli.no_open || cli.headless) {
        if let Some(report) = result.report_path.as_deref().filter(|p| p.exists()) {
            open_with_default_app(report);
        }
        if util.log_path().exists() {
            open_with_default_app(util.log_path());
        }
    }
    Ok(result)
}

fn resolve_path(cli_value: Option<PathBuf>, env_var: &str, fallback: &str) -> PathBuf {
    cli_value
        .or_else(|| std::env::var_os(env_var).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(fallback))
}

fn print_summary(util: &SheetbotUtil, result: &RunResult, mode_label: &str) {
    println!("\nRun summary");
    println!("- Mode: {}", mode_label);
    println!("- Input folder: {}", util.settings().paths.input_dir.display());
    println!("- Output folder: {}", util.settings().paths.output_dir.display());
    match &result.report_path {
        Some(path) => println!("- Report file: {}", path.display()),
        None => println!("- Report file: none"),
    }
    println!("- Log file: {}", util.log_path().display());
    println!(
        "- Cleaned rows: {}",
        result.cleaned_rows.to_formatted_string(&Locale::en)
    );
    println!(
        "- Rejected rows/files: {}",
        result.reject_count.to_formatted_string(&Locale::en)
    );
    match util.last_event() {
        Some(event) => println!(
            "- Last event: {} ({}) at {}: {}",
            event.stage, event.status, event.timestamp, event.detail
        ),
        None => println!("- Last event: none yet"),
    }
    if result.exit_code == sheetbot::errors::EXIT_NO_VALID_ROWS {
        println!("\nRun stopped because no valid input data was available after validation.");
        println!("Check input files and review the data quality diagnostics if present.");
    }
}

/// Best-effort platform opener; a failure here never affects the exit code.
fn open_with_default_app(path: &Path) {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    };
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = std::process::Command::new("open");
        c.arg(path);
        c
    };
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = {
        let mut c = std::process::Command::new("xdg-open");
        c.arg(path);
        c
    };
    if let Err(e) = command.spawn() {
        tracing::warn!(path = %path.display(), error = %e, "failed to open file");
    }
}
