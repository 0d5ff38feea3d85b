// gantry/src/main.rs
use std::fs;
use std::process;

use clap::Parser;
use colored::Colorize;
use gantry_common::config::Config;
use gantry_common::error::Result as GantryResult;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::CliArgs;

fn init_logging(config: &Config, verbose: u8) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let level_filter = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let max_log_level = level_filter.into_level().unwrap_or(tracing::Level::INFO);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("GANTRY_LOG")
        .from_env_lossy();

    let log_dir = config.logs_dir();
    if verbose == 0 {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .without_time()
            .try_init();
        return None;
    }

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!(
            "{} Failed to create log directory {}: {}",
            "Warning:".yellow().bold(),
            log_dir.display(),
            e
        );
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .without_time()
            .try_init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "gantry.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);

    // Verbose mode shows debug/trace logs on stderr too
    let stderr_writer = std::io::stderr.with_max_level(max_log_level);
    let file_writer = non_blocking_appender.with_max_level(max_log_level);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr_writer.and(file_writer))
        .with_ansi(true)
        .without_time()
        .try_init();

    debug!(
        "Verbose logging enabled. Writing logs to: {}/gantry.log",
        log_dir.display()
    );
    Some(guard)
}

fn main() -> GantryResult<()> {
    let cli_args = CliArgs::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: Could not load configuration: {}", "Error".red().bold(), e);
            process::exit(2);
        }
    };

    let guard = init_logging(&config, cli_args.verbose);

    if let Err(e) = cli_args.command.run(config) {
        error!("Command failed: {:#}", e);
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        // Flush the file appender before exiting.
        drop(guard);
        process::exit(1);
    }

    debug!("Command completed successfully.");
    Ok(())
}
