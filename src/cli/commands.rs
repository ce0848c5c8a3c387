//! Command implementations for the Bro log processor CLI
//!
//! This module contains the command execution logic, progress reporting and
//! summary output for the CLI interface.

use crate::app::models::underscore_field_name;
use crate::app::services::log_parser::{LogParser, RowTransform, ScanStats, UnsetValueNormalizer};
use crate::cli::args::{Args, Commands, CountArgs, ExtractArgs, FieldsArgs};
use crate::cli::output::RowWriter;
use crate::config::ProcessorConfig;
use crate::{Error, Result};
use colored::*;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Rows between progress spinner updates
const PROGRESS_UPDATE_INTERVAL: u64 = 1024;

/// Main command runner
///
/// Sets up logging, loads the layered configuration and dispatches to the
/// selected subcommand.
pub async fn run(args: Args, cancellation_token: CancellationToken) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let config = load_configuration(&args)?;

    match &args.command {
        Some(Commands::Fields(fields_args)) => run_fields(fields_args, &config),
        Some(Commands::Count(count_args)) => run_count(count_args, &config),
        Some(Commands::Extract(extract_args)) => {
            let stats = run_extract(&args, extract_args, config, cancellation_token).await?;
            debug!("Extraction stats: {:?}", stats);
            Ok(())
        }
        None => Err(Error::configuration("No command specified")),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("brolog_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (file -> env), falling back
/// to the default config location when no file is given
fn load_configuration(args: &Args) -> Result<ProcessorConfig> {
    let default_config_path = if args.config_file.is_none() {
        ProcessorConfig::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    match config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults and environment variables"),
    }

    ProcessorConfig::load_layered(config_file)
}

/// Print the columns of a log's #fields directive
fn run_fields(args: &FieldsArgs, config: &ProcessorConfig) -> Result<()> {
    let parser = LogParser::with_config(&args.log_file, true, config.clone())?;
    let header = parser.header()?;

    if header.is_empty() {
        eprintln!(
            "{} no {} directive in {}",
            "warning:".yellow().bold(),
            config.fields_directive,
            args.log_file.display()
        );
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for field in header.fields() {
        if args.underscore {
            writeln!(out, "{}", underscore_field_name(field))?;
        } else {
            writeln!(out, "{}", field)?;
        }
    }
    Ok(())
}

/// Print the number of lines in a log
fn run_count(args: &CountArgs, config: &ProcessorConfig) -> Result<()> {
    let parser = LogParser::with_config(&args.log_file, true, config.clone())?;
    let count = parser.count_lines()?;
    println!("{}", count);
    Ok(())
}

/// Stream the selected columns of a log to the chosen output
async fn run_extract(
    args: &Args,
    extract: &ExtractArgs,
    mut config: ProcessorConfig,
    cancellation_token: CancellationToken,
) -> Result<ScanStats> {
    let start_time = Instant::now();
    extract.validate()?;

    if let Some(capacity) = extract.buffer_capacity {
        config = config.with_buffer_capacity(capacity);
    }
    let separator = config.separator;

    let mut parser = LogParser::with_config(&extract.log_file, extract.all_fields(), config)?;
    if let Some(field_list) = &extract.fields {
        parser.set_fields(field_list.fields.clone());
        parser.resolve_indices()?;
    }

    let capacity = parser.create_configured_buffer()?;
    debug!("Row buffer capacity: {}", capacity);

    let transform: Option<Arc<dyn RowTransform>> = if extract.normalize_unset {
        Some(Arc::new(UnsetValueNormalizer::from_config(parser.config())))
    } else {
        None
    };

    let mut stream = parser.start_with_options(transform, cancellation_token)?;

    let output_names: Vec<String> = if extract.underscore_names {
        stream
            .field_names()
            .iter()
            .map(|name| underscore_field_name(name))
            .collect()
    } else {
        stream.field_names().to_vec()
    };

    let out: Box<dyn Write> = match &extract.output_file {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            Error::io(format!("Failed to create {}", path.display()), e)
        })?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let mut writer = RowWriter::new(extract.format, out, &output_names, separator)?;

    let progress = if args.show_progress() && extract.output_file.is_some() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} rows {msg}")
                .map_err(|e| Error::configuration(format!("Invalid progress template: {}", e)))?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut written: u64 = 0;
    while let Some(row) = stream.next_row().await {
        writer.write_row(&row?)?;
        written += 1;
        if let Some(pb) = &progress {
            if written % PROGRESS_UPDATE_INTERVAL == 0 {
                pb.set_position(written);
            }
        }
    }
    writer.flush()?;

    let stats = stream.finish().await?;

    if let Some(pb) = &progress {
        pb.set_position(written);
        pb.finish_with_message("done");
    }

    if args.show_progress() {
        print_summary(extract, &stats, start_time.elapsed());
    }

    Ok(stats)
}

/// Print a human-readable extraction summary to stderr
fn print_summary(extract: &ExtractArgs, stats: &ScanStats, elapsed: Duration) {
    eprintln!(
        "{} {} rows from {} in {}",
        "Extracted".bright_green().bold(),
        stats.rows_emitted.to_string().bright_cyan(),
        extract.log_file.display(),
        HumanDuration(elapsed)
    );

    if stats.mismatched_rows > 0 {
        eprintln!(
            "  {} {} rows with mismatched columns ({:.1}% emitted)",
            "skipped".yellow(),
            stats.mismatched_rows,
            stats.emission_rate()
        );
    }

    if stats.transform_fallbacks > 0 {
        eprintln!(
            "  {} {} rows emitted untransformed",
            "fallback".yellow(),
            stats.transform_fallbacks
        );
    }
}
