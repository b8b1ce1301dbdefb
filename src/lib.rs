//! copyfinder - byte-exact duplicate file finder
//!
//! Walks a directory tree, buckets files by exact size, and clusters every
//! bucket into groups of byte-identical files on a worker pool. Each bucket's
//! groups are streamed to the consumer the moment that bucket is done, and a
//! running scan can be cancelled at any time.
//!
//! # Layout
//!
//! - [`scanner`]: directory traversal producing [`scanner::FileDescriptor`]s
//! - [`duplicates`]: size bucketing, the chunked comparator, clustering and
//!   the [`duplicates::DuplicateFinder`] pipeline
//! - [`controller`]: background sessions with start/cancel toggling
//! - [`events`]: what a session reports and the [`events::ResultSink`] seam
//! - [`output`], [`progress`], [`config`], [`cli`]: the command-line front-end

pub mod cancel;
pub mod cli;
pub mod config;
pub mod controller;
pub mod duplicates;
pub mod error;
pub mod events;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io;
use std::sync::Arc;

use anyhow::{bail, Context};

use cli::{Cli, Commands, ConfigArgs, OutputFormat, ScanArgs};
use config::Config;
use controller::{ScanController, StartOutcome};
use error::ExitCode;
use events::{Phase, ScanEvent, ScanOutcome};
use output::{EventPrinter, JsonOutput, TextOutput};
use progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unusable scan root, or
/// output failures. Normal outcomes (including "no duplicates" and
/// interruption) are reported through the returned [`ExitCode`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(Some(path)),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(ref args) => run_scan(&cli, args, config),
        Commands::Config(ref args) => run_config(&cli, args, &config),
    }
}

fn apply_scan_args(mut config: Config, args: &ScanArgs) -> anyhow::Result<Config> {
    if let Some(threads) = args.threads {
        config.threads = Some(threads as usize);
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if args.hide_singletons {
        config.report_singletons = false;
    }
    if args.skip_hidden {
        config.skip_hidden = true;
    }
    if args.min_size.is_some() {
        config.min_size = args.min_size;
    }
    if args.max_size.is_some() {
        config.max_size = args.max_size;
    }

    config.validate().context("Invalid scan options")?;
    Ok(config)
}

fn run_scan(cli: &Cli, args: &ScanArgs, config: Config) -> anyhow::Result<ExitCode> {
    let config = apply_scan_args(config, args)?;
    log::debug!("Effective configuration: {:?}", config);

    let progress = (!cli.quiet && !args.no_progress).then(|| Arc::new(Progress::new(false)));
    let mut finder_config = config.to_finder_config();
    if let Some(ref progress) = progress {
        finder_config = finder_config.with_progress_callback(progress.clone());
    }

    let (controller, events) = ScanController::new(finder_config);
    let controller = Arc::new(controller);

    let weak = Arc::downgrade(&controller);
    if let Err(e) = signal::install_handler(move || {
        if let Some(controller) = weak.upgrade() {
            controller.cancel();
        }
    }) {
        log::warn!("{}; Ctrl+C will terminate without cleanup", e);
    }

    let root = args.path.to_string_lossy().into_owned();
    if controller.start(&root)? == StartOutcome::NoPath {
        bail!("No directory given to scan");
    }

    let stdout = io::stdout();
    let mut printer: Box<dyn EventPrinter> = match args.output {
        OutputFormat::Text => Box::new(TextOutput::new(stdout.lock()).with_summary(!cli.quiet)),
        OutputFormat::Json => Box::new(JsonOutput::new(stdout.lock())),
    };

    let print = |printer: &mut Box<dyn EventPrinter>, event: &ScanEvent| match progress {
        Some(ref progress) => progress.suspend(|| printer.print_event(event)),
        None => printer.print_event(event),
    };

    printer.started(&root)?;
    let mut exit_code = ExitCode::GeneralError;
    for event in events.iter() {
        print(&mut printer, &event).context("Failed to write results")?;

        if let ScanEvent::PhaseChanged(Phase::Finished(report)) = event {
            if let Some(ref progress) = progress {
                progress.finish();
            }
            let summary = report.summary;
            exit_code = ExitCode::from_outcome(
                &report.outcome,
                summary.duplicate_groups,
                summary.skipped_entries + summary.failed_comparisons,
            );
            if let ScanOutcome::Failed(e) = report.outcome {
                signal::clear_handler();
                return Err(anyhow::Error::new(e).context(format!("Cannot scan {}", root)));
            }
            break;
        }
    }

    signal::clear_handler();
    log::debug!("Scan finished with exit code {}", exit_code.code_prefix());
    Ok(exit_code)
}

fn run_config(cli: &Cli, args: &ConfigArgs, config: &Config) -> anyhow::Result<ExitCode> {
    if args.write {
        let path = match cli.config.clone() {
            Some(path) => path,
            None => Config::default_path().context("No platform configuration directory")?,
        };
        config
            .save(&path)
            .with_context(|| format!("Failed to save configuration to {}", path.display()))?;
        println!("Configuration written to {}", path.display());
    } else {
        print!("{}", toml::to_string_pretty(config).context("Failed to render configuration")?);
    }
    Ok(ExitCode::Success)
}
