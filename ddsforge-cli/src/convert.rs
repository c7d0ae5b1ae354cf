//! The conversion command.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use ddsforge::config::ConfigFile;
use ddsforge::logging::{default_log_dir, default_log_file, init_logging};
use ddsforge::pipeline::{ConversionProgress, Converter, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::error::CliError;
use crate::options::{build_config, ConvertArgs};
use crate::summary::{print_options, print_summary};

fn load_config_file(args: &ConvertArgs) -> Result<ConfigFile, CliError> {
    match &args.config {
        Some(path) if !path.exists() => Err(CliError::Config(format!(
            "config file '{}' not found",
            path.display()
        ))),
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    bar.set_style(style);
    bar
}

/// Run a conversion.
pub fn run(args: ConvertArgs) -> Result<(), CliError> {
    let file = load_config_file(&args)?;

    let log_dir = args.log_dir.clone().unwrap_or_else(default_log_dir);
    let _logging = init_logging(&log_dir, default_log_file(), !args.quiet)?;
    info!(version = ddsforge::VERSION, "ddsforge starting");

    let config = build_config(&args, &file);
    let converter = Converter::new(config);
    let plan = converter.plan(&args.input, args.output.as_deref())?;

    if !args.quiet {
        print_options(&plan, converter.config());
    }

    let stop = converter.stop_handle();
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, finishing files in progress...");
        handler_stop.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let progress = Arc::new(ConversionProgress::new());
    let bar = (!args.quiet).then(|| progress_bar(plan.sources.len()));
    let reporter = bar.clone().map(|bar| {
        ProgressReporter::start_default(
            Arc::clone(&progress),
            Box::new(move |snapshot| {
                bar.set_length(snapshot.total as u64);
                bar.set_position(snapshot.processed as u64);
            }),
        )
    });

    let result = converter.run(plan, &progress);

    if let Some(reporter) = reporter {
        reporter.finish();
    }
    if let Some(bar) = &bar {
        bar.finish();
    }

    let report = result?;
    if !args.quiet {
        print_summary(&report, stop.load(Ordering::SeqCst));
    }
    Ok(())
}
