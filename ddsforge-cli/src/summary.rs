//! Console output: options banner and end-of-run summary.

use std::time::Duration;

use console::style;
use ddsforge::config::{to_megabytes, ConversionConfig};
use ddsforge::pipeline::{ConversionPlan, OutputTarget, RunReport};

/// Elapsed time as `m:ss`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Economy ratio as a percentage, `n/a` when undefined.
pub fn format_economy(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "n/a".to_string(),
    }
}

fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", to_megabytes(bytes))
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

fn describe_target(target: &OutputTarget) -> String {
    match target {
        OutputTarget::Directory(dir) => dir.display().to_string(),
        OutputTarget::Archive { path, .. } => format!("{} (zip)", path.display()),
        OutputTarget::MemoryArchive { path, capacity, .. } => format!(
            "{} (zip, built in memory, {} MB)",
            path.display(),
            capacity / (1024 * 1024)
        ),
    }
}

/// Print the options in effect for this run.
pub fn print_options(plan: &ConversionPlan, config: &ConversionConfig) {
    println!(
        "{} v{}",
        style("ddsforge").bold(),
        ddsforge::VERSION
    );
    println!();
    println!("Input:     {}", plan.input.display());
    println!("Output:    {}", describe_target(&plan.target));
    println!("Sources:   {}", plan.sources.len());
    println!("Threads:   {}", config.worker_count());
    println!("Backend:   {}", config.backend.name());
    println!(
        "Format:    {}",
        config
            .forced_format
            .map(|f| f.name().to_string())
            .unwrap_or_else(|| "auto".to_string())
    );
    println!("Mipmaps:   {}", on_off(config.mipmaps));
    println!("NPOT:      {}", on_off(config.allow_npot));
    if config.scale2x {
        println!("Scale 2x:  on ({})", config.scale_filter);
    }
    if plan.target.is_archive() {
        if !config.archive_prefix.is_empty() {
            println!("Prefix:    {}", config.archive_prefix);
        }
        println!("Cache:     off (archive output)");
    } else {
        println!("Cache:     {}", on_off(config.use_cache));
    }
    println!();
}

/// Print the end-of-run statistics.
pub fn print_summary(report: &RunReport, interrupted: bool) {
    let stats = &report.stats;

    println!();
    if interrupted {
        println!("{}", style("Conversion interrupted").yellow().bold());
    } else {
        println!("{}", style("Conversion complete").green().bold());
    }
    println!("  Files exported:   {}", report.files_exported());
    if stats.sources_unchanged > 0 {
        println!("  Unchanged:        {}", stats.sources_unchanged);
    }
    if stats.sources_failed > 0 || stats.frames_skipped > 0 || report.writer.failed > 0 {
        println!(
            "  {}",
            style(format!(
                "Failed: {} sources, {} frames, {} writes (see log)",
                stats.sources_failed, stats.frames_skipped, report.writer.failed
            ))
            .red()
        );
    }
    println!("  Elapsed:          {}", format_elapsed(report.elapsed));
    println!("  Input files:      {}", format_mb(stats.original_file_bytes));
    println!("  Input textures:   {}", format_mb(stats.original_texture_bytes));
    println!(
        "  DDS files:        {} (incl. mipmaps {})",
        format_mb(stats.output_bytes()),
        format_mb(stats.mip_bytes)
    );
    println!("  Space economy:    {}", format_economy(stats.space_economy()));
    println!("  VRAM economy:     {}", format_economy(stats.memory_economy()));
}
