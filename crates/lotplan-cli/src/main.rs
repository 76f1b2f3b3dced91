//! lotplan CLI - production plan normalizer
//!
//! Reads a room/lot plan exported from a spreadsheet, cleans it into
//! timeline entries and renders it as a table, chart, dashboard or
//! workbook.

mod check;
mod config;
mod diagnostics;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lotplan_core::{Normalizer, Renderer, Schedule};
use lotplan_normalize::ScheduleNormalizer;
use lotplan_render::{ExcelRenderer, HtmlDashboardRenderer, SvgRenderer, TableRenderer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Overrides, Settings};
use crate::diagnostics::{DiagnosticConfig, ExitCode, JsonEmitter, TerminalEmitter};

#[derive(Parser)]
#[command(name = "lotplan")]
#[command(author, version, about = "Production plan normalizer and timeline renderer", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (defaults to ./lotplan.toml when present)
    #[arg(long, global = true, env = "LOTPLAN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Match headers by substring instead of exact name
    #[arg(long, global = true)]
    fuzzy: bool,

    /// Read ambiguous dates as DD/MM/YYYY
    #[arg(long, global = true)]
    day_first: bool,

    /// Fail on the first run time that is not a number
    #[arg(long, global = true)]
    abort_on_bad_duration: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cleaned table
    Preview {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Draw the timeline (.svg chart or .html dashboard)
    Chart {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file; the extension picks the format
        #[arg(short, long)]
        output: PathBuf,

        /// Show the Monday-Sunday week of the earliest start
        #[arg(long)]
        week: bool,

        /// Hours between axis ticks
        #[arg(long, value_name = "N")]
        tick_hours: Option<u32>,

        #[arg(long)]
        title: Option<String>,

        /// Draw every bar in one colour
        #[arg(long)]
        no_color: bool,
    },

    /// Report dropped rows, overlaps and missing columns
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Warnings become errors, hints become warnings
        #[arg(long)]
        strict: bool,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,

        /// Flag entries outside the calendar week
        #[arg(long)]
        week: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write the cleaned table to an .xlsx workbook
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut overrides = Overrides {
        fuzzy: cli.fuzzy,
        day_first: cli.day_first,
        abort_on_bad_duration: cli.abort_on_bad_duration,
        ..Overrides::default()
    };

    match cli.command {
        Commands::Preview { file, format } => {
            let settings = settings(cli.config.as_deref(), &overrides)?;
            preview(&file, &settings, format)?;
        }
        Commands::Chart {
            file,
            output,
            week,
            tick_hours,
            title,
            no_color,
        } => {
            overrides.week = week;
            overrides.tick_hours = tick_hours;
            overrides.title = title;
            overrides.no_color = no_color;
            let settings = settings(cli.config.as_deref(), &overrides)?;
            chart(&file, &output, &settings)?;
        }
        Commands::Check {
            file,
            strict,
            quiet,
            week,
            format,
        } => {
            overrides.week = week;
            let settings = settings(cli.config.as_deref(), &overrides)?;
            let config = DiagnosticConfig {
                strict,
                quiet,
                base_path: std::env::current_dir().ok(),
            };
            return Ok(run_check(&file, &settings, config, format)?.into());
        }
        Commands::Export { file, output } => {
            let settings = settings(cli.config.as_deref(), &overrides)?;
            export(&file, &output, &settings)?;
        }
    }

    Ok(std::process::ExitCode::SUCCESS)
}

/// `RUST_LOG` wins; otherwise `-v` picks the level
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn settings(explicit: Option<&Path>, overrides: &Overrides) -> Result<Settings> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let mut settings = Settings::load(explicit, &cwd)?;
    settings.apply(overrides);
    Ok(settings)
}

fn load_schedule(file: &Path, settings: &Settings) -> Result<Schedule> {
    let table = lotplan_parser::load_file(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let schedule = ScheduleNormalizer::with_options(settings.normalize.clone())
        .normalize(&table)
        .with_context(|| format!("failed to normalize {}", file.display()))?;
    if !schedule.rejected.is_empty() {
        tracing::warn!(
            dropped = schedule.rejected.len(),
            "some rows were left out, run `lotplan check` for details"
        );
    }
    Ok(schedule)
}

fn preview(file: &Path, settings: &Settings, format: OutputFormat) -> Result<()> {
    let schedule = load_schedule(file, settings)?;
    match format {
        OutputFormat::Text => print!("{}", TableRenderer.render(&schedule)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&schedule)?),
    }
    Ok(())
}

fn chart(file: &Path, output: &Path, settings: &Settings) -> Result<()> {
    let schedule = load_schedule(file, settings)?;
    let svg = SvgRenderer::new()
        .title(settings.title_for(file))
        .layout(settings.layout.clone());

    let extension = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let rendered = match extension.as_str() {
        "svg" => svg.render(&schedule)?,
        "html" | "htm" => HtmlDashboardRenderer::new().chart(svg).render(&schedule)?,
        other => bail!("unsupported chart format {other:?} (use .svg or .html)"),
    };

    std::fs::write(output, rendered)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(output = %output.display(), entries = schedule.entries.len(), "chart written");
    Ok(())
}

fn export(file: &Path, output: &Path, settings: &Settings) -> Result<()> {
    let is_xlsx = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if !is_xlsx {
        bail!("export writes .xlsx workbooks, got {}", output.display());
    }

    let schedule = load_schedule(file, settings)?;
    let bytes = ExcelRenderer::new().render(&schedule)?;
    std::fs::write(output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(output = %output.display(), entries = schedule.entries.len(), "workbook written");
    Ok(())
}

fn run_check(
    file: &Path,
    settings: &Settings,
    config: DiagnosticConfig,
    format: OutputFormat,
) -> Result<ExitCode> {
    match format {
        OutputFormat::Text => {
            let stderr = std::io::stderr();
            let mut emitter = TerminalEmitter::new(stderr.lock(), config);
            check::check_file(file, settings, &mut emitter);
            Ok(emitter.exit_code())
        }
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::new(config.clone());
            check::check_file(file, settings, &mut emitter);
            let code = emitter.exit_code();
            let report = serde_json::json!({
                "file": config.normalize_path(file),
                "exit_code": code.code(),
                "diagnostics": emitter.to_json_value(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(code)
        }
    }
}
