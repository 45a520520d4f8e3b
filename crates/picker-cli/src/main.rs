//! `picker` CLI: inspect what a date/time picker would offer for a config.
//!
//! The config is the picker's JSON props object (`value`, `minDate`,
//! `maxDate`, `blocks`, `endMode`, ...), read from `-c FILE` or stdin.
//!
//! ## Usage
//!
//! ```sh
//! # Render the day grid around the configured value
//! echo '{"value":"2024-03-04","blocks":[{"type":"weekday","day":"Mon"}]}' | picker grid
//!
//! # The same grid as JSON cells
//! picker -c picker.json grid --mode month --json
//!
//! # Nearest selectable value
//! picker -c picker.json nearest --value 2024-03-04T09:00 --granularity minute
//!
//! # Is a value selectable?
//! picker -c picker.json check --value 2024-03-04 --granularity day
//!
//! # Merged blocked time spans of a day
//! picker -c picker.json spans --date 2024-03-04
//! ```
//!
//! Set `RUST_LOG=debug` to see index rebuilds and search escalation on stderr.

use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use picker_engine::calendar::parse_instant;
use picker_engine::index::{year_grid, year_page_start};
use picker_engine::{
    find_nearest, materialize, AvailabilityIndex, BlockedSpan, Cell, CellKind, Cycle, DateIndex,
    Granularity, PickerConfig, TimeIndex,
};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Parser)]
#[command(name = "picker", version, about = "Date/time picker availability inspector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Picker config JSON file (reads from stdin if omitted)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// IANA timezone deciding "now" when the config has no value
    #[arg(long, global = true, default_value = "UTC")]
    timezone: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the grid of one granularity
    Grid {
        /// day, week, month, year, hour, minute or cycle
        #[arg(short, long, default_value = "day")]
        mode: Granularity,
        /// Instant the grid is anchored on (defaults to the config value)
        #[arg(short, long)]
        anchor: Option<String>,
    },
    /// Find the nearest selectable value
    Nearest {
        #[arg(long)]
        value: Option<String>,
        #[arg(short, long, default_value = "day")]
        granularity: Granularity,
    },
    /// Report whether a value is selectable
    Check {
        #[arg(long)]
        value: Option<String>,
        #[arg(short, long, default_value = "day")]
        granularity: Granularity,
    },
    /// List the merged blocked time spans of a day
    Spans {
        #[arg(short, long)]
        date: Option<String>,
    },
}

#[derive(Serialize)]
struct GridOutput<'a> {
    granularity: Granularity,
    columns: usize,
    cells: &'a [Cell],
}

#[derive(Serialize)]
struct CheckOutput {
    value: String,
    granularity: Granularity,
    disabled: bool,
}

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let tz: Tz = cli
        .timezone
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", cli.timezone, e))?;
    let now = Utc::now().with_timezone(&tz).naive_local();

    let raw = read_config(cli.config.as_deref())?;
    let config = PickerConfig::from_json(&raw).context("Invalid picker config")?;
    let constraints = config.constraints()?;
    let default_value = config.initial_value(now)?;
    log::debug!("picker config loaded, default value {}", default_value);

    let resolve = |value: Option<&str>| -> Result<NaiveDateTime> {
        match value {
            Some(s) => parse_instant(s).with_context(|| format!("Invalid instant: {}", s)),
            None => Ok(default_value),
        }
    };

    match cli.command {
        Commands::Grid { mode, anchor } => {
            let anchor = resolve(anchor.as_deref())?;
            let reference_year = config.date_options(now).reference_year;
            let (columns, cells) = grid_cells(anchor, mode, &constraints, reference_year);
            if cli.json {
                let out = GridOutput {
                    granularity: mode,
                    columns,
                    cells: &cells,
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", render_grid(anchor, mode, columns, &cells));
            }
        }
        Commands::Nearest { value, granularity } => {
            let value = resolve(value.as_deref())?;
            let index = AvailabilityIndex::build(value, granularity.mode(), &constraints);
            let found = find_nearest(value, granularity, &index, &constraints);
            if cli.json {
                let found = found.map(|v| v.format(INSTANT_FORMAT).to_string());
                println!("{}", serde_json::to_string(&found)?);
            } else {
                match found {
                    Some(v) => println!("{}", v.format(INSTANT_FORMAT)),
                    None => anyhow::bail!("No selectable value near {}", value.format(INSTANT_FORMAT)),
                }
            }
        }
        Commands::Check { value, granularity } => {
            let value = resolve(value.as_deref())?;
            let disabled = constraints.is_disabled(value, granularity);
            if cli.json {
                let out = CheckOutput {
                    value: value.format(INSTANT_FORMAT).to_string(),
                    granularity,
                    disabled,
                };
                println!("{}", serde_json::to_string(&out)?);
            } else {
                let verdict = if disabled { "disabled" } else { "enabled" };
                println!("{} {} at {}", value.format(INSTANT_FORMAT), verdict, granularity);
            }
        }
        Commands::Spans { date } => {
            let day = resolve(date.as_deref())?.date();
            let spans = materialize(&constraints.rules, day);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&spans)?);
            } else if spans.is_empty() {
                println!("{}: no blocked time", day);
            } else {
                print!("{}", render_spans(&spans));
            }
        }
    }

    Ok(())
}

fn read_config(path: Option<&str>) -> Result<String> {
    let raw = match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?
        }
        None if io::stdin().is_terminal() => String::new(),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    // No config at all means an unconstrained picker.
    if raw.trim().is_empty() {
        return Ok("{}".to_string());
    }
    Ok(raw)
}

/// Column count and cells of the grid for `mode`.
fn grid_cells(
    anchor: NaiveDateTime,
    mode: Granularity,
    constraints: &std::sync::Arc<picker_engine::Constraints>,
    reference_year: i32,
) -> (usize, Vec<Cell>) {
    match mode {
        Granularity::Day | Granularity::Week => (7, DateIndex::build(anchor, constraints).day_grid(anchor.month())),
        Granularity::Month => (4, DateIndex::build(anchor, constraints).month_grid()),
        Granularity::Year => {
            let index = DateIndex::build(anchor, constraints);
            (4, year_grid(year_page_start(anchor.year(), reference_year), &index))
        }
        Granularity::Hour => (
            6,
            TimeIndex::build(anchor, constraints).hour_column(Cycle::of_hour(anchor.hour())),
        ),
        Granularity::Minute => (10, TimeIndex::build(anchor, constraints).minute_column(anchor.hour())),
        Granularity::Cycle => (2, TimeIndex::build(anchor, constraints).cycle_column()),
    }
}

/// Text rendering: one row per `columns` cells, disabled values marked `x`.
fn render_grid(anchor: NaiveDateTime, mode: Granularity, columns: usize, cells: &[Cell]) -> String {
    let title = match mode {
        Granularity::Day | Granularity::Week => anchor.format("%B %Y").to_string(),
        Granularity::Month => anchor.format("%Y").to_string(),
        Granularity::Year => match (cells.first(), cells.last()) {
            (Some(first), Some(last)) => format!("{}-{}", first.value.year(), last.value.year()),
            _ => String::new(),
        },
        _ => anchor.format("%Y-%m-%d %H:00").to_string(),
    };

    let mut out = format!("{}\n", title);
    for row in cells.chunks(columns.max(1)) {
        let line: Vec<String> = row.iter().map(|cell| label(cell, mode)).collect();
        out.push_str(line.join(" ").trim_end());
        out.push('\n');
    }
    out
}

fn label(cell: &Cell, mode: Granularity) -> String {
    let text = match cell.kind {
        CellKind::Header(weekday) => return format!("{:<3}", &weekday.to_string()[..2]),
        CellKind::Empty => return "   ".to_string(),
        CellKind::Value => match mode {
            Granularity::Day | Granularity::Week => format!("{:>2}", cell.value.day()),
            Granularity::Month => cell.value.format("%b").to_string(),
            Granularity::Year => cell.value.year().to_string(),
            Granularity::Hour => format!("{:>2}", picker_engine::granularity::twelve_hour_numeral(cell.value.hour())),
            Granularity::Minute => format!("{:02}", cell.value.minute()),
            Granularity::Cycle => Cycle::of_hour(cell.value.hour()).to_string(),
        },
    };
    let mark = if cell.disabled { 'x' } else { ' ' };
    format!("{}{}", text, mark)
}

fn render_spans(spans: &[BlockedSpan]) -> String {
    spans
        .iter()
        .map(|span| {
            format!(
                "{}-{} ({} min)\n",
                span.from.format("%H:%M"),
                span.to.format("%H:%M"),
                span.minutes()
            )
        })
        .collect()
}
