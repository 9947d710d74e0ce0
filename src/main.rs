//! Seismicity Analysis Service - CLI
//!
//! Loads the GEoREST induced seismicity catalog and the region table, then:
//! 1. Estimates event rates for a region and date window
//! 2. Summarizes magnitudes, per-country activity and alerts
//! 3. Exports heat/region map layers and chart tables
//! 4. Builds a marker map for one country
//! 5. Serves the same queries over HTTP
//!
//! Usage:
//!   cargo run -- rate --region "Region A" --start 2023-01-01 --end 2023-12-31
//!   cargo run -- summary
//!   cargo run -- export --out output
//!   cargo run -- country Spain
//!   cargo run -- serve --port 8080
//!
//! Environment:
//!   SEISMON_DATA_URL  - catalog URL (overrides seismon.toml)
//!   SEISMON_DATA_PATH - local catalog file (overrides seismon.toml)
//!   RUST_LOG          - log filter (default: info)

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use seismon_service::analysis::groupings::{events_in_country, map_center};
use seismon_service::analysis::rate::RateEstimator;
use seismon_service::analysis::summarize;
use seismon_service::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_REGIONS_PATH, RegionFile};
use seismon_service::endpoint::{ServiceState, start_endpoint_server};
use seismon_service::ingest::{RegionSource, source_from_config};
use seismon_service::model::{Event, EventStore};
use seismon_service::regions::RegionCatalog;
use seismon_service::render::{self, geojson};

/// Induced seismicity catalog analysis: event rates, summaries, map exports.
#[derive(Debug, Parser)]
#[command(name = "seismon", version, about)]
struct Cli {
    /// Service settings file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Region table
    #[arg(long, global = true, default_value = DEFAULT_REGIONS_PATH)]
    regions: PathBuf,

    /// Read the catalog from this local CSV instead of downloading it
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Events per day inside a region's box over an inclusive date window
    Rate {
        #[arg(long)]
        region: String,
        /// Window start (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        start: NaiveDate,
        /// Window end (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        end: NaiveDate,
    },
    /// Magnitude statistics, most active countries and alerts
    Summary {
        /// Number of countries to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Write map layers (GeoJSON) and chart tables (CSV)
    Export {
        /// Output directory (defaults to [output].directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Marker map for one country; prompts for the name when omitted
    Country {
        name: Option<String>,
        /// Output directory (defaults to [output].directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve the JSON API
    Serve {
        /// Port (defaults to [endpoint].port)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{raw}': {e}"))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("\n❌ {:#}\n", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(&cli.config)?;
    config.apply_env_overrides();
    if let Some(path) = cli.data_file.clone() {
        config.data.path = Some(path);
    }

    let regions = RegionFile::new(&cli.regions)
        .load_regions()
        .context("loading region table")?;
    info!("Loaded {} regions from {}", regions.len(), cli.regions.display());

    let events = source_from_config(&config.data)
        .load_events()
        .context("loading seismicity catalog")?;

    match cli.command {
        Command::Rate { region, start, end } => {
            cmd_rate(&events, &regions, &config, &region, start, end)
        }
        Command::Summary { top } => cmd_summary(&events, &config, top),
        Command::Export { out } => cmd_export(&events, &regions, &config, out),
        Command::Country { name, out } => cmd_country(&events, &config, name, out),
        Command::Serve { port } => {
            let port = port.unwrap_or(config.endpoint.port);
            let state = ServiceState {
                events,
                regions,
                analysis: config.analysis.clone(),
            };
            println!("🚀 Serving on http://0.0.0.0:{}", port);
            println!("   GET /health | /regions | /rate | /summary | /country/{{name}}\n");
            start_endpoint_server(port, state).map_err(anyhow::Error::msg)
        }
    }
}

fn cmd_rate(
    events: &EventStore,
    regions: &RegionCatalog,
    config: &AppConfig,
    region: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<()> {
    let estimator =
        RateEstimator::new(events, regions).with_policy(config.analysis.degenerate_window);
    let estimate = estimator.estimate_detailed(region, start, end)?;

    println!("📈 Event rate for {} between {} and {}", estimate.region, start, end);
    println!("   Events in window: {}", estimate.total_events);
    println!("   Window length:    {} days", estimate.duration_days);
    println!("   Rate:             {:.6} events/day", estimate.events_per_day);
    Ok(())
}

fn cmd_summary(events: &EventStore, config: &AppConfig, top: usize) -> Result<()> {
    let summary = summarize(events, config.analysis.alert_magnitude);

    println!("🌍 Catalog summary");
    println!("==================\n");
    println!("  Events:  {} ({} with coordinates)", summary.events, summary.located);

    match &summary.magnitude {
        Some(m) => {
            println!(
                "  Magnitude: mean {:.2}, std dev {:.2}, range {:.1}-{:.1} (n = {})",
                m.mean, m.std_dev, m.min, m.max, m.count
            );
        }
        None => println!("  Magnitude: no values in catalog"),
    }

    match &summary.depth {
        Some(d) => println!(
            "  Depth:     mean {:.2}, range {:.1}-{:.1} (n = {})",
            d.mean, d.min, d.max, d.count
        ),
        None => println!("  Depth: no values in catalog"),
    }

    println!("\n  Most active countries:");
    for (country, count) in summary.countries.iter().take(top) {
        println!("    {:<24} {}", country, count);
    }

    println!(
        "\n  Alerts (magnitude >= {:.1}): {}",
        summary.alert_magnitude,
        summary.alerts.len()
    );
    for event in &summary.alerts {
        let magnitude = event.magnitude.unwrap_or_default();
        warn!(
            "M{:.1} on {} at {} ({})",
            magnitude, event.date, event.location, event.country
        );
    }
    Ok(())
}

fn cmd_export(
    events: &EventStore,
    regions: &RegionCatalog,
    config: &AppConfig,
    out: Option<PathBuf>,
) -> Result<()> {
    let dir = out.unwrap_or_else(|| config.output.directory.clone());
    let written = render::export_all(&dir, events, regions, config.analysis.heat_radius)?;

    println!("🗺️  Wrote {} files to {}", written.len(), dir.display());
    for path in &written {
        println!("   {}", path.display());
    }
    Ok(())
}

fn cmd_country(
    events: &EventStore,
    config: &AppConfig,
    name: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let (country, matches) = match name {
        Some(name) => {
            let matches = events_in_country(events, &name);
            if matches.is_empty() {
                bail!("no located events found for country '{}'", name.trim());
            }
            (name, matches)
        }
        None => prompt_for_country(events)?,
    };

    let dir = out.unwrap_or_else(|| config.output.directory.clone());
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(render::marker_file_name(&country));
    render::write_geojson(&path, &geojson::markers(matches.iter().copied()))?;

    println!(
        "📍 {} events for {} written to {}",
        matches.len(),
        country.trim(),
        path.display()
    );
    if let Some((lat, lon)) = map_center(matches.iter().copied()) {
        println!("   Map center: {:.4}, {:.4}", lat, lon);
    }
    Ok(())
}

/// Asks for a country name on stdin until one with located events is given.
fn prompt_for_country(events: &EventStore) -> Result<(String, Vec<&Event>)> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("Country to map (English name): ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            bail!("no country entered");
        };
        let name = line?;

        let matches = events_in_country(events, &name);
        if matches.is_empty() {
            println!("No located events found for '{}'. Try again.", name.trim());
            continue;
        }
        return Ok((name, matches));
    }
}
