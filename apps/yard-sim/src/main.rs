//! yard-sim: dispatch a fleet of trains through a switch yard.
//!
//! Reads a yard file (routes) and a fleet file (trains), runs every train
//! through its route on a bounded worker pool, and prints the final status
//! table.
//!
//! ```text
//! yard-sim data/theYardFile.csv data/theFleetFile.csv --csv report.csv
//! ```
//!
//! Trace output goes through `log`; set `RUST_LOG=debug` to also see
//! releases and retry backoffs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use structopt::StructOpt;

use yard_agent::{LogObserver, agents_from_fleet};
use yard_core::DispatchConfig;
use yard_dispatch::EngineBuilder;
use yard_output::{CsvReportWriter, ReportWriter, TableWriter};
use yard_topology::{load_fleet_csv, load_yard_csv};

#[derive(StructOpt, Debug)]
#[structopt(name = "yard-sim", about = "Multi-threaded train yard dispatch simulator")]
struct Opt {
    /// Yard file: inbound,switch...,outbound per line
    #[structopt(name = "YARD_FILE", parse(from_os_str))]
    yard_file: PathBuf,

    /// Fleet file: train_number,inbound,outbound per line
    #[structopt(name = "FLEET_FILE", parse(from_os_str))]
    fleet_file: PathBuf,

    /// JSON dispatch configuration; missing fields use defaults
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Worker pool size
    #[structopt(long)]
    max_concurrency: Option<usize>,

    /// Wall-clock budget for the whole run, in seconds
    #[structopt(long)]
    deadline_secs: Option<u64>,

    /// Seed for retry backoff jitter
    #[structopt(long)]
    seed: Option<u64>,

    /// Also write the final report as CSV
    #[structopt(long, parse(from_os_str))]
    csv: Option<PathBuf>,

    /// Accept yards whose routes lock shared switches in conflicting order
    #[structopt(long)]
    allow_ordering_cycles: bool,
}

fn main() -> Result<()> {
    init_logging();
    let opt = Opt::from_args();
    log::debug!("{opt:?}");

    let config = load_config(&opt)?;

    // ── Yard and fleet ────────────────────────────────────────────────────
    let mut builder = load_yard_csv(&opt.yard_file)
        .with_context(|| format!("reading yard file {}", opt.yard_file.display()))?;
    builder.permit_ordering_cycles(opt.allow_ordering_cycles);
    let topology = Arc::new(builder.build().context("invalid yard")?);
    log::info!(
        "yard loaded: {} routes over {} switches",
        topology.route_count(),
        topology.switch_count()
    );

    let fleet = load_fleet_csv(&opt.fleet_file)
        .with_context(|| format!("reading fleet file {}", opt.fleet_file.display()))?;
    let agents = agents_from_fleet(&fleet, &topology, config.seed);

    // ── Dispatch ──────────────────────────────────────────────────────────
    let engine = EngineBuilder::new(config, Arc::clone(&topology))
        .agents(agents)
        .build()?;

    println!("$ $ $ TRAIN MOVEMENT SIMULATION BEGINS........... $ $ $");
    let report = engine.run(Arc::new(LogObserver))?;
    if report.deadline_expired {
        println!("Simulation timed out after {:.1} seconds", report.elapsed.as_secs_f64());
    }
    println!("$ $ $ SIMULATION ENDS $ $ $");

    // ── Report ────────────────────────────────────────────────────────────
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out)?;
    let mut table = TableWriter::new(&mut out);
    table.write_report(&report)?;
    table.finish()?;
    writeln!(out, "\n$ $ $ FINAL STATUS REPORT COMPLETED $ $ $")?;

    if let Some(path) = &opt.csv {
        write_csv(path, &report)?;
    }
    Ok(())
}

/// `info` unless `RUST_LOG` says otherwise.
fn init_logging() {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn load_config(opt: &Opt) -> Result<DispatchConfig> {
    let mut config = match &opt.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => DispatchConfig::default(),
    };

    if let Some(n) = opt.max_concurrency {
        config.max_concurrency = n;
    }
    if let Some(secs) = opt.deadline_secs {
        config.global_deadline_ms = secs.saturating_mul(1_000);
    }
    if let Some(seed) = opt.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn write_csv(path: &Path, report: &yard_dispatch::DispatchReport) -> Result<()> {
    let mut writer = CsvReportWriter::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_report(report)?;
    writer.finish()?;
    log::info!("report written to {}", path.display());
    Ok(())
}
