use anyhow::{bail, Result};
use consumption_pipeline::{
    config::AppConfig, observability, pipeline::Pipeline, sinks::ViewCsvSink, Period, RepairMode,
};
use std::{env, io};

/// Write an aggregated view of a measurement file to stdout as CSV.
///
/// Usage:
///   export_aggregate <csv_file_path> <period> [repair mode]
fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: export_aggregate <csv_file_path> <period> [repair mode]");
    }
    let period: Period = args[2].parse()?;

    let cfg = AppConfig::load()?;
    let mode: RepairMode = match args.get(3) {
        Some(m) => m.parse()?,
        None => cfg.loader.repair_mode,
    };

    let mut pipeline = Pipeline::new(cfg.presentation.units, mode);
    if let Some(warning) = pipeline.load(&args[1..2], mode)? {
        eprintln!("{warning}");
    }
    let current = pipeline.aggregate(period)?;

    let mut sink = ViewCsvSink::new(io::stdout().lock());
    let rows = sink.write(current)?;
    tracing::info!(rows, unit = %current.unit, "exported aggregated view");

    Ok(())
}
