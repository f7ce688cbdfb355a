use anyhow::{bail, Result};
use consumption_pipeline::{
    config::AppConfig,
    observability,
    pipeline::{CurrentView, Pipeline},
    sources::MeasurementCsvFileSource,
    Period, RepairMode,
};
use std::env;

const USAGE: &str =
    "usage: consumption-pipeline <csv_file_path> [--mode <repair mode>] [--period <period>] [--json]";

struct CliArgs {
    files: Vec<String>,
    mode: Option<RepairMode>,
    period: Period,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let mut parsed = CliArgs {
        files: Vec::new(),
        mode: None,
        period: Period::Minute,
        json: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" => match args.next() {
                Some(v) => parsed.mode = Some(v.parse()?),
                None => bail!("--mode needs a value\n{USAGE}"),
            },
            "--period" => match args.next() {
                Some(v) => parsed.period = v.parse()?,
                None => bail!("--period needs a value\n{USAGE}"),
            },
            "--json" => parsed.json = true,
            "-h" | "--help" => bail!(USAGE),
            _ => parsed.files.push(arg),
        }
    }

    if parsed.files.is_empty() {
        bail!(USAGE);
    }
    Ok(parsed)
}

fn print_view(current: &CurrentView, decimals: usize) {
    println!("{}", current.status_line());
    for (marker, m) in current.view.rows() {
        print!("{:<20}", marker.to_string());
        for v in m.zones() {
            print!("{v:>14.decimals$}");
        }
        println!();
    }
}

fn main() -> Result<()> {
    observability::init_tracing();

    let args = parse_args(env::args().skip(1))?;
    let cfg = AppConfig::load()?;
    let mode = args.mode.unwrap_or(cfg.loader.repair_mode);

    // Loading blocks until done, so warn up front.
    for file in &args.files {
        if let Ok(bytes) = MeasurementCsvFileSource::new(file).file_size() {
            if bytes > cfg.loader.large_file_bytes {
                tracing::warn!(file = %file, bytes, "large measurement file, loading may take a while");
            }
        }
    }

    let mut pipeline = Pipeline::new(cfg.presentation.units, mode);
    if let Some(warning) = pipeline.load(args.files.as_slice(), mode)? {
        eprintln!("{warning}");
    }
    tracing::info!(mode = %pipeline.repair_mode(), "file successfully loaded");

    let current = pipeline.aggregate(args.period)?.clone();
    let stats = pipeline.statistics()?;

    if args.json {
        let doc = serde_json::json!({
            "repair_mode": pipeline.repair_mode(),
            "view": current,
            "statistics": stats,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let decimals = cfg.presentation.decimals;
    if current.view.len() > cfg.presentation.large_view_rows {
        tracing::warn!(
            rows = current.view.len(),
            limit = cfg.presentation.large_view_rows,
            "view too large to print, showing statistics only"
        );
        println!("{}", current.status_line());
    } else {
        print_view(&current, decimals);
    }
    println!();
    print!("{}", stats.render(decimals));

    Ok(())
}
