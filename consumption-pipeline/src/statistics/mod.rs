use std::fmt;

use consumption_model::{Measurement, Zone};
use serde::Serialize;

use crate::aggregate::AggregatedView;

/// Row key of the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKey {
    Zone(Zone),
    All,
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneKey::Zone(zone) => write!(f, "Zone {zone}"),
            ZoneKey::All => f.write_str("All"),
        }
    }
}

/// min / quartiles / max of one column. NaN when the column is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl Summary {
    pub const COLUMNS: [&'static str; 5] = ["Min", "25%", "50%", "75%", "Max"];

    /// NaN values are ignored.
    pub fn of(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        Self {
            min: quantile(&sorted, 0.0),
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: quantile(&sorted, 1.0),
        }
    }

    pub const fn values(&self) -> [f64; 5] {
        [self.min, self.p25, self.p50, self.p75, self.max]
    }
}

/// Quantile of sorted data, interpolating linearly between order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return f64::NAN;
    };
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatisticsRow {
    pub zone: ZoneKey,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Zones 1-4 followed by "All".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatisticsTable {
    rows: Vec<StatisticsRow>,
}

impl StatisticsTable {
    pub fn rows(&self) -> &[StatisticsRow] {
        &self.rows
    }

    pub fn get(&self, zone: ZoneKey) -> Option<&Summary> {
        self.rows.iter().find(|r| r.zone == zone).map(|r| &r.summary)
    }

    /// Fixed-width text table with values rounded for display.
    pub fn render(&self, decimals: usize) -> String {
        format!("{self:.decimals$}")
    }
}

/// Text table; the precision flag sets the displayed decimals (3 when absent).
impl fmt::Display for StatisticsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = f.precision().unwrap_or(3);
        write!(f, "{:<8}", "Zone")?;
        for col in Summary::COLUMNS {
            write!(f, "{col:>14}")?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:<8}", row.zone.to_string())?;
            for v in row.summary.values() {
                write!(f, "{v:>14.decimals$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Statistics of the current view. The time column plays no part.
pub fn summarize(view: &AggregatedView) -> StatisticsTable {
    summarize_measurements(&view.measurements)
}

/// Per-zone summaries plus the "All" row.
///
/// "All" is computed from the zone summaries themselves: each statistic is
/// summed over the four zones, and the five sums are summarized again. It is
/// not the summary of a per-row zone total. NaN zone statistics are left out
/// of the sums.
pub fn summarize_measurements(measurements: &[Measurement]) -> StatisticsTable {
    let mut rows: Vec<StatisticsRow> = Zone::ALL
        .iter()
        .map(|zone| {
            let column: Vec<f64> = measurements.iter().map(|m| m.get(*zone)).collect();
            StatisticsRow {
                zone: ZoneKey::Zone(*zone),
                summary: Summary::of(&column),
            }
        })
        .collect();

    let mut stat_sums = [0.0; 5];
    for row in &rows {
        for (sum, v) in stat_sums.iter_mut().zip(row.summary.values()) {
            if !v.is_nan() {
                *sum += v;
            }
        }
    }
    rows.push(StatisticsRow {
        zone: ZoneKey::All,
        summary: Summary::of(&stat_sums),
    });

    tracing::debug!(rows = measurements.len(), "summarized measurements");
    StatisticsTable { rows }
}
