use std::{fmt, str::FromStr};

use crate::pipeline::PipelineError;
use crate::sources::{RawRecord, FIELD_COUNT};

/// Policy for rows carrying the missing-value sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RepairMode {
    #[default]
    ForwardFill,
    BackwardFill,
    Drop,
}

impl RepairMode {
    pub const ALL: [RepairMode; 3] = [
        RepairMode::ForwardFill,
        RepairMode::BackwardFill,
        RepairMode::Drop,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RepairMode::ForwardFill => "forward fill",
            RepairMode::BackwardFill => "backward fill",
            RepairMode::Drop => "drop",
        }
    }

    /// Long label for mode selectors. Parses back with `from_str`.
    pub const fn menu_label(self) -> &'static str {
        match self {
            RepairMode::ForwardFill => {
                "Forward fill (replace corrupt measurement with latest valid measurement)"
            }
            RepairMode::BackwardFill => {
                "Backward fill (replace corrupt measurement with next valid measurement)"
            }
            RepairMode::Drop => "Drop (delete corrupted measurements)",
        }
    }
}

impl fmt::Display for RepairMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepairMode {
    type Err = PipelineError;

    /// Case-insensitive; anything from the first `(` on is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let head = s.split('(').next().unwrap_or_default().trim();
        RepairMode::ALL
            .into_iter()
            .find(|mode| head.eq_ignore_ascii_case(mode.as_str()))
            .ok_or_else(|| PipelineError::InvalidRepairMode(s.to_string()))
    }
}

impl TryFrom<String> for RepairMode {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepairMode> for String {
    fn from(mode: RepairMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Which end of the file made a fill mode impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRow {
    First,
    Last,
}

/// Advisory result of a fill mode being replaced by `Drop` for a whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairWarning {
    pub requested: RepairMode,
    pub boundary: BoundaryRow,
}

impl fmt::Display for RepairWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.boundary {
            BoundaryRow::First => "the first row is corrupted and has no earlier row to fill from",
            BoundaryRow::Last => "the last row is corrupted and has no later row to fill from",
        };
        write!(
            f,
            "!WARNING! {} error: {reason}; dropping all corrupted rows",
            self.requested
        )
    }
}

/// A record with every field present.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub line: u64,
    pub fields: [f64; FIELD_COUNT],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub records: Vec<CleanRecord>,
    pub effective_mode: RepairMode,
    pub warning: Option<RepairWarning>,
    pub corrupted_rows: usize,
}

/// Mode actually applied to a file, and the warning when it differs from `requested`.
pub fn effective_mode(
    records: &[RawRecord],
    requested: RepairMode,
) -> (RepairMode, Option<RepairWarning>) {
    let boundary = match requested {
        RepairMode::ForwardFill if records.first().is_some_and(RawRecord::is_corrupted) => {
            Some(BoundaryRow::First)
        }
        RepairMode::BackwardFill if records.last().is_some_and(RawRecord::is_corrupted) => {
            Some(BoundaryRow::Last)
        }
        _ => None,
    };

    match boundary {
        Some(boundary) => (
            RepairMode::Drop,
            Some(RepairWarning {
                requested,
                boundary,
            }),
        ),
        None => (requested, None),
    }
}

/// Apply `requested` to parsed records, downgrading to `Drop` for the whole
/// file when a fill mode has nothing to fill the boundary row from.
pub fn repair(records: Vec<RawRecord>, requested: RepairMode) -> Repaired {
    let corrupted_rows = records.iter().filter(|r| r.is_corrupted()).count();
    let (mode, warning) = effective_mode(&records, requested);

    if let Some(w) = &warning {
        metrics::counter!("measurement_repair_overrides_total").increment(1);
        tracing::warn!(requested = %w.requested, effective = %mode, "{w}");
    }
    metrics::counter!("measurement_rows_corrupted_total").increment(corrupted_rows as u64);

    let total = records.len();
    let cleaned = match mode {
        RepairMode::ForwardFill => fill(records.into_iter()),
        RepairMode::BackwardFill => {
            let mut out = fill(records.into_iter().rev());
            out.reverse();
            out
        }
        RepairMode::Drop => records.into_iter().filter_map(RawRecord::into_clean).collect(),
    };

    let dropped = total - cleaned.len();
    if dropped > 0 {
        metrics::counter!("measurement_rows_dropped_total").increment(dropped as u64);
    }
    tracing::debug!(mode = %mode, corrupted_rows, dropped, "repaired measurement rows");

    Repaired {
        records: cleaned,
        effective_mode: mode,
        warning,
        corrupted_rows,
    }
}

/// Carry the last seen value of each column into missing fields, in iteration order.
///
/// A field with no earlier value in its column cannot be filled and its row is
/// left out; `effective_mode` rules that out for the first row.
fn fill(records: impl Iterator<Item = RawRecord>) -> Vec<CleanRecord> {
    let mut last: [Option<f64>; FIELD_COUNT] = [None; FIELD_COUNT];
    records
        .filter_map(|record| {
            for (slot, field) in last.iter_mut().zip(record.fields) {
                if field.is_some() {
                    *slot = field;
                }
            }
            RawRecord {
                line: record.line,
                fields: last,
            }
            .into_clean()
        })
        .collect()
}
