use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use consumption_model::{Measurement, RawDataset, TimeVector};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::pipeline::PipelineError;
use crate::transform::{self, CleanRecord, RepairMode, RepairWarning};

/// Number of positional columns in a measurement file.
pub const FIELD_COUNT: usize = 10;

/// Field value that marks its whole row as corrupted.
pub const MISSING_SENTINEL: f64 = -1.0;

const COLUMNS: [&str; FIELD_COUNT] = [
    "year", "month", "day", "hour", "minute", "second", "zone1", "zone2", "zone3", "zone4",
];

/// One line of the file before repair. Missing fields are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: u64,
    pub fields: [Option<f64>; FIELD_COUNT],
}

impl RawRecord {
    #[cfg(test)]
    pub(crate) fn from_values(line: u64, values: [f64; FIELD_COUNT]) -> Self {
        Self {
            line,
            fields: values.map(|v| if v == MISSING_SENTINEL { None } else { Some(v) }),
        }
    }

    pub fn is_corrupted(&self) -> bool {
        self.fields.iter().any(Option::is_none)
    }

    pub fn into_clean(self) -> Option<CleanRecord> {
        let mut fields = [0.0; FIELD_COUNT];
        for (out, field) in fields.iter_mut().zip(self.fields) {
            *out = field?;
        }
        Some(CleanRecord {
            line: self.line,
            fields,
        })
    }
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMeasurements {
    pub dataset: RawDataset,
    /// Mode that was applied; `Drop` when the requested fill mode was overridden.
    pub effective_mode: RepairMode,
    pub warning: Option<RepairWarning>,
    pub corrupted_rows: usize,
}

/// Headerless, positional measurement file:
///
/// `year,month,day,hour,minute,second,zone1,zone2,zone3,zone4`
///
/// `-1` in any field (or an empty field) marks the row as corrupted.
pub struct MeasurementCsvFileSource {
    path: PathBuf,
}

impl MeasurementCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size on disk, for callers that want to warn before a slow load.
    pub fn file_size(&self) -> Result<u64, PipelineError> {
        let meta = fs::metadata(&self.path).map_err(|e| self.open_error(e))?;
        Ok(meta.len())
    }

    /// Parse every line without repairing anything.
    pub fn read_records(&self) -> Result<Vec<RawRecord>, PipelineError> {
        self.check_extension()?;
        let file = File::open(&self.path).map_err(|e| self.open_error(e))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result?;
            records.push(parse_record(&record)?);
        }
        Ok(records)
    }

    /// Read, repair and split the file into a raw dataset.
    pub fn load(&self, mode: RepairMode) -> Result<LoadedMeasurements, PipelineError> {
        let records = self.read_records()?;
        tracing::info!(path = %self.path.display(), rows = records.len(), mode = %mode, "read measurement file");

        let repaired = transform::repair(records, mode);
        let dataset = repaired
            .records
            .iter()
            .map(split_record)
            .collect::<Result<RawDataset, _>>()?;

        tracing::info!(
            rows = dataset.len(),
            corrupted_rows = repaired.corrupted_rows,
            mode = %repaired.effective_mode,
            "loaded measurements"
        );

        Ok(LoadedMeasurements {
            dataset,
            effective_mode: repaired.effective_mode,
            warning: repaired.warning,
            corrupted_rows: repaired.corrupted_rows,
        })
    }

    fn check_extension(&self) -> Result<(), PipelineError> {
        let is_csv = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Ok(())
        } else {
            Err(PipelineError::FileExtension(self.path.clone()))
        }
    }

    fn open_error(&self, e: io::Error) -> PipelineError {
        if e.kind() == io::ErrorKind::NotFound {
            PipelineError::FileNotFound(self.path.clone())
        } else {
            PipelineError::Io(e)
        }
    }
}

/// Load exactly one measurement file. Empty or plural input is rejected
/// before the file system is touched.
pub fn load_measurements<P: AsRef<Path>>(
    paths: &[P],
    mode: RepairMode,
) -> Result<LoadedMeasurements, PipelineError> {
    match paths {
        [] => Err(PipelineError::NoFile),
        [path] => MeasurementCsvFileSource::new(path.as_ref()).load(mode),
        _ => Err(PipelineError::MultipleFiles(paths.len())),
    }
}

fn parse_record(record: &StringRecord) -> Result<RawRecord, PipelineError> {
    let line = record.position().map_or(0, |p| p.line());
    if record.len() != FIELD_COUNT {
        return Err(PipelineError::Parse {
            line,
            message: format!("expected {FIELD_COUNT} fields, found {}", record.len()),
        });
    }

    let mut fields = [None; FIELD_COUNT];
    for (idx, raw) in record.iter().enumerate() {
        if raw.is_empty() {
            continue;
        }
        let value: f64 = raw.parse().map_err(|e| PipelineError::Parse {
            line,
            message: format!("invalid {} '{raw}': {e}", COLUMNS[idx]),
        })?;
        fields[idx] = (value != MISSING_SENTINEL).then_some(value);
    }

    Ok(RawRecord { line, fields })
}

fn whole<T: TryFrom<i64>>(value: f64, idx: usize, line: u64) -> Result<T, PipelineError> {
    let invalid = || PipelineError::Parse {
        line,
        message: format!("invalid {} '{value}': not a whole number in range", COLUMNS[idx]),
    };
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(invalid());
    }
    T::try_from(value as i64).map_err(|_| invalid())
}

fn split_record(record: &CleanRecord) -> Result<(TimeVector, Measurement), PipelineError> {
    let f = &record.fields;
    let line = record.line;
    let tv = TimeVector::new(
        whole(f[0], 0, line)?,
        whole(f[1], 1, line)?,
        whole(f[2], 2, line)?,
        whole(f[3], 3, line)?,
        whole(f[4], 4, line)?,
        whole(f[5], 5, line)?,
    );
    Ok((tv, Measurement::new(f[6], f[7], f[8], f[9])))
}
