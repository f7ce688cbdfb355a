use std::path::{Path, PathBuf};

use consumption_model::{RawDataset, Unit};

use crate::aggregate::{self, AggregatedView, Period, UnitPolicy};
use crate::sources::{self, LoadedMeasurements};
use crate::statistics::{self, StatisticsTable};
use crate::transform::{RepairMode, RepairWarning};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("wrong file extension for '{}', expected a .csv file", .0.display())]
    FileExtension(PathBuf),
    #[error("no such file: '{}'", .0.display())]
    FileNotFound(PathBuf),
    #[error("can only load one file at a time, got {0}")]
    MultipleFiles(usize),
    #[error("no input file given")]
    NoFile,
    #[error("unknown aggregation period '{0}'")]
    InvalidPeriod(String),
    #[error("unknown repair mode '{0}'")]
    InvalidRepairMode(String),
    #[error("failed to read CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no measurements loaded")]
    NoDataset,
}

/// The view currently on display: an aggregation of the raw dataset with its
/// unit already applied.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CurrentView {
    pub unit: Unit,
    #[serde(flatten)]
    pub view: AggregatedView,
}

impl CurrentView {
    pub fn period(&self) -> Period {
        self.view.period
    }

    /// e.g. "Hourly aggregation | Unit: Kilowatt-hour"
    pub fn status_line(&self) -> String {
        format!("{} aggregation | Unit: {}", self.view.period.label(), self.unit)
    }
}

/// Holds one loaded file and the view derived from it.
///
/// Every aggregation starts again from the raw dataset. Failed loads and
/// aggregations leave the previous state as it was.
pub struct Pipeline {
    unit_policy: UnitPolicy,
    raw: Option<RawDataset>,
    repair_mode: RepairMode,
    current: Option<CurrentView>,
}

impl Pipeline {
    pub fn new(unit_policy: UnitPolicy, repair_mode: RepairMode) -> Self {
        Self {
            unit_policy,
            raw: None,
            repair_mode,
            current: None,
        }
    }

    /// Load a file, replacing the dataset and resetting the view to minutes.
    ///
    /// Returns the repair warning, if the requested mode had to be replaced;
    /// `repair_mode()` then reports `Drop`.
    pub fn load<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        mode: RepairMode,
    ) -> Result<Option<RepairWarning>, PipelineError> {
        let LoadedMeasurements {
            dataset,
            effective_mode,
            warning,
            ..
        } = sources::load_measurements(paths, mode)?;

        self.current = Some(self.derive(&dataset, Period::Minute));
        self.raw = Some(dataset);
        self.repair_mode = effective_mode;
        Ok(warning)
    }

    /// Replace the current view with `period` derived from the raw dataset.
    pub fn aggregate(&mut self, period: Period) -> Result<&CurrentView, PipelineError> {
        let raw = self.raw.as_ref().ok_or(PipelineError::NoDataset)?;
        let view = self.derive(raw, period);
        tracing::info!(period = %period, rows = view.view.len(), unit = %view.unit, "aggregated view");
        Ok(&*self.current.insert(view))
    }

    /// Parse a period label and aggregate; an unknown label changes nothing.
    pub fn aggregate_label(&mut self, period: &str) -> Result<&CurrentView, PipelineError> {
        let period: Period = period.parse()?;
        self.aggregate(period)
    }

    pub fn statistics(&self) -> Result<StatisticsTable, PipelineError> {
        let current = self.current.as_ref().ok_or(PipelineError::NoDataset)?;
        Ok(statistics::summarize(&current.view))
    }

    pub fn raw(&self) -> Option<&RawDataset> {
        self.raw.as_ref()
    }

    pub fn current(&self) -> Option<&CurrentView> {
        self.current.as_ref()
    }

    /// Mode in effect for the loaded file, or the last requested one.
    pub fn repair_mode(&self) -> RepairMode {
        self.repair_mode
    }

    fn derive(&self, raw: &RawDataset, period: Period) -> CurrentView {
        let mut view = aggregate::aggregate(raw, period);
        let unit = self.unit_policy.apply(&mut view.measurements);
        CurrentView { unit, view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create csv");
        file.write_all(body.as_bytes()).expect("write csv");
        path
    }

    /// Two hours of minute data at 100 Wh per zone and minute.
    fn two_hours() -> String {
        let mut body = String::new();
        for hour in 0..2 {
            for minute in 0..60 {
                body.push_str(&format!("2008,1,1,{hour},{minute},0,100,100,100,100\n"));
            }
        }
        body
    }

    #[test]
    fn aggregation_requires_a_dataset() {
        let mut p = Pipeline::new(UnitPolicy::default(), RepairMode::ForwardFill);
        assert!(matches!(p.aggregate(Period::Hour), Err(PipelineError::NoDataset)));
        assert!(matches!(p.statistics(), Err(PipelineError::NoDataset)));
    }

    #[test]
    fn load_starts_at_minute_view_in_watt_hours() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(&dir, "data.csv", &two_hours());
        let mut p = Pipeline::new(UnitPolicy::default(), RepairMode::ForwardFill);

        let warning = p.load(&[&path], RepairMode::ForwardFill).expect("load");
        assert!(warning.is_none());

        let current = p.current().expect("view");
        assert_eq!(current.period(), Period::Minute);
        assert_eq!(current.unit, Unit::WattHour);
        assert_eq!(current.view.len(), 120);
        assert_eq!(current.status_line(), "Minutely aggregation | Unit: Watt-hour");
    }

    #[test]
    fn rescaling_is_decided_per_aggregation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(&dir, "data.csv", &two_hours());
        let mut p = Pipeline::new(UnitPolicy::default(), RepairMode::Drop);
        p.load(&[&path], RepairMode::Drop).expect("load");

        let hourly = p.aggregate(Period::Hour).expect("hour");
        assert_eq!(hourly.unit, Unit::KilowattHour);
        assert_eq!(hourly.view.measurements[0].zone1, 6.0);

        let day = p.aggregate(Period::Day).expect("day");
        assert_eq!(day.unit, Unit::KilowattHour);
        assert_eq!(day.view.measurements[0].zone1, 12.0);

        let profile = p.aggregate(Period::HourOfDay).expect("hour of day");
        assert_eq!(profile.unit, Unit::WattHour);
        assert_eq!(profile.view.measurements[0].zone1, 100.0);

        // raw data is untouched by any of the above
        assert_eq!(p.raw().map(|r| r.measurements()[0].zone1), Some(100.0));
    }

    #[test]
    fn failed_calls_keep_previous_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(&dir, "data.csv", &two_hours());
        let mut p = Pipeline::new(UnitPolicy::default(), RepairMode::ForwardFill);
        p.load(&[&path], RepairMode::ForwardFill).expect("load");
        p.aggregate(Period::Day).expect("day");

        let bad_ext = dir.path().join("data.txt");
        assert!(matches!(
            p.load(&[&bad_ext], RepairMode::Drop),
            Err(PipelineError::FileExtension(_))
        ));
        assert!(matches!(
            p.load(&[&path, &path], RepairMode::Drop),
            Err(PipelineError::MultipleFiles(2))
        ));
        assert!(matches!(p.aggregate_label("fortnight"), Err(PipelineError::InvalidPeriod(_))));

        assert_eq!(p.raw().map(RawDataset::len), Some(120));
        assert_eq!(p.current().map(CurrentView::period), Some(Period::Day));
        assert_eq!(p.repair_mode(), RepairMode::ForwardFill);
    }

    #[test]
    fn override_is_reflected_in_repair_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(&dir, "data.csv", "2008,1,1,0,0,0,-1,1,1,1\n2008,1,1,0,1,0,1,1,1,1\n");
        let mut p = Pipeline::new(UnitPolicy::default(), RepairMode::ForwardFill);

        let warning = p.load(&[&path], RepairMode::ForwardFill).expect("load");
        assert!(warning.is_some());
        assert_eq!(p.repair_mode(), RepairMode::Drop);
        assert_eq!(p.raw().map(RawDataset::len), Some(1));
    }

    #[test]
    fn statistics_follow_the_current_view() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(&dir, "data.csv", &two_hours());
        let mut p = Pipeline::new(UnitPolicy::default(), RepairMode::ForwardFill);
        p.load(&[&path], RepairMode::ForwardFill).expect("load");

        let minute = p.statistics().expect("stats");
        assert_eq!(minute.rows()[0].summary.max, 100.0);

        p.aggregate(Period::Hour).expect("hour");
        let hourly = p.statistics().expect("stats");
        assert_eq!(hourly.rows()[0].summary.max, 6.0);
    }
}
