use std::io;

use crate::aggregate::TimeMarker;
use crate::pipeline::{CurrentView, PipelineError};

const CALENDAR_HEADER: [&str; 11] = [
    "year", "month", "day", "hour", "minute", "second", "zone1", "zone2", "zone3", "zone4", "unit",
];
const HOUR_OF_DAY_HEADER: [&str; 6] = ["hour", "zone1", "zone2", "zone3", "zone4", "unit"];

/// Writes a view as CSV with a header row. Values are written unrounded.
pub struct ViewCsvSink<W: io::Write> {
    writer: csv::Writer<W>,
}

impl<W: io::Write> ViewCsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    pub fn write(&mut self, current: &CurrentView) -> Result<usize, PipelineError> {
        let unit = current.unit.to_string();
        let mut rows = 0;
        let mut header_written = false;

        for (marker, m) in current.view.rows() {
            let mut record: Vec<String> = match marker {
                TimeMarker::Calendar(tv) => {
                    if !header_written {
                        self.writer.write_record(CALENDAR_HEADER)?;
                    }
                    vec![
                        tv.year.to_string(),
                        tv.month.to_string(),
                        tv.day.to_string(),
                        tv.hour.to_string(),
                        tv.minute.to_string(),
                        tv.second.to_string(),
                    ]
                }
                TimeMarker::Hour(hour) => {
                    if !header_written {
                        self.writer.write_record(HOUR_OF_DAY_HEADER)?;
                    }
                    vec![hour.to_string()]
                }
            };
            header_written = true;
            record.extend(m.zones().iter().map(f64::to_string));
            record.push(unit.clone());
            self.writer.write_record(&record)?;
            rows += 1;
        }

        self.writer.flush()?;
        tracing::debug!(rows, period = %current.period(), "wrote view as csv");
        Ok(rows)
    }

    pub fn into_inner(self) -> Result<W, PipelineError> {
        self.writer
            .into_inner()
            .map_err(|e| PipelineError::Io(e.into_error()))
    }
}
