use super::{Measurement, TimeVector};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DatasetError {
    #[error("time vector has {time_vectors} rows but measurements have {measurements}")]
    RowCountMismatch { time_vectors: usize, measurements: usize },
}

/// Minute-resolution samples after repair.
///
/// The two columns are always the same length and are only ever built or
/// replaced together, so row `i` of one belongs to row `i` of the other.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawDataset {
    time_vectors: Vec<TimeVector>,
    measurements: Vec<Measurement>,
}

impl RawDataset {
    pub fn new(
        time_vectors: Vec<TimeVector>,
        measurements: Vec<Measurement>,
    ) -> Result<Self, DatasetError> {
        if time_vectors.len() != measurements.len() {
            return Err(DatasetError::RowCountMismatch {
                time_vectors: time_vectors.len(),
                measurements: measurements.len(),
            });
        }
        Ok(Self {
            time_vectors,
            measurements,
        })
    }

    pub fn len(&self) -> usize {
        self.time_vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_vectors.is_empty()
    }

    pub fn time_vectors(&self) -> &[TimeVector] {
        &self.time_vectors
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn rows(&self) -> impl Iterator<Item = (&TimeVector, &Measurement)> + '_ {
        self.time_vectors.iter().zip(self.measurements.iter())
    }
}

impl FromIterator<(TimeVector, Measurement)> for RawDataset {
    fn from_iter<I: IntoIterator<Item = (TimeVector, Measurement)>>(iter: I) -> Self {
        let (time_vectors, measurements) = iter.into_iter().unzip();
        Self {
            time_vectors,
            measurements,
        }
    }
}
