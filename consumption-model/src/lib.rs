pub mod domain;

pub use domain::{DatasetError, Measurement, RawDataset, TimeVector, Unit, Zone};
