pub mod dataset;
pub mod measurement;
pub mod time_vector;
pub mod unit;

pub use dataset::{DatasetError, RawDataset};
pub use measurement::{Measurement, Zone};
pub use time_vector::TimeVector;
pub use unit::Unit;
