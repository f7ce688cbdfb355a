pub mod measurement_csv_file;

pub use measurement_csv_file::{
    load_measurements, LoadedMeasurements, MeasurementCsvFileSource, RawRecord, FIELD_COUNT,
    MISSING_SENTINEL,
};
