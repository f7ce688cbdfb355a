pub mod view_csv;

pub use view_csv::ViewCsvSink;
