pub mod aggregate;
pub mod config;
pub mod observability;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod statistics;
pub mod transform;

pub use aggregate::{aggregate, AggregatedView, Period};
pub use pipeline::{CurrentView, Pipeline, PipelineError};
pub use sources::load_measurements;
pub use statistics::{summarize, StatisticsTable};
pub use transform::{RepairMode, RepairWarning};
