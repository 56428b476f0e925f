pub mod analysis;
pub mod config;
pub mod dataset;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod record;
pub mod sources;

pub use config::Config;
pub use dataset::Dataset;
pub use record::{Country, RecordType, RiskRecord, COLUMNS};
