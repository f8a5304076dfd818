//! Business signals (fund raisings, acquisitions) extracted from saved-search
//! alert emails.

pub mod settings;
pub mod db;
pub mod inbox;
pub mod parser;
pub mod pipeline;
pub mod sheet;
pub mod signals;

pub use pipeline::{process, PipelineOptions, RawMessage};
pub use signals::{CompanyEvent, Signals};
