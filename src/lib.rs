pub mod config;
pub mod error;
pub mod gcs;
pub mod google_oauth;
pub mod pipeline;
pub mod utils;
pub mod vertex;

pub use error::BatchError;
pub use pipeline::{BatchPipeline, PollPolicy, ReportRow, RunOutcome};
