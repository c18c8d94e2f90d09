mod batch_job;
mod prediction;

pub use batch_job::{
    BatchPredictionJob, CreateBatchPredictionJob, GcsDestination, GcsSource, InputConfig,
    JobState, OutputConfig, OutputInfo,
};
pub use prediction::{PredictionLine, PredictionRequest};
