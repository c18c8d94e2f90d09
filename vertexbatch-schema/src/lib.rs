pub mod gcs;
pub mod gemini;
pub mod rpc;
pub mod vertex;

pub use gcs::{GcsObject, GcsObjectList};
pub use gemini::{Content, Part};
pub use rpc::{GoogleErrorBody, GoogleErrorObject, RpcStatus};
pub use vertex::{
    BatchPredictionJob, CreateBatchPredictionJob, JobState, PredictionLine, PredictionRequest,
};
