#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Shared building blocks for the Forge function handlers
//!
//! Error rendering, the JSON body extractor and the generation-job model
//! used by both the server and the client crates.

mod error;
mod job;
mod payload;

pub use error::{ErrorBody, HttpError, error_response};
pub use job::{GenerationJob, JobStatus};
pub use payload::JsonPayload;
