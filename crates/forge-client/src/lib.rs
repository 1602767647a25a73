#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Typed Rust HTTP client for the Forge functions
//!
//! [`ForgeClient`] calls every function and the storage endpoints of the
//! managed backend. [`ThumbnailWorkflow`] drives the upload-and-generate
//! flow for YouTube thumbnails on top of it.

mod client;
pub mod error;
pub mod types;
pub mod workflow;

pub use client::ForgeClient;
pub use error::{ForgeClientError, Result};
pub use types::*;
pub use workflow::{ThumbnailBackend, ThumbnailWorkflow, WorkflowError, WorkflowState};
