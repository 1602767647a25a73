use async_trait::async_trait;
use forge_core::GenerationJob;

use crate::BackendError;

/// Read access to the `generation_jobs` table
///
/// Queries run with the caller's own token so row-level security decides
/// which rows are visible.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch a single job by id
    async fn job(&self, authorization: &str, job_id: &str) -> Result<Option<GenerationJob>, BackendError>;

    /// Fetch every job of a project, newest first
    async fn project_jobs(&self, authorization: &str, project_id: &str) -> Result<Vec<GenerationJob>, BackendError>;
}
