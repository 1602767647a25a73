use forge_backend::{Backend, Caller, HasIdentity, IdentityService};

use crate::{
    error::{JobsError, Result},
    types::{JobStatusRequest, JobStatusResponse, ProjectJobs},
};

/// Job status server
///
/// Queries run with the caller's own token so the backend's row-level
/// security decides which jobs are visible.
pub struct Server {
    backend: Backend,
}

impl HasIdentity for Server {
    fn identity(&self) -> &dyn IdentityService {
        self.backend.identity.as_ref()
    }
}

impl Server {
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub async fn status(&self, caller: &Caller, request: JobStatusRequest) -> Result<JobStatusResponse> {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());

        if let Some(job_id) = non_empty(request.job_id) {
            tracing::debug!(job_id = %job_id, "fetching job");

            let job = self
                .backend
                .jobs
                .job(&caller.authorization, &job_id)
                .await
                .map_err(|e| {
                    tracing::error!(job_id = %job_id, error = %e, "job query failed");
                    JobsError::Backend(e)
                })?
                .ok_or(JobsError::NotFound)?;

            return Ok(JobStatusResponse::Job(job));
        }

        let project_id = non_empty(request.project_id).ok_or(JobsError::MissingSelector)?;

        let jobs = self
            .backend
            .jobs
            .project_jobs(&caller.authorization, &project_id)
            .await
            .map_err(|e| {
                tracing::error!(project_id = %project_id, error = %e, "project jobs query failed");
                JobsError::Backend(e)
            })?;

        let project = ProjectJobs::new(jobs);

        tracing::debug!(
            project_id = %project_id,
            jobs = project.jobs.len(),
            active = project.active_jobs.len(),
            "fetched project jobs"
        );

        Ok(JobStatusResponse::Project(project))
    }
}
