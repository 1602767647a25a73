use forge_core::GenerationJob;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Either a single job or every job of a project; `jobId` wins when both are set
///
/// Numbers and booleans are accepted and used in their text form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusRequest {
    #[serde(default, deserialize_with = "scalar")]
    pub job_id: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub project_id: Option<String>,
}

fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Jobs of one project, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectJobs {
    pub jobs: Vec<GenerationJob>,
    /// The pending and processing subset of `jobs`, same order
    pub active_jobs: Vec<GenerationJob>,
    pub has_active_jobs: bool,
}

impl ProjectJobs {
    pub fn new(jobs: Vec<GenerationJob>) -> Self {
        let active_jobs: Vec<_> = jobs.iter().filter(|job| job.is_active()).cloned().collect();

        Self {
            has_active_jobs: !active_jobs.is_empty(),
            jobs,
            active_jobs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobStatusResponse {
    /// The job row, unchanged
    Job(GenerationJob),
    Project(ProjectJobs),
}
