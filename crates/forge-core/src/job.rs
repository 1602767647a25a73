use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Status of a generation job
///
/// The set of statuses is owned by the database, so anything outside the
/// well-known values is kept as [`JobStatus::Other`] instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(status) => status,
        }
    }

    /// Whether a job in this status is still expected to change
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// A row of the `generation_jobs` table
///
/// The row is kept exactly as the data API returned it so it can be handed
/// back to clients unchanged. Columns are only interpreted through the
/// accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationJob(Map<String, Value>);

impl GenerationJob {
    pub const fn new(row: Map<String, Value>) -> Self {
        Self(row)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn project_id(&self) -> Option<&str> {
        self.0.get("project_id").and_then(Value::as_str)
    }

    /// Status column, `None` when absent or not a string
    pub fn status(&self) -> Option<JobStatus> {
        self.0.get("status").and_then(Value::as_str).map(JobStatus::from)
    }

    /// Creation time, if the stored value is a valid RFC 3339 timestamp
    pub fn created_at_timestamp(&self) -> Option<jiff::Timestamp> {
        self.0.get("created_at")?.as_str()?.parse().ok()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status(), Some(status) if status.is_active())
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for GenerationJob {
    fn from(row: Map<String, Value>) -> Self {
        Self(row)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_status_is_preserved() {
        let status: JobStatus = serde_json::from_value(json!("queued_for_review")).unwrap();
        assert_eq!(status, JobStatus::Other("queued_for_review".to_owned()));
        assert!(!status.is_active());
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("queued_for_review"));
    }

    #[test]
    fn active_statuses() {
        assert!(JobStatus::Pending.is_active());
        assert!(JobStatus::Processing.is_active());
        assert!(!JobStatus::Completed.is_active());
        assert!(!JobStatus::Failed.is_active());
    }

    #[test]
    fn row_keeps_unknown_columns() {
        let row = json!({
            "id": "job-1",
            "project_id": "proj-1",
            "status": "processing",
            "created_at": "2025-03-01T12:00:00.123456+00:00",
            "job_type": "video",
            "progress": 40
        });

        let job: GenerationJob = serde_json::from_value(row.clone()).unwrap();
        assert_eq!(job.status(), Some(JobStatus::Processing));
        assert_eq!(job.project_id(), Some("proj-1"));
        assert_eq!(job.get("progress"), Some(&json!(40)));
        assert!(job.created_at_timestamp().is_some());
        assert_eq!(serde_json::to_value(&job).unwrap(), row);
    }

    #[test]
    fn row_is_returned_verbatim() {
        let raw = r#"{"created_at":null,"id":42,"project_id":null,"result":null,"status":"completed"}"#;

        let job: GenerationJob = serde_json::from_str(raw).unwrap();
        assert!(!job.is_active());
        assert!(job.created_at_timestamp().is_none());
        assert_eq!(job.project_id(), None);
        assert_eq!(serde_json::to_string(&job).unwrap(), raw);
    }

    #[test]
    fn row_without_status_is_not_active() {
        let job: GenerationJob = serde_json::from_value(json!({"id": "j", "status": 3})).unwrap();
        assert_eq!(job.status(), None);
        assert!(!job.is_active());
    }
}
