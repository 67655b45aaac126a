use serde::{Deserialize, Serialize};

use super::repo_types::DoseLog;

/// Body of `POST /api/logs`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordLogRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordedLogResponse {
    pub message: String,
    pub log: DoseLog,
}
