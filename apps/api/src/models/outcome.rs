use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One submitted application tied to a resume variant.
///
/// `response_received` and `interview_granted` are tracked independently; an
/// interview is never inferred from a response or the other way round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub variant_id: String,
    pub applied_at: DateTime<Utc>,
    pub response_received: bool,
    pub interview_granted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

/// All outcome records for one resume variant of a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantHistory {
    pub variant_id: String,
    pub variant_title: String,
    pub records: Vec<OutcomeRecord>,
}

/// Row shape returned by the application history query.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub variant_id: Uuid,
    pub variant_title: String,
    pub applied_at: DateTime<Utc>,
    pub response_received: bool,
    pub interview_granted: bool,
    pub company: Option<String>,
    pub job_title: Option<String>,
}

impl ApplicationRow {
    pub fn into_record(self) -> OutcomeRecord {
        OutcomeRecord {
            variant_id: self.variant_id.to_string(),
            applied_at: self.applied_at,
            response_received: self.response_received,
            interview_granted: self.interview_granted,
            company: self.company,
            job_title: self.job_title,
        }
    }
}
