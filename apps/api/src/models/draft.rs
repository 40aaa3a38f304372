use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const UNTITLED_DRAFT: &str = "Untitled Draft";

/// A saved cover letter. Immutable once created; only deletion is allowed.
///
/// Field names are camelCase on the wire and on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub company_name: String,
    pub cover_letter: String,
    /// RFC 3339, UTC, millisecond precision.
    pub created_at: String,
}

impl Draft {
    /// Builds a draft with a fresh id and the current timestamp.
    pub fn new(company_name: &str, cover_letter: &str) -> Self {
        let company_name = if company_name.trim().is_empty() {
            UNTITLED_DRAFT.to_string()
        } else {
            company_name.to_string()
        };

        Self {
            id: Uuid::new_v4().to_string(),
            company_name,
            cover_letter: cover_letter.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
