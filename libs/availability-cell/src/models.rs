use serde::{Deserialize, Serialize};

/// One clinic closure, administered out of band and read-only here.
///
/// Exactly one of the two forms is expected: `date` for a single day, or
/// `date_from`/`date_to` for an inclusive range. The single-date form wins
/// when both are present, and a missing `date_to` collapses the range to
/// `date_from`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureRecord {
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ClosureRecord {
    pub fn single(branch: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            date: Some(date.into()),
            date_from: None,
            date_to: None,
            reason: None,
        }
    }

    pub fn range(
        branch: impl Into<String>,
        from: impl Into<String>,
        to: Option<String>,
    ) -> Self {
        Self {
            branch: branch.into(),
            date: None,
            date_from: Some(from.into()),
            date_to: to,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
