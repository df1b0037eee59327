use anyhow::Result;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::warn;

use shared_database::{collections, document_store::DocumentStore};
use shared_models::clinic::{ClinicIdentity, ClosureScope};
use shared_models::error::AppError;

use crate::models::ClosureRecord;

pub struct ClosureService {
    store: DocumentStore,
}

impl ClosureService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Every closure record, for the closed-days listing.
    pub async fn list_closures(&self) -> Result<Vec<ClosureRecord>> {
        let docs = self.store.find(collections::CLOSED_DAYS, json!({})).await?;
        Ok(parse_closures(docs))
    }

    /// Closure records scoped to one clinic: the wildcard plus entries keyed
    /// by either the display name or the location code.
    pub async fn closures_for(&self, clinic: &ClinicIdentity) -> Result<Vec<ClosureRecord>> {
        let filter = json!({ "$or": [
            { "branch": "All" },
            { "branch": clinic.name },
            { "branch": clinic.location },
        ]});
        let docs = self.store.find(collections::CLOSED_DAYS, filter).await?;
        Ok(parse_closures(docs))
    }

    /// Authoritative pre-booking check. A store failure rejects the booking
    /// rather than letting it through unvalidated.
    pub async fn assert_bookable(
        &self,
        date: &str,
        clinic: &ClinicIdentity,
    ) -> Result<(), AppError> {
        let Some(day) = calendar_day(date) else {
            return Err(AppError::BadRequest("Invalid appointment date".to_string()));
        };
        let closures = self
            .closures_for(clinic)
            .await
            .map_err(|e| AppError::Database(format!("closed-day lookup failed: {}", e)))?;
        if let Some(reason) = closed_reason(day, clinic, &closures) {
            return Err(AppError::ClinicClosed { reason });
        }
        Ok(())
    }
}

fn parse_closures(docs: Vec<Value>) -> Vec<ClosureRecord> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed closure record: {}", e);
                None
            }
        })
        .collect()
}

/// Truncates a stored or requested date to its calendar day, sidestepping
/// timezone drift between stored and requested values. Accepts plain
/// `YYYY-MM-DD` as well as timestamps carrying a time component.
pub fn calendar_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Returns the closure reason when `day` is closed for `clinic`. The first
/// matching record in store order wins; an absent reason surfaces as "".
pub fn closed_reason(
    day: NaiveDate,
    clinic: &ClinicIdentity,
    closures: &[ClosureRecord],
) -> Option<String> {
    for record in closures {
        if !ClosureScope::parse(&record.branch).applies_to(clinic) {
            continue;
        }
        let matched = if let Some(date) = record.date.as_deref() {
            calendar_day(date) == Some(day)
        } else if let Some(from) = record.date_from.as_deref() {
            match calendar_day(from) {
                Some(from_day) => {
                    let to_day = record
                        .date_to
                        .as_deref()
                        .and_then(calendar_day)
                        .unwrap_or(from_day);
                    day >= from_day && day <= to_day
                }
                None => false,
            }
        } else {
            false
        };
        if matched {
            return Some(record.reason.clone().unwrap_or_default());
        }
    }
    None
}
