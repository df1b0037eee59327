use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use availability_cell::services::closure::ClosureService;
use shared_database::{
    collections,
    document_store::{is_duplicate_key, DocumentStore},
};
use shared_models::clinic::ClinicIdentity;
use shared_models::error::AppError;

use crate::models::{AppointmentEntry, BookVisitRequest, PaymentRecord, VisitRecord};
use crate::services::ledger::LedgerService;

/// Visit numbers look like `D-00000012`.
const VISIT_NO_PREFIX: &str = "D-";
const VISIT_NO_DIGITS: usize = 8;

/// Attempts before giving up on a contended visit-number insert.
const MAX_ALLOCATION_ATTEMPTS: usize = 5;

pub struct VisitService {
    store: DocumentStore,
}

impl VisitService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Books an appointment. The closure check runs here authoritatively,
    /// whatever the availability endpoints told the client earlier; then the
    /// request either registers a new patient or appends to an existing
    /// record, and finally the payment is recorded.
    pub async fn book(&self, request: BookVisitRequest) -> Result<String, AppError> {
        let identity = ClinicIdentity::new(request.clinic.clone(), request.location.clone());
        ClosureService::new(self.store.clone())
            .assert_bookable(&request.date, &identity)
            .await?;

        let visit_no = match request.visit_no.as_deref() {
            Some(visit_no) => {
                self.append_appointment(visit_no, &request.location, request.appointment())
                    .await?
            }
            None => self.register(&request).await?,
        };

        if !request.skip_payment {
            if let Some(method) = request.payment.as_deref() {
                let entry = PaymentRecord {
                    visit_no: visit_no.clone(),
                    clinic: request.clinic.clone(),
                    location: request.location.clone(),
                    date: request.date.clone(),
                    time: request.time.clone(),
                    payment: method.to_string(),
                    created_at: Utc::now(),
                };
                // The visit write stands either way; a missed ledger entry is
                // reconciled out of band.
                if let Err(e) = LedgerService::new(self.store.clone()).record(entry).await {
                    error!("Failed to record payment for {}: {}", visit_no, e);
                }
            }
        }

        Ok(visit_no)
    }

    /// Registration path: allocates the next visit number and inserts the
    /// record with its first appointment. The store keeps a unique index on
    /// `visitNo`, so a concurrent registration that wins the same number
    /// fails the insert and we re-read the maximum and retry.
    async fn register(&self, request: &BookVisitRequest) -> Result<String, AppError> {
        let name = required(request.name.as_deref(), "Name required")?;
        let dob = required(request.dob.as_deref(), "Date of birth required")?;
        let contact = required(request.contact.as_deref(), "Contact required")?;
        if contact.len() != 10 || !contact.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::BadRequest(
                "Contact must be exactly 10 digits".to_string(),
            ));
        }

        let collection = collections::visit_history_collection(&request.location);

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let last = self
                .last_visit_no(collection)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            let visit_no = next_visit_no(last.as_deref());

            let record = VisitRecord {
                visit_no: visit_no.clone(),
                name: name.to_string(),
                dob: dob.to_string(),
                age: request.age,
                blood_group: request.blood_group.clone(),
                gender: request.gender.clone(),
                contact: contact.to_string(),
                medical_conditions: request.medical_conditions.clone(),
                allergy: request.allergy.clone(),
                family_history: request.family_history.clone(),
                appointments: vec![request.appointment()],
                created_at: Utc::now(),
            };
            let document = serde_json::to_value(&record)
                .map_err(|e| AppError::Internal(e.to_string()))?;

            match self.store.insert_one(collection, document).await {
                Ok(()) => {
                    debug!("Registered {} in {}", visit_no, collection);
                    return Ok(visit_no);
                }
                Err(e) if is_duplicate_key(&e) => {
                    warn!(
                        "Visit number {} already taken, retrying (attempt {})",
                        visit_no, attempt
                    );
                }
                Err(e) => return Err(AppError::Database(e.to_string())),
            }
        }

        Err(AppError::Database(
            "could not allocate a visit number after repeated conflicts".to_string(),
        ))
    }

    async fn last_visit_no(&self, collection: &str) -> Result<Option<String>> {
        let docs = self
            .store
            .find_sorted(collection, json!({}), json!({ "visitNo": -1 }), 1)
            .await?;
        Ok(docs
            .first()
            .and_then(|doc| doc.get("visitNo"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Returning-patient path: appends one appointment and touches nothing
    /// else on the record. An identifier that matches no record is a miss,
    /// not a silent no-op.
    async fn append_appointment(
        &self,
        visit_no: &str,
        location: &str,
        entry: AppointmentEntry,
    ) -> Result<String, AppError> {
        let collection = collections::visit_history_collection(location);
        let entry = serde_json::to_value(&entry).map_err(|e| AppError::Internal(e.to_string()))?;

        let outcome = self
            .store
            .update_one(
                collection,
                json!({ "visitNo": visit_no }),
                json!({ "$push": { "appointments": entry } }),
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if outcome.matched_count == 0 {
            return Err(AppError::NotFound("Patient not found".to_string()));
        }

        Ok(visit_no.to_string())
    }

    pub async fn find_visit(
        &self,
        visit_no: &str,
        location: &str,
    ) -> Result<Option<VisitRecord>, AppError> {
        let collection = collections::visit_history_collection(location);
        let doc = self
            .store
            .find_one(collection, json!({ "visitNo": visit_no }))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match doc {
            Some(doc) => {
                let record = serde_json::from_value(doc)
                    .map_err(|e| AppError::Internal(format!("corrupt visit record: {}", e)))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// How many bookings already sit in an exact clinic/location/date/time
    /// slot. Fullness against capacity is derived by the caller.
    pub async fn slot_occupancy(
        &self,
        clinic: &str,
        location: &str,
        date: &str,
        time: &str,
    ) -> Result<u64, AppError> {
        let collection = collections::visit_history_collection(location);
        // $elemMatch so a single entry must carry all four fields; a record
        // whose entries only cover them across different appointments is not
        // a booking in this slot.
        let filter = json!({
            "appointments": {
                "$elemMatch": {
                    "clinic": clinic,
                    "location": location,
                    "date": date,
                    "time": time,
                }
            }
        });
        self.store
            .count(collection, filter)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(message.to_string())),
    }
}

/// Next sequential visit number given the collection's current maximum.
/// Anything that does not match `D-` + 8 digits restarts the sequence at 1.
pub fn next_visit_no(last: Option<&str>) -> String {
    let mut next = 1u64;
    if let Some(last) = last {
        if let Some(digits) = last.strip_prefix(VISIT_NO_PREFIX) {
            if digits.len() == VISIT_NO_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(n) = digits.parse::<u64>() {
                    next = n + 1;
                }
            }
        }
    }
    format!("{}{:0width$}", VISIT_NO_PREFIX, next, width = VISIT_NO_DIGITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_visit_number_starts_the_sequence() {
        assert_eq!(next_visit_no(None), "D-00000001");
    }

    #[test]
    fn visit_numbers_increment_without_reuse() {
        assert_eq!(next_visit_no(Some("D-00000001")), "D-00000002");
        assert_eq!(next_visit_no(Some("D-00000099")), "D-00000100");
        assert_eq!(next_visit_no(Some("D-99999998")), "D-99999999");
    }

    #[test]
    fn malformed_maximums_restart_the_sequence() {
        assert_eq!(next_visit_no(Some("")), "D-00000001");
        assert_eq!(next_visit_no(Some("D-123")), "D-00000001");
        assert_eq!(next_visit_no(Some("X-00000009")), "D-00000001");
        assert_eq!(next_visit_no(Some("D-0000000a")), "D-00000001");
    }
}
