use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One booked appointment inside a visit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentEntry {
    pub clinic: String,
    pub location: String,
    pub date: String,
    pub time: String,
}

/// A patient's visit record: demographics captured once at registration plus
/// an append-only appointment history. Only two writes ever touch this:
/// the registration insert and the appointment `$push`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub visit_no: String,
    pub name: String,
    pub dob: String,
    /// Display-only, computed by the caller at submission time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_history: Option<String>,
    pub appointments: Vec<AppointmentEntry>,
    pub created_at: DateTime<Utc>,
}

/// Append-only payment ledger entry, one per non-skipped booking action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub visit_no: String,
    pub clinic: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub payment: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /patient`. A present `visit_no` selects the
/// returning-patient path; otherwise this is a registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookVisitRequest {
    #[serde(default)]
    pub visit_no: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub medical_conditions: Option<String>,
    #[serde(default)]
    pub allergy: Option<String>,
    #[serde(default)]
    pub family_history: Option<String>,
    pub clinic: String,
    pub location: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub payment: Option<String>,
    #[serde(default)]
    pub skip_payment: bool,
}

impl BookVisitRequest {
    pub fn appointment(&self) -> AppointmentEntry {
        AppointmentEntry {
            clinic: self.clinic.clone(),
            location: self.location.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VisitQuery {
    #[serde(rename = "visitNo")]
    pub visit_no: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotCountQuery {
    pub clinic: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}
