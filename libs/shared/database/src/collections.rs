//! Layout of the `Patient` database.

/// Clinic closure records, shared across branches.
pub const CLOSED_DAYS: &str = "closed_days";

/// Append-only payment ledger, shared across branches.
pub const PAYMENT_RECORD: &str = "payment_record";

/// Visit records are partitioned into one collection per clinic location,
/// with a catch-all for locations the directory does not know.
pub fn visit_history_collection(location: &str) -> &'static str {
    match location {
        "Borivali" => "Patients_history_borivali",
        "Malad" => "Patients_history_malad",
        "Bhayander" => "Patients_history_bhayander",
        _ => "Patients_history_other",
    }
}
