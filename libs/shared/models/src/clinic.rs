use serde::{Deserialize, Serialize};

/// Bookings a single hourly slot can hold before it is reported full.
pub const SLOT_CAPACITY: u64 = 10;

pub fn slot_is_full(occupancy: u64) -> bool {
    occupancy >= SLOT_CAPACITY
}

/// The two names a clinic is known by: its display name and the short
/// location code that partitions visit-record storage. Closure records may
/// be scoped by either one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicIdentity {
    pub name: String,
    pub location: String,
}

impl ClinicIdentity {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// Who a closure record applies to, parsed from its `branch` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosureScope {
    All,
    Branch(String),
}

impl ClosureScope {
    pub fn parse(branch: &str) -> Self {
        if branch == "All" {
            ClosureScope::All
        } else {
            ClosureScope::Branch(branch.to_string())
        }
    }

    pub fn applies_to(&self, clinic: &ClinicIdentity) -> bool {
        match self {
            ClosureScope::All => true,
            ClosureScope::Branch(branch) => branch == &clinic.name || branch == &clinic.location,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Clinic {
    pub name: &'static str,
    pub address: &'static str,
    pub location: &'static str,
    pub timings: &'static [&'static str],
}

impl Clinic {
    pub fn identity(&self) -> ClinicIdentity {
        ClinicIdentity::new(self.name, self.location)
    }
}

/// The branches patients can book into. Timings may carry a shift label such
/// as "(Morning)" which the slot parser strips.
pub const CLINICS: &[Clinic] = &[
    Clinic {
        name: "Narwal Clinic",
        address: "Shop 12, Shreeji Heights, Chandavarkar Road, Borivali West, Mumbai 400092",
        location: "Borivali",
        timings: &["09:00 AM - 01:00 PM (Morning)", "05:00 PM - 09:00 PM (Evening)"],
    },
    Clinic {
        name: "Dr.Narwal Clinic",
        address: "Ground Floor, Harmony Plaza, Daftary Road, Malad East, Mumbai 400097",
        location: "Malad",
        timings: &["09:00 AM - 01:00 PM"],
    },
    Clinic {
        name: "Shraddha Clinic",
        address: "Shop 5, Sai Darshan Complex, Maxus Mall Road, Bhayander West, Mumbai 401101",
        location: "Bhayander",
        timings: &["10:00 AM - 02:00 PM"],
    },
];

pub fn find_clinic(name: &str) -> Option<&'static Clinic> {
    CLINICS.iter().find(|clinic| clinic.name == name)
}
