use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use regex::Regex;

use shared_models::clinic::ClinicIdentity;

use crate::models::ClosureRecord;
use crate::services::closure::closed_reason;

/// Minimum lead time before the first offered date.
const LEAD_DAYS: i64 = 3;

/// How many dates the booking flow offers.
pub const BOOKING_DATE_COUNT: usize = 5;

/// Scan guard against closure data that never leaves a closed stretch.
const MAX_SCAN_DAYS: i64 = 3650;

fn range_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{2}:\d{2} [AP]M) - (\d{2}:\d{2} [AP]M)").unwrap())
}

fn label_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)").unwrap())
}

/// The next `count` bookable dates for a clinic, ascending: scanning starts
/// `LEAD_DAYS` after `today` and skips Sundays and closed days.
pub fn booking_dates(
    today: NaiveDate,
    clinic: &ClinicIdentity,
    closures: &[ClosureRecord],
    count: usize,
) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(count);
    let mut offset = LEAD_DAYS;
    while dates.len() < count {
        if offset > MAX_SCAN_DAYS {
            return Err(anyhow!(
                "no {} bookable dates within {} days; check closure records",
                count,
                MAX_SCAN_DAYS
            ));
        }
        let day = today + Duration::days(offset);
        offset += 1;
        if day.weekday() == Weekday::Sun {
            continue;
        }
        if closed_reason(day, clinic, closures).is_some() {
            continue;
        }
        dates.push(day);
    }
    Ok(dates)
}

/// Expands operating-hour ranges into one-hour slot labels, end-exclusive:
/// "09:00 AM - 01:00 PM" yields 09, 10, 11 and 12 o'clock slots. Shift
/// labels such as "(Morning)" are stripped, range order is preserved and
/// overlapping ranges are not deduplicated.
pub fn hourly_slots<S: AsRef<str>>(timings: &[S]) -> Vec<String> {
    let mut slots = Vec::new();
    for range in timings {
        let clean = label_pattern().replace_all(range.as_ref(), "");
        let Some(caps) = range_pattern().captures(clean.trim()) else {
            continue;
        };
        let (Ok(start), Ok(end)) = (parse_clock(&caps[1]), parse_clock(&caps[2])) else {
            continue;
        };
        let mut slot = start;
        let mut safety = 0;
        while slot < end && safety < 24 {
            slots.push(slot.format("%I:00 %p").to_string());
            slot += Duration::hours(1);
            safety += 1;
        }
    }
    slots
}

fn parse_clock(raw: &str) -> chrono::format::ParseResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%I:%M %p")
}
