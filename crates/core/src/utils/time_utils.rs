use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// Normalizes a calendar day to its UTC window `[start_of_day, end_of_day)`.
///
/// This is the single source of truth for mapping a snapshot date to the
/// instant range its ledger entries and trade exits fall into. The end of the
/// window is exclusive: an event at exactly midnight belongs to the next day.
pub fn day_window_utc(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    let start = Utc.from_utc_datetime(&midnight);
    (start, start + Duration::days(1))
}
