//! Pure date-acceptance predicates. No I/O; "today" is always passed in
//! so callers (and tests) control the evaluation instant.

use std::collections::BTreeSet;

use chrono::{Duration, FixedOffset, NaiveDate, Offset, Utc};

use super::domain::{CampaignWindow, DateValidation};

/// True iff `candidate` lies inside the campaign window AND inside the
/// rolling range `[today - rolling_days, today]`. All four bounds are
/// inclusive.
pub fn date_within_window(candidate: NaiveDate, window: &CampaignWindow, today: NaiveDate) -> bool {
    let rolling_floor = today - Duration::days(i64::from(window.rolling_days));
    window.start <= candidate
        && candidate <= window.end
        && rolling_floor <= candidate
        && candidate <= today
}

/// True iff `candidate` has not been used by the owner before.
pub fn date_unused(candidate: NaiveDate, used: &BTreeSet<NaiveDate>) -> bool {
    !used.contains(&candidate)
}

/// Combined eligibility. The two predicates are evaluated separately so
/// the caller can surface a specific reason; when both fail, the window
/// violation wins.
pub fn evaluate(
    candidate: NaiveDate,
    window: &CampaignWindow,
    today: NaiveDate,
    used: &BTreeSet<NaiveDate>,
) -> DateValidation {
    if !date_within_window(candidate, window, today) {
        DateValidation::OutOfWindow
    } else if !date_unused(candidate, used) {
        DateValidation::DuplicateDate
    } else {
        DateValidation::Valid
    }
}

/// Strict `YYYY-MM-DD` parse. Malformed input yields `None` and callers
/// fail closed rather than letting a parse error escape the boundary.
pub fn parse_submission_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// The calendar date "now" in the campaign's reference offset. Evaluated
/// fresh on every date pick and at commit time, never cached.
pub fn campaign_today(utc_offset_hours: i32) -> NaiveDate {
    Utc::now()
        .with_timezone(&campaign_offset(utc_offset_hours))
        .date_naive()
}

/// The timestamp stamped onto accepted records, in the campaign offset.
pub fn campaign_now(utc_offset_hours: i32) -> chrono::DateTime<FixedOffset> {
    Utc::now().with_timezone(&campaign_offset(utc_offset_hours))
}

/// Out-of-range offsets fall back to UTC; config validates the range
/// before any caller gets here.
fn campaign_offset(utc_offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
}
