use crate::models::{CampaignStatus, DailyWindow, WeekdaySet};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Recurrence gate for playlists: a weekday set plus an optional daily
/// time-of-day window. An empty weekday set means every day; no window
/// means all day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecurrenceRule {
    pub weekdays: WeekdaySet,
    pub window: Option<DailyWindow>,
}

/// Pure predicate: does `local_now` fall inside the rule? The instant is
/// always supplied by the caller, already normalized to the tenant's
/// timezone; nothing in here reads a clock.
///
/// Both window bounds are inclusive. A window with `end < start` wraps past
/// midnight and matches when the time of day is at or after `start` or at
/// or before `end`.
pub fn recurrence_matches(rule: &RecurrenceRule, local_now: NaiveDateTime) -> bool {
    if !rule.weekdays.is_empty() && !rule.weekdays.contains(local_now.weekday()) {
        return false;
    }
    match rule.window {
        None => true,
        Some(w) => {
            let tod = local_now.time();
            if w.end < w.start {
                tod >= w.start || tod <= w.end
            } else {
                w.start <= tod && tod <= w.end
            }
        }
    }
}

/// Campaign gate: lifecycle status must be exactly `active` AND the
/// tenant-local calendar date must lie inside the inclusive booking range.
/// The two conditions are independent; a covering date range never rescues
/// a paused or ended campaign.
pub fn campaign_matches(
    status: CampaignStatus,
    start_date: NaiveDate,
    end_date: NaiveDate,
    local_now: NaiveDateTime,
) -> bool {
    if status != CampaignStatus::Active {
        return false;
    }
    let today = local_now.date();
    start_date <= today && today <= end_date
}
