use crate::services::content_store::PlaylistCandidate;
use crate::services::resolution_service::ResolveError;
use crate::services::{targeting, time_window};
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// Total order over playlist candidates: highest priority first, then lowest
/// id. Two candidates only compare equal if they share an id, which a sane
/// snapshot never produces.
fn compare(a: &PlaylistCandidate, b: &PlaylistCandidate) -> Ordering {
    b.playlist
        .priority
        .cmp(&a.playlist.priority)
        .then(a.playlist.id.cmp(&b.playlist.id))
}

/// Picks the single playlist a kiosk must render at `local_now`.
///
/// Candidates are filtered by tenant (a defensive re-check; the snapshot is
/// already tenant-scoped), active flag, targeting, and recurrence rule, then
/// ranked by the comparator above. When nothing survives, the tenant's
/// default playlists catch the gap, ignoring their own schedule and
/// targeting. With no default either, the outcome is `NotFound` - the
/// engine never invents content.
pub fn resolve<'a>(
    candidates: &'a [PlaylistCandidate],
    kiosk_id: i32,
    city_id: i32,
    local_now: NaiveDateTime,
) -> Result<&'a PlaylistCandidate, ResolveError> {
    let eligible: Vec<&PlaylistCandidate> = candidates
        .iter()
        .filter(|c| c.playlist.city_id == city_id)
        .filter(|c| c.playlist.is_active)
        .filter(|c| targeting::applies(*c, kiosk_id))
        .filter(|c| time_window::recurrence_matches(&c.rule, local_now))
        .collect();

    if let Some(winner) = select(&eligible)? {
        return Ok(winner);
    }

    let defaults: Vec<&PlaylistCandidate> = candidates
        .iter()
        .filter(|c| c.playlist.city_id == city_id)
        .filter(|c| c.playlist.is_active)
        .filter(|c| c.playlist.is_default)
        .collect();

    select(&defaults)?.ok_or(ResolveError::NotFound)
}

fn select<'a>(
    pool: &[&'a PlaylistCandidate],
) -> Result<Option<&'a PlaylistCandidate>, ResolveError> {
    let mut ranked = pool.to_vec();
    ranked.sort_by(|a, b| compare(a, b));
    match ranked.as_slice() {
        [] => Ok(None),
        &[single] => Ok(Some(single)),
        &[first, second, ..] => {
            if compare(first, second) == Ordering::Equal {
                Err(ResolveError::ConfigurationAmbiguous(
                    first.playlist.id,
                    second.playlist.id,
                ))
            } else {
                Ok(Some(first))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyWindow, Playlist, Weekday, WeekdaySet};
    use crate::services::time_window::RecurrenceRule;
    use chrono::{NaiveDate, NaiveTime};

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn candidate(id: i32, priority: i32) -> PlaylistCandidate {
        PlaylistCandidate {
            playlist: Playlist {
                id,
                city_id: 1,
                name: format!("playlist {}", id),
                description: None,
                start_time: None,
                end_time: None,
                weekdays: "[]".to_string(),
                all_kiosks: true,
                is_active: true,
                is_default: false,
                priority,
                created_at: ts(),
                updated_at: ts(),
            },
            rule: RecurrenceRule::default(),
            kiosk_ids: vec![],
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn highest_priority_wins() {
        let candidates = vec![candidate(1, 0), candidate(2, 5), candidate(3, 3)];
        let winner = resolve(&candidates, 1, 1, at(2025, 6, 4, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 2);
    }

    #[test]
    fn equal_priority_falls_back_to_lowest_id() {
        let candidates = vec![candidate(7, 5), candidate(3, 5), candidate(9, 5)];
        let winner = resolve(&candidates, 1, 1, at(2025, 6, 4, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 3);
    }

    #[test]
    fn resolution_is_idempotent() {
        let candidates = vec![candidate(7, 5), candidate(3, 5)];
        let now = at(2025, 6, 4, 10, 0);
        let first = resolve(&candidates, 1, 1, now).unwrap().playlist.id;
        for _ in 0..10 {
            assert_eq!(resolve(&candidates, 1, 1, now).unwrap().playlist.id, first);
        }
    }

    #[test]
    fn duplicate_ids_are_ambiguous_not_arbitrary() {
        let candidates = vec![candidate(3, 5), candidate(3, 5)];
        let err = resolve(&candidates, 1, 1, at(2025, 6, 4, 10, 0)).unwrap_err();
        assert!(matches!(err, ResolveError::ConfigurationAmbiguous(3, 3)));
    }

    #[test]
    fn scheduled_playlist_wins_inside_its_window_default_outside() {
        // Tenant "niteroi": playlist A priority 5, Mon-Fri 08:00-18:00;
        // playlist B the always-on default.
        let mut a = candidate(1, 5);
        a.rule = RecurrenceRule {
            weekdays: WeekdaySet::from_days(&[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
            window: Some(DailyWindow {
                start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            }),
        };
        let mut b = candidate(2, 0);
        b.playlist.is_default = true;
        let candidates = vec![a, b];

        // Wednesday 10:00
        let winner = resolve(&candidates, 1, 1, at(2025, 6, 4, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 1);

        // Saturday 10:00
        let winner = resolve(&candidates, 1, 1, at(2025, 6, 7, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 2);
    }

    #[test]
    fn default_catches_gap_despite_its_own_schedule() {
        // The default itself carries a window that does not match; it must
        // still catch the gap.
        let mut a = candidate(1, 5);
        a.rule = RecurrenceRule {
            weekdays: WeekdaySet::from_days(&[Weekday::Mon]),
            window: None,
        };
        let mut b = candidate(2, 0);
        b.playlist.is_default = true;
        b.rule = RecurrenceRule {
            weekdays: WeekdaySet::from_days(&[Weekday::Tue]),
            window: None,
        };
        let candidates = vec![a, b];

        // Saturday: neither rule matches, default still wins.
        let winner = resolve(&candidates, 1, 1, at(2025, 6, 7, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 2);
    }

    #[test]
    fn several_defaults_use_the_same_tie_break() {
        let mut a = candidate(4, 0);
        a.playlist.is_default = true;
        a.rule = RecurrenceRule {
            weekdays: WeekdaySet::from_days(&[Weekday::Mon]),
            window: None,
        };
        let mut b = candidate(2, 0);
        b.playlist.is_default = true;
        b.rule = a.rule;
        let candidates = vec![a, b];

        let winner = resolve(&candidates, 1, 1, at(2025, 6, 7, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 2);
    }

    #[test]
    fn no_candidate_and_no_default_is_not_found() {
        let mut a = candidate(1, 5);
        a.rule = RecurrenceRule {
            weekdays: WeekdaySet::from_days(&[Weekday::Mon]),
            window: None,
        };
        let candidates = vec![a];

        let err = resolve(&candidates, 1, 1, at(2025, 6, 7, 10, 0)).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound));
    }

    #[test]
    fn wrong_tenant_candidates_never_win() {
        let mut foreign = candidate(1, 100);
        foreign.playlist.city_id = 2;
        let mut foreign_default = candidate(2, 0);
        foreign_default.playlist.city_id = 2;
        foreign_default.playlist.is_default = true;
        let ours = candidate(3, 0);
        let candidates = vec![foreign, foreign_default, ours];

        let winner = resolve(&candidates, 1, 1, at(2025, 6, 4, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 3);
    }

    #[test]
    fn targeting_excludes_non_members() {
        let mut targeted = candidate(1, 10);
        targeted.playlist.all_kiosks = false;
        targeted.kiosk_ids = vec![42];
        let broad = candidate(2, 0);
        let candidates = vec![targeted, broad];

        let winner = resolve(&candidates, 42, 1, at(2025, 6, 4, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 1);

        let winner = resolve(&candidates, 7, 1, at(2025, 6, 4, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 2);
    }

    #[test]
    fn inactive_candidates_are_skipped() {
        let mut off = candidate(1, 10);
        off.playlist.is_active = false;
        let on = candidate(2, 0);
        let candidates = vec![off, on];

        let winner = resolve(&candidates, 1, 1, at(2025, 6, 4, 10, 0)).unwrap();
        assert_eq!(winner.playlist.id, 2);
    }
}
