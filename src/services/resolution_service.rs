use crate::services::content_store::{self, ItemRecord, StoreError};
use crate::services::{ad_pool_resolver, playlist_resolver};
use chrono::{DateTime, Utc};
use diesel::sqlite::SqliteConnection;
use serde::Serialize;
use thiserror::Error;

/// Every branch of a resolution is a named outcome. `NotFound` means the
/// query succeeded and nothing is eligible; `Unavailable` means the store
/// itself failed. The two are never conflated: a caller idles on the first
/// and retries with backoff on the second.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown kiosk {0}")]
    UnknownKiosk(i32),
    #[error("no eligible playlist and no default configured")]
    NotFound,
    #[error("content store unavailable: {0}")]
    Unavailable(#[from] StoreError),
    #[error("playlists {0} and {1} tie on every comparator key")]
    ConfigurationAmbiguous(i32, i32),
}

#[derive(Debug, Serialize)]
pub struct ResolvedPlaylist {
    pub id: i32,
    pub name: String,
    pub priority: i32,
    pub is_default: bool,
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Serialize)]
pub struct ResolvedCreative {
    pub id: i32,
    pub campaign_id: i32,
    pub name: String,
    pub media_url: String,
    pub duration_secs: i32,
}

/// Loads the tenant snapshot for the kiosk, normalizes `at` to the tenant's
/// timezone, and hands both to the pure resolver. Schedules are authored in
/// local wall time, so weekday and time-of-day are evaluated there, never
/// in UTC.
pub fn resolve_playlist(
    conn: &mut SqliteConnection,
    kiosk_id: i32,
    at: DateTime<Utc>,
) -> Result<ResolvedPlaylist, ResolveError> {
    let (kiosk, city, tz) =
        content_store::load_kiosk(conn, kiosk_id)?.ok_or(ResolveError::UnknownKiosk(kiosk_id))?;
    let local_now = at.with_timezone(&tz).naive_local();

    let candidates = content_store::load_playlist_candidates(conn, city.id)?;
    let winner = playlist_resolver::resolve(&candidates, kiosk.id, city.id, local_now)?;

    // A playlist whose items are all inactive is still a valid resolution;
    // emptiness is the player's concern.
    let items = content_store::load_playlist_items(conn, winner.playlist.id)?;
    tracing::debug!(
        kiosk = kiosk.id,
        playlist = winner.playlist.id,
        %local_now,
        "resolved playlist"
    );

    Ok(ResolvedPlaylist {
        id: winner.playlist.id,
        name: winner.playlist.name.clone(),
        priority: winner.playlist.priority,
        is_default: winner.playlist.is_default,
        items,
    })
}

/// Same snapshot-and-normalize dance for the ad pool. An empty pool is a
/// successful result.
pub fn resolve_ad_pool(
    conn: &mut SqliteConnection,
    kiosk_id: i32,
    at: DateTime<Utc>,
) -> Result<Vec<ResolvedCreative>, ResolveError> {
    let (kiosk, city, tz) =
        content_store::load_kiosk(conn, kiosk_id)?.ok_or(ResolveError::UnknownKiosk(kiosk_id))?;
    let local_now = at.with_timezone(&tz).naive_local();

    let campaigns = content_store::load_campaign_candidates(conn, city.id)?;
    let pool = ad_pool_resolver::resolve(&campaigns, kiosk.id, city.id, local_now);
    tracing::debug!(kiosk = kiosk.id, creatives = pool.len(), %local_now, "resolved ad pool");

    Ok(pool
        .into_iter()
        .map(|c| ResolvedCreative {
            id: c.id,
            campaign_id: c.campaign_id,
            name: c.name.clone(),
            media_url: c.media_url.clone(),
            duration_secs: c.duration_secs,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content_store::test_support::*;
    use chrono::{NaiveDate, NaiveTime};

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn business_hours_playlist_wins_on_wednesday_default_on_saturday() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        // America/Sao_Paulo is UTC-3 in June (no DST since 2019).
        let city = insert_city(&mut conn, "niteroi", "America/Sao_Paulo");
        let kiosk = insert_kiosk(&mut conn, city.id, "k1");

        let mut business = playlist_row(city.id, "business hours", 5);
        business.weekdays = r#"["mon","tue","wed","thu","fri"]"#.to_string();
        business.start_time = NaiveTime::from_hms_opt(8, 0, 0);
        business.end_time = NaiveTime::from_hms_opt(18, 0, 0);
        let business = insert_playlist(&mut conn, &business);
        insert_item(&mut conn, business.id, "image", 0, true);

        let mut fallback = playlist_row(city.id, "fallback", 0);
        fallback.is_default = true;
        let fallback = insert_playlist(&mut conn, &fallback);

        // Wednesday 2025-06-04 10:00 local = 13:00 UTC.
        let resolved =
            resolve_playlist(&mut conn, kiosk.id, utc("2025-06-04T13:00:00Z")).unwrap();
        assert_eq!(resolved.id, business.id);
        assert_eq!(resolved.items.len(), 1);

        // Saturday 2025-06-07 10:00 local = 13:00 UTC.
        let resolved =
            resolve_playlist(&mut conn, kiosk.id, utc("2025-06-07T13:00:00Z")).unwrap();
        assert_eq!(resolved.id, fallback.id);
        assert!(resolved.is_default);
    }

    #[test]
    fn weekday_is_evaluated_in_tenant_local_time_not_utc() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let city = insert_city(&mut conn, "niteroi", "America/Sao_Paulo");
        let kiosk = insert_kiosk(&mut conn, city.id, "k1");

        let mut monday_only = playlist_row(city.id, "monday", 5);
        monday_only.weekdays = r#"["mon"]"#.to_string();
        let monday_only = insert_playlist(&mut conn, &monday_only);

        // 2025-06-10T01:00Z is Tuesday in UTC but still Monday 22:00 local.
        let resolved =
            resolve_playlist(&mut conn, kiosk.id, utc("2025-06-10T01:00:00Z")).unwrap();
        assert_eq!(resolved.id, monday_only.id);
    }

    #[test]
    fn playlist_with_only_inactive_items_is_still_returned() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let city = insert_city(&mut conn, "niteroi", "America/Sao_Paulo");
        let kiosk = insert_kiosk(&mut conn, city.id, "k1");
        let playlist = insert_playlist(&mut conn, &playlist_row(city.id, "p", 0));
        insert_item(&mut conn, playlist.id, "image", 0, false);

        let resolved =
            resolve_playlist(&mut conn, kiosk.id, utc("2025-06-04T13:00:00Z")).unwrap();
        assert_eq!(resolved.id, playlist.id);
        assert!(resolved.items.is_empty());
    }

    #[test]
    fn nothing_eligible_and_no_default_is_not_found() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let city = insert_city(&mut conn, "niteroi", "America/Sao_Paulo");
        let kiosk = insert_kiosk(&mut conn, city.id, "k1");

        let mut monday_only = playlist_row(city.id, "monday", 5);
        monday_only.weekdays = r#"["mon"]"#.to_string();
        insert_playlist(&mut conn, &monday_only);

        // Saturday.
        let err = resolve_playlist(&mut conn, kiosk.id, utc("2025-06-07T13:00:00Z")).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound));
    }

    #[test]
    fn unknown_kiosk_is_its_own_outcome() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();

        let err = resolve_playlist(&mut conn, 999, utc("2025-06-04T13:00:00Z")).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownKiosk(999)));
        let err = resolve_ad_pool(&mut conn, 999, utc("2025-06-04T13:00:00Z")).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownKiosk(999)));
    }

    #[test]
    fn bad_snapshot_data_surfaces_as_unavailable() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let city = insert_city(&mut conn, "niteroi", "America/Sao_Paulo");
        let kiosk = insert_kiosk(&mut conn, city.id, "k1");

        let mut broken = playlist_row(city.id, "broken", 0);
        broken.weekdays = r#"["noday"]"#.to_string();
        insert_playlist(&mut conn, &broken);

        let err = resolve_playlist(&mut conn, kiosk.id, utc("2025-06-04T13:00:00Z")).unwrap_err();
        assert!(matches!(err, ResolveError::Unavailable(_)));
    }

    #[test]
    fn single_day_campaign_covers_its_whole_local_day() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let city = insert_city(&mut conn, "niteroi", "America/Sao_Paulo");
        let kiosk = insert_kiosk(&mut conn, city.id, "k1");

        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let campaign =
            insert_campaign(&mut conn, &campaign_row(city.id, "one-day", "active", day, day));
        insert_creative(&mut conn, campaign.id, "c1", 0, true);

        // 2025-06-01T23:59:59 local = 2025-06-02T02:59:59Z: included.
        let pool_ads = resolve_ad_pool(&mut conn, kiosk.id, utc("2025-06-02T02:59:59Z")).unwrap();
        assert_eq!(pool_ads.len(), 1);

        // 2025-06-02T00:00:00 local = 2025-06-02T03:00:00Z: excluded.
        let pool_ads = resolve_ad_pool(&mut conn, kiosk.id, utc("2025-06-02T03:00:00Z")).unwrap();
        assert!(pool_ads.is_empty());
    }

    #[test]
    fn booked_campaigns_interleave_through_the_whole_stack() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let city = insert_city(&mut conn, "niteroi", "America/Sao_Paulo");
        let kiosk = insert_kiosk(&mut conn, city.id, "k1");

        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let c1 = insert_campaign(&mut conn, &campaign_row(city.id, "c1", "active", start, end));
        let c2 = insert_campaign(&mut conn, &campaign_row(city.id, "c2", "active", start, end));
        let a = insert_creative(&mut conn, c1.id, "a", 0, true);
        let b = insert_creative(&mut conn, c1.id, "b", 1, true);
        let c = insert_creative(&mut conn, c2.id, "c", 0, true);

        // Also a campaign targeted at some other kiosk: must not leak in.
        let other_kiosk = insert_kiosk(&mut conn, city.id, "k2");
        let mut targeted = campaign_row(city.id, "targeted", "active", start, end);
        targeted.all_kiosks = false;
        let targeted = insert_campaign(&mut conn, &targeted);
        insert_creative(&mut conn, targeted.id, "x", 0, true);
        link_campaign_kiosk(&mut conn, targeted.id, other_kiosk.id);

        let resolved = resolve_ad_pool(&mut conn, kiosk.id, utc("2025-06-15T12:00:00Z")).unwrap();
        let ids: Vec<i32> = resolved.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn explicitly_targeted_playlist_reaches_only_its_kiosk() {
        let (_dir, pool) = test_pool();
        let mut conn = pool.get().unwrap();
        let city = insert_city(&mut conn, "niteroi", "America/Sao_Paulo");
        let k1 = insert_kiosk(&mut conn, city.id, "k1");
        let k2 = insert_kiosk(&mut conn, city.id, "k2");

        let mut targeted = playlist_row(city.id, "targeted", 10);
        targeted.all_kiosks = false;
        let targeted = insert_playlist(&mut conn, &targeted);
        link_playlist_kiosk(&mut conn, targeted.id, k1.id);

        let broad = insert_playlist(&mut conn, &playlist_row(city.id, "broad", 0));

        let at = utc("2025-06-04T13:00:00Z");
        assert_eq!(resolve_playlist(&mut conn, k1.id, at).unwrap().id, targeted.id);
        assert_eq!(resolve_playlist(&mut conn, k2.id, at).unwrap().id, broad.id);
    }
}
