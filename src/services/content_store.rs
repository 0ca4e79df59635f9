use crate::models::{
    Campaign, CampaignStatus, City, Creative, DailyWindow, Impression, ItemType, Kiosk,
    NewImpression, Playlist, WeekdaySet,
};
use crate::services::targeting::Targeted;
use crate::services::time_window::RecurrenceRule;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Failures at the candidate-loading boundary. A record that does not decode
/// into the closed value types is rejected here, before the resolvers ever
/// see it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] diesel::result::Error),
    #[error("{entity} {id} rejected: {reason}")]
    InvalidRecord {
        entity: &'static str,
        id: i32,
        reason: String,
    },
}

/// A playlist row with its decoded schedule and explicit targeting set,
/// ready for the resolver.
#[derive(Debug, Clone)]
pub struct PlaylistCandidate {
    pub playlist: Playlist,
    pub rule: RecurrenceRule,
    pub kiosk_ids: Vec<i32>,
}

impl PlaylistCandidate {
    pub fn from_row(playlist: Playlist, kiosk_ids: Vec<i32>) -> Result<Self, StoreError> {
        let weekdays = WeekdaySet::parse_json(&playlist.weekdays).map_err(|e| {
            StoreError::InvalidRecord {
                entity: "playlist",
                id: playlist.id,
                reason: format!("bad weekday set {:?}: {}", playlist.weekdays, e),
            }
        })?;
        let window = match (playlist.start_time, playlist.end_time) {
            (None, None) => None,
            (Some(start), Some(end)) => Some(DailyWindow { start, end }),
            _ => {
                return Err(StoreError::InvalidRecord {
                    entity: "playlist",
                    id: playlist.id,
                    reason: "daily window must set both bounds or neither".to_string(),
                })
            }
        };
        Ok(PlaylistCandidate {
            playlist,
            rule: RecurrenceRule { weekdays, window },
            kiosk_ids,
        })
    }
}

impl Targeted for PlaylistCandidate {
    fn targets_all_kiosks(&self) -> bool {
        self.playlist.all_kiosks
    }
    fn kiosk_ids(&self) -> &[i32] {
        &self.kiosk_ids
    }
}

/// A campaign row with decoded status, targeting set, and its active
/// creatives.
#[derive(Debug, Clone)]
pub struct CampaignCandidate {
    pub campaign: Campaign,
    pub status: CampaignStatus,
    pub kiosk_ids: Vec<i32>,
    pub creatives: Vec<Creative>,
}

impl CampaignCandidate {
    pub fn from_rows(
        campaign: Campaign,
        kiosk_ids: Vec<i32>,
        creatives: Vec<Creative>,
    ) -> Result<Self, StoreError> {
        let status =
            CampaignStatus::parse(&campaign.status).ok_or_else(|| StoreError::InvalidRecord {
                entity: "campaign",
                id: campaign.id,
                reason: format!("unknown status {:?}", campaign.status),
            })?;
        Ok(CampaignCandidate {
            campaign,
            status,
            kiosk_ids,
            creatives,
        })
    }
}

impl Targeted for CampaignCandidate {
    fn targets_all_kiosks(&self) -> bool {
        self.campaign.all_kiosks
    }
    fn kiosk_ids(&self) -> &[i32] {
        &self.kiosk_ids
    }
}

/// One resolved playlist item, with its type tag already validated.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRecord {
    pub id: i32,
    pub item_type: ItemType,
    pub name: String,
    pub content_url: Option<String>,
    pub duration_secs: i32,
    pub position: i32,
}

pub fn load_kiosk(
    conn: &mut SqliteConnection,
    kiosk_id: i32,
) -> Result<Option<(Kiosk, City, chrono_tz::Tz)>, StoreError> {
    use crate::schema::{cities, kiosks};

    let kiosk: Option<Kiosk> = kiosks::table
        .find(kiosk_id)
        .select(Kiosk::as_select())
        .first(conn)
        .optional()?;
    let Some(kiosk) = kiosk else {
        return Ok(None);
    };

    let city: City = cities::table
        .find(kiosk.city_id)
        .select(City::as_select())
        .first(conn)?;

    let tz: chrono_tz::Tz =
        city.timezone
            .parse()
            .map_err(|_| StoreError::InvalidRecord {
                entity: "city",
                id: city.id,
                reason: format!("unknown timezone {:?}", city.timezone),
            })?;

    Ok(Some((kiosk, city, tz)))
}

/// All active playlists of the tenant, in insertion order, each with its
/// explicit kiosk set. Time and targeting filtering is the resolver's job.
pub fn load_playlist_candidates(
    conn: &mut SqliteConnection,
    city_id: i32,
) -> Result<Vec<PlaylistCandidate>, StoreError> {
    use crate::schema::{playlist_kiosks, playlists};

    let rows: Vec<Playlist> = playlists::table
        .filter(playlists::city_id.eq(city_id))
        .filter(playlists::is_active.eq(true))
        .order(playlists::id.asc())
        .select(Playlist::as_select())
        .load(conn)?;

    let ids: Vec<i32> = rows.iter().map(|p| p.id).collect();
    let links: Vec<(i32, i32)> = playlist_kiosks::table
        .filter(playlist_kiosks::playlist_id.eq_any(&ids))
        .select((playlist_kiosks::playlist_id, playlist_kiosks::kiosk_id))
        .load(conn)?;

    let mut sets: HashMap<i32, Vec<i32>> = HashMap::new();
    for (playlist_id, kiosk_id) in links {
        sets.entry(playlist_id).or_default().push(kiosk_id);
    }

    rows.into_iter()
        .map(|p| {
            let kiosk_ids = sets.remove(&p.id).unwrap_or_default();
            PlaylistCandidate::from_row(p, kiosk_ids)
        })
        .collect()
}

/// Active items of one playlist, ascending by position then id.
pub fn load_playlist_items(
    conn: &mut SqliteConnection,
    for_playlist: i32,
) -> Result<Vec<ItemRecord>, StoreError> {
    use crate::schema::playlist_items;

    let rows: Vec<crate::models::PlaylistItem> = playlist_items::table
        .filter(playlist_items::playlist_id.eq(for_playlist))
        .filter(playlist_items::is_active.eq(true))
        .order((playlist_items::position.asc(), playlist_items::id.asc()))
        .select(crate::models::PlaylistItem::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|item| {
            let item_type =
                ItemType::parse(&item.item_type).ok_or_else(|| StoreError::InvalidRecord {
                    entity: "playlist item",
                    id: item.id,
                    reason: format!("unknown item type {:?}", item.item_type),
                })?;
            Ok(ItemRecord {
                id: item.id,
                item_type,
                name: item.name,
                content_url: item.content_url,
                duration_secs: item.duration_secs,
                position: item.position,
            })
        })
        .collect()
}

/// All campaigns of the tenant regardless of status or date range; the
/// resolver applies the status and date gates.
pub fn load_campaign_candidates(
    conn: &mut SqliteConnection,
    city_id: i32,
) -> Result<Vec<CampaignCandidate>, StoreError> {
    use crate::schema::{campaign_kiosks, campaigns, creatives};

    let rows: Vec<Campaign> = campaigns::table
        .filter(campaigns::city_id.eq(city_id))
        .order(campaigns::id.asc())
        .select(Campaign::as_select())
        .load(conn)?;

    let ids: Vec<i32> = rows.iter().map(|c| c.id).collect();

    let links: Vec<(i32, i32)> = campaign_kiosks::table
        .filter(campaign_kiosks::campaign_id.eq_any(&ids))
        .select((campaign_kiosks::campaign_id, campaign_kiosks::kiosk_id))
        .load(conn)?;
    let mut sets: HashMap<i32, Vec<i32>> = HashMap::new();
    for (campaign_id, kiosk_id) in links {
        sets.entry(campaign_id).or_default().push(kiosk_id);
    }

    let creative_rows: Vec<Creative> = creatives::table
        .filter(creatives::campaign_id.eq_any(&ids))
        .filter(creatives::is_active.eq(true))
        .order((creatives::position.asc(), creatives::id.asc()))
        .select(Creative::as_select())
        .load(conn)?;
    let mut pools: HashMap<i32, Vec<Creative>> = HashMap::new();
    for creative in creative_rows {
        pools.entry(creative.campaign_id).or_default().push(creative);
    }

    rows.into_iter()
        .map(|c| {
            let kiosk_ids = sets.remove(&c.id).unwrap_or_default();
            let pool = pools.remove(&c.id).unwrap_or_default();
            CampaignCandidate::from_rows(c, kiosk_ids, pool)
        })
        .collect()
}

/// Write-only logging collaborator. The resolvers never read impressions.
/// Returns `None` when the creative does not exist.
pub fn record_impression(
    conn: &mut SqliteConnection,
    creative_id: i32,
    kiosk_id: i32,
    duration_viewed: i32,
) -> Result<Option<Impression>, StoreError> {
    use crate::schema::{creatives, impressions};

    let known: Option<i32> = creatives::table
        .find(creative_id)
        .select(creatives::id)
        .first(conn)
        .optional()?;
    if known.is_none() {
        return Ok(None);
    }

    let row = diesel::insert_into(impressions::table)
        .values(&NewImpression {
            creative_id,
            kiosk_id,
            duration_viewed,
        })
        .returning(Impression::as_select())
        .get_result(conn)?;

    Ok(Some(row))
}
