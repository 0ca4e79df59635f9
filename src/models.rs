use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Closed value types
//
// Schedules and type tags arrive from the database as text columns. They are
// decoded into these types when candidate records are loaded; anything that
// does not parse is rejected at that boundary, never inside the resolvers.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }

    fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

/// Weekday recurrence set. Empty means "every day".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    pub fn from_days(days: &[Weekday]) -> Self {
        WeekdaySet(days.iter().fold(0, |acc, d| acc | d.bit()))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, day: chrono::Weekday) -> bool {
        self.0 & Weekday::from_chrono(day).bit() != 0
    }

    /// Decodes the column format, a JSON array of day tokens:
    /// `["mon","wed","fri"]`. Unknown tokens fail the whole set.
    pub fn parse_json(text: &str) -> Result<Self, serde_json::Error> {
        let days: Vec<Weekday> = serde_json::from_str(text)?;
        Ok(Self::from_days(&days))
    }

    pub fn to_json(&self) -> String {
        let days: Vec<Weekday> = Weekday::ALL
            .iter()
            .copied()
            .filter(|d| self.0 & d.bit() != 0)
            .collect();
        serde_json::to_string(&days).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Daily time-of-day window, inclusive on both bounds. A window where
/// `end < start` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Image,
    Video,
    AdSlot,
    Weather,
    News,
    Events,
    Feed,
    CustomMarkup,
    Clock,
}

impl ItemType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(ItemType::Image),
            "video" => Some(ItemType::Video),
            "ad_slot" => Some(ItemType::AdSlot),
            "weather" => Some(ItemType::Weather),
            "news" => Some(ItemType::News),
            "events" => Some(ItemType::Events),
            "feed" => Some(ItemType::Feed),
            "custom_markup" => Some(ItemType::CustomMarkup),
            "clock" => Some(ItemType::Clock),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ItemType::Image => "image",
            ItemType::Video => "video",
            ItemType::AdSlot => "ad_slot",
            ItemType::Weather => "weather",
            ItemType::News => "news",
            ItemType::Events => "events",
            ItemType::Feed => "feed",
            ItemType::CustomMarkup => "custom_markup",
            ItemType::Clock => "clock",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Active,
    Paused,
    Ended,
}

impl CampaignStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(CampaignStatus::Draft),
            "scheduled" => Some(CampaignStatus::Scheduled),
            "active" => Some(CampaignStatus::Active),
            "paused" => Some(CampaignStatus::Paused),
            "ended" => Some(CampaignStatus::Ended),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Scheduled => "scheduled",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Ended => "ended",
        }
    }
}

// ---------------------------------------------------------------------------
// Row models
// ---------------------------------------------------------------------------

// Tenant models
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::cities)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub timezone: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::cities)]
pub struct NewCity {
    pub name: String,
    pub slug: String,
    pub timezone: String,
    pub is_active: bool,
}

// Kiosk models
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::kiosks)]
pub struct Kiosk {
    pub id: i32,
    pub city_id: i32,
    pub name: String,
    pub identifier: String,
    pub status: String,
    pub last_heartbeat: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::kiosks)]
pub struct NewKiosk {
    pub city_id: i32,
    pub name: String,
    pub identifier: String,
    pub status: String,
}

// Playlist models
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::playlists)]
pub struct Playlist {
    pub id: i32,
    pub city_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub weekdays: String,
    pub all_kiosks: bool,
    pub is_active: bool,
    pub is_default: bool,
    pub priority: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::playlists)]
pub struct NewPlaylist {
    pub city_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub weekdays: String,
    pub all_kiosks: bool,
    pub is_active: bool,
    pub is_default: bool,
    pub priority: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::playlist_kiosks)]
pub struct PlaylistKiosk {
    pub id: i32,
    pub playlist_id: i32,
    pub kiosk_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::playlist_kiosks)]
pub struct NewPlaylistKiosk {
    pub playlist_id: i32,
    pub kiosk_id: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::playlist_items)]
pub struct PlaylistItem {
    pub id: i32,
    pub playlist_id: i32,
    pub item_type: String,
    pub name: String,
    pub content_url: Option<String>,
    pub duration_secs: i32,
    pub position: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::playlist_items)]
pub struct NewPlaylistItem {
    pub playlist_id: i32,
    pub item_type: String,
    pub name: String,
    pub content_url: Option<String>,
    pub duration_secs: i32,
    pub position: i32,
    pub is_active: bool,
}

// Campaign models
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct Campaign {
    pub id: i32,
    pub city_id: i32,
    pub name: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub all_kiosks: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct NewCampaign {
    pub city_id: i32,
    pub name: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub all_kiosks: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::campaign_kiosks)]
pub struct CampaignKiosk {
    pub id: i32,
    pub campaign_id: i32,
    pub kiosk_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::campaign_kiosks)]
pub struct NewCampaignKiosk {
    pub campaign_id: i32,
    pub kiosk_id: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::creatives)]
pub struct Creative {
    pub id: i32,
    pub campaign_id: i32,
    pub name: String,
    pub media_url: String,
    pub duration_secs: i32,
    pub position: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::creatives)]
pub struct NewCreative {
    pub campaign_id: i32,
    pub name: String,
    pub media_url: String,
    pub duration_secs: i32,
    pub position: i32,
    pub is_active: bool,
}

// Impression models
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::impressions)]
pub struct Impression {
    pub id: i32,
    pub creative_id: i32,
    pub kiosk_id: i32,
    pub displayed_at: NaiveDateTime,
    pub duration_viewed: i32,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::impressions)]
pub struct NewImpression {
    pub creative_id: i32,
    pub kiosk_id: i32,
    pub duration_viewed: i32,
}
