use crate::db::DbPool;
use crate::models::{
    City, Kiosk, NewCampaign, NewCampaignKiosk, NewCity, NewCreative, NewKiosk, NewPlaylist,
    NewPlaylistItem, Weekday, WeekdaySet,
};
use anyhow::Result;
use chrono::{Duration, NaiveTime, Utc};
use diesel::prelude::*;

/// Seeds a demo tenant on first run so a fresh server resolves something.
/// Skipped entirely once any city exists.
pub fn seed_demo(pool: &DbPool) -> Result<()> {
    use crate::schema::{
        campaign_kiosks, campaigns, cities, creatives, kiosks, playlist_items, playlists,
    };

    let mut conn = pool.get()?;

    let existing: i64 = cities::table.count().get_result(&mut conn)?;
    if existing > 0 {
        return Ok(());
    }

    let city: City = diesel::insert_into(cities::table)
        .values(&NewCity {
            name: "Niterói".to_string(),
            slug: "niteroi".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            is_active: true,
        })
        .returning(City::as_select())
        .get_result(&mut conn)?;

    let kiosk: Kiosk = diesel::insert_into(kiosks::table)
        .values(&NewKiosk {
            city_id: city.id,
            name: "Praça Arariboia".to_string(),
            identifier: uuid::Uuid::new_v4().to_string(),
            status: "active".to_string(),
        })
        .returning(Kiosk::as_select())
        .get_result(&mut conn)?;

    // Weekday business-hours program, plus the always-on default that
    // catches nights and weekends.
    let business_id: i32 = diesel::insert_into(playlists::table)
        .values(&NewPlaylist {
            city_id: city.id,
            name: "Programação Comercial".to_string(),
            description: Some("Conteúdo de horário comercial".to_string()),
            start_time: NaiveTime::from_hms_opt(8, 0, 0),
            end_time: NaiveTime::from_hms_opt(18, 0, 0),
            weekdays: WeekdaySet::from_days(&[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ])
            .to_json(),
            all_kiosks: true,
            is_active: true,
            is_default: false,
            priority: 5,
        })
        .returning(playlists::id)
        .get_result(&mut conn)?;

    let default_id: i32 = diesel::insert_into(playlists::table)
        .values(&NewPlaylist {
            city_id: city.id,
            name: "Programação Padrão".to_string(),
            description: None,
            start_time: None,
            end_time: None,
            weekdays: "[]".to_string(),
            all_kiosks: true,
            is_active: true,
            is_default: true,
            priority: 0,
        })
        .returning(playlists::id)
        .get_result(&mut conn)?;

    let items = [
        (business_id, "news", "Notícias da cidade", 0, 20),
        (business_id, "events", "Agenda de eventos", 1, 15),
        (business_id, "ad_slot", "Intervalo publicitário", 2, 30),
        (business_id, "weather", "Previsão do tempo", 3, 10),
        (default_id, "clock", "Relógio", 0, 10),
        (default_id, "image", "Vista de Niterói", 1, 15),
    ];
    for (playlist_id, item_type, name, position, duration_secs) in items {
        diesel::insert_into(playlist_items::table)
            .values(&NewPlaylistItem {
                playlist_id,
                item_type: item_type.to_string(),
                name: name.to_string(),
                content_url: None,
                duration_secs,
                position,
                is_active: true,
            })
            .execute(&mut conn)?;
    }

    // One running campaign, explicitly targeted at the seeded kiosk.
    let today = Utc::now().date_naive();
    let campaign_id: i32 = diesel::insert_into(campaigns::table)
        .values(&NewCampaign {
            city_id: city.id,
            name: "Verão em Niterói".to_string(),
            status: "active".to_string(),
            start_date: today - Duration::days(7),
            end_date: today + Duration::days(30),
            all_kiosks: false,
        })
        .returning(campaigns::id)
        .get_result(&mut conn)?;

    diesel::insert_into(campaign_kiosks::table)
        .values(&NewCampaignKiosk {
            campaign_id,
            kiosk_id: kiosk.id,
        })
        .execute(&mut conn)?;

    for (name, position) in [("abertura", 0), ("praias", 1), ("encerramento", 2)] {
        diesel::insert_into(creatives::table)
            .values(&NewCreative {
                campaign_id,
                name: name.to_string(),
                media_url: format!("ads/verao-{}.mp4", name),
                duration_secs: 15,
                position,
                is_active: true,
            })
            .execute(&mut conn)?;
    }

    tracing::info!(
        city = %city.slug,
        kiosk = kiosk.id,
        "seeded demo tenant"
    );

    Ok(())
}
