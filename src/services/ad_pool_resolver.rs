use crate::models::Creative;
use crate::services::content_store::CampaignCandidate;
use crate::services::{targeting, time_window};
use chrono::NaiveDateTime;

/// Collects the creatives a kiosk may interleave at `local_now`, in display
/// order. An empty pool is a normal result - no campaign running is not an
/// error.
///
/// Campaigns carry no explicit priority, so concurrently eligible campaigns
/// interleave in booking order: oldest `created_at` first, id as the final
/// key. Within a campaign, creatives follow their order index, then id.
pub fn resolve<'a>(
    campaigns: &'a [CampaignCandidate],
    kiosk_id: i32,
    city_id: i32,
    local_now: NaiveDateTime,
) -> Vec<&'a Creative> {
    let mut eligible: Vec<&CampaignCandidate> = campaigns
        .iter()
        .filter(|c| c.campaign.city_id == city_id)
        .filter(|c| targeting::applies(*c, kiosk_id))
        .filter(|c| {
            time_window::campaign_matches(
                c.status,
                c.campaign.start_date,
                c.campaign.end_date,
                local_now,
            )
        })
        .collect();

    eligible.sort_by(|a, b| {
        a.campaign
            .created_at
            .cmp(&b.campaign.created_at)
            .then(a.campaign.id.cmp(&b.campaign.id))
    });

    let mut pool: Vec<&Creative> = Vec::new();
    for campaign in eligible {
        let mut creatives: Vec<&Creative> = campaign
            .creatives
            .iter()
            .filter(|c| c.is_active)
            .collect();
        creatives.sort_by(|a, b| a.position.cmp(&b.position).then(a.id.cmp(&b.id)));
        pool.extend(creatives);
    }
    pool
}
