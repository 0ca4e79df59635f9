diesel::table! {
    cities (id) {
        id -> Integer,
        name -> Text,
        slug -> Text,
        timezone -> Text,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    kiosks (id) {
        id -> Integer,
        city_id -> Integer,
        name -> Text,
        identifier -> Text,
        status -> Text,
        last_heartbeat -> Nullable<Timestamp>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    playlists (id) {
        id -> Integer,
        city_id -> Integer,
        name -> Text,
        description -> Nullable<Text>,
        start_time -> Nullable<Time>,
        end_time -> Nullable<Time>,
        weekdays -> Text,
        all_kiosks -> Bool,
        is_active -> Bool,
        is_default -> Bool,
        priority -> Integer,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    playlist_kiosks (id) {
        id -> Integer,
        playlist_id -> Integer,
        kiosk_id -> Integer,
    }
}

diesel::table! {
    playlist_items (id) {
        id -> Integer,
        playlist_id -> Integer,
        item_type -> Text,
        name -> Text,
        content_url -> Nullable<Text>,
        duration_secs -> Integer,
        position -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    campaigns (id) {
        id -> Integer,
        city_id -> Integer,
        name -> Text,
        status -> Text,
        start_date -> Date,
        end_date -> Date,
        all_kiosks -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    campaign_kiosks (id) {
        id -> Integer,
        campaign_id -> Integer,
        kiosk_id -> Integer,
    }
}

diesel::table! {
    creatives (id) {
        id -> Integer,
        campaign_id -> Integer,
        name -> Text,
        media_url -> Text,
        duration_secs -> Integer,
        position -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    impressions (id) {
        id -> Integer,
        creative_id -> Integer,
        kiosk_id -> Integer,
        displayed_at -> Timestamp,
        duration_viewed -> Integer,
    }
}

diesel::joinable!(kiosks -> cities (city_id));
diesel::joinable!(playlists -> cities (city_id));
diesel::joinable!(playlist_kiosks -> playlists (playlist_id));
diesel::joinable!(playlist_kiosks -> kiosks (kiosk_id));
diesel::joinable!(playlist_items -> playlists (playlist_id));
diesel::joinable!(campaigns -> cities (city_id));
diesel::joinable!(campaign_kiosks -> campaigns (campaign_id));
diesel::joinable!(campaign_kiosks -> kiosks (kiosk_id));
diesel::joinable!(creatives -> campaigns (campaign_id));
diesel::joinable!(impressions -> creatives (creative_id));
diesel::joinable!(impressions -> kiosks (kiosk_id));

diesel::allow_tables_to_appear_in_same_query!(
    cities,
    kiosks,
    playlists,
    playlist_kiosks,
    playlist_items,
    campaigns,
    campaign_kiosks,
    creatives,
    impressions,
);
