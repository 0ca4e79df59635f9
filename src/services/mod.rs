pub mod ad_pool_resolver;
pub mod content_store;
pub mod playlist_resolver;
pub mod resolution_service;
pub mod targeting;
pub mod time_window;
