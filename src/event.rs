use crate::capabilities::{HttpResult, KvResult};
use crate::model::RecordId;
use crate::remote::RemoteConfig;

/// Everything that can happen to the app: user intents from the shell plus
/// completed capability requests flowing back in.
#[derive(Debug, Clone)]
pub enum Event {
    /// Shell start-up, carrying the injected remote settings.
    Started { config: RemoteConfig },

    // list screen intents
    SearchChanged { query: String },
    FavoritesFilterToggled,
    PageSelected { page: u32 },
    FavoriteToggled { id: RecordId },

    // detail screen intents
    DetailOpened { id: RecordId },
    NextRequested,
    PrevRequested,
    BackToList,

    // capability results; page/id tags guard against stale responses
    PageFetched { page: u32, result: Box<HttpResult> },
    RecordFetched { id: RecordId, result: Box<HttpResult> },
    NavScopeFetched { result: Box<HttpResult> },
    FavoritesLoaded { result: KvResult },
    FavoritesSaved { result: KvResult },
    FavoriteMirrored { id: RecordId, result: Box<HttpResult> },
}

impl Event {
    /// Stable name for log correlation.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Started { .. } => "started",
            Event::SearchChanged { .. } => "search_changed",
            Event::FavoritesFilterToggled => "favorites_filter_toggled",
            Event::PageSelected { .. } => "page_selected",
            Event::FavoriteToggled { .. } => "favorite_toggled",
            Event::DetailOpened { .. } => "detail_opened",
            Event::NextRequested => "next_requested",
            Event::PrevRequested => "prev_requested",
            Event::BackToList => "back_to_list",
            Event::PageFetched { .. } => "page_fetched",
            Event::RecordFetched { .. } => "record_fetched",
            Event::NavScopeFetched { .. } => "nav_scope_fetched",
            Event::FavoritesLoaded { .. } => "favorites_loaded",
            Event::FavoritesSaved { .. } => "favorites_saved",
            Event::FavoriteMirrored { .. } => "favorite_mirrored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(
            Event::Started {
                config: RemoteConfig::default()
            }
            .name(),
            "started"
        );
        assert_eq!(Event::NextRequested.name(), "next_requested");
        assert_eq!(
            Event::FavoriteToggled {
                id: RecordId::new("1")
            }
            .name(),
            "favorite_toggled"
        );
    }
}
