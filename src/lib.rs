//! Shared core for a doa (supplication) reader backed by a Baserow-style
//! spreadsheet API. The shell renders views and executes effects; everything
//! else lives here: the paginated searchable list, the detail screen with
//! cyclic next/prev navigation, and device-local favorites that are mirrored
//! to the remote table on a best-effort basis.
//!
//! Remote reads never fail the UI. Any fetch that cannot complete degrades to
//! a built-in sample set and the screen stays usable.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod event;
pub mod fallback;
pub mod favorites;
pub mod model;
pub mod remote;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::capabilities::{HttpResponse, HttpResult, KvKey, KvOutput};
use crate::favorites::{FavoriteSet, FAVORITES_KEY};
use crate::model::{total_pages_for, DetailState, ListState};
use crate::remote::RemoteStore;

pub use crate::capabilities::{Capabilities, Effect};
pub use crate::event::Event;
pub use crate::model::{Model, Record, RecordId};
pub use crate::remote::RemoteConfig;
pub use crux_core::App as CruxApp;

/// Rows per list page; also the denominator for the page count.
pub const PAGE_SIZE: u32 = 10;
/// Upper bound on the detail screen's navigation scope fetch.
pub const NAV_SCOPE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    NotFound,
    Storage,
    Parse,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Storage => "storage",
            ErrorKind::Parse => "parse",
        }
    }

    /// Whether a later identical attempt could plausibly succeed. The core
    /// itself never retries; shells may use this to offer a refresh.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Storage)
    }
}

/// A classified failure. Read failures are recorded here and then absorbed by
/// the fallback policy; they never abort a screen.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: RecordId,
    pub name: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListViewModel {
    pub items: Vec<ListItem>,
    pub search_query: String,
    pub favorites_only: bool,
    pub page: u32,
    pub total_pages: u32,
    pub loading: bool,
    pub showing_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailViewModel {
    pub id: RecordId,
    pub name: String,
    pub body: String,
    pub translation: String,
    pub is_favorite: bool,
    /// 1-based position within the navigation scope; `0` while unknown.
    pub position: u32,
    pub total: u32,
    /// Preformatted "{position} dari {total}" label, empty while unknown.
    pub position_label: String,
    pub loading: bool,
    pub showing_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub list: ListViewModel,
    /// Present while a detail screen is open.
    pub detail: Option<DetailViewModel>,
    /// False after a favorites write to device storage has failed; the
    /// in-memory set is still authoritative for this session.
    pub favorites_persisted: bool,
}

#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Self::Event, model: &mut Self::Model, caps: &Self::Capabilities) {
        debug!(event = event.name(), "handling event");

        match event {
            Event::Started { config } => {
                *model = Model::new();
                model.remote = RemoteStore::new(config);
                Self::load_favorites(caps);
                Self::fetch_page(model, caps, 1);
                caps.render.render();
            }

            Event::SearchChanged { query } => {
                model.list.search_query = query;
                caps.render.render();
            }

            Event::FavoritesFilterToggled => {
                model.list.favorites_only = !model.list.favorites_only;
                caps.render.render();
            }

            Event::PageSelected { page } => {
                let page = page.clamp(1, model.list.total_pages.max(1));
                if page != model.list.page {
                    Self::fetch_page(model, caps, page);
                }
                caps.render.render();
            }

            Event::PageFetched { page, result } => {
                // A page change while this request was in flight makes the
                // response stale; the current page's fetch is still pending.
                if page != model.list.page {
                    debug!(got = page, current = model.list.page, "dropping stale page");
                    return;
                }

                match Self::read_response(*result).and_then(|r| remote::parse_list_page(r.body()))
                {
                    Ok(fetched) => {
                        model.list.records = fetched.records;
                        model.list.total_pages = total_pages_for(fetched.total_count);
                        model.list.loading = false;
                        model.list.showing_fallback = false;
                        model.last_error = None;

                        // The table can shrink under us; snap back inside it.
                        let last_page = model.list.total_pages;
                        if model.list.page > last_page {
                            Self::fetch_page(model, caps, last_page);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "list fetch failed, showing sample data");
                        model.last_error = Some(e);
                        Self::apply_list_fallback(&mut model.list);
                    }
                }
                caps.render.render();
            }

            Event::FavoritesLoaded { result } => {
                model.favorites_loaded = true;
                model.favorites = match result {
                    Ok(KvOutput::Value(Some(bytes))) => FavoriteSet::from_bytes(&bytes),
                    Ok(KvOutput::Value(None)) => FavoriteSet::default(),
                    Ok(KvOutput::Written) => {
                        warn!("unexpected write acknowledgement while loading favorites");
                        FavoriteSet::default()
                    }
                    Err(e) => {
                        warn!(error = %e, "favorites load failed, starting empty");
                        FavoriteSet::default()
                    }
                };
                caps.render.render();
            }

            Event::FavoriteToggled { id } => {
                let favorite = model.favorites.toggle(&id);
                debug!(%id, favorite, "favorite toggled");

                // Local state first, then device storage, then the remote
                // mirror. Neither write can undo the in-memory change.
                Self::persist_favorites(model, caps);
                match model.remote.set_favorite_flag(&id, favorite) {
                    Ok(request) => {
                        let tag = id.clone();
                        caps.http.send(request, move |result| Event::FavoriteMirrored {
                            id: tag,
                            result: Box::new(result),
                        });
                    }
                    Err(e) => warn!(error = %e, "could not build favorite mirror request"),
                }
                caps.render.render();
            }

            Event::FavoritesSaved { result } => {
                match result {
                    Ok(_) => model.favorites_persisted = true,
                    Err(e) => {
                        warn!(error = %e, "favorites save failed, keeping in-memory set");
                        model.favorites_persisted = false;
                        model.last_error =
                            Some(AppError::new(ErrorKind::Storage, e.to_string()));
                    }
                }
                caps.render.render();
            }

            Event::FavoriteMirrored { id, result } => match *result {
                Ok(ref response) if response.is_success() => {
                    debug!(%id, "favorite mirrored to remote");
                }
                Ok(response) => {
                    warn!(%id, status = response.status(), "favorite mirror rejected");
                }
                Err(e) => {
                    warn!(%id, error = %e, "favorite mirror failed");
                }
            },

            Event::DetailOpened { id } => {
                Self::open_detail(model, caps, id);
                caps.render.render();
            }

            Event::RecordFetched { id, result } => {
                // Only the record for the currently open id may land.
                if model.detail.current_id.as_ref() != Some(&id) {
                    debug!(%id, "dropping stale record response");
                    return;
                }

                match Self::read_response(*result).and_then(|r| remote::parse_record(r.body())) {
                    Ok(record) => {
                        model.detail.record = Some(record);
                        model.detail.showing_fallback = false;
                        model.last_error = None;
                    }
                    Err(e) => {
                        warn!(%id, error = %e, "record fetch failed, showing sample");
                        model.last_error = Some(e);
                        Self::apply_detail_fallback(&mut model.detail, &id);
                    }
                }
                model.detail.loading = false;
                caps.render.render();
            }

            Event::NavScopeFetched { result } => {
                if model.detail.current_id.is_none() {
                    debug!("dropping navigation scope, detail closed");
                    return;
                }

                model.detail.ordered_ids =
                    match Self::read_response(*result).and_then(|r| remote::parse_list_page(r.body()))
                    {
                        Ok(fetched) => fetched.records.into_iter().map(|r| r.id).collect(),
                        Err(e) => {
                            warn!(error = %e, "navigation scope fetch failed, using sample ids");
                            fallback::sample_record_ids()
                        }
                    };
                caps.render.render();
            }

            Event::NextRequested => {
                if let Some(target) = model.detail.next_id() {
                    Self::open_detail(model, caps, target);
                    caps.render.render();
                } else {
                    debug!("next ignored, empty navigation scope");
                }
            }

            Event::PrevRequested => {
                if let Some(target) = model.detail.prev_id() {
                    Self::open_detail(model, caps, target);
                    caps.render.render();
                } else {
                    debug!("prev ignored, empty navigation scope");
                }
            }

            Event::BackToList => {
                model.detail = DetailState::default();
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Self::Model) -> Self::ViewModel {
        let items = model
            .list
            .visible_records(&model.favorites)
            .into_iter()
            .map(|r| ListItem {
                id: r.id.clone(),
                name: r.name.clone(),
                is_favorite: model.favorites.contains(&r.id),
            })
            .collect();

        let list = ListViewModel {
            items,
            search_query: model.list.search_query.clone(),
            favorites_only: model.list.favorites_only,
            page: model.list.page,
            total_pages: model.list.total_pages,
            loading: model.list.loading,
            showing_fallback: model.list.showing_fallback,
        };

        let detail = model.detail.current_id.as_ref().map(|id| {
            let total = u32::try_from(model.detail.ordered_ids.len()).unwrap_or(u32::MAX);
            let position = if total == 0 {
                0
            } else {
                u32::try_from(model.detail.current_index())
                    .unwrap_or(u32::MAX - 1)
                    .saturating_add(1)
            };
            let position_label = if total == 0 {
                String::new()
            } else {
                format!("{position} dari {total}")
            };

            let record = model.detail.record.as_ref();
            DetailViewModel {
                id: id.clone(),
                name: record.map(|r| r.name.clone()).unwrap_or_default(),
                body: record.map(|r| r.body.clone()).unwrap_or_default(),
                translation: record.map(|r| r.translation.clone()).unwrap_or_default(),
                is_favorite: model.favorites.contains(id),
                position,
                total,
                position_label,
                loading: model.detail.loading,
                showing_fallback: model.detail.showing_fallback,
            }
        });

        ViewModel {
            list,
            detail,
            favorites_persisted: model.favorites_persisted,
        }
    }
}

impl App {
    fn fetch_page(model: &mut Model, caps: &Capabilities, page: u32) {
        model.list.page = page;
        model.list.loading = true;

        match model.remote.list_page(page, PAGE_SIZE) {
            Ok(request) => caps.http.send(request, move |result| Event::PageFetched {
                page,
                result: Box::new(result),
            }),
            Err(e) => {
                warn!(error = %e, "could not build page request, showing sample data");
                Self::apply_list_fallback(&mut model.list);
            }
        }
    }

    fn open_detail(model: &mut Model, caps: &Capabilities, id: RecordId) {
        model.detail.current_id = Some(id.clone());
        model.detail.record = None;
        model.detail.loading = true;

        match model.remote.get_by_id(&id) {
            Ok(request) => {
                let tag = id.clone();
                caps.http.send(request, move |result| Event::RecordFetched {
                    id: tag,
                    result: Box::new(result),
                });
            }
            Err(e) => {
                warn!(%id, error = %e, "could not build record request, showing sample");
                Self::apply_detail_fallback(&mut model.detail, &id);
            }
        }

        // The scope survives next/prev hops; fetch it once per detail visit.
        if model.detail.ordered_ids.is_empty() {
            match model.remote.list_all(NAV_SCOPE_LIMIT) {
                Ok(request) => caps.http.send(request, |result| Event::NavScopeFetched {
                    result: Box::new(result),
                }),
                Err(e) => {
                    warn!(error = %e, "could not build scope request, using sample ids");
                    model.detail.ordered_ids = fallback::sample_record_ids();
                }
            }
        }
    }

    fn load_favorites(caps: &Capabilities) {
        match KvKey::new(FAVORITES_KEY) {
            Ok(key) => caps.kv.get(key, |result| Event::FavoritesLoaded { result }),
            Err(e) => error!(error = %e, "invalid favorites storage key"),
        }
    }

    fn persist_favorites(model: &Model, caps: &Capabilities) {
        let bytes = match model.favorites.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "could not serialize favorites");
                return;
            }
        };
        match KvKey::new(FAVORITES_KEY) {
            Ok(key) => caps
                .kv
                .set(key, bytes, |result| Event::FavoritesSaved { result }),
            Err(e) => error!(error = %e, "invalid favorites storage key"),
        }
    }

    fn apply_list_fallback(list: &mut ListState) {
        list.records = fallback::sample_records();
        list.page = 1;
        list.total_pages = 1;
        list.loading = false;
        list.showing_fallback = true;
    }

    fn apply_detail_fallback(detail: &mut DetailState, id: &RecordId) {
        detail.record = Some(fallback::find_sample(id));
        detail.loading = false;
        detail.showing_fallback = true;
    }

    /// Unwraps a transport result into a successful response, classifying
    /// transport failures and non-2xx statuses.
    fn read_response(result: HttpResult) -> Result<HttpResponse, AppError> {
        let response =
            result.map_err(|e| AppError::new(ErrorKind::Network, e.to_string()))?;

        if response.is_not_found() {
            return Err(AppError::new(ErrorKind::NotFound, "remote row not found"));
        }
        if !response.is_success() {
            return Err(AppError::new(
                ErrorKind::Network,
                format!("remote returned HTTP {}", response.status()),
            ));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::HttpError;

    #[test]
    fn error_kinds_have_stable_codes() {
        assert_eq!(ErrorKind::Network.code(), "network");
        assert_eq!(ErrorKind::NotFound.code(), "not_found");
        assert_eq!(ErrorKind::Storage.code(), "storage");
        assert_eq!(ErrorKind::Parse.code(), "parse");

        assert!(ErrorKind::Network.is_retryable());
        assert!(!ErrorKind::Parse.is_retryable());
    }

    #[test]
    fn read_response_classifies_failures() {
        let transport = App::read_response(Err(HttpError::Connection {
            message: "refused".to_string(),
        }));
        assert_eq!(transport.unwrap_err().kind(), ErrorKind::Network);

        let missing = App::read_response(Ok(HttpResponse::new(404, vec![])));
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);

        let server = App::read_response(Ok(HttpResponse::new(500, vec![])));
        assert_eq!(server.unwrap_err().kind(), ErrorKind::Network);

        let ok = App::read_response(Ok(HttpResponse::new(200, b"{}".to_vec())));
        assert!(ok.is_ok());
    }

    #[test]
    fn app_error_displays_message() {
        let err = AppError::new(ErrorKind::Parse, "bad row");
        assert_eq!(err.to_string(), "bad row");
        assert_eq!(err.message(), "bad row");
    }
}
