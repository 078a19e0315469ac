use serde::{Deserialize, Serialize};
use std::fmt;

use crate::favorites::FavoriteSet;
use crate::remote::RemoteStore;
use crate::{AppError, PAGE_SIZE};

/// Opaque stable identifier assigned by the remote store. The sole key for
/// lookups, filtering, and favorite membership.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One supplication entry. `body` and `translation` are empty until the full
/// record has been fetched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub body: String,
    pub translation: String,
}

/// Paginated, filtered view over the remote record set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListState {
    pub records: Vec<Record>,
    pub search_query: String,
    pub favorites_only: bool,
    pub page: u32,
    pub total_pages: u32,
    pub loading: bool,
    pub showing_fallback: bool,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            search_query: String::new(),
            favorites_only: false,
            page: 1,
            total_pages: 1,
            loading: false,
            showing_fallback: false,
        }
    }
}

impl ListState {
    /// The visible subset: case-insensitive substring search on `name`
    /// (whitespace-only queries match everything), then the favorites-only
    /// filter. Pure in its inputs; the filters commute.
    pub fn visible_records<'a>(&'a self, favorites: &FavoriteSet) -> Vec<&'a Record> {
        let query = self.search_query.to_lowercase();
        let match_all = query.trim().is_empty();

        self.records
            .iter()
            .filter(|r| match_all || r.name.to_lowercase().contains(&query))
            .filter(|r| !self.favorites_only || favorites.contains(&r.id))
            .collect()
    }
}

/// `ceil(count / PAGE_SIZE)`, never below one page.
pub fn total_pages_for(count: u64) -> u32 {
    let size = u64::from(PAGE_SIZE);
    (count.div_ceil(size)).clamp(1, u64::from(u32::MAX)) as u32
}

/// Position within the full ordered record set, for next/prev navigation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetailState {
    pub current_id: Option<RecordId>,
    pub record: Option<Record>,
    pub ordered_ids: Vec<RecordId>,
    pub loading: bool,
    pub showing_fallback: bool,
}

impl DetailState {
    /// First position of the current id in `ordered_ids`; `0` when the id is
    /// absent (navigation wraps from the start, a defined fallback).
    pub fn current_index(&self) -> usize {
        self.current_id
            .as_ref()
            .and_then(|id| self.ordered_ids.iter().position(|other| other == id))
            .unwrap_or(0)
    }

    /// Cyclic successor; `None` when the scope is empty (navigation no-op).
    pub fn next_id(&self) -> Option<RecordId> {
        let len = self.ordered_ids.len();
        if len == 0 {
            return None;
        }
        let index = (self.current_index() + 1) % len;
        Some(self.ordered_ids[index].clone())
    }

    /// Cyclic predecessor; `None` when the scope is empty.
    pub fn prev_id(&self) -> Option<RecordId> {
        let len = self.ordered_ids.len();
        if len == 0 {
            return None;
        }
        let index = (self.current_index() + len - 1) % len;
        Some(self.ordered_ids[index].clone())
    }
}

#[derive(Default)]
pub struct Model {
    pub remote: RemoteStore,
    pub favorites: FavoriteSet,
    pub favorites_loaded: bool,
    pub favorites_persisted: bool,
    pub list: ListState,
    pub detail: DetailState,
    pub last_error: Option<AppError>,
}

impl Model {
    pub fn new() -> Self {
        Self {
            favorites_persisted: true,
            ..Self::default()
        }
    }
}
