use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::RecordId;

/// The single device-storage key under which the whole favorite set lives.
pub const FAVORITES_KEY: &str = "favorites";

/// Client-side favorite membership, keyed by record id. Persisted as a JSON
/// array of id strings; the remote `favorite` column is only a best-effort
/// mirror and is never read back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet {
    ids: BTreeSet<RecordId>,
}

impl FavoriteSet {
    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordId> {
        self.ids.iter()
    }

    /// Flips membership for `id` and returns whether it is a favorite
    /// afterwards. Toggling twice restores the original set.
    pub fn toggle(&mut self, id: &RecordId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Serializes to the persisted wire form, a JSON array of id strings.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.ids)
    }

    /// Lenient decode of the persisted form. A corrupt payload degrades to an
    /// empty set rather than an error; favorites are reconstructible by hand.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<BTreeSet<RecordId>>(bytes) {
            Ok(ids) => Self { ids },
            Err(error) => {
                warn!(%error, "corrupt favorites payload, starting with empty set");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut favorites = FavoriteSet::default();
        let id = RecordId::new("5");

        assert!(favorites.toggle(&id));
        assert!(favorites.contains(&id));
        assert_eq!(favorites.len(), 1);

        assert!(!favorites.toggle(&id));
        assert!(!favorites.contains(&id));
        assert!(favorites.is_empty());
    }

    #[test]
    fn double_toggle_is_identity() {
        let mut favorites = FavoriteSet::default();
        favorites.toggle(&RecordId::new("1"));
        favorites.toggle(&RecordId::new("2"));
        let before = favorites.clone();

        let id = RecordId::new("7");
        favorites.toggle(&id);
        favorites.toggle(&id);

        assert_eq!(favorites, before);
    }

    #[test]
    fn persists_as_json_array_of_strings() {
        let mut favorites = FavoriteSet::default();
        favorites.toggle(&RecordId::new("3"));
        favorites.toggle(&RecordId::new("1"));

        let bytes = favorites.to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!(["1", "3"]));
    }

    #[test]
    fn round_trips_through_bytes() {
        let mut favorites = FavoriteSet::default();
        favorites.toggle(&RecordId::new("10"));
        favorites.toggle(&RecordId::new("2"));

        let bytes = favorites.to_bytes().unwrap();
        assert_eq!(FavoriteSet::from_bytes(&bytes), favorites);
    }

    #[test]
    fn corrupt_payload_degrades_to_empty() {
        assert!(FavoriteSet::from_bytes(b"not json").is_empty());
        assert!(FavoriteSet::from_bytes(b"{\"a\": 1}").is_empty());
        assert!(FavoriteSet::from_bytes(b"").is_empty());
    }

    #[test]
    fn duplicate_ids_collapse() {
        let favorites = FavoriteSet::from_bytes(br#"["1", "1", "2"]"#);
        assert_eq!(favorites.len(), 2);
    }
}
