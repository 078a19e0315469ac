//! Client for a Baserow-style spreadsheet REST backend, and the translation
//! layer between its row shape and [`Record`].
//!
//! The core never executes requests itself. This module only builds
//! [`HttpRequest`] descriptions and decodes response bodies; the shell owns
//! the transport.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::capabilities::{HttpError, HttpRequest};
use crate::model::{Record, RecordId};
use crate::{AppError, ErrorKind};

/// Connection settings for one backing table. Injected by the shell at
/// startup; nothing here is baked into the binary.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub table_id: String,
    pub auth_token: String,
}

impl RemoteConfig {
    pub fn new(
        base_url: impl Into<String>,
        table_id: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            table_id: table_id.into(),
            auth_token: auth_token.into(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.baserow.io".to_string(),
            table_id: String::new(),
            auth_token: String::new(),
        }
    }
}

// The token never appears in logs or debug output.
impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("table_id", &self.table_id)
            .field("auth_token", &"[redacted]")
            .finish()
    }
}

/// Builds the table's row requests. Every builder returns a ready-to-send
/// [`HttpRequest`] carrying the `Authorization: Token ...` header.
#[derive(Clone, Debug, Default)]
pub struct RemoteStore {
    config: RemoteConfig,
}

impl RemoteStore {
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// One page of rows: `GET .../table/{id}/?user_field_names=true&page=N&size=M`.
    pub fn list_page(&self, page: u32, size: u32) -> Result<HttpRequest, HttpError> {
        let mut url = self.rows_url()?;
        url.query_pairs_mut()
            .append_pair("user_field_names", "true")
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        self.authorized(HttpRequest::get(url)?)
    }

    /// The full navigation scope in one oversized page, capped at `max` rows.
    pub fn list_all(&self, max: u32) -> Result<HttpRequest, HttpError> {
        let mut url = self.rows_url()?;
        url.query_pairs_mut()
            .append_pair("user_field_names", "true")
            .append_pair("size", &max.to_string());
        self.authorized(HttpRequest::get(url)?)
    }

    /// A single row: `GET .../table/{id}/{row}/?user_field_names=true`.
    pub fn get_by_id(&self, id: &RecordId) -> Result<HttpRequest, HttpError> {
        let mut url = self.row_url(id)?;
        url.query_pairs_mut().append_pair("user_field_names", "true");
        self.authorized(HttpRequest::get(url)?)
    }

    /// Best-effort mirror of favorite membership into the row's `favorite`
    /// column. The column is write-only from the app's point of view.
    pub fn set_favorite_flag(
        &self,
        id: &RecordId,
        favorite: bool,
    ) -> Result<HttpRequest, HttpError> {
        let url = self.row_url(id)?;
        let request = HttpRequest::patch(url)?.with_json(&FavoritePatch { favorite })?;
        self.authorized(request)
    }

    fn rows_url(&self) -> Result<Url, HttpError> {
        let base = self.config.base_url.trim_end_matches('/');
        let raw = format!(
            "{base}/api/database/rows/table/{table}/",
            table = self.config.table_id
        );
        Url::parse(&raw).map_err(|e| HttpError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    fn row_url(&self, id: &RecordId) -> Result<Url, HttpError> {
        let rows = self.rows_url()?;
        rows.join(&format!("{id}/")).map_err(|e| HttpError::InvalidUrl {
            url: rows.to_string(),
            reason: e.to_string(),
        })
    }

    fn authorized(&self, request: HttpRequest) -> Result<HttpRequest, HttpError> {
        request.with_header("Authorization", format!("Token {}", self.config.auth_token))
    }
}

#[derive(Serialize)]
struct FavoritePatch {
    favorite: bool,
}

/// One row as the backend serves it with `user_field_names=true`: display
/// names as JSON keys, and an id that may arrive as number or string.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RemoteRecord {
    #[serde(deserialize_with = "id_from_number_or_string")]
    id: RecordId,

    #[serde(rename = "Nama Do'a", default)]
    name: String,

    #[serde(rename = "Kalimat Do'a", default)]
    body: String,

    #[serde(rename = "Arti Do'a", default)]
    translation: String,
}

impl From<RemoteRecord> for Record {
    fn from(row: RemoteRecord) -> Self {
        Record {
            id: row.id,
            name: row.name,
            body: row.body,
            translation: row.translation,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    results: Vec<RemoteRecord>,
    count: u64,
}

/// A decoded list response: the rows of one page plus the table-wide count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    pub records: Vec<Record>,
    pub total_count: u64,
}

pub fn parse_list_page(body: &[u8]) -> Result<ListPage, AppError> {
    let envelope: ListEnvelope = serde_json::from_slice(body)
        .map_err(|e| AppError::new(ErrorKind::Parse, format!("malformed list response: {e}")))?;
    Ok(ListPage {
        records: envelope.results.into_iter().map(Record::from).collect(),
        total_count: envelope.count,
    })
}

pub fn parse_record(body: &[u8]) -> Result<Record, AppError> {
    let row: RemoteRecord = serde_json::from_slice(body)
        .map_err(|e| AppError::new(ErrorKind::Parse, format!("malformed row response: {e}")))?;
    Ok(row.into())
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = RecordId;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer row id")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
            Ok(RecordId::new(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
            Ok(RecordId::new(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
            Ok(RecordId::new(v.to_string()))
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::HttpMethod;

    fn store() -> RemoteStore {
        RemoteStore::new(RemoteConfig::new("https://api.baserow.io", "1042", "s3cret"))
    }

    #[test]
    fn list_page_request_shape() {
        let request = store().list_page(3, 10).unwrap();

        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(
            request.url(),
            "https://api.baserow.io/api/database/rows/table/1042/?user_field_names=true&page=3&size=10"
        );
        assert_eq!(request.header("Authorization"), Some("Token s3cret"));
        assert!(request.body().is_none());
    }

    #[test]
    fn list_all_omits_page_parameter() {
        let request = store().list_all(100).unwrap();
        assert_eq!(
            request.url(),
            "https://api.baserow.io/api/database/rows/table/1042/?user_field_names=true&size=100"
        );
    }

    #[test]
    fn row_request_keeps_trailing_slash() {
        let request = store().get_by_id(&RecordId::new("7")).unwrap();
        assert_eq!(
            request.url(),
            "https://api.baserow.io/api/database/rows/table/1042/7/?user_field_names=true"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_tolerated() {
        let store = RemoteStore::new(RemoteConfig::new("https://api.baserow.io/", "1042", "t"));
        let request = store.list_page(1, 10).unwrap();
        assert!(request
            .url()
            .starts_with("https://api.baserow.io/api/database/rows/table/1042/"));
    }

    #[test]
    fn favorite_patch_carries_json_body() {
        let request = store()
            .set_favorite_flag(&RecordId::new("5"), true)
            .unwrap();

        assert_eq!(request.method(), HttpMethod::Patch);
        assert_eq!(
            request.url(),
            "https://api.baserow.io/api/database/rows/table/1042/5/"
        );
        assert_eq!(request.header("Content-Type"), Some("application/json"));

        let body: serde_json::Value = serde_json::from_slice(request.body().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "favorite": true }));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let store = RemoteStore::new(RemoteConfig::new("not a url", "1", "t"));
        assert!(store.list_page(1, 10).is_err());
    }

    #[test]
    fn parses_list_envelope_with_display_field_names() {
        let body = br#"{
            "count": 25,
            "results": [
                { "id": 1, "Nama Do'a": "Doa Memohon Kesabaran" },
                { "id": "2", "Nama Do'a": "Doa Memohon Ampunan", "Kalimat Do'a": "x", "Arti Do'a": "y" }
            ]
        }"#;

        let page = parse_list_page(body).unwrap();
        assert_eq!(page.total_count, 25);
        assert_eq!(page.records.len(), 2);

        // numeric and string ids both normalize to strings
        assert_eq!(page.records[0].id, RecordId::new("1"));
        assert_eq!(page.records[1].id, RecordId::new("2"));

        // absent text fields default to empty
        assert!(page.records[0].body.is_empty());
        assert_eq!(page.records[1].body, "x");
        assert_eq!(page.records[1].translation, "y");
    }

    #[test]
    fn parses_single_row() {
        let body = br#"{ "id": 7, "Nama Do'a": "Doa", "Kalimat Do'a": "b", "Arti Do'a": "t" }"#;
        let record = parse_record(body).unwrap();
        assert_eq!(record.id, RecordId::new("7"));
        assert_eq!(record.body, "b");
    }

    #[test]
    fn malformed_bodies_are_parse_errors() {
        let err = parse_list_page(b"not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        assert!(parse_record(br#"{"results": []}"#).is_err());
        assert!(parse_list_page(br#"{"count": 1}"#).is_err());
    }
}
