use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// An absolute http(s) URL that has passed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let url = url.into();

        if url.trim().is_empty() {
            return Err(HttpError::InvalidUrl {
                url,
                reason: "URL cannot be empty".to_string(),
            });
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate(&url),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        let parsed = Url::parse(&url).map_err(|e| HttpError::InvalidUrl {
            url: Self::truncate(&url),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme().to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate(&url),
                reason: format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            });
        }

        if parsed.host_str().is_none() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate(&url),
                reason: "URL must have a host".to_string(),
            });
        }

        Ok(Self {
            url: parsed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    fn truncate(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            format!("{}...", &url[..100])
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Patch => "PATCH",
        }
    }

    pub fn has_request_body(&self) -> bool {
        matches!(self, HttpMethod::Patch)
    }
}

/// A fully described request, handed to the shell for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    method: HttpMethod,
    url: ValidatedUrl,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Result<Self, HttpError> {
        Ok(Self {
            method: HttpMethod::Get,
            url: ValidatedUrl::new(url)?,
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn patch(url: impl Into<String>) -> Result<Self, HttpError> {
        Ok(Self {
            method: HttpMethod::Patch,
            url: ValidatedUrl::new(url)?,
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, HttpError> {
        let name = name.into();
        let value = value.into();

        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(HttpError::InvalidHeader {
                reason: format!("invalid header name '{name}'"),
            });
        }
        if value.chars().any(|c| c == '\r' || c == '\n' || c == '\0') {
            return Err(HttpError::InvalidHeader {
                reason: "header value contains CR, LF, or NULL".to_string(),
            });
        }

        let name_lower = name.to_lowercase();
        self.headers.retain(|(n, _)| n.to_lowercase() != name_lower);
        self.headers.push((name, value));
        Ok(self)
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, HttpError> {
        if !self.method.has_request_body() {
            return Err(HttpError::InvalidRequest {
                reason: format!("{} requests cannot have a body", self.method.as_str()),
            });
        }

        let body = serde_json::to_vec(value).map_err(|e| HttpError::Serialization {
            message: e.to_string(),
        })?;

        if body.len() > MAX_REQUEST_BODY_SIZE {
            return Err(HttpError::InvalidRequest {
                reason: format!("body exceeds maximum of {MAX_REQUEST_BODY_SIZE} bytes"),
            });
        }

        self = self.with_header("Content-Type", "application/json")?;
        self.body = Some(body);
        Ok(self)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| n.to_lowercase() == name_lower)
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpOperation {
    Execute(HttpRequest),
}

impl Operation for HttpOperation {
    type Output = HttpResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("connection failed: {message}")]
    Connection { message: String },

    #[error("timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice(&self.body).map_err(|e| HttpError::Serialization {
            message: format!("failed to parse JSON body: {e}"),
        })
    }
}

pub type HttpOutput = HttpResponse;
pub type HttpResult = Result<HttpResponse, HttpError>;

/// Request/response HTTP capability. The shell owns the transport; the core
/// only describes requests and consumes results as events.
pub struct Http<Ev> {
    context: CapabilityContext<HttpOperation, Ev>,
}

impl<Ev> Http<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<HttpOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn send<F>(&self, request: HttpRequest, make_event: F)
    where
        F: FnOnce(HttpResult) -> Ev + Send + Sync + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(HttpOperation::Execute(request))
                .await;
            context.update_app(make_event(result));
        });
    }
}

impl<Ev> Capability<Ev> for Http<Ev> {
    type Operation = HttpOperation;
    type MappedSelf<MappedEv> = Http<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Http::new(self.context.map_event(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_schemeless_urls() {
        assert!(ValidatedUrl::new("").is_err());
        assert!(ValidatedUrl::new("   ").is_err());
        assert!(ValidatedUrl::new("api.example.com/rows").is_err());
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(matches!(
            ValidatedUrl::new("ftp://example.com"),
            Err(HttpError::InvalidUrl { .. })
        ));
        assert!(ValidatedUrl::new("file:///etc/passwd").is_err());
    }

    #[test]
    fn accepts_https_url() {
        let url = ValidatedUrl::new("https://api.baserow.io/api/database/rows/table/1/").unwrap();
        assert!(url.as_str().starts_with("https://api.baserow.io/"));
    }

    #[test]
    fn header_injection_is_rejected() {
        let request = HttpRequest::get("https://example.com/").unwrap();
        let result = request.with_header("Authorization", "Token x\r\nEvil: y");
        assert!(matches!(result, Err(HttpError::InvalidHeader { .. })));
    }

    #[test]
    fn headers_deduplicate_case_insensitively() {
        let request = HttpRequest::get("https://example.com/")
            .unwrap()
            .with_header("Authorization", "Token a")
            .unwrap()
            .with_header("authorization", "Token b")
            .unwrap();

        assert_eq!(request.headers().count(), 1);
        assert_eq!(request.header("AUTHORIZATION"), Some("Token b"));
    }

    #[test]
    fn json_body_only_on_patch() {
        let patch = HttpRequest::patch("https://example.com/row/5/")
            .unwrap()
            .with_json(&serde_json::json!({ "favorite": true }))
            .unwrap();
        assert_eq!(patch.header("Content-Type"), Some("application/json"));
        assert!(patch.body().is_some());

        let get = HttpRequest::get("https://example.com/")
            .unwrap()
            .with_json(&serde_json::json!({}));
        assert!(matches!(get, Err(HttpError::InvalidRequest { .. })));
    }

    #[test]
    fn response_status_helpers() {
        assert!(HttpResponse::new(200, vec![]).is_success());
        assert!(!HttpResponse::new(404, vec![]).is_success());
        assert!(HttpResponse::new(404, vec![]).is_not_found());
        assert!(!HttpResponse::new(500, vec![]).is_not_found());
    }

    #[test]
    fn response_json_parsing() {
        let body = br#"{"count": 12}"#.to_vec();
        let parsed: serde_json::Value = HttpResponse::new(200, body).json().unwrap();
        assert_eq!(parsed["count"], 12);

        let garbage = HttpResponse::new(200, b"not json".to_vec());
        assert!(garbage.json::<serde_json::Value>().is_err());
    }
}
