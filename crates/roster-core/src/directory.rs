//! Directory endpoint client.
//!
//! One GET per refresh, bounded by a timeout, never retried. Entries without
//! a usable id or name are dropped with a warning; the rest of the batch is
//! kept.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::DirectoryConfig;
use crate::error::DirectoryError;
use crate::model::{Address, RawPerson};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_PATH: &str = "/users";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can produce the raw people list.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawPerson>, DirectoryError>;
}

/// `DirectorySource` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
    bearer: Option<String>,
}

impl HttpDirectory {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            timeout,
            bearer: None,
        }
    }

    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self::new(config.url(), config.timeout())
    }

    /// Attaches `Authorization: Bearer <token>` to every request.
    #[must_use]
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DirectorySource for HttpDirectory {
    async fn fetch(&self) -> Result<Vec<RawPerson>, DirectoryError> {
        tracing::debug!(url = %self.url, "Fetching directory");

        let mut request = self.http.get(&self.url).timeout(self.timeout);
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(&e))?;
        decode_people(&body)
    }
}

impl HttpDirectory {
    fn transport_error(&self, err: &reqwest::Error) -> DirectoryError {
        if err.is_timeout() {
            DirectoryError::Timeout(self.timeout)
        } else {
            DirectoryError::Request(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePerson {
    id: Option<u64>,
    name: Option<String>,
    #[serde(default)]
    address: Option<WireAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct WireAddress {
    street: Option<String>,
    suite: Option<String>,
    city: Option<String>,
    zipcode: Option<String>,
}

impl From<WireAddress> for Address {
    fn from(wire: WireAddress) -> Self {
        Self {
            street: wire.street.unwrap_or_default(),
            suite: wire.suite.unwrap_or_default(),
            city: wire.city.unwrap_or_default(),
            zipcode: wire.zipcode.unwrap_or_default(),
        }
    }
}

/// Parses the response body into people, skipping malformed entries.
///
/// # Errors
/// Returns `DirectoryError::Decode` when the body is not a JSON array.
pub fn decode_people(body: &str) -> Result<Vec<RawPerson>, DirectoryError> {
    let entries: Vec<Value> =
        serde_json::from_str(body).map_err(|e| DirectoryError::Decode(e.to_string()))?;

    let mut people = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let wire: WirePerson = match serde_json::from_value(entry) {
            Ok(wire) => wire,
            Err(err) => {
                tracing::warn!(index, error = %err, "Skipping malformed directory entry");
                continue;
            }
        };

        let Some(id) = wire.id.filter(|id| *id > 0) else {
            tracing::warn!(index, "Skipping directory entry without a positive id");
            continue;
        };
        let Some(name) = wire.name.filter(|name| !name.trim().is_empty()) else {
            tracing::warn!(index, id, "Skipping directory entry without a name");
            continue;
        };

        people.push(RawPerson {
            id,
            name,
            address: wire.address.unwrap_or_default().into(),
        });
    }
    Ok(people)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_decode_fills_missing_address_fields() {
        let people = decode_people(
            r#"[
                {"id": 1, "name": "Leanne Graham", "username": "Bret",
                 "address": {"street": "Kulas Light", "city": "Gwenborough"}},
                {"id": 2, "name": "Ervin Howell"}
            ]"#,
        )
        .unwrap();

        assert_eq!(people.len(), 2);
        assert_eq!(people[0].address.street, "Kulas Light");
        assert_eq!(people[0].address.suite, "");
        assert_eq!(people[1].address, Address::default());
    }

    #[test]
    fn test_decode_skips_malformed_entries() {
        let people = decode_people(
            r#"[
                {"id": 1, "name": "Leanne Graham"},
                {"name": "No Id"},
                {"id": 0, "name": "Zero"},
                {"id": 4, "name": "   "},
                {"id": "five", "name": "Wrong Type"},
                "not an object",
                {"id": 7, "name": "Kept"}
            ]"#,
        )
        .unwrap();

        let ids: Vec<u64> = people.iter().map(|p| p.id).collect();
        assert_eq!(ids, [1, 7]);
    }

    #[test]
    fn test_decode_rejects_non_array_body() {
        assert!(matches!(
            decode_people(r#"{"users": []}"#),
            Err(DirectoryError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_returns_people() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id": 1, "name": "Leanne Graham", "address": {"city": "Gwenborough"}}]"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpDirectory::new(format!("{}/users", server.uri()), DEFAULT_TIMEOUT);
        let people = source.fetch().await.unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].address.city, "Gwenborough");
    }

    #[tokio::test]
    async fn test_fetch_maps_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = HttpDirectory::new(format!("{}/users", server.uri()), DEFAULT_TIMEOUT);
        assert_eq!(
            source.fetch().await,
            Err(DirectoryError::Status { status: 503 })
        );
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let timeout = Duration::from_millis(100);
        let source = HttpDirectory::new(format!("{}/users", server.uri()), timeout);
        assert_eq!(source.fetch().await, Err(DirectoryError::Timeout(timeout)));
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpDirectory::new(format!("{}/users", server.uri()), DEFAULT_TIMEOUT)
            .with_bearer(Some("tok-123".into()));
        assert_eq!(source.fetch().await, Ok(Vec::new()));
    }
}
