use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, StatusCode};
use tracing::{debug, warn};

use super::{BlobStore, StorageError};

/// Blob store speaking plain HTTP object semantics (S3-compatible gateways,
/// static object servers): `GET`/`PUT {endpoint}/{container}/{key}`
pub struct HttpBlobStore {
    http_client: HttpClient,
    endpoint: String,
    token: Option<String>,
}

impl HttpBlobStore {
    /// Uploaded objects are publicly readable so downstream consumers can fetch the series
    const OBJECT_ACL: &'static str = "public-read";

    /// Create a store whose requests give up after `timeout`
    pub fn new(endpoint: String, token: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn object_url(&self, container: &str, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, container, key.trim_start_matches('/'))
    }

    /// Authorization header when a token is configured
    fn create_headers(&self) -> Result<HeaderMap, StorageError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| StorageError::Request(format!("Failed to create auth header: {}", e)))?;
            headers.insert(AUTHORIZATION, auth_value);
        }
        Ok(headers)
    }

    async fn handle_error_response(
        status: StatusCode,
        response: reqwest::Response,
        container: &str,
        key: &str,
    ) -> StorageError {
        if status == StatusCode::NOT_FOUND {
            return StorageError::not_found(container, key);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Storage returned {} for {}/{}", status, container, key);
        StorageError::Http {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let url = self.object_url(container, key);
        let headers = self.create_headers()?;

        let response = self
            .http_client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| StorageError::Request(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response, container, key).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Request(format!("Failed to read body of {}: {}", url, e)))?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let url = self.object_url(container, key);
        let mut headers = self.create_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        headers.insert("x-amz-acl", HeaderValue::from_static(Self::OBJECT_ACL));

        let size = bytes.len();
        let response = self
            .http_client
            .put(&url)
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Request(format!("PUT {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response, container, key).await);
        }

        debug!("Uploaded {} bytes to {}", size, url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::stub_http::serve_once;

    fn store(endpoint: &str, token: Option<&str>) -> HttpBlobStore {
        HttpBlobStore::new(endpoint.to_string(), token.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_object_url_joins_cleanly() {
        let store = store("https://objects.example.com/", None);
        assert_eq!(
            store.object_url("chiron-data-collector", "spx/spx.csv"),
            "https://objects.example.com/chiron-data-collector/spx/spx.csv"
        );
        assert_eq!(
            store.object_url("bucket", "/spx.csv"),
            "https://objects.example.com/bucket/spx.csv"
        );
    }

    #[test]
    fn test_headers_carry_token_only_when_set() {
        let anonymous = store("http://localhost:9000", None);
        assert!(anonymous.create_headers().unwrap().get(AUTHORIZATION).is_none());

        let authed = store("http://localhost:9000", Some("s3cr3t"));
        let headers = authed.create_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer s3cr3t");
    }

    #[test]
    fn test_invalid_token_is_request_error() {
        let store = store("http://localhost:9000", Some("bad\ntoken"));
        assert!(matches!(store.create_headers(), Err(StorageError::Request(_))));
    }

    #[tokio::test]
    async fn test_get_missing_object_is_not_found() {
        let (endpoint, _request) = serve_once("404 Not Found", "").await;

        let err = store(&endpoint, None).get("bucket", "spx/spx.csv").await.unwrap_err();

        assert!(err.is_not_found(), "{:?}", err);
    }

    #[tokio::test]
    async fn test_get_returns_object_bytes() {
        let (endpoint, request) = serve_once("200 OK", "date,close\n").await;

        let bytes = store(&endpoint, Some("s3cr3t"))
            .get("bucket", "spx/spx.csv")
            .await
            .unwrap();

        assert_eq!(bytes, b"date,close\n");
        let request = request.await.unwrap();
        assert!(request.starts_with("GET /bucket/spx/spx.csv "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer s3cr3t"));
    }

    #[tokio::test]
    async fn test_get_server_error_is_not_not_found() {
        let (endpoint, _request) = serve_once("500 Internal Server Error", "boom").await;

        let err = store(&endpoint, None).get("bucket", "spx/spx.csv").await.unwrap_err();

        assert!(!err.is_not_found());
        assert!(matches!(err, StorageError::Http { status: 500, .. }));
    }
}
