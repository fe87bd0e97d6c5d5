//! Fetcher implementations.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, trace};

use crate::{ArchiveKey, FetchError, RawPair, ResourceKind, Result};

/// Default fetch timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Upper bound on one resource fetch, including reading the body.
    pub timeout: Duration,
    /// Custom user agent for HTTP requests.
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Source of archive bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one half of an archive pair.
    async fn fetch(&self, key: &ArchiveKey, kind: ResourceKind) -> Result<Vec<u8>>;

    /// Fetch both halves concurrently. Fails if either half is missing.
    async fn fetch_pair(&self, key: &ArchiveKey) -> Result<RawPair> {
        let (list, pack) = tokio::try_join!(
            self.fetch(key, ResourceKind::List),
            self.fetch(key, ResourceKind::Pack)
        )?;
        Ok(RawPair { list, pack })
    }
}

/// Pick a fetcher for a source string: `http(s)://` URLs go over HTTP,
/// anything else is a local mirror directory.
pub fn from_source(source: &str, config: FetchConfig) -> Result<Arc<dyn Fetcher>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Arc::new(HttpFetcher::new(source, config)?))
    } else {
        Ok(Arc::new(DirFetcher::new(source, config)))
    }
}

async fn bounded<T, F>(timeout: Duration, resource: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| FetchError::Timeout {
            resource: resource.to_string(),
            duration_ms: timeout.as_millis() as u64,
        })?
}

/// Fetches archives from a static HTTP server laid out as
/// `{base_url}/{locale}/{version}/{category}.{list,pack}`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>, config: FetchConfig) -> Result<Self> {
        // The fetch deadline is enforced by `bounded`, not by the client.
        let mut builder = Client::builder();
        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(Self::with_client(builder.build()?, base_url, config))
    }

    /// Use an existing HTTP client.
    pub fn with_client(client: Client, base_url: impl Into<String>, config: FetchConfig) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            config,
        }
    }

    pub fn url(&self, key: &ArchiveKey, kind: ResourceKind) -> String {
        format!("{}/{}", self.base_url, key.resource(kind))
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        trace!("Response status: {}", status);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                resource: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                resource: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Missing files come back as the site's HTML page with a 200.
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));
        if is_html {
            return Err(FetchError::NotFound {
                resource: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, key: &ArchiveKey, kind: ResourceKind) -> Result<Vec<u8>> {
        let url = self.url(key, kind);
        let timeout = self.config.timeout;

        // A client passed to `with_client` may carry its own timeout.
        bounded(timeout, &url, self.get(&url))
            .await
            .map_err(|e| match e {
                FetchError::Http(ref err) if err.is_timeout() => FetchError::Timeout {
                    resource: url.clone(),
                    duration_ms: timeout.as_millis() as u64,
                },
                e => e,
            })
    }
}

/// Fetches archives from a local mirror directory with the same layout as
/// the HTTP server.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
    config: FetchConfig,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>, config: FetchConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn path(&self, key: &ArchiveKey, kind: ResourceKind) -> PathBuf {
        self.root.join(key.resource(kind))
    }
}

#[async_trait]
impl Fetcher for DirFetcher {
    async fn fetch(&self, key: &ArchiveKey, kind: ResourceKind) -> Result<Vec<u8>> {
        let path = self.path(key, kind);
        let resource = path.display().to_string();
        debug!("reading {}", resource);

        bounded(self.config.timeout, &resource, async {
            tokio::fs::read(&path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => FetchError::NotFound {
                    resource: resource.clone(),
                },
                _ => FetchError::Io(e),
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcpack_common::{Category, Locale};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn key() -> ArchiveKey {
        ArchiveKey::new(Locale::Jp, "13.1.0", Category::DataLocal)
    }

    #[tokio::test]
    async fn test_http_fetch_pair() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/JP/13.1.0/DataLocal.list"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/octet-stream")
                    .set_body_bytes(b"LIST".to_vec()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/JP/13.1.0/DataLocal.pack"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PACK".to_vec()))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(server.uri(), FetchConfig::default()).unwrap();
        let pair = fetcher.fetch_pair(&key()).await.unwrap();

        assert_eq!(pair.list, b"LIST");
        assert_eq!(pair.pack, b"PACK");
    }

    #[tokio::test]
    async fn test_http_html_page_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<!doctype html><html></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(server.uri(), FetchConfig::default()).unwrap();
        let err = fetcher.fetch(&key(), ResourceKind::List).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_http_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(server.uri(), FetchConfig::default()).unwrap();
        let err = fetcher.fetch_pair(&key()).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_http_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(server.uri(), FetchConfig::default()).unwrap();
        let err = fetcher.fetch(&key(), ResourceKind::Pack).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_http_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"late".to_vec())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = FetchConfig::default().with_timeout(Duration::from_millis(50));
        let fetcher = HttpFetcher::new(server.uri(), config).unwrap();
        let err = fetcher.fetch(&key(), ResourceKind::List).await.unwrap_err();

        assert!(
            matches!(err, FetchError::Timeout { duration_ms: 50, .. }),
            "unexpected error: {err:?}"
        );
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_http_timeout_is_consistent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = FetchConfig::default().with_timeout(Duration::from_millis(50));
        let fetcher = HttpFetcher::new(server.uri(), config).unwrap();
        for _ in 0..5 {
            let err = fetcher.fetch(&key(), ResourceKind::Pack).await.unwrap_err();
            assert!(matches!(err, FetchError::Timeout { .. }), "unexpected error: {err:?}");
        }
    }

    #[tokio::test]
    async fn test_client_timeout_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = Client::builder()
            .timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        let fetcher = HttpFetcher::with_client(client, server.uri(), FetchConfig::default());
        let err = fetcher.fetch(&key(), ResourceKind::List).await.unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }), "unexpected error: {err:?}");
    }

    #[test]
    fn test_http_url_trims_slash() {
        let fetcher = HttpFetcher::new("https://example.com/data/", FetchConfig::default()).unwrap();
        assert_eq!(
            fetcher.url(&key(), ResourceKind::Pack),
            "https://example.com/data/JP/13.1.0/DataLocal.pack"
        );
    }

    #[tokio::test]
    async fn test_dir_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("JP/13.1.0");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join("DataLocal.list"), b"L").unwrap();
        std::fs::write(base.join("DataLocal.pack"), b"P").unwrap();

        let fetcher = DirFetcher::new(dir.path(), FetchConfig::default());
        let pair = fetcher.fetch_pair(&key()).await.unwrap();

        assert_eq!(pair.list, b"L");
        assert_eq!(pair.pack, b"P");
    }

    #[tokio::test]
    async fn test_dir_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = DirFetcher::new(dir.path(), FetchConfig::default());

        let err = fetcher.fetch_pair(&key()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_source() {
        assert!(from_source("https://example.com", FetchConfig::default()).is_ok());
        assert!(from_source("/srv/mirror", FetchConfig::default()).is_ok());
    }
}
