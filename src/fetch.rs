//! Fetching documents that a `$ref` points into.
//!
//! The resolver only needs `GET url -> (status, body)`. [`DefaultFetcher`]
//! covers `http(s)://` through reqwest and `file://` through tokio's fs.

use async_trait::async_trait;
use url::Url;

use crate::error::FetchError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw response from a fetch: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of documents for cross-document references.
///
/// `url` never carries a fragment.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

/// Fetches `http://` and `https://` documents.
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "remote")]
impl HttpFetcher {
    /// Client with the default 10 second timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Use a preconfigured client (proxies, headers, TLS roots).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "remote")]
#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}

/// Reads `file://` documents from the local filesystem.
///
/// A missing file is reported as status 404 so it fails the same way a
/// missing remote document does.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            })?;
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                body: String::new(),
            }),
            Err(source) => Err(FetchError::Io { path, source }),
        }
    }
}

/// Dispatches on URL scheme: `file` to [`FileFetcher`], `http`/`https` to
/// [`HttpFetcher`] when the `remote` feature is enabled.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    file: FileFetcher,
    #[cfg(feature = "remote")]
    http: HttpFetcher,
}

impl DefaultFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            file: FileFetcher,
            #[cfg(feature = "remote")]
            http: HttpFetcher::new()?,
        })
    }

    #[cfg(feature = "remote")]
    pub fn with_http(http: HttpFetcher) -> Self {
        Self {
            file: FileFetcher,
            http,
        }
    }
}

#[async_trait]
impl Fetcher for DefaultFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        match url.scheme() {
            "file" => self.file.fetch(url).await,
            #[cfg(feature = "remote")]
            "http" | "https" => self.http.fetch(url).await,
            other => Err(FetchError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }
}
