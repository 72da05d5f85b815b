use std::fmt;
use std::time::Duration;

use log::{debug, error};
use reqwest::{Client as ReqwestClient, Response, Url};
use serde::de::DeserializeOwned;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchError {
    InvalidUrl(String),
    /// An identifier that a URL path cannot carry, such as `..`.
    InvalidSegment(String),
    Network(String),
    Status(u16, String),
    Format(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(e) => write!(f, "Invalid server URL: {e}"),
            Self::InvalidSegment(s) => {
                write!(f, "Cannot request '{s}': not usable as a path segment")
            }
            Self::Network(e) => write!(f, "Network error: {e}"),
            Self::Status(code, msg) if msg.is_empty() => {
                write!(f, "Server responded with status {code}")
            }
            Self::Status(code, msg) => {
                write!(f, "Server responded with status {code}: {msg}")
            }
            Self::Format(e) => write!(f, "Unexpected response format: {e}"),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Format(value.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    client: ReqwestClient,
    base_url: Url,
}

impl Client {
    const TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(format!(
                "{base_url} cannot be used as a base"
            )));
        }
        Ok(Self {
            client: ReqwestClient::builder().timeout(Self::TIMEOUT).build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append raw path segments to the base URL.
    ///
    /// Segments are percent-encoded here, so callers pass identifiers as the
    /// server sent them. `.` and `..` are refused: URL parsing resolves them
    /// (and their `%2E` forms) as dot segments, so the request would reach a
    /// different endpoint.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        if let Some(dots) = segments
            .iter()
            .map(AsRef::as_ref)
            .find(|s| matches!(*s, "." | ".."))
        {
            return Err(FetchError::InvalidSegment(dots.to_owned()));
        }
        let mut url = self.base_url.clone();
        // Only fails for cannot-be-a-base URLs, rejected in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    pub async fn get_json<T, S>(&self, segments: &[S]) -> Result<T>
    where
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        let body = self.get_bytes(segments).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn get_bytes<S: AsRef<str>>(
        &self,
        segments: &[S],
    ) -> Result<Vec<u8>> {
        let url = self.endpoint(segments)?;
        debug!("GET {url}");
        let rsp = self.client.get(url).send().await?;
        let rsp = Self::check_status(rsp).await?;
        Ok(rsp.bytes().await?.to_vec())
    }

    async fn check_status(rsp: Response) -> Result<Response> {
        let status = rsp.status();
        if status.is_success() {
            return Ok(rsp);
        }
        let body = rsp.text().await.unwrap_or_default();
        if body.is_empty() {
            error!("Received an unsuccessful response (empty body).");
        } else {
            error!("Received an unsuccessful response (non-empty body: '{body}').");
        }
        Err(FetchError::Status(status.as_u16(), body))
    }
}
