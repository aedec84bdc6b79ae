//! Song-info service client
//!
//! Looks up release date, lyrics and link for a `(group, song)` pair:
//! `GET <base>/info?group=<g>&song=<s>` returning
//! `{"releaseDate": "DD.MM.YYYY", "text": "...", "link": "..."}`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

/// Release date format used by the song-info service
const RELEASE_DATE_FORMAT: &str = "%d.%m.%Y";

const INFO_ENDPOINT: &str = "/info";

/// Song details returned by the song-info service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongInfo {
    pub release_date: NaiveDate,
    pub text: String,
    pub link: String,
}

/// Song-info client errors
#[derive(Debug, thiserror::Error)]
pub enum SongInfoError {
    #[error("invalid song-info URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("song-info request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("song-info service returned {0}")]
    Status(StatusCode),

    #[error("malformed song-info body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("invalid release date '{value}'")]
    ReleaseDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Source of song details, looked up before a song is stored
#[async_trait]
pub trait SongInfoSource: Send + Sync {
    async fn get(&self, group: &str, song: &str) -> Result<SongInfo, SongInfoError>;
}

#[derive(Debug, Deserialize)]
struct SongInfoBody {
    #[serde(rename = "releaseDate")]
    release_date: String,
    text: String,
    link: String,
}

impl TryFrom<SongInfoBody> for SongInfo {
    type Error = SongInfoError;

    fn try_from(body: SongInfoBody) -> Result<Self, Self::Error> {
        let release_date = NaiveDate::parse_from_str(&body.release_date, RELEASE_DATE_FORMAT)
            .map_err(|source| SongInfoError::ReleaseDate {
                value: body.release_date.clone(),
                source,
            })?;

        Ok(Self {
            release_date,
            text: body.text,
            link: body.link,
        })
    }
}

/// HTTP client for the song-info service
#[derive(Debug, Clone)]
pub struct SongInfoClient {
    http: Client,
    endpoint: Url,
}

impl SongInfoClient {
    /// Create a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SongInfoError> {
        let endpoint = Url::parse(&format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            INFO_ENDPOINT
        ))?;
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { http, endpoint })
    }

    /// The full `/info` URL requests are sent to, without query parameters.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, group: &str, song: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("group", group)
            .append_pair("song", song);
        url
    }
}

#[async_trait]
impl SongInfoSource for SongInfoClient {
    async fn get(&self, group: &str, song: &str) -> Result<SongInfo, SongInfoError> {
        let url = self.request_url(group, song);
        tracing::debug!(%url, "requesting song info");

        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SongInfoError::Status(status));
        }

        let bytes = response.bytes().await?;
        let body: SongInfoBody = serde_json::from_slice(&bytes)?;
        body.try_into()
    }
}
