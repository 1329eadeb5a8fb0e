use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::model::Post;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport { url: Url, source: reqwest::Error },

    #[error("{url} responded with {status}")]
    Status { url: Url, status: StatusCode },

    #[error("could not decode posts from {url}: {source}")]
    Decode {
        url: Url,
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(status.as_u16()),
            FetchError::Transport { .. } | FetchError::Decode { .. } => None,
        }
    }
}

/// Reads the post list from a WordPress style REST endpoint.
#[derive(Clone, Debug)]
pub struct PostsClient {
    http: reqwest::Client,
}

impl PostsClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(PostsClient { http })
    }

    pub async fn fetch(&self, url: &Url) -> Result<Vec<Post>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };

        let response = self.http.get(url.clone()).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!(%url, bytes = body.len(), "fetched posts");

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.clone(),
            source,
        })
    }
}
