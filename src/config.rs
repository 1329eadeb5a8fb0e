use serde::{de::Visitor, Deserialize};
use std::{
    net::{Ipv4Addr, SocketAddr},
    ops::Deref,
    path::Path,
    time::Duration,
};
use url::Url;

use crate::page::MarkupPolicy;

pub const DEFAULT_POSTS_URL: &str = "https://wholeblogs.com/wp-json/wp/v2/posts";

/// Used when `RUST_LOG` is unset. `tower_http` carries the request traces.
pub const DEFAULT_LOG_FILTER: &str = "info,wpcards=debug,tower_http=debug";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NetConfig {
    pub bind: SocketAddr,
}

impl Default for NetConfig {
    fn default() -> Self {
        NetConfig {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Falls back to [`DEFAULT_POSTS_URL`] when unset.
    pub posts_url: Option<HttpUrl>,
    pub editable: bool,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            posts_url: None,
            editable: false,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn posts_url(&self) -> Result<HttpUrl, UrlError> {
        match &self.posts_url {
            Some(url) => Ok(url.clone()),
            None => HttpUrl::parse(DEFAULT_POSTS_URL),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RenderConfig {
    pub markup: MarkupPolicy,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub net: NetConfig,
    pub api: ApiConfig,
    pub render: RenderConfig,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads the file named by the first argument, or the defaults without one.
    pub fn from_args() -> Result<Self, ConfigError> {
        match std::env::args_os().nth(1) {
            Some(path) => Config::load(Path::new(&path)),
            None => Ok(Config::default()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UrlError {
    #[error(transparent)]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme {0:?}, expected http or https")]
    Scheme(String),
}

/// An absolute `http` or `https` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrl(Url);

impl HttpUrl {
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let url = Url::parse(input.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(HttpUrl(url)),
            other => Err(UrlError::Scheme(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for HttpUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct HttpUrlVisitor;
        impl Visitor<'_> for HttpUrlVisitor {
            type Value = HttpUrl;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "an http or https url")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                HttpUrl::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HttpUrlVisitor)
    }
}

impl Deref for HttpUrl {
    type Target = Url;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for HttpUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
