use serde::{Deserialize, Serialize};

pub mod network;
pub mod wordpress;

pub use wordpress::{ContentField, Post};

/// Which field of each post the cards show.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    ShowExcerpt,
    ShowContent,
}

impl DisplayMode {
    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::ShowExcerpt => DisplayMode::ShowContent,
            DisplayMode::ShowContent => DisplayMode::ShowExcerpt,
        }
    }

    pub fn shows_content(self) -> bool {
        matches!(self, DisplayMode::ShowContent)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid form: {0}")]
    InvalidForm(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] crate::config::UrlError),

    #[error("editing the remote api url is disabled")]
    UrlEditingDisabled,

    #[error("could not render page: {0}")]
    Render(#[from] tera::Error),
}
