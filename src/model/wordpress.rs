//! Post records as served by the WordPress REST API (`/wp-json/wp/v2/posts`).

use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

/// An HTML-bearing field. `rendered` is always present, `raw` only in the
/// `edit` context.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContentField {
    pub rendered: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ContentField {
    pub fn rendered(rendered: impl Into<String>) -> Self {
        ContentField {
            rendered: rendered.into(),
            raw: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub title: ContentField,
    pub content: ContentField,
    pub excerpt: ContentField,
    pub date: String,
}

impl Post {
    /// Shown until the first fetch resolves.
    pub fn placeholder() -> Self {
        Post {
            id: 42,
            title: ContentField::rendered("Post Title"),
            content: ContentField::rendered("Post Content"),
            excerpt: ContentField::rendered("Post Excerpt"),
            date: "2019-03-19T06:53:51".to_string(),
        }
    }

    /// WordPress sends site-local time without an offset. Full RFC 3339 is
    /// accepted too, with the offset dropped.
    pub fn published(&self) -> Option<PrimitiveDateTime> {
        let local = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        PrimitiveDateTime::parse(&self.date, &local)
            .ok()
            .or_else(|| {
                OffsetDateTime::parse(&self.date, &Rfc3339)
                    .ok()
                    .map(|dt| PrimitiveDateTime::new(dt.date(), dt.time()))
            })
    }

    /// Human readable publication date, or the raw string if it doesn't parse.
    pub fn display_date(&self) -> String {
        let long = format_description!("[month repr:long] [day padding:none], [year]");
        self.published()
            .and_then(|dt| dt.format(&long).ok())
            .unwrap_or_else(|| self.date.clone())
    }
}
