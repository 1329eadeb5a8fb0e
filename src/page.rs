use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::model::{DisplayMode, Post};

/// Markup that goes into the page without further escaping.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct Html(pub String);

/// What to do with server supplied markup before it is injected into a card.
///
/// `Trusted` treats the upstream API as a trusted HTML source and inserts
/// `rendered` verbatim, which is what rich text from WordPress needs.
/// `Escaped` shows the markup as text instead.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarkupPolicy {
    #[default]
    Trusted,
    Escaped,
}

impl MarkupPolicy {
    pub fn apply(self, markup: &str) -> Html {
        match self {
            MarkupPolicy::Trusted => Html(markup.to_string()),
            MarkupPolicy::Escaped => Html(tera::escape_html(markup)),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct PostCard {
    pub dom_id: String,
    pub heading: String,
    pub datetime: String,
    pub date: String,
    pub body: Html,
}

impl PostCard {
    pub fn new(post: &Post, mode: DisplayMode, policy: MarkupPolicy) -> Self {
        let field = if mode.shows_content() {
            &post.content
        } else {
            &post.excerpt
        };

        PostCard {
            dom_id: format!("post-{}", post.id),
            heading: post.title.rendered.clone(),
            datetime: post.date.clone(),
            date: post.display_date(),
            body: policy.apply(&field.rendered),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct ToggleControl {
    pub label: &'static str,
    pub action: &'static str,
    pub pressed: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct ListView {
    pub toggle: ToggleControl,
    pub cards: Vec<PostCard>,
}

impl ListView {
    pub fn new(posts: &[Post], mode: DisplayMode, policy: MarkupPolicy) -> Self {
        ListView {
            toggle: ToggleControl {
                label: "Show Full Content",
                action: "/toggle",
                pressed: mode.shows_content(),
            },
            cards: posts
                .iter()
                .map(|post| PostCard::new(post, mode, policy))
                .collect(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct ApiUrlControl {
    pub id: &'static str,
    pub label: &'static str,
    pub action: &'static str,
    pub url: String,
}

impl ApiUrlControl {
    pub fn new(url: impl Into<String>) -> Self {
        ApiUrlControl {
            id: "remote-api",
            label: "Remote API URL",
            action: "/api-url",
            url: url.into(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct RootView {
    pub api_url: Option<ApiUrlControl>,
    pub list: ListView,
}

pub struct Templates(Tera);

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("index.html", include_str!("../templates/index.html")),
            ("list_view.html", include_str!("../templates/list_view.html")),
            ("post_card.html", include_str!("../templates/post_card.html")),
            ("api_url.html", include_str!("../templates/api_url.html")),
        ])?;
        Ok(Templates(tera))
    }

    pub fn render(&self, root: &RootView) -> Result<String, tera::Error> {
        let context = Context::from_serialize(root)?;
        self.0.render("index.html", &context)
    }
}
