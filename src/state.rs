use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::{
    sync::{Mutex, RwLock},
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, error, info};

use crate::{
    config::{Config, HttpUrl, UrlError},
    fetch::{FetchError, PostsClient},
    model::{DisplayMode, Post},
    page::{ApiUrlControl, ListView, MarkupPolicy, RootView, Templates},
};

pub const MAX_DIAGNOSTICS: usize = 64;

/// A fetch that failed, kept so the failure is visible after the fact.
#[derive(Serialize, Clone, Debug)]
pub struct FetchFailure {
    #[serde(with = "time::serde::iso8601")]
    pub at: OffsetDateTime,
    pub url: String,
    pub status: Option<u16>,
    pub message: String,
}

impl FetchFailure {
    fn new(url: &HttpUrl, err: &FetchError) -> Self {
        FetchFailure {
            at: OffsetDateTime::now_utc(),
            url: url.to_string(),
            status: err.status(),
            message: err.to_string(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("could not build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("could not load templates: {0}")]
    Templates(#[from] tera::Error),

    #[error("invalid posts url: {0}")]
    PostsUrl(#[from] UrlError),
}

/// Root of the page: owns the post list and the display mode, and is the
/// only thing that talks to the remote API.
pub struct AppState {
    client: PostsClient,
    templates: Templates,
    markup: MarkupPolicy,
    editable: bool,

    posts: RwLock<Vec<Post>>,
    display: RwLock<DisplayMode>,
    api_url: RwLock<HttpUrl>,
    diagnostics: Mutex<VecDeque<FetchFailure>>,

    generation: AtomicU64,
    inflight: Mutex<Option<AbortHandle>>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Arc<Self>, InitError> {
        Ok(Arc::new(AppState {
            client: PostsClient::new(config.api.timeout())?,
            templates: Templates::new()?,
            markup: config.render.markup,
            editable: config.api.editable,

            posts: RwLock::new(vec![Post::placeholder()]),
            display: RwLock::new(DisplayMode::default()),
            api_url: RwLock::new(config.api.posts_url()?),
            diagnostics: Mutex::new(VecDeque::new()),

            generation: AtomicU64::new(0),
            inflight: Mutex::new(None),
        }))
    }

    /// Starts fetching the post list from the current API URL.
    ///
    /// A fetch still running from an earlier call is aborted, and its result
    /// is discarded if it lands anyway: the latest started request wins.
    pub async fn load_posts(self: &Arc<Self>) -> JoinHandle<()> {
        let mut inflight = self.inflight.lock().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let url = self.api_url.read().await.clone();

        if let Some(previous) = inflight.take() {
            debug!(generation, "aborting superseded fetch");
            previous.abort();
        }

        let state = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = state.client.fetch(&url).await;
            state.apply(generation, &url, result).await;
        });
        *inflight = Some(handle.abort_handle());

        handle
    }

    async fn apply(&self, generation: u64, url: &HttpUrl, result: Result<Vec<Post>, FetchError>) {
        let mut posts = self.posts.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, %url, "discarding superseded fetch result");
            return;
        }

        match result {
            Ok(fetched) => {
                info!(%url, count = fetched.len(), "loaded posts");
                *posts = fetched;
            }

            Err(err) => {
                let mut diagnostics = self.diagnostics.lock().await;
                drop(posts);
                error!(%url, error = %err, "failed to load posts");
                if diagnostics.len() == MAX_DIAGNOSTICS {
                    diagnostics.pop_front();
                }
                diagnostics.push_back(FetchFailure::new(url, &err));
            }
        }
    }

    pub async fn toggle_display(&self) -> DisplayMode {
        let mut guard = self.display.write().await;
        let mode = guard.toggle();
        *guard = mode;
        debug!(?mode, "toggled display mode");
        mode
    }

    pub fn url_editable(&self) -> bool {
        self.editable
    }

    /// Points the page at a different endpoint and refetches.
    pub async fn set_api_url(self: &Arc<Self>, url: HttpUrl) -> JoinHandle<()> {
        info!(%url, "remote api url changed");
        *self.api_url.write().await = url;
        self.load_posts().await
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }

    pub async fn display(&self) -> DisplayMode {
        *self.display.read().await
    }

    pub async fn api_url(&self) -> HttpUrl {
        self.api_url.read().await.clone()
    }

    pub async fn diagnostics(&self) -> Vec<FetchFailure> {
        self.diagnostics.lock().await.iter().cloned().collect()
    }

    pub async fn root_view(&self) -> RootView {
        let api_url = if self.editable {
            Some(ApiUrlControl::new(self.api_url().await.to_string()))
        } else {
            None
        };

        let posts = self.posts.read().await;
        RootView {
            api_url,
            list: ListView::new(&posts, self.display().await, self.markup),
        }
    }

    pub async fn render(&self) -> Result<String, tera::Error> {
        let root = self.root_view().await;
        self.templates.render(&root)
    }
}
