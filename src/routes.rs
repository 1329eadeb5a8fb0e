use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, Redirect},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    compat::{MyForm, MyJson},
    config::HttpUrl,
    model::{network::ApiUrlForm, ApiError, Post},
    state::{AppState, FetchFailure},
};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/toggle", post(toggle))
        .route("/api-url", post(set_api_url))
        .route("/posts.json", get(posts))
        .route("/diagnostics", get(diagnostics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.render().await?))
}

async fn toggle(State(state): State<Arc<AppState>>) -> Redirect {
    state.toggle_display().await;
    Redirect::to("/")
}

async fn set_api_url(
    State(state): State<Arc<AppState>>,
    MyForm(form): MyForm<ApiUrlForm>,
) -> Result<Redirect, ApiError> {
    if !state.url_editable() {
        return Err(ApiError::UrlEditingDisabled);
    }

    let url = HttpUrl::parse(&form.url)?;
    state.set_api_url(url).await;
    Ok(Redirect::to("/"))
}

async fn posts(State(state): State<Arc<AppState>>) -> MyJson<Vec<Post>> {
    MyJson(state.posts().await)
}

async fn diagnostics(State(state): State<Arc<AppState>>) -> MyJson<Vec<FetchFailure>> {
    MyJson(state.diagnostics().await)
}
