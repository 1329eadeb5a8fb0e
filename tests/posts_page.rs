use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use wpcards::{
    build_router,
    config::HttpUrl,
    model::{DisplayMode, Post},
    AppState, Config,
};

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, router).await.expect("serve") });
    addr
}

fn post_json(id: u64, title: &str, content: &str, excerpt: &str) -> Value {
    json!({
        "id": id,
        "date": "2020-01-01T00:00:00",
        "title": {"rendered": title},
        "content": {"rendered": content},
        "excerpt": {"rendered": excerpt},
    })
}

/// A WordPress stand-in with a handful of endpoints.
async fn fake_wordpress() -> SocketAddr {
    let router = Router::new()
        .route(
            "/wp-json/wp/v2/posts",
            get(|| async { Json(json!([post_json(1, "A", "<p>Body</p>", "Body…")])) }),
        )
        .route(
            "/many",
            get(|| async {
                Json(Value::Array(
                    [5, 3, 8, 13, 21]
                        .into_iter()
                        .map(|id| post_json(id, &format!("Post {id}"), "<p>c</p>", "e"))
                        .collect(),
                ))
            }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/not-posts",
            get(|| async { Json(json!({"code": "rest_no_route"})) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!([post_json(100, "Slow", "", "")]))
            }),
        )
        .route(
            "/fast",
            get(|| async { Json(json!([post_json(200, "Fast", "", "")])) }),
        );

    serve(router).await
}

fn config(posts_url: &str, editable: bool) -> Config {
    let mut config = Config::default();
    config.api.posts_url = Some(HttpUrl::parse(posts_url).expect("posts url"));
    config.api.editable = editable;
    config.api.timeout_secs = 5;
    config
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}

async fn page(addr: SocketAddr) -> String {
    let response = client()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .expect("get page");
    assert_eq!(response.status(), 200);
    response.text().await.expect("page body")
}

fn card_count(html: &str) -> usize {
    html.matches(r#"class="post-card""#).count()
}

#[tokio::test]
async fn shows_fetched_post_and_toggles_content() {
    let wp = fake_wordpress().await;
    let state = AppState::new(&config(&format!("http://{wp}/wp-json/wp/v2/posts"), false))
        .expect("state");
    state.load_posts().await.await.expect("fetch task");

    let app = serve(build_router(Arc::clone(&state))).await;

    let html = page(app).await;
    assert_eq!(card_count(&html), 1, "{html}");
    assert!(html.contains(r#"id="post-1""#), "{html}");
    assert!(html.contains("<h1>A</h1>"), "{html}");
    assert!(html.contains("Body…"), "{html}");
    assert!(!html.contains("<p>Body</p>"), "{html}");

    let toggled = client()
        .post(format!("http://{app}/toggle"))
        .send()
        .await
        .expect("toggle");
    assert_eq!(toggled.status(), StatusCode::SEE_OTHER);
    assert_eq!(toggled.headers()["location"], "/");
    assert_eq!(state.display().await, DisplayMode::ShowContent);

    let html = page(app).await;
    assert!(html.contains("<div><p>Body</p></div>"), "{html}");
    assert!(!html.contains("Body…"), "{html}");

    client()
        .post(format!("http://{app}/toggle"))
        .send()
        .await
        .expect("toggle back");
    assert!(page(app).await.contains("Body…"));
}

#[tokio::test]
async fn renders_one_card_per_post_in_order() {
    let wp = fake_wordpress().await;
    let state = AppState::new(&config(&format!("http://{wp}/many"), false)).expect("state");
    state.load_posts().await.await.expect("fetch task");

    let app = serve(build_router(Arc::clone(&state))).await;
    let html = page(app).await;

    assert_eq!(card_count(&html), 5, "{html}");
    let positions: Vec<usize> = [5, 3, 8, 13, 21]
        .iter()
        .map(|id| html.find(&format!(r#"id="post-{id}""#)).expect("card present"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");

    let listed: Vec<Post> = client()
        .get(format!("http://{app}/posts.json"))
        .send()
        .await
        .expect("posts.json")
        .json()
        .await
        .expect("decode posts");
    assert_eq!(listed, state.posts().await);
    assert_eq!(listed.len(), 5);
}

#[tokio::test]
async fn network_failure_keeps_placeholder() {
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let dead = unused.local_addr().expect("addr");
    drop(unused);

    let state = AppState::new(&config(&format!("http://{dead}/wp-json/wp/v2/posts"), false))
        .expect("state");
    let before = state.posts().await;
    state.load_posts().await.await.expect("fetch task");

    assert_eq!(state.posts().await, before);
    assert_eq!(before, vec![Post::placeholder()]);

    let app = serve(build_router(Arc::clone(&state))).await;
    let html = page(app).await;
    assert_eq!(card_count(&html), 1);
    assert!(html.contains("<h1>Post Title</h1>"), "{html}");

    let diagnostics: Value = client()
        .get(format!("http://{app}/diagnostics"))
        .send()
        .await
        .expect("diagnostics")
        .json()
        .await
        .expect("decode diagnostics");
    let entries = diagnostics.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert!(entries[0]["url"].as_str().unwrap().contains(&dead.to_string()));
    assert!(entries[0]["status"].is_null());
}

#[tokio::test]
async fn error_status_and_bad_body_are_failures() {
    let wp = fake_wordpress().await;

    for (path, status) in [("/broken", Some(500)), ("/not-posts", None)] {
        let state =
            AppState::new(&config(&format!("http://{wp}{path}"), false)).expect("state");
        state.load_posts().await.await.expect("fetch task");

        assert_eq!(state.posts().await, vec![Post::placeholder()], "{path}");
        let diagnostics = state.diagnostics().await;
        assert_eq!(diagnostics.len(), 1, "{path}");
        assert_eq!(diagnostics[0].status, status, "{path}");
    }
}

#[tokio::test]
async fn latest_started_fetch_wins() {
    let wp = fake_wordpress().await;
    let state = AppState::new(&config(&format!("http://{wp}/slow"), true)).expect("state");

    let slow = state.load_posts().await;
    let fast = state
        .set_api_url(HttpUrl::parse(&format!("http://{wp}/fast")).expect("url"))
        .await;

    fast.await.expect("fast fetch");
    let aborted = slow.await.expect_err("slow fetch aborted");
    assert!(aborted.is_cancelled());

    tokio::time::sleep(Duration::from_millis(700)).await;
    let posts = state.posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, 200);
    assert!(state.diagnostics().await.is_empty());
}

#[tokio::test]
async fn url_control_is_off_by_default() {
    let wp = fake_wordpress().await;
    let state = AppState::new(&config(&format!("http://{wp}/fast"), false)).expect("state");
    let app = serve(build_router(Arc::clone(&state))).await;

    assert!(!page(app).await.contains("remote-api"));

    let response = client()
        .post(format!("http://{app}/api-url"))
        .form(&[("url", format!("http://{wp}/many"))])
        .send()
        .await
        .expect("post url");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(state.api_url().await.as_str(), format!("http://{wp}/fast"));
}

#[tokio::test]
async fn url_control_refetches_from_new_endpoint() {
    let wp = fake_wordpress().await;
    let state = AppState::new(&config(&format!("http://{wp}/fast"), true)).expect("state");
    let app = serve(build_router(Arc::clone(&state))).await;

    let html = page(app).await;
    assert!(html.contains(r#"<label for="remote-api">Remote API URL</label>"#), "{html}");
    assert!(html.contains(r#"id="remote-api""#), "{html}");

    for bad in ["not a url", "ftp://example.org/posts"] {
        let response = client()
            .post(format!("http://{app}/api-url"))
            .form(&[("url", bad)])
            .send()
            .await
            .expect("post url");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{bad}");
    }

    let response = client()
        .post(format!("http://{app}/api-url"))
        .form(&[("url", format!("http://{wp}/many"))])
        .send()
        .await
        .expect("post url");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let mut loaded = false;
    for _ in 0..50 {
        if state.posts().await.len() == 5 {
            loaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(loaded, "posts from the new endpoint never arrived");
    assert_eq!(card_count(&page(app).await), 5);
}

#[tokio::test]
async fn malformed_url_form_is_rejected_as_json() {
    let wp = fake_wordpress().await;
    let state = AppState::new(&config(&format!("http://{wp}/fast"), true)).expect("state");
    let app = serve(build_router(Arc::clone(&state))).await;

    let response = client()
        .post(format!("http://{app}/api-url"))
        .form(&[("address", format!("http://{wp}/many"))])
        .send()
        .await
        .expect("post form");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await.expect("error body");
    let err = body["err"].as_str().expect("err field");
    assert!(err.starts_with("invalid form"), "{err}");
    assert_eq!(state.api_url().await.as_str(), format!("http://{wp}/fast"));
}
