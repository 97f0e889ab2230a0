//! HTTP server for the boardmap front-end
//!
//! Provides /health plus the /api routes for map link resolution, markers,
//! proposals, quota, theme and the local event stream.

use crate::routes;
use axum::{
    routing::{get, post},
    Router,
};
use boardmap_markers::{MarkerFeed, MarkerStoreClient};
use chrono::{DateTime, Utc};
use local_state::LocalContext;
use maplink_resolver::MapLinkResolver;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub resolver: MapLinkResolver,
    pub markers: Arc<MarkerStoreClient>,
    pub feed: MarkerFeed,
    pub local: LocalContext,
    pub daily_limit: u32,
    /// Cancelled on shutdown; per-request tokens are children of it
    pub shutdown: CancellationToken,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(
        resolver: MapLinkResolver,
        markers: Arc<MarkerStoreClient>,
        local: LocalContext,
        daily_limit: u32,
    ) -> Self {
        Self {
            resolver,
            feed: MarkerFeed::new(markers.clone()),
            markers,
            local,
            daily_limit,
            shutdown: CancellationToken::new(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/api/resolve-map-url",
            post(routes::resolve::resolve_map_url),
        )
        .route("/api/markers", get(routes::markers::list_markers))
        .route(
            "/api/markers/refresh",
            post(routes::markers::refresh_markers),
        )
        .route(
            "/api/proposed-markers",
            post(routes::proposals::propose_marker),
        )
        .route("/api/quota", get(routes::quota::get_quota))
        .route(
            "/api/theme",
            get(routes::theme::get_theme).put(routes::theme::set_theme),
        )
        .route("/api/events", get(routes::events::events))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server and run until ctrl-c
pub async fn start_server(state: SharedState, port: u16, cors: CorsLayer) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    let router = create_router(state, cors);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
}

async fn shutdown_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Could not listen for ctrl-c");
            shutdown.cancelled().await;
        }
    }
    shutdown.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::NaiveDate;
    use futures::StreamExt;
    use local_state::{FixedClock, LocalEvent, MemoryStore, ToastKind};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tempfile::tempdir;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn create_test_state(store_url: &str) -> SharedState {
        create_test_state_with_clock(store_url).0
    }

    fn create_test_state_with_clock(store_url: &str) -> (SharedState, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(day()));
        let local = LocalContext::new(Arc::new(MemoryStore::new()), clock.clone());
        let state = Arc::new(ServerState::new(
            MapLinkResolver::new(),
            Arc::new(MarkerStoreClient::new(store_url)),
            local,
            5,
        ));
        (state, clock)
    }

    fn router_for(state: &SharedState) -> Router {
        create_router(state.clone(), CorsLayer::permissive())
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn proposal_body() -> Value {
        json!({
            "url": "https://www.google.com/maps/place/Example+Gym/@51.9225,4.47917,17z",
            "title": "  Example Gym  ",
            "coords": { "lat": 51.9225, "lng": 4.47917 },
            "layout": ["MB 2024"],
            "angle": [40, 25],
            "website": "https://example-gym.local/",
            "instagram": ""
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = create_test_state(UNREACHABLE);
        let (status, json) = send(&router_for(&state), get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_u64().is_some());
    }

    #[test]
    fn test_server_state_new() {
        let state = create_test_state(UNREACHABLE);

        let diff = (Utc::now() - state.started_at).num_seconds();
        assert!((0..5).contains(&diff));
        assert!(!state.shutdown.is_cancelled());
        assert_eq!(state.daily_limit, 5);
    }

    #[tokio::test]
    async fn test_resolve_without_body_reports_missing_url() {
        let state = create_test_state(UNREACHABLE);
        let router = router_for(&state);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/resolve-map-url")
            .body(Body::from("not json"))
            .unwrap();
        let (status, json) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({ "success": false, "error": "Missing url in request body" })
        );

        let (status, json) = send(
            &router,
            json_request(Method::POST, "/api/resolve-map-url", json!({ "url": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_resolve_follows_link_to_place() {
        let maps = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex("^/maps/place/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&maps)
            .await;

        let state = create_test_state(UNREACHABLE);
        let url = format!("{}/maps/place/Example+Gym/@51.9,4.4,17z", maps.uri());
        let (status, json) = send(
            &router_for(&state),
            json_request(Method::POST, "/api/resolve-map-url", json!({ "url": url })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["parsed"]["lat"], "51.9");
        assert_eq!(json["parsed"]["lng"], "4.4");
        assert_eq!(json["parsed"]["title"], "Example Gym");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_resolve_unreachable_host_is_still_200() {
        let state = create_test_state(UNREACHABLE);
        let (status, json) = send(
            &router_for(&state),
            json_request(
                Method::POST,
                "/api/resolve-map-url",
                json!({ "url": "http://127.0.0.1:9/maps/@51.9,4.4,17z" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_markers_snapshot_and_refresh() {
        let store = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "-Nabc": { "title": "Boulderhal Sterk", "coords": { "lat": 52.07654, "lng": 5.10828 } }
            })))
            .mount(&store)
            .await;

        let state = create_test_state(&store.uri());
        let router = router_for(&state);

        let (_, json) = send(&router, get("/api/markers")).await;
        assert_eq!(json["markers"], json!([]));
        assert_eq!(json["loading"], false);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/markers/refresh")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["markers"][0]["id"], "-Nabc");
        assert!(json["error"].is_null());

        let (_, json) = send(&router, get("/api/markers")).await;
        assert_eq!(json["markers"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quota_endpoint() {
        let state = create_test_state(UNREACHABLE);
        let router = router_for(&state);

        let (status, json) = send(&router, get("/api/quota")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({ "date": "2026-10-16", "count": 0, "limit": 5, "canSubmit": true })
        );

        for _ in 0..5 {
            state.local.quota.increment();
        }
        let (_, json) = send(&router, get("/api/quota")).await;
        assert_eq!(json["count"], 5);
        assert_eq!(json["canSubmit"], false);
    }

    #[tokio::test]
    async fn test_quota_reflects_a_new_day() {
        let (state, clock) = create_test_state_with_clock(UNREACHABLE);
        for _ in 0..5 {
            state.local.quota.increment();
        }
        clock.advance_days(1);

        let (_, json) = send(&router_for(&state), get("/api/quota")).await;
        assert_eq!(
            json,
            json!({ "date": "2026-10-17", "count": 0, "limit": 5, "canSubmit": true })
        );
    }

    #[tokio::test]
    async fn test_concurrent_proposals_cannot_exceed_limit() {
        let store = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proposedMarkers.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "-Nprop" }))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(5)
            .mount(&store)
            .await;

        let state = create_test_state(&store.uri());
        let router = router_for(&state);

        let router = &router;
        let requests = (0..10).map(move |_| {
            send(
                router,
                json_request(Method::POST, "/api/proposed-markers", proposal_body()),
            )
        });
        let responses = futures::future::join_all(requests).await;

        let accepted = responses
            .iter()
            .filter(|(status, _)| *status == StatusCode::OK)
            .count();
        let limited = responses
            .iter()
            .filter(|(status, _)| *status == StatusCode::TOO_MANY_REQUESTS)
            .count();
        assert_eq!(accepted, 5);
        assert_eq!(limited, 5);
        assert_eq!(state.local.quota.count_today(), 5);
    }

    #[tokio::test]
    async fn test_proposal_success() {
        let store = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proposedMarkers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "-Nprop" })))
            .expect(1)
            .mount(&store)
            .await;

        let state = create_test_state(&store.uri());
        let mut rx = state.local.events.subscribe();

        let (status, json) = send(
            &router_for(&state),
            json_request(Method::POST, "/api/proposed-markers", proposal_body()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "-Nprop");
        assert_eq!(
            json["reviewUrl"],
            format!("{}/proposedMarkers/-Nprop.json", store.uri())
        );
        assert_eq!(json["count"], 1);
        assert_eq!(state.local.quota.count_today(), 1);

        let requests = store.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["title"], "Example Gym");
        assert_eq!(sent["status"], "pending");
        assert_eq!(sent["submittedBy"], "anonymous");
        assert_eq!(sent["angle"], json!([40, 25]));
        assert!(sent["submittedAt"].as_i64().unwrap() > 0);
        assert!(sent.get("instagram").is_none());

        assert_eq!(rx.recv().await.unwrap().name(), "quota-changed");
        match rx.recv().await.unwrap() {
            LocalEvent::Toast(toast) => assert_eq!(toast.kind, ToastKind::Success),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_proposal_rejected_when_quota_exhausted() {
        let store = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proposedMarkers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "-Nprop" })))
            .expect(0)
            .mount(&store)
            .await;

        let state = create_test_state(&store.uri());
        for _ in 0..5 {
            state.local.quota.increment();
        }
        let mut rx = state.local.events.subscribe();

        let (status, json) = send(
            &router_for(&state),
            json_request(Method::POST, "/api/proposed-markers", proposal_body()),
        )
        .await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(json["error"].as_str().unwrap().contains("Daily limit"));
        assert_eq!(state.local.quota.count_today(), 5);
        match rx.recv().await.unwrap() {
            LocalEvent::Toast(toast) => assert_eq!(toast.kind, ToastKind::Error),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_proposal_store_failure_leaves_quota() {
        let store = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/proposedMarkers.json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&store)
            .await;

        let state = create_test_state(&store.uri());
        let (status, json) = send(
            &router_for(&state),
            json_request(Method::POST, "/api/proposed-markers", proposal_body()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().contains("Fetch failed: 500"));
        assert_eq!(state.local.quota.count_today(), 0);
    }

    #[tokio::test]
    async fn test_proposal_validation() {
        let state = create_test_state(UNREACHABLE);
        let router = router_for(&state);

        let mut body = proposal_body();
        body["title"] = json!("   ");
        let (status, json) = send(
            &router,
            json_request(Method::POST, "/api/proposed-markers", body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "title is required");

        let mut body = proposal_body();
        body["coords"] = json!({ "lat": 95.0, "lng": 4.4 });
        let (status, json) = send(
            &router,
            json_request(Method::POST, "/api/proposed-markers", body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid coordinates");
    }

    #[tokio::test]
    async fn test_theme_follows_system_until_saved() {
        let state = create_test_state(UNREACHABLE);
        let router = router_for(&state);

        let (_, json) = send(&router, get("/api/theme?systemDark=true")).await;
        assert_eq!(json["theme"], "dark");
        let (_, json) = send(&router, get("/api/theme")).await;
        assert_eq!(json["theme"], "light");

        let (status, json) = send(
            &router,
            json_request(Method::PUT, "/api/theme", json!({ "theme": "light" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["theme"], "light");

        let (_, json) = send(&router, get("/api/theme?systemDark=true")).await;
        assert_eq!(json["theme"], "light");
    }

    #[tokio::test]
    async fn test_theme_rejects_unknown_value() {
        let state = create_test_state(UNREACHABLE);
        let (status, _) = send(
            &router_for(&state),
            json_request(Method::PUT, "/api/theme", json!({ "theme": "sepia" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.local.theme.saved(), None);
    }

    #[tokio::test]
    async fn test_event_stream_delivers_toasts() {
        let state = create_test_state(UNREACHABLE);
        let response = router_for(&state)
            .oneshot(get("/api/events"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/event-stream"));

        state.local.events.toast("Copied", ToastKind::Info);

        let mut body = response.into_body().into_data_stream();
        let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        assert!(text.contains("event: toast"));
        assert!(text.contains("\"message\":\"Copied\""));
        assert!(text.contains("\"duration\":4000"));
    }

    #[tokio::test]
    async fn test_event_stream_ends_on_shutdown() {
        let state = create_test_state(UNREACHABLE);
        let response = router_for(&state)
            .oneshot(get("/api/events"))
            .await
            .unwrap();

        state.shutdown.cancel();

        let mut body = response.into_body().into_data_stream();
        let next = tokio::time::timeout(Duration::from_secs(2), body.next())
            .await
            .unwrap();
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_quota_survives_restart() {
        let dir = tempdir().unwrap();
        let markers = Arc::new(MarkerStoreClient::new(UNREACHABLE));

        let first = ServerState::new(
            MapLinkResolver::new(),
            markers.clone(),
            LocalContext::open(dir.path()).unwrap(),
            5,
        );
        first.local.quota.increment();
        first.local.quota.increment();
        drop(first);

        let state: SharedState = Arc::new(ServerState::new(
            MapLinkResolver::new(),
            markers,
            LocalContext::open(dir.path()).unwrap(),
            5,
        ));
        let (_, json) = send(&router_for(&state), get("/api/quota")).await;
        assert_eq!(json["count"], 2);
    }
}
