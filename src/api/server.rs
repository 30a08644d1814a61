//! HTTP server
//!
//! Builds the axum router over the shared [`AppState`] and serves it until the
//! shutdown token fires.

use crate::api::handlers;
use crate::service::{AppState, ServiceError};
use anyhow::{Context, Result};
use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Build the router with every route of the service
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/players",
            get(handlers::list_players).post(handlers::create_player),
        )
        .route("/players/{player_id}", get(handlers::get_player))
        .route("/matches", post(handlers::play_match))
        .route("/signin", post(handlers::sign_in))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            record_request,
        ))
        .layer(middleware::from_fn(allow_any_origin))
        .with_state(state)
}

/// Count every routed request by route template and status
async fn record_request(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().clone();

    let response = next.run(request).await;

    debug!(%method, route = %route, status = response.status().as_u16(), "Request served");
    state
        .metrics()
        .record_http_request(&route, response.status().as_u16());
    response
}

async fn allow_any_origin(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

/// The HTTP API of a running service
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown: CancellationToken,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Address from the service settings
    pub fn address(&self) -> Result<SocketAddr> {
        let service = &self.state.config().service;
        format!("{}:{}", service.http_host, service.http_port)
            .parse()
            .context("Invalid HTTP server address")
    }

    /// Serve until [`ApiServer::stop`] is called
    pub async fn serve(&self) -> Result<()> {
        let addr = self.address()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::Server {
                message: format!("failed to bind {}: {}", addr, e),
            })?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve_on(&self, listener: TcpListener) -> Result<()> {
        info!("HTTP API listening on http://{}", listener.local_addr()?);

        let shutdown = self.shutdown.clone();
        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                info!("HTTP API shutdown signal received");
            })
            .await?;

        info!("HTTP API stopped");
        Ok(())
    }

    pub fn stop(&self) {
        info!("Stopping HTTP API...");
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::types::{MatchReport, Player};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for oneshot

    fn test_state() -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.game.referee_seed = Some(1);
        Arc::new(AppState::new(config).unwrap())
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn token(state: &AppState) -> String {
        state.tokens().issue("user1").unwrap().token
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = test_state();
        let app = router(state.clone());

        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.start().await;
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_sign_in_sets_cookie() {
        let app = router(test_state());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/signin",
                None,
                json!({"username": "user1", "password": "password1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("Expires="));

        let body = body_json(response).await;
        assert!(cookie.contains(body["token"].as_str().unwrap()));

        // The cookie alone authorizes a write
        let session = cookie.split(';').next().unwrap().to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/players")
                    .header("content-type", "application/json")
                    .header("cookie", session)
                    .body(Body::from(json!({"names": "Ma Long"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sign_in_rejections() {
        let app = router(test_state());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/signin",
                None,
                json!({"username": "user1", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/signin")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_player_requires_token() {
        let app = router(test_state());
        let body = json!({"names": "Timo Boll", "wins": 3, "losses": 1});

        let response = app
            .clone()
            .oneshot(json_request("POST", "/players", None, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(json_request("POST", "/players", Some("garbage"), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_and_list_players() {
        let state = test_state();
        let app = router(state.clone());
        let token = token(&state);

        for names in ["Ma Long", "Xu Xin", "Jan-Ove Waldner", "Timo Boll"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/players",
                    Some(&token),
                    json!({ "names": names }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await, json!("created!"));
        }

        let response = app
            .clone()
            .oneshot(get("/players?sorted=TRUE"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let players: Vec<Player> = serde_json::from_value(body_json(response).await).unwrap();
        let names: Vec<_> = players.iter().map(|p| p.names.as_str()).collect();
        assert_eq!(names, vec!["Xu Xin", "Timo Boll", "Ma Long", "Jan-Ove Waldner"]);

        let uri = format!("/players/{}", players[0].id);
        let response = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["names"], "Xu Xin");
    }

    #[tokio::test]
    async fn test_create_invalid_player() {
        let state = test_state();
        let app = router(state.clone());

        let response = app
            .oneshot(json_request(
                "POST",
                "/players",
                Some(&token(&state)),
                json!({"names": "", "wins": -1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Player names cannot be empty\nPlayer wins cannot be less than zero"
        );
        assert_eq!(state.player_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_player_is_zero_value() {
        let app = router(test_state());

        let response = app.oneshot(get("/players/unknown")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body.get("id").is_none());
        assert_eq!(body["names"], "");
        assert_eq!(body["wins"], 0);
    }

    #[tokio::test]
    async fn test_play_match() {
        let state = test_state();
        let app = router(state.clone());
        let token = token(&state);
        let ctx = state.request_context();
        let ma_long = state.players().create(&ctx, "Ma Long", 10, 13).await.unwrap();
        let xu_xin = state.players().create(&ctx, "Xu Xin", 20, 5).await.unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/matches",
                Some(&token),
                json!({"player1ID": ma_long, "player2ID": xu_xin}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report: MatchReport = serde_json::from_value(body_json(response).await).unwrap();
        assert_ne!(report.winner.id, report.loser.id);
        assert!(report.narrative.len() >= 2);

        let response = app
            .oneshot(json_request(
                "POST",
                "/matches",
                Some(&token),
                json!({"player1ID": ma_long, "player2ID": "missing"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error = body_json(response).await["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("player 2 not found at the match"));
    }

    #[tokio::test]
    async fn test_cors_and_metrics() {
        let app = router(test_state());

        let response = app.clone().oneshot(get("/players")).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );

        let response = app.oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("paddle_room_http_requests_total{route=\"/players\",status=\"200\"} 1"));
    }

    #[tokio::test]
    async fn test_404_handling() {
        let app = router(test_state());

        let response = app.oneshot(get("/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_reports_taken_port() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = AppConfig::default();
        config.service.http_host = "127.0.0.1".to_string();
        config.service.http_port = taken.local_addr().unwrap().port();
        let server = ApiServer::new(Arc::new(AppState::new(config).unwrap()));

        let err = server.serve().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Server { .. })
        ));
    }

    #[test]
    fn test_server_address() {
        let server = ApiServer::new(test_state());
        assert_eq!(server.address().unwrap().port(), 8287);
    }
}
