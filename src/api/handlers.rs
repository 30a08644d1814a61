//! HTTP handlers
//!
//! Every handler that touches storage builds a fresh [`RequestContext`] bounded
//! by the configured operation timeout.

use crate::api::response::{ApiError, ApiResult};
use crate::auth::{Claims, IssuedToken};
use crate::service::{AppState, HealthCheck, HealthStatus};
use crate::types::{MatchReport, Player};
use crate::utils::cookie_expiry;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the session cookie
pub const TOKEN_COOKIE: &str = "token";

const INVALID_PAYLOAD: &str = "Invalid request payload";

#[derive(Debug, Default, Deserialize)]
pub struct ListPlayersQuery {
    pub sorted: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlayerRequest {
    pub names: String,
    #[serde(default)]
    pub wins: i64,
    #[serde(default)]
    pub losses: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayMatchRequest {
    #[serde(rename = "player1ID")]
    pub player1_id: String,
    #[serde(rename = "player2ID")]
    pub player2_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Token carried by the cookie first, then by a bearer header
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == TOKEN_COOKIE).then(|| value.to_string())
        });

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
    })
}

/// Claims of a valid session token
fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<Claims> {
    let token =
        session_token(headers).ok_or_else(|| ApiError::unauthorized("missing session token"))?;
    let claims = state.tokens().validate(&token)?;
    debug!(username = %claims.username, "Request authorized");
    Ok(claims)
}

pub async fn list_players(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPlayersQuery>,
) -> ApiResult<Json<Vec<Player>>> {
    let sorted = query
        .sorted
        .as_deref()
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    let ctx = state.request_context();
    let players = state.players().find_all(&ctx, sorted).await?;
    Ok(Json(players))
}

pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> ApiResult<Json<Player>> {
    let ctx = state.request_context();
    let player = state.players().find_by_id(&ctx, &player_id).await?;
    Ok(Json(player))
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CreatePlayerRequest>, JsonRejection>,
) -> ApiResult<Json<&'static str>> {
    let claims = authorize(&state, &headers)?;
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected player payload: {}", e);
        ApiError::bad_request(INVALID_PAYLOAD)
    })?;

    let ctx = state.request_context();
    let id = state
        .players()
        .create(&ctx, &request.names, request.wins, request.losses)
        .await?;

    info!(player_id = %id, username = %claims.username, "Player created over HTTP");
    Ok(Json("created!"))
}

pub async fn play_match(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<PlayMatchRequest>, JsonRejection>,
) -> ApiResult<Json<MatchReport>> {
    authorize(&state, &headers)?;
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected match payload: {}", e);
        ApiError::bad_request(INVALID_PAYLOAD)
    })?;

    let ctx = state.request_context();
    let report = state
        .matches()
        .play(&ctx, &request.player1_id, &request.player2_id)
        .await?;
    Ok(Json(report))
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(credentials) = payload.map_err(|_| ApiError::bad_request(INVALID_PAYLOAD))?;

    let authenticated = state
        .authenticator()
        .authenticate(&credentials.username, &credentials.password)
        .await?;
    if !authenticated {
        return Err(ApiError::unauthorized("invalid username or password"));
    }

    let IssuedToken { token, expires } = state.tokens().issue(&credentials.username)?;
    let cookie = format!(
        "{}={}; Expires={}; Path=/",
        TOKEN_COOKIE,
        token,
        cookie_expiry(expires)
    );

    info!(username = %credentials.username, "User signed in");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(IssuedToken { token, expires }),
    ))
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = HealthCheck::check(&state).await;
    let status = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(health))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let body = state.metrics().encode_text()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
