use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;

use crate::errors::ChampionError;
use crate::services::champion_service;
use crate::state::champions::ChampionLog;

/// Build the `/champion` route. GET reads, PUT beats or renames depending on
/// whether a `score` field is present; anything else is 405.
pub fn routes(log: ChampionLog) -> Router {
    Router::new()
        .route("/champion", get(get_champion).put(put_champion))
        .with_state(log)
}

/// Form fields accepted by PUT. Everything is optional at the wire level;
/// the handler decides what is required for which operation.
#[derive(Debug, Deserialize)]
struct ChampionForm {
    score: Option<String>,
    duration: Option<String>,
    name: Option<String>,
    replay: Option<String>,
}

//
// ─────────────────────────────────────────────────────────────
// GET /champion
// Current champion plus whether the caller holds its token
// ─────────────────────────────────────────────────────────────
//
async fn get_champion(
    State(log): State<ChampionLog>,
    headers: HeaderMap,
) -> Result<Json<champion_service::PublicView>, ChampionError> {
    let token = basic_auth_token(&headers).unwrap_or_default();
    let view = champion_service::get_current(&log, Utc::now(), &token)?;
    Ok(Json(view))
}

//
// ─────────────────────────────────────────────────────────────
// PUT /champion
// With a score field: beat. Without: rename (token required).
// ─────────────────────────────────────────────────────────────
//
async fn put_champion(
    State(log): State<ChampionLog>,
    headers: HeaderMap,
    Form(form): Form<ChampionForm>,
) -> Response {
    let now = Utc::now();

    if form.score.as_deref().is_some_and(|s| !s.is_empty()) {
        let score = match form.score.as_deref().unwrap_or("").parse::<i64>() {
            Ok(score) => score,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };
        let duration = match form.duration.as_deref().unwrap_or("").parse::<f64>() {
            Ok(duration) => duration,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };

        match champion_service::beat(
            &log,
            now,
            score,
            form.name.as_deref().unwrap_or(""),
            duration,
            form.replay.unwrap_or_default(),
        ) {
            Ok(view) => Json(view).into_response(),
            Err(err) => err.into_response(),
        }
    } else {
        let token = basic_auth_token(&headers).unwrap_or_default();
        match champion_service::rename(&log, now, form.name.as_deref().unwrap_or(""), &token) {
            Ok(view) => Json(view).into_response(),
            Err(err) => err.into_response(),
        }
    }
}

/// The client carries its champion token in the basic-auth password slot;
/// the user part is ignored. This is an opaque token carrier, not real
/// user/password authentication.
fn basic_auth_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (_user, token) = decoded.split_once(':')?;
    Some(token.to_string())
}
