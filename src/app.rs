use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::AppConfig;
use crate::routes::{champion_routes, system_routes};
use crate::state::champions::ChampionLog;

/// Build the complete Axum application:
/// - /champion (read / beat / rename)
/// - /system   (alive + version)
///
/// CORS is pinned to the single origin the game is served from; preflights
/// advertise GET/PUT/OPTIONS, the Authorization header and a one-day cache.
pub fn build_app(log: ChampionLog, cfg: AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cfg.allowed_origin
                .parse::<HeaderValue>()
                .expect("Invalid allowed_origin in config"),
        )
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION])
        .max_age(Duration::from_secs(86_400));

    Router::new()
        // /champion
        .merge(champion_routes::routes(log))

        // /system/*
        .nest("/system", system_routes::routes(cfg))

        .layer(cors)

        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
