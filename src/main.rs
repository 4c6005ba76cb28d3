/*****************************************************************************************
 *
 *  champion-server – world-best-score HTTP service
 *  ------------------------------------------------
 *
 *  Remembers the single best score for about a week. The record carries a
 *  token so its setter, and nobody else, can rename it later.
 *
 *****************************************************************************************/

mod app;
mod config;
mod errors;
mod persistence;
mod routes;
mod services;
mod state;

use std::path::PathBuf;

use axum::serve;
use tokio::net::TcpListener;
use tokio::task;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::persistence::{autosave_loop, load_snapshot, save_snapshot};
use crate::state::champions::{new_log, ChampionLog};

#[tokio::main]
async fn main() {
    //
    // ────────────────────────────────────────────────────────
    //  Locate config.json (EXE folder or project root)
    // ────────────────────────────────────────────────────────
    //
    let exe_path = std::env::current_exe().expect("Cannot get executable path");
    let exe_dir = exe_path.parent().expect("Cannot get executable directory");

    let mut config_path: PathBuf = exe_dir.join("config.json");

    if !config_path.exists() {
        let fallback = exe_dir.join("..").join("config.json");
        if fallback.exists() {
            config_path = fallback;
        } else {
            panic!(
                "config.json not found in:\n  {}\n  {}\nCopy config.json to one of these paths.",
                exe_dir.join("config.json").display(),
                fallback.display()
            );
        }
    }

    //
    // ────────────────────────────────────────────────────────
    //  Load configuration
    // ────────────────────────────────────────────────────────
    //
    let cfg = AppConfig::load_from_file(config_path.to_str().unwrap());

    //
    // ────────────────────────────────────────────────────────
    //  Configure logging
    // ────────────────────────────────────────────────────────
    //
    let level = match cfg.log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    tracing::info!("Starting champion-server…");
    tracing::info!("Loaded configuration: {:?}", cfg);

    //
    // ────────────────────────────────────────────────────────
    //  Create champion log and load snapshot
    // ────────────────────────────────────────────────────────
    //
    let log = new_log();
    load_snapshot(&cfg.snapshot_path, &log).await;

    //
    // ────────────────────────────────────────────────────────
    //  Start autosave loop
    // ────────────────────────────────────────────────────────
    //
    {
        let log_clone = log.clone();
        let path = cfg.snapshot_path.clone();
        let interval = cfg.snapshot_interval;

        task::spawn(async move {
            autosave_loop(path, log_clone, interval).await;
        });
    }

    //
    // ────────────────────────────────────────────────────────
    //  Build Axum app and start listening
    // ────────────────────────────────────────────────────────
    //
    let app = app::build_app(log.clone(), cfg.clone());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("Listening on http://{}", addr);

    serve(listener, app)
        .with_graceful_shutdown(shutdown(log.clone(), cfg.snapshot_path.clone()))
        .await
        .expect("Server error");
}

//
// ─────────────────────────────────────────────────────────────
//  Graceful shutdown handler
// ─────────────────────────────────────────────────────────────
//
async fn shutdown(log: ChampionLog, path: String) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");

    tracing::warn!("CTRL+C received — saving snapshot…");
    save_snapshot(&path, &log).await;
    tracing::info!("Snapshot saved. Goodbye.");
}
