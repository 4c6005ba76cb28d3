use std::{fs, io::Write};

use chrono::Utc;

use crate::state::champions::{ChampionLog, ChampionRecord};

/// Load the champion log snapshot from disk.
///
/// Records already past their expiry are dropped on the way in; this is the
/// only place expired rows are ever discarded. Runtime reads treat expiry as
/// a predicate and leave the log untouched.
pub async fn load_snapshot(path: &str, log: &ChampionLog) {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(_) => {
            tracing::info!("No snapshot found at startup (path = {})", path);
            return;
        }
    };

    let records: Vec<ChampionRecord> = match serde_json::from_str(&data) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Failed to parse snapshot JSON: {e}");
            return;
        }
    };

    let now = Utc::now();
    let total = records.len();

    let mut live = log.write().unwrap();
    live.clear();
    live.extend(records.into_iter().filter(|r| !r.is_expired(now)));

    tracing::info!(
        "Loaded snapshot: {} records ({} expired, dropped)",
        live.len(),
        total - live.len()
    );
}

/// Save the current champion log to `path`.
pub async fn save_snapshot(path: &str, log: &ChampionLog) {
    let records = log.read().unwrap().clone();

    let json = match serde_json::to_string_pretty(&records) {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!("Failed to serialize snapshot JSON: {e}");
            return;
        }
    };

    match fs::File::create(path) {
        Ok(mut file) => {
            if let Err(e) = file.write_all(json.as_bytes()) {
                tracing::warn!("Failed to write snapshot file: {e}");
            } else {
                tracing::info!("Snapshot saved ({} records)", records.len());
            }
        }
        Err(e) => tracing::warn!("Failed to create snapshot file: {e}"),
    }
}

/// Background task that periodically saves the snapshot.
pub async fn autosave_loop(path: String, log: ChampionLog, every_sec: u64) {
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(every_sec)).await;
        save_snapshot(&path, &log).await;
    }
}
