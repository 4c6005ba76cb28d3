use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fixed lifetime of a champion record: 7 days.
pub const TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The persisted best-score entry.
///
/// `token` is the opaque credential issued to the submitter; matching it is
/// the only way to rename this record later. `replay` is stored and returned
/// as-is, never inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChampionRecord {
    pub score: i64,
    pub name: String,
    pub replay: String,
    pub duration_seconds: f64,
    pub recorded_at: DateTime<Utc>,
    pub expires_in_seconds: i64,
    pub token: String,
}

impl ChampionRecord {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.recorded_at + Duration::seconds(self.expires_in_seconds)
    }

    /// A record is live until the instant *after* `expires_at`.
    pub fn is_expired(&self, t: DateTime<Utc>) -> bool {
        t > self.expires_at()
    }

    /// Sentinel returned when no live champion exists: score 0, empty name
    /// and token, epoch timestamps.
    pub fn absent() -> Self {
        Self {
            score: 0,
            name: String::new(),
            replay: String::new(),
            duration_seconds: 0.0,
            recorded_at: DateTime::<Utc>::UNIX_EPOCH,
            expires_in_seconds: 0,
            token: String::new(),
        }
    }
}

/// Append-only log of champion records, newest pushed last. Expired rows are
/// never deleted at runtime; expiry is a predicate evaluated on read.
pub type ChampionLog = Arc<RwLock<Vec<ChampionRecord>>>;

/// Create a new, empty log.
pub fn new_log() -> ChampionLog {
    Arc::new(RwLock::new(Vec::new()))
}
