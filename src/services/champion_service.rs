use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::ChampionError;
use crate::services::champion_store::{self, Replace};
use crate::state::champions::{ChampionLog, ChampionRecord, TTL_SECONDS};

lazy_static! {
    // Per-process salt folded into every issued token. Tokens stay
    // deterministic for a given instant but cannot be derived outside
    // this process.
    static ref TOKEN_SEED: [u8; 16] = rand::thread_rng().gen();
}

/// What everyone may see: the current champion plus whether the caller's
/// credential matches its token.
#[derive(Debug, Serialize, PartialEq)]
pub struct PublicView {
    pub score: i64,
    pub name: String,
    pub replay: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
    pub authorized: bool,
}

/// What the record's setter sees: includes the rename token.
#[derive(Debug, Serialize)]
pub struct AuthorizedView {
    pub score: i64,
    pub name: String,
    pub replay: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
    pub token: String,
}

fn authorized_view(record: &ChampionRecord) -> AuthorizedView {
    AuthorizedView {
        score: record.score,
        name: record.name.clone(),
        replay: record.replay.clone(),
        expires_at: record.expires_at(),
        token: record.token.clone(),
    }
}

/// Uppercase, keep letters only, cut to three characters.
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .take(3)
        .collect()
}

/// Placeholder shown when normalization leaves nothing: one random letter
/// repeated three times, e.g. "QQQ".
pub fn suggest_name() -> String {
    let letter = rand::thread_rng().gen_range(b'A'..=b'Z') as char;
    std::iter::repeat(letter).take(3).collect()
}

fn display_name(raw: &str) -> String {
    let name = normalize_name(raw);
    if name.is_empty() {
        suggest_name()
    } else {
        name
    }
}

/// Derive the rename credential for a record created at `recorded_at`:
/// SHA-256 over the process seed and the instant, hex-encoded. The same
/// instant always yields the same token within a process; distinct
/// champions get distinct tokens.
pub fn issue_token(recorded_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(*TOKEN_SEED);
    hasher.update(recorded_at.timestamp_micros().to_le_bytes());
    hex::encode(&hasher.finalize()[..16])
}

/// Read the current champion. Never mutates; an expired record reads as the
/// absent sentinel.
pub fn get_current(
    log: &ChampionLog,
    now: DateTime<Utc>,
    caller_token: &str,
) -> Result<PublicView, ChampionError> {
    let record = champion_store::resolve_live(log, now)?
        .map(|(_, record)| record)
        .unwrap_or_else(ChampionRecord::absent);

    Ok(PublicView {
        score: record.score,
        name: record.name.clone(),
        replay: record.replay.clone(),
        expires_at: record.expires_at(),
        authorized: !caller_token.is_empty() && caller_token == record.token,
    })
}

/// Submit a new best score. Commits only if `score` strictly beats the live
/// champion's (0 when none is live); the returned view carries the token the
/// submitter needs for a later rename.
pub fn beat(
    log: &ChampionLog,
    now: DateTime<Utc>,
    score: i64,
    raw_name: &str,
    duration_seconds: f64,
    replay: String,
) -> Result<AuthorizedView, ChampionError> {
    let name = display_name(raw_name);
    tracing::info!(
        "Trying to beat champion: {} by '{}' in {:.3} sec",
        score,
        name,
        duration_seconds
    );

    let candidate = ChampionRecord {
        score,
        name,
        replay,
        duration_seconds,
        recorded_at: now,
        expires_in_seconds: TTL_SECONDS,
        token: issue_token(now),
    };

    let committed = champion_store::replace(log, now, Replace::Beat(candidate))?;
    tracing::info!(
        "Champion has been beaten: {} by '{}' -> {} by '{}' in {:.3} sec",
        committed.prev.score,
        committed.prev.name,
        committed.record.score,
        committed.record.name,
        duration_seconds
    );
    Ok(authorized_view(&committed.record))
}

/// Change the live champion's display name. Only the token issued when the
/// record was set may do this; score, replay and token are untouched.
pub fn rename(
    log: &ChampionLog,
    now: DateTime<Utc>,
    raw_name: &str,
    caller_token: &str,
) -> Result<AuthorizedView, ChampionError> {
    let name = display_name(raw_name);
    tracing::info!("Trying to rename champion: '{}'", name);

    let committed = champion_store::replace(
        log,
        now,
        Replace::Rename {
            name,
            token: caller_token.to_string(),
        },
    )?;
    tracing::info!(
        "Champion has been renamed: '{}' -> '{}'",
        committed.prev.name,
        committed.record.name
    );
    Ok(authorized_view(&committed.record))
}
