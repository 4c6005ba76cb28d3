use chrono::{DateTime, Utc};

use crate::errors::ChampionError;
use crate::state::champions::{ChampionLog, ChampionRecord};

/// How many recent records a lookup may scan. Once the TTL has elapsed,
/// anything older than the newest few rows is guaranteed expired, so the
/// scan never needs the full history.
const SCAN_WINDOW: usize = 10;

/// The committed outcome of a [`replace`] call. `prev` is the live champion
/// the check ran against (the absent sentinel when the slot was empty).
#[derive(Debug)]
pub struct Committed {
    pub prev: ChampionRecord,
    pub record: ChampionRecord,
}

/// The two mutations the log supports.
pub enum Replace {
    /// Append a new record if its score beats the live champion's.
    Beat(ChampionRecord),
    /// Change the live champion's name in place, gated by token equality.
    Rename { name: String, token: String },
}

fn resolve_in(records: &[ChampionRecord], now: DateTime<Utc>) -> Option<(usize, ChampionRecord)> {
    records
        .iter()
        .enumerate()
        .rev()
        .take(SCAN_WINDOW)
        .find(|(_, record)| !record.is_expired(now))
        .map(|(index, record)| (index, record.clone()))
}

/// Newest-first lookup of the current live champion. Returns the record and
/// its position in the log so a later rename can reach it. Read-only.
pub fn resolve_live(
    log: &ChampionLog,
    now: DateTime<Utc>,
) -> Result<Option<(usize, ChampionRecord)>, ChampionError> {
    let records = log
        .read()
        .map_err(|e| ChampionError::Storage(e.to_string()))?;
    Ok(resolve_in(&records, now))
}

/// The single transactional primitive: holds the write lock across
/// re-resolve, check, and write, so concurrent calls serialize on the same
/// live-champion snapshot and at most one record is written per call.
pub fn replace(
    log: &ChampionLog,
    now: DateTime<Utc>,
    op: Replace,
) -> Result<Committed, ChampionError> {
    let mut records = log
        .write()
        .map_err(|e| ChampionError::Storage(e.to_string()))?;
    let live = resolve_in(&records, now);

    match op {
        Replace::Beat(candidate) => {
            let prev = live
                .map(|(_, record)| record)
                .unwrap_or_else(ChampionRecord::absent);
            if candidate.score <= prev.score {
                return Err(ChampionError::NotHigherScore {
                    score: candidate.score,
                    prev_score: prev.score,
                });
            }
            records.push(candidate.clone());
            Ok(Committed {
                prev,
                record: candidate,
            })
        }
        Replace::Rename { name, token } => {
            // No live record means nothing to rename and no token can match.
            let Some((index, prev)) = live else {
                return Err(ChampionError::NotAuthorized);
            };
            if prev.token != token {
                return Err(ChampionError::NotAuthorized);
            }
            records[index].name = name;
            Ok(Committed {
                prev,
                record: records[index].clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::champions::{new_log, TTL_SECONDS};
    use chrono::Duration;

    fn record(score: i64, token: &str, recorded_at: DateTime<Utc>) -> ChampionRecord {
        ChampionRecord {
            score,
            name: "AAA".into(),
            replay: String::new(),
            duration_seconds: 1.0,
            recorded_at,
            expires_in_seconds: TTL_SECONDS,
            token: token.into(),
        }
    }

    #[test]
    fn empty_log_resolves_to_none() {
        let log = new_log();
        assert!(resolve_live(&log, Utc::now()).unwrap().is_none());
    }

    #[test]
    fn beat_on_empty_log_requires_positive_score() {
        let log = new_log();
        let now = Utc::now();
        let err = replace(&log, now, Replace::Beat(record(0, "t", now))).unwrap_err();
        assert!(matches!(
            err,
            ChampionError::NotHigherScore { score: 0, prev_score: 0 }
        ));

        let committed = replace(&log, now, Replace::Beat(record(1, "t", now))).unwrap();
        assert_eq!(committed.prev.score, 0);
        assert_eq!(committed.record.score, 1);
    }

    #[test]
    fn lower_score_is_rejected_with_both_scores() {
        let log = new_log();
        let now = Utc::now();
        replace(&log, now, Replace::Beat(record(100, "t", now))).unwrap();

        let err = replace(&log, now, Replace::Beat(record(50, "u", now))).unwrap_err();
        match err {
            ChampionError::NotHigherScore { score, prev_score } => {
                assert_eq!(score, 50);
                assert_eq!(prev_score, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(resolve_live(&log, now).unwrap().unwrap().1.score, 100);
    }

    #[test]
    fn expired_record_is_invisible_and_beatable() {
        let log = new_log();
        let t0 = Utc::now();
        replace(&log, t0, Replace::Beat(record(100, "t", t0))).unwrap();

        let just_before = t0 + Duration::seconds(TTL_SECONDS) - Duration::minutes(1);
        assert_eq!(resolve_live(&log, just_before).unwrap().unwrap().1.score, 100);

        let just_after = t0 + Duration::seconds(TTL_SECONDS) + Duration::seconds(1);
        assert!(resolve_live(&log, just_after).unwrap().is_none());

        // A score of 1 beats the expired 100: the baseline is back to 0.
        let committed =
            replace(&log, just_after, Replace::Beat(record(1, "u", just_after))).unwrap();
        assert_eq!(committed.prev.score, 0);
        assert_eq!(
            resolve_live(&log, just_after).unwrap().unwrap().1.score,
            1
        );
    }

    #[test]
    fn rename_requires_matching_token() {
        let log = new_log();
        let now = Utc::now();
        replace(&log, now, Replace::Beat(record(10, "secret", now))).unwrap();

        let err = replace(
            &log,
            now,
            Replace::Rename {
                name: "BBB".into(),
                token: "wrong".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ChampionError::NotAuthorized));

        let committed = replace(
            &log,
            now,
            Replace::Rename {
                name: "BBB".into(),
                token: "secret".into(),
            },
        )
        .unwrap();
        assert_eq!(committed.prev.name, "AAA");
        assert_eq!(committed.record.name, "BBB");
        assert_eq!(committed.record.score, 10);
        assert_eq!(committed.record.token, "secret");
    }

    #[test]
    fn rename_on_empty_log_is_not_authorized() {
        let log = new_log();
        let err = replace(
            &log,
            Utc::now(),
            Replace::Rename {
                name: "BBB".into(),
                token: "any".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ChampionError::NotAuthorized));
    }

    #[test]
    fn concurrent_beats_settle_on_the_higher_score() {
        let log = new_log();
        let now = Utc::now();

        let mut handles = Vec::new();
        for score in [50i64, 60] {
            let log = log.clone();
            handles.push(std::thread::spawn(move || {
                replace(&log, now, Replace::Beat(record(score, "t", now)))
            }));
        }
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Either 50 landed first and 60 superseded it, or 60 landed first
        // and 50 was rejected citing 60. Never both commit out of order.
        assert_eq!(resolve_live(&log, now).unwrap().unwrap().1.score, 60);
        for result in results {
            if let Err(err) = result {
                match err {
                    ChampionError::NotHigherScore { score, prev_score } => {
                        assert_eq!(score, 50);
                        assert_eq!(prev_score, 60);
                    }
                    other => panic!("unexpected error: {other}"),
                }
            }
        }
    }

    #[test]
    fn scan_window_skips_stale_history() {
        let log = new_log();
        let t0 = Utc::now();
        // A pile of long-expired rows, then one live record.
        {
            let mut records = log.write().unwrap();
            for i in 0..20i64 {
                let old = t0 - Duration::days(30) + Duration::seconds(i);
                records.push(record(1000 + i, "old", old));
            }
        }
        replace(&log, t0, Replace::Beat(record(5000, "new", t0))).unwrap();

        let (_, live) = resolve_live(&log, t0).unwrap().unwrap();
        assert_eq!(live.score, 5000);
        assert_eq!(live.token, "new");
    }
}
