use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

pub const MAX_ENTRIES: usize = 10;

/// One leaderboard row, persisted exactly as submitted. The client is
/// trusted on types: `name` and `score` may be any JSON value.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScoreEntry {
    pub name: Value,
    pub score: Value,
    #[serde(default = "empty_date")]
    pub date: Value,
}

fn empty_date() -> Value {
    Value::String(String::new())
}

/// File-backed leaderboard storage. The backing file is the sole source
/// of truth; every operation re-reads it.
pub struct Store {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Store {
    pub async fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if tokio::fs::metadata(&path).await.is_err() {
            log::info!("Creating empty high score file at {}", path.display());
            if let Err(error) = tokio::fs::write(&path, "[]").await {
                log::error!("Could not create {}: {error}", path.display());
            }
        }

        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Reads the stored leaderboard. A missing, unreadable or corrupt
    /// file is logged and treated as an empty board.
    pub async fn load(&self) -> Vec<ScoreEntry> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) => {
                log::warn!("Could not read {}: {error}", self.path.display());
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(scores) => scores,
            Err(error) => {
                log::warn!(
                    "Invalid high score data in {}: {error}",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    /// Writes the leaderboard to a temporary file and renames it into
    /// place, so a failed write never leaves a torn store behind.
    pub async fn save(&self, scores: &[ScoreEntry]) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(scores)?;
        let tmp = PathBuf::from(format!("{}.tmp", self.path.display()));

        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;

        Ok(())
    }

    /// Appends one entry and persists the sorted top ten. Submissions
    /// are serialized through the write lock so concurrent requests
    /// cannot lose updates.
    pub async fn record(&self, entry: ScoreEntry) -> anyhow::Result<Vec<ScoreEntry>> {
        let _guard = self.write_lock.lock().await;

        let mut scores = self.load().await;
        scores.push(entry);
        scores.sort_by(|a, b| rank(&b.score).total_cmp(&rank(&a.score)));
        scores.truncate(MAX_ENTRIES);

        self.save(&scores).await?;
        Ok(scores)
    }
}

// Numeric scores rank by magnitude; anything else sorts below every
// number. The sort is stable, so equal scores keep submission order.
fn rank(score: &Value) -> f64 {
    score.as_f64().unwrap_or(f64::NEG_INFINITY)
}
