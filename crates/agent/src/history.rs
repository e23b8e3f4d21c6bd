//! Append-only record of every step's outcome.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use switchback_core::RunResult;
use switchback_core::run::clamp_latency;

/// Hex characters kept from the SHA-256 of a step's output.
pub const DIGEST_LEN: usize = 16;

/// One step, as remembered for windowed evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub strategy_name: String,
    pub success_score: f64,
    pub latency_s: f64,
    /// Leading hex chars of the output's SHA-256.
    pub digest: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_result(result: &RunResult) -> Self {
        Self {
            strategy_name: result.strategy_name.clone(),
            success_score: result.success_score,
            latency_s: clamp_latency(result.latency_s),
            digest: output_digest(&result.output),
            recorded_at: Utc::now(),
        }
    }
}

/// First [`DIGEST_LEN`] hex characters of `SHA-256(output)`.
pub fn output_digest(output: &str) -> String {
    let mut hex = hex::encode(Sha256::digest(output.as_bytes()));
    hex.truncate(DIGEST_LEN);
    hex
}

/// Means over a trailing window of history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub count: usize,
    pub mean_success: f64,
    pub mean_latency_s: f64,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: &RunResult) -> &HistoryEntry {
        self.entries.push(HistoryEntry::from_result(result));
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The last `n` entries, or all of them if there are fewer.
    pub fn trailing(&self, n: usize) -> &[HistoryEntry] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }

    /// Mean success and latency over the last `n` entries. `None` when empty.
    pub fn window_stats(&self, n: usize) -> Option<WindowStats> {
        let window = self.trailing(n);
        if window.is_empty() {
            return None;
        }
        let count = window.len();
        let (success, latency) = window
            .iter()
            .fold((0.0, 0.0), |(s, l), e| (s + e.success_score, l + e.latency_s));
        Some(WindowStats {
            count,
            mean_success: success / count as f64,
            mean_latency_s: latency / count as f64,
        })
    }
}
