//! Deny-list safety gate.
//!
//! A task is rejected when its description contains any blocked term as a
//! case-insensitive substring, so "harmless" matches "harm" and is blocked.

use serde::Serialize;
use switchback_config::SafetyConfig;
use tracing::warn;

/// Terms that are always blocked.
pub const DEFAULT_BLOCKED_TERMS: &[&str] = &[
    "malware",
    "ransomware",
    "dropper",
    "keylogger",
    "botnet",
    "exploit",
    "payload",
    "shellcode",
    "backdoor",
    "evasion",
    "harm",
    "kill",
    "weapon",
];

/// Result of checking a task description against the deny-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SafetyVerdict {
    Allowed,
    Blocked { term: String },
}

impl SafetyVerdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Case-insensitive substring deny-list.
#[derive(Debug, Clone)]
pub struct SafetyFilter {
    /// Lowercased, deduplicated, non-empty.
    terms: Vec<String>,
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyFilter {
    /// Filter with only the built-in terms.
    pub fn new() -> Self {
        Self {
            terms: DEFAULT_BLOCKED_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Add operator-supplied terms on top of the built-in list.
    pub fn with_extra_terms<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in extra {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !self.terms.contains(&term) {
                self.terms.push(term);
            }
        }
        self
    }

    pub fn from_config(config: &SafetyConfig) -> Self {
        Self::new().with_extra_terms(&config.extra_blocked_terms)
    }

    /// Check a task description. The first matching term, in list order, is reported.
    pub fn check(&self, text: &str) -> SafetyVerdict {
        let lower = text.to_lowercase();
        match self.terms.iter().find(|t| lower.contains(t.as_str())) {
            Some(term) => {
                warn!(term = %term, "Task rejected by deny-list");
                SafetyVerdict::Blocked { term: term.clone() }
            }
            None => SafetyVerdict::Allowed,
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}
