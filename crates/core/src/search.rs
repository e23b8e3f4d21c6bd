//! CodeSearch trait: the abstraction over code-retrieval backends.
//!
//! The retrieval strategy asks a search backend for a handful of reference
//! locations related to the task and embeds them verbatim in its output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;

/// A code search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query terms.
    pub terms: String,

    /// Language qualifier (e.g. "python", "rust").
    pub language: String,

    /// Maximum number of references to return.
    pub limit: usize,
}

/// A single search hit: where an example lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeReference {
    /// Owning repository, e.g. "rust-lang/rust".
    pub repository: String,

    /// File path inside the repository.
    pub path: String,

    /// Browsable URL, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl std::fmt::Display for CodeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.repository, self.path)
    }
}

/// The core CodeSearch trait.
#[async_trait]
pub trait CodeSearch: Send + Sync {
    /// A human-readable name for this backend (e.g., "github").
    fn name(&self) -> &str;

    /// Run a search and return a small ranked list of references.
    async fn search(
        &self,
        query: &SearchQuery,
    ) -> std::result::Result<Vec<CodeReference>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_display_joins_repo_and_path() {
        let r = CodeReference {
            repository: "tokio-rs/tokio".into(),
            path: "tokio/src/lib.rs".into(),
            url: None,
        };
        assert_eq!(r.to_string(), "tokio-rs/tokio/tokio/src/lib.rs");
    }
}
