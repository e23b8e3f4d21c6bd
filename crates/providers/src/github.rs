//! GitHub code search client.
//!
//! Calls `GET /search/code` and returns repository/path pairs. Only paths are
//! surfaced; file contents are never fetched.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use switchback_config::GithubConfig;
use switchback_core::error::ProviderError;
use switchback_core::search::{CodeReference, CodeSearch, SearchQuery};
use tracing::{debug, warn};

/// A code search backend over the GitHub REST API.
pub struct GithubCodeSearch {
    api_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl GithubCodeSearch {
    pub fn new(api_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("switchback/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            client,
        }
    }

    /// Build from configuration. `None` when the backend is disabled.
    pub fn from_config(config: &GithubConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Some(Self::new(
            &config.api_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    /// The `q` parameter: whitespace-collapsed terms plus a language qualifier.
    fn query_string(query: &SearchQuery) -> String {
        let terms = query.terms.split_whitespace().collect::<Vec<_>>().join(" ");
        if query.language.trim().is_empty() {
            terms
        } else {
            format!("{terms} language:{}", query.language.trim())
        }
    }
}

#[async_trait]
impl CodeSearch for GithubCodeSearch {
    fn name(&self) -> &str {
        "github"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<CodeReference>, ProviderError> {
        let url = format!("{}/search/code", self.api_url);
        let q = Self::query_string(query);
        let per_page = query.limit.clamp(1, 100).to_string();

        debug!(query = %q, per_page = %per_page, "Sending code search request");

        let mut request = self
            .client
            .get(&url)
            .query(&[("q", q.as_str()), ("per_page", per_page.as_str())])
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let rate_limited = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");

        if status == 429 || (status == 403 && rate_limited) {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 60,
            });
        }

        if status == 401 {
            return Err(ProviderError::AuthenticationFailed(
                "GitHub rejected the token".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Code search returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse search response: {e}"),
        })?;

        Ok(body.into_references(query.limit))
    }
}

// --- GitHub API types (internal) ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    path: Option<String>,
    html_url: Option<String>,
    repository: Option<SearchRepository>,
}

#[derive(Debug, Deserialize)]
struct SearchRepository {
    full_name: Option<String>,
}

impl SearchResponse {
    fn into_references(self, limit: usize) -> Vec<CodeReference> {
        self.items
            .into_iter()
            .take(limit)
            .map(|item| CodeReference {
                repository: item
                    .repository
                    .and_then(|r| r.full_name)
                    .unwrap_or_else(|| "?".into()),
                path: item.path.unwrap_or_else(|| "?".into()),
                url: item.html_url,
            })
            .collect()
    }
}
