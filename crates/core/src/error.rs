//! Error types for the Switchback domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Switchback operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Strategy errors ---
    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of an external collaborator (completion or code search service).
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures raised by a strategy's lifecycle hooks.
///
/// `run` never returns one of these: strategies fold their own failures into
/// a low-score `RunResult`. Only `warmup` can fail, and the control loop
/// records that as a failed step.
#[derive(Debug, Clone, Error)]
pub enum StrategyError {
    #[error("Warm-up failed for {strategy}: {reason}")]
    WarmupFailed { strategy: String, reason: String },

    #[error("Collaborator unavailable for {strategy}: {source}")]
    Collaborator {
        strategy: String,
        #[source]
        source: ProviderError,
    },
}
