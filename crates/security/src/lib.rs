//! Security module for Switchback.
//!
//! Provides:
//! - **Deny-list gate**: rejects task descriptions that mention disallowed
//!   subject matter before any strategy runs

pub mod deny_list;

pub use deny_list::{DEFAULT_BLOCKED_TERMS, SafetyFilter, SafetyVerdict};
