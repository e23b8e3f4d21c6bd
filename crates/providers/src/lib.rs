//! External collaborator clients for Switchback strategies.
//!
//! - [`OpenAiCompatProvider`] implements `switchback_core::Provider`
//!   (text completion for the reasoning strategy).
//! - [`GithubCodeSearch`] implements `switchback_core::CodeSearch`
//!   (reference lookup for the retrieval strategy).

pub mod github;
pub mod openai_compat;

pub use github::GithubCodeSearch;
pub use openai_compat::OpenAiCompatProvider;
