//! # Switchback Core
//!
//! Domain types, traits, and error definitions for the Switchback adaptive
//! strategy loop. This crate has **no framework dependencies** beyond serde
//! and the async-trait plumbing: it defines the domain model that all other
//! crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam is a trait defined here:
//! - [`Strategy`]: one way of attempting a task
//! - [`Provider`]: a text-completion collaborator
//! - [`CodeSearch`]: a code-retrieval collaborator
//!
//! Implementations live in their respective crates, so the control loop can
//! be exercised end-to-end with scripted stand-ins.

pub mod agent;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod run;
pub mod search;
pub mod strategy;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentConfig, PolicyConfig, PolicyMode, Thresholds};
pub use error::{Error, ProviderError, Result, StrategyError};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use run::{RunResult, Task};
pub use search::{CodeReference, CodeSearch, SearchQuery};
pub use strategy::{HandoffState, StateValue, Strategy, StrategyKind};
