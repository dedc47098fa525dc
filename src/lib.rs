//! # crossold - Cross-OLD search
//!
//! Searches several Online Linguistic Database (OLD) instances with one query and
//! merges the results into a single aligned, highlighted report.
//!
//! ## Features
//!
//! - **Shared login**: one credential pair authenticates a cookie session per OLD
//! - **Two-phase search**: a cheap count request everywhere, then full fetches
//!   only from OLDs that reported matches
//! - **Match highlighting**: regex leaves of the query highlight the fields they
//!   searched
//! - **Interlinear alignment**: morphemes and glosses line up word by word
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`config`] - TOML configuration and the default OLD list
//! - [`registry`] - The fixed set of backends for a run
//! - [`session`] - Authenticated transports, one per backend
//! - [`query`] - Query expressions, literal parsing and highlight rules
//! - [`search`] - The count, prune and fetch search cycle
//! - [`render`] - Report layout and theming
//! - [`input`] - Query submissions and the password prompt
//! - [`app`] - The interactive loop tying it together

// Core modules
pub mod config;
pub mod error;
pub mod text;

// Remote side
pub mod registry;
pub mod search;
pub mod session;

// Query handling and output
pub mod query;
pub mod render;

// Terminal front end
pub mod app;
pub mod input;

// Re-export commonly used types for convenience
pub use error::{CrossOldError, Result};

// Public API surface for external usage
pub use app::Application;
pub use query::{HighlightRules, QueryExpression};
pub use registry::{Backend, BackendRegistry};
pub use render::{ReportRenderer, ReportTheme};
pub use search::{SearchOrchestrator, SearchResults};
pub use session::{BackendTransport, Connector, Credentials, SessionManager};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
