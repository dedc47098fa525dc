//! Cross-backend search: wire protocol, result records and the cycle driver.

pub mod orchestrator;
pub mod protocol;
pub mod record;

pub use orchestrator::{BackendResults, CyclePhase, SearchCounts, SearchOrchestrator, SearchResults};
pub use protocol::SEARCH_ROUTE;
pub use record::{Form, IgtField, Translation, TRANSLATIONS_ATTRIBUTE};
