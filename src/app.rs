//! Application layer: authenticated sessions plus the read-search-print loop.
//!
//! The `Application` owns the sessions for the whole run. Each submitted query
//! runs one search cycle and prints one report; cycle failures are reported and
//! the loop asks for the next query.

use crate::error::{CrossOldError, Result};
use crate::input::{read_submission, Submission};
use crate::query::{HighlightRules, QueryExpression};
use crate::registry::BackendRegistry;
use crate::render::{ReportRenderer, ReportTheme};
use crate::search::SearchOrchestrator;
use crate::session::{Connector, Credentials, SessionManager};
use std::io::{BufRead, Write};

pub const PROMPT: &str = "Enter an OLD search expression (or Enter to exit): ";
pub const INVALID_QUERY_MESSAGE: &str = "Sorry, that's not a valid search expression.";
pub const FAREWELL: &str = "Goodbye.";

/// Coordinates sessions, search cycles and rendering.
#[derive(Debug)]
pub struct Application {
    sessions: SessionManager,
    renderer: ReportRenderer,
}

impl Application {
    pub fn new(sessions: SessionManager, renderer: ReportRenderer) -> Self {
        Self { sessions, renderer }
    }

    /// Authenticate against every backend in `registry`.
    pub async fn connect(
        registry: &BackendRegistry,
        credentials: &Credentials,
        connector: &dyn Connector,
        theme: ReportTheme,
    ) -> Result<Self> {
        let sessions = SessionManager::authenticate_all(registry, credentials, connector).await?;
        Ok(Self::new(sessions, ReportRenderer::new(theme)))
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Run one search cycle and render its report.
    pub async fn search(&self, query: &QueryExpression) -> Result<String> {
        let rules = HighlightRules::build(query, &self.renderer.theme().highlight_marker());
        let mut orchestrator = SearchOrchestrator::new(&self.sessions);
        let results = orchestrator.run(query).await?;
        log::info!("search returned {} forms", results.total_forms());
        Ok(self.renderer.render(query, &results, &rules))
    }

    /// Prompt, read a query, search, print; until an empty submission.
    pub async fn run_interactive<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<()> {
        loop {
            writeln!(output, "{PROMPT}")?;
            output.flush()?;

            match read_submission(input)? {
                Submission::Finished => {
                    writeln!(output, "{FAREWELL}")?;
                    return Ok(());
                }
                Submission::Invalid(message) => {
                    log::debug!("{message}");
                    writeln!(output, "{INVALID_QUERY_MESSAGE}")?;
                }
                Submission::Query(query) => match self.search(&query).await {
                    Ok(report) => write!(output, "{report}")?,
                    Err(CrossOldError::InvalidQuery { backend }) => {
                        log::debug!("{backend} rejected the query");
                        writeln!(output, "{INVALID_QUERY_MESSAGE}")?;
                    }
                    Err(e) if e.is_cycle_error() => {
                        log::warn!("search cycle aborted: {e}");
                        writeln!(output, "Failed: {e}")?;
                    }
                    Err(e) => return Err(e),
                },
            }
            output.flush()?;
        }
    }
}
