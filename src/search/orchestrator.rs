//! Two-phase search across every backend session.
//!
//! A cycle first asks each backend for its match count (one item per page),
//! drops backends reporting zero, then fetches the full result list from the
//! rest. Each phase fans out to all backends at once and waits for every reply
//! before moving on; the first failure aborts the cycle and discards whatever
//! was collected.

use super::protocol::{count_payload, fetch_payload, parse_count, parse_forms, SEARCH_ROUTE};
use super::record::Form;
use crate::error::{CrossOldError, Result};
use crate::query::QueryExpression;
use crate::registry::BackendId;
use crate::session::{Session, SessionManager};
use futures::future::try_join_all;
use std::collections::BTreeMap;

/// Where a search cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Counting,
    Fetching,
    Done,
    Aborted,
}

impl CyclePhase {
    pub fn can_transition_to(self, next: CyclePhase) -> bool {
        use CyclePhase::*;
        matches!(
            (self, next),
            (Idle | Done | Aborted, Counting)
                | (Counting, Fetching)
                | (Counting, Aborted)
                | (Fetching, Done)
                | (Fetching, Aborted)
        )
    }
}

/// Phase-one match counts per backend, zero counts included.
pub type SearchCounts = BTreeMap<BackendId, u64>;

/// Forms returned by one backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResults {
    pub backend_id: BackendId,
    pub label: String,
    pub forms: Vec<Form>,
}

/// Outcome of a completed cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    counts: SearchCounts,
    backends: Vec<BackendResults>,
}

impl SearchResults {
    pub fn new(counts: SearchCounts, backends: Vec<BackendResults>) -> Self {
        Self { counts, backends }
    }

    pub fn counts(&self) -> &SearchCounts {
        &self.counts
    }

    /// Backends that were fetched, in registry order.
    pub fn backends(&self) -> &[BackendResults] {
        &self.backends
    }

    pub fn get(&self, backend_id: &str) -> Option<&BackendResults> {
        self.backends
            .iter()
            .find(|results| results.backend_id == backend_id)
    }

    /// Backends with at least one form.
    pub fn non_empty(&self) -> impl Iterator<Item = &BackendResults> {
        self.backends
            .iter()
            .filter(|results| !results.forms.is_empty())
    }

    pub fn total_forms(&self) -> usize {
        self.backends.iter().map(|results| results.forms.len()).sum()
    }
}

/// Drives search cycles over an authenticated set of sessions.
#[derive(Debug)]
pub struct SearchOrchestrator<'a> {
    sessions: &'a SessionManager,
    phase: CyclePhase,
}

impl<'a> SearchOrchestrator<'a> {
    pub fn new(sessions: &'a SessionManager) -> Self {
        Self {
            sessions,
            phase: CyclePhase::Idle,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Run one complete count, prune and fetch cycle for `query`.
    pub async fn run(&mut self, query: &QueryExpression) -> Result<SearchResults> {
        self.transition(CyclePhase::Counting);
        let counts = match self.count_all(query).await {
            Ok(counts) => counts,
            Err(err) => {
                self.transition(CyclePhase::Aborted);
                return Err(err);
            }
        };

        let survivors = self.prune(&counts);
        log::info!(
            "{} of {} backends have matches",
            survivors.len(),
            self.sessions.len()
        );

        self.transition(CyclePhase::Fetching);
        match Self::fetch_all(&survivors, query).await {
            Ok(backends) => {
                self.transition(CyclePhase::Done);
                Ok(SearchResults::new(counts, backends))
            }
            Err(err) => {
                self.transition(CyclePhase::Aborted);
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: CyclePhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid cycle transition {:?} -> {:?}",
            self.phase,
            next
        );
        log::debug!("search cycle: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    async fn count_all(&self, query: &QueryExpression) -> Result<SearchCounts> {
        let payload = count_payload(query);
        let counts = try_join_all(self.sessions.sessions().iter().map(|session| {
            let payload = &payload;
            async move {
                let id = session.backend().id();
                let reply = session.post(SEARCH_ROUTE, payload).await?;
                let count = parse_count(id, &reply)?;
                log::debug!("{id}: {count} matches");
                Ok::<_, CrossOldError>((id.to_string(), count))
            }
        }))
        .await?;
        Ok(counts.into_iter().collect())
    }

    /// Sessions worth fetching from: those whose count is not zero.
    fn prune(&self, counts: &SearchCounts) -> Vec<&'a Session> {
        self.sessions
            .sessions()
            .iter()
            .filter(|session| counts.get(session.backend().id()).copied().unwrap_or(0) > 0)
            .collect()
    }

    async fn fetch_all(
        survivors: &[&'a Session],
        query: &QueryExpression,
    ) -> Result<Vec<BackendResults>> {
        let payload = fetch_payload(query);
        try_join_all(survivors.iter().map(|session| {
            let payload = &payload;
            async move {
                let backend = session.backend();
                let reply = session.post(SEARCH_ROUTE, payload).await?;
                let forms = parse_forms(backend.id(), reply)?;
                Ok::<_, CrossOldError>(BackendResults {
                    backend_id: backend.id().to_string(),
                    label: backend.label().to_string(),
                    forms,
                })
            }
        }))
        .await
    }
}
