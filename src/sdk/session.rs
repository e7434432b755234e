//! Wizard session state: start address, selection and the canonical route set.
//!
//! Every input change bumps a generation counter. A run captures the counter
//! in its [`RunTicket`]; when the run finishes its outcome is only published
//! if the counter has not moved in the meantime, so results of superseded
//! runs are never observable.

use crate::sdk::aggregate::{AggregationError, AggregationReport, Aggregator, DestinationFailure};
use crate::sdk::catalog::Catalog;
use crate::sdk::model::{DestinationDescriptor, RouteResult, StartAddress};
use crate::sdk::selection::{resolve, Resolution, Selection};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The published result of one aggregation run. Immutable once published.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSet {
    pub generation: u64,
    pub start: StartAddress,
    pub results: Vec<RouteResult>,
    pub failures: Vec<DestinationFailure>,
    pub provider: String,
    pub computed_at: DateTime<Local>,
}

impl RouteSet {
    pub fn partial_failures(&self) -> usize {
        self.failures.len()
    }
}

/// Snapshot of the inputs of one run.
#[derive(Debug, Clone)]
pub struct RunTicket {
    pub generation: u64,
    pub start: StartAddress,
    pub destinations: Vec<DestinationDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteView {
    NothingSelected,
    /// Inputs changed since the last run.
    Pending,
    /// A run is in flight; `previous` is the last published set, if any.
    Calculating { previous: Option<Arc<RouteSet>> },
    Ready(Arc<RouteSet>),
    Failed(AggregationError),
}

#[derive(Debug, Clone)]
enum RunState {
    Idle,
    Running,
    Failed(AggregationError),
}

#[derive(Debug)]
pub struct WizardSession {
    generation: u64,
    start: Option<StartAddress>,
    selection: Selection,
    routes: Option<Arc<RouteSet>>,
    state: RunState,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            generation: 0,
            start: None,
            selection: Selection::new(),
            routes: None,
            state: RunState::Idle,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn start_address(&self) -> Option<&StartAddress> {
        self.start.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// A new origin invalidates everything chosen for the old one.
    pub fn set_start_address(&mut self, start: StartAddress) {
        log::debug!("Start address set to \"{}\"", start.full_address);
        self.start = Some(start);
        self.selection.clear();
        self.routes = None;
        self.invalidate();
    }

    /// Replaces the selection. The last published set stays readable until a
    /// new run replaces it, but is no longer reported as current.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.state = RunState::Idle;
    }

    /// Resolves the current inputs and starts a run, superseding any run that
    /// is still in flight.
    pub fn begin_run(&mut self, catalog: &Catalog) -> Result<RunTicket, AggregationError> {
        self.generation += 1;

        let destinations = match resolve(self.start.as_ref(), &self.selection, catalog) {
            Resolution::Ready(destinations) => destinations,
            Resolution::NothingSelected => {
                self.routes = None;
                self.state = RunState::Failed(AggregationError::NothingSelected);
                return Err(AggregationError::NothingSelected);
            }
        };
        let Some(start) = self.start.clone() else {
            return Err(AggregationError::NothingSelected);
        };

        self.state = RunState::Running;
        Ok(RunTicket {
            generation: self.generation,
            start,
            destinations,
        })
    }

    /// Publishes a finished run. Returns `false` and changes nothing if the
    /// ticket has been superseded.
    pub fn publish(
        &mut self,
        ticket: RunTicket,
        outcome: Result<AggregationReport, AggregationError>,
    ) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding results of run {} (current generation {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        match outcome {
            Ok(report) => {
                self.routes = Some(Arc::new(RouteSet {
                    generation: ticket.generation,
                    start: ticket.start,
                    results: report.results,
                    failures: report.failures,
                    provider: report.provider,
                    computed_at: Local::now(),
                }));
                self.state = RunState::Idle;
            }
            Err(err) => {
                self.routes = None;
                self.state = RunState::Failed(err);
            }
        }
        true
    }

    pub fn view(&self) -> RouteView {
        if self.start.is_none() || self.selection.is_empty() {
            return RouteView::NothingSelected;
        }
        match &self.state {
            RunState::Running => RouteView::Calculating {
                previous: self.routes.clone(),
            },
            RunState::Failed(AggregationError::NothingSelected) => RouteView::NothingSelected,
            RunState::Failed(err) => RouteView::Failed(err.clone()),
            RunState::Idle => match &self.routes {
                Some(routes) if routes.generation == self.generation => {
                    RouteView::Ready(Arc::clone(routes))
                }
                _ => RouteView::Pending,
            },
        }
    }

    /// The last published route set, current or not.
    pub fn current(&self) -> Option<Arc<RouteSet>> {
        self.routes.clone()
    }
}

pub type SharedSession = Arc<Mutex<WizardSession>>;

pub fn shared(session: WizardSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Runs the aggregation for the session's current inputs and publishes the
/// outcome. The session lock is released while routes are computed, so
/// inputs may change meanwhile; the run is then discarded.
pub async fn recompute(session: &SharedSession, catalog: &Catalog, aggregator: &Aggregator) -> RouteView {
    let ticket = {
        let mut guard = session.lock().await;
        match guard.begin_run(catalog) {
            Ok(ticket) => ticket,
            Err(_) => return guard.view(),
        }
    };

    let outcome = aggregator.run(&ticket.start, &ticket.destinations).await;

    let mut guard = session.lock().await;
    guard.publish(ticket, outcome);
    guard.view()
}
