// Search orchestration state machine.
// Owns "what request, if any, happens next": debounces intent changes,
// chooses between a fresh remote search and a local re-filter of the last
// fetched set, and tracks pagination. Results are published wholesale
// through a watch channel so consumers always see an atomic snapshot.

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::filter_engine;
use crate::filters::SearchFilters;
use crate::github::client::SearchClient;
use crate::github::rate_limit::RateLimitState;
use crate::github::transport::Transport;
use crate::github::types::{ResultSet, UserRecord};

/// Quiet period after the last intent change before a decision is made.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Page size used by the orchestrator's own searches.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// The provider stops serving search results past this offset, regardless
/// of the reported total.
pub const MAX_RESULT_WINDOW: u32 = 1000;

/// Broad term used for the initial load and as the synthesized free-text
/// term when a filter change warrants a remote search without a language.
pub const BOOTSTRAP_TERM: &str = "developer";

/// A user-driven change fed to the orchestrator.
#[derive(Debug, Clone)]
pub enum Intent {
    /// The filter set changed; debounced and coalesced.
    FiltersChanged(SearchFilters),
    /// Explicit free-text search submission; fires immediately.
    Submit(String),
    /// Reset filters and re-issue the canonical initial load.
    GoHome,
    /// Fetch the next page and append.
    LoadMore,
}

/// Orchestrator phase, modeled as a tagged enum rather than mode flags so
/// invalid combinations cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingDebounce,
    RemoteSearching,
    LocallyFiltering,
    Error,
}

/// Snapshot published to rendering collaborators.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub phase: Phase,
    pub results: ResultSet,
    pub page: u32,
    pub rate_limit: Option<RateLimitState>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Replace,
    Append,
}

/// What a debounced filter change should do.
#[derive(Debug, Clone, PartialEq)]
enum Decision {
    /// Fresh remote search with the synthesized filters.
    Remote(SearchFilters),
    /// Re-derive results from the last fetched set.
    Local,
}

/// A debounced filter change goes remote whenever any filter is set; the
/// free-text term is synthesized from the chosen language or falls back to
/// the broad bootstrap term. With no filters set the change is resolvable
/// locally.
fn decide(filters: &SearchFilters) -> Decision {
    if filters.has_active_filters() {
        let term = filters
            .language
            .clone()
            .unwrap_or_else(|| BOOTSTRAP_TERM.to_string());
        Decision::Remote(SearchFilters {
            query: term,
            ..filters.clone()
        })
    } else {
        Decision::Local
    }
}

struct Completion {
    generation: u64,
    kind: FetchKind,
    page: u32,
    outcome: Result<ResultSet>,
}

/// The stateful orchestrator. Drive it by sending [`Intent`]s into the
/// channel passed to [`SearchOrchestrator::run`]; observe it through the
/// watch receiver returned by [`SearchOrchestrator::new`].
pub struct SearchOrchestrator<T: Transport + 'static> {
    client: SearchClient<T>,
    filters: SearchFilters,
    /// Last remote-fetched records, the basis for local filtering.
    fetched: Vec<UserRecord>,
    results: ResultSet,
    page: u32,
    per_page: u32,
    /// Monotonic token; completions from older fetches are discarded.
    generation: u64,
    deadline: Option<Instant>,
    phase: Phase,
    error: Option<String>,
    view_tx: watch::Sender<ViewState>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<T: Transport + 'static> SearchOrchestrator<T> {
    pub fn new(client: SearchClient<T>) -> (Self, watch::Receiver<ViewState>) {
        Self::with_per_page(client, DEFAULT_PER_PAGE)
    }

    pub fn with_per_page(
        client: SearchClient<T>,
        per_page: u32,
    ) -> (Self, watch::Receiver<ViewState>) {
        let (view_tx, view_rx) = watch::channel(ViewState::default());
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            client,
            filters: SearchFilters::default(),
            fetched: Vec::new(),
            results: ResultSet::default(),
            page: 1,
            per_page,
            generation: 0,
            deadline: None,
            phase: Phase::Idle,
            error: None,
            view_tx,
            done_tx,
            done_rx,
        };
        (orchestrator, view_rx)
    }

    /// Event loop: intent changes, the debounce deadline, and fetch
    /// completions. Returns when the intent channel closes.
    pub async fn run(mut self, mut intents: mpsc::UnboundedReceiver<Intent>) {
        enum Event {
            Intent(Option<Intent>),
            DebounceElapsed,
            Done(Completion),
        }

        self.publish();
        loop {
            let deadline = self.deadline;
            let debounce = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            let event = tokio::select! {
                maybe = intents.recv() => Event::Intent(maybe),
                _ = debounce => Event::DebounceElapsed,
                Some(done) = self.done_rx.recv() => Event::Done(done),
            };

            match event {
                Event::Intent(Some(intent)) => self.on_intent(intent),
                Event::Intent(None) => break,
                Event::DebounceElapsed => self.on_debounce_elapsed(),
                Event::Done(done) => self.on_completion(done),
            }

            self.publish();
        }
    }

    fn on_intent(&mut self, intent: Intent) {
        match intent {
            Intent::FiltersChanged(filters) => {
                trace!("filter change, restarting debounce window");
                self.filters = filters;
                self.deadline = Some(Instant::now() + DEBOUNCE_WINDOW);
                self.phase = Phase::AwaitingDebounce;
            }
            Intent::Submit(text) => {
                self.filters.query = text;
                self.deadline = None;
                self.spawn_fetch(FetchKind::Replace, self.filters.clone(), 1);
            }
            Intent::GoHome => {
                self.filters = SearchFilters {
                    query: BOOTSTRAP_TERM.to_string(),
                    ..SearchFilters::default()
                };
                self.deadline = None;
                self.spawn_fetch(FetchKind::Replace, self.filters.clone(), 1);
            }
            Intent::LoadMore => {
                if self.phase == Phase::Error || self.deadline.is_some() {
                    trace!(phase = ?self.phase, "ignoring load-more");
                    return;
                }
                if self.page * self.per_page >= MAX_RESULT_WINDOW {
                    debug!(page = self.page, "provider result window exhausted");
                    return;
                }
                self.spawn_fetch(FetchKind::Append, self.filters.clone(), self.page + 1);
            }
        }
    }

    fn on_debounce_elapsed(&mut self) {
        self.deadline = None;
        match decide(&self.filters) {
            Decision::Remote(filters) => {
                debug!("debounce elapsed, issuing remote search");
                self.spawn_fetch(FetchKind::Replace, filters, 1);
            }
            Decision::Local => {
                debug!("debounce elapsed, filtering locally");
                self.phase = Phase::LocallyFiltering;
                self.results = filter_engine::apply(&self.fetched, &self.filters, Utc::now());
                self.phase = Phase::Idle;
                self.error = None;
            }
        }
    }

    fn spawn_fetch(&mut self, kind: FetchKind, filters: SearchFilters, page: u32) {
        self.generation += 1;
        let generation = self.generation;
        self.phase = Phase::RemoteSearching;

        let client = self.client.clone();
        let per_page = self.per_page;
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let outcome = client.search_users(&filters, page, per_page).await;
            let _ = done_tx.send(Completion {
                generation,
                kind,
                page,
                outcome,
            });
        });
    }

    fn on_completion(&mut self, done: Completion) {
        if done.generation != self.generation {
            trace!(
                stale = done.generation,
                current = self.generation,
                "discarding out-of-date completion"
            );
            return;
        }

        match done.outcome {
            Ok(set) => {
                // The remote query cannot express the experience tier, so
                // every fetched page passes through the client-side
                // refinement before it becomes visible.
                let now = Utc::now();
                let items = match done.kind {
                    FetchKind::Replace => {
                        self.fetched = set.items.clone();
                        filter_engine::refine(&set.items, &self.filters, now)
                    }
                    FetchKind::Append => {
                        let mut items = self.results.items.clone();
                        items.extend(filter_engine::refine(&set.items, &self.filters, now));
                        self.fetched.extend(set.items);
                        items
                    }
                };
                self.results = ResultSet {
                    items,
                    total_count: set.total_count,
                    incomplete: set.incomplete,
                };
                self.page = done.page;
                // A newer filter change may already be waiting out its
                // debounce window; don't let this snapshot report Idle.
                if self.deadline.is_none() {
                    self.phase = Phase::Idle;
                }
                self.error = None;
            }
            Err(e) => {
                // Prior results stay visible; the user re-triggers to retry.
                warn!(error = %e, "search failed");
                self.phase = Phase::Error;
                self.error = Some(e.to_string());
            }
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(ViewState {
            phase: self.phase,
            results: self.results.clone(),
            page: self.page,
            rate_limit: self.client.rate_limit(),
            error: self.error.clone(),
        });
    }
}
