//! Search controller owning the result state shown by the UI.
//!
//! The controller is the only writer of [`ResultState`]. Every submitted query
//! bumps a generation counter and runs one background task; a task may only
//! publish its outcome while its generation is still the latest, so results
//! of superseded queries never reach the UI. Superseded tasks are also aborted,
//! which drops their in-flight request.
//!
//! The UI observes the state through [`SearchController::subscribe`] and feeds
//! query text either directly via [`SearchController::submit`] or as a stream
//! via [`SearchController::drive`], which debounces keystrokes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::models::{BookRecord, ResultState, SearchQuery};
use crate::sources::{BookSource, SearchError};
use crate::utils::Connectivity;

/// Default quiet period between the last keystroke and the search
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Drives searches and publishes their outcome as a [`ResultState`]
///
/// Cloning is cheap; clones share the same state and in-flight search.
#[derive(Debug, Clone)]
pub struct SearchController {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    source: Arc<dyn BookSource>,
    connectivity: Arc<dyn Connectivity>,
    debounce: Duration,
    state: watch::Sender<ResultState>,
    generation: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl SearchController {
    /// Create a controller with the default debounce period
    pub fn new(source: Arc<dyn BookSource>, connectivity: Arc<dyn Connectivity>) -> Self {
        Self::with_debounce(source, connectivity, DEFAULT_DEBOUNCE)
    }

    /// Create a controller with a custom debounce period for [`drive`](Self::drive)
    pub fn with_debounce(
        source: Arc<dyn BookSource>,
        connectivity: Arc<dyn Connectivity>,
        debounce: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ResultState::Idle);
        Self {
            shared: Arc::new(Shared {
                source,
                connectivity,
                debounce,
                state,
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> ResultState {
        self.shared.state.borrow().clone()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<ResultState> {
        self.shared.state.subscribe()
    }

    /// Wait until no search is loading and return the state at that point
    pub async fn settled(&self) -> ResultState {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|state| !state.is_loading()).await;
        match settled {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Start a search for `query`, superseding any search still in flight
    ///
    /// When offline the state becomes [`ResultState::OfflineError`] and no
    /// request is made. Must be called from within a tokio runtime. Returns
    /// the generation assigned to this query.
    pub fn submit(&self, query: impl Into<SearchQuery>) -> u64 {
        let query = query.into();
        let shared = &self.shared;
        let mut in_flight = shared.lock_in_flight();

        if !shared.connectivity.is_online() {
            let generation = shared.begin(ResultState::OfflineError);
            abort(in_flight.take());
            tracing::info!(
                "No network connection, skipping search for '{}'",
                query.query
            );
            return generation;
        }

        let generation = shared.begin(ResultState::Loading);
        tracing::debug!(
            "Searching for '{}' (generation {})",
            query.query,
            generation
        );

        let task_shared = Arc::clone(shared);
        let handle = tokio::spawn(async move {
            let outcome = task_shared.source.search(&query).await;
            let next = state_for_outcome(outcome);
            if !task_shared.commit(generation, next) {
                tracing::debug!(
                    "Discarding result for '{}' (generation {} superseded)",
                    query.query,
                    generation
                );
            }
        });

        abort(in_flight.replace(handle));
        generation
    }

    /// Abort the in-flight search, if any
    ///
    /// A `Loading` state falls back to `Idle`; settled states are kept.
    pub fn cancel(&self) {
        let shared = &self.shared;
        let mut in_flight = shared.lock_in_flight();

        shared.state.send_if_modified(|state| {
            shared.generation.fetch_add(1, Ordering::SeqCst);
            if state.is_loading() {
                *state = ResultState::Idle;
                true
            } else {
                false
            }
        });
        abort(in_flight.take());
    }

    /// Consume query-text changes until the stream closes
    ///
    /// Each value restarts the debounce timer; the query is submitted once the
    /// stream has been quiet for the debounce period. Closing the sender is the
    /// teardown signal: any pending query is dropped and the in-flight search
    /// is cancelled.
    pub async fn drive(&self, mut queries: mpsc::Receiver<String>) {
        let debounce = self.shared.debounce;

        'events: while let Some(mut query) = queries.recv().await {
            if !debounce.is_zero() {
                let quiet = tokio::time::sleep(debounce);
                tokio::pin!(quiet);

                loop {
                    tokio::select! {
                        next = queries.recv() => match next {
                            Some(next) => {
                                query = next;
                                quiet.as_mut().reset(tokio::time::Instant::now() + debounce);
                            }
                            None => break 'events,
                        },
                        _ = &mut quiet => break,
                    }
                }
            }

            self.submit(query);
        }

        tracing::debug!("Query stream closed");
        self.cancel();
    }
}

impl Shared {
    fn lock_in_flight(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new generation and publish its initial state
    fn begin(&self, next: ResultState) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = next;
        });
        generation
    }

    /// Publish `next` if `generation` is still current
    fn commit(&self, generation: u64, next: ResultState) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = next;
            true
        })
    }
}

fn abort(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        handle.abort();
    }
}

/// Map a finished search to the state shown by the UI
pub fn state_for_outcome(outcome: Result<Vec<BookRecord>, SearchError>) -> ResultState {
    match outcome {
        Ok(books) if books.is_empty() => ResultState::Empty,
        Ok(books) => ResultState::Loaded(books),
        Err(SearchError::NoData(e)) => {
            tracing::debug!("No books to show: {}", e);
            ResultState::Empty
        }
        Err(SearchError::Network(e)) => ResultState::RequestError(e.to_string()),
    }
}
