//! Debounced, stale-safe fetching of result pages for a changing filter state.
//!
//! A single driver task owns the filter state, the debounce deadline and every
//! in-flight fetch. Each accepted change bumps a generation counter; a fetch
//! result is applied only if it was issued for the current generation, so a
//! slow response can never overwrite a newer one. Dropping the coordinator
//! aborts the driver, which drops the timer and aborts the in-flight fetches.

use std::{collections::HashMap, sync::Arc, time::Duration};

use common::{
    filter_state::{FilterAction, FilterState, SortKey},
    search_result::{CatalogItem, ResultPage},
};
use tokio::{
    sync::{mpsc, watch},
    task::{self, JoinError, JoinHandle, JoinSet},
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::{
    api::search::search_for_results,
    config::{CatalogSchema, EngineConfig},
    store::CatalogStore,
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Debouncing,
    InFlight,
}

/// What the UI renders. `items`/`total_count`/`page` describe the last
/// successful fetch and survive a failed one.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSnapshot {
    pub state: FilterState,
    pub items: Vec<CatalogItem>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub phase: FetchPhase,
    pub loading: bool,
    pub error: Option<String>,
}

impl FetchSnapshot {
    fn initial(state: &FilterState) -> Self {
        Self {
            state: state.clone(),
            items: Vec::new(),
            total_count: 0,
            page: state.page,
            page_size: state.page_size,
            phase: FetchPhase::Idle,
            loading: false,
            error: None,
        }
    }
}


#[derive(Debug)]
enum Command {
    Update(FilterAction),
    Replace(FilterState),
    Retry,
}


pub struct FetchCoordinator {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<FetchSnapshot>,
    driver: Option<JoinHandle<()>>,
}

impl FetchCoordinator {
    /// Starts the driver and immediately fetches `initial`. Must be called
    /// from within a tokio runtime.
    pub fn spawn(
        store: Arc<dyn CatalogStore>,
        schema: CatalogSchema,
        debounce: Duration,
        initial: FilterState,
    ) -> Self {
        let state = initial.normalized();
        let (snapshot_tx, snapshot_rx) = watch::channel(FetchSnapshot::initial(&state));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let mut driver = Driver {
            store,
            schema,
            debounce,
            page_size: state.page_size,
            state,
            generation: 0,
            deadline: None,
            fetches: JoinSet::new(),
            fetch_generations: HashMap::new(),
            snapshot: snapshot_tx,
        };
        driver.schedule(Duration::ZERO);
        let handle = tokio::spawn(driver.run(commands_rx));

        Self { commands: commands_tx, snapshot: snapshot_rx, driver: Some(handle) }
    }

    pub fn from_config(store: Arc<dyn CatalogStore>, config: &EngineConfig) -> Self {
        Self::spawn(
            store,
            config.schema.clone(),
            config.debounce,
            FilterState::with_page_size(config.page_size),
        )
    }

    pub fn snapshot(&self) -> FetchSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchSnapshot> {
        self.snapshot.clone()
    }

    pub fn filter_state(&self) -> FilterState {
        self.snapshot.borrow().state.clone()
    }

    /// Replaces the whole state. The page goes back to 1 unless only the
    /// page differs from the current state.
    pub fn set_filter_state(&self, next: FilterState) {
        self.send(Command::Replace(next));
    }

    pub fn dispatch(&self, action: FilterAction) {
        self.send(Command::Update(action));
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.dispatch(FilterAction::SetSearchText(text.into()));
    }

    pub fn set_sort_key(&self, key: SortKey) {
        self.dispatch(FilterAction::SetSortKey(key));
    }

    pub fn set_page(&self, page: u64) {
        self.dispatch(FilterAction::SetPage(page));
    }

    /// Re-submits the unchanged state right away.
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    /// Stops the driver and waits for it; pending timers and fetches are dropped.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.driver.take() {
            handle.abort();
            let _ = handle.await;
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("catalog fetch driver is gone, ignoring state change");
        }
    }
}

impl Drop for FetchCoordinator {
    fn drop(&mut self) {
        if let Some(handle) = self.driver.take() {
            handle.abort();
        }
    }
}


type FetchOutput = anyhow::Result<ResultPage>;

struct Driver {
    store: Arc<dyn CatalogStore>,
    schema: CatalogSchema,
    debounce: Duration,
    page_size: u64,
    state: FilterState,
    generation: u64,
    deadline: Option<Instant>,
    fetches: JoinSet<FetchOutput>,
    /// Generation each running fetch was issued for, so a panicked task can
    /// be judged like a finished one.
    fetch_generations: HashMap<task::Id, u64>,
    snapshot: watch::Sender<FetchSnapshot>,
}

impl Driver {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("catalog coordinator dropped, stopping driver");
                        break;
                    };
                    self.handle_command(command);
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    self.issue_fetch();
                }
                Some(joined) = self.fetches.join_next_with_id(), if !self.fetches.is_empty() => {
                    self.handle_completion(joined);
                }
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        let next = match command {
            Command::Update(action) => self.state.apply(action),
            Command::Replace(next) => {
                let mut next = next;
                next.page_size = self.page_size;
                if !same_selection(&self.state, &next) {
                    next.page = 1;
                }
                next
            }
            Command::Retry => {
                self.schedule(Duration::ZERO);
                return;
            }
        };
        let mut next = next.normalized();
        next.page_size = self.page_size;
        if next == self.state {
            debug!("filter state unchanged, nothing to fetch");
            return;
        }
        self.state = next;
        self.schedule(self.debounce);
    }

    /// Starts (or restarts) the quiet window. Anything still in flight
    /// belongs to an older generation from here on.
    fn schedule(&mut self, delay: Duration) {
        self.generation += 1;
        self.deadline = Some(Instant::now() + delay);
        let state = self.state.clone();
        self.snapshot.send_modify(|snapshot| {
            snapshot.state = state;
            snapshot.phase = FetchPhase::Debouncing;
            snapshot.loading = true;
        });
    }

    fn issue_fetch(&mut self) {
        let generation = self.generation;
        let store = self.store.clone();
        let schema = self.schema.clone();
        let state = self.state.clone();
        info!(generation, page = state.page, sort = state.sort_key.as_str(), "fetching catalog page");

        let handle = self.fetches.spawn(async move {
            search_for_results(store.as_ref(), &state, &schema).await
        });
        self.fetch_generations.insert(handle.id(), generation);
        self.snapshot.send_modify(|snapshot| {
            snapshot.phase = FetchPhase::InFlight;
            snapshot.loading = true;
        });
    }

    fn handle_completion(&mut self, joined: Result<(task::Id, FetchOutput), JoinError>) {
        let (id, result) = match joined {
            Ok((id, output)) => (id, output),
            Err(e) => {
                warn!("catalog fetch task failed: {}", e);
                (e.id(), Err(anyhow::anyhow!("catalog fetch task failed: {}", e)))
            }
        };
        let Some(generation) = self.fetch_generations.remove(&id) else {
            debug!(%id, "completion for an unknown catalog fetch");
            return;
        };
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale catalog response");
            return;
        }
        self.finish(result);
    }

    fn finish(&mut self, result: anyhow::Result<ResultPage>) {
        match result {
            Ok(page) => {
                debug!(items = page.items.len(), total = page.total_count, "catalog page applied");
                self.snapshot.send_modify(|snapshot| {
                    snapshot.items = page.items;
                    snapshot.total_count = page.total_count;
                    snapshot.page = page.page;
                    snapshot.page_size = self.page_size;
                    snapshot.phase = FetchPhase::Idle;
                    snapshot.loading = false;
                    snapshot.error = None;
                });
            }
            Err(e) => {
                warn!("catalog fetch failed: {:#}", e);
                let message = format!("{:#}", e);
                self.snapshot.send_modify(|snapshot| {
                    snapshot.phase = FetchPhase::Idle;
                    snapshot.loading = false;
                    snapshot.error = Some(message);
                });
            }
        }
    }
}

/// Equal apart from the page number.
fn same_selection(a: &FilterState, b: &FilterState) -> bool {
    let a = FilterState { page: 1, ..a.normalized() };
    let b = FilterState { page: 1, ..b.normalized() };
    a == b
}
