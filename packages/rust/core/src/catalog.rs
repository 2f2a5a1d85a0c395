//! The in-memory catalog of events and their talks.
//!
//! Each configured event owns a slot holding its load state. Loading is
//! memoized on the presence of talks: `Loaded` events are never fetched
//! again, `Unloaded` and `Failed` ones are (re)loaded by the next
//! [`Catalog::ensure_loaded`]. The slot lock is held across the whole
//! check-and-load, so concurrent callers never fetch one event twice.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinError;
use tracing::{info, instrument, warn};

use recordings_shared::{AppConfig, EventConfig, RecordingsError, Result, Talk};

use crate::fetch::Fetcher;
use crate::loader::{LoadedEvent, load_event};

// ---------------------------------------------------------------------------
// Load state & snapshots
// ---------------------------------------------------------------------------

/// Where an event is in its lifecycle.
#[derive(Debug, Clone)]
pub enum LoadState {
    Unloaded,
    Loaded(Arc<LoadedEvent>),
    Failed(Arc<RecordingsError>),
}

/// A point-in-time view of one configured event.
#[derive(Debug, Clone)]
pub struct Event {
    pub config: EventConfig,
    pub state: LoadState,
}

impl Event {
    /// Name for logs and listings.
    pub fn label(&self) -> &str {
        self.config.label()
    }

    /// Talks in document order, or `None` if the event is not loaded.
    pub fn talks(&self) -> Option<&[Arc<Talk>]> {
        match &self.state {
            LoadState::Loaded(loaded) => Some(loaded.talks.as_slice()),
            _ => None,
        }
    }

    pub fn loaded(&self) -> Option<&LoadedEvent> {
        match &self.state {
            LoadState::Loaded(loaded) => Some(loaded.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<RecordingsError>> {
        match &self.state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Loaded metadata, or the configured metadata before a successful load.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        match &self.state {
            LoadState::Loaded(loaded) => &loaded.metadata,
            _ => &self.config.metadata,
        }
    }

    pub fn title(&self) -> &str {
        self.field("title")
    }

    pub fn subtitle(&self) -> &str {
        self.field("subtitle")
    }

    pub fn venue(&self) -> &str {
        self.field("venue")
    }

    pub fn city(&self) -> &str {
        self.field("city")
    }

    fn field(&self, key: &str) -> &str {
        self.metadata().get(key).map(String::as_str).unwrap_or("")
    }
}

/// An event that could not be loaded.
#[derive(Debug, Clone)]
pub struct EventFailure {
    /// Position of the event in configuration order.
    pub index: usize,
    /// Event label.
    pub event: String,
    pub error: Arc<RecordingsError>,
}

/// Summary of one [`Catalog::ensure_loaded`] pass.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Events loaded during this pass.
    pub loaded: usize,
    /// Events that were already loaded.
    pub skipped: usize,
    /// Events that failed during this pass, in configuration order.
    pub failures: Vec<EventFailure>,
    pub elapsed: Duration,
}

impl LoadReport {
    /// True when no event failed in this pass.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Flattened talks plus the events that contributed none because they failed.
#[derive(Debug, Clone, Default)]
pub struct TalkListing {
    /// Talks in event order, then document order.
    pub talks: Vec<Arc<Talk>>,
    pub failures: Vec<EventFailure>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

struct EventSlot {
    config: EventConfig,
    state: Mutex<LoadState>,
}

enum SlotOutcome {
    Loaded,
    Skipped,
    Failed(Arc<RecordingsError>),
}

/// Configured events and their lazily loaded talks.
pub struct Catalog {
    slots: Vec<Arc<EventSlot>>,
    fetcher: Arc<Fetcher>,
    permits: Arc<Semaphore>,
}

impl Catalog {
    /// Build a catalog for every event in `config`. Nothing is fetched yet.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config.fetch)?;
        Ok(Self::with_fetcher(
            config.events.clone(),
            fetcher,
            config.fetch.concurrency as usize,
        ))
    }

    /// Build a catalog with an explicit fetcher and load concurrency.
    pub fn with_fetcher(events: Vec<EventConfig>, fetcher: Fetcher, concurrency: usize) -> Self {
        let slots = events
            .into_iter()
            .map(|config| {
                Arc::new(EventSlot {
                    config,
                    state: Mutex::new(LoadState::Unloaded),
                })
            })
            .collect();

        Self {
            slots,
            fetcher: Arc::new(fetcher),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Number of configured events.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Load every event that has no talks yet.
    ///
    /// Events load concurrently; one failure never stops the others.
    #[instrument(skip_all, fields(events = self.slots.len()))]
    pub async fn ensure_loaded(&self) -> LoadReport {
        let start = Instant::now();

        let handles: Vec<_> = self
            .slots
            .iter()
            .map(|slot| {
                let slot = Arc::clone(slot);
                let fetcher = Arc::clone(&self.fetcher);
                let permits = Arc::clone(&self.permits);
                tokio::spawn(async move { load_slot(&slot, &fetcher, &permits).await })
            })
            .collect();

        let mut report = LoadReport::default();

        for (index, handle) in handles.into_iter().enumerate() {
            match settle(&self.slots[index], handle.await).await {
                SlotOutcome::Loaded => report.loaded += 1,
                SlotOutcome::Skipped => report.skipped += 1,
                SlotOutcome::Failed(error) => report.failures.push(EventFailure {
                    index,
                    event: self.slots[index].config.label().to_string(),
                    error,
                }),
            }
        }

        report.elapsed = start.elapsed();

        if report.loaded > 0 || !report.failures.is_empty() {
            info!(
                loaded = report.loaded,
                skipped = report.skipped,
                failed = report.failures.len(),
                duration_ms = report.elapsed.as_millis(),
                "catalog load pass finished"
            );
        }

        report
    }

    /// All events in configuration order, after loading what is missing.
    pub async fn events(&self) -> Vec<Event> {
        self.ensure_loaded().await;
        self.snapshot().await
    }

    /// Every loaded talk in event order, then document order, after loading
    /// what is missing. Events that failed are reported alongside.
    pub async fn talks(&self) -> TalkListing {
        let mut listing = TalkListing::default();

        for (index, event) in self.events().await.into_iter().enumerate() {
            match event.state {
                LoadState::Loaded(loaded) => listing.talks.extend(loaded.talks.iter().cloned()),
                LoadState::Failed(error) => listing.failures.push(EventFailure {
                    index,
                    event: event.config.label().to_string(),
                    error,
                }),
                LoadState::Unloaded => {}
            }
        }

        listing
    }

    /// Current state of every event without triggering a load.
    pub async fn snapshot(&self) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let state = slot.state.lock().await.clone();
            events.push(Event {
                config: slot.config.clone(),
                state,
            });
        }
        events
    }
}

/// Turn a finished load task into its outcome. A task that panicked or was
/// cancelled leaves the slot `Failed` rather than `Unloaded`.
async fn settle(
    slot: &EventSlot,
    joined: std::result::Result<SlotOutcome, JoinError>,
) -> SlotOutcome {
    match joined {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(event = slot.config.label(), error = %e, "load task aborted");
            let error = Arc::new(RecordingsError::Task(e.to_string()));
            let mut state = slot.state.lock().await;
            if !matches!(*state, LoadState::Loaded(_)) {
                *state = LoadState::Failed(Arc::clone(&error));
            }
            SlotOutcome::Failed(error)
        }
    }
}

/// Check-and-load one slot while holding its lock.
async fn load_slot(slot: &EventSlot, fetcher: &Fetcher, permits: &Semaphore) -> SlotOutcome {
    let mut state = slot.state.lock().await;
    if matches!(*state, LoadState::Loaded(_)) {
        return SlotOutcome::Skipped;
    }

    // The permit bounds concurrent fetches; it is taken after the slot lock so
    // a task never holds a permit while waiting on another caller's load.
    let Ok(_permit) = permits.acquire().await else {
        return SlotOutcome::Failed(Arc::new(RecordingsError::Task(
            "load permits closed".into(),
        )));
    };

    match load_event(fetcher, &slot.config).await {
        Ok(loaded) => {
            *state = LoadState::Loaded(Arc::new(loaded));
            SlotOutcome::Loaded
        }
        Err(e) => {
            warn!(event = slot.config.label(), error = %e, "event failed to load");
            let error = Arc::new(e);
            *state = LoadState::Failed(Arc::clone(&error));
            SlotOutcome::Failed(error)
        }
    }
}
