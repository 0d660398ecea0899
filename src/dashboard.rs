// src/dashboard.rs

//! In-memory dashboard state.
//!
//! The dashboard owns the curated baseline, the result of the last
//! aggregation pass, and the merged snapshot that readers see. Edits and
//! merges run under one lock, and at most one aggregation pass is in flight:
//! callers that arrive mid-pass wait for it and share its result.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::Result;
use crate::models::{Collection, CuratedRecord, Dataset, RecordId};
use crate::pipeline::{Aggregator, Discovery};
use crate::storage::{DatasetStorage, import_file};

type Pass = Shared<BoxFuture<'static, Dataset>>;

#[derive(Debug, Clone)]
struct State {
    baseline: Dataset,
    discovery: Option<Discovery>,
    snapshot: Dataset,
}

impl State {
    fn new(baseline: Dataset) -> Self {
        Self {
            snapshot: baseline.clone(),
            baseline,
            discovery: None,
        }
    }
}

/// Coordinator between the shell, the aggregator and storage.
pub struct Dashboard {
    aggregator: Arc<Aggregator>,
    state: Arc<Mutex<State>>,
    in_flight: Arc<Mutex<Option<Pass>>>,
}

impl Dashboard {
    pub fn new(aggregator: Aggregator, baseline: Dataset) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            state: Arc::new(Mutex::new(State::new(baseline))),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// The dataset as currently shown.
    pub fn snapshot(&self) -> Dataset {
        lock(&self.state).snapshot.clone()
    }

    /// The curated records without any discovered data.
    pub fn baseline(&self) -> Dataset {
        lock(&self.state).baseline.clone()
    }

    /// Run an aggregation pass, or join the one already running.
    pub async fn refresh(&self) -> Dataset {
        let pass = {
            let mut slot = lock(&self.in_flight);
            match slot.as_ref() {
                Some(pass) => {
                    log::debug!("Joining aggregation pass already in flight");
                    pass.clone()
                }
                None => {
                    let pass = self.start_pass();
                    *slot = Some(pass.clone());
                    pass
                }
            }
        };
        pass.await
    }

    fn start_pass(&self) -> Pass {
        let aggregator = Arc::clone(&self.aggregator);
        let state = Arc::clone(&self.state);
        let slot = Arc::clone(&self.in_flight);

        async move {
            let discovery = aggregator.discover().await;
            let merged = {
                // Merge against the baseline as it is now, not as it was when
                // the pass started.
                let mut state = lock(&state);
                let merged = aggregator.merge(&state.baseline, &discovery);
                state.discovery = Some(discovery);
                state.snapshot = merged.clone();
                merged
            };
            *lock(&slot) = None;
            merged
        }
        .boxed()
        .shared()
    }

    /// Add a curated record; returns its generated id.
    pub fn create_item<R: CuratedRecord>(&self, record: R) -> Result<RecordId> {
        self.edit(|state| {
            let (next, id) = state.baseline.with_created(record);
            state.baseline = next;
            log::info!("Created {} record {id}", R::COLLECTION);
            Ok(id)
        })
    }

    /// Replace the curated record `id`.
    ///
    /// Discovered tools are not curated and report `RecordNotFound`.
    pub fn update_item<R: CuratedRecord>(&self, id: &RecordId, record: R) -> Result<()> {
        self.edit(|state| {
            state.baseline = state.baseline.with_updated(id, record)?;
            log::info!("Updated {} record {id}", R::COLLECTION);
            Ok(())
        })
    }

    /// Remove the curated record `id` from `collection`.
    pub fn delete_item(&self, collection: Collection, id: &RecordId) -> Result<()> {
        self.edit(|state| {
            state.baseline = state.baseline.with_deleted(collection, id)?;
            log::info!("Deleted {collection} record {id}");
            Ok(())
        })
    }

    /// Replace everything with `dataset`, dropping the last discovery.
    pub fn replace(&self, dataset: Dataset) {
        let mut state = lock(&self.state);
        *state = State::new(dataset);
    }

    /// Load a dataset file and make it the new baseline.
    ///
    /// A file that does not parse leaves the current state untouched.
    pub async fn import(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let dataset = import_file(path.as_ref()).await?;
        self.replace(dataset.clone());
        log::info!(
            "Imported {} tools from {}",
            dataset.new_tools.len(),
            path.as_ref().display()
        );
        Ok(dataset)
    }

    /// Write the current snapshot as a dated export.
    pub async fn export(&self, storage: &dyn DatasetStorage) -> Result<PathBuf> {
        let snapshot = self.snapshot();
        storage.export(&snapshot).await
    }

    /// Apply `change` and rebuild the snapshot; on error nothing changes.
    fn edit<T>(&self, change: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        let mut guard = lock(&self.state);
        let mut draft = guard.clone();
        let value = change(&mut draft)?;

        draft.snapshot = match &draft.discovery {
            Some(discovery) => self.aggregator.merge(&draft.baseline, discovery),
            None => draft.baseline.clone(),
        };
        *guard = draft;
        Ok(value)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
