//! Process-wide holder of the current [`IndexSnapshot`].
//!
//! Readers clone the `Arc` under a short read lock and score without
//! holding it, so a rebuild never blocks or disturbs in-flight queries:
//! they finish against the snapshot they started with. A rebuild builds a
//! complete snapshot first and only then swaps the pointer; a failed build
//! leaves the published snapshot untouched.
//!
//! Rebuilds are exclusive: a second caller waits until the first one has
//! published (or failed), so snapshots are published in call order and a
//! slow build of an older document can never replace a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{IndexingError, PreconditionError};
use crate::index::{self, IndexSnapshot};
use crate::normalize::Normalizer;
use crate::search::{self, SearchHit};
use crate::vectorizer::TfidfParams;

pub struct IndexHandle {
    normalizer: Arc<Normalizer>,
    params: TfidfParams,
    current: RwLock<Option<Arc<IndexSnapshot>>>,
    builds: AtomicU64,
    /// Held across build + publish.
    rebuilding: Mutex<()>,
}

impl IndexHandle {
    /// An empty handle; nothing is searchable until [`init`](Self::init).
    pub fn new(normalizer: Arc<Normalizer>, params: TfidfParams) -> Self {
        Self {
            normalizer,
            params,
            current: RwLock::new(None),
            builds: AtomicU64::new(0),
            rebuilding: Mutex::new(()),
        }
    }

    /// Build and publish the first snapshot.
    pub fn init(&self, document: &str) -> Result<Arc<IndexSnapshot>, IndexingError> {
        self.rebuild(document)
    }

    /// Build a new snapshot from `document` and publish it.
    ///
    /// Blocks while another rebuild is in progress. On error the previously
    /// published snapshot (if any) stays current.
    pub fn rebuild(&self, document: &str) -> Result<Arc<IndexSnapshot>, IndexingError> {
        let _guard = self.rebuilding.lock().unwrap_or_else(|e| e.into_inner());

        let built = match index::build(document, self.normalizer.clone(), self.params.clone()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    generation = self.generation(),
                    "index build failed; keeping current snapshot"
                );
                return Err(e);
            }
        };

        let generation = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(built.with_generation(generation));
        {
            let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
            *current = Some(snapshot.clone());
        }
        tracing::info!(generation, "index snapshot published");
        Ok(snapshot)
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Result<Arc<IndexSnapshot>, PreconditionError> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(PreconditionError::NotIndexed)
    }

    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>, PreconditionError> {
        search::search(&*self.snapshot()?, query, top_k)
    }

    pub fn rank(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, PreconditionError> {
        search::rank(&*self.snapshot()?, query, top_k)
    }

    pub fn context(&self, query: &str, top_k: usize) -> Result<String, PreconditionError> {
        search::context(&*self.snapshot()?, query, top_k)
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_ok()
    }

    /// Generation of the published snapshot, 0 before the first success.
    pub fn generation(&self) -> u64 {
        self.snapshot().map(|s| s.generation()).unwrap_or(0)
    }

    pub fn normalizer(&self) -> &Arc<Normalizer> {
        &self.normalizer
    }

    pub fn params(&self) -> &TfidfParams {
        &self.params
    }
}
