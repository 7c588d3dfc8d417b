use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use super::codec::encode;
use super::index::ScenarioIndex;
use super::lookup::{LookupHit, lookup};
use super::table::{ScenarioTable, TableSource};
use super::types::{Profile, ScenarioRecord};
use crate::error::CompassError;

#[derive(Debug)]
pub struct Snapshot {
    table: ScenarioTable,
    index: Option<ScenarioIndex>,
    loaded_at: Instant,
}

impl Snapshot {
    pub fn build(records: Vec<ScenarioRecord>, use_index: bool) -> Self {
        let table = ScenarioTable::new(records);
        let index = use_index.then(|| ScenarioIndex::build(&table));
        Self {
            table,
            index,
            loaded_at: Instant::now(),
        }
    }

    pub fn table(&self) -> &ScenarioTable {
        &self.table
    }

    pub fn index(&self) -> Option<&ScenarioIndex> {
        self.index.as_ref()
    }

    pub fn age(&self) -> Duration {
        self.loaded_at.elapsed()
    }

    pub fn lookup(&self, profile: &Profile) -> Result<LookupHit<'_>, CompassError> {
        lookup(&self.table, self.index.as_ref(), profile).ok_or_else(|| CompassError::NotFound {
            key: encode(profile),
        })
    }
}

pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(30);

struct FailedLoad {
    at: Instant,
    reason: String,
}

/// Failed loads are not retried until `retry_backoff` has passed.
pub struct ScenarioStore {
    source: Box<dyn TableSource>,
    ttl: Option<Duration>,
    use_index: bool,
    retry_backoff: Duration,
    current: RwLock<Option<Arc<Snapshot>>>,
    last_failure: Mutex<Option<FailedLoad>>,
    reload_lock: Mutex<()>,
}

impl ScenarioStore {
    pub fn new(source: Box<dyn TableSource>, ttl: Option<Duration>, use_index: bool) -> Self {
        Self {
            source,
            ttl,
            use_index,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            current: RwLock::new(None),
            last_failure: Mutex::new(None),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn source(&self) -> String {
        self.source.describe()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn cached(&self) -> Option<Arc<Snapshot>> {
        self.fresh()
    }

    pub fn snapshot(&self) -> Result<Arc<Snapshot>, CompassError> {
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        let _guard = self.reload_lock.lock();
        // Another caller may have finished a load while we waited.
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }
        if let Some(reason) = self.recent_failure() {
            return self.stale_or(CompassError::data_unavailable(reason));
        }
        match self.rebuild() {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                warn!(error = %err, "scenario load failed");
                self.stale_or(err)
            }
        }
    }

    /// Ignores TTL and backoff.
    pub fn reload(&self) -> Result<Arc<Snapshot>, CompassError> {
        let _guard = self.reload_lock.lock();
        self.rebuild()
    }

    fn fresh(&self) -> Option<Arc<Snapshot>> {
        let current = self.current.read();
        let snapshot = current.as_ref()?;
        match self.ttl {
            Some(ttl) if snapshot.age() >= ttl => None,
            _ => Some(Arc::clone(snapshot)),
        }
    }

    fn recent_failure(&self) -> Option<String> {
        let failure = self.last_failure.lock();
        let failed = failure.as_ref()?;
        (failed.at.elapsed() < self.retry_backoff).then(|| failed.reason.clone())
    }

    fn stale_or(&self, err: CompassError) -> Result<Arc<Snapshot>, CompassError> {
        let stale = self.current.read().clone();
        stale.ok_or(err)
    }

    fn rebuild(&self) -> Result<Arc<Snapshot>, CompassError> {
        let started = Instant::now();
        let records = match self.source.load() {
            Ok(records) => records,
            Err(err) => {
                *self.last_failure.lock() = Some(FailedLoad {
                    at: Instant::now(),
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };
        let snapshot = Arc::new(Snapshot::build(records, self.use_index));
        info!(
            source = %self.source.describe(),
            rows = snapshot.table().len(),
            indexed = snapshot.index().is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scenario snapshot loaded"
        );
        *self.current.write() = Some(Arc::clone(&snapshot));
        *self.last_failure.lock() = None;
        Ok(snapshot)
    }
}
