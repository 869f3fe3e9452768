//! In-memory bridge and virtual clock used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use crate::client::ResourceClient;
use crate::clock::Clock;
use crate::errors::Error;
use crate::patch::Patch;
use crate::resource::{ResourceLink, ResourceType};

type Result<T> = std::result::Result<T, Error>;

/// A clock that only moves when slept on or advanced.
#[derive(Debug, Clone, Default)]
pub(crate) struct ManualClock {
    now: Arc<Mutex<Duration>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedWrite {
    pub(crate) rtype: ResourceType,
    pub(crate) id: String,
    pub(crate) patch: Value,
    /// Clock time when the write started.
    pub(crate) at: Duration,
    pub(crate) ok: bool,
}

/// Serves fixture records and records every write attempt.
#[derive(Debug, Default)]
pub(crate) struct FakeBridge {
    records: HashMap<ResourceType, Vec<Value>>,
    writes: Mutex<Vec<RecordedWrite>>,
    fetches: Mutex<Vec<ResourceType>>,
    failing: Mutex<HashSet<usize>>,
    fail_all: Mutex<bool>,
    latencies: HashMap<usize, Duration>,
    clock: Option<ManualClock>,
}

impl FakeBridge {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, rtype: ResourceType, records: Value) -> Self {
        let Value::Array(records) = records else {
            panic!("fixture for {rtype} must be an array");
        };
        self.records.insert(rtype, records);
        self
    }

    pub(crate) fn with_clock(mut self, clock: &ManualClock) -> Self {
        self.clock = Some(clock.clone());
        self
    }

    /// Make the write attempt with this index take `latency` of clock time.
    pub(crate) fn with_latency(mut self, index: usize, latency: Duration) -> Self {
        self.latencies.insert(index, latency);
        self
    }

    /// Make the write attempt with this index fail.
    pub(crate) fn fail_write(self, index: usize) -> Self {
        self.failing.lock().unwrap().insert(index);
        self
    }

    pub(crate) fn set_fail_all(&self, fail: bool) {
        *self.fail_all.lock().unwrap() = fail;
    }

    pub(crate) fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub(crate) fn patches(&self) -> Vec<Value> {
        self.writes().into_iter().map(|w| w.patch).collect()
    }

    pub(crate) fn fetches(&self) -> Vec<ResourceType> {
        self.fetches.lock().unwrap().clone()
    }
}

impl ResourceClient for FakeBridge {
    async fn fetch(&self, rtype: ResourceType) -> Result<Vec<Value>> {
        self.fetches.lock().unwrap().push(rtype);
        Ok(self.records.get(&rtype).cloned().unwrap_or_default())
    }

    async fn write(&self, rtype: ResourceType, id: &str, patch: &Patch) -> Result<Vec<ResourceLink>> {
        let at = self.clock.as_ref().map(Clock::elapsed).unwrap_or_default();
        let patch_value = serde_json::to_value(patch).map_err(Error::JsonDump)?;

        let mut writes = self.writes.lock().unwrap();
        let index = writes.len();
        let ok = !*self.fail_all.lock().unwrap() && !self.failing.lock().unwrap().contains(&index);
        writes.push(RecordedWrite {
            rtype,
            id: id.to_string(),
            patch: patch_value,
            at,
            ok,
        });
        drop(writes);

        if let (Some(clock), Some(latency)) = (&self.clock, self.latencies.get(&index)) {
            clock.advance(*latency);
        }

        if ok {
            Ok(vec![ResourceLink::new(rtype, id)])
        } else {
            Err(Error::write(rtype, id, "503 Service Unavailable"))
        }
    }
}
