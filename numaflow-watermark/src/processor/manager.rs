//! Keeps track of the processors writing to an edge. Processors are registered and moved through
//! their lifecycle by whoever discovers them (heartbeat watchers, tests), and are evicted by the
//! [crate::fetcher::EdgeFetcher] once the reader has moved past everything they ever published.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::config::{DEFAULT_TIMELINE_CAPACITY, EdgeWatermarkConfig};
use crate::error::{Error, Result};
use crate::processor::timeline::OffsetTimeline;

/// Status of a processor. A processor only moves forward, Active -> InActive -> Deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Active,
    InActive,
    Deleted,
}

impl Status {
    fn rank(self) -> u8 {
        match self {
            Status::Active => 0,
            Status::InActive => 1,
            Status::Deleted => 2,
        }
    }
}

/// Processor is the smallest unit of entity (from which we fetch data) that does inorder processing
/// or contains inorder data. It owns the [OffsetTimeline] of everything it has published.
pub struct Processor {
    name: Bytes,
    status: RwLock<Status>,
    timeline: OffsetTimeline,
}

impl Debug for Processor {
    /// Formats the processor as: "name(status)[(wm=..,off=..)->...]"
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name_str = String::from_utf8_lossy(&self.name);
        let status = match self.status() {
            Status::Active => "active",
            Status::Deleted => "deleted",
            Status::InActive => "inactive",
        };

        let entries: Vec<String> = self
            .timeline
            .entries()
            .iter()
            .map(|wmb| format!("(wm={},off={})", wmb.watermark, wmb.offset))
            .collect();
        let entries_str = if entries.is_empty() {
            "empty".to_string()
        } else {
            entries.join("->")
        };

        write!(f, "{}({})[{}]", name_str, status, entries_str)
    }
}

impl Processor {
    pub fn new(name: Bytes, status: Status, timeline_capacity: usize) -> Self {
        Processor {
            name,
            status: RwLock::new(status),
            timeline: OffsetTimeline::new(timeline_capacity),
        }
    }

    pub fn name(&self) -> &Bytes {
        &self.name
    }

    pub fn status(&self) -> Status {
        *self.status.read()
    }

    /// Set the status of the processor. Moving a processor back towards active is refused.
    pub fn set_status(&self, status: Status) -> Result<()> {
        let mut current = self.status.write();
        if status.rank() < current.rank() {
            return Err(Error::Processor(format!(
                "processor {} cannot move from {:?} to {:?}",
                String::from_utf8_lossy(&self.name),
                *current,
                status
            )));
        }
        *current = status;
        Ok(())
    }

    /// Check if the processor is active.
    pub fn is_active(&self) -> bool {
        self.status() == Status::Active
    }

    /// Check if the processor is deleted.
    pub fn is_deleted(&self) -> bool {
        self.status() == Status::Deleted
    }

    pub fn timeline(&self) -> &OffsetTimeline {
        &self.timeline
    }
}

/// ProcessorManager is the registry of all the processors writing to one edge. Readers always work
/// on a snapshot of the registry, writers go through [ProcessorManager::add_processor] and
/// [ProcessorManager::delete_processor].
#[derive(Clone)]
pub struct ProcessorManager {
    /// Mapping of processor name to processor
    processors: Arc<RwLock<HashMap<Bytes, Arc<Processor>>>>,
    timeline_capacity: usize,
}

impl Debug for ProcessorManager {
    /// Formats as: "{proc1, proc2, ...}" where each processor uses its Debug format
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut proc_infos: Vec<String> = self
            .get_all_processors()
            .iter()
            .map(|p| format!("{:?}", p))
            .collect();
        proc_infos.sort();
        write!(f, "{{{}}}", proc_infos.join(", "))
    }
}

impl Default for ProcessorManager {
    fn default() -> Self {
        Self::new(DEFAULT_TIMELINE_CAPACITY)
    }
}

impl ProcessorManager {
    pub fn new(timeline_capacity: usize) -> Self {
        ProcessorManager {
            processors: Arc::new(RwLock::new(HashMap::new())),
            timeline_capacity,
        }
    }

    /// Creates a ProcessorManager whose processor timelines are sized from the edge config.
    pub fn from_config(config: &EdgeWatermarkConfig) -> Self {
        Self::new(config.timeline_capacity)
    }

    /// Registers an active processor, or returns the one already registered under that name.
    pub fn add_processor(&self, name: impl Into<Bytes>) -> Arc<Processor> {
        let name = name.into();
        let mut processors = self.processors.write();
        if let Some(processor) = processors.get(&name) {
            if processor.is_deleted() {
                warn!(processor = ?name, "Processor is deleted and waiting to be evicted, not reactivating");
            }
            return Arc::clone(processor);
        }

        let processor = Arc::new(Processor::new(
            name.clone(),
            Status::Active,
            self.timeline_capacity,
        ));
        info!(
            processor = ?name,
            timeline_capacity = processor.timeline().capacity(),
            "Processor not found, adding it"
        );
        processors.insert(name, Arc::clone(&processor));
        processor
    }

    pub fn get_processor(&self, name: &[u8]) -> Option<Arc<Processor>> {
        self.processors.read().get(name).map(Arc::clone)
    }

    /// Snapshot of all the processors, the registry can change right after this returns.
    pub fn get_all_processors(&self) -> Vec<Arc<Processor>> {
        self.processors.read().values().map(Arc::clone).collect()
    }

    /// Delete a processor from the processors map, returns whether it was present.
    pub fn delete_processor(&self, name: &[u8]) -> bool {
        self.processors.write().remove(name).is_some()
    }

    /// Removes the given processor only if it is still the one registered under its name. A
    /// processor registered again under the same name after this one was removed is left alone.
    pub fn evict_processor(&self, processor: &Arc<Processor>) -> bool {
        let mut processors = self.processors.write();
        let registered = processors
            .get(processor.name())
            .is_some_and(|registered| Arc::ptr_eq(registered, processor));
        if registered {
            processors.remove(processor.name());
        }
        registered
    }

    pub fn len(&self) -> usize {
        self.processors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.read().is_empty()
    }
}
