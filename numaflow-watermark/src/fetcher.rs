//! Fetches the watermark of an edge. Multiple processors write to the same edge and each of them
//! progresses its own event time, the fetcher combines their offset timelines into one watermark.
//!
//! There are two flavors:
//! - [Fetcher::fetch_watermark] is the watermark at a read offset: the smallest event time any
//!   processor (active or not) had published at or before that offset. This is the value the
//!   downstream vertex relies on, and it is also where deleted processors get evicted from the
//!   [ProcessorManager] once the reader has moved past their head offset.
//! - [Fetcher::fetch_head_watermark] is the event time at the largest head offset among the active
//!   processors. It is only for showing progress (UX, daemon) and should never be used to decide
//!   whether data is late.
//!
//! The eviction relies on the offsets passed to [Fetcher::fetch_watermark] never going backwards for
//! a given reader. Once a deleted processor's whole timeline is behind the read offset, no later call
//! can need it again.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::EdgeWatermarkConfig;
use crate::offset::Sequence;
use crate::processor::manager::ProcessorManager;
use crate::wmb::{WMB, Watermark};

/// Fetcher fetches the watermark of an edge.
pub trait Fetcher {
    /// Returns the watermark for the given read offset. Offsets passed by the same reader must be
    /// non-decreasing. Never fails, an offset without a sequence yields [Watermark::unknown].
    fn fetch_watermark(&self, offset: &dyn Sequence) -> Watermark;

    /// Returns the watermark at the head of the edge, for display only.
    fn fetch_head_watermark(&self) -> Watermark;
}

/// EdgeFetcher is the watermark fetcher for a single incoming edge.
pub struct EdgeFetcher {
    edge_name: String,
    /// Processors writing to this edge.
    processor_manager: ProcessorManager,
}

impl EdgeFetcher {
    /// Creates an EdgeFetcher along with the ProcessorManager for the edge, the discovery side
    /// registers processors through [EdgeFetcher::processor_manager].
    pub fn from_config(config: &EdgeWatermarkConfig) -> Self {
        Self::new(config, ProcessorManager::from_config(config))
    }

    /// Creates a new EdgeFetcher, `processor_manager` has the details about the processors responsible
    /// for writing to this edge.
    pub fn new(config: &EdgeWatermarkConfig, processor_manager: ProcessorManager) -> Self {
        EdgeFetcher {
            edge_name: config.edge_name.clone(),
            processor_manager,
        }
    }

    pub fn edge_name(&self) -> &str {
        &self.edge_name
    }

    pub fn processor_manager(&self) -> &ProcessorManager {
        &self.processor_manager
    }

    /// Fetches the head idle WMB of the edge. Returns the idle WMB with the smallest watermark among
    /// the active processors, but only if every active processor is idling.
    pub fn fetch_head_idle_wmb(&self) -> Option<WMB> {
        let mut min_wmb: Option<WMB> = None;

        for processor in self
            .processor_manager
            .get_all_processors()
            .iter()
            .filter(|p| p.is_active())
        {
            match processor.timeline().head_wmb() {
                Some(wmb) if wmb.idle => {
                    if min_wmb.is_none_or(|min| wmb.watermark < min.watermark) {
                        min_wmb = Some(wmb);
                    }
                }
                // if any of the processors are not idling, there is no idle watermark
                _ => return None,
            }
        }

        min_wmb
    }

    fn to_watermark(&self, epoch: Option<i64>) -> Watermark {
        let Some(epoch) = epoch else {
            return Watermark::unknown();
        };
        Watermark::from_timestamp_millis(epoch).unwrap_or_else(|e| {
            error!(edge = %self.edge_name, epoch, error = ?e, "Published event time is not a valid watermark");
            Watermark::unknown()
        })
    }
}

impl Fetcher for EdgeFetcher {
    fn fetch_watermark(&self, input_offset: &dyn Sequence) -> Watermark {
        let offset = match input_offset.sequence() {
            Ok(offset) => offset,
            Err(e) => {
                error!(edge = %self.edge_name, error = ?e, "Unable to get sequence from the offset");
                return Watermark::unknown();
            }
        };

        let processors = self.processor_manager.get_all_processors();
        let mut epoch: Option<i64> = None;
        let mut processors_to_delete = Vec::new();

        for processor in processors.iter() {
            // the smallest event time among the processors at this offset is the watermark
            if let Some(t) = processor.timeline().event_time(offset)
                && epoch.is_none_or(|e| t < e)
            {
                epoch = Some(t);
            }

            // if the processor is deleted and the read offset is ahead of everything in its
            // timeline, nothing it published can matter anymore
            if processor.is_deleted()
                && processor
                    .timeline()
                    .head_offset()
                    .is_none_or(|head_offset| offset > head_offset)
            {
                processors_to_delete.push(Arc::clone(processor));
            }
        }

        for processor in processors_to_delete {
            if self.processor_manager.evict_processor(&processor) {
                info!(edge = %self.edge_name, processor = ?processor.name(), offset, "Processor deleted and read offset is past its head, evicting");
            }
        }

        let watermark = self.to_watermark(epoch);
        debug!(
            edge = %self.edge_name,
            offset,
            %watermark,
            processors = ?processors,
            "Fetched watermark"
        );
        watermark
    }

    fn fetch_head_watermark(&self) -> Watermark {
        let processors = self.processor_manager.get_all_processors();
        let mut head: Option<(i64, Option<i64>)> = None;

        for processor in processors.iter().filter(|p| p.is_active()) {
            let Some(head_offset) = processor.timeline().head_offset() else {
                continue;
            };
            if head.is_none_or(|(offset, _)| head_offset > offset) {
                head = Some((
                    head_offset,
                    processor.timeline().event_time(head_offset),
                ));
            }
        }

        let watermark = self.to_watermark(head.and_then(|(_, epoch)| epoch));
        debug!(
            edge = %self.edge_name,
            head_offset = ?head.map(|(offset, _)| offset),
            %watermark,
            processors = ?processors,
            "Fetched head watermark"
        );
        watermark
    }
}
