//! Watermark of an edge of the pipeline. The processors (pods or partitions) of the upstream vertex
//! publish their watermark progression as [WMB]s, the [ProcessorManager] keeps track of those
//! processors and their [OffsetTimeline]s, and the [EdgeFetcher] combines them into the watermark of
//! the edge for a read offset.
//!
//! The discovery of processors (heartbeats, KV watchers) lives outside this crate, it only drives the
//! [ProcessorManager] API.
//!
//! [OffsetTimeline]: processor::timeline::OffsetTimeline

pub mod error;
pub use error::{Error, Result};

/// Configuration of the edge watermark, loaded from the environment.
pub mod config;

/// Offsets and the sequence extraction the fetcher relies on.
pub mod offset;

/// Watermark and the watermark block published by the processors.
pub mod wmb;

/// Processors writing to an edge and their offset timelines.
pub mod processor;

/// Edge watermark fetcher.
pub mod fetcher;

pub use config::EdgeWatermarkConfig;
pub use fetcher::{EdgeFetcher, Fetcher};
pub use offset::{IntOffset, Offset, Sequence, StringOffset};
pub use processor::manager::{Processor, ProcessorManager, Status};
pub use wmb::{WMB, Watermark};
