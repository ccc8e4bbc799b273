//! Processor is an entity which can emit watermarks, it could be a pod or a partition. Each processor
//! has an offset timeline to track the offsets and watermarks it has published. At the Vn vertex we
//! have to track all the Vn-1 processors writing to the edge, and looking at all of them and their
//! timelines the fetcher determines the watermark for the read offset.

/// manager for managing the processors (pod or partition).
pub mod manager;

/// offset timeline for tracking processor offsets and watermarks.
pub mod timeline;
