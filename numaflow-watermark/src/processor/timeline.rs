use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;

use parking_lot::RwLock;
use tracing::{debug, error, warn};

use crate::wmb::WMB;

/// OffsetTimeline is to store the event time to the offset records.
/// Our list is sorted by event time from highest to lowest, and since offsets and watermarks only
/// move forward together it is sorted by offset from highest to lowest as well.
///
/// Only the newest `capacity` WMBs are kept, plus the very first WMB ever published. Lookups older
/// than the retained window fall back to that first WMB, whose watermark is never above the one
/// actually published at the offset.
pub struct OffsetTimeline {
    watermarks: RwLock<Watermarks>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Watermarks {
    /// Newest first.
    retained: VecDeque<WMB>,
    /// First WMB put into the timeline, kept after it falls out of `retained`.
    first: Option<WMB>,
}

impl OffsetTimeline {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        OffsetTimeline {
            watermarks: RwLock::new(Watermarks {
                retained: VecDeque::with_capacity(capacity),
                first: None,
            }),
            capacity,
        }
    }

    /// Put inserts the WMB into list. It ensures that the list will remain sorted after the insert.
    pub fn put(&self, node: WMB) {
        let mut watermarks = self.watermarks.write();
        let Watermarks { retained, first } = &mut *watermarks;

        let Some(head) = retained.front_mut() else {
            if first.is_none() {
                *first = Some(node);
            }
            retained.push_front(node);
            return;
        };

        // Different cases:
        // 1. Watermark is the same but the offset is larger - we should store the larger offset
        // 2. Watermark is the same but the offset is smaller - we should skip
        // 3. Watermark is larger and the offset is larger - we should store the larger offset and the watermark
        // 4. Watermark is larger but the offset is smaller - should not happen (offset should be increasing)
        // 5. Watermark is smaller - should not happen (watermark should be increasing)
        match (
            node.watermark.cmp(&head.watermark),
            node.offset.cmp(&head.offset),
        ) {
            (Ordering::Equal, Ordering::Greater) => {
                head.offset = node.offset;
                head.idle = node.idle;
            }
            (Ordering::Equal, _) => {
                warn!(
                    offset = node.offset,
                    head_offset = head.offset,
                    "Watermark the same but input offset not larger than the existing offset - skipping"
                );
            }
            (Ordering::Greater, Ordering::Greater) => {
                retained.push_front(node);
                if retained.len() > self.capacity {
                    retained.pop_back();
                }
            }
            (Ordering::Greater, _) => {
                error!(
                    offset = node.offset,
                    head_offset = head.offset,
                    "The new input offset should never be smaller than the existing offset"
                );
            }
            (Ordering::Less, _) => {
                debug!(
                    watermark = node.watermark,
                    head_watermark = head.watermark,
                    "Watermark smaller than the head watermark - ignoring"
                );
            }
        }
    }

    /// Returns the offset of the head WMB, `None` if nothing has been published yet.
    pub fn head_offset(&self) -> Option<i64> {
        self.watermarks.read().retained.front().map(|w| w.offset)
    }

    pub fn head_wmb(&self) -> Option<WMB> {
        self.watermarks.read().retained.front().copied()
    }

    /// Returns the event time of the nearest WMB whose offset is less than or equal to the input
    /// offset, `None` if nothing was published at or before the input offset.
    pub fn event_time(&self, input_offset: i64) -> Option<i64> {
        let watermarks = self.watermarks.read();
        watermarks
            .retained
            .iter()
            .find(|w| w.offset <= input_offset)
            .or_else(|| watermarks.first.as_ref().filter(|w| w.offset <= input_offset))
            .map(|w| w.watermark)
    }

    /// Snapshot of the retained entries, newest first.
    pub fn entries(&self) -> Vec<WMB> {
        self.watermarks.read().retained.iter().copied().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Debug for OffsetTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OffsetTimeline {{ capacity: {}, watermarks: {:?} }}",
            self.capacity,
            self.watermarks.read()
        )
    }
}
