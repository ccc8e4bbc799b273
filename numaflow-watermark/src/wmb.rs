use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// WMB is the watermark block published by a processor. Each entry in an
/// [crate::processor::timeline::OffsetTimeline] is a WMB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub struct WMB {
    /// Offset written by the processor when the watermark was published.
    pub offset: i64,
    /// Event time (epoch millis) the processor has progressed to at `offset`.
    pub watermark: i64,
    /// Whether the processor had no data and advanced the watermark while idling.
    pub idle: bool,
}

/// Watermark is a monotonically increasing event time. An unknown watermark means no processor
/// has given us enough information yet, and it always sorts below every known watermark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Watermark(Option<DateTime<Utc>>);

impl Watermark {
    /// The watermark reported when nothing is known yet.
    pub const fn unknown() -> Self {
        Watermark(None)
    }

    /// Creates a watermark from epoch milliseconds.
    pub fn from_timestamp_millis(millis: i64) -> Result<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|t| Watermark(Some(t)))
            .ok_or_else(|| Error::Watermark(format!("timestamp {millis}ms is out of range")))
    }

    /// Whether any processor has published an event time yet.
    pub fn is_known(&self) -> bool {
        self.0.is_some()
    }

    /// Epoch milliseconds of the watermark, `None` when it is unknown.
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.0.map(|t| t.timestamp_millis())
    }

    /// The watermark as a UTC timestamp, `None` when it is unknown.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}

impl From<DateTime<Utc>> for Watermark {
    fn from(value: DateTime<Utc>) -> Self {
        Watermark(Some(value))
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(t) => write!(f, "{}", t.to_rfc3339()),
            None => write!(f, "unknown"),
        }
    }
}
