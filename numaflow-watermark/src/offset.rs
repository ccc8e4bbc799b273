//! Offsets of the messages read from an edge. The watermark fetcher only cares that an offset can be
//! turned into a monotonically increasing sequence number.

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};

/// Sequence extracts the monotonically increasing sequence number of an offset.
pub trait Sequence {
    fn sequence(&self) -> Result<i64>;
}

impl Sequence for i64 {
    fn sequence(&self) -> Result<i64> {
        Ok(*self)
    }
}

/// Offset of a message read from the ISB partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Offset {
    Int(IntOffset),
    String(StringOffset),
}

impl Offset {
    pub fn partition_idx(&self) -> u16 {
        match self {
            Offset::Int(offset) => offset.partition_idx,
            Offset::String(offset) => offset.partition_idx,
        }
    }
}

impl Sequence for Offset {
    fn sequence(&self) -> Result<i64> {
        match self {
            Offset::Int(offset) => offset.sequence(),
            Offset::String(offset) => offset.sequence(),
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Int(offset) => write!(f, "{offset}"),
            Offset::String(offset) => write!(f, "{offset}"),
        }
    }
}

impl Default for Offset {
    fn default() -> Self {
        Offset::Int(Default::default())
    }
}

/// IntOffset is integer based offset, the sequence is the offset itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntOffset {
    pub offset: i64,
    pub partition_idx: u16,
}

impl IntOffset {
    pub fn new(seq: i64, partition_idx: u16) -> Self {
        Self {
            offset: seq,
            partition_idx,
        }
    }
}

impl Sequence for IntOffset {
    fn sequence(&self) -> Result<i64> {
        Ok(self.offset)
    }
}

impl PartialOrd for IntOffset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntOffset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl fmt::Display for IntOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.offset, self.partition_idx)
    }
}

/// StringOffset is string based offset, the sequence has to be parsed out of the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringOffset {
    pub offset: Bytes,
    pub partition_idx: u16,
}

impl StringOffset {
    pub fn new(seq: String, partition_idx: u16) -> Self {
        Self {
            offset: seq.into(),
            partition_idx,
        }
    }
}

impl Sequence for StringOffset {
    fn sequence(&self) -> Result<i64> {
        let seq = std::str::from_utf8(&self.offset)
            .map_err(|e| Error::Offset(format!("offset is not valid utf-8: {e}")))?;
        seq.trim()
            .parse::<i64>()
            .map_err(|e| Error::Offset(format!("failed to parse sequence from {seq:?}: {e}")))
    }
}

impl fmt::Display for StringOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            String::from_utf8_lossy(&self.offset),
            self.partition_idx
        )
    }
}
