//! Scrolling history of index readings
//!
//! The buffer is exactly as wide as the display is in pixels, so column `i`
//! of the graph always shows `snapshot()[i]`. New readings enter on the right
//! and the oldest reading falls off the left edge.

extern crate alloc;

use alloc::vec::Vec;
use thiserror_no_std::Error;

/// One derived air-quality index sample.
///
/// Not clamped at ingestion; out-of-range values are the mapping's problem.
pub type Reading = i32;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("History capacity must be at least one reading")]
    ZeroCapacity,
    #[error("Failed to allocate history for {capacity} readings")]
    Allocation { capacity: usize },
}

/// Fixed-capacity, oldest-first sequence of the last W readings.
///
/// Ingest shifts the whole buffer left by one slot (O(W)). W is a display
/// width, so this stays in the tens to low hundreds of elements, and ingest
/// runs at most once per sensor sample period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryBuffer {
    values: Vec<Reading>,
}

impl HistoryBuffer {
    /// Allocate a history of `capacity` readings, all zero.
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        Self::with_baseline(capacity, 0)
    }

    /// Allocate a history of `capacity` readings, all set to `baseline`.
    ///
    /// The reservation is fallible so that an oversized width is reported
    /// instead of aborting inside the allocator.
    pub fn with_baseline(capacity: usize, baseline: Reading) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::ZeroCapacity);
        }

        let mut values = Vec::new();
        values
            .try_reserve_exact(capacity)
            .map_err(|_| HistoryError::Allocation { capacity })?;
        values.resize(capacity, baseline);

        Ok(Self { values })
    }

    /// Drop the oldest reading and append `value` as the newest.
    pub fn ingest(&mut self, value: Reading) {
        self.values.copy_within(1.., 0);
        if let Some(newest) = self.values.last_mut() {
            *newest = value;
        }
    }

    /// All readings, oldest first. Always exactly `capacity()` long.
    pub fn snapshot(&self) -> &[Reading] {
        &self.values
    }

    /// Number of readings held (the display width).
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// The most recently ingested reading (or the baseline before any ingest).
    pub fn latest(&self) -> Reading {
        // Non-empty by construction
        self.values[self.values.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = Reading> + '_ {
        self.values.iter().copied()
    }
}
