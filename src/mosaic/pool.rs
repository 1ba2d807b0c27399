//! Per-request reservation pool.
//!
//! A pool starts as a full copy of the tile corpus. Every successful
//! [`ReservationPool::take_nearest`] removes the tile it returns, so within one
//! mosaic no tile is handed out twice, no matter how many region tasks share
//! the pool.
//!
//! # Tie-break
//!
//! Entries are kept in a `BTreeMap` and scanned in identifier order; the first
//! entry at the minimum distance wins. Among equidistant tiles the
//! lexicographically smallest identifier is therefore always chosen.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::MosaicError;
use crate::source::TileId;

use super::signature::ColorSignature;

/// Consumable set of tiles shared by the region tasks of one mosaic.
#[derive(Debug)]
pub struct ReservationPool {
    entries: Mutex<BTreeMap<TileId, ColorSignature>>,
    initial_len: usize,
}

impl ReservationPool {
    pub fn new(entries: BTreeMap<TileId, ColorSignature>) -> Self {
        Self {
            initial_len: entries.len(),
            entries: Mutex::new(entries),
        }
    }

    /// Find the tile closest to `target` and remove it from the pool.
    ///
    /// The scan and the removal run under one lock, so concurrent callers
    /// never see the same tile and never observe a half-updated pool.
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::PoolExhausted`] when no tiles remain.
    pub fn take_nearest(&self, target: &ColorSignature) -> Result<TileId, MosaicError> {
        let mut entries = self.lock();

        let mut best: Option<(&TileId, f64)> = None;
        for (id, sig) in entries.iter() {
            let distance = target.distance(sig);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((id, distance)),
            }
        }

        let id = best
            .map(|(id, _)| id.clone())
            .ok_or(MosaicError::PoolExhausted)?;
        entries.remove(&id);
        Ok(id)
    }

    /// Number of tiles still available.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of tiles the pool started with.
    pub fn initial_len(&self) -> usize {
        self.initial_len
    }

    /// Number of tiles handed out so far.
    pub fn taken(&self) -> usize {
        self.initial_len - self.len()
    }

    // A panic in another holder cannot leave the map half-updated: removal is
    // the last step of the critical section.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<TileId, ColorSignature>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Tests
// =============================================================================
