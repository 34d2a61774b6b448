//! Thread-safe handle around a single book.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::book::{BookView, LocalBook};
use crate::config::BookConfig;
use crate::error::OrderBookError;
use crate::level::LevelUpdate;
use crate::payload::{BookDelta, BookSnapshot};

/// Shared handle to one instrument's [`LocalBook`].
///
/// Every call takes the lock for its whole duration, so snapshots, deltas
/// and reads are serialized. Clones refer to the same book.
#[derive(Debug, Clone)]
pub struct SharedBook {
    inner: Arc<Mutex<LocalBook>>,
}

impl SharedBook {
    pub fn new(config: BookConfig) -> Self {
        Self::from_book(LocalBook::new(config))
    }

    pub fn from_book(book: LocalBook) -> Self {
        Self {
            inner: Arc::new(Mutex::new(book)),
        }
    }

    pub fn apply_snapshot(&self, asks: &[LevelUpdate], bids: &[LevelUpdate], last_update_id: u64) {
        self.inner.lock().apply_snapshot(asks, bids, last_update_id);
    }

    pub fn apply_delta(
        &self,
        update_id: u64,
        bids: &[LevelUpdate],
        asks: &[LevelUpdate],
    ) -> Result<(), OrderBookError> {
        self.inner.lock().apply_delta(update_id, bids, asks)
    }

    pub fn handle_snapshot(&self, snapshot: &BookSnapshot) {
        self.inner.lock().handle_snapshot(snapshot);
    }

    pub fn handle_delta(&self, delta: &BookDelta) -> Result<(), OrderBookError> {
        self.inner.lock().handle_delta(delta)
    }

    /// Clears the book and applies `snapshot`.
    pub fn resync(&self, snapshot: &BookSnapshot) {
        self.inner.lock().resync(snapshot);
    }

    /// Trims and returns the current view.
    pub fn book(&self) -> BookView {
        self.inner.lock().book()
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.inner.lock().best_bid().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.inner.lock().best_ask().map(|l| l.price)
    }

    pub fn last_update_id(&self) -> u64 {
        self.inner.lock().last_update_id()
    }

    /// Runs `f` with read access to the book.
    pub fn with<R>(&self, f: impl FnOnce(&LocalBook) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Runs `f` with write access to the book.
    pub fn update<R>(&self, f: impl FnOnce(&mut LocalBook) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl Default for SharedBook {
    fn default() -> Self {
        Self::new(BookConfig::default())
    }
}
