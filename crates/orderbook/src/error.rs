//! Order book error types.

use thiserror::Error;

/// Errors that can occur during order book operations.
#[derive(Debug, Error)]
pub enum OrderBookError {
    /// Delta is older than the last applied update. The delta was not
    /// applied; the caller should resynchronize from a fresh snapshot.
    #[error("received data older than last tick: last update {last_update_id}, got {update_id}")]
    SequenceGap { last_update_id: u64, update_id: u64 },

    /// Invalid price level (non-numeric, negative or zero price).
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Invalid quantity (non-numeric or negative quantity).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Payload text could not be decoded.
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl OrderBookError {
    /// Returns true if this error means the book must be resynchronized.
    pub fn requires_resync(&self) -> bool {
        matches!(self, Self::SequenceGap { .. })
    }
}
