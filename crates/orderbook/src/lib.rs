//! Local order book mirror for market depth tracking.
//!
//! A [`LocalBook`] is seeded from one full snapshot and kept current by
//! incremental deltas. Deltas older than the last applied update are rejected
//! with [`OrderBookError::SequenceGap`]; the caller then resynchronizes from a
//! fresh snapshot. Reads return a depth-limited ladder sorted by price along
//! with the best bid and ask.
//!
//! # Example
//!
//! ```rust
//! use local_book::{parse_delta, parse_snapshot, BookConfig, LocalBook};
//!
//! let mut book = LocalBook::new(BookConfig::new().with_max_depth(10));
//!
//! let snapshot = parse_snapshot(
//!     r#"{"lastUpdateId": 100, "asks": [["101.5", "2"]], "bids": [["101.0", "1"]]}"#,
//! )?;
//! book.handle_snapshot(&snapshot);
//!
//! let delta = parse_delta(r#"{"u": 101, "b": [["101.2", "3"]], "a": []}"#)?;
//! book.handle_delta(&delta)?;
//!
//! let view = book.book();
//! println!("Best bid: {:?}", view.best_bid);
//! println!("Best ask: {:?}", view.best_ask);
//! # Ok::<(), local_book::OrderBookError>(())
//! ```

mod book;
mod config;
mod error;
mod level;
mod payload;
mod shared;
mod stats;

pub use book::{BookState, BookView, LocalBook};
pub use config::{BookConfig, ParseSnapshotModeError, ParseTrimPolicyError, SnapshotMode, TrimPolicy};
pub use error::OrderBookError;
pub use level::{LevelUpdate, PriceLevel, Side};
pub use payload::{
    decode_levels, parse_delta, parse_snapshot, BookDelta, BookSnapshot, RawDelta, RawLevel,
    RawNumber, RawSnapshot,
};
pub use shared::SharedBook;
pub use stats::BookStats;
