//! Local order book built from a snapshot and kept current by deltas.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::{BookConfig, SnapshotMode, TrimPolicy};
use crate::error::OrderBookError;
use crate::level::{LevelUpdate, PriceLevel, Side};
use crate::payload::{BookDelta, BookSnapshot};
use crate::stats::BookStats;

/// Lifecycle of a [`LocalBook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BookState {
    /// Nothing applied yet.
    #[default]
    Empty,
    /// A snapshot has been applied, no delta since.
    Snapshotted,
    /// At least one delta has been applied.
    Streaming,
}

/// Depth-limited view of the book returned by [`LocalBook::book`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    /// All retained levels, descending by price.
    pub data: Vec<PriceLevel>,
    /// Lowest ask price.
    pub best_ask: Option<Decimal>,
    /// Highest bid price.
    pub best_bid: Option<Decimal>,
}

/// Local mirror of one instrument's price-level book.
///
/// - Bids use `Reverse<Decimal>` keys, iteration yields highest price first.
/// - Asks use `Decimal` keys, iteration yields lowest price first.
///
/// A price is the identity of a level: it rests on at most one side. An
/// upsert on one side evicts the same price from the other side, and a
/// deletion removes the price wherever it rests.
///
/// The book performs no locking. Wrap it in a [`SharedBook`](crate::SharedBook)
/// when several threads need it.
#[derive(Debug, Clone)]
pub struct LocalBook {
    config: BookConfig,
    bids: BTreeMap<Reverse<Decimal>, Decimal>,
    asks: BTreeMap<Decimal, Decimal>,
    /// Update id of the last applied snapshot or delta.
    last_update_id: u64,
    state: BookState,
    stats: BookStats,
}

impl Default for LocalBook {
    fn default() -> Self {
        Self::new(BookConfig::default())
    }
}

impl LocalBook {
    /// Creates a new empty book.
    pub fn new(config: BookConfig) -> Self {
        Self {
            config,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            last_update_id: 0,
            state: BookState::Empty,
            stats: BookStats::default(),
        }
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn state(&self) -> BookState {
        self.state
    }

    /// Returns whether a snapshot or delta has been applied.
    pub fn is_initialized(&self) -> bool {
        self.state != BookState::Empty
    }

    /// Returns the update id watermark.
    pub fn last_update_id(&self) -> u64 {
        self.last_update_id
    }

    pub fn stats(&self) -> BookStats {
        self.stats
    }

    /// Applies a full snapshot.
    ///
    /// Under [`SnapshotMode::Accumulate`] the levels are merged into whatever
    /// the book already holds; use [`resync`](Self::resync) or
    /// [`SnapshotMode::Replace`] to start from a clean book. Zero-quantity
    /// pairs are skipped.
    pub fn apply_snapshot(
        &mut self,
        asks: &[LevelUpdate],
        bids: &[LevelUpdate],
        last_update_id: u64,
    ) {
        if self.config.snapshot_mode == SnapshotMode::Replace {
            self.bids.clear();
            self.asks.clear();
        }

        self.last_update_id = last_update_id;
        for (side, price, quantity) in tagged(bids, asks) {
            if !quantity.is_zero() {
                self.upsert(side, price, quantity);
            }
        }

        self.state = BookState::Snapshotted;
        self.stats.snapshots_applied += 1;
        debug!(
            last_update_id,
            asks = asks.len(),
            bids = bids.len(),
            levels = self.len(),
            "snapshot applied"
        );
    }

    /// Applies one delta batch.
    ///
    /// The batch is a transaction in two phases: every deletion
    /// (zero quantity) is applied before any upsert. Within a phase asks are
    /// processed before bids, in payload order.
    ///
    /// Returns [`OrderBookError::SequenceGap`] without touching the book when
    /// update id checks are enabled and `update_id` is below the watermark.
    pub fn apply_delta(
        &mut self,
        update_id: u64,
        bids: &[LevelUpdate],
        asks: &[LevelUpdate],
    ) -> Result<(), OrderBookError> {
        if self.config.check_update_id && update_id < self.last_update_id {
            warn!(
                last_update_id = self.last_update_id,
                update_id, "stale delta rejected, resync required"
            );
            self.stats.deltas_rejected += 1;
            return Err(OrderBookError::SequenceGap {
                last_update_id: self.last_update_id,
                update_id,
            });
        }

        let mut deleted = 0u64;
        for (_, price, _) in tagged(bids, asks).filter(|(_, _, qty)| qty.is_zero()) {
            if self.remove(price) {
                deleted += 1;
            }
        }

        let mut upserted = 0u64;
        for (side, price, quantity) in tagged(bids, asks).filter(|(_, _, qty)| !qty.is_zero()) {
            self.upsert(side, price, quantity);
            upserted += 1;
        }

        self.last_update_id = update_id;
        self.state = BookState::Streaming;
        self.stats.deltas_applied += 1;
        self.stats.levels_deleted += deleted;
        self.stats.levels_upserted += upserted;
        debug!(update_id, deleted, upserted, levels = self.len(), "delta applied");
        Ok(())
    }

    /// Applies a validated snapshot payload.
    pub fn handle_snapshot(&mut self, snapshot: &BookSnapshot) {
        self.apply_snapshot(&snapshot.asks, &snapshot.bids, snapshot.last_update_id);
    }

    /// Applies a validated delta payload.
    pub fn handle_delta(&mut self, delta: &BookDelta) -> Result<(), OrderBookError> {
        self.apply_delta(delta.update_id, &delta.bids, &delta.asks)
    }

    /// Clears the book and applies `snapshot` to it, regardless of the
    /// configured snapshot mode. This is the recovery path after a
    /// [`OrderBookError::SequenceGap`].
    pub fn resync(&mut self, snapshot: &BookSnapshot) {
        self.reset();
        self.handle_snapshot(snapshot);
    }

    /// Clears all levels and returns the book to [`BookState::Empty`].
    /// Statistics are kept.
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.last_update_id = 0;
        self.state = BookState::Empty;
    }

    fn upsert(&mut self, side: Side, price: Decimal, quantity: Decimal) {
        match side {
            Side::Buy => {
                self.asks.remove(&price);
                self.bids.insert(Reverse(price), quantity);
            }
            Side::Sell => {
                self.bids.remove(&Reverse(price));
                self.asks.insert(price, quantity);
            }
        }
    }

    fn remove(&mut self, price: Decimal) -> bool {
        self.asks.remove(&price).is_some() || self.bids.remove(&Reverse(price)).is_some()
    }

    /// Drops levels beyond `max_depth`, returning how many were removed.
    ///
    /// Nothing happens while the book holds at most `max_depth` levels.
    /// Otherwise each side is cut to `max_per_side`: asks from the high-price
    /// end, bids from the low-price end as dictated by the [`TrimPolicy`].
    pub fn trim_to_max_depth(&mut self) -> usize {
        if self.len() <= self.config.max_depth {
            return 0;
        }

        let per_side = self.config.max_per_side();
        let mut removed = 0;

        let excess_bids = self.bids.len().saturating_sub(per_side);
        if excess_bids > 0 {
            match self.config.trim_policy {
                TrimPolicy::Exact => {
                    for _ in 0..excess_bids {
                        self.bids.pop_last();
                    }
                }
                TrimPolicy::Legacy if per_side == 0 => self.bids.clear(),
                TrimPolicy::Legacy => {
                    // The lowest bid survives; the levels just above it go.
                    let lowest = self.bids.pop_last();
                    for _ in 0..excess_bids {
                        self.bids.pop_last();
                    }
                    if let Some((price, quantity)) = lowest {
                        self.bids.insert(price, quantity);
                    }
                }
            }
            removed += excess_bids;
        }

        let excess_asks = self.asks.len().saturating_sub(per_side);
        for _ in 0..excess_asks {
            self.asks.pop_last();
        }
        removed += excess_asks;

        self.stats.levels_trimmed += removed as u64;
        trace!(
            max_depth = self.config.max_depth,
            per_side,
            removed,
            "trimmed to max depth"
        );
        removed
    }

    /// Returns every level as one ladder descending by price, irrespective
    /// of side: highest ask first, lowest bid last.
    pub fn ladder(&self) -> Vec<PriceLevel> {
        let mut asks = self
            .asks
            .iter()
            .rev()
            .map(|(price, qty)| PriceLevel::sell(*price, *qty))
            .peekable();
        let mut bids = self
            .bids
            .iter()
            .map(|(Reverse(price), qty)| PriceLevel::buy(*price, *qty))
            .peekable();

        let mut ladder = Vec::with_capacity(self.len());
        loop {
            let take_ask = match (asks.peek(), bids.peek()) {
                (Some(ask), Some(bid)) => ask.price >= bid.price,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_ask { asks.next() } else { bids.next() };
            ladder.extend(next);
        }
        ladder
    }

    /// Trims to `max_depth` and returns the ladder with best prices.
    pub fn book(&mut self) -> BookView {
        self.trim_to_max_depth();
        BookView {
            data: self.ladder(),
            best_ask: self.best_ask().map(|l| l.price),
            best_bid: self.best_bid().map(|l| l.price),
        }
    }

    /// Returns the best (highest) bid price level.
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids
            .iter()
            .next()
            .map(|(Reverse(price), qty)| PriceLevel::buy(*price, *qty))
    }

    /// Returns the best (lowest) ask price level.
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks
            .iter()
            .next()
            .map(|(price, qty)| PriceLevel::sell(*price, *qty))
    }

    /// Returns the mid price (average of best bid and best ask).
    pub fn mid_price(&self) -> Option<Decimal> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some((bid.price + ask.price) / Decimal::TWO)
    }

    /// Returns the spread (best ask - best bid).
    pub fn spread(&self) -> Option<Decimal> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(ask.price - bid.price)
    }

    /// Returns the spread in basis points of the mid price.
    pub fn spread_bps(&self) -> Option<Decimal> {
        let spread = self.spread()?;
        let mid = self.mid_price()?;
        if mid.is_zero() {
            return None;
        }
        Some(spread / mid * Decimal::from(10000))
    }

    /// Returns true when the best bid is at or above the best ask.
    pub fn is_crossed(&self) -> bool {
        self.spread().is_some_and(|spread| spread <= Decimal::ZERO)
    }

    /// Returns the top N bid price levels (highest to lowest).
    pub fn top_bids(&self, n: usize) -> Vec<PriceLevel> {
        self.bids
            .iter()
            .take(n)
            .map(|(Reverse(price), qty)| PriceLevel::buy(*price, *qty))
            .collect()
    }

    /// Returns the top N ask price levels (lowest to highest).
    pub fn top_asks(&self, n: usize) -> Vec<PriceLevel> {
        self.asks
            .iter()
            .take(n)
            .map(|(price, qty)| PriceLevel::sell(*price, *qty))
            .collect()
    }

    /// Returns the total quantity of all bids at or above `price`.
    pub fn bid_depth_at(&self, price: Decimal) -> Decimal {
        self.bids.range(..=Reverse(price)).map(|(_, qty)| qty).sum()
    }

    /// Returns the total quantity of all asks at or below `price`.
    pub fn ask_depth_at(&self, price: Decimal) -> Decimal {
        self.asks.range(..=price).map(|(_, qty)| qty).sum()
    }

    /// Returns the number of bid levels.
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Returns the number of ask levels.
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Returns the number of levels on both sides.
    pub fn len(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Tags delta or snapshot pairs with their side, asks first.
fn tagged<'a>(
    bids: &'a [LevelUpdate],
    asks: &'a [LevelUpdate],
) -> impl Iterator<Item = (Side, Decimal, Decimal)> + 'a {
    asks.iter()
        .map(|&(price, qty)| (Side::Sell, price, qty))
        .chain(bids.iter().map(|&(price, qty)| (Side::Buy, price, qty)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deep_book() -> LocalBook {
        LocalBook::new(BookConfig::new().with_max_depth(100))
    }

    fn seeded(config: BookConfig) -> LocalBook {
        let mut book = LocalBook::new(config);
        let asks = vec![
            (dec!(101.0), dec!(1.5)),
            (dec!(102.0), dec!(2.5)),
            (dec!(103.0), dec!(3.5)),
        ];
        let bids = vec![
            (dec!(100.0), dec!(1.0)),
            (dec!(99.0), dec!(2.0)),
            (dec!(98.0), dec!(3.0)),
        ];
        book.apply_snapshot(&asks, &bids, 1000);
        book
    }

    #[test]
    fn test_empty_book() {
        let book = LocalBook::default();
        assert_eq!(book.state(), BookState::Empty);
        assert!(!book.is_initialized());
        assert!(book.is_empty());
        assert_eq!(book.last_update_id(), 0);
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
        assert!(book.mid_price().is_none());
        assert!(book.spread().is_none());
        assert!(book.ladder().is_empty());
    }

    #[test]
    fn test_apply_snapshot() {
        let book = seeded(BookConfig::new().with_max_depth(10));

        assert_eq!(book.state(), BookState::Snapshotted);
        assert_eq!(book.last_update_id(), 1000);
        assert_eq!(book.len(), 6);

        let best_bid = book.best_bid().unwrap();
        assert_eq!(best_bid.price, dec!(100.0));
        assert_eq!(best_bid.side, Side::Buy);

        let best_ask = book.best_ask().unwrap();
        assert_eq!(best_ask.price, dec!(101.0));
        assert_eq!(best_ask.quantity, dec!(1.5));

        assert_eq!(book.mid_price(), Some(dec!(100.5)));
        assert_eq!(book.spread(), Some(dec!(1.0)));
        assert!(!book.is_crossed());
    }

    #[test]
    fn test_snapshot_skips_zero_quantity() {
        let mut book = deep_book();
        book.apply_snapshot(&[(dec!(101), dec!(0))], &[(dec!(100), dec!(1))], 5);
        assert_eq!(book.ask_levels(), 0);
        assert_eq!(book.bid_levels(), 1);
    }

    #[test]
    fn test_snapshot_accumulates_by_default() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));
        book.apply_snapshot(&[(dec!(104), dec!(1))], &[(dec!(97), dec!(1))], 2000);

        assert_eq!(book.len(), 8);
        assert_eq!(book.last_update_id(), 2000);
        assert_eq!(book.stats().snapshots_applied, 2);
    }

    #[test]
    fn test_snapshot_replace_mode() {
        let mut book = seeded(
            BookConfig::new()
                .with_max_depth(100)
                .with_snapshot_mode(SnapshotMode::Replace),
        );
        book.apply_snapshot(&[(dec!(104), dec!(1))], &[(dec!(97), dec!(1))], 2000);

        assert_eq!(book.len(), 2);
        assert_eq!(book.best_ask().unwrap().price, dec!(104));
        assert_eq!(book.best_bid().unwrap().price, dec!(97));
    }

    #[test]
    fn test_apply_delta() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));

        book.apply_delta(1001, &[(dec!(100.0), dec!(2.0))], &[(dec!(100.5), dec!(0.5))])
            .unwrap();

        assert_eq!(book.best_bid().unwrap().quantity, dec!(2.0));
        assert_eq!(book.best_ask().unwrap().price, dec!(100.5));
        assert_eq!(book.last_update_id(), 1001);
        assert_eq!(book.state(), BookState::Streaming);
    }

    #[test]
    fn test_delta_removes_zero_quantity() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));

        book.apply_delta(1001, &[(dec!(100.0), dec!(0))], &[]).unwrap();

        assert_eq!(book.best_bid().unwrap().price, dec!(99.0));
        assert_eq!(book.bid_levels(), 2);
    }

    #[test]
    fn test_deleting_missing_price_is_noop() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));
        book.apply_delta(1001, &[(dec!(42), dec!(0))], &[]).unwrap();
        assert_eq!(book.len(), 6);
        assert_eq!(book.stats().levels_deleted, 0);
    }

    #[test]
    fn test_deletions_apply_before_upserts() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));

        // The upsert for 99 comes first in the payload but must survive the
        // deletion listed after it.
        book.apply_delta(1001, &[(dec!(99.0), dec!(7.0)), (dec!(99.0), dec!(0))], &[])
            .unwrap();

        assert_eq!(book.top_bids(2)[1], PriceLevel::buy(dec!(99.0), dec!(7.0)));
    }

    #[test]
    fn test_deletion_ignores_side() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));

        // A zero-quantity bid at an ask price removes the ask.
        book.apply_delta(1001, &[(dec!(101.0), dec!(0))], &[]).unwrap();

        assert_eq!(book.best_ask().unwrap().price, dec!(102.0));
        assert_eq!(book.bid_levels(), 3);
    }

    #[test]
    fn test_upsert_moves_price_across_sides() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));

        book.apply_delta(1001, &[(dec!(101.0), dec!(4.0))], &[]).unwrap();

        assert_eq!(book.ask_levels(), 2);
        assert_eq!(book.bid_levels(), 4);
        assert_eq!(book.best_bid().unwrap(), PriceLevel::buy(dec!(101.0), dec!(4.0)));
        assert_eq!(book.best_ask().unwrap().price, dec!(102.0));
    }

    #[test]
    fn test_bids_win_same_price_within_batch() {
        let mut book = deep_book();
        book.apply_delta(1, &[(dec!(50), dec!(1))], &[(dec!(50), dec!(2))])
            .unwrap();

        assert_eq!(book.len(), 1);
        assert_eq!(book.best_bid().unwrap().quantity, dec!(1));
    }

    #[test]
    fn test_sequence_gap_detection() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));
        let before = book.ladder();

        let result = book.apply_delta(999, &[(dec!(100.0), dec!(0))], &[]);

        assert!(matches!(
            result,
            Err(OrderBookError::SequenceGap {
                last_update_id: 1000,
                update_id: 999
            })
        ));
        assert_eq!(book.ladder(), before);
        assert_eq!(book.last_update_id(), 1000);
        assert_eq!(book.state(), BookState::Snapshotted);
        assert_eq!(book.stats().deltas_rejected, 1);
    }

    #[test]
    fn test_equal_update_id_accepted() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));
        assert!(book.apply_delta(1000, &[], &[]).is_ok());
    }

    #[test]
    fn test_unchecked_book_accepts_older_updates() {
        let mut book = seeded(
            BookConfig::new()
                .with_max_depth(100)
                .with_check_update_id(false),
        );

        book.apply_delta(10, &[(dec!(100.0), dec!(5.0))], &[]).unwrap();

        assert_eq!(book.last_update_id(), 10);
        assert_eq!(book.best_bid().unwrap().quantity, dec!(5.0));
    }

    #[test]
    fn test_delta_on_empty_book() {
        let mut book = deep_book();
        book.apply_delta(7, &[(dec!(10), dec!(1))], &[(dec!(11), dec!(1))])
            .unwrap();
        assert_eq!(book.state(), BookState::Streaming);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_ladder_descending_across_sides() {
        let book = seeded(BookConfig::new().with_max_depth(100));
        let prices: Vec<_> = book.ladder().iter().map(|l| l.price).collect();
        assert_eq!(
            prices,
            vec![dec!(103), dec!(102), dec!(101), dec!(100), dec!(99), dec!(98)]
        );
        let sides: Vec<_> = book.ladder().iter().map(|l| l.side).collect();
        assert_eq!(&sides[..3], &[Side::Sell; 3]);
        assert_eq!(&sides[3..], &[Side::Buy; 3]);
    }

    #[test]
    fn test_ladder_interleaves_crossed_book() {
        let mut book = deep_book();
        book.apply_snapshot(&[(dec!(99), dec!(1))], &[(dec!(100), dec!(1))], 1);

        assert!(book.is_crossed());
        let ladder = book.ladder();
        assert_eq!(ladder[0], PriceLevel::buy(dec!(100), dec!(1)));
        assert_eq!(ladder[1], PriceLevel::sell(dec!(99), dec!(1)));
    }

    #[test]
    fn test_trim_noop_within_depth() {
        let mut book = seeded(BookConfig::new().with_max_depth(6));
        assert_eq!(book.trim_to_max_depth(), 0);
        assert_eq!(book.len(), 6);
    }

    #[test]
    fn test_trim_exact_policy() {
        let mut book = seeded(
            BookConfig::new()
                .with_max_depth(4)
                .with_trim_policy(TrimPolicy::Exact),
        );

        assert_eq!(book.trim_to_max_depth(), 2);
        assert_eq!(
            book.top_bids(10),
            vec![
                PriceLevel::buy(dec!(100.0), dec!(1.0)),
                PriceLevel::buy(dec!(99.0), dec!(2.0))
            ]
        );
        assert_eq!(
            book.top_asks(10),
            vec![
                PriceLevel::sell(dec!(101.0), dec!(1.5)),
                PriceLevel::sell(dec!(102.0), dec!(2.5))
            ]
        );
        assert_eq!(book.stats().levels_trimmed, 2);
    }

    #[test]
    fn test_trim_legacy_policy_keeps_lowest_bid() {
        let mut book = seeded(BookConfig::new().with_max_depth(4));

        assert_eq!(book.trim_to_max_depth(), 2);
        let bids: Vec<_> = book.top_bids(10).iter().map(|l| l.price).collect();
        assert_eq!(bids, vec![dec!(100.0), dec!(98.0)]);
        assert_eq!(book.ask_levels(), 2);
    }

    #[test]
    fn test_trim_zero_depth_empties_book() {
        for policy in [TrimPolicy::Legacy, TrimPolicy::Exact] {
            let mut book = seeded(BookConfig::new().with_trim_policy(policy));
            assert_eq!(book.trim_to_max_depth(), 6);
            assert!(book.is_empty());
        }
    }

    #[test]
    fn test_trim_leaves_short_side_alone() {
        let mut book = LocalBook::new(
            BookConfig::new()
                .with_max_depth(4)
                .with_trim_policy(TrimPolicy::Exact),
        );
        book.apply_snapshot(
            &[(dec!(101), dec!(1))],
            &[
                (dec!(100), dec!(1)),
                (dec!(99), dec!(1)),
                (dec!(98), dec!(1)),
                (dec!(97), dec!(1)),
            ],
            1,
        );

        assert_eq!(book.trim_to_max_depth(), 2);
        assert_eq!(book.ask_levels(), 1);
        assert_eq!(book.bid_levels(), 2);
    }

    #[test]
    fn test_book_view() {
        let mut book = seeded(
            BookConfig::new()
                .with_max_depth(2)
                .with_trim_policy(TrimPolicy::Exact),
        );
        let view = book.book();

        assert_eq!(
            view.data,
            vec![
                PriceLevel::sell(dec!(101.0), dec!(1.5)),
                PriceLevel::buy(dec!(100.0), dec!(1.0)),
            ]
        );
        assert_eq!(view.best_ask, Some(dec!(101.0)));
        assert_eq!(view.best_bid, Some(dec!(100.0)));
    }

    #[test]
    fn test_book_view_legacy_single_level_per_side() {
        let mut book = seeded(BookConfig::new().with_max_depth(2));
        let view = book.book();

        // Only the lowest bid survives when one level per side is kept.
        assert_eq!(
            view.data,
            vec![
                PriceLevel::sell(dec!(101.0), dec!(1.5)),
                PriceLevel::buy(dec!(98.0), dec!(3.0)),
            ]
        );
        assert_eq!(view.best_bid, Some(dec!(98.0)));
    }

    #[test]
    fn test_book_view_serializes_camel_case() {
        let mut book = seeded(
            BookConfig::new()
                .with_max_depth(2)
                .with_trim_policy(TrimPolicy::Exact),
        );
        let json = serde_json::to_value(book.book()).unwrap();
        assert_eq!(json["bestAsk"], "101.0");
        assert_eq!(json["bestBid"], "100.0");
        assert_eq!(json["data"][0]["side"], "SELL");
    }

    #[test]
    fn test_top_levels() {
        let book = seeded(BookConfig::new().with_max_depth(100));

        let top_bids = book.top_bids(2);
        assert_eq!(top_bids.len(), 2);
        assert_eq!(top_bids[0].price, dec!(100.0));
        assert_eq!(top_bids[1].price, dec!(99.0));

        let top_asks = book.top_asks(2);
        assert_eq!(top_asks[0].price, dec!(101.0));
        assert_eq!(top_asks[1].price, dec!(102.0));
    }

    #[test]
    fn test_spread_bps() {
        let mut book = deep_book();
        book.apply_snapshot(&[(dec!(101.0), dec!(1.0))], &[(dec!(100.0), dec!(1.0))], 1);

        // Spread = 1.0, mid = 100.5
        let spread_bps = book.spread_bps().unwrap();
        assert!(spread_bps > dec!(99) && spread_bps < dec!(100));
    }

    #[test]
    fn test_depth_at_price() {
        let book = seeded(BookConfig::new().with_max_depth(100));

        // Bids >= 99.0
        assert_eq!(book.bid_depth_at(dec!(99.0)), dec!(3.0));
        // Asks <= 102.0
        assert_eq!(book.ask_depth_at(dec!(102.0)), dec!(4.0));
    }

    #[test]
    fn test_reset() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));
        book.reset();

        assert_eq!(book.state(), BookState::Empty);
        assert!(book.is_empty());
        assert_eq!(book.last_update_id(), 0);
        assert_eq!(book.stats().snapshots_applied, 1);
    }

    #[test]
    fn test_resync_replaces_content() {
        let mut book = seeded(BookConfig::new().with_max_depth(100));
        let snapshot = BookSnapshot::new(vec![(dec!(201), dec!(1))], vec![(dec!(200), dec!(1))], 5000);

        book.resync(&snapshot);

        assert_eq!(book.len(), 2);
        assert_eq!(book.last_update_id(), 5000);
        assert_eq!(book.state(), BookState::Snapshotted);
    }

    #[test]
    fn test_prices_differing_in_low_digits_stay_distinct() {
        let mut book = deep_book();
        let bids = vec![
            (dec!(0.00000003), dec!(3.0)),
            (dec!(0.00000002), dec!(2.0)),
            (dec!(0.00000001), dec!(1.0)),
        ];
        book.apply_snapshot(&[], &bids, 1000);

        assert_eq!(book.bid_levels(), 3);
        let top = book.top_bids(3);
        assert_eq!(top[0].price, dec!(0.00000003));
        assert_eq!(top[2].price, dec!(0.00000001));
    }

    #[test]
    fn test_equal_decimals_with_different_scale_share_a_level() {
        let mut book = deep_book();
        book.apply_snapshot(&[(dec!(481.590), dec!(1))], &[], 1);
        book.apply_delta(2, &[], &[(dec!(481.59), dec!(3))]).unwrap();

        assert_eq!(book.ask_levels(), 1);
        assert_eq!(book.best_ask().unwrap().quantity, dec!(3));
    }
}
