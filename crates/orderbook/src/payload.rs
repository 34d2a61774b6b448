//! Snapshot and delta payloads.
//!
//! Exchange feeds deliver `[price, quantity]` pairs as JSON numbers or as
//! numeric strings. The `Raw*` types mirror that shape; converting them into
//! [`BookSnapshot`] / [`BookDelta`] parses every pair into a `Decimal` and
//! rejects values the book must never see.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::OrderBookError;
use crate::level::LevelUpdate;

/// A price or quantity as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Text(String),
    Number(serde_json::Number),
}

impl RawNumber {
    /// Parses the value into a normalized decimal, `None` if not numeric.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Text(text) => parse_decimal(text),
            Self::Number(number) => parse_decimal(&number.to_string()),
        }
    }
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
        .map(|d| d.normalize())
}

/// A `[price, quantity]` pair before validation.
pub type RawLevel = (RawNumber, RawNumber);

/// Full book snapshot as returned by a depth endpoint.
///
/// Unknown fields (`E`, `T`, ...) are ignored and missing ones default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSnapshot {
    pub asks: Vec<RawLevel>,
    pub bids: Vec<RawLevel>,
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
}

/// Incremental depth event. A missing `u` defaults to 0.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDelta {
    #[serde(rename = "u")]
    pub update_id: u64,
    #[serde(rename = "b")]
    pub bids: Vec<RawLevel>,
    #[serde(rename = "a")]
    pub asks: Vec<RawLevel>,
}

/// Validated snapshot ready to be applied to a book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSnapshot {
    pub asks: Vec<LevelUpdate>,
    pub bids: Vec<LevelUpdate>,
    pub last_update_id: u64,
}

impl BookSnapshot {
    pub fn new(asks: Vec<LevelUpdate>, bids: Vec<LevelUpdate>, last_update_id: u64) -> Self {
        Self {
            asks,
            bids,
            last_update_id,
        }
    }
}

/// Validated delta ready to be applied to a book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDelta {
    pub update_id: u64,
    pub bids: Vec<LevelUpdate>,
    pub asks: Vec<LevelUpdate>,
}

impl BookDelta {
    pub fn new(update_id: u64, bids: Vec<LevelUpdate>, asks: Vec<LevelUpdate>) -> Self {
        Self {
            update_id,
            bids,
            asks,
        }
    }
}

impl TryFrom<RawSnapshot> for BookSnapshot {
    type Error = OrderBookError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        Ok(Self {
            asks: decode_levels(&raw.asks)?,
            bids: decode_levels(&raw.bids)?,
            last_update_id: raw.last_update_id,
        })
    }
}

impl TryFrom<RawDelta> for BookDelta {
    type Error = OrderBookError;

    fn try_from(raw: RawDelta) -> Result<Self, Self::Error> {
        Ok(Self {
            update_id: raw.update_id,
            bids: decode_levels(&raw.bids)?,
            asks: decode_levels(&raw.asks)?,
        })
    }
}

/// Parse and validate raw pairs. Prices must be positive, quantities
/// non-negative (zero marks a deletion).
pub fn decode_levels(levels: &[RawLevel]) -> Result<Vec<LevelUpdate>, OrderBookError> {
    levels
        .iter()
        .map(|(price, qty)| decode_level(price, qty))
        .collect()
}

fn decode_level(price: &RawNumber, qty: &RawNumber) -> Result<LevelUpdate, OrderBookError> {
    let p = price
        .to_decimal()
        .filter(|p| p.is_sign_positive() && !p.is_zero())
        .ok_or_else(|| OrderBookError::InvalidPrice(price.to_string()))?;
    let q = qty
        .to_decimal()
        .filter(|q| q.is_zero() || q.is_sign_positive())
        .ok_or_else(|| OrderBookError::InvalidQuantity(qty.to_string()))?;
    Ok((p, q))
}

/// Decode and validate a snapshot from JSON text.
pub fn parse_snapshot(text: &str) -> Result<BookSnapshot, OrderBookError> {
    let raw: RawSnapshot = serde_json::from_str(text)?;
    raw.try_into()
}

/// Decode and validate a delta from JSON text.
pub fn parse_delta(text: &str) -> Result<BookDelta, OrderBookError> {
    let raw: RawDelta = serde_json::from_str(text)?;
    raw.try_into()
}
