//! Price level representation.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A decoded `[price, quantity]` pair as carried by snapshots and deltas.
pub type LevelUpdate = (Decimal, Decimal);

/// Side of the book a level rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Bid side.
    Buy,
    /// Ask side.
    Sell,
}

impl Side {
    /// Returns the other side of the book.
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A single price level in the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// The price at this level.
    pub price: Decimal,
    /// Which side of the book holds this level.
    pub side: Side,
    /// The total quantity available at this price.
    pub quantity: Decimal,
}

impl PriceLevel {
    /// Creates a new price level.
    pub fn new(price: Decimal, side: Side, quantity: Decimal) -> Self {
        Self {
            price,
            side,
            quantity,
        }
    }

    /// Creates a bid level.
    pub fn buy(price: Decimal, quantity: Decimal) -> Self {
        Self::new(price, Side::Buy, quantity)
    }

    /// Creates an ask level.
    pub fn sell(price: Decimal, quantity: Decimal) -> Self {
        Self::new(price, Side::Sell, quantity)
    }

    /// Returns the notional value (price * quantity) at this level.
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }
}
