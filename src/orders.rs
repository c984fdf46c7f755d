//! Order and quote value types shared by every strategy.

use crate::decimal::Decimal;

/// Order side. `Bid` buys, `Ask` sells — numeric values match the wire's
/// tag 54 encoding (1/2) so callers can write `side as u8` directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Bid = 1,
    Ask = 2,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    pub fn from_tag(value: u32) -> Option<Side> {
        match value {
            1 => Some(Side::Bid),
            2 => Some(Side::Ask),
            _ => None,
        }
    }
}

/// A single working or planned order. Price/volume precision is fixed by
/// the caller's chosen `Decimal<P>` instantiation.
#[derive(Clone, Debug, Default)]
pub struct Order<const PP: u32, const VP: u32> {
    pub symbol: String,
    pub price: Decimal<PP>,
    pub volume: Decimal<VP>,
    pub side: Option<Side>,
    pub is_limit: bool,
    pub is_fok: bool,
    pub take_profit: bool,
    pub is_filled: bool,
    pub is_in_flight: bool,
    pub order_id: String,
}

impl<const PP: u32, const VP: u32> Order<PP, VP> {
    pub fn new(symbol: impl Into<String>, price: Decimal<PP>, volume: Decimal<VP>, side: Side) -> Self {
        Order {
            symbol: symbol.into(),
            price,
            volume,
            side: Some(side),
            is_limit: true,
            is_fok: false,
            take_profit: false,
            is_filled: false,
            is_in_flight: false,
            order_id: String::new(),
        }
    }

    pub fn market_fok(symbol: impl Into<String>, price: Decimal<PP>, volume: Decimal<VP>, side: Side) -> Self {
        Order {
            is_limit: false,
            is_fok: true,
            ..Order::new(symbol, price, volume, side)
        }
    }
}

/// A quote leg as emitted by the convergence strategy: lighter weight than
/// `Order` since it carries no lifecycle bookkeeping, just what goes on the
/// wire.
#[derive(Clone, Copy, Debug)]
pub struct SingleQuote<const PP: u32, const VP: u32> {
    pub price: Decimal<PP>,
    pub volume: Decimal<VP>,
    pub side: Side,
    pub take_profit: bool,
}
