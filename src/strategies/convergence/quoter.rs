//! Two-sided quoting state machine: quotes the touch on both sides,
//! resets a level once the market has moved past it, and turns fills into
//! an opposite-side take-profit order one tick better than the fill.

use std::collections::{BTreeMap, HashMap};

use crate::book::TopLevelUpdate;
use crate::decimal::Decimal;
use crate::engine::{Session, Strategy};
use crate::log_info;
use crate::logger::Logger;
use crate::orders::{Side, SingleQuote};
use crate::risk::PositionRisk;
use crate::wire::FixReader;

use super::config::ConvergenceConfig;

pub struct ConvergenceQuoter<const PP: u32, const VP: u32> {
    config: ConvergenceConfig<PP, VP>,
    risk: PositionRisk,

    best_bid: Decimal<PP>,
    best_ask: Decimal<PP>,
    index: Decimal<PP>,

    // order id -> remaining volume
    orders: HashMap<String, Decimal<VP>>,
    // raw price -> order id
    quoted_levels: HashMap<u64, String>,
    // reverse (`.rev()`) iteration gives best-bid-first, highest price first
    bids_quoted: BTreeMap<u64, ()>,
    asks_quoted: BTreeMap<u64, ()>,

    take_profit_filled: u64,
    base_filled: u64,
}

impl<const PP: u32, const VP: u32> ConvergenceQuoter<PP, VP> {
    pub fn new(config: ConvergenceConfig<PP, VP>, risk: PositionRisk) -> Self {
        ConvergenceQuoter {
            config,
            risk,
            best_bid: Decimal::default(),
            best_ask: Decimal::default(),
            index: Decimal::default(),
            orders: HashMap::new(),
            quoted_levels: HashMap::new(),
            bids_quoted: BTreeMap::new(),
            asks_quoted: BTreeMap::new(),
            take_profit_filled: 0,
            base_filled: 0,
        }
    }

    fn send_quote(&mut self, session: &mut Session, logger: &mut Logger, quote: SingleQuote<PP, VP>) -> anyhow::Result<()> {
        if !self.risk.check() {
            return Ok(());
        }

        session.send_quote(&quote)?;
        log_info!(
            logger,
            "[QUOTED] {} {} {}@{}",
            if quote.take_profit { "[TAKE PROFIT]" } else { "" },
            if quote.side == Side::Bid { "BID" } else { "ASK" },
            quote.volume.as_f64(),
            quote.price.as_f64(),
        );
        Ok(())
    }

    fn update_index(&mut self, logger: &mut Logger, top_level: &FixReader) {
        let new_index: Decimal<PP> = top_level.get_decimal(100090, 0);
        if new_index.raw() != 0 && new_index != self.index {
            self.index = new_index;
            log_info!(logger, "Index price changed to {}", self.index.as_f64());
        }
    }
}

impl<const PP: u32, const VP: u32> Strategy for ConvergenceQuoter<PP, VP> {
    fn before_receive(&mut self, session: &mut Session, _logger: &mut Logger) -> anyhow::Result<()> {
        if session.try_take_buffered().is_none() {
            session.market_data_request_top_level()?;
        }
        Ok(())
    }

    fn on_market_data(&mut self, session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()> {
        if reader.contains(55, 0) && reader.get_string(55, 0) != self.config.instrument {
            return Ok(());
        }

        let last_bid = self.best_bid;
        let last_ask = self.best_ask;

        let top_level = TopLevelUpdate::<PP, VP>::scan(reader, false, false);
        if top_level.bid.raw() != 0 {
            self.best_bid = top_level.bid;
        }
        if top_level.ask.raw() != 0 {
            self.best_ask = top_level.ask;
        }
        self.update_index(logger, reader);

        let reset_threshold = self.config.quote_reset_threshold;
        let stale_bids: Vec<u64> = self
            .bids_quoted
            .keys()
            .rev()
            .copied()
            .take_while(|&price| self.best_bid.raw().saturating_sub(reset_threshold.raw()) > price)
            .collect();
        for price in stale_bids {
            if let Some(order_id) = self.quoted_levels.get(&price).cloned() {
                session.cancel_quote(&order_id)?;
                log_info!(logger, "[RESET] BID {} with best bid {}", Decimal::<PP>::from_raw(price).as_f64(), self.best_bid.as_f64());
            }
        }

        let stale_asks: Vec<u64> = self
            .asks_quoted
            .keys()
            .copied()
            .take_while(|&price| self.best_ask.raw() + reset_threshold.raw() < price)
            .collect();
        for price in stale_asks {
            if let Some(order_id) = self.quoted_levels.get(&price).cloned() {
                session.cancel_quote(&order_id)?;
                log_info!(logger, "[RESET] ASK {} with best ask {}", Decimal::<PP>::from_raw(price).as_f64(), self.best_ask.as_f64());
            }
        }

        let tick_size = self.config.tick_size;
        let lot_size = self.config.lot_size;
        let double_lot = Decimal::<VP>::from_raw(lot_size.raw() + lot_size.raw());
        let aggressive = self.config.aggressive;
        let one = Decimal::<PP>::from_f64(1.0);

        if self.best_bid < one && last_bid != self.best_bid && !self.quoted_levels.contains_key(&self.best_bid.raw()) {
            if aggressive {
                let aggressive_bid = Decimal::<PP>::from_raw(self.best_bid.raw() + tick_size.raw());
                if aggressive_bid < one && aggressive_bid < self.best_ask && !self.quoted_levels.contains_key(&aggressive_bid.raw()) {
                    self.send_quote(session, logger, SingleQuote { price: aggressive_bid, volume: lot_size, side: Side::Bid, take_profit: false })?;
                    self.send_quote(session, logger, SingleQuote { price: self.best_bid, volume: double_lot, side: Side::Bid, take_profit: false })?;
                } else {
                    self.send_quote(session, logger, SingleQuote { price: self.best_bid, volume: double_lot, side: Side::Bid, take_profit: false })?;
                }
            } else {
                self.send_quote(session, logger, SingleQuote { price: self.best_bid, volume: lot_size, side: Side::Bid, take_profit: false })?;
            }
        }

        if self.best_ask > one && last_ask != self.best_ask && !self.quoted_levels.contains_key(&self.best_ask.raw()) {
            if aggressive {
                let aggressive_ask = Decimal::<PP>::from_raw(self.best_ask.raw().saturating_sub(tick_size.raw()));
                if aggressive_ask > one && aggressive_ask > self.best_bid && !self.quoted_levels.contains_key(&aggressive_ask.raw()) {
                    self.send_quote(session, logger, SingleQuote { price: aggressive_ask, volume: lot_size, side: Side::Ask, take_profit: false })?;
                    self.send_quote(session, logger, SingleQuote { price: self.best_ask, volume: double_lot, side: Side::Ask, take_profit: false })?;
                } else {
                    self.send_quote(session, logger, SingleQuote { price: self.best_ask, volume: double_lot, side: Side::Ask, take_profit: false })?;
                }
            } else {
                self.send_quote(session, logger, SingleQuote { price: self.best_ask, volume: lot_size, side: Side::Ask, take_profit: false })?;
            }
        }

        Ok(())
    }

    fn on_execution_report(&mut self, session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()> {
        let status: u32 = reader.get_number(39, 0);
        let order_id = reader.get_string(11, 0).to_string();
        let cl_ord_id = reader.get_string(41, 0).to_string();
        let remaining: Decimal<VP> = reader.get_decimal(151, 0);
        let just_executed: Decimal<VP> = reader.get_decimal(14, 0);
        let side = Side::from_tag(reader.get_number(54, 0)).unwrap_or(Side::Bid);
        let price: Decimal<PP> = reader.get_decimal(44, 0);

        match status {
            // new order
            0 => {
                log_info!(logger, "[NEW ORDER] {order_id} {cl_ord_id} {:?} {}@{}", side, remaining.as_f64(), price.as_f64());
                self.orders.insert(order_id.clone(), remaining);
                self.quoted_levels.insert(price.raw(), order_id);
                match side {
                    Side::Bid => self.bids_quoted.insert(price.raw(), ()),
                    Side::Ask => self.asks_quoted.insert(price.raw(), ()),
                };
                self.risk.update_position(remaining.as_f64(), side);
            }

            // partial/total fill
            1 | 2 => {
                log_info!(logger, "[FILL] {order_id} {cl_ord_id} {:?} {}@{}", side, just_executed.as_f64(), price.as_f64());
                let last_remaining = self.orders.get(&order_id).copied().unwrap_or_default();
                let executed_raw = last_remaining.raw().saturating_sub(remaining.raw());

                if cl_ord_id.starts_with('t') {
                    self.take_profit_filled += just_executed.raw();
                    self.base_filled += just_executed.raw();
                } else if executed_raw > 0 {
                    let reversed_side = side.opposite();
                    let reversed_price = match side {
                        Side::Bid => Decimal::<PP>::from_raw(price.raw() + self.config.tick_size.raw()),
                        Side::Ask => Decimal::<PP>::from_raw(price.raw().saturating_sub(self.config.tick_size.raw())),
                    };
                    self.send_quote(
                        session,
                        logger,
                        SingleQuote {
                            price: reversed_price,
                            volume: Decimal::from_raw(executed_raw),
                            side: reversed_side,
                            take_profit: true,
                        },
                    )?;
                }

                log_info!(logger, "[EDGE CAPTURED] {}", self.take_profit_filled);
                log_info!(logger, "[EXPOSURE] {}", self.base_filled);

                if remaining.raw() == 0 {
                    self.orders.remove(&order_id);
                    self.quoted_levels.remove(&price.raw());
                    match side {
                        Side::Bid => self.bids_quoted.remove(&price.raw()),
                        Side::Ask => self.asks_quoted.remove(&price.raw()),
                    };
                } else {
                    self.orders.insert(order_id, remaining);
                }
            }

            // cancelled or rejected
            4 | 8 => {
                let label = if status == 4 { "[CANCELLED]" } else { "[REJECTED]" };
                log_info!(logger, "{label} {order_id} {cl_ord_id} {:?} {}@{}", side, remaining.as_f64(), price.as_f64());
                self.orders.remove(&order_id);
                self.quoted_levels.remove(&price.raw());
                match side {
                    Side::Bid => self.bids_quoted.remove(&price.raw()),
                    Side::Ask => self.asks_quoted.remove(&price.raw()),
                };
                self.risk.update_position(-remaining.as_f64(), side);
            }

            _ => {}
        }

        Ok(())
    }
}
