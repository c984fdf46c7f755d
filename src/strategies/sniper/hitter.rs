//! Pickoff strategy: when the index trades away from the touch by more
//! than ten ticks, quote both sides of the gap, then unwind on a 15
//! second timer however the pair filled.

use std::time::{Duration, Instant};

use crate::book::TopLevelUpdate;
use crate::decimal::Decimal;
use crate::engine::{Session, Strategy};
use crate::log_fatal;
use crate::log_info;
use crate::log_warn;
use crate::logger::Logger;
use crate::orders::{Order, Side};
use crate::risk::PositionRisk;
use crate::wire::FixReader;

use super::config::SniperConfig;

const EXIT_TIME: Duration = Duration::from_secs(15);

pub struct SniperHitter<const PP: u32, const VP: u32> {
    config: SniperConfig<PP, VP>,
    risk: PositionRisk,

    best_bid: Decimal<PP>,
    best_ask: Decimal<PP>,
    best_index: Decimal<PP>,

    fill_mode: bool,
    // Preserves the source's unsigned wraparound: decrementing past zero
    // (a cancel/reject with nothing yet filled) wraps rather than panics.
    filled: u32,
    sent_bid: Order<PP, VP>,
    sent_ask: Order<PP, VP>,
    last_ordered: Instant,

    pnl_qty: f64,
}

impl<const PP: u32, const VP: u32> SniperHitter<PP, VP> {
    pub fn new(config: SniperConfig<PP, VP>, risk: PositionRisk) -> Self {
        let instrument = config.instrument.clone();
        SniperHitter {
            config,
            risk,
            best_bid: Decimal::default(),
            best_ask: Decimal::default(),
            best_index: Decimal::default(),
            fill_mode: false,
            filled: 0,
            sent_bid: Order::new(instrument.clone(), Decimal::default(), Decimal::default(), Side::Bid),
            sent_ask: Order::new(instrument, Decimal::default(), Decimal::default(), Side::Ask),
            last_ordered: Instant::now(),
            pnl_qty: 0.0,
        }
    }

    fn quote_spread(&mut self, session: &mut Session, bid_price: Decimal<PP>, ask_price: Decimal<PP>) -> anyhow::Result<()> {
        if !self.risk.check() {
            return Ok(());
        }

        let volume = self.config.lots;
        let bid = Order::new(self.config.instrument.clone(), bid_price, volume, Side::Bid);
        let ask = Order::new(self.config.instrument.clone(), ask_price, volume, Side::Ask);

        session.send_order(&bid)?;
        session.send_order(&ask)?;

        self.fill_mode = true;
        self.filled = 0;
        self.sent_bid = bid;
        self.sent_ask = ask;
        self.last_ordered = Instant::now();
        Ok(())
    }
}

impl<const PP: u32, const VP: u32> Strategy for SniperHitter<PP, VP> {
    fn before_receive(&mut self, session: &mut Session, logger: &mut Logger) -> anyhow::Result<()> {
        if session.try_take_buffered().is_none() {
            session.market_data_request_top_level()?;
        }

        if self.fill_mode && self.last_ordered.elapsed() >= EXIT_TIME {
            match self.filled {
                0 => {
                    log_info!(logger, "Cancelling both unfilled orders");
                    session.cancel_quote(&self.sent_bid.order_id)?;
                    session.cancel_quote(&self.sent_ask.order_id)?;
                }
                1 => {
                    log_warn!(logger, "Exiting one sided stale order");
                    if !self.sent_bid.is_filled {
                        session.cancel_quote(&self.sent_bid.order_id)?;
                        self.sent_bid.is_limit = false;
                        session.send_market_order(&self.sent_bid)?;
                    }
                    if !self.sent_ask.is_filled {
                        session.cancel_quote(&self.sent_ask.order_id)?;
                        self.sent_ask.is_limit = false;
                        session.send_market_order(&self.sent_ask)?;
                    }
                }
                other => log_fatal!(logger, "Invalid filled value: {other}"),
            }
        }

        Ok(())
    }

    fn on_market_data(&mut self, session: &mut Session, reader: &FixReader, _logger: &mut Logger) -> anyhow::Result<()> {
        let update = TopLevelUpdate::<PP, VP>::scan(reader, false, true);
        if update.bid.is_set() {
            self.best_bid = update.bid;
        }
        if update.ask.is_set() {
            self.best_ask = update.ask;
        }
        if update.index.is_set() {
            self.best_index = update.index;
        }

        if self.fill_mode {
            return Ok(());
        }

        let tick_size = self.config.tick_size;
        let gap = tick_size.as_f64() * 10.0;

        if self.best_index.as_f64() < self.best_bid.as_f64() - gap {
            let bid_price = Decimal::<PP>::from_raw(self.best_bid.raw().saturating_sub(tick_size.raw()));
            return self.quote_spread(session, bid_price, self.best_bid);
        }

        if self.best_index.as_f64() > self.best_ask.as_f64() + gap {
            let ask_price = Decimal::<PP>::from_raw(self.best_ask.raw() + tick_size.raw());
            return self.quote_spread(session, self.best_ask, ask_price);
        }

        Ok(())
    }

    fn on_execution_report(&mut self, _session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()> {
        let status: u32 = reader.get_number(39, 0);
        let order_id = reader.get_string(11, 0).to_string();
        let side = Side::from_tag(reader.get_number(54, 0)).unwrap_or(Side::Bid);
        let remaining: Decimal<VP> = reader.get_decimal(151, 0);
        let price: Decimal<PP> = reader.get_decimal(44, 0);

        match status {
            1 => log_info!(logger, "[PARTIAL FILL] {order_id} {:?} remaining {} @ {}", side, remaining.as_f64(), price.as_f64()),

            4 => {
                log_info!(logger, "[CANCELLED] {order_id} {:?} remaining {} @ {}", side, remaining.as_f64(), price.as_f64());
                self.filled = self.filled.wrapping_sub(1);
                if self.filled == 0 {
                    self.fill_mode = false;
                }
            }

            0 => {
                log_info!(logger, "[NEW ORDER] {order_id} {:?} remaining {} @ {}", side, remaining.as_f64(), price.as_f64());
                self.fill_mode = true;
                match side {
                    Side::Bid => self.sent_bid.order_id = order_id,
                    Side::Ask => self.sent_ask.order_id = order_id,
                }
            }

            2 => {
                let num_fills: u32 = reader.get_number(1362, 0);
                let mut total_qty = 0.0f64;
                let mut avg_fill_price = 0.0f64;
                for i in 0..num_fills as usize {
                    let fill_qty: f64 = reader.get_number(1365, i);
                    let fill_price: f64 = reader.get_number(1364, i);
                    total_qty += fill_qty;
                    avg_fill_price += fill_qty * fill_price;
                }
                if total_qty != 0.0 && avg_fill_price != 0.0 {
                    avg_fill_price /= total_qty;
                }

                log_info!(logger, "[FILL] {order_id} {:?} remaining {} @ {}", side, remaining.as_f64(), avg_fill_price);

                match side {
                    Side::Bid => {
                        self.sent_bid.is_filled = true;
                        self.sent_bid.price = Decimal::from_f64(avg_fill_price);
                    }
                    Side::Ask => {
                        self.sent_ask.is_filled = true;
                        self.sent_ask.price = Decimal::from_f64(avg_fill_price);
                    }
                }

                self.filled += 1;
                if self.filled == 2 {
                    self.fill_mode = false;
                    self.filled = 0;
                    let qty = self.config.lots.as_f64();
                    self.pnl_qty += (self.sent_ask.price.as_f64() - self.sent_bid.price.as_f64()) * qty;
                    log_info!(logger, "All orders filled with pnl {} (in contract size)", self.pnl_qty);
                }
            }

            8 => {
                let reason = reader.get_string_view(103, 0);
                log_info!(logger, "[REJECTED] {order_id} {:?} remaining {} @ {} with reason {}", side, remaining.as_f64(), price.as_f64(), reason);
                self.filled = self.filled.wrapping_sub(1);
                if self.filled == 0 {
                    self.fill_mode = false;
                }
            }

            other => log_warn!(logger, "Other status type {other}"),
        }

        Ok(())
    }
}
