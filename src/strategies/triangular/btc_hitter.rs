//! BTC/stablecoin triangular cycle: BTC/T, BTC/C, and USDC/USDT quoted as
//! three legs of one cycle. Unlike the cross cycle, a cancelled leg is
//! repriced to the current touch and resent until it is accepted.

use crate::book::InstrumentTopLevel;
use crate::decimal::Decimal;
use crate::engine::{Session, Strategy};
use crate::log_info;
use crate::log_warn;
use crate::logger::Logger;
use crate::orders::{Order, Side};
use crate::risk::PositionRisk;
use crate::wire::FixReader;

use super::config::BtcTriangularConfig;

pub struct BtcHitter<const PP: u32, const VP: u32> {
    config: BtcTriangularConfig<PP, VP>,
    risk: PositionRisk,

    best_prices: [InstrumentTopLevel<PP, VP>; 3],
    sent_orders: [Order<PP, VP>; 3],

    fill_mode: bool,
    filled: u32,
    pnl: f64,
}

impl<const PP: u32, const VP: u32> BtcHitter<PP, VP> {
    pub fn new(config: BtcTriangularConfig<PP, VP>, risk: PositionRisk) -> Self {
        BtcHitter {
            config,
            risk,
            best_prices: Default::default(),
            sent_orders: Default::default(),
            fill_mode: false,
            filled: 0,
            pnl: 0.0,
        }
    }

    fn take_orders(&mut self, session: &mut Session, orders: [Order<PP, VP>; 3], case: &str, logger: &mut Logger) -> anyhow::Result<()> {
        if !self.risk.check() {
            return Ok(());
        }

        for order in &orders {
            session.send_order(order)?;
        }

        self.sent_orders = orders;
        self.fill_mode = true;
        self.filled = 0;
        log_info!(logger, "Taking {case}");
        Ok(())
    }

    fn update_pnl(&mut self, logger: &mut Logger) {
        let btct = self.sent_orders[0].price.as_f64();
        let btcc = self.sent_orders[1].price.as_f64();
        let usdc = self.sent_orders[2].price.as_f64();
        let multiplier = self.config.contract_size * self.config.volume_size.as_f64();

        if self.sent_orders[0].side == Some(Side::Bid) {
            self.pnl += ((btcc * usdc) - btct) * multiplier;
        } else {
            self.pnl += (btct - (btcc * usdc)) * multiplier;
        }

        log_info!(logger, "[PNL] {} USDT", self.pnl);
    }
}

impl<const PP: u32, const VP: u32> Strategy for BtcHitter<PP, VP> {
    fn on_market_data(&mut self, session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()> {
        let symbol = reader.get_string(55, 0);
        let Some(&leg) = self.config.instrument_map.get(symbol) else {
            log_warn!(logger, "Unknown instrument {symbol}");
            return Ok(());
        };

        let update = crate::book::TopLevelUpdate::<PP, VP>::scan(reader, true, false);
        if !update.bid.is_set() || !update.ask.is_set() {
            log_warn!(logger, "Invalid prices");
            return Ok(());
        }

        self.best_prices[leg] = InstrumentTopLevel {
            bid: update.bid,
            bid_qty: update.bid_qty,
            ask: update.ask,
            ask_qty: update.ask_qty,
        };

        if self.fill_mode {
            return Ok(());
        }

        let volume = self.config.volume_size;
        let btct = self.best_prices[0];
        let btcc = self.best_prices[1];
        let usdc = self.best_prices[2];

        // Buy BTC/T, Sell BTC/C, Sell USDC for USDT
        if btcc.bid.as_f64() * usdc.bid.as_f64() > btct.ask.as_f64() {
            log_info!(
                logger,
                "[OPP CASE 1] {} * {} > {}",
                btcc.bid.as_f64(),
                usdc.bid.as_f64(),
                btct.ask.as_f64()
            );
            let orders = [
                Order::new(self.config.instrument_list[0].clone(), btct.ask, volume, Side::Bid),
                Order::new(self.config.instrument_list[1].clone(), btcc.bid, volume, Side::Ask),
                Order::new(self.config.instrument_list[2].clone(), usdc.bid, volume, Side::Ask),
            ];
            self.take_orders(session, orders, "case 1", logger)?;
        }

        // Buy BTC/C, Sell BTC/T, Buy USDC for USDT
        if btct.bid.as_f64() > btcc.ask.as_f64() * usdc.ask.as_f64() {
            log_info!(
                logger,
                "[OPP CASE 2] {} > {} * {}",
                btct.bid.as_f64(),
                btcc.ask.as_f64(),
                usdc.ask.as_f64()
            );
            let orders = [
                Order::new(self.config.instrument_list[0].clone(), btct.bid, volume, Side::Ask),
                Order::new(self.config.instrument_list[1].clone(), btcc.ask, volume, Side::Bid),
                Order::new(self.config.instrument_list[2].clone(), usdc.ask, volume, Side::Bid),
            ];
            self.take_orders(session, orders, "case 2", logger)?;
        }

        Ok(())
    }

    fn on_execution_report(&mut self, session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()> {
        let symbol = reader.get_string(55, 0);
        let Some(&leg) = self.config.instrument_map.get(symbol) else {
            log_warn!(logger, "Symbol {symbol} doesn't exist");
            return Ok(());
        };

        let status: u32 = reader.get_number(39, 0);
        let order_id = reader.get_string(11, 0).to_string();
        let side = Side::from_tag(reader.get_number(54, 0)).unwrap_or(Side::Bid);
        let remaining: Decimal<VP> = reader.get_decimal(151, 0);
        let price: Decimal<PP> = reader.get_decimal(44, 0);

        match status {
            0 => {
                log_info!(logger, "[NEW ORDER] {order_id} {:?} {}@{}", side, remaining.as_f64(), price.as_f64());
                self.sent_orders[leg].order_id = order_id;
                self.sent_orders[leg].is_in_flight = false;
            }

            1 => log_info!(logger, "[PARTIAL FILL] {order_id} {:?} {}@{}", side, remaining.as_f64(), price.as_f64()),

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

                log_info!(logger, "[FILL] {order_id} {:?} {}@{}", side, remaining.as_f64(), avg_fill_price);

                self.sent_orders[leg].is_filled = true;
                self.sent_orders[leg].price = Decimal::from_f64(avg_fill_price);
                self.sent_orders[leg].is_in_flight = false;

                self.filled += 1;
                if self.filled == 3 {
                    self.fill_mode = false;
                    self.filled = 0;
                    log_info!(logger, "All orders filled");
                    self.update_pnl(logger);
                }
            }

            4 => {
                log_info!(logger, "[CANCELLED] {order_id} {:?} {}@{}", side, remaining.as_f64(), price.as_f64());
                let reprice = match self.sent_orders[leg].side {
                    Some(Side::Bid) => self.best_prices[leg].ask,
                    _ => self.best_prices[leg].bid,
                };
                self.sent_orders[leg].price = reprice;
                self.sent_orders[leg].is_limit = false;

                loop {
                    if session.send_market_order(&self.sent_orders[leg]).is_ok() {
                        break;
                    }
                }
                self.sent_orders[leg].is_in_flight = false;
                log_info!(logger, "Retrying {symbol}");
            }

            8 => {
                let reason = reader.get_string_view(103, 0);
                log_info!(logger, "[REJECTED] {order_id} {:?} {}@{} with reason {}", side, remaining.as_f64(), price.as_f64(), reason);
            }

            other => log_warn!(logger, "Other status type {other}"),
        }

        Ok(())
    }
}
