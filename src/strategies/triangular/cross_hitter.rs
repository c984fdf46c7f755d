//! BTC/ETH/cross-rate triangular cycle: three fill-or-kill market legs,
//! no retry-on-cancel — a cancelled leg is just logged, since crossing
//! taker orders are expected to fill immediately or not at all.

use crate::book::InstrumentTopLevel;
use crate::decimal::Decimal;
use crate::engine::{Session, Strategy};
use crate::log_info;
use crate::log_warn;
use crate::logger::Logger;
use crate::orders::{Order, Side};
use crate::risk::PositionRisk;
use crate::wire::FixReader;

use super::config::CrossTriangularConfig;

pub struct CrossHitter<const PP: u32, const VP: u32> {
    config: CrossTriangularConfig<PP, VP>,
    risk: PositionRisk,

    best_prices: [InstrumentTopLevel<PP, VP>; 3],
    sent_orders: [Order<PP, VP>; 3],

    fill_mode: bool,
    filled: u32,
    pnl: f64,
}

impl<const PP: u32, const VP: u32> CrossHitter<PP, VP> {
    pub fn new(config: CrossTriangularConfig<PP, VP>, risk: PositionRisk) -> Self {
        CrossHitter {
            config,
            risk,
            best_prices: Default::default(),
            sent_orders: Default::default(),
            fill_mode: false,
            filled: 0,
            pnl: 0.0,
        }
    }

    fn take_orders(&mut self, session: &mut Session, orders: [Order<PP, VP>; 3]) -> anyhow::Result<()> {
        if !self.risk.check() {
            return Ok(());
        }

        for order in &orders {
            session.send_market_order(order)?;
        }

        self.sent_orders = orders;
        self.fill_mode = true;
        self.filled = 0;
        Ok(())
    }

    fn update_pnl(&mut self, logger: &mut Logger) {
        let eth_price = self.sent_orders[1].price.as_f64();
        let btc_price = self.sent_orders[0].price.as_f64();
        let cross_price = self.sent_orders[2].price.as_f64();
        let multiplier = self.sent_orders[1].volume.as_f64() * self.config.contract_size;

        if self.sent_orders[0].side == Some(Side::Bid) {
            self.pnl += (eth_price - (btc_price * cross_price)) * multiplier;
        } else {
            self.pnl += ((btc_price * cross_price) - eth_price) * multiplier;
        }

        log_info!(logger, "[PNL] {} in USD (estimate)", self.pnl);
    }
}

impl<const PP: u32, const VP: u32> Strategy for CrossHitter<PP, VP> {
    fn on_market_data(&mut self, session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()> {
        let symbol = reader.get_string(55, 0);
        let Some(&leg) = self.config.instrument_map.get(symbol) else {
            log_warn!(logger, "Unknown instrument {symbol}");
            return Ok(());
        };

        let update = crate::book::TopLevelUpdate::<PP, VP>::scan(reader, false, false);
        if update.bid.is_set() {
            self.best_prices[leg].bid = update.bid;
        }
        if update.ask.is_set() {
            self.best_prices[leg].ask = update.ask;
        }
        if !update.bid.is_set() && !update.ask.is_set() {
            log_warn!(logger, "Invalid prices");
            return Ok(());
        }

        if self.fill_mode {
            return Ok(());
        }

        anyhow::ensure!(self.best_prices[leg].bid < self.best_prices[leg].ask, "Overlapping prices");

        let contract = self.config.contract_size;
        let btc = self.best_prices[0];
        let eth = self.best_prices[1];
        let cross = self.best_prices[2];

        // Buy BTC, Sell ETH, Buy ETH/BTC
        if btc.ask.as_f64() * cross.ask.as_f64() < eth.bid.as_f64() {
            log_info!(logger, "[OPP CASE 1] BTC {} * ETH/BTC {} < ETH {}", btc.ask.as_f64(), cross.ask.as_f64(), eth.bid.as_f64());

            let btc_qty = btc.ask.as_f64() * contract;
            let eth_qty = btc_qty / eth.bid.as_f64();
            let eth_qty_lots = (eth_qty / contract).round();

            let orders = [
                Order::market_fok(self.config.instrument_list[0].clone(), Decimal::default(), Decimal::from_f64(1.0), Side::Bid),
                Order::market_fok(self.config.instrument_list[1].clone(), Decimal::default(), Decimal::from_f64(eth_qty_lots), Side::Ask),
                Order::market_fok(self.config.instrument_list[2].clone(), Decimal::default(), Decimal::from_f64(eth_qty_lots), Side::Bid),
            ];
            self.take_orders(session, orders)?;
        }

        // Sell BTC, Buy ETH, Sell ETH/BTC
        if eth.ask.as_f64() < btc.bid.as_f64() * cross.bid.as_f64() {
            log_info!(logger, "[OPP CASE 2] BTC {} * ETH/BTC {} > ETH {}", btc.bid.as_f64(), cross.bid.as_f64(), eth.ask.as_f64());

            let btc_qty = btc.bid.as_f64() * contract;
            let eth_qty = btc_qty / eth.ask.as_f64();
            let eth_qty_lots = (eth_qty / contract).round();

            let orders = [
                Order::market_fok(self.config.instrument_list[0].clone(), Decimal::default(), Decimal::from_f64(1.0), Side::Ask),
                Order::market_fok(self.config.instrument_list[1].clone(), Decimal::default(), Decimal::from_f64(eth_qty_lots), Side::Bid),
                Order::market_fok(self.config.instrument_list[2].clone(), Decimal::default(), Decimal::from_f64(eth_qty_lots), Side::Ask),
            ];
            self.take_orders(session, orders)?;
        }

        Ok(())
    }

    fn on_execution_report(&mut self, _session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()> {
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
            0 => log_info!(logger, "[NEW ORDER] {order_id} {:?} {}@{}", side, remaining.as_f64(), price.as_f64()),
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

                self.filled += 1;
                if self.filled == 3 {
                    self.fill_mode = false;
                    self.filled = 0;
                    log_info!(logger, "All orders filled");
                    self.update_pnl(logger);
                }
            }

            4 => log_info!(logger, "[CANCELLED] {order_id} {:?} {}@{}", side, remaining.as_f64(), price.as_f64()),

            8 => {
                let reason = reader.get_string_view(103, 0);
                log_info!(logger, "[REJECTED] {order_id} {:?} {}@{} with reason {}", side, remaining.as_f64(), price.as_f64(), reason);
            }

            other => log_warn!(logger, "Other status type {other}"),
        }

        Ok(())
    }
}
