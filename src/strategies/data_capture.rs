//! Passive market-data logger: no order flow, just a running record of
//! top-of-book updates for one instrument. Used to build a reference tape
//! without risking the account the other strategies trade against.

use crate::book::TopLevelUpdate;
use crate::engine::{Session, Strategy};
use crate::log_info;
use crate::log_warn;
use crate::logger::Logger;
use crate::wire::FixReader;

pub struct DataCaptureStrategy<const PP: u32, const VP: u32> {
    instrument: String,
}

impl<const PP: u32, const VP: u32> DataCaptureStrategy<PP, VP> {
    pub fn new(instrument: impl Into<String>) -> Self {
        DataCaptureStrategy { instrument: instrument.into() }
    }
}

impl<const PP: u32, const VP: u32> Strategy for DataCaptureStrategy<PP, VP> {
    fn before_receive(&mut self, session: &mut Session, _logger: &mut Logger) -> anyhow::Result<()> {
        if session.try_take_buffered().is_none() {
            session.market_data_request_top_level()?;
        }
        Ok(())
    }

    fn on_market_data(&mut self, _session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()> {
        let update = TopLevelUpdate::<PP, VP>::scan(reader, true, false);
        log_info!(
            logger,
            "[MD] {} bid={}@{} ask={}@{}",
            self.instrument,
            update.bid.as_f64(),
            update.bid_qty.as_f64(),
            update.ask.as_f64(),
            update.ask_qty.as_f64()
        );
        Ok(())
    }

    fn on_execution_report(&mut self, _session: &mut Session, _reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()> {
        log_warn!(logger, "unexpected execution report in data-capture mode");
        Ok(())
    }
}
