//! Session lifecycle and the main dispatch loop. Each event type has
//! exactly one real handler per strategy in this domain, so the loop
//! calls straight into a single [`Strategy`] implementation instead of
//! fanning a message out across a list of generic handler nodes.

mod session;

pub use session::Session;

use crate::logger::Logger;
use crate::log_fatal;
use crate::profiler::Profiler;
use crate::risk::AbortLatch;
use crate::wire::FixReader;

/// Per-strategy message handlers. `before_receive` runs once per loop
/// iteration before the (blocking) receive call — strategies that need to
/// proactively request data or run a timer use it.
pub trait Strategy {
    fn before_receive(&mut self, _session: &mut Session, _logger: &mut Logger) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_market_data(&mut self, session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()>;

    fn on_execution_report(&mut self, session: &mut Session, reader: &FixReader, logger: &mut Logger) -> anyhow::Result<()>;
}

/// Runs `strategy` against `session` until the abort latch is set or the
/// connection drops. Test requests and heartbeats are answered inline;
/// everything else is handed to `strategy`.
pub fn run(
    session: &mut Session,
    strategy: &mut impl Strategy,
    abort: &AbortLatch,
    logger: &mut Logger,
    profiler: &Profiler,
) -> anyhow::Result<()> {
    loop {
        if abort.is_set() {
            tracing::info!("abort latch observed, tearing down session");
            session.stop()?;
            return Ok(());
        }

        strategy.before_receive(session, logger)?;

        let raw = {
            let _guard = profiler.measure("session_loop_receive", logger);
            session.force_receive()?
        };
        let reader = FixReader::parse(&raw);

        if reader.is_message_type("3") {
            log_fatal!(logger, "reject message received: {raw}");
            continue;
        }

        if reader.is_message_type("1") {
            let test_req_id = reader.get_string(112, 0);
            session.heartbeat(Some(&test_req_id))?;
            continue;
        }

        if reader.is_message_type("0") {
            continue;
        }

        if reader.is_message_type("8") {
            strategy.on_execution_report(session, &reader, logger)?;
            continue;
        }

        if reader.is_message_type("W") {
            strategy.on_market_data(session, &reader, logger)?;
            continue;
        }
    }
}
