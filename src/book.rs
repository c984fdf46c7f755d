//! Per-instrument top-of-book state. Depth beyond the best level is out of
//! scope — the source's node-pool-backed ordered map is not exercised by
//! any strategy and is not reimplemented here.

use crate::decimal::Decimal;

/// Best bid/ask for one symbol. `bid` starts at the zero sentinel and `ask`
/// at the maximum representable value so the first `min_or_zero` update on
/// either side always takes effect.
#[derive(Clone, Copy, Debug)]
pub struct InstrumentTopLevel<const PP: u32, const VP: u32> {
    pub bid: Decimal<PP>,
    pub bid_qty: Decimal<VP>,
    pub ask: Decimal<PP>,
    pub ask_qty: Decimal<VP>,
}

impl<const PP: u32, const VP: u32> Default for InstrumentTopLevel<PP, VP> {
    fn default() -> Self {
        InstrumentTopLevel {
            bid: Decimal::from_raw(0),
            bid_qty: Decimal::from_raw(0),
            ask: Decimal::from_raw(u64::MAX),
            ask_qty: Decimal::from_raw(0),
        }
    }
}

/// Scans a parsed market-data message's repeating group (tags 268/269/270,
/// plus 271 when requested) and returns the best bid/ask/qty seen, and
/// optionally a third "index" level (type field 2), using `min_or_zero`
/// semantics over every matching-type entry in the message.
pub struct TopLevelUpdate<const PP: u32, const VP: u32> {
    pub bid: Decimal<PP>,
    pub ask: Decimal<PP>,
    pub bid_qty: Decimal<VP>,
    pub ask_qty: Decimal<VP>,
    pub index: Decimal<PP>,
}

impl<const PP: u32, const VP: u32> TopLevelUpdate<PP, VP> {
    /// `with_qty` also scans tag 271 (MDEntrySize) alongside tag 270
    /// (MDEntryPx); `with_index` also tracks type-field 2 entries as the
    /// reference/index price used by the sniper strategy.
    pub fn scan(reader: &crate::wire::FixReader, with_qty: bool, with_index: bool) -> Self {
        let mut update = TopLevelUpdate {
            bid: Decimal::default(),
            ask: Decimal::default(),
            bid_qty: Decimal::default(),
            ask_qty: Decimal::default(),
            index: Decimal::default(),
        };

        let num_updates: usize = reader.get_number(268, 0);
        for i in 0..num_updates {
            let type_field: u32 = reader.get_number(269, i);
            let price: Decimal<PP> = reader.get_decimal(270, i);
            match type_field {
                0 => {
                    update.bid.min_or_zero(price);
                    if with_qty {
                        let qty: Decimal<VP> = reader.get_decimal(271, i);
                        update.bid_qty.min_or_zero(qty);
                    }
                }
                1 => {
                    update.ask.min_or_zero(price);
                    if with_qty {
                        let qty: Decimal<VP> = reader.get_decimal(271, i);
                        update.ask_qty.min_or_zero(qty);
                    }
                }
                2 if with_index => update.index.min_or_zero(price),
                _ => {}
            }
        }

        update
    }
}
