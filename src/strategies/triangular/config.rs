use std::collections::HashMap;

use crate::decimal::Decimal;

/// Shared connection parameters plus the three-leg instrument list: index
/// 0/1/2 match the order `bestPrices`/`sentOrders` are indexed by
/// throughout both hitters. `instrument_map` is the reverse lookup from
/// wire symbol to leg index.
pub struct BtcTriangularConfig<const PP: u32, const VP: u32> {
    pub instrument_list: [String; 3],
    pub instrument_map: HashMap<String, usize>,
    pub host: String,
    pub port: String,
    pub colo: bool,
    pub sender_comp_id: String,
    pub username: String,
    pub secret: String,
    pub heartbeat_secs: u32,
    pub volume_size: Decimal<VP>,
    pub contract_size: f64,
}

pub struct CrossTriangularConfig<const PP: u32, const VP: u32> {
    pub instrument_list: [String; 3],
    pub instrument_map: HashMap<String, usize>,
    pub host: String,
    pub port: String,
    pub colo: bool,
    pub sender_comp_id: String,
    pub username: String,
    pub secret: String,
    pub heartbeat_secs: u32,
    pub volume_size: Decimal<VP>,
    pub contract_size: f64,
    pub trigger_threshold: Decimal<PP>,
    pub qty_threshold: f64,
}

pub fn instrument_map(instrument_list: &[String; 3]) -> HashMap<String, usize> {
    instrument_list.iter().enumerate().map(|(i, s)| (s.clone(), i)).collect()
}
