use crate::decimal::Decimal;

pub struct SniperConfig<const PP: u32, const VP: u32> {
    pub instrument: String,
    pub host: String,
    pub port: String,
    pub colo: bool,
    pub sender_comp_id: String,
    pub username: String,
    pub secret: String,
    pub heartbeat_secs: u32,
    pub tick_size: Decimal<PP>,
    pub lots: Decimal<VP>,
}
