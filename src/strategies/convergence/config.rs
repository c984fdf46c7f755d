use crate::decimal::Decimal;

/// Two-sided quoting parameters for one instrument. `PP`/`VP` fix the
/// price and volume precision for the whole strategy instance.
pub struct ConvergenceConfig<const PP: u32, const VP: u32> {
    pub instrument: String,
    pub host: String,
    pub port: String,
    pub colo: bool,
    pub sender_comp_id: String,
    pub username: String,
    pub secret: String,
    pub heartbeat_secs: u32,
    pub tick_size: Decimal<PP>,
    pub lot_size: Decimal<VP>,
    /// A quoted level is cancelled once the touch moves this far past it.
    pub quote_reset_threshold: Decimal<PP>,
    /// When set, a requote also posts one tick inside the touch ahead of
    /// the touch-matching order, sized at the single lot instead of double.
    pub aggressive: bool,
}
