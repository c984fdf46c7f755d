//! Two distinct triangular cycles, each grounded on its own source file:
//! a BTC/stablecoin cycle with qty-aware sizing and retry-on-cancel
//! repricing, and a simpler BTC/ETH/cross cycle that fires off
//! fill-or-kill market legs with no retry.

pub mod btc_hitter;
pub mod config;
pub mod cross_hitter;

pub use btc_hitter::BtcHitter;
pub use config::{instrument_map, BtcTriangularConfig, CrossTriangularConfig};
pub use cross_hitter::CrossHitter;
