pub mod config;
pub mod hitter;

pub use config::SniperConfig;
pub use hitter::SniperHitter;
