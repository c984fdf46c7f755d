//! Shared library surface for the trading binaries under `src/bin/`.

pub mod book;
pub mod cli;
pub mod decimal;
pub mod engine;
pub mod framer;
pub mod logger;
pub mod orders;
pub mod profiler;
pub mod risk;
pub mod socket_tuning;
pub mod strategies;
pub mod throttle;
pub mod wire;
