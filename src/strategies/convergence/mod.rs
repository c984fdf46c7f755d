pub mod config;
pub mod quoter;

pub use config::ConvergenceConfig;
pub use quoter::ConvergenceQuoter;
