//! Tag=value wire codec: the FIX-4.4-flavored protocol the venue speaks.

pub mod auth;
pub mod builder;
pub mod error;
pub mod reader;

pub use auth::{logon_password, logon_raw_data};
pub use builder::FixMessageBuilder;
pub use error::WireError;
pub use reader::FixReader;

/// Field delimiter (SOH).
pub const SOH: u8 = 0x01;
