//! [AD9517](https://www.analog.com/en/products/ad9517-1.html) 12-output clock generator driver.
//!
//! Channels 0 ..= 3 are the LVPECL outputs, 4 ..= 7 the LVDS/CMOS ones.

pub mod config;
pub mod constants;
pub mod register;
pub mod frequency;
pub mod device;

pub use config::Config;
pub use device::{Ad9517, PowerMode};
