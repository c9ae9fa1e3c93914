#![cfg_attr(not(test), no_std)]

//! Analog Devices converter drivers on top of `embedded-hal` SPI:
//!
//! * [AD9467](https://www.analog.com/en/products/ad9467.html) 16-bit, 250 MSPS ADC
//! * [AD9517](https://www.analog.com/en/products/ad9517-1.html) clock generator
//! * [ADRV9025](https://www.analog.com/en/products/adrv9025.html) transceiver bit-field layer

#[macro_use]
pub mod register;

pub mod errors;
pub mod spi;
pub mod ad9467;
pub mod ad9517;
pub mod adrv9025;

#[cfg(test)]
mod mock;
