//! [AD9467](https://www.analog.com/en/products/ad9467.html) 16-bit, 250 MSPS ADC driver.

pub mod constants;
pub mod register;
pub mod device;

pub use device::Ad9467;
