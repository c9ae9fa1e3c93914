//! [ADRV9025](https://www.analog.com/en/products/adrv9025.html) transceiver
//! bit-field layer.
//!
//! Fields are typed values ([`tx::TxAttenuation`], [`jrx_link::ConvSel`], ...)
//! read and written with [`Adrv9025::get`] / [`Adrv9025::set`] on a channel
//! block. Accesses go through a write cache and a read cache, both off by
//! default:
//!
//! ```ignore
//! let mut dev = Adrv9025::new(spi, cs, CacheConfig::default());
//! dev.write_cache_enable(WriteCacheState::Global)?;
//! dev.set(TxChannel::Ch0, TxAttenuation(200))?;
//! dev.set(TxChannel::Ch1, TxAttenuation(200))?;
//! dev.write_cache_flush()?;
//! ```

#[macro_use]
pub mod bitfield;

pub mod hal;
pub mod cache;
pub mod device;

pub mod tx;
pub mod analog_tx;
pub mod jrx_link;
pub mod jtx_link;

pub use cache::{ReadCacheState, WriteCacheState};
pub use device::{Adrv9025, CacheConfig};
pub use tx::TxChannel;
pub use analog_tx::AnalogTxChannel;
pub use jrx_link::JrxLink;
pub use jtx_link::JtxLink;
