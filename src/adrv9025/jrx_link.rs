//! JESD204 deframer (JRX) link fields.
//!
//! Lane and converter indexed fields take the index through
//! [`Adrv9025::set_at`](crate::adrv9025::Adrv9025::set_at) /
//! [`Adrv9025::get_at`](crate::adrv9025::Adrv9025::get_at).

gen_channel_enum!(
    /// Deframer register blocks
    JrxLink {
        Link0 = 0x4C00,
        Link1 = 0x4E00,
    }
);

bitfields! { JrxLink;
    /// Converter routed to a deframer output, per converter
    rw ConvSel: u8 = 127, indexed 8 * 1, [(0x5D, 0x7F, 0)];

    // link configuration as received in ILAS
    ro ChksumCfg: u8 = 255, indexed 4 * 1, [(0xA5, 0xFF, 0)];
    ro LCfg: u8 = 31, [(0x9B, 0x1F, 0)];
    ro FCfg: u8 = 255, [(0x9C, 0xFF, 0)];
    ro KCfg: u8 = 255, [(0x9D, 0xFF, 0)];
    ro MCfg: u8 = 255, [(0x9E, 0xFF, 0)];
    ro CsCfg: u8 = 3, [(0x9F, 0xC0, 6)];
    ro NCfg: u8 = 31, [(0x9F, 0x1F, 0)];
    ro LinkType: u8 = 3, [(0x65, 0x03, 0)];
    ro SysrefForStartup: u8 = 1, [(0x65, 0x40, 6)];

    // JESD204B error counters, per lane
    rw Dl204bEcntEna: u8 = 7, indexed 4 * 1, [(0xED, 0x07, 0)];
    wo Dl204bEcntRst: u8 = 7, indexed 4 * 1, [(0xED, 0x70, 4)];
    rw Dl204bEcntTch: u8 = 7, indexed 4 * 1, [(0xF1, 0x07, 0)];
    ro Dl204bBde: u8 = 1, indexed 4 * 1, [(0xF5, 0x01, 0)];
    ro Dl204bCgs: u8 = 1, indexed 4 * 1, [(0xF5, 0x02, 1)];
    /// Error count threshold
    wo Dl204bEth: u8 = 255, [(0xB2, 0xFF, 0)];
    rw Dl204bIrqClr: u16 = 0x1FF, [(0xB1, 0x01, 0), (0xB0, 0xFF, 0)];
    ro Dl204bIrqVec: u16 = 0x1FF, indexed 4 * 1, [(0x119, 0x01, 0), (0x115, 0xFF, 0)];

    rw TplSysrefMask: u8 = 1, [(0x89, 0x08, 3)];
    rw TplBufProtectEn: u8 = 1, [(0x89, 0x40, 6)];
    /// LMFC phase adjustment, in PCLK cycles
    rw TplPhaseAdjust: u16 = 0xFFFF, [(0x8F, 0xFF, 0), (0x8E, 0xFF, 0)];
    ro TplPhaseDiff: u8 = 255, indexed 4 * 1, [(0x90, 0xFF, 0)];
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::adrv9025::{testing::device, CacheConfig, ReadCacheState};

    #[test]
    fn converter_select() {
        let (mut dev, state) = device(CacheConfig::default());
        dev.set_at(JrxLink::Link1, 7, ConvSel(0x12)).unwrap();
        assert_eq!(state.borrow().reg(0x4E64), 0x12);
        assert_eq!(dev.get_at::<ConvSel>(JrxLink::Link1, 7), Ok(ConvSel(0x12)));
    }

    #[cfg(feature = "bitfield-addr-check")]
    #[test]
    fn lane_index_range() {
        use crate::errors::Error;

        let (mut dev, _state) = device(CacheConfig::default());
        assert_eq!(dev.set_at(JrxLink::Link0, 4, Dl204bEcntEna(1)), Err(Error::InvalidChannel));
        assert_eq!(dev.set_at(JrxLink::Link0, 8, ConvSel(1)), Err(Error::InvalidChannel));
    }

    #[test]
    fn irq_vector_spans_lane_registers() {
        let (mut dev, state) = device(CacheConfig::default());
        state.borrow_mut().set_reg(0x4D1B, 0x03);
        state.borrow_mut().set_reg(0x4D17, 0x5A);
        assert_eq!(dev.get_at::<Dl204bIrqVec>(JrxLink::Link0, 2), Ok(Dl204bIrqVec(0x15A)));
    }

    #[test]
    fn ilas_configuration_in_one_read() {
        let (mut dev, state) = device(CacheConfig::default());
        dev.read_cache_enable(ReadCacheState::Global).unwrap();
        {
            let mut st = state.borrow_mut();
            st.set_reg(0x4C9B, 0x03);
            st.set_reg(0x4C9C, 0x02);
            st.set_reg(0x4C9F, 0x8F);
        }

        dev.get::<LCfg>(JrxLink::Link0).unwrap();
        dev.get::<FCfg>(JrxLink::Link0).unwrap();
        dev.get::<CsCfg>(JrxLink::Link0).unwrap();
        dev.get::<NCfg>(JrxLink::Link0).unwrap();

        let mut out = [0u64; 4];
        assert_eq!(dev.read_cache_flush(&mut out), Ok(4));
        assert_eq!(out, [3, 2, 2, 15]);
        assert_eq!(state.borrow().transactions.len(), 1);
    }
}
