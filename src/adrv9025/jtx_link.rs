//! JESD204 framer (JTX) link fields

gen_channel_enum!(
    /// Framer register blocks
    JtxLink {
        Link0 = 0x4400,
        Link1 = 0x4600,
        Link2 = 0x4800,
    }
);

bitfields! { JtxLink;
    /// Converter feeding a framer input, per converter
    rw ConvSel: u8 = 127, indexed 24 * 1, [(0x00, 0x7F, 0)];
    rw LaneInv: u8 = 1, indexed 4 * 1, [(0x21, 0x20, 5)];
    ro LaneSel: u8 = 31, indexed 4 * 1, [(0x21, 0x1F, 0)];

    /// Test pattern, 0 disables
    rw TestGenMode: u8 = 15, [(0x31, 0x0F, 0)];
    rw TestGenSel: u8 = 3, [(0x31, 0x30, 4)];

    ro TplPhaseAdjust: u16 = 0xFFFF, [(0x40, 0xFF, 0), (0x3F, 0xFF, 0)];
    rw TplSysrefMask: u8 = 1, [(0x3D, 0x20, 5)];
    ro Dl204bState: u8 = 15, [(0x67, 0x0F, 0)];
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::adrv9025::{testing::device, CacheConfig, WriteCacheState};

    #[test]
    fn lane_polarity() {
        let (mut dev, state) = device(CacheConfig::default());
        dev.write_cache_enable(WriteCacheState::HwRmw).unwrap();
        state.borrow_mut().set_reg(0x4623, 0x03);

        dev.set_at(JtxLink::Link1, 2, LaneInv(1)).unwrap();
        assert_eq!(state.borrow().reg(0x4623), 0x23);
        assert_eq!(dev.get_at::<LaneSel>(JtxLink::Link1, 2), Ok(LaneSel(3)));
        assert_eq!(dev.get_at::<LaneInv>(JtxLink::Link1, 2), Ok(LaneInv(1)));
    }

    #[test]
    fn test_pattern() {
        let (mut dev, state) = device(CacheConfig::default());
        dev.set(JtxLink::Link2, TestGenSel(2)).unwrap();
        dev.set(JtxLink::Link2, TestGenMode(0x9)).unwrap();
        assert_eq!(state.borrow().reg(0x4831), 0x29);
    }
}
