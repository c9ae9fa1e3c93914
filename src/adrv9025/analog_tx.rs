//! Analog Tx fields: the auxiliary DACs.

gen_channel_enum!(
    AnalogTxChannel {
        All = 0x1400,
        Ch0 = 0x8400,
        Ch1 = 0x8600,
        Ch2 = 0x8800,
        Ch3 = 0x8A00,
    }
);

bitfields! { AnalogTxChannel;
    /// 12-bit auxiliary DAC code
    rw Auxdac0: u16 = 0xFFF, [(0x6F, 0x0F, 0), (0x70, 0xFF, 0)];
    rw Auxdac1: u16 = 0xFFF, [(0x71, 0x0F, 0), (0x72, 0xFF, 0)];
    rw Auxdac2: u16 = 0xFFF, [(0x73, 0x0F, 0), (0x74, 0xFF, 0)];
    rw Auxdac3: u16 = 0xFFF, [(0x75, 0x0F, 0), (0x76, 0xFF, 0)];

    wo Auxdac0Config: u8 = 15, [(0x6F, 0xF0, 4)];
    wo Auxdac1Config: u8 = 15, [(0x71, 0xF0, 4)];
    wo Auxdac2Config: u8 = 15, [(0x73, 0xF0, 4)];
    wo Auxdac3Config: u8 = 15, [(0x75, 0xF0, 4)];

    /// Latches the auxiliary DAC codes
    wo AuxdacLatchEn: u8 = 1, [(0x77, 0x01, 0)];
}
