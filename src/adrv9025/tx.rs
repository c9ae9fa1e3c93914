//! Tx datapath fields: attenuation, PA protection, NCO, CFR and the
//! slew rate limiter.

gen_channel_enum!(
    /// Tx datapath register blocks
    TxChannel {
        /// Broadcast to every Tx channel
        All = 0x1C00,
        Ch0 = 0x2000,
        Ch1 = 0x2800,
        Ch2 = 0x3000,
        Ch3 = 0x3800,
    }
);

bitfields! { TxChannel;
    rw ArmOverrideControl: u8 = 1, [(0xEA, 0x01, 0)];
    rw CfrBasePulse21b: u8 = 1, [(0x0F, 0x08, 3)];
    ro CfrHalfPulseLen: u16 = 0x3FF, [(0x12, 0x03, 0), (0x11, 0xFF, 0)];
    rw DpdActClkEnable: u8 = 1, [(0x07, 0x40, 6)];
    /// JESD deframer mask
    rw JesdDfrmMask: u8 = 3, [(0x32, 0x03, 0)];
    rw NcoTestEnable: u8 = 1, [(0xC5, 0x02, 1)];

    // PA protection
    ro AveragePeakRatio: u16 = 0x7FFF, [(0xA6, 0x7F, 0), (0xA5, 0xFF, 0)];
    ro AveragePower: u16 = 0xFFFF, [(0xA4, 0xFF, 0), (0xA3, 0xFF, 0)];
    rw AvgThreshold: u16 = 0x1FFF, [(0x9C, 0x1F, 0), (0x9B, 0xFF, 0)];
    rw AvgpowerEn: u8 = 1, [(0x99, 0x01, 0)];
    ro AvgpowerError: u8 = 1, [(0xA2, 0x01, 0)];
    /// Clears `AvgpowerError`
    wo AvgpowerErrorClear: u8 = 1, [(0xA2, 0x02, 1)];
    /// Average power measurement duration, 2^(n + 5) samples
    rw AvrgDur: u8 = 15, [(0x99, 0xF0, 4)];
    ro ErrorPower: u16 = 0xFFFF, [(0xA8, 0xFF, 0), (0xA7, 0xFF, 0)];
    rw GainRampDownEn: u8 = 1, [(0xA0, 0x01, 0)];
    rw PaProtectionAprEn: u8 = 1, [(0x9A, 0x02, 1)];
    rw PeakCount: u8 = 31, [(0x9E, 0x1F, 0)];
    rw PeakDur: u8 = 15, [(0x9A, 0xF0, 4)];
    rw PeakThreshold: u16 = 0x1FFF, [(0xAA, 0x1F, 0), (0xA9, 0xFF, 0)];
    rw PeakpowerEn: u8 = 1, [(0x9A, 0x01, 0)];
    rw RampMaxAttenuation: u8 = 127, [(0xA0, 0xFE, 1)];
    rw RampStepDuration: u8 = 15, [(0xA1, 0xF0, 4)];
    rw RampStepSize: u8 = 15, [(0xA1, 0x0F, 0)];

    rw PllUnlockMask: u8 = 31, [(0x31, 0x1F, 0)];

    // slew rate limiter
    ro SrlStat: u16 = 0xFFFF, [(0x6A, 0xFF, 0), (0x6B, 0xFF, 0)];
    ro SrlIrq: u8 = 1, [(0x69, 0x10, 4)];
    rw SrlStatEn: u8 = 1, [(0x69, 0x01, 0)];
    rw SrlTableSel: u8 = 3, [(0x68, 0xC0, 6)];

    /// Attenuation step, 0.05 dB units
    wo TxAttenStep: u8 = 127, [(0x9F, 0xFE, 1)];
    rw TxAttenConfig: u8 = 3, [(0x30, 0x30, 4)];
    wo TxAttenMode: u8 = 3, [(0x30, 0x03, 0)];
    /// Tx attenuation, 0.05 dB units
    rw TxAttenuation: u16 = 1023, [(0x34, 0x03, 0), (0x33, 0xFF, 0)];
    rw TxAttenuationEarlyDelayCounterForAnalog: u8 = 255, [(0x3E, 0xFF, 0)];

    wo TxDpNcoEnable: u8 = 1, [(0x88, 0x01, 0)];
    /// Datapath NCO frequency tuning word
    rw TxDpNcoFtw: u32 = 0xFFFF_FFFF, [(0x89, 0xFF, 0), (0x8A, 0xFF, 0), (0x8B, 0xFF, 0), (0x8C, 0xFF, 0)];
    /// Latches `TxDpNcoFtw`
    wo TxDpNcoFtwUpdate: u8 = 1, [(0x96, 0x01, 0)];
    rw TxNcoGain: u8 = 3, [(0x88, 0xC0, 6)];

    rw TxEnable: u8 = 1, [(0xE8, 0x01, 0)];
    rw TxPinMode: u8 = 1, [(0xE8, 0x10, 4)];
}
