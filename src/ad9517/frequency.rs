///! PLL and clock distribution frequency calculations

use crate::errors::*;

use super::constants::*;

/// PLL counter settings for one VCO frequency
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct PllPlan {
    pub r_counter: u32,
    pub a_counter: u32,
    pub b_counter: u32,
    /// Dual modulus prescaler P (divides by P / P+1)
    pub prescaler_p: u32,
    /// PLL_CTRL_1 prescaler code
    pub prescaler_code: u8,
    pub pfd_hz: u64,
    /// Frequency actually synthesized, Hz
    pub vco_hz: u64,
    /// Antibacklash pulse width setting
    pub antibacklash_pulse_width: u8,
}

impl PllPlan {
    /// f VCO = (REF / R) × (P × B + A)
    ///
    /// Starts with the smallest R keeping the PFD at or below 100 MHz, then
    /// raises R until some prescaler gives B ≥ 3 and B > A.
    pub fn new(ref_hz: u64, vco_hz: u64) -> Result<Self, Error> {
        if ref_hz == 0 || vco_hz == 0 {
            return Err(Error::InvalidFrequency);
        }

        let mut r = 1;
        while ref_hz / r as u64 > PFD_FREQ_MAX {
            r += 1;
        }

        while r <= R_COUNTER_MAX {
            let pfd = ref_hz / r as u64;
            if pfd == 0 {
                return Err(Error::InvalidFrequency);
            }

            let n = vco_hz / pfd;
            for (idx, (p, limit)) in PRESCALERS.iter().enumerate() {
                if vco_hz > *limit {
                    continue;
                }
                let p = *p as u64;
                let b = n / p;
                let a = n % p;
                if b >= B_COUNTER_MIN as u64 && b > a {
                    return Ok(PllPlan {
                        r_counter: r,
                        a_counter: a as u32,
                        b_counter: b as u32,
                        prescaler_p: p as u32,
                        prescaler_code: PRESCALER_CODE_BASE + idx as u8,
                        pfd_hz: pfd,
                        vco_hz: pfd * (p * b + a),
                        antibacklash_pulse_width: if pfd > PFD_FREQ_ANTIBACKLASH { 1 } else { 0 },
                    });
                }
            }
            r += 1;
        }

        Err(Error::InvalidFrequency)
    }
}


/// Output driver family, selects the divider chain
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum OutputKind {
    /// Channels 0 ..= 3
    Lvpecl,
    /// Channels 4 ..= 7
    LvdsCmos,
}

impl OutputKind {
    pub fn of_channel(channel: u8) -> Result<Self, Error> {
        match channel {
            0 ..= 3 => Ok(OutputKind::Lvpecl),
            4 ..= 7 => Ok(OutputKind::LvdsCmos),
            _ => Err(Error::InvalidChannel),
        }
    }

    pub fn divider_max(self: Self) -> u32 {
        match self {
            OutputKind::Lvpecl => DIVIDER_MAX,
            OutputKind::LvdsCmos => LVDS_CMOS_DIVIDER_MAX,
        }
    }
}


/// Clock distribution settings for one output
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct ChannelPlan {
    /// 1 means VCO divider bypassed
    pub vco_divider: u8,
    /// Total channel division
    pub divider: u32,
    /// Frequency actually produced, Hz
    pub out_hz: u64,
}

impl ChannelPlan {
    /// Picks the VCO divider and the channel division giving the frequency
    /// closest to `target_hz`.
    ///
    /// `input_hz` - VCO or CLK input frequency
    /// `vco_input` - the VCO drives the distribution (VCO divider can't be bypassed)
    pub fn new(input_hz: u64, vco_input: bool, kind: OutputKind, target_hz: u64) -> Result<Self, Error> {
        if target_hz == 0 {
            return Err(Error::InvalidFrequency);
        }

        let mut vco_divider = if vco_input { VCO_DIVIDER_MIN } else { 1 };
        let mut freq = input_hz / vco_divider as u64;
        while freq > CHAN_DIV_FREQ_MAX {
            if vco_divider >= VCO_DIVIDER_MAX {
                return Err(Error::InvalidFrequency);
            }
            vco_divider += 1;
            freq = input_hz / vco_divider as u64;
        }

        // Nothing faster than the undivided channel input
        if target_hz >= freq {
            return Ok(ChannelPlan { vco_divider, divider: 1, out_hz: freq });
        }

        let divider_max = kind.divider_max() as u64;
        while vco_divider < VCO_DIVIDER_MAX && freq / target_hz > divider_max {
            vco_divider += 1;
            freq = input_hz / vco_divider as u64;
        }

        if freq / target_hz > divider_max {
            return Ok(ChannelPlan {
                vco_divider,
                divider: divider_max as u32,
                out_hz: freq / divider_max,
            });
        }

        // Walk dividers down to the first frequency below the target,
        // remembering the last one at or above it.
        let mut divider = 1u64;
        let mut above = (1u64, freq);
        let mut current = freq;
        while current >= target_hz {
            above = (divider, current);
            divider += 1;
            if divider > DIVIDER_MAX as u64 {
                while divider <= divider_max && !splits_into_dividers(divider as u32) {
                    divider += 1;
                }
            }
            current = freq / divider;
        }

        let (divider, out_hz) = if divider > divider_max || target_hz - current > above.1 - target_hz {
            above
        } else {
            (divider, current)
        };

        Ok(ChannelPlan { vco_divider, divider: divider as u32, out_hz })
    }
}


/// True if `n` is a product of two dividers of at most 32 each.
pub fn splits_into_dividers(n: u32) -> bool {
    split_divider(n).is_some()
}

/// Splits a cascaded division into (divider 1, divider 2), both ≤ 32,
/// divider 2 as large as possible.
pub fn split_divider(n: u32) -> Option<(u32, u32)> {
    (1..=DIVIDER_MAX)
        .rev()
        .find(|d2| n % d2 == 0 && n / d2 <= DIVIDER_MAX)
        .map(|d2| (n / d2, d2))
}

/// (low, high) cycle counts giving the duty cycle closest to 50 %
pub fn duty_cycles(divider: u32) -> (u32, u32) {
    let half = divider / 2;
    (half.saturating_sub(1), (half + divider % 2).saturating_sub(1))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pll_integer_vco() {
        // 25 MHz reference, N = 60 = 8 * 7 + 4
        let p = PllPlan::new(25_000_000, 1_500_000_000).unwrap();
        assert_eq!(p.r_counter, 1);
        assert_eq!(p.prescaler_p, 8);
        assert_eq!(p.prescaler_code, 4);
        assert_eq!((p.b_counter, p.a_counter), (7, 4));
        assert_eq!(p.vco_hz, 1_500_000_000);
        assert_eq!(p.antibacklash_pulse_width, 0);
    }

    #[test]
    fn pll_pfd_limit() {
        // 250 MHz reference must be divided down to <= 100 MHz
        let p = PllPlan::new(250_000_000, 2_000_000_000).unwrap();
        assert_eq!(p.r_counter, 3);
        assert_eq!(p.pfd_hz, 83_333_333);
        assert_eq!((p.b_counter, p.a_counter), (3, 0));
        assert_eq!(p.antibacklash_pulse_width, 1);
        assert_eq!(p.vco_hz, 83_333_333 * 24);
    }

    #[test]
    fn pll_raises_r_for_small_n() {
        // N = 2 can't satisfy B >= 3 at R = 1
        let p = PllPlan::new(100_000_000, 200_000_000).unwrap();
        assert!(p.r_counter > 1);
        assert!(p.b_counter >= 3 && p.b_counter > p.a_counter);
    }

    #[test]
    fn pll_rejects_zero() {
        assert_eq!(PllPlan::new(0, 1_500_000_000), Err(Error::InvalidFrequency));
    }

    #[test]
    fn channel_exact_division() {
        // VCO 1.5 GHz / 2 = 750 MHz into the channel dividers
        let c = ChannelPlan::new(1_500_000_000, true, OutputKind::Lvpecl, 250_000_000).unwrap();
        assert_eq!(c.vco_divider, 2);
        assert_eq!(c.divider, 3);
        assert_eq!(c.out_hz, 250_000_000);
    }

    #[test]
    fn channel_closest_frequency() {
        // 750 MHz / 7 = 107.1 MHz is closer to 105 MHz than 750 / 8 = 93.75 MHz
        let c = ChannelPlan::new(1_500_000_000, true, OutputKind::Lvpecl, 105_000_000).unwrap();
        assert_eq!(c.divider, 7);
        // 750 / 8 = 93.75 MHz is closer to 95 MHz than 107.1 MHz
        let c = ChannelPlan::new(1_500_000_000, true, OutputKind::Lvpecl, 95_000_000).unwrap();
        assert_eq!(c.divider, 8);
    }

    #[test]
    fn channel_raises_vco_divider() {
        // 750 MHz / 32 = 23.4 MHz is too fast for 10 MHz, VCO divider goes up
        let c = ChannelPlan::new(1_500_000_000, true, OutputKind::Lvpecl, 10_000_000).unwrap();
        assert!(c.vco_divider > 2);
        assert!(c.divider <= 32);
        assert_eq!(c.out_hz, 1_500_000_000 / c.vco_divider as u64 / c.divider as u64);
    }

    #[test]
    fn channel_clamps_to_max_division() {
        let c = ChannelPlan::new(1_500_000_000, true, OutputKind::Lvpecl, 1_000).unwrap();
        assert_eq!(c.vco_divider, 6);
        assert_eq!(c.divider, 32);
        assert_eq!(c.out_hz, 250_000_000 / 32);
    }

    #[test]
    fn channel_target_above_input() {
        let c = ChannelPlan::new(1_500_000_000, true, OutputKind::Lvpecl, 900_000_000).unwrap();
        assert_eq!((c.vco_divider, c.divider, c.out_hz), (2, 1, 750_000_000));
        let c = ChannelPlan::new(250_000_000, false, OutputKind::LvdsCmos, 300_000_000).unwrap();
        assert_eq!((c.vco_divider, c.divider, c.out_hz), (1, 1, 250_000_000));
    }

    #[test]
    fn channel_input_too_fast() {
        assert_eq!(ChannelPlan::new(u64::MAX, true, OutputKind::Lvpecl, 1_000_000),
                   Err(Error::InvalidFrequency));
        assert_eq!(ChannelPlan::new(u64::MAX, false, OutputKind::LvdsCmos, 1_000_000),
                   Err(Error::InvalidFrequency));
    }

    #[test]
    fn lvds_cascaded_division() {
        // 250 MHz / 50 = 5 MHz, 50 = 2 * 25
        let c = ChannelPlan::new(250_000_000, false, OutputKind::LvdsCmos, 5_000_000).unwrap();
        assert_eq!(c.vco_divider, 1);
        assert_eq!(c.divider, 50);
        assert_eq!(split_divider(50), Some((2, 25)));
    }

    #[test]
    fn lvds_skips_prime_dividers() {
        // 37 is prime, next splittable division is 38 = 2 * 19
        let c = ChannelPlan::new(370_000_000, false, OutputKind::LvdsCmos, 9_800_000).unwrap();
        assert_eq!(c.divider, 38);
    }

    #[test]
    fn divider_helpers() {
        assert!(splits_into_dividers(1024));
        assert!(!splits_into_dividers(37));
        assert!(!splits_into_dividers(1025));
        assert_eq!(split_divider(64), Some((2, 32)));
        assert_eq!(duty_cycles(2), (0, 0));
        assert_eq!(duty_cycles(7), (2, 3));
        assert_eq!(duty_cycles(32), (15, 15));
    }
}
