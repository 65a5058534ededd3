//! GPS LNAV subframe decoding.
//!
//! Bit positions index the 240 data bits of one subframe
//! (10 words x 24 bits, parity stripped), MSB first.
use std::f64::consts::PI;

use super::ephemeris::IonoUtcParameters;

/// SV ID of subframe 4 page 18, carrying the ionospheric & UTC parameters
const IONO_UTC_PAGE_ID: u8 = 56;

/// View over the data bits of 30-bit words
struct Bits<'a>(&'a [u32]);

impl Bits<'_> {
    fn unsigned(&self, start: usize, len: usize) -> u32 {
        (start..start + len).fold(0, |acc, bit| {
            let word = (self.0[bit / 24] >> 6) & 0xff_ffff;
            (acc << 1) | ((word >> (23 - bit % 24)) & 0x01)
        })
    }

    fn signed(&self, start: usize, len: usize) -> i32 {
        let shift = 32 - len as u32;
        ((self.unsigned(start, len) << shift) as i32) >> shift
    }

    fn scaled(&self, start: usize, len: usize, pow2: i32) -> f64 {
        self.unsigned(start, len) as f64 * 2.0_f64.powi(pow2)
    }

    fn scaled_signed(&self, start: usize, len: usize, pow2: i32) -> f64 {
        self.signed(start, len) as f64 * 2.0_f64.powi(pow2)
    }
}

/// Clock & health (subframe 1)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Subframe1 {
    /// Week number, modulo 1024
    pub week: u16,
    pub ura: u8,
    pub health: u8,
    pub iodc: u16,
    pub tgd: f64,
    pub toc: f64,
    pub af2: f64,
    pub af1: f64,
    pub af0: f64,
}

/// Orbit, 1st part (subframe 2)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Subframe2 {
    pub iode: u8,
    pub crs: f64,
    pub delta_n: f64,
    pub m0: f64,
    pub cuc: f64,
    pub e: f64,
    pub cus: f64,
    pub sqrt_a: f64,
    pub toe: f64,
    pub fit_interval: bool,
}

/// Orbit, 2nd part (subframe 3)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Subframe3 {
    pub cic: f64,
    pub omega0: f64,
    pub cis: f64,
    pub i0: f64,
    pub crc: f64,
    pub omega: f64,
    pub omega_dot: f64,
    pub iode: u8,
    pub idot: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LnavSubframe {
    Clock(Subframe1),
    Orbit1(Subframe2),
    Orbit2(Subframe3),
    /// Almanac, health and special pages (subframes 4 and 5)
    Special {
        subframe_id: u8,
        page_id: u8,
        iono_utc: Option<IonoUtcParameters>,
    },
}

impl LnavSubframe {
    pub fn decode(words: &[u32]) -> Result<Self, &'static str> {
        if words.len() < 10 {
            return Err("less than 10 words");
        }

        let bits = Bits(words);

        match bits.unsigned(43, 3) as u8 {
            1 => Ok(Self::Clock(Subframe1 {
                week: bits.unsigned(48, 10) as u16,
                ura: bits.unsigned(60, 4) as u8,
                health: bits.unsigned(64, 6) as u8,
                iodc: ((bits.unsigned(70, 2) << 8) | bits.unsigned(168, 8)) as u16,
                tgd: bits.scaled_signed(160, 8, -31),
                toc: bits.scaled(176, 16, 4),
                af2: bits.scaled_signed(192, 8, -55),
                af1: bits.scaled_signed(200, 16, -43),
                af0: bits.scaled_signed(216, 22, -31),
            })),
            2 => Ok(Self::Orbit1(Subframe2 {
                iode: bits.unsigned(48, 8) as u8,
                crs: bits.scaled_signed(56, 16, -5),
                delta_n: bits.scaled_signed(72, 16, -43) * PI,
                m0: bits.scaled_signed(88, 32, -31) * PI,
                cuc: bits.scaled_signed(120, 16, -29),
                e: bits.scaled(136, 32, -33),
                cus: bits.scaled_signed(168, 16, -29),
                sqrt_a: bits.scaled(184, 32, -19),
                toe: bits.scaled(216, 16, 4),
                fit_interval: bits.unsigned(232, 1) == 1,
            })),
            3 => Ok(Self::Orbit2(Subframe3 {
                cic: bits.scaled_signed(48, 16, -29),
                omega0: bits.scaled_signed(64, 32, -31) * PI,
                cis: bits.scaled_signed(96, 16, -29),
                i0: bits.scaled_signed(112, 32, -31) * PI,
                crc: bits.scaled_signed(144, 16, -5),
                omega: bits.scaled_signed(160, 32, -31) * PI,
                omega_dot: bits.scaled_signed(192, 24, -43) * PI,
                iode: bits.unsigned(216, 8) as u8,
                idot: bits.scaled_signed(224, 14, -43) * PI,
            })),
            subframe_id @ (4 | 5) => {
                let page_id = bits.unsigned(50, 6) as u8;
                let iono_utc = if subframe_id == 4 && page_id == IONO_UTC_PAGE_ID {
                    Some(IonoUtcParameters {
                        alpha: [
                            bits.scaled_signed(56, 8, -30),
                            bits.scaled_signed(64, 8, -27),
                            bits.scaled_signed(72, 8, -24),
                            bits.scaled_signed(80, 8, -24),
                        ],
                        beta: [
                            bits.scaled_signed(88, 8, 11),
                            bits.scaled_signed(96, 8, 14),
                            bits.scaled_signed(104, 8, 16),
                            bits.scaled_signed(112, 8, 16),
                        ],
                        a1: bits.scaled_signed(120, 24, -50),
                        a0: bits.scaled_signed(144, 32, -30),
                        tot: bits.unsigned(176, 8) << 12,
                        wnt: bits.unsigned(184, 8) as u8,
                        delta_t_ls: bits.signed(192, 8) as i8,
                        wn_lsf: bits.unsigned(200, 8) as u8,
                        dn: bits.unsigned(208, 8) as u8,
                        delta_t_lsf: bits.signed(216, 8) as i8,
                    })
                } else {
                    None
                };
                Ok(Self::Special {
                    subframe_id,
                    page_id,
                    iono_utc,
                })
            },
            _ => Err("invalid subframe id"),
        }
    }

    pub fn subframe_id(&self) -> u8 {
        match self {
            Self::Clock(_) => 1,
            Self::Orbit1(_) => 2,
            Self::Orbit2(_) => 3,
            Self::Special { subframe_id, .. } => *subframe_id,
        }
    }

    /// IODC (subframe 1), IODE (subframes 2 & 3),
    /// negative for pages that are not part of an ephemeris.
    pub fn issue_of_data(&self) -> i32 {
        match self {
            Self::Clock(sf1) => sf1.iodc as i32,
            Self::Orbit1(sf2) => sf2.iode as i32,
            Self::Orbit2(sf3) => sf3.iode as i32,
            Self::Special { .. } => -1,
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Writes `value` at given data bit position, using the 30-bit word layout
    pub(crate) fn put(words: &mut [u32], start: usize, len: usize, value: u32) {
        for i in 0..len {
            let bit = start + i;
            let mask = 1 << (29 - bit % 24);
            if (value >> (len - 1 - i)) & 0x01 == 0x01 {
                words[bit / 24] |= mask;
            } else {
                words[bit / 24] &= !mask;
            }
        }
    }

    /// Builds a subframe with its HOW word set
    pub(crate) fn subframe(id: u8) -> [u32; 10] {
        let mut words = [0; 10];
        put(&mut words, 0, 8, 0x8b);
        put(&mut words, 24, 17, 1234);
        put(&mut words, 43, 3, id as u32);
        words
    }

    pub(crate) fn subframe1(week: u16, iodc: u16) -> [u32; 10] {
        let mut words = subframe(1);
        put(&mut words, 48, 10, week as u32);
        put(&mut words, 70, 2, (iodc >> 8) as u32);
        put(&mut words, 168, 8, (iodc & 0xff) as u32);
        put(&mut words, 176, 16, 450);
        put(&mut words, 216, 22, (-2048_i32) as u32 & 0x3f_ffff);
        words
    }

    pub(crate) fn subframe2(iode: u8) -> [u32; 10] {
        let mut words = subframe(2);
        put(&mut words, 48, 8, iode as u32);
        put(&mut words, 184, 32, 2_702_000_000);
        put(&mut words, 216, 16, 450);
        words
    }

    pub(crate) fn subframe3(iode: u8) -> [u32; 10] {
        let mut words = subframe(3);
        put(&mut words, 216, 8, iode as u32);
        put(&mut words, 224, 14, (-100_i32) as u32 & 0x3fff);
        words
    }

    #[test]
    fn bit_extraction() {
        let mut words = [0; 10];
        put(&mut words, 20, 8, 0xa5);
        let bits = Bits(&words);
        assert_eq!(bits.unsigned(20, 8), 0xa5);
        assert_eq!(bits.signed(20, 8), 0xa5_u8 as i8 as i32);
        assert_eq!(words[0] & 0x3f, 0, "parity bits untouched");
    }

    #[test]
    fn clock_subframe() {
        let sf = LnavSubframe::decode(&subframe1(171, 0x2a5)).unwrap();
        assert_eq!(sf.subframe_id(), 1);
        assert_eq!(sf.issue_of_data(), 0x2a5);
        match sf {
            LnavSubframe::Clock(sf1) => {
                assert_eq!(sf1.week, 171);
                assert_eq!(sf1.toc, 7200.0);
                assert_eq!(sf1.af0, -2048.0 * 2.0_f64.powi(-31));
            },
            other => panic!("decoded {:?}", other),
        }
    }

    #[test]
    fn orbit_subframes() {
        match LnavSubframe::decode(&subframe2(0xa5)).unwrap() {
            LnavSubframe::Orbit1(sf2) => {
                assert_eq!(sf2.iode, 0xa5);
                assert_eq!(sf2.toe, 7200.0);
                assert_eq!(sf2.sqrt_a, 2_702_000_000.0 * 2.0_f64.powi(-19));
            },
            other => panic!("decoded {:?}", other),
        }
        match LnavSubframe::decode(&subframe3(0xa5)).unwrap() {
            LnavSubframe::Orbit2(sf3) => {
                assert_eq!(sf3.iode, 0xa5);
                assert_eq!(sf3.idot, -100.0 * 2.0_f64.powi(-43) * PI);
            },
            other => panic!("decoded {:?}", other),
        }
    }

    #[test]
    fn iono_utc_page() {
        let mut words = subframe(4);
        put(&mut words, 48, 2, 1);
        put(&mut words, 50, 6, 56);
        put(&mut words, 56, 8, 0x10);
        put(&mut words, 88, 8, 0xfe);
        put(&mut words, 192, 8, 18);

        let sf = LnavSubframe::decode(&words).unwrap();
        assert!(sf.issue_of_data() < 0);

        match sf {
            LnavSubframe::Special {
                subframe_id: 4,
                page_id: 56,
                iono_utc: Some(params),
            } => {
                assert_eq!(params.alpha[0], 16.0 * 2.0_f64.powi(-30));
                assert_eq!(params.beta[0], -2.0 * 2.0_f64.powi(11));
                assert_eq!(params.delta_t_ls, 18);
            },
            other => panic!("decoded {:?}", other),
        }

        let mut words = subframe(5);
        put(&mut words, 50, 6, 56);
        match LnavSubframe::decode(&words).unwrap() {
            LnavSubframe::Special { iono_utc: None, .. } => {},
            other => panic!("decoded {:?}", other),
        }
    }

    #[test]
    fn invalid_subframes() {
        assert!(LnavSubframe::decode(&subframe(6)).is_err());
        assert!(LnavSubframe::decode(&[0; 4]).is_err());
    }
}
