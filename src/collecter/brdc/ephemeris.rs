use super::subframe::{Subframe1, Subframe2, Subframe3};

/// Complete GPS broadcast ephemeris, angles in radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GpsEphemeris {
    /// Full week number (no rollover)
    pub week: u32,
    pub ura: u8,
    pub health: u8,
    pub iodc: u16,
    pub iode: u8,
    pub tgd: f64,
    pub toc: f64,
    pub af0: f64,
    pub af1: f64,
    pub af2: f64,
    pub toe: f64,
    pub sqrt_a: f64,
    pub e: f64,
    pub m0: f64,
    pub delta_n: f64,
    pub omega0: f64,
    pub omega: f64,
    pub omega_dot: f64,
    pub i0: f64,
    pub idot: f64,
    pub crs: f64,
    pub crc: f64,
    pub cus: f64,
    pub cuc: f64,
    pub cis: f64,
    pub cic: f64,
    pub fit_interval: bool,
}

impl GpsEphemeris {
    /// Merges the three ephemeris subframes, `week` being
    /// the reconciled full week number.
    pub fn new(sf1: &Subframe1, sf2: &Subframe2, sf3: &Subframe3, week: u32) -> Self {
        Self {
            week,
            ura: sf1.ura,
            health: sf1.health,
            iodc: sf1.iodc,
            iode: sf2.iode,
            tgd: sf1.tgd,
            toc: sf1.toc,
            af0: sf1.af0,
            af1: sf1.af1,
            af2: sf1.af2,
            toe: sf2.toe,
            sqrt_a: sf2.sqrt_a,
            e: sf2.e,
            m0: sf2.m0,
            delta_n: sf2.delta_n,
            omega0: sf3.omega0,
            omega: sf3.omega,
            omega_dot: sf3.omega_dot,
            i0: sf3.i0,
            idot: sf3.idot,
            crs: sf2.crs,
            crc: sf3.crc,
            cus: sf2.cus,
            cuc: sf2.cuc,
            cis: sf3.cis,
            cic: sf3.cic,
            fit_interval: sf2.fit_interval,
        }
    }
}

/// Klobuchar & GPS/UTC parameters (subframe 4, page 18, SV ID 56)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IonoUtcParameters {
    pub alpha: [f64; 4],
    pub beta: [f64; 4],
    pub a0: f64,
    pub a1: f64,
    /// UTC reference time of week [s]
    pub tot: u32,
    /// UTC reference week, modulo 256
    pub wnt: u8,
    pub delta_t_ls: i8,
    pub wn_lsf: u8,
    pub dn: u8,
    pub delta_t_lsf: i8,
}
