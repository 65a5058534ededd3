/// Speed of light in vacuum [m/s]
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// GPS / QZSS / SBAS L1 and Galileo E1 carrier [Hz]
pub const L1_FREQUENCY_HZ: f64 = 1575.42E6;

/// BeiDou B1I carrier [Hz]
pub const B1I_FREQUENCY_HZ: f64 = 1561.098E6;

/// Glonass G1 carrier, central channel [Hz]
pub const G1_FREQUENCY_HZ: f64 = 1602.0E6;

/// Glonass G1 channel spacing [Hz]
pub const G1_CHANNEL_SPACING_HZ: f64 = 0.5625E6;

/// WGS84 semi major axis [m]
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS84 semi minor axis [m]
pub const WGS84_SEMI_MINOR_AXIS_M: f64 = 6_356_752.314245;

/// Legacy (single range) PRN offset of QZSS vehicles
pub const QZSS_LEGACY_OFFSET: u8 = 192;

/// Legacy (single range) PRN offset of Glonass slots
pub const GLONASS_LEGACY_OFFSET: u8 = 64;

/// SBAS PRN offset, RINEX "Sxx" being PRN - 100
pub const SBAS_PRN_OFFSET: u8 = 100;

/// Glonass vehicle whose slot is not known (yet)
pub const GLONASS_UNKNOWN_SLOT: u8 = 255;
