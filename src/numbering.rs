//! Satellite numbering.
//!
//! U-Blox receivers identify vehicles either by a legacy single range number
//! (older messages: 1-32 GPS, 65-96 Glonass, 120-158 SBAS, 193-202 QZSS),
//! or by a (gnss id, sv id) pair. Both converge to the same [SV].
use std::ops::RangeInclusive;

use gnss::prelude::{Constellation, SV};

use crate::{
    constants::{GLONASS_LEGACY_OFFSET, GLONASS_UNKNOWN_SLOT, QZSS_LEGACY_OFFSET, SBAS_PRN_OFFSET},
    error::Error,
};

/// Converts U-Blox gnss id to [Constellation].
/// IMES (#4) has no counterpart and is not supported.
pub fn to_constellation(gnss_id: u8) -> Option<Constellation> {
    match gnss_id {
        0 => Some(Constellation::GPS),
        1 => Some(Constellation::SBAS),
        2 => Some(Constellation::Galileo),
        3 => Some(Constellation::BeiDou),
        5 => Some(Constellation::QZSS),
        6 => Some(Constellation::Glonass),
        _ => None,
    }
}

/// Identifies a vehicle from its raw number, with optional U-Blox gnss id.
/// Without gnss id, the legacy single range numbering applies.
pub fn normalize(id: u8, gnss_id: Option<u8>) -> Result<SV, Error> {
    let unknown = Error::UnknownSatellite { id, gnss_id };

    let Some(gnss_id) = gnss_id else {
        return match id {
            1..=32 => Ok(SV::new(Constellation::GPS, id)),
            65..=96 => Ok(SV::new(Constellation::Glonass, id - GLONASS_LEGACY_OFFSET)),
            120..=158 => Ok(SV::new(Constellation::SBAS, id - SBAS_PRN_OFFSET)),
            193..=202 => Ok(SV::new(Constellation::QZSS, id - QZSS_LEGACY_OFFSET)),
            GLONASS_UNKNOWN_SLOT => Ok(SV::new(Constellation::Glonass, GLONASS_UNKNOWN_SLOT)),
            _ => Err(unknown),
        };
    };

    let constellation = to_constellation(gnss_id).ok_or(unknown)?;

    match (constellation, id) {
        (Constellation::SBAS, 120..=158) => Ok(SV::new(constellation, id - SBAS_PRN_OFFSET)),
        (Constellation::QZSS, 193..=202) => Ok(SV::new(constellation, id - QZSS_LEGACY_OFFSET)),
        (Constellation::Glonass, 65..=96) => Ok(SV::new(constellation, id - GLONASS_LEGACY_OFFSET)),
        (Constellation::Glonass, GLONASS_UNKNOWN_SLOT) => Ok(SV::new(constellation, id)),
        (Constellation::SBAS, _) => Err(Error::UnknownSatellite {
            id,
            gnss_id: Some(gnss_id),
        }),
        (c, id) if system_range(c).contains(&id) => Ok(SV::new(c, id)),
        _ => Err(Error::UnknownSatellite {
            id,
            gnss_id: Some(gnss_id),
        }),
    }
}

/// Returns the legacy single range number of this [SV], when it exists.
pub fn legacy_prn(sv: SV) -> Option<u8> {
    match sv.constellation {
        Constellation::GPS if sv.prn <= 32 => Some(sv.prn),
        Constellation::QZSS if sv.prn <= 10 => Some(sv.prn + QZSS_LEGACY_OFFSET),
        Constellation::Glonass if sv.prn == GLONASS_UNKNOWN_SLOT => Some(GLONASS_UNKNOWN_SLOT),
        Constellation::Glonass if sv.prn <= 32 => Some(sv.prn + GLONASS_LEGACY_OFFSET),
        c if c.is_sbas() && (20..=58).contains(&sv.prn) => Some(sv.prn + SBAS_PRN_OFFSET),
        _ => None,
    }
}

/// Valid index range of each [Constellation], in [SV] numbering.
pub fn system_range(constellation: Constellation) -> RangeInclusive<u8> {
    match constellation {
        Constellation::GPS => 1..=32,
        Constellation::Galileo => 1..=36,
        Constellation::BeiDou => 1..=63,
        Constellation::QZSS => 1..=10,
        Constellation::Glonass => 1..=32,
        c if c.is_sbas() => 20..=58,
        _ => 1..=0,
    }
}

/// Name used in labels and directives
pub fn system_name(constellation: Constellation) -> &'static str {
    match constellation {
        Constellation::GPS => "GPS",
        Constellation::Galileo => "Galileo",
        Constellation::BeiDou => "BeiDou",
        Constellation::QZSS => "QZSS",
        Constellation::Glonass => "GLONASS",
        c if c.is_sbas() => "SBAS",
        _ => "UNKNOWN",
    }
}

/// Case insensitive [system_name] reciprocal
pub fn system_from_name(name: &str) -> Option<Constellation> {
    match name.to_uppercase().as_str() {
        "GPS" => Some(Constellation::GPS),
        "SBAS" => Some(Constellation::SBAS),
        "GALILEO" => Some(Constellation::Galileo),
        "BEIDOU" => Some(Constellation::BeiDou),
        "QZSS" => Some(Constellation::QZSS),
        "GLONASS" => Some(Constellation::Glonass),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn legacy_numbering() {
        for prn in 1..=32 {
            assert_eq!(
                normalize(prn, None).unwrap(),
                SV::new(Constellation::GPS, prn)
            );
        }
        for id in 65..=96 {
            assert_eq!(
                normalize(id, None).unwrap(),
                SV::new(Constellation::Glonass, id - 64)
            );
        }
        for id in 193..=202 {
            assert_eq!(
                normalize(id, None).unwrap(),
                SV::new(Constellation::QZSS, id - 192)
            );
        }
        assert_eq!(
            normalize(120, None).unwrap(),
            SV::new(Constellation::SBAS, 20)
        );
        assert_eq!(
            normalize(255, None).unwrap(),
            SV::new(Constellation::Glonass, 255)
        );
        for id in [0, 33, 64, 97, 119, 159, 192, 203, 254] {
            assert!(
                matches!(normalize(id, None), Err(Error::UnknownSatellite { .. })),
                "#{} should not be identified",
                id
            );
        }
    }

    #[test]
    fn gnss_id_numbering() {
        assert_eq!(
            normalize(5, Some(0)).unwrap(),
            SV::new(Constellation::GPS, 5)
        );
        assert_eq!(
            normalize(3, Some(5)).unwrap(),
            SV::new(Constellation::QZSS, 3)
        );
        assert_eq!(
            normalize(133, Some(1)).unwrap(),
            SV::new(Constellation::SBAS, 33)
        );
        assert_eq!(
            normalize(12, Some(2)).unwrap(),
            SV::new(Constellation::Galileo, 12)
        );
        assert_eq!(
            normalize(255, Some(6)).unwrap(),
            SV::new(Constellation::Glonass, 255)
        );
        assert!(normalize(1, Some(4)).is_err(), "IMES is not supported");
        assert!(normalize(1, Some(7)).is_err());
        assert!(normalize(12, Some(1)).is_err());
    }

    #[test]
    fn legacy_roundtrip() {
        for id in (1..=32).chain(65..=96).chain(120..=158).chain(193..=202) {
            let sv = normalize(id, None).unwrap();
            assert_eq!(legacy_prn(sv), Some(id));
        }
        assert_eq!(legacy_prn(SV::new(Constellation::Galileo, 1)), None);
        assert_eq!(
            legacy_prn(SV::new(Constellation::Glonass, 255)),
            Some(255)
        );
    }

    #[test]
    fn names() {
        for c in [
            Constellation::GPS,
            Constellation::SBAS,
            Constellation::Galileo,
            Constellation::BeiDou,
            Constellation::QZSS,
            Constellation::Glonass,
        ] {
            assert_eq!(system_from_name(system_name(c)), Some(c));
        }
        assert_eq!(system_from_name("glonass"), Some(Constellation::Glonass));
        assert_eq!(system_from_name("IMES"), None);
    }
}
