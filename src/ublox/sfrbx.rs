use byteorder::{ByteOrder, LittleEndian};

use gnss::prelude::{Constellation, SV};
use ublox_lib::RxmSfrbxRef;

use crate::{error::Error, numbering::normalize, ublox::RXM_SFRB};

const SFRB_LEN: usize = 42;

/// Broadcast navigation subframe, as 30-bit words right aligned in 32 bits
/// (parity bits 5..0 of each word may be cleared).
#[derive(Debug, Clone, PartialEq)]
pub struct Subframe {
    pub sv: SV,
    pub words: Vec<u32>,
}

/// Decodes UBX-RXM-SFRB (legacy subframe buffer): 10 words, GPS words
/// only carry 24 data bits that we realign on the 30-bit layout.
pub fn decode_rxm_sfrb(payload: &[u8]) -> Result<Subframe, Error> {
    if payload.len() != SFRB_LEN {
        return Err(Error::MalformedMessage {
            class: RXM_SFRB.0,
            id: RXM_SFRB.1,
            reason: "length mismatch",
        });
    }

    let sv = normalize(payload[1], None)?;

    let words = payload[2..]
        .chunks_exact(4)
        .map(|bytes| {
            let word = LittleEndian::read_u32(bytes);
            if sv.constellation == Constellation::GPS {
                (word & 0xffffff) << 6
            } else {
                word
            }
        })
        .collect();

    Ok(Subframe { sv, words })
}

/// Decodes UBX-RXM-SFRBX (broadcast navigation data subframe)
pub fn decode_rxm_sfrbx(pkt: &RxmSfrbxRef) -> Result<Subframe, Error> {
    let sv = normalize(pkt.sv_id(), Some(pkt.gnss_id()))?;
    Ok(Subframe {
        sv,
        words: pkt.dwrd().collect(),
    })
}
