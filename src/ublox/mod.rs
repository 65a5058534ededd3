//! UBX protocol: framing and decoding of the raw measurement
//! and navigation subframe messages.
use hifitime::{Epoch, TimeScale};

use ublox_lib::{PacketRef, RxmRawx, RxmSfrbx, UbxPacketMeta};

use crate::{collecter::observations::MeasurementEpoch, error::Error};

mod frame;
mod rawx;
mod sfrbx;

pub use frame::Framer;
pub use sfrbx::Subframe;

/// UBX-RXM-RAW (class, id), not modeled by the UBX library
pub const RXM_RAW: (u8, u8) = (0x02, 0x10);
/// UBX-RXM-SFRB (class, id), not modeled by the UBX library
pub const RXM_SFRB: (u8, u8) = (0x02, 0x11);
/// UBX-RXM-SFRBX (class, id)
pub const RXM_SFRBX: (u8, u8) = (<RxmSfrbx as UbxPacketMeta>::CLASS, <RxmSfrbx as UbxPacketMeta>::ID);
/// UBX-RXM-RAWX (class, id)
pub const RXM_RAWX: (u8, u8) = (<RxmRawx as UbxPacketMeta>::CLASS, <RxmRawx as UbxPacketMeta>::ID);

/// GPST [Epoch] from week counter and time of week [s]
pub fn gpst(week: u32, tow_s: f64) -> Epoch {
    let nanos = (tow_s * 1.0E9).round() as u64;
    Epoch::from_time_of_week(week, nanos, TimeScale::GPST)
}

/// Supported UBX messages
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// RXM-RAW or RXM-RAWX measurements
    Measurement(MeasurementEpoch),
    /// RXM-SFRB or RXM-SFRBX subframe
    Subframe(Subframe),
}

impl Message {
    pub fn decode(packet: &PacketRef) -> Result<Self, Error> {
        match packet {
            PacketRef::RxmRawx(pkt) => Ok(Self::Measurement(rawx::decode_rxm_rawx(pkt))),
            PacketRef::RxmSfrbx(pkt) => Ok(Self::Subframe(sfrbx::decode_rxm_sfrbx(pkt)?)),
            PacketRef::Unknown(pkt) => match (pkt.class, pkt.msg_id) {
                RXM_RAW => Ok(Self::Measurement(rawx::decode_rxm_raw(pkt.payload)?)),
                RXM_SFRB => Ok(Self::Subframe(sfrbx::decode_rxm_sfrb(pkt.payload)?)),
                (class, id) => Err(Error::UnknownMessage { class, id }),
            },
            packet => {
                let (class, id) = packet.class_and_msg_id();
                Err(Error::UnknownMessage { class, id })
            },
        }
    }
}
