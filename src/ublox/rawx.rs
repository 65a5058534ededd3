use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};

use gnss::prelude::Constellation;
use ublox_lib::{RxmRawxRef, TrkStatFlags};

use crate::{
    collecter::observations::{MeasurementEpoch, Observable},
    constants::{G1_CHANNEL_SPACING_HZ, G1_FREQUENCY_HZ},
    error::Error,
    numbering::normalize,
    ublox::{gpst, RXM_RAW},
};

const RAW_HEADER_LEN: usize = 8;
const RAW_BLOCK_LEN: usize = 24;

fn malformed(reason: &'static str) -> Error {
    Error::MalformedMessage {
        class: RXM_RAW.0,
        id: RXM_RAW.1,
        reason,
    }
}

/// Decodes UBX-RXM-RAW (legacy raw measurements)
pub fn decode_rxm_raw(payload: &[u8]) -> Result<MeasurementEpoch, Error> {
    if payload.len() < RAW_HEADER_LEN {
        return Err(malformed("truncated header"));
    }

    let itow_ms = LittleEndian::read_i32(&payload[0..4]);
    let week = LittleEndian::read_i16(&payload[4..6]);
    let num_sv = payload[6] as usize;

    if payload.len() != RAW_HEADER_LEN + RAW_BLOCK_LEN * num_sv {
        return Err(malformed("length mismatch"));
    }
    if week < 0 || itow_ms < 0 {
        return Err(malformed("negative time of week"));
    }

    let t = gpst(week as u32, itow_ms as f64 / 1.0E3);
    let mut meas = MeasurementEpoch::new(t);

    for block in payload[RAW_HEADER_LEN..].chunks_exact(RAW_BLOCK_LEN) {
        let sv = match normalize(block[20], None) {
            Ok(sv) => sv,
            Err(e) => {
                debug!("{} - rxm-raw: {}", t, e);
                continue;
            },
        };

        let cp = LittleEndian::read_f64(&block[0..8]);
        let pr = LittleEndian::read_f64(&block[8..16]);
        let dop = LittleEndian::read_f32(&block[16..20]) as f64;
        let cno = block[22] as i8;
        let lli = block[23];

        trace!("{}({}) pr={} cp={} dop={} cno={}", t, sv, pr, cp, dop, cno);

        meas.add(sv, Observable::Pseudorange, pr);
        meas.add(sv, Observable::Doppler, dop);
        meas.add(sv, Observable::CarrierPhase, cp);
        meas.add(sv, Observable::SignalStrength, cno as f64);

        // RINEX LLI bit 0: lock lost since previous observation,
        // which maps to negative lock duration
        let lock = if lli & 0x01 == 0x01 { -1.0 } else { 0.0 };
        meas.add(sv, Observable::LockDuration, lock);
    }

    Ok(meas)
}

/// Decodes UBX-RXM-RAWX (multi GNSS raw measurements).
/// Only the primary signal of each vehicle, its first block, is retained.
pub fn decode_rxm_rawx(pkt: &RxmRawxRef) -> MeasurementEpoch {
    let t = gpst(pkt.week() as u32, pkt.rcv_tow());
    let mut meas = MeasurementEpoch::new(t);

    for block in pkt.measurements() {
        let sv = match normalize(block.sv_id(), Some(block.gnss_id())) {
            Ok(sv) => sv,
            Err(e) => {
                debug!("{} - rxm-rawx: {}", t, e);
                continue;
            },
        };

        if meas.contains(sv) {
            trace!("{}({}) - secondary signal skipped", t, sv);
            continue;
        }

        let (pr, cp, dop) = (block.pr_mes(), block.cp_mes(), block.do_mes() as f64);
        let cno = block.cno();
        let pr_stdev = block.pr_stdev().bits() & 0x0f;
        let cp_stdev = block.cp_stdev().bits() & 0x0f;
        let do_stdev = block.do_stdev().bits() & 0x0f;
        let trk_stat = block.trk_stat();

        trace!(
            "{}({}) pr={} cp={} dop={} cno={} trk={:02x}",
            t,
            sv,
            pr,
            cp,
            dop,
            cno,
            trk_stat.bits()
        );

        if trk_stat.contains(TrkStatFlags::PR_VALID) {
            meas.add(sv, Observable::Pseudorange, pr);
            meas.add(
                sv,
                Observable::PseudorangeSigma,
                1.0E-2 * 2.0_f64.powi(pr_stdev as i32),
            );
        }

        meas.add(sv, Observable::Doppler, dop);
        meas.add(
            sv,
            Observable::DopplerSigma,
            2.0E-3 * 2.0_f64.powi(do_stdev as i32),
        );

        if trk_stat.contains(TrkStatFlags::CP_VALID) {
            meas.add(sv, Observable::CarrierPhase, cp);
            meas.add(sv, Observable::CarrierPhaseSigma, 0.004 * cp_stdev as f64);
        }

        meas.add(sv, Observable::SignalStrength, cno as f64);
        meas.add(sv, Observable::LockDuration, 1.0E-3 * block.lock_time() as f64);

        if sv.constellation == Constellation::Glonass {
            let channel = block.freq_id() as f64 - 7.0;
            meas.add(
                sv,
                Observable::CarrierFrequency,
                G1_FREQUENCY_HZ + channel * G1_CHANNEL_SPACING_HZ,
            );
        }
    }

    meas
}
