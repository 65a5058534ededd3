use gnss::prelude::SV;

use rinex::prelude::ParsingError as RinexParsingError;
use ublox_lib::ParserError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Satellite number that no numbering scheme can classify.
    #[error("unknown satellite #{id} (gnss id: {gnss_id:?})")]
    UnknownSatellite { id: u8, gnss_id: Option<u8> },

    /// Invalid UBX frame (checksum, length or field).
    #[error("framing error: {0}")]
    Framing(String),

    /// Length or layout mismatch while decoding a message.
    #[error("malformed message {class:02x}-{id:02x}: {reason}")]
    MalformedMessage {
        class: u8,
        id: u8,
        reason: &'static str,
    },

    #[error("unknown message {class:02x}-{id:02x}")]
    UnknownMessage { class: u8, id: u8 },

    /// Navigation subframe that cannot be interpreted.
    #[error("{sv} - invalid subframe: {reason}")]
    InvalidSubframe { sv: SV, reason: &'static str },

    /// Input file failed its magic format check.
    #[error("format error! (not {kind}) {file}")]
    FormatError { kind: &'static str, file: String },

    /// Antenna corrections need precise orbits.
    #[error("SP3 must be loaded prior ANTEX: {0}")]
    MissingPreciseOrbits(String),

    #[error("unknown observation type \"{0}\"")]
    UnknownObservationType(String),

    #[error("unknown satellite spec \"{0}\"")]
    UnknownColumnSpec(String),

    #[error("unknown coordinate spec \"{0}\"")]
    UnknownCoordinate(String),

    #[error("unknown time format \"{0}\"")]
    UnknownTimeFormat(String),

    #[error("unknown weighting scheme \"{0}\"")]
    UnknownWeighting(String),

    #[error("format cannot be guessed for \"{0}\", use --(format, ex. rinex-nav)")]
    UnknownFileFormat(String),

    #[error("rinex error: {0}")]
    Rinex(#[from] RinexParsingError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParserError> for Error {
    fn from(e: ParserError) -> Self {
        Self::Framing(e.to_string())
    }
}
