use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

use flate2::read::GzDecoder;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;

lazy_static! {
    static ref RINEX_NAV: Regex = Regex::new(r"(?i)(\.\d{2}n|_[A-Z]N\.rnx)$").unwrap();
    static ref RINEX_OBS: Regex = Regex::new(r"(?i)(\.\d{2}o|_[A-Z]O\.rnx)$").unwrap();
}

/// Input file kinds
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKind {
    Ubx,
    RinexObs,
    RinexNav,
    Sp3,
    Antex,
    RinexClk,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ubx => write!(f, "ubx"),
            Self::RinexObs => write!(f, "rinex_obs"),
            Self::RinexNav => write!(f, "rinex_nav"),
            Self::Sp3 => write!(f, "sp3"),
            Self::Antex => write!(f, "antex"),
            Self::RinexClk => write!(f, "rinex_clk"),
        }
    }
}

impl FromStr for FileKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").to_lowercase().as_str() {
            "ubx" => Ok(Self::Ubx),
            "rinex_obs" => Ok(Self::RinexObs),
            "rinex_nav" => Ok(Self::RinexNav),
            "sp3" => Ok(Self::Sp3),
            "antex" => Ok(Self::Antex),
            "rinex_clk" => Ok(Self::RinexClk),
            _ => Err(Error::UnknownFileFormat(s.to_string())),
        }
    }
}

impl FileKind {
    /// Guesses the file kind from its name, possibly gzip compressed.
    pub fn guess(path: &Path) -> Result<Self, Error> {
        let name = path.to_string_lossy();
        let stem = name.strip_suffix(".gz").unwrap_or(&name);
        let extension = stem.rsplit('.').next().unwrap_or("").to_lowercase();

        if RINEX_NAV.is_match(stem) {
            Ok(Self::RinexNav)
        } else if RINEX_OBS.is_match(stem) {
            Ok(Self::RinexObs)
        } else {
            match extension.as_str() {
                "ubx" => Ok(Self::Ubx),
                "sp3" => Ok(Self::Sp3),
                "atx" => Ok(Self::Antex),
                "clk" => Ok(Self::RinexClk),
                _ => Err(Error::UnknownFileFormat(name.to_string())),
            }
        }
    }

    /// Auxiliary files feed the solver only,
    /// and are loaded prior any observation file.
    pub fn is_auxiliary(&self) -> bool {
        !matches!(self, Self::Ubx | Self::RinexObs)
    }

    fn format_name(&self) -> &'static str {
        match self {
            Self::Ubx => "UBX",
            Self::RinexObs => "RINEX observation",
            Self::RinexNav => "RINEX",
            Self::Sp3 => "SP3",
            Self::Antex => "ANTEX",
            Self::RinexClk => "RINEX clock",
        }
    }

    /// Verifies the first line of a text file matches this kind.
    pub fn matches(&self, first_line: &str) -> bool {
        let label = first_line.get(60..).unwrap_or("").trim();
        let rinex_type = first_line.get(20..21).unwrap_or("");

        match self {
            Self::Ubx => true,
            Self::RinexObs => label == "RINEX VERSION / TYPE" && rinex_type == "O",
            Self::RinexNav => {
                label == "RINEX VERSION / TYPE" && matches!(rinex_type, "N" | "G" | "H")
            },
            Self::RinexClk => label == "RINEX VERSION / TYPE" && rinex_type == "C",
            Self::Sp3 => {
                let mut chars = first_line.chars();
                chars.next() == Some('#')
                    && chars.next().is_some_and(|c| c.is_ascii_lowercase())
            },
            Self::Antex => label == "ANTEX VERSION / SYSTEM",
        }
    }

    /// Runs the magic format check on given file.
    pub fn check_format(&self, path: &Path) -> Result<(), Error> {
        if *self == Self::Ubx {
            return Ok(());
        }

        let mut first_line = String::new();
        FileDescriptor::open(path)?.read_line(&mut first_line)?;

        if self.matches(first_line.trim_end_matches(['\r', '\n'])) {
            Ok(())
        } else {
            Err(Error::FormatError {
                kind: self.format_name(),
                file: path.to_string_lossy().to_string(),
            })
        }
    }
}

/// Readable file, possibly gzip compressed
pub enum FileDescriptor {
    Plain(BufReader<File>),
    Gzip(BufReader<GzDecoder<File>>),
}

impl FileDescriptor {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let fd = File::open(path)?;
        if path.to_string_lossy().ends_with(".gz") {
            Ok(Self::Gzip(BufReader::new(GzDecoder::new(fd))))
        } else {
            Ok(Self::Plain(BufReader::new(fd)))
        }
    }
}

impl Read for FileDescriptor {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(fd) => fd.read(buf),
            Self::Gzip(fd) => fd.read(buf),
        }
    }
}

impl BufRead for FileDescriptor {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        match self {
            Self::Plain(fd) => fd.fill_buf(),
            Self::Gzip(fd) => fd.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Self::Plain(fd) => fd.consume(amt),
            Self::Gzip(fd) => fd.consume(amt),
        }
    }
}
