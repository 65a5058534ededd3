use std::io::{ErrorKind, Read};

use ublox_lib::{PacketRef, Parser, ParserError};

use crate::error::Error;

/// Read chunk size
const BUFFER_SIZE: usize = 4096;

/// Feeds a byte stream to the UBX [Parser].
/// Resynchronization on the next sync pair, checksum verification
/// and buffering of partial frames are handled by the parser.
/// A truncated frame at the end of stream is never reported.
pub struct Framer<R: Read> {
    reader: R,
    parser: Parser<Vec<u8>>,
    buffer: Vec<u8>,
}

impl<R: Read> Framer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            parser: Parser::default(),
            buffer: vec![0; BUFFER_SIZE],
        }
    }

    /// Consumes the stream until its end, handing every framing
    /// result to `cb`. Stops on first I/O or callback error.
    pub fn consume_all<F>(&mut self, mut cb: F) -> Result<(), Error>
    where
        F: FnMut(Result<PacketRef<'_>, ParserError>) -> Result<(), Error>,
    {
        loop {
            let nbytes = match self.reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(nbytes) => nbytes,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            };

            let mut it = self.parser.consume(&self.buffer[..nbytes]);
            while let Some(packet) = it.next() {
                cb(packet)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ublox::test::frame;

    /// (class, id) of every valid frame, count of invalid frames
    fn scan(bytes: &[u8]) -> (Vec<(u8, u8)>, usize) {
        let (mut valid, mut invalid) = (Vec::new(), 0);
        Framer::new(bytes)
            .consume_all(|packet| {
                match packet {
                    Ok(packet) => valid.push(packet.class_and_msg_id()),
                    Err(_) => invalid += 1,
                }
                Ok(())
            })
            .unwrap();
        (valid, invalid)
    }

    #[test]
    fn framing() {
        let mut bytes = vec![0x00, 0xb5, 0x00, 0x24];
        bytes.extend(frame(0x02, 0x10, &[1, 2, 3, 4, 5, 6, 7, 8]));
        bytes.extend([0x0d, 0x0a]);
        bytes.extend(frame(0x02, 0x11, &[0; 42]));

        assert_eq!(scan(&bytes), (vec![(0x02, 0x10), (0x02, 0x11)], 0));
    }

    #[test]
    fn corrupt_frames_are_reported() {
        let mut bytes = frame(0x02, 0x10, &[1, 2, 3, 4]);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        bytes.extend(frame(0x02, 0x11, &[5; 8]));

        let (valid, invalid) = scan(&bytes);
        assert_eq!(invalid, 1);
        assert_eq!(valid, vec![(0x02, 0x11)]);
    }

    #[test]
    fn truncated_frame() {
        let bytes = frame(0x02, 0x10, &[1, 2, 3, 4]);
        assert_eq!(scan(&bytes[..bytes.len() - 3]), (vec![], 0));
    }

    #[test]
    fn read_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(ErrorKind::Other, "device lost"))
            }
        }

        let result = Framer::new(Broken).consume_all(|_| Ok(()));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
