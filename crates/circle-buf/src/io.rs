use std::io::{self, Read, Write};

use crate::RingBuf;

/// Reads pop queued bytes; an empty ring reads zero bytes.
impl Read for RingBuf<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.pop(buf))
    }
}

/// Writes push as many bytes as fit; a full ring reports [`io::ErrorKind::WouldBlock`].
impl Write for RingBuf<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        match self.push(buf) {
            0 => Err(io::ErrorKind::WouldBlock.into()),
            pushed => Ok(pushed),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
