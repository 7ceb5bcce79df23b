//! Byte cursor and byte sink for handshake fields.
//!
//! Everything is big-endian. Reads past the end fail with
//! `Malformed::Truncated`; writes past the end fail with `BufferTooSmall`.

use crate::error::{Error, InvalidArgument, Malformed};

/// Read cursor over received handshake bytes.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    off: usize,
}

impl<'a> Reader<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, off: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.off
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.off
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a 2-byte big-endian value.
    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Take the next `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < n {
            return Err(Malformed::Truncated {
                needed: n,
                available: self.remaining(),
            }
            .into());
        }
        let out = &self.data[self.off..self.off + n];
        self.off += n;
        Ok(out)
    }

    /// Read an `opaque<0..2^8-1>` block: one length byte, then that many bytes.
    pub fn read_bytes8(&mut self) -> Result<&'a [u8], Error> {
        let len = self.read_u8()? as usize;
        self.read_bytes(len)
    }
}

/// Write sink over a caller-provided buffer.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    off: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, off: 0 }
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.off
    }

    /// The bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.off]
    }

    pub fn put_u8(&mut self, val: u8) -> Result<(), Error> {
        self.put_bytes(&[val])
    }

    /// Write a 2-byte big-endian value.
    pub fn put_u16(&mut self, val: u16) -> Result<(), Error> {
        self.put_bytes(&val.to_be_bytes())
    }

    pub fn put_bytes(&mut self, data: &[u8]) -> Result<(), Error> {
        if self.buf.len() < self.off + data.len() {
            return Err(Error::BufferTooSmall {
                needed: self.off + data.len(),
            });
        }
        self.buf[self.off..self.off + data.len()].copy_from_slice(data);
        self.off += data.len();
        Ok(())
    }

    /// Write an `opaque<0..2^8-1>` block.
    pub fn put_bytes8(&mut self, data: &[u8]) -> Result<(), Error> {
        let len = u8::try_from(data.len()).map_err(|_| InvalidArgument::TooLong {
            len: data.len(),
            max: u8::MAX as usize,
        })?;
        self.put_u8(len)?;
        self.put_bytes(data)
    }
}
