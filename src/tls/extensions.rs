//! TLS hello extension framing.
//!
//! Extension format: type (2 bytes) + length (2 bytes) + data.
//! Each extension codec implements [`HelloExtension`]; the handshake driver
//! walks a received block with [`iter_extensions`] and dispatches on the type.

use crate::error::{Error, Malformed};
use crate::tls::codec::{Reader, Writer};

/// application_layer_protocol_negotiation extension type.
pub const EXT_ALPN: u16 = 0x0010;

/// Bytes taken by the type and length fields in front of every extension.
pub const EXTENSION_HEADER_LEN: usize = 4;

/// Capability set shared by every hello extension codec.
pub trait HelloExtension: Sized {
    /// Wire type tag.
    const EXTENSION_TYPE: u16;

    /// Total encoded size, including the 4-byte extension header.
    fn encoded_len(&self) -> usize;

    /// Write the full extension, header included.
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error>;

    /// Parse the extension body. `r` is positioned just after the header and
    /// `declared_len` is the header's length field.
    fn decode(r: &mut Reader<'_>, declared_len: usize) -> Result<Self, Error>;
}

/// Encode `ext` into `buf`, returning the number of bytes written.
///
/// `buf` is left untouched when it cannot hold the whole extension.
pub fn encode_extension<E: HelloExtension>(ext: &E, buf: &mut [u8]) -> Result<usize, Error> {
    let needed = ext.encoded_len();
    if buf.len() < needed {
        return Err(Error::BufferTooSmall { needed });
    }
    let mut w = Writer::new(buf);
    ext.encode(&mut w)?;
    debug_assert_eq!(w.position(), ext.encoded_len());
    Ok(w.position())
}

/// Decode an extension from its body, taking the body length as declared length.
pub fn decode_extension<E: HelloExtension>(body: &[u8]) -> Result<E, Error> {
    let mut r = Reader::new(body);
    E::decode(&mut r, body.len())
}

/// Iterator over `(type, body)` pairs of an extension block.
///
/// Yields an error and then stops if an extension overruns the block.
pub struct Extensions<'a> {
    reader: Reader<'a>,
    failed: bool,
}

/// Walk a block of concatenated extensions.
pub fn iter_extensions(block: &[u8]) -> Extensions<'_> {
    Extensions {
        reader: Reader::new(block),
        failed: false,
    }
}

impl<'a> Extensions<'a> {
    fn next_extension(&mut self) -> Result<(u16, &'a [u8]), Error> {
        let ext_type = self.reader.read_u16()?;
        let ext_len = self.reader.read_u16()? as usize;
        let body = self.reader.read_bytes(ext_len)?;
        Ok((ext_type, body))
    }
}

impl<'a> Iterator for Extensions<'a> {
    type Item = Result<(u16, &'a [u8]), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_empty() {
            return None;
        }
        let item = self.next_extension();
        self.failed = item.is_err();
        Some(item)
    }
}

/// Find the body of the first extension of `ext_type` in `block`.
///
/// The whole block is validated up to the match, so a malformed extension in
/// front of the wanted one is still reported.
pub fn find_extension(block: &[u8], ext_type: u16) -> Result<Option<&[u8]>, Error> {
    for item in iter_extensions(block) {
        let (ty, body) = item?;
        if ty == ext_type {
            return Ok(Some(body));
        }
    }
    Ok(None)
}

/// Split a single encoded extension into its type and body.
pub fn split_extension(encoded: &[u8]) -> Result<(u16, &[u8]), Error> {
    let mut exts = iter_extensions(encoded);
    let first = exts.next().ok_or(Malformed::Truncated {
        needed: EXTENSION_HEADER_LEN,
        available: 0,
    })??;
    Ok(first)
}
