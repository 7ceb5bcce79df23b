//! Application-Layer Protocol Negotiation extension (RFC 7301).
//!
//! ```text
//! opaque ProtocolName<1..2^8-1>;
//!
//! struct {
//!     ProtocolName protocol_name_list<2..2^16-1>
//! } ProtocolNameList;
//! ```
//!
//! On the wire the extension is `type(2) + ext_len(2) + list_len(2)` followed
//! by one `len(1) + bytes` entry per name. The client sends its offer in
//! preference order; the server answers with a single name.
//!
//! Raw bytes are authoritative. The text form of a name is best-effort only:
//! names need not be UTF-8.

use core::fmt;

use tracing::{debug, trace};

use crate::buf::{Buf, BufExt, List, ListExt};
use crate::error::{Error, InvalidArgument, Malformed};
use crate::tls::codec::{Reader, Writer};
use crate::tls::extensions::{encode_extension, HelloExtension, EXTENSION_HEADER_LEN, EXT_ALPN};

/// Longest protocol name the one-byte length prefix can carry.
pub const MAX_PROTOCOL_NAME_LEN: usize = 255;

/// Inline list capacity when built without `alloc`.
pub const MAX_PROTOCOLS: usize = 16;

/// type(2) + ext_len(2) + list_len(2)
const FIXED_OVERHEAD: usize = 6;

/// Largest list whose extension length still fits in a u16.
const MAX_LIST_LEN: usize = u16::MAX as usize - 2;

/// A single protocol name, e.g. `h2` or `http/1.1`. Compared byte for byte.
#[derive(Clone, PartialEq, Eq)]
pub struct ProtocolName {
    bytes: Buf<MAX_PROTOCOL_NAME_LEN>,
}

impl ProtocolName {
    /// Build a name for local use. Must be 1..=255 bytes.
    pub fn new(name: impl AsRef<[u8]>) -> Result<Self, Error> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(InvalidArgument::EmptyProtocolName.into());
        }
        if name.len() > MAX_PROTOCOL_NAME_LEN {
            return Err(InvalidArgument::TooLong {
                len: name.len(),
                max: MAX_PROTOCOL_NAME_LEN,
            }
            .into());
        }
        Self::from_wire(name)
    }

    /// Copy a name out of a length-prefixed wire entry. Zero-length entries are kept.
    fn from_wire(bytes: &[u8]) -> Result<Self, Error> {
        let mut buf = Buf::new();
        buf.buf_extend_from_slice(bytes)?;
        Ok(Self { bytes: buf })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.buf_as_slice()
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Only a parsed zero-length entry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The name as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }
}

impl AsRef<[u8]> for ProtocolName {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq<[u8]> for ProtocolName {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<str> for ProtocolName {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for ProtocolName {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// Lossy: invalid UTF-8 sequences render as U+FFFD.
impl fmt::Display for ProtocolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.as_bytes().utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ProtocolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.debug_tuple("ProtocolName").field(&s).finish(),
            None => f.debug_tuple("ProtocolName").field(&self.as_bytes()).finish(),
        }
    }
}

/// One ALPN extension instance: a client offer or a server selection.
///
/// Immutable once built. `encoded_len` is fixed at construction so the
/// enclosing extension list can size buffers without walking the names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlpnExtension {
    protocols: List<ProtocolName, MAX_PROTOCOLS>,
    encoded_len: usize,
}

impl AlpnExtension {
    /// Build a ClientHello offer. `names` is in preference order.
    pub fn for_offer<N: AsRef<[u8]>>(names: &[N]) -> Result<Self, Error> {
        if names.is_empty() {
            return Err(InvalidArgument::EmptyProtocolList.into());
        }

        let mut protocols = List::new();
        for name in names {
            protocols.list_push(ProtocolName::new(name)?)?;
        }

        let ext = Self::from_protocols(protocols);
        let list_len = ext.encoded_len - FIXED_OVERHEAD;
        if list_len > MAX_LIST_LEN {
            return Err(InvalidArgument::TooLong {
                len: list_len,
                max: MAX_LIST_LEN,
            }
            .into());
        }

        trace!(%ext, "built ALPN offer");
        Ok(ext)
    }

    /// Build a ServerHello reply: a singleton, or an empty list when nothing was selected.
    pub fn for_selection(selected: Option<ProtocolName>) -> Self {
        let protocols: List<ProtocolName, MAX_PROTOCOLS> = selected.into_iter().collect();
        Self::from_protocols(protocols)
    }

    /// Parse an extension body. `declared_len` is the length field from the
    /// extension header; `data` starts at the protocol list length.
    pub fn parse(data: &[u8], declared_len: usize) -> Result<Self, Error> {
        Self::decode(&mut Reader::new(data), declared_len)
    }

    /// Parse a received offer or reply whose body length is known exactly.
    ///
    /// Stricter than [`parse`](Self::parse): the list must fill the whole body
    /// and carry at least one name.
    pub fn parse_body(body: &[u8]) -> Result<Self, Error> {
        let ext = Self::parse(body, body.len())?;
        let list_len = ext.encoded_len - FIXED_OVERHEAD;
        if list_len + 2 != body.len() {
            debug!(list_len, body_len = body.len(), "rejecting ALPN extension");
            return Err(Malformed::TrailingBytes {
                list_len,
                body_len: body.len(),
            }
            .into());
        }
        if ext.is_empty() {
            debug!("rejecting empty ALPN protocol list");
            return Err(Malformed::EmptyProtocolList.into());
        }
        Ok(ext)
    }

    fn from_protocols(protocols: List<ProtocolName, MAX_PROTOCOLS>) -> Self {
        let encoded_len = FIXED_OVERHEAD
            + protocols
                .list_as_slice()
                .iter()
                .map(|p| 1 + p.len())
                .sum::<usize>();
        Self {
            protocols,
            encoded_len,
        }
    }

    /// Names in wire order.
    pub fn protocols(&self) -> &[ProtocolName] {
        self.protocols.list_as_slice()
    }

    /// Total size on the wire, including type and both length fields.
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    pub fn len(&self) -> usize {
        self.protocols().len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols().is_empty()
    }

    pub fn contains(&self, name: &ProtocolName) -> bool {
        self.protocols().contains(name)
    }

    /// The name of a single-entry list, as a server reply must be.
    pub fn selected(&self) -> Option<&ProtocolName> {
        match self.protocols() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Encode into `buf`, returning the number of bytes written (always `encoded_len`).
    pub fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, Error> {
        encode_extension(self, buf)
    }

    /// Encode into a freshly allocated buffer of exactly `encoded_len` bytes.
    #[cfg(feature = "alloc")]
    pub fn to_vec(&self) -> Result<alloc::vec::Vec<u8>, Error> {
        let mut out = alloc::vec![0u8; self.encoded_len];
        self.to_bytes(&mut out)?;
        Ok(out)
    }

    /// Best-effort text form of every name.
    #[cfg(feature = "alloc")]
    pub fn strings(&self) -> alloc::vec::Vec<alloc::string::String> {
        self.protocols()
            .iter()
            .map(|p| alloc::string::String::from_utf8_lossy(p.as_bytes()).into_owned())
            .collect()
    }
}

impl HelloExtension for AlpnExtension {
    const EXTENSION_TYPE: u16 = EXT_ALPN;

    fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        let ext_len = u16_len(self.encoded_len - EXTENSION_HEADER_LEN)?;
        let list_len = u16_len(self.encoded_len - FIXED_OVERHEAD)?;
        w.put_u16(EXT_ALPN)?;
        w.put_u16(ext_len)?;
        w.put_u16(list_len)?;
        for name in self.protocols() {
            w.put_bytes8(name.as_bytes())?;
        }
        Ok(())
    }

    fn decode(r: &mut Reader<'_>, declared_len: usize) -> Result<Self, Error> {
        decode_protocol_list(r, declared_len)
            .map(Self::from_protocols)
            .inspect(|ext| trace!(%ext, "parsed ALPN extension"))
            .inspect_err(|e| debug!(error = %e, declared_len, "rejecting ALPN extension"))
    }
}

/// Read `protocol_name_list`, counting down the list length entry by entry.
///
/// Nothing is returned unless the whole list is consumed exactly.
fn decode_protocol_list(
    r: &mut Reader<'_>,
    declared_len: usize,
) -> Result<List<ProtocolName, MAX_PROTOCOLS>, Error> {
    if declared_len < 2 {
        return Err(Malformed::DeclaredLengthTooShort {
            declared: declared_len,
        }
        .into());
    }

    let list_len = r.read_u16()? as usize;
    if list_len > declared_len - 2 {
        return Err(Malformed::ListLengthExceedsExtension {
            list_len,
            declared: declared_len,
        }
        .into());
    }

    let mut protocols = List::new();
    let mut remaining = list_len;
    while remaining > 0 {
        let name_len = r.read_u8()? as usize;
        remaining = remaining
            .checked_sub(1 + name_len)
            .ok_or(Malformed::NameRunsOffEnd {
                name_len,
                remaining,
            })?;
        let name = r.read_bytes(name_len)?;
        protocols.list_push(ProtocolName::from_wire(name)?)?;
    }

    Ok(protocols)
}

fn u16_len(len: usize) -> Result<u16, Error> {
    u16::try_from(len).map_err(|_| {
        Error::from(InvalidArgument::TooLong {
            len,
            max: u16::MAX as usize,
        })
    })
}

/// `Extension ALPN [h2] [http/1.1]`
impl fmt::Display for AlpnExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Extension ALPN")?;
        for name in self.protocols() {
            write!(f, " [{name}]")?;
        }
        Ok(())
    }
}
