use crate::tls::alert::AlertDescription;

/// Why a received ALPN extension was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// The extension body cannot even hold the 2-byte list length.
    DeclaredLengthTooShort { declared: usize },
    /// `protocol_name_list` length is larger than the extension body allows.
    ListLengthExceedsExtension { list_len: usize, declared: usize },
    /// A name's length byte claims more bytes than the list has left.
    NameRunsOffEnd { name_len: usize, remaining: usize },
    /// Input ended before the declared lengths were satisfied.
    Truncated { needed: usize, available: usize },
    /// A received offer or reply with no names (`protocol_name_list<2..>`).
    EmptyProtocolList,
    /// The list does not end where the extension body does.
    TrailingBytes { list_len: usize, body_len: usize },
}

/// Caller-side misuse, rejected before anything touches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidArgument {
    /// An offer must name at least one protocol.
    EmptyProtocolList,
    /// Protocol names are 1..=255 bytes.
    EmptyProtocolName,
    /// A name or list does not fit its length prefix.
    TooLong { len: usize, max: usize },
}

/// Top-level crate error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peer sent an ALPN extension that violates RFC 7301 framing. Fatal to the handshake.
    MalformedExtension(Malformed),
    /// Local caller passed an unusable argument.
    InvalidArgument(InvalidArgument),
    /// Server reply did not carry exactly one protocol from our offer.
    IllegalSelection,
    /// Peer replied with ALPN although we never offered it.
    UnsolicitedExtension,
    /// Caller-provided buffer too small.
    BufferTooSmall { needed: usize },
    /// Inline (heapless) storage is full.
    CapacityExceeded,
}

impl Error {
    /// Alert a handshake driver should send when aborting on this error.
    pub const fn alert(&self) -> AlertDescription {
        match self {
            Error::MalformedExtension(_) => AlertDescription::DecodeError,
            Error::IllegalSelection => AlertDescription::IllegalParameter,
            Error::UnsolicitedExtension => AlertDescription::UnsupportedExtension,
            Error::InvalidArgument(_) | Error::BufferTooSmall { .. } | Error::CapacityExceeded => {
                AlertDescription::InternalError
            }
        }
    }
}

impl From<Malformed> for Error {
    fn from(e: Malformed) -> Self {
        Error::MalformedExtension(e)
    }
}

impl From<InvalidArgument> for Error {
    fn from(e: InvalidArgument) -> Self {
        Error::InvalidArgument(e)
    }
}

impl core::fmt::Display for Malformed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Malformed::DeclaredLengthTooShort { declared } => {
                write!(f, "bad extension length {declared}")
            }
            Malformed::ListLengthExceedsExtension { list_len, declared } => {
                write!(f, "bad total length {list_len} for extension length {declared}")
            }
            Malformed::NameRunsOffEnd { name_len, remaining } => {
                write!(f, "name of {name_len} bytes runs off end, {remaining} left in list")
            }
            Malformed::Truncated { needed, available } => {
                write!(f, "truncated: need {needed} bytes, have {available}")
            }
            Malformed::EmptyProtocolList => write!(f, "empty protocol name list"),
            Malformed::TrailingBytes { list_len, body_len } => {
                write!(f, "list of {list_len} bytes in extension body of {body_len}")
            }
        }
    }
}

impl core::fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvalidArgument::EmptyProtocolList => write!(f, "no protocols to offer"),
            InvalidArgument::EmptyProtocolName => write!(f, "empty protocol name"),
            InvalidArgument::TooLong { len, max } => {
                write!(f, "length {len} exceeds maximum {max}")
            }
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MalformedExtension(e) => write!(f, "malformed ALPN extension: {e}"),
            Error::InvalidArgument(e) => write!(f, "invalid argument: {e}"),
            Error::IllegalSelection => write!(f, "server selected a protocol that was not offered"),
            Error::UnsolicitedExtension => write!(f, "unsolicited ALPN extension"),
            Error::BufferTooSmall { needed } => {
                write!(f, "buffer too small, need {needed} bytes")
            }
            Error::CapacityExceeded => write!(f, "inline capacity exceeded"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
