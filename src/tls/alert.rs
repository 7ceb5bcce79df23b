//! TLS alert descriptions raised by extension processing (RFC 8446 section 6).

/// TLS alert description codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlertDescription {
    IllegalParameter = 47,
    DecodeError = 50,
    InternalError = 80,
    UnsupportedExtension = 110,
}

impl AlertDescription {
    /// Convert from a raw u8 byte.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            47 => Some(Self::IllegalParameter),
            50 => Some(Self::DecodeError),
            80 => Some(Self::InternalError),
            110 => Some(Self::UnsupportedExtension),
            _ => None,
        }
    }

    /// Convert to raw u8 byte.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}
