//! TLS hello extension handling for Application-Layer Protocol Negotiation.
//!
//! - `codec`: big-endian byte cursor and sink shared by the extension codecs
//! - `extensions`: `type(2) + len(2) + body` framing and the `HelloExtension` trait
//! - `alpn`: RFC 7301 ProtocolNameList codec
//! - `negotiation`: server-side protocol selection and client-side reply checks
//!
//! The handshake state machine itself lives outside this crate. It hands
//! extension bodies in and takes encoded extensions out.

pub mod alert;
pub mod alpn;
pub mod codec;
pub mod extensions;
pub mod negotiation;

pub use alert::AlertDescription;
pub use alpn::{AlpnExtension, ProtocolName};
pub use extensions::HelloExtension;
pub use negotiation::{
    ClientAlpnConfig, NegotiationOutcome, ProtocolSelector, ServerAlpnConfig, ServerPreference,
};
