#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod buf;

pub mod error;
pub use error::Error;

pub mod tls;
pub use tls::{
    AlpnExtension, ClientAlpnConfig, HelloExtension, NegotiationOutcome, ProtocolName,
    ProtocolSelector, ServerAlpnConfig, ServerPreference,
};
