//! Server-side ALPN selection and client-side reply checking.
//!
//! The server application decides which protocol to speak by supplying a
//! [`ProtocolSelector`]. The handshake driver calls [`ServerAlpnConfig::respond`]
//! once per ClientHello:
//!
//! ```text
//! client ALPN body --parse--> offered list --select--> NegotiationOutcome
//!   (absent: None)                                       |
//!                                    Selected(name) -> AlpnExtension in ServerHello
//!                                    NotSent        -> no ALPN extension at all
//! ```
//!
//! Selection runs synchronously on the handshake's own execution context, so a
//! selector must not block.

use tracing::{debug, trace, warn};

use crate::buf::{List, ListExt};
use crate::error::{Error, InvalidArgument};
use crate::tls::alpn::{AlpnExtension, ProtocolName, MAX_PROTOCOLS};

/// Picks the application protocol for a connection.
///
/// `offered` is the client's list in its preference order, or `None` when the
/// ClientHello carried no ALPN extension. Returning `None` means no ALPN reply
/// is sent. A returned name must be one of `offered`.
pub trait ProtocolSelector {
    fn select(&self, offered: Option<&[ProtocolName]>) -> Option<ProtocolName>;
}

impl<S: ProtocolSelector + ?Sized> ProtocolSelector for &S {
    fn select(&self, offered: Option<&[ProtocolName]>) -> Option<ProtocolName> {
        (**self).select(offered)
    }
}

/// Adapter turning a closure into a [`ProtocolSelector`]. See [`selector_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnSelector<F>(F);

/// Wrap a closure as a selector.
pub fn selector_fn<F>(f: F) -> FnSelector<F>
where
    F: Fn(Option<&[ProtocolName]>) -> Option<ProtocolName>,
{
    FnSelector(f)
}

impl<F> ProtocolSelector for FnSelector<F>
where
    F: Fn(Option<&[ProtocolName]>) -> Option<ProtocolName>,
{
    fn select(&self, offered: Option<&[ProtocolName]>) -> Option<ProtocolName> {
        (self.0)(offered)
    }
}

/// Selector type of a server without ALPN support. Never constructed.
#[derive(Debug, Clone, Copy)]
pub enum NoSelector {}

impl ProtocolSelector for NoSelector {
    fn select(&self, _offered: Option<&[ProtocolName]>) -> Option<ProtocolName> {
        match *self {}
    }
}

/// Server preference order: the first of our protocols that the client also offered.
#[derive(Debug, Clone)]
pub struct ServerPreference {
    supported: List<ProtocolName, MAX_PROTOCOLS>,
}

impl ServerPreference {
    /// `supported` is in the server's own preference order.
    pub fn new<N: AsRef<[u8]>>(supported: &[N]) -> Result<Self, Error> {
        if supported.is_empty() {
            return Err(InvalidArgument::EmptyProtocolList.into());
        }
        let mut list = List::new();
        for name in supported {
            list.list_push(ProtocolName::new(name)?)?;
        }
        Ok(Self { supported: list })
    }

    pub fn supported(&self) -> &[ProtocolName] {
        self.supported.list_as_slice()
    }
}

impl ProtocolSelector for ServerPreference {
    fn select(&self, offered: Option<&[ProtocolName]>) -> Option<ProtocolName> {
        let offered = offered?;
        self.supported()
            .iter()
            .find(|ours| offered.contains(*ours))
            .cloned()
    }
}

/// Result of server-side negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// Reply with this single protocol.
    Selected(ProtocolName),
    /// Leave the ALPN extension out of the ServerHello.
    NotSent,
}

impl NegotiationOutcome {
    pub fn selected(&self) -> Option<&ProtocolName> {
        match self {
            NegotiationOutcome::Selected(name) => Some(name),
            NegotiationOutcome::NotSent => None,
        }
    }

    /// The ServerHello extension to send, if any. `NotSent` never produces an
    /// empty list.
    pub fn into_extension(self) -> Option<AlpnExtension> {
        match self {
            NegotiationOutcome::Selected(name) => Some(AlpnExtension::for_selection(Some(name))),
            NegotiationOutcome::NotSent => None,
        }
    }
}

/// Invoke `selector` (if registered) on an already parsed client offer.
///
/// Without a selector the outcome is always `NotSent`.
pub fn negotiate<S: ProtocolSelector>(
    selector: Option<&S>,
    offered: Option<&AlpnExtension>,
) -> NegotiationOutcome {
    let Some(selector) = selector else {
        trace!("no ALPN selector registered");
        return NegotiationOutcome::NotSent;
    };

    let offered = offered.map(AlpnExtension::protocols);
    match selector.select(offered) {
        Some(name) if name.is_empty() => {
            warn!("ALPN selector chose an empty protocol name, sending no reply");
            NegotiationOutcome::NotSent
        }
        Some(name) => {
            if !offered.is_some_and(|list| list.contains(&name)) {
                warn!(protocol = %name, "ALPN selector chose a protocol the client did not offer");
            }
            debug!(protocol = %name, "ALPN protocol selected");
            NegotiationOutcome::Selected(name)
        }
        None => {
            debug!(client_offered = offered.is_some(), "ALPN selector made no selection");
            NegotiationOutcome::NotSent
        }
    }
}

/// Server-side ALPN configuration.
#[derive(Debug, Clone)]
pub struct ServerAlpnConfig<S> {
    /// Registered selector. `None` leaves ALPN inert: offers are still
    /// parsed but never answered.
    pub selector: Option<S>,
}

impl ServerAlpnConfig<NoSelector> {
    /// A server that never sends ALPN.
    pub const fn disabled() -> Self {
        Self { selector: None }
    }
}

impl Default for ServerAlpnConfig<NoSelector> {
    fn default() -> Self {
        Self::disabled()
    }
}

impl<S: ProtocolSelector> ServerAlpnConfig<S> {
    pub const fn new(selector: S) -> Self {
        Self {
            selector: Some(selector),
        }
    }

    /// Handle the client's ALPN extension body (`None` if the ClientHello had none).
    ///
    /// The body is fully validated before the selector runs; a malformed or
    /// empty offer is an error and the selector is not invoked.
    pub fn respond(&self, client_ext: Option<&[u8]>) -> Result<NegotiationOutcome, Error> {
        let offered = client_ext
            .map(AlpnExtension::parse_body)
            .transpose()?;
        Ok(negotiate(self.selector.as_ref(), offered.as_ref()))
    }
}

/// Client-side ALPN configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAlpnConfig {
    offer: Option<AlpnExtension>,
}

impl ClientAlpnConfig {
    /// Offer `protocols`, most preferred first.
    pub fn new<N: AsRef<[u8]>>(protocols: &[N]) -> Result<Self, Error> {
        Ok(Self {
            offer: Some(AlpnExtension::for_offer(protocols)?),
        })
    }

    /// A client that does not use ALPN.
    pub const fn none() -> Self {
        Self { offer: None }
    }

    /// The ClientHello extension to send, if any.
    pub fn offer(&self) -> Option<&AlpnExtension> {
        self.offer.as_ref()
    }

    /// Validate the server's ALPN reply body (`None` if the server sent none)
    /// and return the negotiated protocol.
    ///
    /// The reply must hold exactly one name, taken from our offer.
    pub fn accept_reply(&self, reply: Option<&[u8]>) -> Result<Option<ProtocolName>, Error> {
        let Some(body) = reply else {
            return Ok(None);
        };
        let Some(offer) = &self.offer else {
            debug!("server sent ALPN without an offer");
            return Err(Error::UnsolicitedExtension);
        };

        let reply = AlpnExtension::parse_body(body)?;
        match reply.selected() {
            Some(name) if offer.contains(name) => Ok(Some(name.clone())),
            _ => {
                debug!(%reply, "rejecting server ALPN selection");
                Err(Error::IllegalSelection)
            }
        }
    }
}
