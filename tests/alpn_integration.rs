//! ALPN negotiation driven the way a handshake driver uses the crate:
//! client builds its offer, server picks it out of the ClientHello
//! extension block, selects, and the client checks the ServerHello reply.

use hex_literal::hex;

use milli_alpn::error::{Error, Malformed};
use milli_alpn::tls::extensions::{
    encode_extension, find_extension, iter_extensions, split_extension, EXT_ALPN,
};
use milli_alpn::tls::negotiation::{selector_fn, NoSelector};
use milli_alpn::{
    AlpnExtension, ClientAlpnConfig, HelloExtension, NegotiationOutcome, ProtocolName,
    ServerAlpnConfig, ServerPreference,
};

const EXT_SUPPORTED_VERSIONS: u16 = 0x002b;

// supported_versions(TLS 1.3) as a neighbouring extension.
const SUPPORTED_VERSIONS: [u8; 7] = hex!("002b 0003 02 0304");

/// ClientHello extension block: supported_versions followed by the ALPN offer.
fn client_hello_block(client: &ClientAlpnConfig, out: &mut [u8]) -> usize {
    out[..SUPPORTED_VERSIONS.len()].copy_from_slice(&SUPPORTED_VERSIONS);
    let mut off = SUPPORTED_VERSIONS.len();
    if let Some(offer) = client.offer() {
        off += encode_extension(offer, &mut out[off..]).unwrap();
    }
    off
}

#[test]
fn h2_offer_and_selection_on_the_wire() {
    let client = ClientAlpnConfig::new(&["h2", "http/1.1"]).unwrap();
    let mut block = [0u8; 64];
    let len = client_hello_block(&client, &mut block);

    let alpn_body = find_extension(&block[..len], EXT_ALPN).unwrap().unwrap();
    assert_eq!(alpn_body, &hex!("000c 02 6832 08 687474702f312e31"));

    let server = ServerAlpnConfig::new(ServerPreference::new(&["h2", "http/1.1"]).unwrap());
    let outcome = server.respond(Some(alpn_body)).unwrap();
    let reply = outcome.into_extension().unwrap();
    assert_eq!(reply.encoded_len(), 9);

    let mut server_hello = [0u8; 9];
    reply.to_bytes(&mut server_hello).unwrap();
    assert_eq!(server_hello, hex!("0010 0005 0003 02 6832"));

    let (ext_type, reply_body) = split_extension(&server_hello).unwrap();
    assert_eq!(ext_type, AlpnExtension::EXTENSION_TYPE);
    let negotiated = client.accept_reply(Some(reply_body)).unwrap().unwrap();
    assert_eq!(negotiated, "h2");
}

#[test]
fn absent_client_extension_sends_nothing() {
    let client = ClientAlpnConfig::none();
    let mut block = [0u8; 64];
    let len = client_hello_block(&client, &mut block);
    let alpn_body = find_extension(&block[..len], EXT_ALPN).unwrap();
    assert!(alpn_body.is_none());

    let server = ServerAlpnConfig::new(selector_fn(|offered| {
        assert!(offered.is_none());
        None
    }));
    let outcome = server.respond(alpn_body).unwrap();
    assert_eq!(outcome, NegotiationOutcome::NotSent);
    assert!(outcome.into_extension().is_none());

    // Server hello carries no ALPN, so the client negotiates nothing.
    assert_eq!(client.accept_reply(None).unwrap(), None);
}

#[test]
fn other_extensions_unaffected_without_selector() {
    let client = ClientAlpnConfig::new(&["h3"]).unwrap();
    let mut block = [0u8; 64];
    let len = client_hello_block(&client, &mut block);

    let server = ServerAlpnConfig::<NoSelector>::default();
    let alpn_body = find_extension(&block[..len], EXT_ALPN).unwrap();
    assert_eq!(server.respond(alpn_body).unwrap(), NegotiationOutcome::NotSent);

    let types: Vec<u16> = iter_extensions(&block[..len]).map(|e| e.unwrap().0).collect();
    assert_eq!(types, [EXT_SUPPORTED_VERSIONS, EXT_ALPN]);
}

#[test]
fn corrupt_offer_aborts_before_selection() {
    // ALPN body claims a 10-byte list but only 6 bytes follow.
    let block = hex!("002b 0003 02 0304  0010 0008 000a 02 6832 03 6162");
    let alpn_body = find_extension(&block, EXT_ALPN).unwrap().unwrap();

    let server = ServerAlpnConfig::new(selector_fn(|_| panic!("selector must not run")));
    let err = server.respond(Some(alpn_body)).unwrap_err();
    assert_eq!(
        err,
        Error::MalformedExtension(Malformed::ListLengthExceedsExtension {
            list_len: 10,
            declared: 8
        })
    );
    assert_eq!(err.alert().to_u8(), 50);

    // Same bytes under a consistent outer length: input runs out mid-name.
    let body = hex!("000a 02 6832 03 6162");
    assert!(matches!(
        AlpnExtension::parse(&body, 12),
        Err(Error::MalformedExtension(Malformed::Truncated { .. }))
    ));
}

#[test]
fn reencoding_parsed_offers_is_byte_identical() {
    let long = "x".repeat(255);
    let offers: [&[&str]; 4] = [
        &["h2"],
        &["h2", "http/1.1"],
        &["spdy/1", "spdy/2", "spdy/3", "h2c"],
        &[long.as_str(), "a"],
    ];
    let mut buf = [0u8; 300];
    for names in offers {
        let ext = AlpnExtension::for_offer(names).unwrap();
        let len = ext.to_bytes(&mut buf).unwrap();
        let wire = &buf[..len];
        assert_eq!(len, ext.encoded_len());
        assert_eq!(
            ext.encoded_len(),
            6 + names.iter().map(|n| 1 + n.len()).sum::<usize>()
        );

        let (_, body) = split_extension(wire).unwrap();
        let parsed = AlpnExtension::parse(body, ext.encoded_len() - 4).unwrap();
        assert_eq!(parsed, ext);

        let mut again = [0u8; 300];
        let again_len = parsed.to_bytes(&mut again).unwrap();
        assert_eq!(&again[..again_len], wire);
    }
}

#[test]
fn independent_handshakes_share_nothing() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AlpnExtension>();
    assert_send_sync::<ProtocolName>();
    assert_send_sync::<ServerPreference>();
    assert_send_sync::<ServerAlpnConfig<ServerPreference>>();

    let server = ServerAlpnConfig::new(ServerPreference::new(&["h2", "http/1.1"]).unwrap());
    std::thread::scope(|s| {
        let handles: Vec<_> = [&["h2"][..], &["http/1.1"][..], &["h3"][..]]
            .into_iter()
            .map(|offer| {
                let server = &server;
                s.spawn(move || {
                    let ext = AlpnExtension::for_offer(offer).unwrap();
                    let mut wire = [0u8; 32];
                    let len = ext.to_bytes(&mut wire).unwrap();
                    server.respond(Some(&wire[4..len])).unwrap()
                })
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(outcomes[0].selected().unwrap(), "h2");
        assert_eq!(outcomes[1].selected().unwrap(), "http/1.1");
        assert_eq!(outcomes[2], NegotiationOutcome::NotSent);
    });
}

#[cfg(feature = "alloc")]
#[test]
fn heap_encoding_matches_buffer_encoding() {
    let ext = AlpnExtension::for_offer(&["h2", "http/1.1"]).unwrap();
    let mut buf = [0u8; 18];
    ext.to_bytes(&mut buf).unwrap();
    assert_eq!(ext.to_vec().unwrap(), buf);
    assert_eq!(ext.strings(), ["h2", "http/1.1"]);
}
