#![no_main]

use libfuzzer_sys::fuzz_target;
use milli_alpn::tls::extensions::{find_extension, EXT_ALPN};
use milli_alpn::{AlpnExtension, ServerAlpnConfig, ServerPreference};

fuzz_target!(|data: &[u8]| {
    // Fuzz the ALPN body parser: should never panic on any input.
    // The declared length comes from a u16 extension header.
    let declared_len = data.len().min(u16::MAX as usize);
    if let Ok(ext) = AlpnExtension::parse(data, declared_len) {
        // Accepted input must re-encode to the bytes it was parsed from.
        let wire = ext.to_vec().unwrap();
        assert_eq!(wire.len(), ext.encoded_len());
        let list_len = ext.encoded_len() - 6;
        assert_eq!(&wire[4..], &data[..2 + list_len]);
    }

    // A strictly accepted body re-encodes to exactly itself.
    if let Ok(ext) = AlpnExtension::parse_body(data) {
        assert!(!ext.is_empty());
        assert_eq!(&ext.to_vec().unwrap()[4..], data);
    }

    // Also treat the input as a whole extension block and negotiate on it.
    if let Ok(body) = find_extension(data, EXT_ALPN) {
        let server = ServerAlpnConfig::new(ServerPreference::new(&["h2", "http/1.1"]).unwrap());
        let _ = server.respond(body);
    }
});
