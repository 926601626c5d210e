#![no_main]

use libfuzzer_sys::fuzz_target;
use derasn::{Asn1, BitString, CommonString, Ctx, OctetString};

macro_rules! decode_strings {
    ( $data:expr, [ $( $ctx:expr ),* ] ) => {{
        $(
            if let Ok((bits, _)) = BitString::new().decode($data, &$ctx) {
                let octets = bits.octets().map(|octets| octets.len())
                    .unwrap_or(0);
                assert!(bits.bit_len() <= octets * 8);
                assert!(bits.bit_len() + 8 > octets * 8);
            }
            let _ = OctetString::new().decode($data, &$ctx);
            let _ = CommonString::ia5().decode($data, &$ctx);
            let _ = CommonString::numeric().decode($data, &$ctx);
            let _ = CommonString::printable().decode($data, &$ctx);
            let _ = CommonString::utf8().decode($data, &$ctx);
            let _ = CommonString::bmp().decode($data, &$ctx);
            let _ = CommonString::universal().decode($data, &$ctx);
        )*
    }}
}

fuzz_target!(|data: &[u8]| {
    decode_strings!(data, [Ctx::new(), Ctx::ber()]);
});
