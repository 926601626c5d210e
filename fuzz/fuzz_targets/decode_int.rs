#![no_main]

use libfuzzer_sys::fuzz_target;
use derasn::{Asn1, Ctx, Enumerated, Integer};

macro_rules! decode_ints {
    ( $data:expr, [ $( $ctx:expr ),* ] ) => {{
        $(
            if let Ok((int, _)) = Integer::new().decode($data, &$ctx) {
                let value = int.value().unwrap();
                assert_eq!(value.to_string().parse().ok(), Some(value.clone()));
                if !int.bered() {
                    let mut int = int.clone();
                    let encoded = int.encode().unwrap();
                    assert_eq!(encoded, &$data[..encoded.len()]);
                }
            }
            let _ = Enumerated::new(
                [("zero", 0), ("one", 1)]
            ).map(|spec| spec.decode($data, &$ctx));
        )*
    }}
}

fuzz_target!(|data: &[u8]| {
    decode_ints!(data, [Ctx::new(), Ctx::ber()]);
});
