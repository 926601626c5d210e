#![no_main]

use libfuzzer_sys::fuzz_target;
use derasn::{Asn1, Ctx, ObjectIdentifier, Oid};

fuzz_target!(|data: &[u8]| {
    let strict = ObjectIdentifier::new().decode(data, &Ctx::new());
    let ber = ObjectIdentifier::new().decode(data, &Ctx::ber());
    if strict.is_ok() {
        assert!(ber.is_ok());
    }

    if let Ok((oid, tail)) = strict {
        let value = oid.value().unwrap();
        assert_eq!(value.to_string().parse::<Oid>().unwrap(), *value);
        let mut oid = oid.clone();
        let encoded = oid.encode().unwrap();
        assert_eq!(encoded.len() + tail.len(), data.len());
    }
});
