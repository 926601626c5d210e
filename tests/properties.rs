//! Property tests for the encoders and decoders.

use derasn::{
    encode2pass, encode_cer, Asn1, CommonString, Ctx, Int, Integer, Obj,
    ObjectIdentifier, OctetString, Oid, Sequence, SetOf,
};
use proptest::prelude::*;

/// Strategy for valid object identifiers.
fn oid_strategy() -> impl Strategy<Value = Oid> {
    (0u64..=2, prop::collection::vec(any::<u64>(), 0..8))
        .prop_flat_map(|(first, rest)| {
            let second = if first < 2 { 0u64..40 } else { 0u64..100_000 };
            (Just(first), second, Just(rest))
        })
        .prop_map(|(first, second, rest)| {
            Oid::from_arcs(
                [first, second].into_iter().chain(rest)
            ).unwrap()
        })
}

fn record() -> Sequence {
    Sequence::new([
        ("id", Obj::from(Integer::new())),
        ("name", Obj::from(CommonString::utf8().optional())),
        ("blob", Obj::from(OctetString::new())),
    ])
}

proptest! {
    #[test]
    fn prop_integer_round_trip(value in any::<i64>()) {
        let mut int = Integer::from(value);
        let data = int.encode().unwrap();
        prop_assert_eq!(encode2pass(&mut int).unwrap(), data.clone());
        let decoded = Integer::new().decod(&data, &Ctx::new()).unwrap();
        prop_assert_eq!(decoded.to_i64(), Some(value));
        prop_assert!(!decoded.bered());
    }

    #[test]
    fn prop_big_integer_round_trip(
        octets in prop::collection::vec(any::<u8>(), 1..64)
    ) {
        let value = Int::from_signed_bytes(&octets);
        let mut int = Integer::from(value.clone());
        let data = int.encode().unwrap();
        let decoded = Integer::new().decod(&data, &Ctx::new()).unwrap();
        prop_assert_eq!(decoded.value(), Some(&value));
        prop_assert_eq!(
            value.to_string().parse::<Int>().unwrap(), value
        );
    }

    #[test]
    fn prop_oid_round_trip(oid in oid_strategy()) {
        let mut value = ObjectIdentifier::new().with_value(oid.clone());
        let data = value.encode().unwrap();
        let decoded = ObjectIdentifier::new().decod(&data, &Ctx::new())
            .unwrap();
        prop_assert_eq!(decoded.value(), Some(&oid));
        prop_assert_eq!(oid.to_string().parse::<Oid>().unwrap(), oid);
    }

    #[test]
    fn prop_encodings_agree(
        id in any::<i32>(),
        name in prop::option::of("[a-zA-Z0-9 ]{0,40}"),
        blob in prop::collection::vec(any::<u8>(), 0..2500),
    ) {
        let mut value = record()
            .with("id", Integer::from(id)).unwrap()
            .with("blob", OctetString::from(blob)).unwrap();
        if let Some(name) = name {
            value.set(
                "name", CommonString::utf8().with_str(&name).unwrap()
            ).unwrap();
        }
        let der = value.encode().unwrap();
        prop_assert_eq!(encode2pass(&mut value).unwrap(), der.clone());
        prop_assert_eq!(&record().decod(&der, &Ctx::new()).unwrap(), &value);

        let cer = encode_cer(&mut value).unwrap();
        prop_assert_eq!(&record().decod(&cer, &Ctx::ber()).unwrap(), &value);
    }

    #[test]
    fn prop_set_of_is_sorted(
        items in prop::collection::vec(
            prop::collection::vec(any::<u8>(), 0..6), 0..12
        )
    ) {
        let schema = SetOf::new(OctetString::new());
        let mut value = schema.clone().with_items(
            items.into_iter().map(|item| Obj::from(OctetString::from(item)))
        ).unwrap();
        let data = value.encode().unwrap();
        prop_assert_eq!(encode2pass(&mut value).unwrap(), data.clone());

        let decoded = schema.decod(&data, &Ctx::new()).unwrap();
        prop_assert!(!decoded.bered());
        let mut encoded: Vec<Vec<u8>> = decoded.iter().map(|item| {
            item.clone().encode().unwrap()
        }).collect();
        let sorted = {
            let mut sorted = encoded.clone();
            sorted.sort();
            sorted
        };
        prop_assert_eq!(&encoded, &sorted);

        encoded.reverse();
        if encoded != sorted {
            let mut content = Vec::new();
            encoded.iter().for_each(|item| content.extend_from_slice(item));
            let mut unordered = vec![0x31, content.len() as u8];
            unordered.extend_from_slice(&content);
            prop_assert!(schema.decod(&unordered, &Ctx::new()).is_err());
            prop_assert!(schema.decod(&unordered, &Ctx::ber()).is_ok());
        }
    }
}
