//! Decoding open types through DEFINED BY.

use derasn::{
    Any, Asn1, CommonString, Ctx, Defines, Integer, Obj, ObjectIdentifier,
    OctetString, Oid, PathPattern, Sequence, SetOf,
};

fn basic_constraints() -> Oid {
    "2.5.29.19".parse().unwrap()
}

fn extension() -> Sequence {
    Sequence::new([
        ("extnID", Obj::from(ObjectIdentifier::new().with_defines(
            Defines::new().rule(
                ["extnValue"],
                [(basic_constraints(), Obj::from(Integer::new()))]
            )
        ))),
        ("extnValue", Obj::from(OctetString::new())),
    ])
}

#[test]
fn octet_string_content() {
    let data = b"\x30\x0a\x06\x03\x55\x1d\x13\x04\x03\x02\x01\x05";
    let res = extension().decod(data, &Ctx::new()).unwrap();
    let value = res.get("extnValue").unwrap().unwrap();
    let (oid, defined) = value.defined().unwrap();
    assert_eq!(oid, &basic_constraints());
    let defined: &Integer = defined.try_into().unwrap();
    assert_eq!(*defined, 5);
    assert_eq!(defined.base().offset(), 9);

    // The raw content stays available.
    let raw: &OctetString = value.try_into().unwrap();
    assert_eq!(*raw, &b"\x02\x01\x05"[..]);
}

#[test]
fn unknown_oid_is_left_alone() {
    let data = b"\x30\x0a\x06\x03\x55\x1d\x0f\x04\x03\x03\x01\x00";
    let res = extension().decod(data, &Ctx::new()).unwrap();
    assert!(res.get("extnValue").unwrap().unwrap().defined().is_none());
}

#[test]
fn broken_content() {
    let data = b"\x30\x09\x06\x03\x55\x1d\x13\x04\x02\x02\x01";
    let err = extension().decod(data, &Ctx::new()).unwrap_err();
    assert_eq!(
        err.as_decode().unwrap().path().to_string(),
        "extnValue:DEFINED BY 2.5.29.19"
    );

    let data = b"\x30\x0b\x06\x03\x55\x1d\x13\x04\x04\x02\x01\x05\x00";
    let err = extension().decod(data, &Ctx::new()).unwrap_err();
    let err = err.as_decode().unwrap();
    assert_eq!(err.msg(), "remaining data");
    assert_eq!(err.offset(), 0);
}

fn attribute() -> Sequence {
    Sequence::new([
        ("type", Obj::from(ObjectIdentifier::new())),
        ("values", Obj::from(SetOf::new(Any::new()))),
    ])
}

#[test]
fn rules_from_context() {
    let common_name: Oid = "2.5.4.3".parse().unwrap();
    let ctx = Ctx::new().defines_by_path(
        PathPattern::new().then("type"),
        Defines::new().rule(
            ["values"],
            [(common_name.clone(), Obj::from(CommonString::printable()))]
        )
    );
    let data = b"\x30\x0b\x06\x03\x55\x04\x03\x31\x04\x13\x02ab";

    let res = attribute().decod(data, &Ctx::new()).unwrap();
    let values: &SetOf = res.get("values").unwrap().unwrap()
        .try_into().unwrap();
    assert!(values.get(0).unwrap().defined().is_none());

    let res = attribute().decod(data, &ctx).unwrap();
    let values: &SetOf = res.get("values").unwrap().unwrap()
        .try_into().unwrap();
    assert_eq!(values.len(), 1);
    let (oid, name) = values.get(0).unwrap().defined().unwrap();
    assert_eq!(oid, &common_name);
    let name: &CommonString = name.try_into().unwrap();
    assert_eq!(*name, "ab");
    assert_eq!(name.base().offset(), 9);
}
