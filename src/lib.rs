//! Schema-driven encoding and decoding of ASN.1 BER, CER, and DER.
//!
//! This crate encodes and decodes data in ASN.1’s _Basic Encoding Rules_
//! as well as their restricted forms, the _Canonical Encoding Rules_ and
//! the _Distinguished Encoding Rules_. Instead of generating code from an
//! ASN.1 module, types are described at run time by schema values: a
//! [`Sequence`] is created from its named components, each of which is
//! itself a value of one of the types of this crate, collected in the
//! closed enum [`Obj`].
//!
//! Decoding walks a schema and the data side by side and produces a copy
//! of the schema filled with the decoded values. Every decoded value knows
//! where it was found in the input, how long its parts were and whether
//! BER-only features were used. Encoding always produces DER unless CER is
//! asked for explicitly.
//!
//! ```
//! use derasn::{Asn1, Boolean, Ctx, Ident, Integer, Obj, Sequence};
//!
//! let schema = Sequence::new([
//!     ("version", Obj::from(
//!         Integer::new().default(0)?.explicit(Ident::ctxc(0))?
//!     )),
//!     ("serial", Obj::from(Integer::new())),
//!     ("critical", Obj::from(Boolean::new().optional())),
//! ]);
//!
//! let mut value = schema.clone().with("serial", Integer::from(12))?;
//! let data = value.encode()?;
//! assert_eq!(data, b"\x30\x03\x02\x01\x0c");
//!
//! let decoded = schema.decod(&data, &Ctx::new())?;
//! assert_eq!(decoded, value);
//! let serial: &Integer = decoded.get("serial")?.unwrap().try_into()?;
//! assert_eq!(serial.to_i64(), Some(12));
//! # Ok::<_, derasn::Error>(())
//! ```
//!
//! All decoding is controlled by a [`Ctx`]. By default, it is strict DER.
//! [`Ctx::ber`] accepts everything BER allows, and a few more options
//! relax individual DER rules.
//!
//! For large inputs, [`Asn1::decode_evgen`] hands every completed value
//! to a visitor as soon as it has been decoded instead of building the
//! whole tree. Encoding can likewise be done in two passes through
//! [`encode2pass`] or streamed as CER through [`Asn1::encode_cer`].
//!
//! Values of an ANY or OCTET STRING component can be decoded automatically
//! by registering [`Defines`] on an OBJECT IDENTIFIER component that
//! determines their type.

//--- Re-exports

pub use self::any::{Any, AnyValue};
pub use self::boolean::Boolean;
pub use self::choice::Choice;
pub use self::ctx::Ctx;
pub use self::decode::Defines;
pub use self::encode::{encode2pass, encode_cer};
pub use self::error::{BoundsError, DecodeError, DecodeErrorKind, Error};
pub use self::ident::{Class, Ident, Tag, TagOrder};
pub use self::int::{Enumerated, Int, Integer};
pub use self::null::Null;
pub use self::obj::{Asn1, Base, Obj};
pub use self::oid::{ObjectIdentifier, Oid};
pub use self::path::{DecodePath, PathElem, PathPattern};
pub use self::sequence::{Sequence, Set};
pub use self::sequence_of::{ElementSource, Elements, SequenceOf, SetOf};
pub use self::string::{BitString, CommonString, OctetString, StringKind};
pub use self::time::{Time, TimeKind};


//--- Public modules

pub mod decode;
pub mod encode;
pub mod path;
pub mod string;


//--- Private modules

mod any;
mod boolean;
mod choice;
mod ctx;
mod error;
mod ident;
mod int;
mod length;
mod null;
mod obj;
mod oid;
mod sequence;
mod sequence_of;
mod time;
