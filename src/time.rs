//! UTCTime and GeneralizedTime.
//!
//! Both types are character strings carrying a date and time. Values are
//! kept as a [`NaiveDateTime`] in UTC. DER only allows the canonical text
//! form ending in `Z`. When decoding BER, the relaxed forms with omitted
//! seconds or minutes, fractions of hours or minutes and local time
//! offsets are accepted as well. Such values are normalized to UTC, marked
//! as BER encoded and keep their original text in
//! [`ber_raw`][Time::ber_raw].

use std::borrow::Cow;
use std::fmt;
use bytes::Bytes;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use crate::decode::Decoder;
use crate::error::{DecodeError, Error, Result};
use crate::ident::Tag;
use crate::obj::{primitive_codec, Asn1, Base, Codec, Decoded, Obj};
use crate::string::decode_parts;


/// The largest accepted time offset in seconds.
const MAX_OFFSET: i64 = 14 * 3600;


//------------ TimeKind ------------------------------------------------------

/// The two time types.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TimeKind {
    /// UTCTime with a two digit year and second precision.
    Utc,

    /// GeneralizedTime with a four digit year and microsecond precision.
    Generalized,
}

impl TimeKind {
    pub fn tag(self) -> Tag {
        match self {
            TimeKind::Utc => Tag::UTC_TIME,
            TimeKind::Generalized => Tag::GENERALIZED_TIME,
        }
    }

    pub fn asn1_name(self) -> &'static str {
        match self {
            TimeKind::Utc => "UTCTime",
            TimeKind::Generalized => "GeneralizedTime",
        }
    }
}


//------------ Time ----------------------------------------------------------

/// A UTCTime or GeneralizedTime value.
///
/// UTCTime can only hold the years 1950 to 2049 and drops fractions of a
/// second. GeneralizedTime holds the years 1 to 9999 with microsecond
/// precision.
#[derive(Clone, Debug)]
pub struct Time {
    base: Base,
    kind: TimeKind,
    value: Option<NaiveDateTime>,
    ber_raw: Option<Bytes>,
    default: Option<NaiveDateTime>,
}

impl Time {
    pub fn new(kind: TimeKind) -> Self {
        Time {
            base: Base::new(kind.asn1_name(), kind.tag().primitive()),
            kind,
            value: None,
            ber_raw: None,
            default: None,
        }
    }

    pub fn utc() -> Self {
        Self::new(TimeKind::Utc)
    }

    pub fn generalized() -> Self {
        Self::new(TimeKind::Generalized)
    }

    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    /// Returns the value if there is one.
    pub fn value(&self) -> Option<NaiveDateTime> {
        self.value
    }

    /// Returns the original text of a value decoded from a BER-only form.
    pub fn ber_raw(&self) -> Option<&Bytes> {
        self.ber_raw.as_ref()
    }

    /// Sets the value.
    ///
    /// Fails if the value is outside the range of years the type can hold.
    /// Sub-second precision the type cannot keep is dropped.
    pub fn set(&mut self, value: NaiveDateTime) -> Result<()> {
        self.value = Some(self.sanitize(value).map_err(Error::invalid)?);
        self.ber_raw = None;
        Ok(())
    }

    pub fn with_value(mut self, value: NaiveDateTime) -> Result<Self> {
        self.set(value)?;
        Ok(self)
    }

    /// Sets the value from its DER text form.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let value = self.parse(text.as_bytes(), false)
            .map_err(DecodeError::malformed)?;
        self.value = Some(value.0);
        self.ber_raw = None;
        Ok(())
    }

    pub fn with_text(mut self, text: &str) -> Result<Self> {
        self.set_text(text)?;
        Ok(self)
    }

    /// Adds a DEFAULT value.
    pub fn default(mut self, value: NaiveDateTime) -> Result<Self> {
        let value = self.sanitize(value).map_err(Error::invalid)?;
        self.base.optional = true;
        if self.value.is_none() {
            self.value = Some(value);
        }
        self.default = Some(value);
        Ok(self)
    }

    pub fn default_value(&self) -> Option<NaiveDateTime> {
        self.default
    }

    pub fn is_default(&self) -> bool {
        self.default.is_some() && self.value == self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Returns the DER text form of the value.
    pub fn to_text(&self) -> Option<String> {
        self.value.map(|value| self.encode_time(value))
    }

    pub(crate) fn adopt(&self, value: Self) -> Result<Self> {
        let mut res = Time {
            base: self.base.decoded_at(0, 0, 0),
            value: self.default,
            ber_raw: None,
            ..self.clone()
        };
        if let Some(value) = value.value {
            res.set(value)?;
        }
        Ok(res)
    }

    //--- Helpers

    fn sanitize(
        &self, value: NaiveDateTime
    ) -> Result<NaiveDateTime, &'static str> {
        match self.kind {
            TimeKind::Utc => {
                if !(1950..=2049).contains(&value.year()) {
                    return Err("UTCTime can hold only 1950-2049 years")
                }
                value.with_nanosecond(0).ok_or("invalid time")
            }
            TimeKind::Generalized => {
                if !(1..=9999).contains(&value.year()) {
                    return Err("GeneralizedTime can hold only 1-9999 years")
                }
                let micros = value.nanosecond() / 1000 % 1_000_000;
                value.with_nanosecond(micros * 1000).ok_or("invalid time")
            }
        }
    }

    fn encode_time(&self, value: NaiveDateTime) -> String {
        match self.kind {
            TimeKind::Utc => value.format("%y%m%d%H%M%SZ").to_string(),
            TimeKind::Generalized => {
                let mut res = value.format("%Y%m%d%H%M%S").to_string();
                let micros = value.nanosecond() / 1000;
                if micros > 0 {
                    let fraction = format!("{:06}", micros);
                    res.push('.');
                    res.push_str(fraction.trim_end_matches('0'));
                }
                res.push('Z');
                res
            }
        }
    }

    fn content(&self) -> Result<Cow<'_, [u8]>> {
        match self.value {
            Some(value) => Ok(Cow::Owned(self.encode_time(value).into_bytes())),
            None => Err(Error::ObjNotReady(self.base.class_name.into())),
        }
    }

    /// Parses the content octets.
    ///
    /// Returns the value and, if a BER-only form was used, the raw text.
    fn parse(
        &self, raw: &[u8], bered: bool
    ) -> Result<(NaiveDateTime, Option<Bytes>), String> {
        let name = self.kind.asn1_name();
        let text = match std::str::from_utf8(raw) {
            Ok(text) if text.is_ascii() => text,
            _ => return Err(format!("invalid {} encoding", name))
        };
        let strict = match self.kind {
            TimeKind::Utc => parse_utc(text),
            TimeKind::Generalized => parse_generalized(text),
        };
        let err = match strict {
            Ok(value) => return Ok((value, None)),
            Err(err) => err,
        };
        if !bered {
            return Err(format!("invalid {} format: {}", name, err))
        }
        let relaxed = match self.kind {
            TimeKind::Utc => parse_utc_ber(text),
            TimeKind::Generalized => parse_generalized_ber(text),
        }.and_then(|(offset, value)| {
            value.checked_sub_signed(Duration::seconds(offset))
                .ok_or("invalid date")
        }).and_then(|value| self.sanitize(value));
        match relaxed {
            Ok(value) => Ok((value, Some(Bytes::copy_from_slice(raw)))),
            Err(err) => Err(format!("invalid {} format: {}", name, err)),
        }
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.value == other.value
            && self.base.same_tags(&other.base)
    }
}

impl PartialEq<NaiveDateTime> for Time {
    fn eq(&self, other: &NaiveDateTime) -> bool {
        self.value.as_ref() == Some(other)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Some(value) = self.value else { return Ok(()) };
        write!(f, "{}", value.format("%Y-%m-%dT%H:%M:%S"))?;
        let micros = value.nanosecond() / 1000;
        if micros > 0 {
            write!(f, ".{:06}", micros)?;
        }
        if let Some(raw) = self.ber_raw.as_ref() {
            write!(f, " ({})", String::from_utf8_lossy(raw))?;
        }
        Ok(())
    }
}


//--- Codec and Asn1

impl Codec for Time {
    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    primitive_codec!();

    fn decode_value<'a>(
        &self, dec: &mut Decoder, data: &'a [u8], offset: usize,
        tag_only: bool, evgen: bool,
    ) -> Result<Decoded<'a, Self>> {
        let Some(parts) = decode_parts(
            dec, &self.base, data, offset, tag_only, evgen, true
        )? else {
            return Ok(Decoded::TagMatched)
        };
        let raw = parts.content.clone().unwrap_or_default();
        let (value, ber_raw) = self.parse(&raw, dec.bered()).map_err(|msg| {
            dec.malformed(&self.base, offset, msg)
        })?;
        let mut base = parts.base(&self.base, offset);
        if ber_raw.is_some() {
            base.ber_encoded = true;
        }
        Ok(Decoded::Value(
            Time {
                base,
                value: Some(value),
                ber_raw,
                ..self.clone()
            },
            parts.tail
        ))
    }

    fn from_obj(obj: Obj) -> Result<Self> {
        Self::try_from(obj)
    }
}

impl Asn1 for Time {
    fn base(&self) -> &Base {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        self.kind.asn1_name()
    }

    fn ready(&self) -> bool {
        self.value.is_some()
    }
}


//------------ Parsing -------------------------------------------------------

/// Parses a string of decimal digits.
fn pure_int(text: &str) -> Result<i64, &'static str> {
    if text.is_empty() || !text.bytes().all(|ch| ch.is_ascii_digit()) {
        return Err("non-pure integer")
    }
    text.parse().map_err(|_| "non-pure integer")
}

/// Parses the fraction following a decimal sign.
fn fraction(text: &str) -> Result<f64, &'static str> {
    pure_int(text)?;
    format!("0.{}", text).parse().map_err(|_| "non-pure integer")
}

/// Splits digits into year, month, day, hour, minute and second.
///
/// The year takes all digits before the last ten.
fn time_fractions(text: &str) -> Result<[i64; 6], &'static str> {
    if text.len() < 10 || !text.bytes().all(|ch| ch.is_ascii_digit()) {
        return Err("non-pure integer")
    }
    let (year, rest) = text.split_at(text.len() - 10);
    let mut res = [0; 6];
    res[0] = if year.is_empty() { 0 } else { pure_int(year)? };
    for (idx, chunk) in rest.as_bytes().chunks(2).enumerate() {
        res[idx + 1] = i64::from(chunk[0] - b'0') * 10
            + i64::from(chunk[1] - b'0');
    }
    Ok(res)
}

fn datetime(
    year: i64, month: i64, day: i64, hour: i64, minute: i64, second: i64,
    micros: i64,
) -> Result<NaiveDateTime, &'static str> {
    if !(1..=9999).contains(&year) {
        return Err("year is out of range")
    }
    let field = |value: i64| u32::try_from(value).map_err(|_| "invalid date");
    NaiveDate::from_ymd_opt(year as i32, field(month)?, field(day)?)
        .and_then(|date| {
            date.and_hms_micro_opt(
                field(hour).ok()?, field(minute).ok()?, field(second).ok()?,
                field(micros).ok()?,
            )
        })
        .ok_or("invalid date")
}

fn add(
    value: NaiveDateTime, delta: Duration
) -> Result<NaiveDateTime, &'static str> {
    value.checked_add_signed(delta).ok_or("invalid date")
}

fn utc_year(year: i64) -> i64 {
    if year < 50 { year + 2000 } else { year + 1900 }
}

fn parse_utc(text: &str) -> Result<NaiveDateTime, &'static str> {
    if text.len() != 13 {
        return Err("invalid UTCTime length")
    }
    let Some(digits) = text.strip_suffix('Z') else {
        return Err("non UTC timezone")
    };
    let [year, month, day, hour, minute, second] = time_fractions(digits)?;
    datetime(utc_year(year), month, day, hour, minute, second, 0)
}

/// Parses a relaxed UTCTime.
///
/// Returns the offset to UTC in seconds and the local time.
fn parse_utc_ber(text: &str) -> Result<(i64, NaiveDateTime), &'static str> {
    if text.len() < 10 {
        return Err("invalid UTCTime length")
    }
    let [year, month, day, hour, minute, _] = time_fractions(
        &format!("{}00", &text[..10])
    )?;
    let decoded = datetime(utc_year(year), month, day, hour, minute, 0, 0)?;
    let mut value = &text[10..];
    if value.is_empty() {
        return Err("no timezone")
    }
    let mut offset = 0;
    if let Some(rest) = value.strip_suffix('Z') {
        value = rest;
    }
    else {
        if value.len() < 5 {
            return Err("invalid UTC offset")
        }
        let (rest, zone) = value.split_at(value.len() - 5);
        let sign = match zone.as_bytes()[0] {
            b'-' => -1,
            b'+' => 1,
            _ => return Err("invalid UTC offset"),
        };
        let zone = pure_int(&zone[1..])?;
        offset = 60 * (zone % 100);
        if offset >= 3600 {
            return Err("invalid UTC offset minutes")
        }
        offset += 3600 * (zone / 100);
        if offset > MAX_OFFSET {
            return Err("too big UTC offset")
        }
        offset *= sign;
        value = rest;
    }
    if value.is_empty() {
        return Ok((offset, decoded))
    }
    if value.len() != 2 {
        return Err("invalid UTC offset seconds")
    }
    let seconds = pure_int(value)?;
    if seconds >= 60 {
        return Err("invalid seconds value")
    }
    Ok((offset, add(decoded, Duration::seconds(seconds))?))
}

fn parse_generalized(text: &str) -> Result<NaiveDateTime, &'static str> {
    if text.len() == 15 {
        let Some(digits) = text.strip_suffix('Z') else {
            return Err("non UTC timezone")
        };
        let [year, month, day, hour, minute, second] = time_fractions(
            digits
        )?;
        return datetime(year, month, day, hour, minute, second, 0)
    }
    if text.len() >= 17 {
        let Some(value) = text.strip_suffix('Z') else {
            return Err("non UTC timezone")
        };
        if value.as_bytes()[14] != b'.' {
            return Err("no fractions separator")
        }
        let micros = &value[15..];
        if micros.ends_with('0') {
            return Err("trailing zero")
        }
        if micros.len() > 6 {
            return Err("only microsecond fractions are supported")
        }
        let micros = pure_int(micros)? * 10i64.pow(6 - micros.len() as u32);
        let [year, month, day, hour, minute, second] = time_fractions(
            &value[..14]
        )?;
        return datetime(year, month, day, hour, minute, second, micros)
    }
    Err("invalid GeneralizedTime length")
}

fn is_decimal_sign(ch: u8) -> bool {
    ch == b'.' || ch == b','
}

/// Parses a relaxed GeneralizedTime.
///
/// Returns the offset to UTC in seconds and the local time.
fn parse_generalized_ber(
    text: &str
) -> Result<(i64, NaiveDateTime), &'static str> {
    if text.len() < 10 {
        return Err("invalid GeneralizedTime")
    }
    let [year, month, day, hour, _, _] = time_fractions(
        &format!("{}0000", &text[..10])
    )?;
    let mut decoded = datetime(year, month, day, hour, 0, 0, 0)?;
    let mut value = &text[10..];
    let mut offset = 0;
    if value.is_empty() {
        return Ok((offset, decoded))
    }
    if let Some(rest) = value.strip_suffix('Z') {
        value = rest;
    }
    else {
        for (ch, sign) in [('-', -1), ('+', 1)] {
            let Some(idx) = value.rfind(ch) else { continue };
            let zone = value[idx + 1..].replace(':', "");
            value = &value[..idx];
            let hours = pure_int(&zone)?;
            let hours = match zone.len() {
                4 => {
                    offset = 60 * (hours % 100);
                    if offset >= 3600 {
                        return Err("invalid UTC offset minutes")
                    }
                    hours / 100
                }
                2 => hours,
                _ => return Err("invalid UTC offset"),
            };
            offset += 3600 * hours;
            if offset > MAX_OFFSET {
                return Err("too big UTC offset")
            }
            offset *= sign;
            break
        }
    }
    if value.is_empty() {
        return Ok((offset, decoded))
    }
    if is_decimal_sign(value.as_bytes()[0]) {
        let micros = fraction(&value[1..])? * 3600.0 * 1e6;
        return Ok((offset, add(decoded, micros_delta(micros))?))
    }
    if value.len() < 2 {
        return Err("stripped minutes")
    }
    decoded = add(decoded, Duration::minutes(pure_int(&value[..2])?))?;
    value = &value[2..];
    if value.is_empty() {
        return Ok((offset, decoded))
    }
    if is_decimal_sign(value.as_bytes()[0]) {
        let micros = fraction(&value[1..])? * 60.0 * 1e6;
        return Ok((offset, add(decoded, micros_delta(micros))?))
    }
    if value.len() < 2 {
        return Err("stripped seconds")
    }
    decoded = add(decoded, Duration::seconds(pure_int(&value[..2])?))?;
    value = &value[2..];
    if value.is_empty() {
        return Ok((offset, decoded))
    }
    if !is_decimal_sign(value.as_bytes()[0]) {
        return Err("invalid format after seconds")
    }
    let micros = fraction(&value[1..])? * 1e6;
    Ok((offset, add(decoded, micros_delta(micros))?))
}

/// Converts a number of microseconds into a duration.
///
/// The value is rounded to the closest microsecond.
fn micros_delta(micros: f64) -> Duration {
    Duration::microseconds(micros.round() as i64)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctx::Ctx;

    fn dt(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32,
        micros: u32
    ) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
            .and_hms_micro_opt(hour, min, sec, micros).unwrap()
    }

    fn decode_err(spec: &Time, data: &[u8], ctx: &Ctx) -> String {
        spec.decode(data, ctx).unwrap_err().as_decode().unwrap().msg().into()
    }

    #[test]
    fn utc_encode() {
        let mut value = Time::utc().with_value(
            dt(2017, 5, 6, 12, 30, 45, 123)
        ).unwrap();
        assert_eq!(value.value(), Some(dt(2017, 5, 6, 12, 30, 45, 0)));
        assert_eq!(value.encode().unwrap(), b"\x17\x0d170506123045Z");
        assert_eq!(
            Time::utc().with_value(dt(2050, 1, 1, 0, 0, 0, 0)).unwrap_err()
                .to_string(),
            "UTCTime can hold only 1950-2049 years"
        );
        let value = Time::utc().with_text("491231235959Z").unwrap();
        assert_eq!(value, dt(2049, 12, 31, 23, 59, 59, 0));
        let value = Time::utc().with_text("500101000000Z").unwrap();
        assert_eq!(value, dt(1950, 1, 1, 0, 0, 0, 0));
    }

    #[test]
    fn utc_decode() {
        let spec = Time::utc();
        let res = spec.decod(b"\x17\x0d170506123045Z", &Ctx::new()).unwrap();
        assert_eq!(res, dt(2017, 5, 6, 12, 30, 45, 0));
        assert!(!res.base().ber_encoded());
        assert!(res.ber_raw().is_none());

        assert_eq!(
            decode_err(&spec, b"\x17\x0b1705061230Z", &Ctx::new()),
            "invalid UTCTime format: invalid UTCTime length"
        );
        assert_eq!(
            decode_err(&spec, b"\x17\x0d170506123045+", &Ctx::new()),
            "invalid UTCTime format: non UTC timezone"
        );
        assert_eq!(
            decode_err(&spec, b"\x17\x0d171306123045Z", &Ctx::new()),
            "invalid UTCTime format: invalid date"
        );
    }

    #[test]
    fn utc_decode_ber() {
        let spec = Time::utc();
        let res = spec.decod(b"\x17\x0b1705061230Z", &Ctx::ber()).unwrap();
        assert_eq!(res, dt(2017, 5, 6, 12, 30, 0, 0));
        assert!(res.base().ber_encoded());
        assert_eq!(res.ber_raw().unwrap().as_ref(), b"1705061230Z");
        assert_eq!(
            res.to_string(), "2017-05-06T12:30:00 (1705061230Z)"
        );

        let res = spec.decod(
            b"\x17\x11170506123045-0130", &Ctx::ber()
        ).unwrap();
        assert_eq!(res, dt(2017, 5, 6, 14, 0, 45, 0));

        assert_eq!(
            decode_err(&spec, b"\x17\x0a1705061230", &Ctx::ber()),
            "invalid UTCTime format: no timezone"
        );
        assert_eq!(
            decode_err(&spec, b"\x17\x0f1705061230+1460", &Ctx::ber()),
            "invalid UTCTime format: invalid UTC offset minutes"
        );
        assert_eq!(
            decode_err(&spec, b"\x17\x0f1705061230+1500", &Ctx::ber()),
            "invalid UTCTime format: too big UTC offset"
        );
        assert_eq!(
            decode_err(&spec, b"\x17\x0e1705061230456Z", &Ctx::ber()),
            "invalid UTCTime format: invalid UTC offset seconds"
        );
        assert_eq!(
            decode_err(&spec, b"\x17\x0d170506123060Z", &Ctx::ber()),
            "invalid UTCTime format: invalid seconds value"
        );
        assert_eq!(
            decode_err(&spec, b"\x17\x0f4912312359-0100", &Ctx::ber()),
            "invalid UTCTime format: UTCTime can hold only 1950-2049 years"
        );
    }

    #[test]
    fn generalized_encode() {
        let mut value = Time::generalized().with_value(
            dt(2017, 5, 6, 12, 30, 45, 123000)
        ).unwrap();
        assert_eq!(value.to_text().unwrap(), "20170506123045.123Z");
        assert_eq!(value.encode().unwrap(), b"\x18\x1320170506123045.123Z");

        let value = Time::generalized().with_value(
            dt(1, 1, 1, 0, 0, 0, 0)
        ).unwrap();
        assert_eq!(value.to_text().unwrap(), "00010101000000Z");
        assert_eq!(value.to_string(), "0001-01-01T00:00:00");
    }

    #[test]
    fn generalized_decode() {
        let spec = Time::generalized();
        let res = spec.decod(
            b"\x18\x1620170506123045.000001Z", &Ctx::new()
        ).unwrap();
        assert_eq!(res, dt(2017, 5, 6, 12, 30, 45, 1));

        assert_eq!(
            decode_err(&spec, b"\x18\x1420170506123045.1230Z", &Ctx::new()),
            "invalid GeneralizedTime format: trailing zero"
        );
        assert_eq!(
            decode_err(
                &spec, b"\x18\x1720170506123045.1234567Z", &Ctx::new()
            ),
            "invalid GeneralizedTime format: \
             only microsecond fractions are supported"
        );
        assert_eq!(
            decode_err(&spec, b"\x18\x0d201705061230Z", &Ctx::new()),
            "invalid GeneralizedTime format: invalid GeneralizedTime length"
        );
        assert_eq!(
            decode_err(&spec, b"\x18\x1120170506123045,1Z", &Ctx::new()),
            "invalid GeneralizedTime format: no fractions separator"
        );
        assert_eq!(
            decode_err(&spec, b"\x18\x0f00000101000000Z", &Ctx::new()),
            "invalid GeneralizedTime format: year is out of range"
        );
    }

    #[test]
    fn generalized_decode_ber() {
        let spec = Time::generalized();
        let res = spec.decod(b"\x18\x0d2017050612.5Z", &Ctx::ber()).unwrap();
        assert_eq!(res, dt(2017, 5, 6, 12, 30, 0, 0));
        assert!(res.base().ber_encoded());

        let res = spec.decod(
            b"\x18\x15201705061230,25+01:00", &Ctx::ber()
        ).unwrap();
        assert_eq!(res, dt(2017, 5, 6, 11, 30, 15, 0));

        let res = spec.decod(b"\x18\x0a2017050612", &Ctx::ber()).unwrap();
        assert_eq!(res, dt(2017, 5, 6, 12, 0, 0, 0));

        let res = spec.decod(
            b"\x18\x1520170506123045.5-0200", &Ctx::ber()
        ).unwrap();
        assert_eq!(res, dt(2017, 5, 6, 14, 30, 45, 500000));

        assert_eq!(
            decode_err(&spec, b"\x18\x0b20170506123", &Ctx::ber()),
            "invalid GeneralizedTime format: stripped minutes"
        );
        assert_eq!(
            decode_err(&spec, b"\x18\x0d2017050612301", &Ctx::ber()),
            "invalid GeneralizedTime format: stripped seconds"
        );
        assert_eq!(
            decode_err(&spec, b"\x18\x0f201705061230451", &Ctx::ber()),
            "invalid GeneralizedTime format: invalid format after seconds"
        );
    }
}
