// Copyright 2023 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Parsing of resource records in presentation (master-file) format.
//!
//! A record line is `[owner] [ttl] [class] type rdata...`, with the
//! TTL and class optional and order-insensitive, and omitted fields
//! filled from the parse context. The RDATA grammar is type-specific;
//! any type additionally accepts the [RFC 3597 § 5] generic form
//! `\# length hex...`.
//!
//! [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5

use std::str::FromStr;

use data_encoding::{BASE32HEX_NOPAD, BASE64, HEXLOWER_PERMISSIVE};

use super::error::{Error, ErrorKind, Position, Result};
use super::reader::{decode_escapes, Field, LogicalLine};
use super::{Context, ParsedRr, Parser};
use crate::class::Class;
use crate::name::{Name, NameBuilder};
use crate::rr::rdata::{parse_sig_time, TypeBitmap};
use crate::rr::{Rdata, Record, Ttl, Type};

////////////////////////////////////////////////////////////////////////
// RECORD LINES                                                       //
////////////////////////////////////////////////////////////////////////

/// Parses a record from the fields of a logical line, updating the
/// parse context's "previous" values on success.
pub(super) fn parse_record(line: &LogicalLine, context: &mut Context) -> Result<ParsedRr> {
    let position = line.position;
    let mut fields = Fields::new(&line.fields, position, context.origin.as_ref());

    // The owner: explicit, or carried over from the previous record
    // when the line starts with whitespace.
    let owner = if line.leading_whitespace {
        context
            .previous_owner
            .clone()
            .ok_or_else(|| Error::new(position, ErrorKind::NoPreviousOwner))?
    } else {
        fields.name()?
    };

    // The TTL and class, in either order, each optional.
    let mut ttl = None;
    let mut class = None;
    let rr_type = loop {
        let field = fields.next()?;
        let text = field
            .as_str()
            .ok_or_else(|| Error::new(position, ErrorKind::UnknownType))?;
        if ttl.is_none() {
            if let Some(parsed) = parse_ttl(text) {
                ttl = Some(Ttl::from(parsed));
                continue;
            }
        }
        if class.is_none() {
            if let Ok(parsed) = Class::from_str(text) {
                class = Some(parsed);
                continue;
            }
        }
        break Type::from_str(text).or(Err(Error::new(position, ErrorKind::UnknownType)))?;
    };

    let class = class
        .or(context.previous_class)
        .unwrap_or(Class::IN);
    let ttl = ttl
        .or(context.default_ttl)
        .or(context.previous_ttl)
        .ok_or_else(|| Error::new(position, ErrorKind::NoTtl))?;

    let rdata = parse_rdata(rr_type, class, &mut fields)?;
    fields.finish()?;

    context.previous_owner = Some(owner.clone());
    context.previous_ttl = Some(ttl);
    context.previous_class = Some(class);

    Ok(ParsedRr {
        line: position.line,
        owner,
        ttl,
        class,
        rr_type,
        rdata,
    })
}

/// Parses a TTL in presentation format: either a plain number of
/// seconds, or a concatenation of values with `s`/`m`/`h`/`d`/`w`
/// units (e.g. `1h30m`).
pub(super) fn parse_ttl(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok();
    }

    let mut total: u64 = 0;
    let mut current: Option<u64> = None;
    for b in text.bytes() {
        if b.is_ascii_digit() {
            current = Some(current.unwrap_or(0) * 10 + (b - b'0') as u64);
            if current > Some(u32::MAX as u64) {
                return None;
            }
        } else {
            let multiplier: u64 = match b.to_ascii_lowercase() {
                b's' => 1,
                b'm' => 60,
                b'h' => 60 * 60,
                b'd' => 24 * 60 * 60,
                b'w' => 7 * 24 * 60 * 60,
                _ => return None,
            };
            total = total.checked_add(current.take()? * multiplier)?;
        }
    }
    if current.is_some() {
        // Trailing digits without a unit.
        return None;
    }
    u32::try_from(total).ok()
}

////////////////////////////////////////////////////////////////////////
// FIELD CURSORS                                                      //
////////////////////////////////////////////////////////////////////////

/// A cursor over the fields of a line, with typed accessors for the
/// field shapes RDATA grammars use.
pub(super) struct Fields<'a> {
    fields: &'a [Field],
    position: Position,
    origin: Option<&'a Name>,
}

impl<'a> Fields<'a> {
    pub fn new(fields: &'a [Field], position: Position, origin: Option<&'a Name>) -> Self {
        Self {
            fields,
            position,
            origin,
        }
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(self.position, kind)
    }

    /// Returns the next field.
    pub fn next(&mut self) -> Result<&'a Field> {
        let (first, rest) = self
            .fields
            .split_first()
            .ok_or_else(|| self.error(ErrorKind::UnexpectedEol))?;
        self.fields = rest;
        Ok(first)
    }

    /// Returns whether any fields remain.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Requires that all fields have been consumed.
    pub fn finish(&self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(self.error(ErrorKind::TrailingFields))
        }
    }

    /// Parses the next field as a (possibly relative) domain name.
    pub fn name(&mut self) -> Result<Name> {
        let position = self.position;
        let origin = self.origin;
        let field = self.next()?;
        parse_name_field(field, origin, position)
    }

    /// Parses the next field as a `<character-string>`, decoding
    /// escapes.
    pub fn character_string(&mut self) -> Result<Vec<u8>> {
        let field = self.next()?;
        let decoded = decode_escapes(&field.text)
            .ok_or_else(|| Error::new(self.position, ErrorKind::BadEscape))?;
        if decoded.len() > 255 {
            Err(self.error(ErrorKind::BadRdata("<character-string> too long")))
        } else {
            Ok(decoded)
        }
    }

    fn number(&mut self) -> Result<u64> {
        let field = self.next()?;
        field
            .as_str()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| Error::new(self.position, ErrorKind::BadNumber))
    }

    /// Parses the next field as an unsigned 8-bit integer.
    pub fn u8(&mut self) -> Result<u8> {
        let value = self.number()?;
        u8::try_from(value).or(Err(self.error(ErrorKind::BadNumber)))
    }

    /// Parses the next field as an unsigned 16-bit integer.
    pub fn u16(&mut self) -> Result<u16> {
        let value = self.number()?;
        u16::try_from(value).or(Err(self.error(ErrorKind::BadNumber)))
    }

    /// Parses the next field as an unsigned 32-bit integer.
    pub fn u32(&mut self) -> Result<u32> {
        let value = self.number()?;
        u32::try_from(value).or(Err(self.error(ErrorKind::BadNumber)))
    }

    /// Parses the next field as a time value: a plain number of
    /// seconds or a TTL-style unit string (SOA timers allow both).
    pub fn time(&mut self) -> Result<u32> {
        let field = self.next()?;
        field
            .as_str()
            .and_then(parse_ttl)
            .ok_or_else(|| Error::new(self.position, ErrorKind::BadTtl))
    }

    /// Concatenates all remaining fields and decodes them as base64.
    pub fn remaining_base64(&mut self) -> Result<Vec<u8>> {
        let text = self.concat_remaining()?;
        BASE64
            .decode(text.as_bytes())
            .or(Err(self.error(ErrorKind::BadRdata("invalid base64"))))
    }

    /// Concatenates all remaining fields and decodes them as
    /// hexadecimal.
    pub fn remaining_hex(&mut self) -> Result<Vec<u8>> {
        let text = self.concat_remaining()?;
        HEXLOWER_PERMISSIVE
            .decode(text.as_bytes())
            .or(Err(self.error(ErrorKind::BadRdata("invalid hexadecimal"))))
    }

    /// Parses all remaining fields as RR type mnemonics, producing a
    /// type bit map. An empty list is allowed.
    pub fn remaining_type_bitmap(&mut self) -> Result<TypeBitmap> {
        let mut types = Vec::new();
        while !self.is_empty() {
            let field = self.next()?;
            let rr_type = field
                .as_str()
                .and_then(|text| Type::from_str(text).ok())
                .ok_or_else(|| Error::new(self.position, ErrorKind::UnknownType))?;
            types.push(rr_type);
        }
        Ok(TypeBitmap::from_types(types))
    }

    fn concat_remaining(&mut self) -> Result<String> {
        if self.fields.is_empty() {
            return Err(self.error(ErrorKind::UnexpectedEol));
        }
        let mut text = String::new();
        while !self.fields.is_empty() {
            let field = self.next()?;
            text.push_str(
                field
                    .as_str()
                    .ok_or_else(|| Error::new(self.position, ErrorKind::BadRdata("not ASCII")))?,
            );
        }
        Ok(text)
    }
}

/// Parses a domain-name field: `@` for the origin, an absolute name,
/// or a relative name completed with the origin.
pub(super) fn parse_name_field(
    field: &Field,
    origin: Option<&Name>,
    position: Position,
) -> Result<Name> {
    if field.text == b"@" {
        return origin
            .cloned()
            .ok_or_else(|| Error::new(position, ErrorKind::NoOrigin));
    }
    let text = std::str::from_utf8(&field.text)
        .or(Err(Error::new(position, ErrorKind::BadName(crate::name::Error::StrNotAscii))))?;
    match text.parse::<Name>() {
        Ok(name) => Ok(name),
        Err(crate::name::Error::NonNullTerminal) => {
            // A relative name; append the origin.
            let origin = origin.ok_or_else(|| Error::new(position, ErrorKind::NoOrigin))?;
            let mut builder = NameBuilder::new();
            let mut remaining = field.text.as_slice();
            while let Some(&octet) = remaining.first() {
                if octet == b'\\' {
                    let decoded = decode_escapes(&prefix_escape(remaining))
                        .ok_or_else(|| Error::new(position, ErrorKind::BadEscape))?;
                    builder
                        .try_push(decoded[0])
                        .map_err(|e| Error::new(position, ErrorKind::BadName(e)))?;
                    remaining = &remaining[escape_len(remaining)..];
                } else if octet == b'.' {
                    builder
                        .next_label()
                        .map_err(|e| Error::new(position, ErrorKind::BadName(e)))?;
                    remaining = &remaining[1..];
                } else {
                    builder
                        .try_push(octet)
                        .map_err(|e| Error::new(position, ErrorKind::BadName(e)))?;
                    remaining = &remaining[1..];
                }
            }
            builder
                .finish_with_origin(origin)
                .map_err(|e| Error::new(position, ErrorKind::BadName(e)))
        }
        Err(e) => Err(Error::new(position, ErrorKind::BadName(e))),
    }
}

/// Returns the length of the escape sequence at the start of `raw`
/// (which must start with a backslash).
fn escape_len(raw: &[u8]) -> usize {
    if raw.len() >= 4 && raw[1].is_ascii_digit() {
        4
    } else {
        2.min(raw.len())
    }
}

/// Returns the escape sequence at the start of `raw` as its own slice.
fn prefix_escape(raw: &[u8]) -> Vec<u8> {
    raw[..escape_len(raw)].to_vec()
}

////////////////////////////////////////////////////////////////////////
// RDATA PRESENTATION PARSING                                         //
////////////////////////////////////////////////////////////////////////

/// Parses RDATA in presentation format for the given type and class.
pub(super) fn parse_rdata(
    rr_type: Type,
    class: Class,
    fields: &mut Fields,
) -> Result<Box<Rdata>> {
    // Any type may use the RFC 3597 generic format.
    if let Some(first) = fields.fields.first() {
        if first.text == b"\\#" {
            return parse_generic_rdata(fields);
        }
    }

    let position = fields.position;
    let bad = |detail| Error::new(position, ErrorKind::BadRdata(detail));

    match rr_type {
        Type::A if class == Class::IN => {
            let field = fields.next()?;
            let address = field
                .as_str()
                .and_then(|text| text.parse().ok())
                .ok_or_else(|| bad("invalid IPv4 address"))?;
            Ok(Rdata::new_a(address))
        }
        Type::AAAA if class == Class::IN => {
            let field = fields.next()?;
            let address = field
                .as_str()
                .and_then(|text| text.parse().ok())
                .ok_or_else(|| bad("invalid IPv6 address"))?;
            Ok(Rdata::new_aaaa(address))
        }
        Type::NS
        | Type::MD
        | Type::MF
        | Type::CNAME
        | Type::MB
        | Type::MG
        | Type::MR
        | Type::PTR
        | Type::DNAME => {
            let name = fields.name()?;
            Ok(Rdata::new_name(&name))
        }
        Type::SOA => {
            let mname = fields.name()?;
            let rname = fields.name()?;
            let serial = fields.u32()?;
            let refresh = fields.time()?;
            let retry = fields.time()?;
            let expire = fields.time()?;
            let minimum = fields.time()?;
            Ok(Rdata::new_soa(
                &mname, &rname, serial, refresh, retry, expire, minimum,
            ))
        }
        Type::MX | Type::AFSDB | Type::RT | Type::KX => {
            let preference = fields.u16()?;
            let name = fields.name()?;
            let mut buf = Vec::with_capacity(2 + name.wire_repr().len());
            crate::rr::rdata::serialize_u16_and_name(preference, &name, &mut buf);
            Ok(buf.try_into().unwrap())
        }
        Type::MINFO | Type::RP => {
            let first = fields.name()?;
            let second = fields.name()?;
            let mut buf = Vec::new();
            crate::rr::rdata::serialize_two_names(&first, &second, &mut buf);
            Ok(buf.try_into().unwrap())
        }
        Type::HINFO => {
            let cpu = fields.character_string()?;
            let os = fields.character_string()?;
            Ok(Rdata::new_hinfo(
                cpu.as_slice().try_into().unwrap(),
                os.as_slice().try_into().unwrap(),
            ))
        }
        Type::X25 => {
            let address = fields.character_string()?;
            Ok(Rdata::new_x25(address.as_slice().try_into().unwrap()))
        }
        Type::ISDN => {
            let address = fields.character_string()?;
            let sa = if fields.is_empty() {
                None
            } else {
                Some(fields.character_string()?)
            };
            Ok(Rdata::new_isdn(
                address.as_slice().try_into().unwrap(),
                sa.as_deref().map(|sa| sa.try_into().unwrap()),
            ))
        }
        Type::TXT | Type::SPF => {
            let mut strings = Vec::new();
            loop {
                strings.push(fields.character_string()?);
                if fields.is_empty() {
                    break;
                }
            }
            let character_strings: Vec<&crate::rr::rdata::CharacterString> = strings
                .iter()
                .map(|s| s.as_slice().try_into().unwrap())
                .collect();
            Rdata::new_txt(character_strings).or(Err(bad("TXT RDATA too long")))
        }
        Type::WKS if class == Class::IN => {
            let field = fields.next()?;
            let address = field
                .as_str()
                .and_then(|text| text.parse().ok())
                .ok_or_else(|| bad("invalid IPv4 address"))?;
            let protocol = fields.u8()?;
            let mut ports = Vec::new();
            while !fields.is_empty() {
                ports.push(fields.u16()?);
            }
            Ok(Rdata::new_wks(address, protocol, &ports))
        }
        Type::SRV if class == Class::IN => {
            let priority = fields.u16()?;
            let weight = fields.u16()?;
            let port = fields.u16()?;
            let target = fields.name()?;
            Ok(Rdata::new_srv(priority, weight, port, &target))
        }
        Type::NAPTR => {
            let order = fields.u16()?;
            let preference = fields.u16()?;
            let flags = fields.character_string()?;
            let services = fields.character_string()?;
            let regexp = fields.character_string()?;
            let replacement = fields.name()?;
            Ok(Rdata::new_naptr(
                order,
                preference,
                flags.as_slice().try_into().unwrap(),
                services.as_slice().try_into().unwrap(),
                regexp.as_slice().try_into().unwrap(),
                &replacement,
            ))
        }
        Type::CERT => {
            let cert_type = fields.u16()?;
            let key_tag = fields.u16()?;
            let algorithm = fields.u8()?;
            let certificate = fields.remaining_base64()?;
            Rdata::new_cert(cert_type, key_tag, algorithm, &certificate)
                .or(Err(bad("CERT RDATA too long")))
        }
        Type::DS => {
            let key_tag = fields.u16()?;
            let algorithm = fields.u8()?;
            let digest_type = fields.u8()?;
            let digest = fields.remaining_hex()?;
            Rdata::new_ds(key_tag, algorithm, digest_type, &digest)
                .or(Err(bad("DS RDATA too long")))
        }
        Type::SSHFP => {
            let algorithm = fields.u8()?;
            let fingerprint_type = fields.u8()?;
            let fingerprint = fields.remaining_hex()?;
            Rdata::new_sshfp(algorithm, fingerprint_type, &fingerprint)
                .or(Err(bad("SSHFP RDATA too long")))
        }
        Type::TLSA => {
            let usage = fields.u8()?;
            let selector = fields.u8()?;
            let matching_type = fields.u8()?;
            let data = fields.remaining_hex()?;
            Rdata::new_tlsa(usage, selector, matching_type, &data)
                .or(Err(bad("TLSA RDATA too long")))
        }
        Type::DNSKEY => {
            let flags = fields.u16()?;
            let protocol = fields.u8()?;
            let algorithm = fields.u8()?;
            let public_key = fields.remaining_base64()?;
            Rdata::new_dnskey(flags, protocol, algorithm, &public_key)
                .or(Err(bad("DNSKEY RDATA too long")))
        }
        Type::DHCID => {
            let data = fields.remaining_base64()?;
            Rdata::new_dhcid(&data).or(Err(bad("DHCID RDATA too long")))
        }
        Type::RRSIG | Type::SIG => {
            let covered_field = fields.next()?;
            let type_covered = covered_field
                .as_str()
                .and_then(|text| Type::from_str(text).ok())
                .ok_or_else(|| Error::new(position, ErrorKind::UnknownType))?;
            let algorithm = fields.u8()?;
            let labels = fields.u8()?;
            let original_ttl = fields.time()?;
            let expiration = parse_time_field(fields)?;
            let inception = parse_time_field(fields)?;
            let key_tag = fields.u16()?;
            let signer = fields.name()?;
            let signature = fields.remaining_base64()?;
            Rdata::new_rrsig(
                type_covered,
                algorithm,
                labels,
                original_ttl,
                expiration,
                inception,
                key_tag,
                &signer,
                &signature,
            )
            .or(Err(bad("RRSIG RDATA too long")))
        }
        Type::NSEC => {
            let next = fields.name()?;
            let bitmap = fields.remaining_type_bitmap()?;
            Rdata::new_nsec(&next, &bitmap).or(Err(bad("NSEC RDATA too long")))
        }
        Type::NSEC3 => {
            let hash_algorithm = fields.u8()?;
            let flags = fields.u8()?;
            let iterations = fields.u16()?;
            let salt = parse_salt(fields)?;
            let hash_field = fields.next()?;
            let next_hashed = hash_field
                .as_str()
                .and_then(|text| {
                    BASE32HEX_NOPAD
                        .decode(text.to_ascii_uppercase().as_bytes())
                        .ok()
                })
                .ok_or_else(|| bad("invalid base32hex hash"))?;
            let bitmap = fields.remaining_type_bitmap()?;
            Rdata::new_nsec3(
                hash_algorithm,
                flags,
                iterations,
                &salt,
                &next_hashed,
                &bitmap,
            )
            .or(Err(bad("NSEC3 RDATA too long")))
        }
        Type::NSEC3PARAM => {
            let hash_algorithm = fields.u8()?;
            let flags = fields.u8()?;
            let iterations = fields.u16()?;
            let salt = parse_salt(fields)?;
            let mut buf = Vec::with_capacity(5 + salt.len());
            buf.push(hash_algorithm);
            buf.push(flags);
            buf.extend_from_slice(&iterations.to_be_bytes());
            buf.push(salt.len() as u8);
            buf.extend_from_slice(&salt);
            Ok(buf.try_into().unwrap())
        }
        // LOC, APL, NULL, OPT, TSIG, TKEY, and unknown types have no
        // type-specific presentation here; they use the generic
        // format.
        _ => Err(bad("type requires the RFC 3597 generic format")),
    }
}

/// Parses the RFC 3597 generic RDATA format: `\#`, a length, and that
/// many octets of hexadecimal (possibly split across fields).
fn parse_generic_rdata(fields: &mut Fields) -> Result<Box<Rdata>> {
    let position = fields.position;
    fields.next()?; // The "\#" marker.
    let length = fields.u16()? as usize;
    let octets = if length == 0 {
        Vec::new()
    } else {
        fields.remaining_hex()?
    };
    if octets.len() != length {
        Err(Error::new(
            position,
            ErrorKind::BadRdata("generic RDATA length mismatch"),
        ))
    } else {
        Ok(octets.try_into().unwrap())
    }
}

/// Parses an RRSIG expiration/inception field, which may be either a
/// `YYYYMMDDHHmmSS` timestamp or a plain number of seconds since the
/// epoch.
fn parse_time_field(fields: &mut Fields) -> Result<u32> {
    let position = fields.position;
    let field = fields.next()?;
    field
        .as_str()
        .and_then(|text| parse_sig_time(text).or_else(|| text.parse().ok()))
        .ok_or_else(|| Error::new(position, ErrorKind::BadRdata("invalid signature time")))
}

/// Parses an NSEC3/NSEC3PARAM salt field: `-` for the empty salt, or
/// hexadecimal.
fn parse_salt(fields: &mut Fields) -> Result<Vec<u8>> {
    let position = fields.position;
    let field = fields.next()?;
    if field.text == b"-" {
        return Ok(Vec::new());
    }
    field
        .as_str()
        .and_then(|text| HEXLOWER_PERMISSIVE.decode(text.as_bytes()).ok())
        .filter(|salt| salt.len() <= 255)
        .ok_or_else(|| Error::new(position, ErrorKind::BadRdata("invalid salt")))
}

////////////////////////////////////////////////////////////////////////
// PARSING RECORDS FROM RUST STRINGS                                  //
////////////////////////////////////////////////////////////////////////

/// Parses a [`Record`] from a single line of presentation format. The
/// owner must be fully qualified, and the type must be present; the
/// TTL and class default to 0 and IN if omitted.
impl FromStr for Record {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut context = Context {
            default_ttl: Some(Ttl::ZERO),
            ..Default::default()
        };
        let mut parser = Parser::new(s.as_bytes());
        let line = parser
            .next_record_line()?
            .ok_or_else(|| Error::new(Position { line: 1 }, ErrorKind::UnexpectedEol))?;
        let parsed = parse_record(&line, &mut context)?;
        Ok(Record::new(
            parsed.owner,
            parsed.rr_type,
            parsed.class,
            parsed.ttl,
            parsed.rdata,
        ))
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_records_parse_from_presentation() {
        let record: Record = "example.com. 3600 IN A 192.0.2.1".parse().unwrap();
        assert_eq!(record.owner, "example.com.".parse().unwrap());
        assert_eq!(record.rr_type, Type::A);
        assert_eq!(record.class, Class::IN);
        assert_eq!(record.ttl, Ttl::from(3600));
        assert_eq!(record.rdata.octets(), b"\xc0\x00\x02\x01");
    }

    #[test]
    fn class_and_ttl_may_swap() {
        let a: Record = "example.com. IN 3600 A 192.0.2.1".parse().unwrap();
        let b: Record = "example.com. 3600 IN A 192.0.2.1".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.ttl, Ttl::from(3600));
    }

    #[test]
    fn ttl_units_parse() {
        assert_eq!(parse_ttl("3600"), Some(3600));
        assert_eq!(parse_ttl("1h"), Some(3600));
        assert_eq!(parse_ttl("1h30m"), Some(5400));
        assert_eq!(parse_ttl("2w"), Some(1_209_600));
        assert_eq!(parse_ttl("1h30"), None);
        assert_eq!(parse_ttl("bogus"), None);
    }

    #[test]
    fn presentation_round_trips_for_common_types() {
        let inputs = [
            "example.com.\t3600\tIN\tA\t192.0.2.1",
            "example.com.\t3600\tIN\tAAAA\t2001:db8::1",
            "example.com.\t3600\tIN\tNS\tns1.example.com.",
            "www.example.com.\t300\tIN\tCNAME\thost.example.com.",
            "example.com.\t3600\tIN\tSOA\tns1.example.com. admin.example.com. 123 3600 900 86400 300",
            "example.com.\t3600\tIN\tMX\t10 mail.example.com.",
            "example.com.\t3600\tIN\tTXT\t\"hello world\"",
            "_sip._tcp.example.com.\t3600\tIN\tSRV\t10 60 5060 sip.example.com.",
            "example.com.\t3600\tIN\tDS\t2642 8 2 deadbeefcafe",
            "host.example.com.\t3600\tIN\tSSHFP\t2 1 123456789abcdef0",
            "example.com.\t3600\tIN\tNSEC\thost.example.com. A RRSIG NSEC",
            "old.example.com.\t3600\tIN\tDNAME\tnew.example.com.",
        ];
        for input in inputs {
            let record: Record = input.parse().unwrap();
            let round_tripped: Record = record.to_string().parse().unwrap();
            assert_eq!(record, round_tripped, "round-tripping {:?}", input);
        }
    }

    #[test]
    fn generic_rdata_parses_for_any_type() {
        let record: Record = "example.com. 3600 IN TYPE65280 \\# 4 c0000201".parse().unwrap();
        assert_eq!(record.rdata.octets(), b"\xc0\x00\x02\x01");

        let empty: Record = "example.com. 3600 IN TYPE65280 \\# 0".parse().unwrap();
        assert!(empty.rdata.is_empty());

        // The generic form round-trips through Display.
        let round_tripped: Record = record.to_string().parse().unwrap();
        assert_eq!(record, round_tripped);
    }

    #[test]
    fn generic_rdata_rejects_length_mismatches() {
        assert!("example.com. 3600 IN TYPE65280 \\# 5 c0000201"
            .parse::<Record>()
            .is_err());
    }

    #[test]
    fn rrsig_parses_from_presentation() {
        let record: Record =
            "example.com. 3600 IN RRSIG A 8 2 3600 20230401000000 20230301000000 2642 example.com. AQID"
                .parse()
                .unwrap();
        assert_eq!(record.rdata.sig_type_covered(), Some(Type::A));
        let round_tripped: Record = record.to_string().parse().unwrap();
        assert_eq!(record, round_tripped);
    }

    #[test]
    fn escaped_names_parse() {
        let record: Record = "an\\.odd\\032name.example.com. 3600 IN A 192.0.2.1"
            .parse()
            .unwrap();
        assert_eq!(
            record.owner.wire_repr(),
            b"\x0ban.odd name\x07example\x03com\x00"
        );
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!("example.com. 3600 IN BOGUS 1".parse::<Record>().is_err());
    }

    #[test]
    fn missing_rdata_is_rejected() {
        assert!("example.com. 3600 IN A".parse::<Record>().is_err());
    }
}
