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

//! Handling of the DNSSEC record types: DS, DNSKEY, RRSIG (and the
//! older SIG), NSEC, NSEC3, and NSEC3PARAM, plus the type-bit-map
//! format that NSEC and NSEC3 share.
//!
//! This crate treats these as data types only; it does not sign or
//! validate. See [RFC 4034] and [RFC 5155].
//!
//! [RFC 4034]: https://datatracker.ietf.org/doc/html/rfc4034
//! [RFC 5155]: https://datatracker.ietf.org/doc/html/rfc5155

use std::fmt;

use data_encoding::{BASE32HEX_NOPAD, BASE64, HEXLOWER};

use super::helpers;
use super::{ComponentType, Components, Rdata, RdataTooLongError, ReadRdataError};
use crate::name::Name;
use crate::rr::Type;

////////////////////////////////////////////////////////////////////////
// TYPE BIT MAPS (RFC 4034 § 4.1.2)                                   //
////////////////////////////////////////////////////////////////////////

/// The type-bit-map field used by NSEC and NSEC3 records.
///
/// The wire form is a sequence of `(window, length, bitmap)` blocks;
/// each window covers 256 RR types, and bit 0 of the bitmap is the
/// most significant bit of its first octet. Blocks must appear in
/// ascending window order, must not be empty, and bitmaps are 1 to 32
/// octets with no trailing zero octet.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TypeBitmap {
    octets: Vec<u8>,
}

impl TypeBitmap {
    /// Builds a `TypeBitmap` containing the given types. The input need
    /// not be sorted; duplicates are fine.
    pub fn from_types<I>(types: I) -> Self
    where
        I: IntoIterator<Item = Type>,
    {
        let mut present = vec![false; 1 << 16];
        for rr_type in types {
            present[u16::from(rr_type) as usize] = true;
        }

        let mut octets = Vec::new();
        for window in 0u16..256 {
            let base = (window as usize) << 8;
            let mut bitmap = [0u8; 32];
            let mut bitmap_len = 0;
            for low in 0..256 {
                if present[base + low] {
                    bitmap[low / 8] |= 0x80 >> (low % 8);
                    bitmap_len = low / 8 + 1;
                }
            }
            if bitmap_len > 0 {
                octets.push(window as u8);
                octets.push(bitmap_len as u8);
                octets.extend_from_slice(&bitmap[..bitmap_len]);
            }
        }
        Self { octets }
    }

    /// Parses and validates a type bit map occupying the whole of
    /// `octets`.
    pub fn from_wire(octets: &[u8]) -> Result<Self, ReadRdataError> {
        Self::validate(octets)?;
        Ok(Self {
            octets: octets.to_vec(),
        })
    }

    /// Validates a type bit map occupying the whole of `octets`.
    pub fn validate(octets: &[u8]) -> Result<(), ReadRdataError> {
        let mut offset = 0;
        let mut previous_window = None;
        while offset < octets.len() {
            let header = octets.get(offset..offset + 2).ok_or(ReadRdataError::Other)?;
            let window = header[0];
            let len = header[1] as usize;
            if !(1..=32).contains(&len) {
                return Err(ReadRdataError::Other);
            }
            if let Some(previous) = previous_window {
                if window <= previous {
                    return Err(ReadRdataError::Other);
                }
            }
            let bitmap = octets
                .get(offset + 2..offset + 2 + len)
                .ok_or(ReadRdataError::Other)?;
            if bitmap[len - 1] == 0 {
                return Err(ReadRdataError::Other);
            }
            previous_window = Some(window);
            offset += 2 + len;
        }
        Ok(())
    }

    /// Returns the wire form of the bit map.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Returns an iterator over the types present in the bit map, in
    /// ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Type> + '_ {
        let mut result = Vec::new();
        let mut offset = 0;
        while offset + 2 <= self.octets.len() {
            let window = self.octets[offset] as u16;
            let len = self.octets[offset + 1] as usize;
            let bitmap = &self.octets[offset + 2..offset + 2 + len];
            for (i, &octet) in bitmap.iter().enumerate() {
                for bit in 0..8 {
                    if octet & (0x80 >> bit) != 0 {
                        result.push(Type::from((window << 8) | (i as u16 * 8 + bit as u16)));
                    }
                }
            }
            offset += 2 + len;
        }
        result.into_iter()
    }

    /// Returns whether the bit for `rr_type` is set.
    pub fn contains(&self, rr_type: Type) -> bool {
        self.iter().any(|t| t == rr_type)
    }
}

impl fmt::Display for TypeBitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for rr_type in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}", rr_type)?;
            first = false;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4034 § 5 - DS RDATA                                            //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a DS record into a new boxed [`Rdata`].
    pub fn new_ds(
        key_tag: u16,
        algorithm: u8,
        digest_type: u8,
        digest: &[u8],
    ) -> Result<Box<Self>, RdataTooLongError> {
        let mut buf = Vec::with_capacity(4 + digest.len());
        buf.extend_from_slice(&key_tag.to_be_bytes());
        buf.push(algorithm);
        buf.push(digest_type);
        buf.extend_from_slice(digest);
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type DS.
    pub fn validate_as_ds(&self) -> Result<(), ReadRdataError> {
        if self.len() >= 5 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as a DS record.
    pub(super) fn present_as_ds(&self) -> Option<String> {
        self.validate_as_ds().ok()?;
        let key_tag = u16::from_be_bytes(self.octets[0..2].try_into().unwrap());
        Some(format!(
            "{} {} {} {}",
            key_tag,
            self.octets[2],
            self.octets[3],
            HEXLOWER.encode(&self.octets[4..])
        ))
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4034 § 2 - DNSKEY RDATA                                        //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a DNSKEY record into a new boxed [`Rdata`].
    pub fn new_dnskey(
        flags: u16,
        protocol: u8,
        algorithm: u8,
        public_key: &[u8],
    ) -> Result<Box<Self>, RdataTooLongError> {
        let mut buf = Vec::with_capacity(4 + public_key.len());
        buf.extend_from_slice(&flags.to_be_bytes());
        buf.push(protocol);
        buf.push(algorithm);
        buf.extend_from_slice(public_key);
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type DNSKEY.
    pub fn validate_as_dnskey(&self) -> Result<(), ReadRdataError> {
        if self.len() >= 4 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as a DNSKEY record.
    pub(super) fn present_as_dnskey(&self) -> Option<String> {
        self.validate_as_dnskey().ok()?;
        let flags = u16::from_be_bytes(self.octets[0..2].try_into().unwrap());
        Some(format!(
            "{} {} {} {}",
            flags,
            self.octets[2],
            self.octets[3],
            BASE64.encode(&self.octets[4..])
        ))
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4034 § 3 - RRSIG RDATA (AND THE OLDER SIG)                     //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes an RRSIG (or SIG) record into a new boxed [`Rdata`].
    #[allow(clippy::too_many_arguments)]
    pub fn new_rrsig(
        type_covered: Type,
        algorithm: u8,
        labels: u8,
        original_ttl: u32,
        expiration: u32,
        inception: u32,
        key_tag: u16,
        signer: &Name,
        signature: &[u8],
    ) -> Result<Box<Self>, RdataTooLongError> {
        let mut buf = Vec::with_capacity(18 + signer.wire_repr().len() + signature.len());
        buf.extend_from_slice(&u16::from(type_covered).to_be_bytes());
        buf.push(algorithm);
        buf.push(labels);
        buf.extend_from_slice(&original_ttl.to_be_bytes());
        buf.extend_from_slice(&expiration.to_be_bytes());
        buf.extend_from_slice(&inception.to_be_bytes());
        buf.extend_from_slice(&key_tag.to_be_bytes());
        buf.extend_from_slice(signer.wire_repr());
        buf.extend_from_slice(signature);
        buf.try_into()
    }

    /// Returns the type-covered field, assuming that this [`Rdata`] is
    /// of type RRSIG or SIG. Returns [`None`] if the RDATA is too
    /// short.
    pub fn sig_type_covered(&self) -> Option<Type> {
        self.octets
            .get(0..2)
            .map(|octets| Type::from(u16::from_be_bytes(octets.try_into().unwrap())))
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type RRSIG or SIG.
    pub fn validate_as_rrsig(&self) -> Result<(), ReadRdataError> {
        // SIG(0) records (SIG with type covered 0; RFC 2931) share this
        // layout, so a trailing signature of any length is accepted.
        if self.len() < 18 {
            return Err(ReadRdataError::Other);
        }
        Name::validate_uncompressed(&self.octets[18..])?;
        Ok(())
    }

    /// Reads RRSIG (or SIG) RDATA from a message. See [`Rdata::read`]
    /// for details. The signer name is decompressed for compatibility
    /// with older implementations of the SIG type, though senders must
    /// never compress it.
    pub fn read_rrsig(
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Box<Rdata>, ReadRdataError> {
        let buf = helpers::prepare_to_read_rdata(message, cursor, rdlength)?;
        if buf.len() - cursor < 18 {
            return Err(ReadRdataError::Other);
        }
        let (signer, signer_len) = Name::try_from_compressed(buf, cursor + 18)?;
        let signature = &buf[cursor + 18 + signer_len..];
        let mut rdata = Vec::with_capacity(18 + signer.wire_repr().len() + signature.len());
        rdata.extend_from_slice(&buf[cursor..cursor + 18]);
        rdata.extend_from_slice(signer.wire_repr());
        rdata.extend_from_slice(signature);
        Ok(rdata.try_into().unwrap())
    }

    /// Returns the [`Component`](super::Component)s of this [`Rdata`],
    /// assuming that it is of type RRSIG or SIG. The signer name is
    /// never compressed on output.
    pub(super) fn components_as_rrsig(&self) -> Components {
        static TYPES: &[ComponentType] = &[
            ComponentType::FixedLen(18),
            ComponentType::UncompressibleName,
        ];
        Components::from_types(TYPES, self.octets())
    }

    /// Presents this [`Rdata`] as an RRSIG (or SIG) record.
    pub(super) fn present_as_rrsig(&self) -> Option<String> {
        self.validate_as_rrsig().ok()?;
        let type_covered = self.sig_type_covered()?;
        let field_u32 =
            |i: usize| u32::from_be_bytes(self.octets[i..i + 4].try_into().unwrap());
        let key_tag = u16::from_be_bytes(self.octets[16..18].try_into().unwrap());
        let (signer, signer_len) = Name::try_from_uncompressed(&self.octets[18..]).ok()?;
        let signature = &self.octets[18 + signer_len..];
        Some(format!(
            "{} {} {} {} {} {} {} {} {}",
            type_covered,
            self.octets[2],
            self.octets[3],
            field_u32(4),
            format_sig_time(field_u32(8)),
            format_sig_time(field_u32(12)),
            key_tag,
            signer,
            BASE64.encode(signature)
        ))
    }
}

////////////////////////////////////////////////////////////////////////
// SIGNATURE TIME FORMATTING (RFC 4034 § 3.2)                         //
////////////////////////////////////////////////////////////////////////

/// Formats a signature expiration/inception field as `YYYYMMDDHHmmSS`.
/// The wire value is seconds since the Unix epoch modulo 2³²; the
/// presentation form uses the civil calendar (proleptic Gregorian).
pub fn format_sig_time(value: u32) -> String {
    let secs_of_day = value as u64 % 86_400;
    let days = value as u64 / 86_400;
    let (year, month, day) = civil_from_days(days as i64);
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        year,
        month,
        day,
        secs_of_day / 3600,
        secs_of_day % 3600 / 60,
        secs_of_day % 60
    )
}

/// Parses a `YYYYMMDDHHmmSS` signature time into seconds since the Unix
/// epoch (modulo 2³²).
pub fn parse_sig_time(text: &str) -> Option<u32> {
    if text.len() != 14 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let num = |range: std::ops::Range<usize>| text[range].parse::<i64>().unwrap();
    let (year, month, day) = (num(0..4), num(4..6), num(6..8));
    let (hour, minute, second) = (num(8..10), num(10..12), num(12..14));
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    let days = days_from_civil(year, month, day);
    Some((days * 86_400 + hour * 3600 + minute * 60 + second) as u32)
}

/// Converts a day count since 1970-01-01 to a civil date. This is the
/// classic days-to-civil algorithm over the proleptic Gregorian
/// calendar.
fn civil_from_days(z: i64) -> (i64, i64, i64) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Converts a civil date to a day count since 1970-01-01 (the inverse
/// of `civil_from_days`).
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = y.div_euclid(400);
    let yoe = y.rem_euclid(400);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

////////////////////////////////////////////////////////////////////////
// RFC 4034 § 4 - NSEC RDATA                                          //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes an NSEC record into a new boxed [`Rdata`].
    pub fn new_nsec(next: &Name, types: &TypeBitmap) -> Result<Box<Self>, RdataTooLongError> {
        let mut buf = Vec::with_capacity(next.wire_repr().len() + types.octets().len());
        buf.extend_from_slice(next.wire_repr());
        buf.extend_from_slice(types.octets());
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type NSEC.
    pub fn validate_as_nsec(&self) -> Result<(), ReadRdataError> {
        let next_len = Name::validate_uncompressed(&self.octets)?;
        TypeBitmap::validate(&self.octets[next_len..])
    }

    /// Returns the [`Component`](super::Component)s of this [`Rdata`],
    /// assuming that it is of type NSEC. The next domain name is never
    /// compressed on output.
    pub(super) fn components_as_nsec(&self) -> Components {
        static TYPES: &[ComponentType] = &[ComponentType::UncompressibleName];
        Components::from_types(TYPES, self.octets())
    }

    /// Presents this [`Rdata`] as an NSEC record.
    pub(super) fn present_as_nsec(&self) -> Option<String> {
        let (next, next_len) = Name::try_from_uncompressed(&self.octets).ok()?;
        let bitmap = TypeBitmap::from_wire(&self.octets[next_len..]).ok()?;
        if bitmap.octets().is_empty() {
            Some(next.to_string())
        } else {
            Some(format!("{} {}", next, bitmap))
        }
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 5155 - NSEC3 AND NSEC3PARAM RDATA                              //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes an NSEC3 record into a new boxed [`Rdata`].
    pub fn new_nsec3(
        hash_algorithm: u8,
        flags: u8,
        iterations: u16,
        salt: &[u8],
        next_hashed: &[u8],
        types: &TypeBitmap,
    ) -> Result<Box<Self>, RdataTooLongError> {
        if salt.len() > u8::MAX as usize || next_hashed.len() > u8::MAX as usize {
            return Err(RdataTooLongError);
        }
        let mut buf =
            Vec::with_capacity(6 + salt.len() + next_hashed.len() + types.octets().len());
        buf.push(hash_algorithm);
        buf.push(flags);
        buf.extend_from_slice(&iterations.to_be_bytes());
        buf.push(salt.len() as u8);
        buf.extend_from_slice(salt);
        buf.push(next_hashed.len() as u8);
        buf.extend_from_slice(next_hashed);
        buf.extend_from_slice(types.octets());
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type NSEC3.
    pub fn validate_as_nsec3(&self) -> Result<(), ReadRdataError> {
        let after_salt = self.nsec3param_len()?;
        let hash_len = *self.octets.get(after_salt).ok_or(ReadRdataError::Other)? as usize;
        let after_hash = after_salt + 1 + hash_len;
        if hash_len == 0 || self.len() < after_hash {
            return Err(ReadRdataError::Other);
        }
        TypeBitmap::validate(&self.octets[after_hash..])
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type NSEC3PARAM.
    pub fn validate_as_nsec3param(&self) -> Result<(), ReadRdataError> {
        let len = self.nsec3param_len()?;
        if self.len() == len {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Checks the fixed fields and salt shared by NSEC3 and NSEC3PARAM,
    /// returning the offset just past the salt.
    fn nsec3param_len(&self) -> Result<usize, ReadRdataError> {
        let salt_len = *self.octets.get(4).ok_or(ReadRdataError::Other)? as usize;
        let end = 5 + salt_len;
        if self.len() < end {
            Err(ReadRdataError::Other)
        } else {
            Ok(end)
        }
    }

    /// Presents this [`Rdata`] as an NSEC3 record.
    pub(super) fn present_as_nsec3(&self) -> Option<String> {
        self.validate_as_nsec3().ok()?;
        let after_salt = self.nsec3param_len().ok()?;
        let hash_len = self.octets[after_salt] as usize;
        let next_hashed = &self.octets[after_salt + 1..after_salt + 1 + hash_len];
        let bitmap = TypeBitmap::from_wire(&self.octets[after_salt + 1 + hash_len..]).ok()?;
        let mut out = format!(
            "{} {}",
            self.present_nsec3param_fields()?,
            BASE32HEX_NOPAD.encode(next_hashed).to_ascii_lowercase()
        );
        if !bitmap.octets().is_empty() {
            out.push(' ');
            out.push_str(&bitmap.to_string());
        }
        Some(out)
    }

    /// Presents this [`Rdata`] as an NSEC3PARAM record.
    pub(super) fn present_as_nsec3param(&self) -> Option<String> {
        self.validate_as_nsec3param().ok()?;
        self.present_nsec3param_fields()
    }

    /// Presents the hash algorithm, flags, iterations, and salt fields
    /// shared by NSEC3 and NSEC3PARAM.
    fn present_nsec3param_fields(&self) -> Option<String> {
        let iterations = u16::from_be_bytes(self.octets.get(2..4)?.try_into().unwrap());
        let salt_len = self.octets[4] as usize;
        let salt = &self.octets[5..5 + salt_len];
        let salt_text = if salt.is_empty() {
            "-".to_owned()
        } else {
            HEXLOWER.encode(salt)
        };
        Some(format!(
            "{} {} {} {}",
            self.octets[0], self.octets[1], iterations, salt_text
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
    fn type_bitmap_round_trips() {
        let bitmap = TypeBitmap::from_types([Type::A, Type::MX, Type::RRSIG, Type::NSEC]);
        let types: Vec<Type> = bitmap.iter().collect();
        assert_eq!(types, [Type::A, Type::MX, Type::RRSIG, Type::NSEC]);
        TypeBitmap::validate(bitmap.octets()).unwrap();
        assert!(bitmap.contains(Type::MX));
        assert!(!bitmap.contains(Type::AAAA));
    }

    #[test]
    fn type_bitmap_handles_high_windows() {
        let bitmap = TypeBitmap::from_types([Type::A, Type::TSIG]);
        // TSIG is type 250, still in window 0; add a type from window 1.
        let bitmap_high = TypeBitmap::from_types([Type::A, Type::from(256 + 13)]);
        assert_eq!(bitmap.iter().count(), 2);
        let types: Vec<Type> = bitmap_high.iter().collect();
        assert_eq!(types, [Type::A, Type::from(269)]);
        TypeBitmap::validate(bitmap_high.octets()).unwrap();
    }

    #[test]
    fn type_bitmap_matches_rfc4034_example() {
        // RFC 4034 § 4.3's example NSEC covers A, MX, RRSIG, NSEC, and
        // TYPE1234.
        let bitmap = TypeBitmap::from_types([
            Type::A,
            Type::MX,
            Type::RRSIG,
            Type::NSEC,
            Type::from(1234),
        ]);
        assert_eq!(
            bitmap.octets(),
            b"\x00\x06\x40\x01\x00\x00\x00\x03\x04\x1b\x00\x00\x00\x00\x00\x00\
              \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
              \x00\x00\x00\x00\x20"
        );
    }

    #[test]
    fn type_bitmap_validation_rejects_malformed_blocks() {
        // Zero-length bitmap.
        assert!(TypeBitmap::validate(b"\x00\x00").is_err());
        // Trailing zero octet.
        assert!(TypeBitmap::validate(b"\x00\x02\x40\x00").is_err());
        // Out-of-order windows.
        assert!(TypeBitmap::validate(b"\x01\x01\x40\x00\x01\x40").is_err());
    }

    #[test]
    fn sig_times_round_trip() {
        assert_eq!(format_sig_time(0), "19700101000000");
        assert_eq!(parse_sig_time("19700101000000"), Some(0));
        // 2023-03-31 04:00:00 UTC.
        let time = 1_680_235_200;
        assert_eq!(parse_sig_time(&format_sig_time(time)), Some(time));
        assert_eq!(parse_sig_time("2023033104000"), None);
        assert_eq!(parse_sig_time("20230331990000"), None);
    }

    #[test]
    fn rrsig_accessors_and_presentation_work() {
        let signer: Name = "example.test.".parse().unwrap();
        let rdata = Rdata::new_rrsig(
            Type::A,
            8,
            2,
            3600,
            parse_sig_time("20230401000000").unwrap(),
            parse_sig_time("20230301000000").unwrap(),
            2642,
            &signer,
            b"\x01\x02\x03",
        )
        .unwrap();
        rdata.validate_as_rrsig().unwrap();
        assert_eq!(rdata.sig_type_covered(), Some(Type::A));
        assert_eq!(
            rdata.present_as_rrsig().unwrap(),
            "A 8 2 3600 20230401000000 20230301000000 2642 example.test. AQID"
        );
    }

    #[test]
    fn nsec_round_trips() {
        let next: Name = "host.example.test.".parse().unwrap();
        let bitmap = TypeBitmap::from_types([Type::A, Type::RRSIG, Type::NSEC]);
        let rdata = Rdata::new_nsec(&next, &bitmap).unwrap();
        rdata.validate_as_nsec().unwrap();
        assert_eq!(
            rdata.present_as_nsec().unwrap(),
            "host.example.test. A RRSIG NSEC"
        );
    }

    #[test]
    fn nsec3_round_trips() {
        let bitmap = TypeBitmap::from_types([Type::A]);
        let rdata =
            Rdata::new_nsec3(1, 0, 12, b"\xaa\xbb", b"\x00\x01\x02\x03\x04", &bitmap).unwrap();
        rdata.validate_as_nsec3().unwrap();
        assert_eq!(rdata.present_as_nsec3().unwrap(), "1 0 12 aabb 000g40o4 A");
    }

    #[test]
    fn nsec3param_round_trips() {
        let empty_bitmap = TypeBitmap::default();
        let nsec3 = Rdata::new_nsec3(1, 0, 0, b"", b"\xff", &empty_bitmap).unwrap();
        // NSEC3PARAM is the prefix of NSEC3 without hash and bitmap.
        let rdata: &Rdata = b"\x01\x00\x00\x00\x00".try_into().unwrap();
        rdata.validate_as_nsec3param().unwrap();
        assert_eq!(rdata.present_as_nsec3param().unwrap(), "1 0 0 -");
        nsec3.validate_as_nsec3().unwrap();
    }
}
