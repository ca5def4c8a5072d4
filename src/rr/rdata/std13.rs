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

//! Handling of the RR types from the original DNS specification, STD 13
//! ([RFC 1034] and [RFC 1035]), along with the layout helpers that
//! later name-bearing types share.
//!
//! [RFC 1034]: https://datatracker.ietf.org/doc/html/rfc1034
//! [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035

use std::borrow::Borrow;
use std::fmt;
use std::iter;
use std::net::Ipv4Addr;

use super::helpers;
use super::{ComponentType, Components, Rdata, RdataTooLongError, ReadRdataError};
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// RFC 1035 § 3.3 <CHARACTER-STRING> TYPE                             //
////////////////////////////////////////////////////////////////////////

/// A type for [RFC 1035 § 3.3] `<character-string>`s.
///
/// [RFC 1035 § 3.3] defines the `<character-string>` type, which (on
/// the wire) is a single length octet followed by that number of
/// octets. Thus the content of a `<character-string>` is limited to 255
/// octets. The `CharacterString` type is a wrapper over `[u8]` that can
/// only be constructed if the underlying data has length 255 or less.
///
/// [RFC 1035 § 3.3]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3
#[derive(Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct CharacterString {
    octets: [u8],
}

impl CharacterString {
    /// Returns the length of the `<character-string>`'s content.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether the `<character-string>` is empty.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the underlying octet slice.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }
}

impl<'a> TryFrom<&'a [u8]> for &'a CharacterString {
    type Error = CharacterStringTooLongError;

    fn try_from(octets: &'a [u8]) -> Result<Self, Self::Error> {
        if octets.len() > (u8::MAX as usize) {
            Err(CharacterStringTooLongError)
        } else {
            Ok(unsafe { &*(octets as *const [u8] as *const CharacterString) })
        }
    }
}

impl<'a, const N: usize> TryFrom<&'a [u8; N]> for &'a CharacterString {
    type Error = CharacterStringTooLongError;

    fn try_from(octets: &'a [u8; N]) -> Result<Self, Self::Error> {
        octets[..].try_into()
    }
}

impl Borrow<[u8]> for CharacterString {
    fn borrow(&self) -> &[u8] {
        &self.octets
    }
}

impl ToOwned for CharacterString {
    type Owned = Box<Self>;

    fn to_owned(&self) -> Self::Owned {
        let boxed_octets: Box<[u8]> = self.octets.into();
        unsafe { Box::from_raw(Box::into_raw(boxed_octets) as *mut CharacterString) }
    }
}

impl Clone for Box<CharacterString> {
    fn clone(&self) -> Self {
        self.as_ref().to_owned()
    }
}

/// Displays the `<character-string>` in quoted presentation form.
/// Double quotes and backslashes are escaped with a backslash, and
/// octets outside the ASCII printable range are escaped `\DDD`.
impl fmt::Display for CharacterString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("\"")?;
        for &octet in self.octets() {
            if octet == b'"' || octet == b'\\' {
                write!(f, "\\{}", octet as char)?;
            } else if (0x20..0x7f).contains(&octet) {
                write!(f, "{}", octet as char)?;
            } else {
                write!(f, "\\{:03}", octet)?;
            }
        }
        f.write_str("\"")
    }
}

/// An error signaling that a buffer cannot be converted into a
/// [`CharacterString`] because it is too long.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CharacterStringTooLongError;

impl fmt::Display for CharacterStringTooLongError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("<character-string> is too long")
    }
}

impl std::error::Error for CharacterStringTooLongError {}

/// Validates the on-the-wire representation of a `<character-string>`
/// at the beginning of the provided buffer, returning the length of the
/// string on the wire when successful.
pub(super) fn validate_character_string(octets: &[u8]) -> Result<usize, ReadRdataError> {
    if let Some(len) = octets.first() {
        let wire_len = 1 + *len as usize;
        if wire_len <= octets.len() {
            Ok(wire_len)
        } else {
            Err(ReadRdataError::Other)
        }
    } else {
        Err(ReadRdataError::Other)
    }
}

/// Iterates over consecutive `<character-string>`s at the start of a
/// buffer, stopping at the first invalid one.
pub(super) fn character_strings(mut octets: &[u8]) -> impl Iterator<Item = &CharacterString> {
    iter::from_fn(move || match validate_character_string(octets) {
        Ok(wire_len) => {
            let string = <&CharacterString>::try_from(&octets[1..wire_len]).unwrap();
            octets = &octets[wire_len..];
            Some(string)
        }
        Err(_) => None,
    })
}

////////////////////////////////////////////////////////////////////////
// RFC 1035 § 3.4.1 - A RDATA                                         //
////////////////////////////////////////////////////////////////////////

/// Serializes an A record into the provided buffer.
pub fn serialize_a(address: Ipv4Addr, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&address.octets())
}

impl Rdata {
    /// Serializes an A record into a new boxed [`Rdata`].
    pub fn new_a(address: Ipv4Addr) -> Box<Self> {
        let mut buf = Vec::with_capacity(4);
        serialize_a(address, &mut buf);
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type A in class IN.
    pub fn validate_as_in_a(&self) -> Result<(), ReadRdataError> {
        if self.len() == 4 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as an IN A record.
    pub(super) fn present_as_in_a(&self) -> Option<String> {
        let octets: [u8; 4] = self.octets().try_into().ok()?;
        Some(Ipv4Addr::from(octets).to_string())
    }
}

////////////////////////////////////////////////////////////////////////
// CHAOSNET A RDATA                                                   //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a Chaosnet class A record into a new boxed [`Rdata`].
    pub fn new_ch_a(chaosnet_domain: &Name, address: u16) -> Box<Self> {
        let mut buf = Vec::with_capacity(chaosnet_domain.wire_repr().len() + 2);
        buf.extend_from_slice(chaosnet_domain.wire_repr());
        buf.extend_from_slice(&address.to_be_bytes());
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type A in class CH.
    pub fn validate_as_ch_a(&self) -> Result<(), ReadRdataError> {
        let domain_len = Name::validate_uncompressed(&self.octets)?;
        if self.len() == domain_len + 2 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Reads Chaosnet class A RDATA from a message. See [`Rdata::read`]
    /// for details.
    pub fn read_ch_a(
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Box<Rdata>, ReadRdataError> {
        let buf = helpers::prepare_to_read_rdata(message, cursor, rdlength)?;
        let (domain, domain_len) = Name::try_from_compressed(buf, cursor)?;
        if buf.len() - cursor != domain_len + 2 {
            Err(ReadRdataError::Other)
        } else {
            let mut rdata = Vec::with_capacity(domain.wire_repr().len() + 2);
            rdata.extend_from_slice(domain.wire_repr());
            rdata.extend_from_slice(&buf[cursor + domain_len..]);
            Ok(rdata.try_into().unwrap())
        }
    }

    /// Determines whether this [`Rdata`] is equal to another, assuming
    /// that both are of type A in class CH. See [`Rdata::equals`] for
    /// details.
    pub fn equals_as_ch_a(&self, other: &Rdata) -> bool {
        if self.len() != other.len() {
            return false;
        }
        match helpers::test_n_name_fields(&self.octets, &other.octets, 1) {
            Some(Some(len)) if self.len() - len == 2 => self.octets[len..] == other.octets[len..],
            Some(Some(_)) => self.octets == other.octets,
            Some(None) => false,
            None => self.octets == other.octets,
        }
    }

    /// Returns the [`Component`]s of this [`Rdata`], assuming that it
    /// is of type A in class CH.
    pub(super) fn components_as_ch_a(&self) -> Components {
        static TYPES: &[ComponentType] = &[ComponentType::CompressibleName];
        Components::from_types(TYPES, self.octets())
    }
}

////////////////////////////////////////////////////////////////////////
// SINGLE-NAME RDATA (NS, MD, MF, CNAME, MB, MG, MR, PTR, DNAME)      //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes RDATA consisting of a single domain name (NS, CNAME,
    /// PTR, DNAME, and friends) into a new boxed [`Rdata`].
    pub fn new_name(name: &Name) -> Box<Self> {
        let boxed: Box<[u8]> = name.wire_repr().into();
        let vec: Vec<u8> = boxed.into();
        vec.try_into().unwrap()
    }

    /// Parses this [`Rdata`] as a single domain name. Returns [`None`]
    /// if the RDATA is not exactly one uncompressed name.
    pub fn single_name(&self) -> Option<Name> {
        Name::try_from_uncompressed_all(&self.octets).ok()
    }

    /// Presents this [`Rdata`] as a single domain name.
    pub(super) fn present_as_name(&self) -> Option<String> {
        self.single_name().map(|name| name.to_string())
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1035 § 3.3.13 - SOA RDATA                                      //
////////////////////////////////////////////////////////////////////////

/// Serializes an SOA record into the provided buffer.
///
/// Note that [RFC 1035 § 3.3.13] does not state whether REFRESH, RETRY,
/// and EXPIRE are signed or unsigned. BIND, NSD, and Knot all seem to
/// agree that they are unsigned, and that makes more sense than signed,
/// so we've gone with that!
///
/// [RFC 1035 § 3.3.13]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.13
#[allow(clippy::too_many_arguments)]
pub fn serialize_soa(
    mname: &Name,
    rname: &Name,
    serial: u32,
    refresh: u32,
    retry: u32,
    expire: u32,
    minimum: u32,
    buf: &mut Vec<u8>,
) {
    buf.reserve(20 + mname.wire_repr().len() + rname.wire_repr().len());
    buf.extend_from_slice(mname.wire_repr());
    buf.extend_from_slice(rname.wire_repr());
    buf.extend_from_slice(&serial.to_be_bytes());
    buf.extend_from_slice(&refresh.to_be_bytes());
    buf.extend_from_slice(&retry.to_be_bytes());
    buf.extend_from_slice(&expire.to_be_bytes());
    buf.extend_from_slice(&minimum.to_be_bytes());
}

impl Rdata {
    /// Serializes an SOA record into a new boxed [`Rdata`].
    pub fn new_soa(
        mname: &Name,
        rname: &Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Box<Self> {
        let mut buf = Vec::with_capacity(20 + mname.wire_repr().len() + rname.wire_repr().len());
        serialize_soa(
            mname, rname, serial, refresh, retry, expire, minimum, &mut buf,
        );
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type SOA.
    pub fn validate_as_soa(&self) -> Result<(), ReadRdataError> {
        let mname_len = Name::validate_uncompressed(&self.octets)?;
        let rname_len = Name::validate_uncompressed(&self.octets[mname_len..])?;
        if self.len() == 20 + mname_len + rname_len {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Reads SOA RDATA from a message. See [`Rdata::read`] for details.
    pub fn read_soa(
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Box<Rdata>, ReadRdataError> {
        let buf = helpers::prepare_to_read_rdata(message, cursor, rdlength)?;
        let (mname, mlen) = Name::try_from_compressed(buf, cursor)?;
        let (rname, rlen) = Name::try_from_compressed(buf, cursor + mlen)?;
        if buf.len() - cursor - mlen - rlen != 20 {
            Err(ReadRdataError::Other)
        } else {
            let mut rdata =
                Vec::with_capacity(mname.wire_repr().len() + rname.wire_repr().len() + 20);
            rdata.extend_from_slice(mname.wire_repr());
            rdata.extend_from_slice(rname.wire_repr());
            rdata.extend_from_slice(&buf[cursor + mlen + rlen..]);
            Ok(rdata.try_into().unwrap())
        }
    }

    /// Determines whether this [`Rdata`] is equal to another, assuming
    /// that both are of type SOA. See [`Rdata::equals`] for details.
    pub fn equals_as_soa(&self, other: &Rdata) -> bool {
        if self.len() != other.len() {
            return false;
        }
        match helpers::test_n_name_fields(&self.octets, &other.octets, 2) {
            Some(Some(len)) => {
                if self.len() - len != 20 {
                    // The remaining fields are not the right length.
                    // Fall back to bitwise comparison.
                    self.octets == other.octets
                } else {
                    // Compare the remaining fields bitwise.
                    self.octets[len..] == other.octets[len..]
                }
            }
            Some(None) => false,
            None => self.octets == other.octets,
        }
    }

    /// Returns the [`Component`]s of this [`Rdata`], assuming that it
    /// is of type SOA.
    pub(super) fn components_as_soa(&self) -> Components {
        static TYPES: &[ComponentType] = &[
            ComponentType::CompressibleName,
            ComponentType::CompressibleName,
            ComponentType::FixedLen(20),
        ];
        Components::from_types(TYPES, self.octets())
    }

    /// Presents this [`Rdata`] as an SOA record.
    pub(super) fn present_as_soa(&self) -> Option<String> {
        let (mname, mlen) = Name::try_from_uncompressed(&self.octets).ok()?;
        let (rname, rlen) = Name::try_from_uncompressed(&self.octets[mlen..]).ok()?;
        let rest = &self.octets[mlen + rlen..];
        if rest.len() != 20 {
            return None;
        }
        let field = |i: usize| u32::from_be_bytes(rest[4 * i..4 * i + 4].try_into().unwrap());
        Some(format!(
            "{} {} {} {} {} {} {}",
            mname,
            rname,
            field(0),
            field(1),
            field(2),
            field(3),
            field(4)
        ))
    }

    /// Returns the SERIAL field, assuming that this [`Rdata`] is of
    /// type SOA.
    pub fn soa_serial(&self) -> Option<u32> {
        self.soa_fixed_field(0)
    }

    /// Returns the MINIMUM field, assuming that this [`Rdata`] is of
    /// type SOA.
    pub fn soa_minimum(&self) -> Option<u32> {
        self.soa_fixed_field(4)
    }

    /// Returns the `i`-th of the five 32-bit fields that follow the
    /// MNAME and RNAME fields of SOA RDATA.
    fn soa_fixed_field(&self, i: usize) -> Option<u32> {
        let mname_len = Name::validate_uncompressed(&self.octets).ok()?;
        let rname_len = Name::validate_uncompressed(&self.octets[mname_len..]).ok()?;
        let rest = &self.octets[mname_len + rname_len..];
        if rest.len() != 20 {
            None
        } else {
            Some(u32::from_be_bytes(
                rest[4 * i..4 * i + 4].try_into().unwrap(),
            ))
        }
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1035 § 3.4.2 - WKS RDATA                                       //
////////////////////////////////////////////////////////////////////////

/// Serializes a WKS record into the provided buffer.
pub fn serialize_wks(address: Ipv4Addr, protocol: u8, ports: &[u16], buf: &mut Vec<u8>) {
    let len = match ports.iter().max() {
        Some(highest_port) => (*highest_port as usize) / 8 + 1,
        None => 0,
    };
    buf.reserve(5 + len);
    buf.extend_from_slice(&address.octets());
    buf.push(protocol);
    let start_index = buf.len();
    buf.extend(iter::repeat(0).take(len));
    for port in ports {
        let offset = (*port as usize) / 8;
        let mask = 1 << (port % 8);
        buf[start_index + offset] |= mask;
    }
}

impl Rdata {
    /// Serializes a WKS record into a new boxed [`Rdata`].
    pub fn new_wks(address: Ipv4Addr, protocol: u8, ports: &[u16]) -> Box<Self> {
        let mut buf = Vec::new();
        serialize_wks(address, protocol, ports, &mut buf);
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type WKS in class IN.
    pub fn validate_as_in_wks(&self) -> Result<(), ReadRdataError> {
        if self.len() >= 5 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1035 § 3.3.10 - NULL RDATA                                     //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a NULL record into a new boxed [`Rdata`]. NULL RDATA
    /// is opaque; anything up to the RDATA length limit is accepted.
    pub fn new_null(data: &[u8]) -> Result<Box<Self>, RdataTooLongError> {
        data.to_vec().try_into()
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1035 § 3.3.2 - HINFO RDATA                                     //
////////////////////////////////////////////////////////////////////////

/// Serializes an HINFO record into the provided buffer.
pub fn serialize_hinfo(cpu: &CharacterString, os: &CharacterString, buf: &mut Vec<u8>) {
    buf.reserve(2 + cpu.len() + os.len());
    buf.push(cpu.len() as u8);
    buf.extend_from_slice(cpu.octets());
    buf.push(os.len() as u8);
    buf.extend_from_slice(os.octets());
}

impl Rdata {
    /// Serializes an HINFO record into a new boxed [`Rdata`].
    pub fn new_hinfo(cpu: &CharacterString, os: &CharacterString) -> Box<Self> {
        let mut buf = Vec::with_capacity(2 + cpu.len() + os.len());
        serialize_hinfo(cpu, os, &mut buf);
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type HINFO.
    pub fn validate_as_hinfo(&self) -> Result<(), ReadRdataError> {
        let cpu_len = validate_character_string(&self.octets)?;
        let os_len = validate_character_string(&self.octets[cpu_len..])?;
        if self.len() == cpu_len + os_len {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as an HINFO record.
    pub(super) fn present_as_hinfo(&self) -> Option<String> {
        self.validate_as_hinfo().ok()?;
        let mut strings = character_strings(&self.octets);
        let cpu = strings.next()?;
        let os = strings.next()?;
        Some(format!("{} {}", cpu, os))
    }
}

////////////////////////////////////////////////////////////////////////
// TWO-NAME RDATA (MINFO AND, LATER, RP)                              //
////////////////////////////////////////////////////////////////////////

/// Serializes RDATA consisting of two domain names (MINFO, RP) into the
/// provided buffer.
pub fn serialize_two_names(first: &Name, second: &Name, buf: &mut Vec<u8>) {
    buf.reserve(first.wire_repr().len() + second.wire_repr().len());
    buf.extend_from_slice(first.wire_repr());
    buf.extend_from_slice(second.wire_repr());
}

impl Rdata {
    /// Serializes an MINFO record into a new boxed [`Rdata`].
    pub fn new_minfo(rmailbx: &Name, emailbx: &Name) -> Box<Self> {
        let mut buf = Vec::with_capacity(rmailbx.wire_repr().len() + emailbx.wire_repr().len());
        serialize_two_names(rmailbx, emailbx, &mut buf);
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it
    /// consists of two domain names (MINFO, RP).
    pub fn validate_as_two_names(&self) -> Result<(), ReadRdataError> {
        let first_len = Name::validate_uncompressed(&self.octets)?;
        Name::validate_uncompressed_all(&self.octets[first_len..]).map_err(Into::into)
    }

    /// Reads two-name RDATA (MINFO, RP) from a message. See
    /// [`Rdata::read`] for details.
    pub fn read_two_names(
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Box<Rdata>, ReadRdataError> {
        let buf = helpers::prepare_to_read_rdata(message, cursor, rdlength)?;
        let (first, flen) = Name::try_from_compressed(buf, cursor)?;
        let (second, slen) = Name::try_from_compressed(buf, cursor + flen)?;
        if buf.len() - cursor != flen + slen {
            Err(ReadRdataError::Other)
        } else {
            let mut rdata = Vec::with_capacity(first.wire_repr().len() + second.wire_repr().len());
            rdata.extend_from_slice(first.wire_repr());
            rdata.extend_from_slice(second.wire_repr());
            Ok(rdata.try_into().unwrap())
        }
    }

    /// Determines whether this [`Rdata`] is equal to another, assuming
    /// that both consist of two domain names (MINFO, RP). See
    /// [`Rdata::equals`] for details.
    pub fn equals_as_two_names(&self, other: &Rdata) -> bool {
        if self.len() != other.len() {
            return false;
        }
        match helpers::test_n_name_fields(&self.octets, &other.octets, 2) {
            Some(Some(len)) if len == self.len() => true,
            Some(Some(_)) => self.octets == other.octets, // Invalid since there's extra data
            Some(None) => false,
            None => self.octets == other.octets,
        }
    }

    /// Returns the [`Component`]s of this [`Rdata`], assuming that it
    /// is of type MINFO.
    pub(super) fn components_as_minfo(&self) -> Components {
        static TYPES: &[ComponentType] = &[
            ComponentType::CompressibleName,
            ComponentType::CompressibleName,
        ];
        Components::from_types(TYPES, self.octets())
    }

    /// Presents this [`Rdata`] as two domain names (MINFO, RP).
    pub(super) fn present_as_two_names(&self) -> Option<String> {
        let (first, flen) = Name::try_from_uncompressed(&self.octets).ok()?;
        let second = Name::try_from_uncompressed_all(&self.octets[flen..]).ok()?;
        Some(format!("{} {}", first, second))
    }
}

////////////////////////////////////////////////////////////////////////
// PREFERENCE-AND-NAME RDATA (MX AND, LATER, AFSDB, RT, KX)           //
////////////////////////////////////////////////////////////////////////

/// Serializes RDATA consisting of a 16-bit field followed by a domain
/// name (MX, AFSDB, RT, KX) into the provided buffer.
pub fn serialize_u16_and_name(value: u16, name: &Name, buf: &mut Vec<u8>) {
    buf.reserve(2 + name.wire_repr().len());
    buf.extend_from_slice(&value.to_be_bytes());
    buf.extend_from_slice(name.wire_repr());
}

impl Rdata {
    /// Serializes an MX record into a new boxed [`Rdata`].
    pub fn new_mx(preference: u16, exchange: &Name) -> Box<Self> {
        let mut buf = Vec::with_capacity(2 + exchange.wire_repr().len());
        serialize_u16_and_name(preference, exchange, &mut buf);
        buf.try_into().unwrap()
    }

    /// Parses this [`Rdata`] as a 16-bit field followed by a domain
    /// name (the MX layout). Returns [`None`] if it is not valid.
    pub fn u16_and_name(&self) -> Option<(u16, Name)> {
        let value = u16::from_be_bytes(self.octets.get(0..2)?.try_into().unwrap());
        let name = Name::try_from_uncompressed_all(&self.octets[2..]).ok()?;
        Some((value, name))
    }

    /// Validates this [`Rdata`] for correctness, assuming that it
    /// consists of a 16-bit field followed by a domain name (MX, AFSDB,
    /// RT, KX).
    pub fn validate_as_u16_and_name(&self) -> Result<(), ReadRdataError> {
        if let Some(name_octets) = self.octets.get(2..) {
            Name::validate_uncompressed_all(name_octets).map_err(Into::into)
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Reads preference-and-name RDATA (MX, AFSDB, RT, KX) from a
    /// message. See [`Rdata::read`] for details.
    pub fn read_u16_and_name(
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Box<Rdata>, ReadRdataError> {
        let buf = helpers::prepare_to_read_rdata(message, cursor, rdlength)?;
        if buf.len() - cursor < 2 {
            Err(ReadRdataError::Other)
        } else {
            let (name, len) = Name::try_from_compressed(buf, cursor + 2)?;
            if buf.len() - cursor != len + 2 {
                Err(ReadRdataError::Other)
            } else {
                let mut rdata = Vec::with_capacity(2 + name.wire_repr().len());
                rdata.extend_from_slice(&buf[cursor..cursor + 2]);
                rdata.extend_from_slice(name.wire_repr());
                Ok(rdata.try_into().unwrap())
            }
        }
    }

    /// Determines whether this [`Rdata`] is equal to another, assuming
    /// that both consist of a 16-bit field followed by a domain name
    /// (MX, AFSDB, RT, KX). See [`Rdata::equals`] for details.
    pub fn equals_as_u16_and_name(&self, other: &Rdata) -> bool {
        if self.len() != other.len() {
            false
        } else if self.len() > 2 {
            // Note that if names_equal falls back to bitwise comparison,
            // then we did a bitwise comparison of the whole thing, so we
            // still did what we said we would!
            self.octets[0..2] == other.octets[0..2]
                && helpers::names_equal(&self.octets[2..], &other.octets[2..])
        } else {
            // Invalid records; do a bitwise comparison.
            self.octets == other.octets
        }
    }

    /// Returns the [`Component`]s of this [`Rdata`], assuming that it
    /// is of type MX.
    pub(super) fn components_as_mx(&self) -> Components {
        static TYPES: &[ComponentType] = &[
            ComponentType::FixedLen(2),
            ComponentType::CompressibleName,
        ];
        Components::from_types(TYPES, self.octets())
    }

    /// Returns the [`Component`]s of this [`Rdata`], assuming that it
    /// consists of a 16-bit field followed by a domain name that must
    /// not be compressed (AFSDB, RT, KX).
    pub(super) fn components_as_u16_and_uncompressed_name(&self) -> Components {
        static TYPES: &[ComponentType] = &[
            ComponentType::FixedLen(2),
            ComponentType::UncompressibleName,
        ];
        Components::from_types(TYPES, self.octets())
    }

    /// Presents this [`Rdata`] as a 16-bit field followed by a domain
    /// name (MX, AFSDB, RT, KX).
    pub(super) fn present_as_u16_and_name(&self) -> Option<String> {
        let (value, name) = self.u16_and_name()?;
        Some(format!("{} {}", value, name))
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1035 § 3.3.14 - TXT RDATA                                      //
////////////////////////////////////////////////////////////////////////

/// A helper to serialize DNS TXT records.
///
/// [RFC 1035 § 3.3.14] defines the TXT RDATA format as one or more
/// `<character-string>`s (see [`CharacterString`]). This helper allows
/// one to serialize a TXT RDATA by inputting `<character-string>`s
/// one by one using the [`TxtBuilder::try_push`] method. The
/// `<character-string>`s are written out to the buffer provided to
/// [`TxtBuilder::new`] when the `TxtBuilder` is constructed. The
/// `TxtBuilder` keeps track of the number of octets written, and
/// [`TxtBuilder::try_push`] will fail if the written length would
/// exceed the 65,535-octet limit for DNS RDATA. When all
/// `<character-string>`s are written, no finalization is necessary.
///
/// [RFC 1035 § 3.3.14]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.14
pub struct TxtBuilder<'a> {
    buf: &'a mut Vec<u8>,
    octets_written: usize,
}

impl<'a> TxtBuilder<'a> {
    /// Constructs a new `TxtBuilder` that will serialize
    /// `<character-string>`s into the provided buffer.
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        Self {
            buf,
            octets_written: 0,
        }
    }

    /// Attempts to serialize an additional `<character-string>` into
    /// the underlying buffer. If this would exceed the maximum RDATA
    /// length of 65,535 octets, then this will fail.
    pub fn try_push(
        &mut self,
        character_string: &CharacterString,
    ) -> Result<(), RdataTooLongError> {
        if self.octets_written + character_string.len() + 1 > (u16::MAX as usize) {
            Err(RdataTooLongError)
        } else {
            self.buf.reserve(1 + character_string.len());
            self.buf.push(character_string.len() as u8);
            self.buf.extend_from_slice(character_string.octets());
            self.octets_written += character_string.len() + 1;
            Ok(())
        }
    }
}

impl Rdata {
    /// Serializes a TXT record from the given `<character-string>`s
    /// into a new boxed [`Rdata`].
    pub fn new_txt<'a, I>(strings: I) -> Result<Box<Self>, RdataTooLongError>
    where
        I: IntoIterator<Item = &'a CharacterString>,
    {
        let mut buf = Vec::new();
        let mut builder = TxtBuilder::new(&mut buf);
        for string in strings {
            builder.try_push(string)?;
        }
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type TXT (or SPF, which shares the format).
    pub fn validate_as_txt(&self) -> Result<(), ReadRdataError> {
        if self.is_empty() {
            // Per RFC 1035 § 3.3.14, a TXT record must have at least one
            // <character-string>.
            return Err(ReadRdataError::Other);
        }

        // NOTE: since validate_character_string() will not return a zero
        // length, this loop will eventually end.
        let mut offset = 0;
        while offset < self.len() {
            offset += validate_character_string(&self.octets[offset..])?;
        }
        Ok(())
    }

    /// Returns the `<character-string>`s of this [`Rdata`], assuming
    /// that it is of type TXT (or SPF). Returns [`None`] if the RDATA
    /// is not a valid string sequence.
    pub fn txt_strings(&self) -> Option<Vec<&CharacterString>> {
        self.validate_as_txt().ok()?;
        Some(character_strings(&self.octets).collect())
    }

    /// Presents this [`Rdata`] as a TXT (or SPF) record.
    pub(super) fn present_as_txt(&self) -> Option<String> {
        let strings = self.txt_strings()?;
        Some(
            strings
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
