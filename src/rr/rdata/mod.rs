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

//! Implementation of the [`Rdata`] type and DNS RDATA processing.
//!
//! The RDATA of a record is kept in its (uncompressed) wire form; the
//! type-specific codecs in this module's submodules validate, read,
//! compare, and present it. Dispatch on the RR type happens in
//! [`Rdata::read`], [`Rdata::validate`], [`Rdata::equals`],
//! [`Rdata::components`], and [`Rdata::present`]; a type unknown to
//! the table is handled per [RFC 3597] (opaque octets, bitwise
//! comparison, `\#` presentation).
//!
//! [RFC 3597]: https://datatracker.ietf.org/doc/html/rfc3597

use std::borrow::Cow;
use std::fmt;

use data_encoding::HEXLOWER;

use super::Type;
use crate::class::Class;
use crate::name::{self, Name};

// Implementation helpers.
mod helpers;

// Implementations of RR types.
mod dnssec;
mod ipv6;
mod misc;
mod opt;
mod rfc1183;
mod srv;
mod std13;
mod tsig;
pub use dnssec::*;
pub use ipv6::*;
pub use misc::*;
pub use opt::*;
pub use rfc1183::*;
pub use srv::*;
pub use std13::*;
pub use tsig::*;

////////////////////////////////////////////////////////////////////////
// RDATA TYPE                                                         //
////////////////////////////////////////////////////////////////////////

/// A type for record RDATA.
///
/// The RDATA of a record is limited to 65,535 octets. The `Rdata` type
/// is a wrapper over `[u8]` that can only be constructed if the
/// underlying data has a valid length.
#[repr(transparent)]
pub struct Rdata {
    octets: [u8],
}

impl Rdata {
    /// Converts a `&[u8]` to a `&Rdata`, without checking the length;
    /// for internal use only.
    pub(crate) fn from_unchecked(octets: &[u8]) -> &Self {
        unsafe { &*(octets as *const [u8] as *const Self) }
    }

    /// Returns an empty `&Rdata`.
    pub fn empty() -> &'static Self {
        Self::from_unchecked(&[])
    }

    /// Determines whether this [`Rdata`] is equal to another, assuming
    /// that they are both of type `rr_type` in class `class`.
    ///
    /// [RFC 3597 § 6] specifies that RRs of unknown type are equal when
    /// their RDATA is bitwise equal, and that new RR types should not
    /// have type-specific comparison rules. This means that embedded
    /// domain names are henceforth compared in a case-sensitive manner!
    /// Therefore, only types that (1) predate the RFC and (2) embed
    /// domain names need to have special comparison logic. This method
    /// carries out the special comparison logic for these types, and
    /// performs bitwise comparison otherwise.
    ///
    /// If, in the process of comparing domain names case-insensitively,
    /// one of the [`Rdata`]s is found to be invalid, this falls back to
    /// a bitwise comparison of the entire [`Rdata`]s.
    ///
    /// [RFC 3597 § 6]: https://datatracker.ietf.org/doc/html/rfc3597#section-6
    pub fn equals(&self, other: &Self, class: Class, rr_type: Type) -> bool {
        match rr_type {
            Type::NS
            | Type::MD
            | Type::MF
            | Type::CNAME
            | Type::MB
            | Type::MG
            | Type::MR
            | Type::PTR => helpers::names_equal(&self.octets, &other.octets),
            Type::A if class == Class::CH => self.equals_as_ch_a(other),
            Type::SOA => self.equals_as_soa(other),
            Type::MINFO | Type::RP => self.equals_as_two_names(other),
            Type::MX | Type::AFSDB | Type::RT | Type::KX => self.equals_as_u16_and_name(other),
            Type::SRV if class == Class::IN => self.equals_as_in_srv(other),
            _ => self.octets == other.octets,
        }
    }

    /// Validates an [`Rdata`] for correctness, assuming that it is of
    /// type `rr_type` in class `class`. If the class/type combination
    /// is unknown, then this is a successful no-op.
    pub fn validate(&self, class: Class, rr_type: Type) -> Result<(), ReadRdataError> {
        match rr_type {
            Type::NS
            | Type::MD
            | Type::MF
            | Type::CNAME
            | Type::MB
            | Type::MG
            | Type::MR
            | Type::PTR
            | Type::DNAME => helpers::validate_name(&self.octets),
            Type::A if class == Class::IN => self.validate_as_in_a(),
            Type::A if class == Class::CH => self.validate_as_ch_a(),
            Type::SOA => self.validate_as_soa(),
            // For NULL, there is nothing to do!
            Type::WKS if class == Class::IN => self.validate_as_in_wks(),
            Type::HINFO => self.validate_as_hinfo(),
            Type::MINFO | Type::RP => self.validate_as_two_names(),
            Type::MX | Type::AFSDB | Type::RT | Type::KX => self.validate_as_u16_and_name(),
            Type::TXT | Type::SPF => self.validate_as_txt(),
            Type::X25 => self.validate_as_x25(),
            Type::ISDN => self.validate_as_isdn(),
            Type::AAAA if class == Class::IN => self.validate_as_in_aaaa(),
            Type::LOC => self.validate_as_loc(),
            Type::SRV if class == Class::IN => self.validate_as_in_srv(),
            Type::NAPTR => self.validate_as_naptr(),
            Type::CERT => self.validate_as_cert(),
            Type::APL => self.validate_as_apl(),
            Type::DS => self.validate_as_ds(),
            Type::SSHFP => self.validate_as_sshfp(),
            Type::RRSIG | Type::SIG => self.validate_as_rrsig(),
            Type::NSEC => self.validate_as_nsec(),
            Type::DNSKEY => self.validate_as_dnskey(),
            Type::DHCID => self.validate_as_dhcid(),
            Type::NSEC3 => self.validate_as_nsec3(),
            Type::NSEC3PARAM => self.validate_as_nsec3param(),
            Type::TLSA => self.validate_as_tlsa(),
            Type::OPT => self.validate_as_opt(),
            Type::TKEY => self.validate_as_tkey(),
            Type::TSIG => self.validate_as_tsig(),
            _ => Ok(()),
        }
    }

    /// Reads RDATA from a message, validating it while also
    /// decompressing any embedded domain names, if compressed domain
    /// names are allowed for the RR type.
    ///
    /// RDATA of type `rr_type` in class `class` and of length
    /// `rdlength` is read starting from `&message[cursor]`. The
    /// behavior is as follows:
    ///
    /// * For recognized RR types that may contain embedded compressed
    ///   domain names, any such domain names are decompressed and the
    ///   RDATA is checked for overall validity. A new buffer for the
    ///   uncompressed RDATA is allocated.
    /// * For recognized RR types that do not contain embedded
    ///   compressed domain names, only validation is performed. A
    ///   reference to the existing buffer is returned.
    /// * For unrecognized RR types, no validation is performed and a
    ///   reference to the existing buffer is returned.
    ///
    /// Per [RFC 3597 § 4], only RDATA of types defined by [RFC 1035]
    /// may contain compressed names, and several more are subject
    /// to decompression on the receiving end to maintain compatibility
    /// with older software (the RP, AFSDB, RT, SIG, NAPTR, SRV, and KX
    /// set, to which this implementation adds DNAME).
    ///
    /// If the remaining part of the message is not `rdlength` long,
    /// this function will fail with [`ReadRdataError::UnexpectedEom`],
    /// rather than panic. Thus it's okay to call this without
    /// validating `rdlength` first.
    ///
    /// [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035
    /// [RFC 3597 § 4]: https://datatracker.ietf.org/doc/html/rfc3597#section-4
    pub fn read(
        class: Class,
        rr_type: Type,
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Cow<Self>, ReadRdataError> {
        type Reader = fn(&[u8], usize, u16) -> Result<Box<Rdata>, ReadRdataError>;
        type Validator = fn(&Rdata) -> Result<(), ReadRdataError>;
        let with_decompression = |reader: Reader| reader(message, cursor, rdlength).map(Cow::Owned);
        let without_decompression = |validator: Validator| {
            helpers::prepare_to_read_rdata(message, cursor, rdlength).and_then(|buf| {
                let rdata = (&buf[cursor..]).try_into().unwrap();
                validator(rdata).and(Ok(Cow::Borrowed(rdata)))
            })
        };

        match rr_type {
            Type::NS
            | Type::MD
            | Type::MF
            | Type::CNAME
            | Type::MB
            | Type::MG
            | Type::MR
            | Type::PTR
            | Type::DNAME => with_decompression(helpers::read_name_rdata),
            Type::A if class == Class::IN => without_decompression(Self::validate_as_in_a),
            Type::A if class == Class::CH => with_decompression(Self::read_ch_a),
            Type::SOA => with_decompression(Self::read_soa),
            // For NULL, there is no validation to do!
            Type::WKS if class == Class::IN => without_decompression(Self::validate_as_in_wks),
            Type::HINFO => without_decompression(Self::validate_as_hinfo),
            Type::MINFO | Type::RP => with_decompression(Self::read_two_names),
            Type::MX | Type::AFSDB | Type::RT | Type::KX => {
                with_decompression(Self::read_u16_and_name)
            }
            Type::TXT | Type::SPF => without_decompression(Self::validate_as_txt),
            Type::X25 => without_decompression(Self::validate_as_x25),
            Type::ISDN => without_decompression(Self::validate_as_isdn),
            Type::AAAA if class == Class::IN => without_decompression(Self::validate_as_in_aaaa),
            Type::LOC => without_decompression(Self::validate_as_loc),
            Type::SRV if class == Class::IN => with_decompression(Self::read_in_srv),
            Type::NAPTR => with_decompression(Self::read_naptr),
            Type::CERT => without_decompression(Self::validate_as_cert),
            Type::APL => without_decompression(Self::validate_as_apl),
            Type::DS => without_decompression(Self::validate_as_ds),
            Type::SSHFP => without_decompression(Self::validate_as_sshfp),
            Type::RRSIG | Type::SIG => with_decompression(Self::read_rrsig),
            Type::NSEC => without_decompression(Self::validate_as_nsec),
            Type::DNSKEY => without_decompression(Self::validate_as_dnskey),
            Type::DHCID => without_decompression(Self::validate_as_dhcid),
            Type::NSEC3 => without_decompression(Self::validate_as_nsec3),
            Type::NSEC3PARAM => without_decompression(Self::validate_as_nsec3param),
            Type::TLSA => without_decompression(Self::validate_as_tlsa),
            Type::OPT => without_decompression(Self::validate_as_opt),
            Type::TKEY => without_decompression(Self::validate_as_tkey),
            Type::TSIG => without_decompression(Self::validate_as_tsig),
            _ => without_decompression(|_| Ok(())),
        }
    }

    /// Returns an iterator over this `Rdata`'s [`Component`]s, assuming
    /// that it is of type `rr_type` in class `class`.
    pub fn components(&self, class: Class, rr_type: Type) -> Components {
        match rr_type {
            Type::NS
            | Type::MD
            | Type::MF
            | Type::CNAME
            | Type::MB
            | Type::MG
            | Type::MR
            | Type::PTR => Components::for_single_compressible_name(self.octets()),
            Type::A if class == Class::CH => self.components_as_ch_a(),
            Type::SOA => self.components_as_soa(),
            Type::MINFO => self.components_as_minfo(),
            Type::RP => self.components_as_rp(),
            Type::MX => self.components_as_mx(),
            Type::AFSDB | Type::RT | Type::KX => self.components_as_u16_and_uncompressed_name(),
            Type::SRV if class == Class::IN => self.components_as_in_srv(),
            Type::NAPTR => self.components_as_naptr(),
            Type::DNAME => Components::for_single_uncompressible_name(self.octets()),
            Type::RRSIG | Type::SIG => self.components_as_rrsig(),
            Type::NSEC => self.components_as_nsec(),
            _ => Components::for_nameless(self.octets()),
        }
    }

    /// Renders this `Rdata` in presentation (master-file) format,
    /// assuming that it is of type `rr_type` in class `class`. RR types
    /// without a type-specific presentation (and invalid RDATA of types
    /// that have one) are rendered in the [RFC 3597 § 5] unknown-type
    /// format.
    ///
    /// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
    pub fn present(&self, class: Class, rr_type: Type) -> String {
        let type_specific = match rr_type {
            Type::NS
            | Type::MD
            | Type::MF
            | Type::CNAME
            | Type::MB
            | Type::MG
            | Type::MR
            | Type::PTR
            | Type::DNAME => self.present_as_name(),
            Type::A if class == Class::IN => self.present_as_in_a(),
            Type::SOA => self.present_as_soa(),
            Type::HINFO => self.present_as_hinfo(),
            Type::MINFO | Type::RP => self.present_as_two_names(),
            Type::MX | Type::AFSDB | Type::RT | Type::KX => self.present_as_u16_and_name(),
            Type::TXT | Type::SPF => self.present_as_txt(),
            Type::X25 => self.present_as_x25(),
            Type::ISDN => self.present_as_isdn(),
            Type::AAAA if class == Class::IN => self.present_as_in_aaaa(),
            Type::SRV if class == Class::IN => self.present_as_in_srv(),
            Type::NAPTR => self.present_as_naptr(),
            Type::CERT => self.present_as_cert(),
            Type::DS => self.present_as_ds(),
            Type::SSHFP => self.present_as_sshfp(),
            Type::RRSIG | Type::SIG => self.present_as_rrsig(),
            Type::NSEC => self.present_as_nsec(),
            Type::DNSKEY => self.present_as_dnskey(),
            Type::DHCID => self.present_as_dhcid(),
            Type::NSEC3 => self.present_as_nsec3(),
            Type::NSEC3PARAM => self.present_as_nsec3param(),
            Type::TLSA => self.present_as_tlsa(),
            _ => None,
        };
        type_specific.unwrap_or_else(|| self.to_string())
    }

    /// Returns whether the [`Rdata`] is empty.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the length of the [`Rdata`].
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns the underlying octet slice.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }
}

impl<'a> TryFrom<&'a [u8]> for &'a Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: &'a [u8]) -> Result<Self, Self::Error> {
        if octets.len() > (u16::MAX as usize) {
            Err(RdataTooLongError)
        } else {
            Ok(Rdata::from_unchecked(octets))
        }
    }
}

impl<'a, const N: usize> TryFrom<&'a [u8; N]> for &'a Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: &'a [u8; N]) -> Result<Self, Self::Error> {
        octets[..].try_into()
    }
}

impl AsRef<[u8]> for Rdata {
    fn as_ref(&self) -> &[u8] {
        &self.octets
    }
}

impl std::ops::Deref for Rdata {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.octets
    }
}

impl ToOwned for Rdata {
    type Owned = Box<Self>;

    fn to_owned(&self) -> Self::Owned {
        let boxed_octets: Box<[u8]> = self.octets.into();
        unsafe { Box::from_raw(Box::into_raw(boxed_octets) as *mut Rdata) }
    }
}

impl Clone for Box<Rdata> {
    fn clone(&self) -> Self {
        self.as_ref().to_owned()
    }
}

impl PartialEq for Rdata {
    fn eq(&self, other: &Self) -> bool {
        self.octets == other.octets
    }
}

impl Eq for Rdata {}

impl TryFrom<Vec<u8>> for Box<Rdata> {
    type Error = RdataTooLongError;

    fn try_from(vec: Vec<u8>) -> Result<Self, Self::Error> {
        if vec.len() > (u16::MAX as usize) {
            Err(RdataTooLongError)
        } else {
            let boxed_octets: Box<[u8]> = vec.into_boxed_slice();
            unsafe { Ok(Box::from_raw(Box::into_raw(boxed_octets) as *mut Rdata)) }
        }
    }
}

impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // We output using the RFC 3597 format for RDATA of unknown
        // type.
        write!(f, "\\# {}", self.len())?;
        if !self.is_empty() {
            write!(f, " {}", HEXLOWER.encode(&self.octets))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

////////////////////////////////////////////////////////////////////////
// COMPONENTS                                                         //
////////////////////////////////////////////////////////////////////////

/// A component of an [`Rdata`] classified for DNS compression.
///
/// For DNS compression, it is useful to break RDATA into three types of
/// components:
///
/// 1. embedded domain names that may be compressed per [RFC 3597 § 4],
/// 2. embedded domain names that may *not* be compressed per
///    [RFC 3597 § 4], and
/// 3. all other data.
///
/// The [`Components`] iterator, produced by [`Rdata::components`], can
/// be used to iterate the [`Component`]s of an [`Rdata`].
///
/// [RFC 3597 § 4]: https://datatracker.ietf.org/doc/html/rfc3597#section-4
pub enum Component<'a> {
    CompressibleName(Name),
    UncompressibleName(Name),
    Other(&'a [u8]),
}

/// Specifies (for [`Components::next`]) how to parse the next
/// [`Component`] of an [`Rdata`].
#[derive(Copy, Clone, Debug)]
enum ComponentType {
    CompressibleName,
    UncompressibleName,
    FixedLen(usize),
    CharacterString,
}

/// An iterator over the [`Component`]s of an [`Rdata`]. See
/// [`Rdata::components`].
pub struct Components<'a> {
    types: &'static [ComponentType],
    rdata: &'a [u8],
}

impl<'a> Components<'a> {
    /// Creates a `Components` iterator for RDATA that is a single,
    /// compressible domain name (e.g. CNAME or NS RDATA).
    fn for_single_compressible_name(rdata: &'a [u8]) -> Self {
        Self {
            types: &[ComponentType::CompressibleName],
            rdata,
        }
    }

    /// Creates a `Components` iterator for RDATA that is a single
    /// domain name that must not be compressed (e.g. DNAME RDATA).
    fn for_single_uncompressible_name(rdata: &'a [u8]) -> Self {
        Self {
            types: &[ComponentType::UncompressibleName],
            rdata,
        }
    }

    /// Creates a `Components` iterator for RDATA that does not embed
    /// any domain names.
    fn for_nameless(rdata: &'a [u8]) -> Self {
        Self { types: &[], rdata }
    }

    /// Creates a `Components` iterator from an explicit component-type
    /// list. For use by the sibling type-implementation modules.
    fn from_types(types: &'static [ComponentType], rdata: &'a [u8]) -> Self {
        Self { types, rdata }
    }
}

impl<'a> Iterator for Components<'a> {
    type Item = Result<Component<'a>, ReadRdataError>;

    fn next(&mut self) -> Option<Result<Component<'a>, ReadRdataError>> {
        if let Some((next_type, remaining_types)) = self.types.split_first() {
            let (component, remaining_rdata) = match *next_type {
                ComponentType::CompressibleName => match build_name_component(self.rdata, true) {
                    Ok(res) => res,
                    Err(e) => {
                        self.types = &[];
                        self.rdata = &[];
                        return Some(Err(e));
                    }
                },
                ComponentType::UncompressibleName => {
                    match build_name_component(self.rdata, false) {
                        Ok(res) => res,
                        Err(e) => {
                            self.types = &[];
                            self.rdata = &[];
                            return Some(Err(e));
                        }
                    }
                }
                ComponentType::FixedLen(len) => {
                    if self.rdata.len() < len {
                        self.types = &[];
                        self.rdata = &[];
                        return Some(Err(ReadRdataError::Other));
                    }
                    let (component_octets, remaining) = self.rdata.split_at(len);
                    (Component::Other(component_octets), remaining)
                }
                ComponentType::CharacterString => match self.rdata.first() {
                    Some(&len) if self.rdata.len() > len as usize => {
                        let (component_octets, remaining) = self.rdata.split_at(len as usize + 1);
                        (Component::Other(component_octets), remaining)
                    }
                    _ => {
                        self.types = &[];
                        self.rdata = &[];
                        return Some(Err(ReadRdataError::Other));
                    }
                },
            };
            self.types = remaining_types;
            self.rdata = remaining_rdata;
            Some(Ok(component))
        } else if !self.rdata.is_empty() {
            let component = Component::Other(self.rdata);
            self.rdata = &[];
            Some(Ok(component))
        } else {
            None
        }
    }
}

/// Parses a domain name at the start of `rdata` and wraps it in the
/// appropriate name [`Component`].
fn build_name_component(
    rdata: &[u8],
    compressible: bool,
) -> Result<(Component, &[u8]), ReadRdataError> {
    let (name, len) = Name::try_from_uncompressed(rdata)?;
    let component = if compressible {
        Component::CompressibleName(name)
    } else {
        Component::UncompressibleName(name)
    };
    Ok((component, &rdata[len..]))
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that RDATA could not be read from a message or
/// failed validation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReadRdataError {
    /// An embedded domain name was invalid.
    Name(name::Error),

    /// The message ended before `rdlength` octets of RDATA.
    UnexpectedEom,

    /// The RDATA is not valid for its RR type.
    Other,
}

impl From<name::Error> for ReadRdataError {
    fn from(err: name::Error) -> Self {
        Self::Name(err)
    }
}

impl fmt::Display for ReadRdataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Name(err) => write!(f, "invalid embedded name: {}", err),
            Self::UnexpectedEom => f.write_str("unexpected end of message in RDATA"),
            Self::Other => f.write_str("invalid RDATA"),
        }
    }
}

impl std::error::Error for ReadRdataError {}

/// An error signaling that a buffer cannot be converted into an
/// [`Rdata`] because it is too long.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct RdataTooLongError;

impl fmt::Display for RdataTooLongError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("RDATA is too long")
    }
}

impl std::error::Error for RdataTooLongError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdata_constructor_accepts_short_slices() {
        let quite_short = &[0, 1, 2, 3];
        let quite_short_rdata: &Rdata = quite_short.try_into().unwrap();
        assert_eq!(quite_short_rdata.octets(), quite_short);

        let almost_too_long = &[0; u16::MAX as usize];
        assert!(<&Rdata>::try_from(&almost_too_long[..]).is_ok());
    }

    #[test]
    fn rdata_constructor_rejects_long_slice() {
        let too_long = [0; u16::MAX as usize + 1];
        assert_eq!(<&Rdata>::try_from(&too_long[..]), Err(RdataTooLongError));
    }

    #[test]
    fn unknown_rdata_displays_in_rfc3597_format() {
        let rdata: &Rdata = b"\xc0\x00\x02\x01".try_into().unwrap();
        assert_eq!(rdata.to_string(), "\\# 4 c0000201");
        assert_eq!(Rdata::empty().to_string(), "\\# 0");
    }

    #[test]
    fn equals_compares_embedded_names_case_insensitively() {
        let lower: &Rdata = b"\x04host\x04test\x00".try_into().unwrap();
        let upper: &Rdata = b"\x04HOST\x04TEST\x00".try_into().unwrap();
        assert!(lower.equals(upper, Class::IN, Type::CNAME));
        // Unknown types compare bitwise.
        assert!(!lower.equals(upper, Class::IN, Type::from(0xff00)));
    }

    #[test]
    fn components_emit_trailing_data() {
        // NSEC RDATA: an uncompressible name followed by a bitmap.
        let rdata: &Rdata = b"\x04next\x04test\x00\x00\x01\x40".try_into().unwrap();
        let mut components = rdata.components(Class::IN, Type::NSEC);
        assert!(matches!(
            components.next(),
            Some(Ok(Component::UncompressibleName(_)))
        ));
        match components.next() {
            Some(Ok(Component::Other(octets))) => assert_eq!(octets, b"\x00\x01\x40"),
            _ => panic!("expected trailing data"),
        }
        assert!(components.next().is_none());
    }
}
