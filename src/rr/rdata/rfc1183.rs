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

//! Handling of the experimental RR types of [RFC 1183]: RP, AFSDB,
//! X25, ISDN, and RT.
//!
//! RP shares the two-name layout of MINFO, and AFSDB and RT share the
//! preference-and-name layout of MX; the shared codecs live in the
//! `std13` module. What remains here are the constructors and the
//! string-based X25 and ISDN types.
//!
//! [RFC 1183]: https://datatracker.ietf.org/doc/html/rfc1183

use super::std13::{
    serialize_two_names, serialize_u16_and_name, validate_character_string, CharacterString,
};
use super::{Components, ComponentType, Rdata, ReadRdataError};
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 2.2 - RP RDATA                                          //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes an RP record into a new boxed [`Rdata`].
    pub fn new_rp(mbox: &Name, txt: &Name) -> Box<Self> {
        let mut buf = Vec::with_capacity(mbox.wire_repr().len() + txt.wire_repr().len());
        serialize_two_names(mbox, txt, &mut buf);
        buf.try_into().unwrap()
    }

    /// Returns the [`Component`](super::Component)s of this [`Rdata`],
    /// assuming that it is of type RP. RP postdates RFC 1035, so its
    /// names are never compressed on output.
    pub(super) fn components_as_rp(&self) -> Components {
        static TYPES: &[ComponentType] = &[
            ComponentType::UncompressibleName,
            ComponentType::UncompressibleName,
        ];
        Components::from_types(TYPES, self.octets())
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 1 - AFSDB RDATA                                         //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes an AFSDB record into a new boxed [`Rdata`].
    pub fn new_afsdb(subtype: u16, hostname: &Name) -> Box<Self> {
        let mut buf = Vec::with_capacity(2 + hostname.wire_repr().len());
        serialize_u16_and_name(subtype, hostname, &mut buf);
        buf.try_into().unwrap()
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 3.1 - X25 RDATA                                         //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes an X25 record into a new boxed [`Rdata`].
    pub fn new_x25(psdn_address: &CharacterString) -> Box<Self> {
        let mut buf = Vec::with_capacity(1 + psdn_address.len());
        buf.push(psdn_address.len() as u8);
        buf.extend_from_slice(psdn_address.octets());
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type X25.
    pub fn validate_as_x25(&self) -> Result<(), ReadRdataError> {
        let len = validate_character_string(&self.octets)?;
        if self.len() == len {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as an X25 record.
    pub(super) fn present_as_x25(&self) -> Option<String> {
        self.validate_as_x25().ok()?;
        let string = <&CharacterString>::try_from(&self.octets()[1..]).unwrap();
        Some(string.to_string())
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 3.2 - ISDN RDATA                                        //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes an ISDN record into a new boxed [`Rdata`]. The
    /// subaddress is optional.
    pub fn new_isdn(address: &CharacterString, sa: Option<&CharacterString>) -> Box<Self> {
        let mut buf = Vec::with_capacity(2 + address.len() + sa.map_or(0, CharacterString::len));
        buf.push(address.len() as u8);
        buf.extend_from_slice(address.octets());
        if let Some(sa) = sa {
            buf.push(sa.len() as u8);
            buf.extend_from_slice(sa.octets());
        }
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type ISDN.
    pub fn validate_as_isdn(&self) -> Result<(), ReadRdataError> {
        let address_len = validate_character_string(&self.octets)?;
        if self.len() == address_len {
            return Ok(());
        }
        let sa_len = validate_character_string(&self.octets[address_len..])?;
        if self.len() == address_len + sa_len {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as an ISDN record.
    pub(super) fn present_as_isdn(&self) -> Option<String> {
        self.validate_as_isdn().ok()?;
        let address_len = validate_character_string(&self.octets).ok()?;
        let address = <&CharacterString>::try_from(&self.octets()[1..address_len]).unwrap();
        if address_len == self.len() {
            Some(address.to_string())
        } else {
            let sa = <&CharacterString>::try_from(&self.octets()[address_len + 1..]).unwrap();
            Some(format!("{} {}", address, sa))
        }
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 1183 § 3.3 - RT RDATA                                          //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes an RT record into a new boxed [`Rdata`].
    pub fn new_rt(preference: u16, intermediate_host: &Name) -> Box<Self> {
        let mut buf = Vec::with_capacity(2 + intermediate_host.wire_repr().len());
        serialize_u16_and_name(preference, intermediate_host, &mut buf);
        buf.try_into().unwrap()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rp_validation_and_presentation_work() {
        let mbox: Name = "admin.example.test.".parse().unwrap();
        let txt: Name = "contact.example.test.".parse().unwrap();
        let rdata = Rdata::new_rp(&mbox, &txt);
        rdata.validate_as_two_names().unwrap();
        assert_eq!(
            rdata.present_as_two_names().unwrap(),
            "admin.example.test. contact.example.test."
        );
    }

    #[test]
    fn x25_validation_and_presentation_work() {
        let address: &CharacterString = b"311061700956".try_into().unwrap();
        let rdata = Rdata::new_x25(address);
        rdata.validate_as_x25().unwrap();
        assert_eq!(rdata.present_as_x25().unwrap(), "\"311061700956\"");
    }

    #[test]
    fn isdn_accepts_one_or_two_strings() {
        let address: &CharacterString = b"150862028003217".try_into().unwrap();
        let sa: &CharacterString = b"004".try_into().unwrap();
        Rdata::new_isdn(address, None).validate_as_isdn().unwrap();
        let with_sa = Rdata::new_isdn(address, Some(sa));
        with_sa.validate_as_isdn().unwrap();
        assert_eq!(
            with_sa.present_as_isdn().unwrap(),
            "\"150862028003217\" \"004\""
        );
    }

    #[test]
    fn afsdb_uses_the_mx_layout() {
        let hostname: Name = "afs.example.test.".parse().unwrap();
        let rdata = Rdata::new_afsdb(1, &hostname);
        rdata.validate_as_u16_and_name().unwrap();
        let (subtype, name) = rdata.u16_and_name().unwrap();
        assert_eq!(subtype, 1);
        assert_eq!(name, hostname);
    }
}
