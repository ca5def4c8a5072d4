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

//! Handling of assorted later RR types: LOC ([RFC 1876]), NAPTR
//! ([RFC 3403]), KX ([RFC 2230]), CERT ([RFC 4398]), DNAME
//! ([RFC 6672]), SSHFP ([RFC 4255]), DHCID ([RFC 4701]), TLSA
//! ([RFC 6698]), and APL ([RFC 3123]).
//!
//! [RFC 1876]: https://datatracker.ietf.org/doc/html/rfc1876
//! [RFC 3403]: https://datatracker.ietf.org/doc/html/rfc3403
//! [RFC 2230]: https://datatracker.ietf.org/doc/html/rfc2230
//! [RFC 4398]: https://datatracker.ietf.org/doc/html/rfc4398
//! [RFC 6672]: https://datatracker.ietf.org/doc/html/rfc6672
//! [RFC 4255]: https://datatracker.ietf.org/doc/html/rfc4255
//! [RFC 4701]: https://datatracker.ietf.org/doc/html/rfc4701
//! [RFC 6698]: https://datatracker.ietf.org/doc/html/rfc6698
//! [RFC 3123]: https://datatracker.ietf.org/doc/html/rfc3123

use data_encoding::{BASE64, HEXLOWER};

use super::helpers;
use super::std13::{serialize_u16_and_name, validate_character_string, CharacterString};
use super::{ComponentType, Components, Rdata, RdataTooLongError, ReadRdataError};
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// RFC 1876 - LOC RDATA                                               //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a (version 0) LOC record into a new boxed [`Rdata`].
    /// The size and precision fields use the RFC 1876 exponent
    /// encoding; the latitude, longitude, and altitude are raw wire
    /// values.
    #[allow(clippy::too_many_arguments)]
    pub fn new_loc(
        size: u8,
        horiz_pre: u8,
        vert_pre: u8,
        latitude: u32,
        longitude: u32,
        altitude: u32,
    ) -> Box<Self> {
        let mut buf = Vec::with_capacity(16);
        buf.push(0); // VERSION
        buf.push(size);
        buf.push(horiz_pre);
        buf.push(vert_pre);
        buf.extend_from_slice(&latitude.to_be_bytes());
        buf.extend_from_slice(&longitude.to_be_bytes());
        buf.extend_from_slice(&altitude.to_be_bytes());
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type LOC. Only version 0 has a defined format; RDATA with other
    /// version numbers is accepted as opaque per RFC 1876 § 2.
    pub fn validate_as_loc(&self) -> Result<(), ReadRdataError> {
        match self.octets.first() {
            Some(0) if self.len() == 16 => Ok(()),
            Some(0) => Err(ReadRdataError::Other),
            Some(_) => Ok(()),
            None => Err(ReadRdataError::Other),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 3403 - NAPTR RDATA                                             //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a NAPTR record into a new boxed [`Rdata`].
    pub fn new_naptr(
        order: u16,
        preference: u16,
        flags: &CharacterString,
        services: &CharacterString,
        regexp: &CharacterString,
        replacement: &Name,
    ) -> Box<Self> {
        let mut buf = Vec::with_capacity(
            7 + flags.len() + services.len() + regexp.len() + replacement.wire_repr().len(),
        );
        buf.extend_from_slice(&order.to_be_bytes());
        buf.extend_from_slice(&preference.to_be_bytes());
        for string in [flags, services, regexp] {
            buf.push(string.len() as u8);
            buf.extend_from_slice(string.octets());
        }
        buf.extend_from_slice(replacement.wire_repr());
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type NAPTR.
    pub fn validate_as_naptr(&self) -> Result<(), ReadRdataError> {
        if self.len() < 4 {
            return Err(ReadRdataError::Other);
        }
        let mut offset = 4;
        for _ in 0..3 {
            offset += validate_character_string(&self.octets[offset..])?;
        }
        Name::validate_uncompressed_all(&self.octets[offset..]).map_err(Into::into)
    }

    /// Reads NAPTR RDATA from a message. See [`Rdata::read`] for
    /// details.
    pub fn read_naptr(
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Box<Rdata>, ReadRdataError> {
        let buf = helpers::prepare_to_read_rdata(message, cursor, rdlength)?;
        if buf.len() - cursor < 4 {
            return Err(ReadRdataError::Other);
        }
        let mut offset = cursor + 4;
        for _ in 0..3 {
            offset += validate_character_string(&buf[offset..])?;
        }
        let (replacement, len) = Name::try_from_compressed(buf, offset)?;
        if buf.len() != offset + len {
            Err(ReadRdataError::Other)
        } else {
            let mut rdata = Vec::with_capacity(offset - cursor + replacement.wire_repr().len());
            rdata.extend_from_slice(&buf[cursor..offset]);
            rdata.extend_from_slice(replacement.wire_repr());
            Ok(rdata.try_into().unwrap())
        }
    }

    /// Returns the [`Component`](super::Component)s of this [`Rdata`],
    /// assuming that it is of type NAPTR. NAPTR postdates RFC 1035, so
    /// its replacement name is never compressed on output.
    pub(super) fn components_as_naptr(&self) -> Components {
        static TYPES: &[ComponentType] = &[
            ComponentType::FixedLen(4),
            ComponentType::CharacterString,
            ComponentType::CharacterString,
            ComponentType::CharacterString,
            ComponentType::UncompressibleName,
        ];
        Components::from_types(TYPES, self.octets())
    }

    /// Presents this [`Rdata`] as a NAPTR record.
    pub(super) fn present_as_naptr(&self) -> Option<String> {
        self.validate_as_naptr().ok()?;
        let order = u16::from_be_bytes(self.octets[0..2].try_into().unwrap());
        let preference = u16::from_be_bytes(self.octets[2..4].try_into().unwrap());
        let mut offset = 4;
        let mut strings = Vec::with_capacity(3);
        for _ in 0..3 {
            let wire_len = validate_character_string(&self.octets[offset..]).ok()?;
            let string =
                <&CharacterString>::try_from(&self.octets()[offset + 1..offset + wire_len])
                    .unwrap();
            strings.push(string.to_string());
            offset += wire_len;
        }
        let replacement = Name::try_from_uncompressed_all(&self.octets[offset..]).ok()?;
        Some(format!(
            "{} {} {} {} {} {}",
            order, preference, strings[0], strings[1], strings[2], replacement
        ))
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 2230 - KX RDATA                                                //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a KX record into a new boxed [`Rdata`].
    pub fn new_kx(preference: u16, exchanger: &Name) -> Box<Self> {
        let mut buf = Vec::with_capacity(2 + exchanger.wire_repr().len());
        serialize_u16_and_name(preference, exchanger, &mut buf);
        buf.try_into().unwrap()
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4398 - CERT RDATA                                              //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a CERT record into a new boxed [`Rdata`].
    pub fn new_cert(
        cert_type: u16,
        key_tag: u16,
        algorithm: u8,
        certificate: &[u8],
    ) -> Result<Box<Self>, RdataTooLongError> {
        let mut buf = Vec::with_capacity(5 + certificate.len());
        buf.extend_from_slice(&cert_type.to_be_bytes());
        buf.extend_from_slice(&key_tag.to_be_bytes());
        buf.push(algorithm);
        buf.extend_from_slice(certificate);
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type CERT.
    pub fn validate_as_cert(&self) -> Result<(), ReadRdataError> {
        if self.len() >= 5 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as a CERT record.
    pub(super) fn present_as_cert(&self) -> Option<String> {
        self.validate_as_cert().ok()?;
        let cert_type = u16::from_be_bytes(self.octets[0..2].try_into().unwrap());
        let key_tag = u16::from_be_bytes(self.octets[2..4].try_into().unwrap());
        Some(format!(
            "{} {} {} {}",
            cert_type,
            key_tag,
            self.octets[4],
            BASE64.encode(&self.octets[5..])
        ))
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 6672 - DNAME RDATA                                             //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a DNAME record into a new boxed [`Rdata`]. DNAME
    /// RDATA is a single domain name; by convention it is never
    /// compressed on output.
    pub fn new_dname(target: &Name) -> Box<Self> {
        Self::new_name(target)
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4255 - SSHFP RDATA                                             //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes an SSHFP record into a new boxed [`Rdata`].
    pub fn new_sshfp(
        algorithm: u8,
        fingerprint_type: u8,
        fingerprint: &[u8],
    ) -> Result<Box<Self>, RdataTooLongError> {
        let mut buf = Vec::with_capacity(2 + fingerprint.len());
        buf.push(algorithm);
        buf.push(fingerprint_type);
        buf.extend_from_slice(fingerprint);
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type SSHFP.
    pub fn validate_as_sshfp(&self) -> Result<(), ReadRdataError> {
        if self.len() >= 2 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as an SSHFP record.
    pub(super) fn present_as_sshfp(&self) -> Option<String> {
        self.validate_as_sshfp().ok()?;
        Some(format!(
            "{} {} {}",
            self.octets[0],
            self.octets[1],
            HEXLOWER.encode(&self.octets[2..])
        ))
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 4701 - DHCID RDATA                                             //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a DHCID record into a new boxed [`Rdata`]. The data
    /// is opaque at this layer.
    pub fn new_dhcid(data: &[u8]) -> Result<Box<Self>, RdataTooLongError> {
        data.to_vec().try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type DHCID. RFC 4701 § 3.1 requires the identifier type, digest
    /// type, and at least one digest octet.
    pub fn validate_as_dhcid(&self) -> Result<(), ReadRdataError> {
        if self.len() >= 4 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as a DHCID record.
    pub(super) fn present_as_dhcid(&self) -> Option<String> {
        self.validate_as_dhcid().ok()?;
        Some(BASE64.encode(&self.octets))
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 6698 - TLSA RDATA                                              //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a TLSA record into a new boxed [`Rdata`].
    pub fn new_tlsa(
        usage: u8,
        selector: u8,
        matching_type: u8,
        certificate_association: &[u8],
    ) -> Result<Box<Self>, RdataTooLongError> {
        let mut buf = Vec::with_capacity(3 + certificate_association.len());
        buf.push(usage);
        buf.push(selector);
        buf.push(matching_type);
        buf.extend_from_slice(certificate_association);
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type TLSA.
    pub fn validate_as_tlsa(&self) -> Result<(), ReadRdataError> {
        if self.len() >= 3 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as a TLSA record.
    pub(super) fn present_as_tlsa(&self) -> Option<String> {
        self.validate_as_tlsa().ok()?;
        Some(format!(
            "{} {} {} {}",
            self.octets[0],
            self.octets[1],
            self.octets[2],
            HEXLOWER.encode(&self.octets[3..])
        ))
    }
}

////////////////////////////////////////////////////////////////////////
// RFC 3123 - APL RDATA                                               //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type APL. The RDATA is a sequence of address-prefix items, each
    /// `(AFI, prefix, N|AFDLENGTH, AFDPART)`.
    pub fn validate_as_apl(&self) -> Result<(), ReadRdataError> {
        let mut offset = 0;
        while offset < self.len() {
            let item = self.octets.get(offset..offset + 4).ok_or(ReadRdataError::Other)?;
            let afdlength = (item[3] & 0x7f) as usize;
            offset += 4;
            if self.octets.len() < offset + afdlength {
                return Err(ReadRdataError::Other);
            }
            offset += afdlength;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
