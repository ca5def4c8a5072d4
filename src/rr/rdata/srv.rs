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

//! Handling of the SRV RR type ([RFC 2782]).
//!
//! [RFC 2782]: https://datatracker.ietf.org/doc/html/rfc2782

use super::helpers;
use super::{ComponentType, Components, Rdata, ReadRdataError};
use crate::name::Name;

/// Serializes an SRV record into the provided buffer.
pub fn serialize_srv(priority: u16, weight: u16, port: u16, target: &Name, buf: &mut Vec<u8>) {
    buf.reserve(6 + target.wire_repr().len());
    buf.extend_from_slice(&priority.to_be_bytes());
    buf.extend_from_slice(&weight.to_be_bytes());
    buf.extend_from_slice(&port.to_be_bytes());
    buf.extend_from_slice(target.wire_repr());
}

impl Rdata {
    /// Serializes an SRV record into a new boxed [`Rdata`].
    pub fn new_srv(priority: u16, weight: u16, port: u16, target: &Name) -> Box<Self> {
        let mut buf = Vec::with_capacity(6 + target.wire_repr().len());
        serialize_srv(priority, weight, port, target, &mut buf);
        buf.try_into().unwrap()
    }

    /// Parses this [`Rdata`] as SRV RDATA, returning the priority,
    /// weight, port, and target. Returns [`None`] if it is not valid.
    pub fn srv_fields(&self) -> Option<(u16, u16, u16, Name)> {
        let fixed = self.octets.get(0..6)?;
        let target = Name::try_from_uncompressed_all(&self.octets[6..]).ok()?;
        let field = |i: usize| u16::from_be_bytes(fixed[2 * i..2 * i + 2].try_into().unwrap());
        Some((field(0), field(1), field(2), target))
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type SRV in class IN.
    pub fn validate_as_in_srv(&self) -> Result<(), ReadRdataError> {
        if let Some(target_octets) = self.octets.get(6..) {
            Name::validate_uncompressed_all(target_octets).map_err(Into::into)
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Reads SRV RDATA from a message. See [`Rdata::read`] for details.
    pub fn read_in_srv(
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Box<Rdata>, ReadRdataError> {
        let buf = helpers::prepare_to_read_rdata(message, cursor, rdlength)?;
        if buf.len() - cursor < 6 {
            Err(ReadRdataError::Other)
        } else {
            let (target, len) = Name::try_from_compressed(buf, cursor + 6)?;
            if buf.len() - cursor != len + 6 {
                Err(ReadRdataError::Other)
            } else {
                let mut rdata = Vec::with_capacity(6 + target.wire_repr().len());
                rdata.extend_from_slice(&buf[cursor..cursor + 6]);
                rdata.extend_from_slice(target.wire_repr());
                Ok(rdata.try_into().unwrap())
            }
        }
    }

    /// Determines whether this [`Rdata`] is equal to another, assuming
    /// that both are of type SRV in class IN. See [`Rdata::equals`] for
    /// details.
    pub fn equals_as_in_srv(&self, other: &Rdata) -> bool {
        if self.len() != other.len() {
            false
        } else if self.len() > 6 {
            self.octets[0..6] == other.octets[0..6]
                && helpers::names_equal(&self.octets[6..], &other.octets[6..])
        } else {
            self.octets == other.octets
        }
    }

    /// Returns the [`Component`](super::Component)s of this [`Rdata`],
    /// assuming that it is of type SRV in class IN. SRV postdates RFC
    /// 1035, so its target is never compressed on output.
    pub(super) fn components_as_in_srv(&self) -> Components {
        static TYPES: &[ComponentType] = &[
            ComponentType::FixedLen(6),
            ComponentType::UncompressibleName,
        ];
        Components::from_types(TYPES, self.octets())
    }

    /// Presents this [`Rdata`] as an IN SRV record.
    pub(super) fn present_as_in_srv(&self) -> Option<String> {
        let (priority, weight, port, target) = self.srv_fields()?;
        Some(format!("{} {} {} {}", priority, weight, port, target))
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srv_round_trips() {
        let target: Name = "sip.example.test.".parse().unwrap();
        let rdata = Rdata::new_srv(10, 60, 5060, &target);
        rdata.validate_as_in_srv().unwrap();
        assert_eq!(rdata.srv_fields(), Some((10, 60, 5060, target)));
        assert_eq!(
            rdata.present_as_in_srv().unwrap(),
            "10 60 5060 sip.example.test."
        );
    }

    #[test]
    fn srv_targets_compare_case_insensitively() {
        let lower = Rdata::new_srv(1, 2, 3, &"target.test.".parse().unwrap());
        let upper = Rdata::new_srv(1, 2, 3, &"TARGET.TEST.".parse().unwrap());
        assert!(lower.equals_as_in_srv(&upper));
    }
}
