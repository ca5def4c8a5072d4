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

//! Handling of the AAAA RR type ([RFC 3596]).
//!
//! [RFC 3596]: https://datatracker.ietf.org/doc/html/rfc3596

use std::net::Ipv6Addr;

use super::{Rdata, ReadRdataError};

/// Serializes an AAAA record into the provided buffer.
pub fn serialize_aaaa(address: Ipv6Addr, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&address.octets())
}

impl Rdata {
    /// Serializes an AAAA record into a new boxed [`Rdata`].
    pub fn new_aaaa(address: Ipv6Addr) -> Box<Self> {
        let mut buf = Vec::with_capacity(16);
        serialize_aaaa(address, &mut buf);
        buf.try_into().unwrap()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type AAAA in class IN.
    pub fn validate_as_in_aaaa(&self) -> Result<(), ReadRdataError> {
        if self.len() == 16 {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Presents this [`Rdata`] as an IN AAAA record.
    pub(super) fn present_as_in_aaaa(&self) -> Option<String> {
        let octets: [u8; 16] = self.octets().try_into().ok()?;
        Some(Ipv6Addr::from(octets).to_string())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aaaa_round_trips() {
        let address: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let rdata = Rdata::new_aaaa(address);
        assert_eq!(rdata.len(), 16);
        rdata.validate_as_in_aaaa().unwrap();
        assert_eq!(rdata.present_as_in_aaaa().unwrap(), "2001:db8::1");
    }

    #[test]
    fn aaaa_validation_rejects_wrong_lengths() {
        let rdata: &Rdata = b"\x00\x01\x02\x03".try_into().unwrap();
        assert_eq!(rdata.validate_as_in_aaaa(), Err(ReadRdataError::Other));
    }
}
