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

//! Handling of TSIG RDATA ([RFC 8945]) and TKEY RDATA ([RFC 2930]).
//!
//! The signing and verification logic lives in
//! [`message::tsig`](crate::message::tsig); this module provides the
//! RDATA serialization and field access that it builds on.
//!
//! [RFC 8945]: https://datatracker.ietf.org/doc/html/rfc8945
//! [RFC 2930]: https://datatracker.ietf.org/doc/html/rfc2930

use std::fmt;

use super::{Rdata, RdataTooLongError, ReadRdataError};
use crate::message::ExtendedRcode;
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// TIME SIGNED                                                        //
////////////////////////////////////////////////////////////////////////

/// The "time signed" field of a TSIG RR: a 48-bit count of seconds
/// since the Unix epoch.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct TimeSigned([u8; 6]);

impl TimeSigned {
    /// Constructs a `TimeSigned` from a Unix time. This fails if the
    /// time does not fit into 48 bits.
    pub fn try_from_unix_time(unix_time: u64) -> Result<Self, TimeSignedRangeError> {
        if unix_time >= 1 << 48 {
            Err(TimeSignedRangeError)
        } else {
            let octets = unix_time.to_be_bytes();
            Ok(Self(octets[2..8].try_into().unwrap()))
        }
    }

    /// Returns this `TimeSigned` as a Unix time.
    pub fn to_unix_time(self) -> u64 {
        let mut octets = [0; 8];
        octets[2..8].copy_from_slice(&self.0);
        u64::from_be_bytes(octets)
    }

    /// Returns the six octets of the wire form.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 6]> for TimeSigned {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Debug for TimeSigned {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_unix_time())
    }
}

/// An error signaling that a Unix time does not fit into the 48-bit
/// TSIG "time signed" field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeSignedRangeError;

impl fmt::Display for TimeSignedRangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("time does not fit into 48 bits")
    }
}

impl std::error::Error for TimeSignedRangeError {}

////////////////////////////////////////////////////////////////////////
// TSIG RDATA                                                         //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a TSIG record into a new boxed [`Rdata`].
    pub fn new_tsig(
        algorithm: &Name,
        time_signed: TimeSigned,
        fudge: u16,
        mac: &[u8],
        original_id: u16,
        error: ExtendedRcode,
        other: &[u8],
    ) -> Result<Box<Self>, RdataTooLongError> {
        if mac.len() > u16::MAX as usize || other.len() > u16::MAX as usize {
            return Err(RdataTooLongError);
        }
        let mut buf =
            Vec::with_capacity(algorithm.wire_repr().len() + 16 + mac.len() + other.len());
        buf.extend_from_slice(algorithm.wire_repr());
        buf.extend_from_slice(time_signed.as_slice());
        buf.extend_from_slice(&fudge.to_be_bytes());
        buf.extend_from_slice(&(mac.len() as u16).to_be_bytes());
        buf.extend_from_slice(mac);
        buf.extend_from_slice(&original_id.to_be_bytes());
        buf.extend_from_slice(&u16::from(error).to_be_bytes());
        buf.extend_from_slice(&(other.len() as u16).to_be_bytes());
        buf.extend_from_slice(other);
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type TSIG.
    pub fn validate_as_tsig(&self) -> Result<(), ReadRdataError> {
        let algorithm_len = Name::validate_uncompressed(&self.octets)?;
        let fixed = self
            .octets
            .get(algorithm_len..algorithm_len + 10)
            .ok_or(ReadRdataError::Other)?;
        let mac_size = u16::from_be_bytes(fixed[8..10].try_into().unwrap()) as usize;
        let after_mac = algorithm_len + 10 + mac_size;
        let tail = self
            .octets
            .get(after_mac..after_mac + 6)
            .ok_or(ReadRdataError::Other)?;
        let other_len = u16::from_be_bytes(tail[4..6].try_into().unwrap()) as usize;
        if self.len() == after_mac + 6 + other_len {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }

    /// Returns the algorithm name of this [`Rdata`], assuming that it
    /// is valid TSIG RDATA.
    pub fn tsig_algorithm(&self) -> Option<Name> {
        Name::try_from_uncompressed(&self.octets)
            .ok()
            .map(|(name, _)| name)
    }

    /// Returns the time-signed field of this [`Rdata`], assuming that
    /// it is valid TSIG RDATA.
    pub fn tsig_time_signed(&self) -> Option<TimeSigned> {
        let algorithm_len = Name::validate_uncompressed(&self.octets).ok()?;
        let octets: [u8; 6] = self
            .octets
            .get(algorithm_len..algorithm_len + 6)?
            .try_into()
            .unwrap();
        Some(TimeSigned::from(octets))
    }

    /// Returns the fudge field of this [`Rdata`], assuming that it is
    /// valid TSIG RDATA.
    pub fn tsig_fudge(&self) -> Option<u16> {
        let algorithm_len = Name::validate_uncompressed(&self.octets).ok()?;
        let octets = self.octets.get(algorithm_len + 6..algorithm_len + 8)?;
        Some(u16::from_be_bytes(octets.try_into().unwrap()))
    }

    /// Returns the MAC field of this [`Rdata`], assuming that it is
    /// valid TSIG RDATA.
    pub fn tsig_mac(&self) -> Option<&[u8]> {
        let algorithm_len = Name::validate_uncompressed(&self.octets).ok()?;
        let mac_size = u16::from_be_bytes(
            self.octets
                .get(algorithm_len + 8..algorithm_len + 10)?
                .try_into()
                .unwrap(),
        ) as usize;
        self.octets
            .get(algorithm_len + 10..algorithm_len + 10 + mac_size)
    }

    /// Returns the original-ID field of this [`Rdata`], assuming that
    /// it is valid TSIG RDATA.
    pub fn tsig_original_id(&self) -> Option<u16> {
        let offset = self.tsig_after_mac_offset()?;
        let octets = self.octets.get(offset..offset + 2)?;
        Some(u16::from_be_bytes(octets.try_into().unwrap()))
    }

    /// Returns the error field of this [`Rdata`], assuming that it is
    /// valid TSIG RDATA.
    pub fn tsig_error(&self) -> Option<ExtendedRcode> {
        let offset = self.tsig_after_mac_offset()?;
        let octets = self.octets.get(offset + 2..offset + 4)?;
        Some(ExtendedRcode::from(u16::from_be_bytes(
            octets.try_into().unwrap(),
        )))
    }

    /// Returns the other-data field of this [`Rdata`], assuming that it
    /// is valid TSIG RDATA.
    pub fn tsig_other(&self) -> Option<&[u8]> {
        let offset = self.tsig_after_mac_offset()?;
        self.octets.get(offset + 6..)
    }

    /// Returns the offset of the original-ID field.
    fn tsig_after_mac_offset(&self) -> Option<usize> {
        let algorithm_len = Name::validate_uncompressed(&self.octets).ok()?;
        let mac_size = u16::from_be_bytes(
            self.octets
                .get(algorithm_len + 8..algorithm_len + 10)?
                .try_into()
                .unwrap(),
        ) as usize;
        Some(algorithm_len + 10 + mac_size)
    }
}

////////////////////////////////////////////////////////////////////////
// TKEY RDATA                                                         //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes a TKEY record into a new boxed [`Rdata`].
    #[allow(clippy::too_many_arguments)]
    pub fn new_tkey(
        algorithm: &Name,
        inception: u32,
        expiration: u32,
        mode: u16,
        error: ExtendedRcode,
        key: &[u8],
        other: &[u8],
    ) -> Result<Box<Self>, RdataTooLongError> {
        if key.len() > u16::MAX as usize || other.len() > u16::MAX as usize {
            return Err(RdataTooLongError);
        }
        let mut buf =
            Vec::with_capacity(algorithm.wire_repr().len() + 16 + key.len() + other.len());
        buf.extend_from_slice(algorithm.wire_repr());
        buf.extend_from_slice(&inception.to_be_bytes());
        buf.extend_from_slice(&expiration.to_be_bytes());
        buf.extend_from_slice(&mode.to_be_bytes());
        buf.extend_from_slice(&u16::from(error).to_be_bytes());
        buf.extend_from_slice(&(key.len() as u16).to_be_bytes());
        buf.extend_from_slice(key);
        buf.extend_from_slice(&(other.len() as u16).to_be_bytes());
        buf.extend_from_slice(other);
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type TKEY.
    pub fn validate_as_tkey(&self) -> Result<(), ReadRdataError> {
        let algorithm_len = Name::validate_uncompressed(&self.octets)?;
        let fixed = self
            .octets
            .get(algorithm_len..algorithm_len + 14)
            .ok_or(ReadRdataError::Other)?;
        let key_size = u16::from_be_bytes(fixed[12..14].try_into().unwrap()) as usize;
        let after_key = algorithm_len + 14 + key_size;
        let tail = self
            .octets
            .get(after_key..after_key + 2)
            .ok_or(ReadRdataError::Other)?;
        let other_len = u16::from_be_bytes(tail.try_into().unwrap()) as usize;
        if self.len() == after_key + 2 + other_len {
            Ok(())
        } else {
            Err(ReadRdataError::Other)
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_signed_round_trips() {
        let time = TimeSigned::try_from_unix_time(1_663_798_730).unwrap();
        assert_eq!(time.to_unix_time(), 1_663_798_730);
        assert_eq!(time.as_slice(), b"\x00\x00\x63\x2b\x8d\xca");
    }

    #[test]
    fn time_signed_rejects_out_of_range_times() {
        assert!(TimeSigned::try_from_unix_time(1 << 48).is_err());
        assert!(TimeSigned::try_from_unix_time((1 << 48) - 1).is_ok());
    }

    #[test]
    fn tsig_rdata_round_trips() {
        let algorithm: Name = "hmac-sha256.".parse().unwrap();
        let time_signed = TimeSigned::try_from_unix_time(1_663_798_730).unwrap();
        let mac = [0xab; 32];
        let rdata = Rdata::new_tsig(
            &algorithm,
            time_signed,
            300,
            &mac,
            0xa2e0,
            ExtendedRcode::NOERROR,
            &[],
        )
        .unwrap();
        rdata.validate_as_tsig().unwrap();
        assert_eq!(rdata.tsig_algorithm().unwrap(), algorithm);
        assert_eq!(rdata.tsig_time_signed().unwrap(), time_signed);
        assert_eq!(rdata.tsig_fudge().unwrap(), 300);
        assert_eq!(rdata.tsig_mac().unwrap(), &mac);
        assert_eq!(rdata.tsig_original_id().unwrap(), 0xa2e0);
        assert_eq!(rdata.tsig_error().unwrap(), ExtendedRcode::NOERROR);
        assert_eq!(rdata.tsig_other().unwrap(), b"");
    }

    #[test]
    fn tsig_validation_rejects_inconsistent_lengths() {
        let algorithm: Name = "hmac-sha256.".parse().unwrap();
        let time_signed = TimeSigned::try_from_unix_time(0).unwrap();
        let rdata = Rdata::new_tsig(
            &algorithm,
            time_signed,
            300,
            &[0xab; 32],
            0,
            ExtendedRcode::NOERROR,
            &[],
        )
        .unwrap();
        let mut truncated = rdata.octets().to_vec();
        truncated.pop();
        let truncated: Box<Rdata> = truncated.try_into().unwrap();
        assert_eq!(truncated.validate_as_tsig(), Err(ReadRdataError::Other));
    }

    #[test]
    fn tkey_rdata_round_trips() {
        let algorithm: Name = "gss-tsig.".parse().unwrap();
        let rdata = Rdata::new_tkey(
            &algorithm,
            1_663_000_000,
            1_663_100_000,
            3,
            ExtendedRcode::NOERROR,
            b"key material",
            &[],
        )
        .unwrap();
        rdata.validate_as_tkey().unwrap();
    }
}
