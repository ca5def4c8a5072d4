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

//! Handling of OPT RDATA and EDNS options ([RFC 6891]).
//!
//! The OPT pseudo-record's fixed fields live in the record header (the
//! requestor's UDP payload size in the CLASS field; the extended
//! RCODE, version, and flags in the TTL field). Its RDATA is a
//! sequence of options, each `(code, length, data)`. The options known
//! to this crate get typed representations through [`EdnsOption`];
//! unknown codes fall back to [`EdnsOption::Generic`].
//!
//! [RFC 6891]: https://datatracker.ietf.org/doc/html/rfc6891

use std::net::IpAddr;

use super::{Rdata, RdataTooLongError, ReadRdataError};

/// EDNS option code assignments used by this crate.
mod code {
    pub const LLQ: u16 = 1;
    pub const NSID: u16 = 3;
    pub const CLIENT_SUBNET: u16 = 8;
    pub const UPDATE_LEASE: u16 = 2;
}

////////////////////////////////////////////////////////////////////////
// EDNS OPTIONS                                                       //
////////////////////////////////////////////////////////////////////////

/// A single EDNS option.
///
/// Known option codes decode to typed variants; anything else is
/// carried verbatim in [`EdnsOption::Generic`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EdnsOption {
    /// DNS Name Server Identifier ([RFC 5001]). The payload is opaque.
    ///
    /// [RFC 5001]: https://datatracker.ietf.org/doc/html/rfc5001
    Nsid(Vec<u8>),

    /// EDNS Client Subnet ([RFC 7871]).
    ///
    /// [RFC 7871]: https://datatracker.ietf.org/doc/html/rfc7871
    ClientSubnet {
        source_bits: u8,
        scope_bits: u8,
        address: IpAddr,
    },

    /// DNS Long-Lived Queries (draft-sekar-dns-llq).
    Llq {
        version: u16,
        opcode: u16,
        error: u16,
        id: u64,
        lease: u32,
    },

    /// Dynamic DNS Update Leases (draft-sekar-dns-ul). The lease is in
    /// seconds.
    UpdateLease(u32),

    /// An option with a code this crate does not recognize.
    Generic { code: u16, data: Vec<u8> },
}

impl EdnsOption {
    /// Returns the option's code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Nsid(_) => code::NSID,
            Self::ClientSubnet { .. } => code::CLIENT_SUBNET,
            Self::Llq { .. } => code::LLQ,
            Self::UpdateLease(_) => code::UPDATE_LEASE,
            Self::Generic { code, .. } => *code,
        }
    }

    /// Serializes the option into `buf`, writing the code, reserving
    /// the two length octets, serializing the payload, and then
    /// backpatching the length.
    pub fn serialize(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.code().to_be_bytes());
        let length_at = buf.len();
        buf.extend_from_slice(&[0, 0]);
        match self {
            Self::Nsid(data) => buf.extend_from_slice(data),
            Self::ClientSubnet {
                source_bits,
                scope_bits,
                address,
            } => {
                let (family, octets): (u16, Vec<u8>) = match address {
                    IpAddr::V4(v4) => (1, v4.octets().to_vec()),
                    IpAddr::V6(v6) => (2, v6.octets().to_vec()),
                };
                buf.extend_from_slice(&family.to_be_bytes());
                buf.push(*source_bits);
                buf.push(*scope_bits);
                // Only as many address octets as the source prefix
                // needs are carried.
                let n_octets = (*source_bits as usize + 7) / 8;
                buf.extend_from_slice(&octets[..n_octets.min(octets.len())]);
            }
            Self::Llq {
                version,
                opcode,
                error,
                id,
                lease,
            } => {
                buf.extend_from_slice(&version.to_be_bytes());
                buf.extend_from_slice(&opcode.to_be_bytes());
                buf.extend_from_slice(&error.to_be_bytes());
                buf.extend_from_slice(&id.to_be_bytes());
                buf.extend_from_slice(&lease.to_be_bytes());
            }
            Self::UpdateLease(lease) => buf.extend_from_slice(&lease.to_be_bytes()),
            Self::Generic { data, .. } => buf.extend_from_slice(data),
        }
        let length = (buf.len() - length_at - 2) as u16;
        buf[length_at..length_at + 2].copy_from_slice(&length.to_be_bytes());
    }

    /// Decodes a single option from its code and payload.
    fn decode(option_code: u16, data: &[u8]) -> Result<Self, ReadRdataError> {
        match option_code {
            code::NSID => Ok(Self::Nsid(data.to_vec())),
            code::CLIENT_SUBNET => {
                if data.len() < 4 {
                    return Err(ReadRdataError::Other);
                }
                let family = u16::from_be_bytes(data[0..2].try_into().unwrap());
                let source_bits = data[2];
                let scope_bits = data[3];
                let address_octets = &data[4..];
                let n_octets = (source_bits as usize + 7) / 8;
                if address_octets.len() != n_octets {
                    return Err(ReadRdataError::Other);
                }
                let address = match family {
                    1 if source_bits <= 32 => {
                        let mut octets = [0; 4];
                        octets[..address_octets.len()].copy_from_slice(address_octets);
                        IpAddr::from(octets)
                    }
                    2 if source_bits <= 128 => {
                        let mut octets = [0; 16];
                        octets[..address_octets.len()].copy_from_slice(address_octets);
                        IpAddr::from(octets)
                    }
                    _ => return Err(ReadRdataError::Other),
                };
                Ok(Self::ClientSubnet {
                    source_bits,
                    scope_bits,
                    address,
                })
            }
            code::LLQ => {
                if data.len() != 18 {
                    return Err(ReadRdataError::Other);
                }
                Ok(Self::Llq {
                    version: u16::from_be_bytes(data[0..2].try_into().unwrap()),
                    opcode: u16::from_be_bytes(data[2..4].try_into().unwrap()),
                    error: u16::from_be_bytes(data[4..6].try_into().unwrap()),
                    id: u64::from_be_bytes(data[6..14].try_into().unwrap()),
                    lease: u32::from_be_bytes(data[14..18].try_into().unwrap()),
                })
            }
            code::UPDATE_LEASE => {
                if data.len() != 4 {
                    return Err(ReadRdataError::Other);
                }
                Ok(Self::UpdateLease(u32::from_be_bytes(
                    data.try_into().unwrap(),
                )))
            }
            _ => Ok(Self::Generic {
                code: option_code,
                data: data.to_vec(),
            }),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// OPT RDATA                                                          //
////////////////////////////////////////////////////////////////////////

impl Rdata {
    /// Serializes OPT RDATA from the given options into a new boxed
    /// [`Rdata`].
    pub fn new_opt(options: &[EdnsOption]) -> Result<Box<Self>, RdataTooLongError> {
        let mut buf = Vec::new();
        for option in options {
            option.serialize(&mut buf);
        }
        buf.try_into()
    }

    /// Validates this [`Rdata`] for correctness, assuming that it is of
    /// type OPT. This checks the option framing; payloads of known
    /// options are checked when they are decoded.
    pub fn validate_as_opt(&self) -> Result<(), ReadRdataError> {
        let mut offset = 0;
        while offset < self.len() {
            let header = self
                .octets
                .get(offset..offset + 4)
                .ok_or(ReadRdataError::Other)?;
            let length = u16::from_be_bytes(header[2..4].try_into().unwrap()) as usize;
            if self.len() < offset + 4 + length {
                return Err(ReadRdataError::Other);
            }
            offset += 4 + length;
        }
        Ok(())
    }

    /// Decodes the options carried in this [`Rdata`], assuming that it
    /// is of type OPT.
    pub fn opt_options(&self) -> Result<Vec<EdnsOption>, ReadRdataError> {
        self.validate_as_opt()?;
        let mut options = Vec::new();
        let mut offset = 0;
        while offset < self.len() {
            let option_code = u16::from_be_bytes(self.octets[offset..offset + 2].try_into().unwrap());
            let length =
                u16::from_be_bytes(self.octets[offset + 2..offset + 4].try_into().unwrap())
                    as usize;
            let data = &self.octets[offset + 4..offset + 4 + length];
            options.push(EdnsOption::decode(option_code, data)?);
            offset += 4 + length;
        }
        Ok(options)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_round_trip() {
        let options = vec![
            EdnsOption::Nsid(b"server-1".to_vec()),
            EdnsOption::ClientSubnet {
                source_bits: 24,
                scope_bits: 0,
                address: "192.0.2.0".parse().unwrap(),
            },
            EdnsOption::Llq {
                version: 1,
                opcode: 1,
                error: 0,
                id: 0x0102030405060708,
                lease: 3600,
            },
            EdnsOption::UpdateLease(7200),
            EdnsOption::Generic {
                code: 0xfde8,
                data: b"opaque".to_vec(),
            },
        ];
        let rdata = Rdata::new_opt(&options).unwrap();
        rdata.validate_as_opt().unwrap();
        assert_eq!(rdata.opt_options().unwrap(), options);
    }

    #[test]
    fn client_subnet_carries_partial_addresses() {
        let option = EdnsOption::ClientSubnet {
            source_bits: 24,
            scope_bits: 0,
            address: "192.0.2.0".parse().unwrap(),
        };
        let mut buf = Vec::new();
        option.serialize(&mut buf);
        // code 8, length 7, family 1, source 24, scope 0, 3 address
        // octets.
        assert_eq!(buf, b"\x00\x08\x00\x07\x00\x01\x18\x00\xc0\x00\x02");
    }

    #[test]
    fn option_length_is_backpatched() {
        let option = EdnsOption::Nsid(b"xyz".to_vec());
        let mut buf = Vec::new();
        option.serialize(&mut buf);
        assert_eq!(buf, b"\x00\x03\x00\x03xyz");
    }

    #[test]
    fn validation_rejects_truncated_options() {
        let rdata: &Rdata = b"\x00\x03\x00\x05xyz".try_into().unwrap();
        assert_eq!(rdata.validate_as_opt(), Err(ReadRdataError::Other));
    }

    #[test]
    fn client_subnet_rejects_inconsistent_lengths() {
        // source_bits of 24 requires exactly 3 address octets.
        let rdata: &Rdata = b"\x00\x08\x00\x08\x00\x01\x18\x00\xc0\x00\x02\x01"
            .try_into()
            .unwrap();
        assert!(rdata.opt_options().is_err());
    }
}
