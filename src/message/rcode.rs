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

//! Implementation of the [`Rcode`] and [`ExtendedRcode`] types.

use std::fmt;

////////////////////////////////////////////////////////////////////////
// RCODES                                                             //
////////////////////////////////////////////////////////////////////////

/// The RCODE value of the DNS message header.
///
/// [RFC 1035 § 4.1.1] defines the RCODE field as a four-bit field
/// indicating success or failure in a DNS response. The first six
/// values are original to RFC 1035, while the rest have been added in
/// subsequent extensions of the DNS. The names given to each member of
/// the `Rcode` enumeration are those listed by the IANA.
///
/// EDNS(0) introduced extended RCODEs via the OPT pseudo-RR; see
/// [`ExtendedRcode`].
///
/// [RFC 1035 § 4.1.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Rcode {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    YxDomain,
    YxRrset,
    NxRrset,
    NotAuth,
    NotZone,
    DsoTypeNi,
    Unassigned(u8),
}

impl TryFrom<u8> for Rcode {
    type Error = IntoRcodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NoError),
            1 => Ok(Self::FormErr),
            2 => Ok(Self::ServFail),
            3 => Ok(Self::NxDomain),
            4 => Ok(Self::NotImp),
            5 => Ok(Self::Refused),
            6 => Ok(Self::YxDomain),
            7 => Ok(Self::YxRrset),
            8 => Ok(Self::NxRrset),
            9 => Ok(Self::NotAuth),
            10 => Ok(Self::NotZone),
            11 => Ok(Self::DsoTypeNi),
            12..=15 => Ok(Self::Unassigned(value)),
            _ => Err(IntoRcodeError),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(value: Rcode) -> Self {
        match value {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NxDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::YxDomain => 6,
            Rcode::YxRrset => 7,
            Rcode::NxRrset => 8,
            Rcode::NotAuth => 9,
            Rcode::NotZone => 10,
            Rcode::DsoTypeNi => 11,
            Rcode::Unassigned(v) => v,
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoError => f.write_str("NOERROR"),
            Self::FormErr => f.write_str("FORMERR"),
            Self::ServFail => f.write_str("SERVFAIL"),
            Self::NxDomain => f.write_str("NXDOMAIN"),
            Self::NotImp => f.write_str("NOTIMP"),
            Self::Refused => f.write_str("REFUSED"),
            Self::YxDomain => f.write_str("YXDOMAIN"),
            Self::YxRrset => f.write_str("YXRRSET"),
            Self::NxRrset => f.write_str("NXRRSET"),
            Self::NotAuth => f.write_str("NOTAUTH"),
            Self::NotZone => f.write_str("NOTZONE"),
            Self::DsoTypeNi => f.write_str("DSOTYPENI"),
            Self::Unassigned(v) => write!(f, "RCODE{}", v),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// EXTENDED RCODES                                                    //
////////////////////////////////////////////////////////////////////////

/// An extended RCODE.
///
/// EDNS(0) ([RFC 6891]) extends the four-bit RCODE of the DNS header
/// with eight more bits carried in the OPT pseudo-record's TTL field,
/// and TSIG/TKEY error fields are sixteen bits wide. This type covers
/// all of these uses; constants are provided for the values this crate
/// works with.
///
/// [RFC 6891]: https://datatracker.ietf.org/doc/html/rfc6891
#[derive(Copy, Clone, Eq, Hash, PartialEq)]
pub struct ExtendedRcode(u16);

impl ExtendedRcode {
    pub const NOERROR: Self = Self(0);
    pub const FORMERR: Self = Self(1);
    pub const SERVFAIL: Self = Self(2);
    pub const NXDOMAIN: Self = Self(3);
    pub const NOTIMP: Self = Self(4);
    pub const REFUSED: Self = Self(5);
    pub const NOTAUTH: Self = Self(9);
    pub const BADVERSBADSIG: Self = Self(16);
    pub const BADKEY: Self = Self(17);
    pub const BADTIME: Self = Self(18);
    pub const BADMODE: Self = Self(19);
    pub const BADNAME: Self = Self(20);
    pub const BADALG: Self = Self(21);
    pub const BADTRUNC: Self = Self(22);
    pub const BADCOOKIE: Self = Self(23);
}

impl From<u16> for ExtendedRcode {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<ExtendedRcode> for u16 {
    fn from(value: ExtendedRcode) -> Self {
        value.0
    }
}

impl From<Rcode> for ExtendedRcode {
    fn from(value: Rcode) -> Self {
        Self(u8::from(value) as u16)
    }
}

impl fmt::Debug for ExtendedRcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ExtendedRcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that the provided value is not a valid RCODE.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IntoRcodeError;

impl fmt::Display for IntoRcodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("not a valid RCODE")
    }
}

impl std::error::Error for IntoRcodeError {}
