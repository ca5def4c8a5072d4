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

//! Provides the [`Type`] structure for DNS RR types.

use std::fmt;
use std::str::FromStr;

use crate::message::Qtype;
use crate::util::parse_generic_mnemonic;

////////////////////////////////////////////////////////////////////////
// RR TYPES                                                           //
////////////////////////////////////////////////////////////////////////

/// Represents the RR type of a DNS record.
///
/// An RR type is represented on the wire as an unsigned 16-bit integer.
/// Hence this is basically a wrapper around `u16` with nice
/// [`Debug`](fmt::Debug), [`Display`](fmt::Display), and [`FromStr`]
/// implementations for working with the common textual representations
/// of RR types. In addition, constants for the RR types known to this
/// crate are provided.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Type(u16);

/// An entry in the table of known RR types: numeric code, presentation
/// name, and whether the RDATA of the type embeds domain names that are
/// subject to compression on the wire (only the original [RFC 1035]
/// types do; see [RFC 3597 § 4]).
///
/// [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035
/// [RFC 3597 § 4]: https://datatracker.ietf.org/doc/html/rfc3597#section-4
struct TypeEntry {
    code: u16,
    mnemonic: &'static str,
    compressible_names: bool,
}

macro_rules! known_types {
    ($(($constant:ident, $code:expr, $mnemonic:expr, $compressible:expr),)+) => {
        impl Type {
            $(pub const $constant: Type = Type($code);)+
        }

        static KNOWN_TYPES: &[TypeEntry] = &[
            $(TypeEntry {
                code: $code,
                mnemonic: $mnemonic,
                compressible_names: $compressible,
            },)+
        ];
    };
}

known_types![
    (A, 1, "A", false),
    (NS, 2, "NS", true),
    (MD, 3, "MD", true),
    (MF, 4, "MF", true),
    (CNAME, 5, "CNAME", true),
    (SOA, 6, "SOA", true),
    (MB, 7, "MB", true),
    (MG, 8, "MG", true),
    (MR, 9, "MR", true),
    (NULL, 10, "NULL", false),
    (WKS, 11, "WKS", false),
    (PTR, 12, "PTR", true),
    (HINFO, 13, "HINFO", false),
    (MINFO, 14, "MINFO", true),
    (MX, 15, "MX", true),
    (TXT, 16, "TXT", false),
    (RP, 17, "RP", false),
    (AFSDB, 18, "AFSDB", false),
    (X25, 19, "X25", false),
    (ISDN, 20, "ISDN", false),
    (RT, 21, "RT", false),
    (SIG, 24, "SIG", false),
    (AAAA, 28, "AAAA", false),
    (LOC, 29, "LOC", false),
    (SRV, 33, "SRV", false),
    (NAPTR, 35, "NAPTR", false),
    (KX, 36, "KX", false),
    (CERT, 37, "CERT", false),
    (DNAME, 39, "DNAME", false),
    (OPT, 41, "OPT", false),
    (APL, 42, "APL", false),
    (DS, 43, "DS", false),
    (SSHFP, 44, "SSHFP", false),
    (RRSIG, 46, "RRSIG", false),
    (NSEC, 47, "NSEC", false),
    (DNSKEY, 48, "DNSKEY", false),
    (DHCID, 49, "DHCID", false),
    (NSEC3, 50, "NSEC3", false),
    (NSEC3PARAM, 51, "NSEC3PARAM", false),
    (TLSA, 52, "TLSA", false),
    (SPF, 99, "SPF", false),
    (TKEY, 249, "TKEY", false),
    (TSIG, 250, "TSIG", false),
    (ANY, 255, "ANY", false),
];

impl Type {
    /// Looks up the table entry for this type, if it is known.
    fn entry(self) -> Option<&'static TypeEntry> {
        KNOWN_TYPES.iter().find(|entry| entry.code == self.0)
    }

    /// Returns whether this is a known type whose RDATA may embed
    /// compressed domain names on the wire (the [RFC 1035] set; see
    /// [RFC 3597 § 4]).
    ///
    /// [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035
    /// [RFC 3597 § 4]: https://datatracker.ietf.org/doc/html/rfc3597#section-4
    pub fn has_compressible_names(self) -> bool {
        self.entry().map_or(false, |entry| entry.compressible_names)
    }
}

impl From<u16> for Type {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Type> for u16 {
    fn from(rr_type: Type) -> Self {
        rr_type.0
    }
}

impl From<Qtype> for Type {
    fn from(qtype: Qtype) -> Self {
        Self(qtype.into())
    }
}

impl FromStr for Type {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        for entry in KNOWN_TYPES {
            if entry.mnemonic.eq_ignore_ascii_case(text) {
                return Ok(Self(entry.code));
            }
        }
        parse_generic_mnemonic("TYPE", text)
            .map(Self)
            .ok_or("unknown type")
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.entry() {
            Some(entry) => f.write_str(entry.mnemonic),
            None => write!(f, "TYPE{}", self.0), // RFC 3597 § 5
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
    fn unknown_types_use_the_rfc3597_generic_form() {
        // Codes without a mnemonic (here, one from the private use
        // range) must round-trip through TYPEn.
        let unknown = Type::from(0xfffe);
        assert_eq!(unknown.to_string(), "TYPE65534");
        assert_eq!("TYPE65534".parse::<Type>().unwrap(), unknown);
        // The generic form is also accepted for known codes.
        assert_eq!("TYPE1".parse::<Type>().unwrap(), Type::A);
        assert!("BOGUS".parse::<Type>().is_err());
    }

    #[test]
    fn mnemonics_round_trip() {
        for mnemonic in ["A", "NSEC3PARAM", "TLSA", "naptr", "tsig"] {
            let rr_type: Type = mnemonic.parse().unwrap();
            assert_eq!(
                rr_type.to_string().to_ascii_uppercase(),
                mnemonic.to_ascii_uppercase()
            );
        }
    }

    #[test]
    fn compressible_names_cover_the_rfc1035_set() {
        for rr_type in [
            Type::NS,
            Type::MD,
            Type::MF,
            Type::CNAME,
            Type::SOA,
            Type::MB,
            Type::MG,
            Type::MR,
            Type::PTR,
            Type::MINFO,
            Type::MX,
        ] {
            assert!(rr_type.has_compressible_names());
        }
        for rr_type in [Type::A, Type::SRV, Type::DNAME, Type::NSEC] {
            assert!(!rr_type.has_compressible_names());
        }
    }
}
