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

//! Provides the [`Class`] structure for DNS classes.

use std::fmt;
use std::str::FromStr;

use crate::message::Qclass;
use crate::util::{lookup_mnemonic, parse_generic_mnemonic};

/// Represents a class in the DNS.
///
/// A class is a 16-bit value on the wire. Like the RR
/// [`Type`](crate::rr::Type) registry, this wrapper pairs the numeric
/// code with its presentation mnemonic: the
/// [`Display`](fmt::Display) and [`FromStr`] implementations use the
/// mnemonic table below, falling back to the [RFC 3597 § 5] `CLASSn`
/// generic form for codes the table does not know. In practice only
/// [`IN`](Class::IN) matters; CH and HS survive mainly for server
/// version-string queries.
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Class(u16);

/// The classes listed by the IANA. CS was never registered there and
/// is long obsolete, so it is omitted.
static KNOWN_CLASSES: &[(&str, u16)] = &[("IN", 1), ("CH", 3), ("HS", 4)];

impl Class {
    pub const IN: Self = Self(1);
    pub const CH: Self = Self(3);
    pub const HS: Self = Self(4);

    /// Returns the presentation mnemonic for this class, if it has
    /// one.
    fn mnemonic(self) -> Option<&'static str> {
        KNOWN_CLASSES
            .iter()
            .find(|&&(_, code)| code == self.0)
            .map(|&(mnemonic, _)| mnemonic)
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Class(value)
    }
}

impl From<Class> for u16 {
    fn from(class: Class) -> Self {
        class.0
    }
}

impl From<Qclass> for Class {
    fn from(qclass: Qclass) -> Self {
        Self(qclass.into())
    }
}

impl FromStr for Class {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        lookup_mnemonic(KNOWN_CLASSES, text)
            .or_else(|| parse_generic_mnemonic("CLASS", text))
            .map(Self)
            .ok_or("unknown class")
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.mnemonic() {
            Some(mnemonic) => f.write_str(mnemonic),
            None => write!(f, "CLASS{}", self.0), // RFC 3597 § 5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Class;

    #[test]
    fn mnemonics_round_trip() {
        for (mnemonic, code) in [("IN", 1), ("CH", 3), ("HS", 4)] {
            let class: Class = mnemonic.parse().unwrap();
            assert_eq!(u16::from(class), code);
            assert_eq!(class.to_string(), mnemonic);
        }
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!("in".parse::<Class>().unwrap(), Class::IN);
        assert_eq!("class1".parse::<Class>().unwrap(), Class::IN);
    }

    #[test]
    fn unknown_classes_use_the_rfc3597_generic_form() {
        // Codes without a mnemonic (here, one from the private use
        // range) must round-trip through CLASSn.
        let unknown = Class::from(0xfffe);
        assert_eq!(unknown.to_string(), "CLASS65534");
        assert_eq!("CLASS65534".parse::<Class>().unwrap(), unknown);
        assert!("CLASSZZZ".parse::<Class>().is_err());
        assert!("bogus".parse::<Class>().is_err());
    }
}
