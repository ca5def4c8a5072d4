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

//! Implementation of the [`Record`] type.

use std::fmt;

use super::rdata::Rdata;
use super::{Ttl, Type};
use crate::class::Class;
use crate::name::Name;

/// A DNS resource record.
///
/// A `Record` is a value object: an owner name, RR type, class, TTL,
/// and RDATA. Records are produced by the message
/// [`Reader`](crate::message::Reader), by the zone-file parser, and by
/// zone transfers, and consumed by the message
/// [`Writer`](crate::message::Writer) and the zone and cache layers.
///
/// Record equality is deep (owner, type, class, and RDATA) and
/// deliberately ignores the TTL, following the DNS convention that two
/// records differing only in TTL carry the same data. RDATA comparison
/// applies the type-aware rules of [`Rdata::equals`].
#[derive(Clone, Debug)]
pub struct Record {
    pub owner: Name,
    pub rr_type: Type,
    pub class: Class,
    pub ttl: Ttl,
    pub rdata: Box<Rdata>,
}

impl Record {
    /// Creates a new `Record`.
    pub fn new(owner: Name, rr_type: Type, class: Class, ttl: Ttl, rdata: Box<Rdata>) -> Self {
        Self {
            owner,
            rr_type,
            class,
            ttl,
            rdata,
        }
    }

    /// Returns the type of the RRset this record belongs to. For most
    /// records this is the record's own type; for RRSIG and SIG records
    /// it is the type covered by the signature, so that signatures
    /// group with the data they sign.
    pub fn rrset_type(&self) -> Type {
        if self.rr_type == Type::RRSIG || self.rr_type == Type::SIG {
            self.rdata.sig_type_covered().unwrap_or(self.rr_type)
        } else {
            self.rr_type
        }
    }

    /// Returns whether this record and `other` belong to the same
    /// RRset: same owner (case-insensitively), same class, and same
    /// [RRset type](Record::rrset_type).
    pub fn same_rrset(&self, other: &Record) -> bool {
        self.rrset_type() == other.rrset_type()
            && self.class == other.class
            && self.owner == other.owner
    }

    /// Returns the domain name, if any, that additional-section
    /// processing should look up for this record (the NS target, the MX
    /// exchange, the SRV target, and so on).
    pub fn additional_name(&self) -> Option<Name> {
        match self.rr_type {
            Type::NS | Type::MD | Type::MF | Type::MB => self.rdata.single_name(),
            Type::MX | Type::KX => self.rdata.u16_and_name().map(|(_, name)| name),
            Type::SRV => self.rdata.srv_fields().map(|(_, _, _, target)| target),
            _ => None,
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.rr_type == other.rr_type
            && self.class == other.class
            && self.owner == other.owner
            && self.rdata.equals(&other.rdata, self.class, self.rr_type)
    }
}

impl Eq for Record {}

/// `Record`s display in master-file presentation format: owner, TTL,
/// class, type, and the type-specific RDATA presentation (or the
/// [RFC 3597 § 5] generic form where none is defined).
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.owner,
            self.ttl,
            self.class,
            self.rr_type,
            self.rdata.present(self.class, self.rr_type)
        )
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn a_record(ttl: u32) -> Record {
        Record::new(
            "example.test.".parse().unwrap(),
            Type::A,
            Class::IN,
            Ttl::from(ttl),
            Rdata::new_a("192.0.2.1".parse().unwrap()),
        )
    }

    #[test]
    fn equality_ignores_ttl() {
        assert_eq!(a_record(3600), a_record(7200));
    }

    #[test]
    fn equality_compares_rdata() {
        let mut other = a_record(3600);
        other.rdata = Rdata::new_a("192.0.2.2".parse().unwrap());
        assert_ne!(a_record(3600), other);
    }

    #[test]
    fn rrset_type_collapses_signatures() {
        let signer: Name = "example.test.".parse().unwrap();
        let sig = Record::new(
            "example.test.".parse().unwrap(),
            Type::RRSIG,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_rrsig(Type::A, 8, 2, 3600, 0, 0, 2642, &signer, b"sig").unwrap(),
        );
        assert_eq!(sig.rrset_type(), Type::A);
        assert!(sig.same_rrset(&a_record(3600)));
    }

    #[test]
    fn additional_names_are_exposed() {
        let target: Name = "ns1.example.test.".parse().unwrap();
        let ns = Record::new(
            "example.test.".parse().unwrap(),
            Type::NS,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_name(&target),
        );
        assert_eq!(ns.additional_name(), Some(target));
        assert_eq!(a_record(3600).additional_name(), None);

        let exchange: Name = "mail.example.test.".parse().unwrap();
        let mx = Record::new(
            "example.test.".parse().unwrap(),
            Type::MX,
            Class::IN,
            Ttl::from(3600),
            Rdata::new_mx(10, &exchange),
        );
        assert_eq!(mx.additional_name(), Some(exchange));
    }

    #[test]
    fn display_uses_presentation_format() {
        assert_eq!(
            a_record(3600).to_string(),
            "example.test.\t3600\tIN\tA\t192.0.2.1"
        );
    }
}
