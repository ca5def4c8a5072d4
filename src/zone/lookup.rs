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

//! The lookup algorithm shared by zones and caches, and its outcome
//! type, [`SetResponse`].
//!
//! The algorithm follows [RFC 1034 § 4.3.2] as clarified by
//! [RFC 4592]: the query name is matched down the tree from the zone
//! origin. A DNAME at any ancestor redirects the query; an NS RRset at
//! a non-apex node cuts authority and produces a referral; a missing
//! node may be covered by a wildcard at the closest encloser. At the
//! target node, a CNAME stands in for any other requested type.
//!
//! [`Zone::lookup`](super::Zone::lookup) implements this over the
//! zone's node tree; [`Cache::lookup`](crate::cache::Cache::lookup)
//! implements the same outcome algebra over cached, credibility-ranked
//! data. The [`Lookup`] trait lets response-assembly code (see the
//! [`answer`](super::answer) module) work against either.
//!
//! [RFC 1034 § 4.3.2]: https://datatracker.ietf.org/doc/html/rfc1034#section-4.3.2
//! [RFC 4592]: https://datatracker.ietf.org/doc/html/rfc4592

use std::fmt;

use crate::cache::Credibility;
use crate::name::{Label, Name};
use crate::rr::{Record, Rrset, Type};

use super::{Node, Zone};

////////////////////////////////////////////////////////////////////////
// SET RESPONSES                                                      //
////////////////////////////////////////////////////////////////////////

/// The outcome of a [`lookup`](Lookup::lookup).
///
/// The cases are mutually exclusive: exactly one describes the
/// relationship between the looked-up (name, type) pair and the data
/// source.
#[derive(Clone, Debug)]
pub enum SetResponse {
    /// The source has no information about the name (a cache miss, or
    /// a name outside the zone).
    Unknown,

    /// The name is proven not to exist.
    NxDomain,

    /// The name exists, but has no data of the requested type. The
    /// existing name is carried along.
    NxRrset(Name),

    /// The answer lies below a zone cut; the NS RRset of the cut is
    /// carried along.
    Delegation(Rrset),

    /// A CNAME was found in place of the requested type; the caller
    /// should follow its target.
    Cname(Record),

    /// A DNAME covers the name; the caller should synthesize a CNAME
    /// and retarget.
    Dname(Record),

    /// One or more RRsets answer the query.
    Successful(Vec<Rrset>),
}

impl SetResponse {
    /// Returns whether this is [`SetResponse::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns whether this is [`SetResponse::NxDomain`].
    pub fn is_nxdomain(&self) -> bool {
        matches!(self, Self::NxDomain)
    }

    /// Returns whether this is [`SetResponse::NxRrset`].
    pub fn is_nxrrset(&self) -> bool {
        matches!(self, Self::NxRrset(_))
    }

    /// Returns whether this is [`SetResponse::Successful`].
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Successful(_))
    }
}

impl fmt::Display for SetResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::NxDomain => f.write_str("NXDOMAIN"),
            Self::NxRrset(name) => write!(f, "NXRRSET at {}", name),
            Self::Delegation(rrset) => write!(f, "delegation to {}", rrset.owner),
            Self::Cname(record) => write!(f, "CNAME: {}", record),
            Self::Dname(record) => write!(f, "DNAME: {}", record),
            Self::Successful(_) => f.write_str("successful"),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// THE LOOKUP TRAIT                                                   //
////////////////////////////////////////////////////////////////////////

/// A source of DNS data that can be queried for a (name, type) pair.
///
/// Both [`Zone`] and [`Cache`](crate::cache::Cache) implement this
/// trait, returning the shared [`SetResponse`] outcome algebra. The
/// `min_credibility` parameter bounds which cached entries may be
/// used; authoritative zone data is always credible and ignores it.
pub trait Lookup {
    fn lookup(&self, name: &Name, rr_type: Type, min_credibility: Credibility) -> SetResponse;

    /// Like [`lookup`](Lookup::lookup), but suitable for fetching glue:
    /// a zone continues past its cuts into non-authoritative data, and
    /// a cache accepts glue-grade entries.
    fn lookup_glue(&self, name: &Name, rr_type: Type) -> SetResponse {
        self.lookup(name, rr_type, Credibility::GLUE)
    }
}

impl Lookup for Zone {
    fn lookup(&self, name: &Name, rr_type: Type, _min_credibility: Credibility) -> SetResponse {
        Zone::lookup(self, name, rr_type)
    }

    fn lookup_glue(&self, name: &Name, rr_type: Type) -> SetResponse {
        Zone::lookup_raw(self, name, rr_type, false)
    }
}

////////////////////////////////////////////////////////////////////////
// THE ZONE LOOKUP IMPLEMENTATION                                     //
////////////////////////////////////////////////////////////////////////

impl Zone {
    /// Looks up records for the given name and RR type.
    ///
    /// Names outside the zone produce [`SetResponse::Unknown`]. Use
    /// [`Type::ANY`] to retrieve all RRsets at a name.
    pub fn lookup(&self, name: &Name, rr_type: Type) -> SetResponse {
        self.lookup_raw(name, rr_type, true)
    }

    /// Looks up records for the given name and RR type, *optionally*
    /// processing referrals.
    ///
    /// If `process_referrals` is `false`, the lookup continues below
    /// zone cuts into non-authoritative data, and
    /// [`SetResponse::Delegation`] is never returned. This is
    /// primarily useful for looking up glue records.
    pub fn lookup_raw(&self, name: &Name, rr_type: Type, process_referrals: bool) -> SetResponse {
        if !name.eq_or_subdomain_of(self.name()) {
            return SetResponse::Unknown;
        }
        let level = name.len() - self.name().len();
        lookup_impl(&self.apex, name, rr_type, level, process_referrals, true)
    }

    /// Looks up the SOA RRset at the zone's origin (for convenience
    /// and performance).
    pub fn soa(&self) -> Option<&Rrset> {
        self.apex.rrsets.lookup(Type::SOA)
    }

    /// Looks up the NS RRset at the zone's origin (for convenience and
    /// performance).
    pub fn ns(&self) -> Option<&Rrset> {
        self.apex.rrsets.lookup(Type::NS)
    }
}

/// Implements the DNS lookup algorithm over the zone's node tree.
///
/// `node` is the deepest node we have matched so far; this node
/// corresponds to the label `name[level]`. If we have not reached the
/// target node, the function attempts to recursively match down the
/// tree. A DNAME at any node above the target redirects. When
/// `process_referrals` is `true`, an NS RRset at a non-apex node
/// produces a referral, even when the node is the target; otherwise
/// the search continues into non-authoritative data (glue). The first
/// call should set `at_apex` to `true`.
fn lookup_impl(
    node: &Node,
    name: &Name,
    rr_type: Type,
    level: usize,
    process_referrals: bool,
    at_apex: bool,
) -> SetResponse {
    // A DNAME redirects queries for names *below* its owner, never
    // queries for the owner itself.
    if level > 0 {
        if let Some(dname_rrset) = node.rrsets.lookup(Type::DNAME) {
            if let Some(record) = dname_rrset.first() {
                return SetResponse::Dname(record);
            }
        }
    }

    // An NS RRset below the apex cuts authority, even at the target
    // node.
    if !at_apex && process_referrals {
        if let Some(ns_rrset) = node.rrsets.lookup(Type::NS) {
            return SetResponse::Delegation(ns_rrset.clone());
        }
    }

    if level == 0 {
        resolve_node(node, name, rr_type)
    } else if let Some(subnode) = node.children.get(&name[level - 1]) {
        lookup_impl(subnode, name, rr_type, level - 1, process_referrals, false)
    } else if let Some(source_of_synthesis) = node.children.get(Label::asterisk()) {
        // This node is the closest encloser (RFC 4592 § 3.3.1); a
        // wildcard child synthesizes records owned by the query name.
        resolve_node(source_of_synthesis, name, rr_type)
    } else {
        SetResponse::NxDomain
    }
}

/// Resolves the requested type at a matched node. `owner` is the query
/// name, which differs from the node's own name when the node is a
/// wildcard source of synthesis.
fn resolve_node(node: &Node, owner: &Name, rr_type: Type) -> SetResponse {
    if rr_type == Type::ANY {
        let rrsets: Vec<Rrset> = node
            .rrsets
            .iter()
            .map(|rrset| synthesize(rrset, owner))
            .collect();
        if rrsets.is_empty() {
            SetResponse::NxRrset(owner.clone())
        } else {
            SetResponse::Successful(rrsets)
        }
    } else if let Some(rrset) = node.rrsets.lookup(rr_type) {
        SetResponse::Successful(vec![synthesize(rrset, owner)])
    } else if let Some(cname_rrset) = node.rrsets.lookup(Type::CNAME) {
        match synthesize(cname_rrset, owner).first() {
            Some(record) => SetResponse::Cname(record),
            None => SetResponse::NxRrset(owner.clone()),
        }
    } else {
        SetResponse::NxRrset(owner.clone())
    }
}

/// Clones an RRset, rewriting its owner to the query name. For
/// ordinary matches the owner already is the query name; for wildcard
/// synthesis it is not.
fn synthesize(rrset: &Rrset, owner: &Name) -> Rrset {
    let mut clone = rrset.clone();
    if &clone.owner != owner {
        clone.owner = owner.clone();
    }
    clone
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::super::Zone;
    use super::*;
    use crate::class::Class;
    use crate::rr::{Rdata, Ttl};

    fn name(from: &str) -> Name {
        from.parse().unwrap()
    }

    /// Checks that an RRset has the expected type and RDATAs. The
    /// RDATAs are checked in order, which is really too strict. But
    /// since our RR handling code stores RDATAs in the order they were
    /// written, this works for these tests, because we know the order
    /// the RDATAs were added!
    fn check_rrset(rrset: &Rrset, expected_type: Type, expected_rdatas: &[&[u8]]) {
        assert_eq!(rrset.rr_type, expected_type);
        let mut rdatas = rrset.rdatas();
        for &expected_rdata in expected_rdatas {
            assert_eq!(rdatas.next().unwrap().octets(), expected_rdata);
        }
        assert!(rdatas.next().is_none());
    }

    ////////////////////////////////////////////////////////////////////
    // BASIC TESTS                                                    //
    ////////////////////////////////////////////////////////////////////

    #[test]
    fn lookup_works() {
        let mut zone = Zone::new(name("quagmire.test."), Class::IN);
        let www = name("www.quagmire.test.");
        let localhost: &Rdata = b"\x7f\x00\x00\x01".try_into().unwrap();
        zone.add(&www, Type::A, Class::IN, Ttl::from(3600), localhost)
            .unwrap();
        match zone.lookup(&www, Type::A) {
            SetResponse::Successful(rrsets) => {
                assert_eq!(rrsets.len(), 1);
                check_rrset(&rrsets[0], Type::A, &[localhost.octets()]);
                assert_eq!(rrsets[0].owner, www);
            }
            other => panic!("expected an A record, got {}", other),
        }
    }

    #[test]
    fn lookup_handles_nxdomain() {
        let zone = Zone::new(name("quagmire.test."), Class::IN);
        assert!(zone
            .lookup(&name("www.quagmire.test."), Type::A)
            .is_nxdomain());
    }

    #[test]
    fn lookup_handles_exists_but_no_records() {
        let mut zone = Zone::new(name("quagmire.test."), Class::IN);
        let www = name("www.quagmire.test.");
        let localhost: &Rdata = b"\x7f\x00\x00\x01".try_into().unwrap();
        zone.add(&www, Type::A, Class::IN, Ttl::from(3600), localhost)
            .unwrap();
        assert!(matches!(
            zone.lookup(&www, Type::AAAA),
            SetResponse::NxRrset(existing) if existing == www,
        ));
    }

    #[test]
    fn lookup_returns_unknown_outside_the_zone() {
        let zone = Zone::new(name("quagmire.test."), Class::IN);
        assert!(zone.lookup(&name("other.test."), Type::A).is_unknown());
    }

    #[test]
    fn lookup_returns_cname_for_other_types() {
        let mut zone = Zone::new(name("quagmire.test."), Class::IN);
        let www = name("www.quagmire.test.");
        let host = name("host.quagmire.test.");
        zone.add(
            &www,
            Type::CNAME,
            Class::IN,
            Ttl::from(3600),
            &Rdata::new_name(&host),
        )
        .unwrap();
        match zone.lookup(&www, Type::A) {
            SetResponse::Cname(record) => {
                assert_eq!(record.owner, www);
                assert_eq!(record.rdata.single_name(), Some(host.clone()));
            }
            other => panic!("expected a CNAME, got {}", other),
        }
        // Asking for the CNAME itself is successful.
        assert!(zone.lookup(&www, Type::CNAME).is_successful());
    }

    #[test]
    fn delegations_are_reported() {
        let mut zone = Zone::new(name("quagmire.test."), Class::IN);
        let subdel = name("subdel.quagmire.test.");
        let ns = name("ns.subdel.quagmire.test.");
        let ns_rdata = Rdata::new_name(&ns);
        let addr_rdata: &Rdata = b"\x7f\x00\x00\x01".try_into().unwrap();
        zone.add(&subdel, Type::NS, Class::IN, Ttl::from(3600), &ns_rdata)
            .unwrap();
        zone.add(&ns, Type::A, Class::IN, Ttl::from(3600), addr_rdata)
            .unwrap();

        // We expect a referral, even when the target name is the
        // delegation point itself.
        for target in [&ns, &subdel] {
            match zone.lookup(target, Type::A) {
                SetResponse::Delegation(ns_rrset) => {
                    assert_eq!(ns_rrset.owner, subdel);
                    check_rrset(&ns_rrset, Type::NS, &[ns_rdata.octets()]);
                }
                other => panic!("expected a referral, got {}", other),
            }
        }

        // With referral processing off, the lookup enters the
        // non-authoritative data to find the glue.
        match zone.lookup_raw(&ns, Type::A, false) {
            SetResponse::Successful(rrsets) => {
                check_rrset(&rrsets[0], Type::A, &[addr_rdata.octets()]);
            }
            other => panic!("expected the glue, got {}", other),
        }
    }

    #[test]
    fn dname_redirects_queries_below_its_owner() {
        let mut zone = Zone::new(name("quagmire.test."), Class::IN);
        let old = name("old.quagmire.test.");
        let target = name("new.quagmire.test.");
        zone.add(
            &old,
            Type::DNAME,
            Class::IN,
            Ttl::from(3600),
            &Rdata::new_dname(&target),
        )
        .unwrap();

        match zone.lookup(&name("www.old.quagmire.test."), Type::A) {
            SetResponse::Dname(record) => {
                assert_eq!(record.owner, old);
                assert_eq!(record.rdata.single_name(), Some(target.clone()));
            }
            other => panic!("expected a DNAME, got {}", other),
        }

        // A query for the DNAME owner itself is not redirected.
        assert!(zone.lookup(&old, Type::DNAME).is_successful());
        assert!(matches!(
            zone.lookup(&old, Type::A),
            SetResponse::NxRrset(_)
        ));
    }

    #[test]
    fn any_returns_all_rrsets() {
        let mut zone = Zone::new(name("quagmire.test."), Class::IN);
        let www = name("www.quagmire.test.");
        let localhost: &Rdata = b"\x7f\x00\x00\x01".try_into().unwrap();
        let v6: &Rdata = (&[0u8; 16]).try_into().unwrap();
        zone.add(&www, Type::A, Class::IN, Ttl::from(3600), localhost)
            .unwrap();
        zone.add(&www, Type::AAAA, Class::IN, Ttl::from(3600), v6)
            .unwrap();
        match zone.lookup(&www, Type::ANY) {
            SetResponse::Successful(rrsets) => assert_eq!(rrsets.len(), 2),
            other => panic!("expected all RRsets, got {}", other),
        }
    }

    ////////////////////////////////////////////////////////////////////
    // RFC 4592                                                       //
    ////////////////////////////////////////////////////////////////////

    // RFC 4592 § 2.2.1 provides examples of wildcard synthesis. We
    // replicate the examples here, since (a) it verifies the
    // correctness of our wildcard processing, and (b) it's in general
    // a nice workout for the lookup code.

    static RFC_4592_MX: &[u8] = b"\x00\x0a\x05host1\x07example\x00";
    static RFC_4592_NS1: &[u8] = b"\x02ns\x07example\x03com\x00";
    static RFC_4592_NS2: &[u8] = b"\x02ns\x07example\x03net\x00";
    static RFC_4592_WILDCARD_TXT: &[u8] = b"\x12this is a wildcard";
    static RFC_4592_ZONE: &[(&str, Type, &[u8])] = &[
        ("example.", Type::SOA, b"\x02ns\x07example\x00\x05admin\x07example\x00\x00\x00\x00\x01\x00\x00\x0e\x10\x00\x00\x03\x84\x00\x01\x51\x80\x00\x00\x0e\x10"),
        ("example.", Type::NS, RFC_4592_NS1),
        ("example.", Type::NS, RFC_4592_NS2),
        ("*.example.", Type::TXT, RFC_4592_WILDCARD_TXT),
        ("*.example.", Type::MX, RFC_4592_MX),
        ("sub.*.example.", Type::TXT, b"\x16this is not a wildcard"),
        ("host1.example.", Type::A, b"\xc0\x00\x02\x01"),
        ("_ssh._tcp.host1.example.", Type::SRV, b"\x00\x01\x00\x01\x00\x16\x05host1\x07example\x00"),
        ("_ssh._tcp.host2.example.", Type::SRV, b"\x00\x01\x00\x01\x00\x16\x05host2\x07example\x00"),
        ("subdel.example.", Type::NS, RFC_4592_NS1),
        ("subdel.example.", Type::NS, RFC_4592_NS2),
    ];

    fn rfc_4592_zone() -> Zone {
        let mut zone = Zone::new(name("example."), Class::IN);
        for &(owner_str, rr_type, rdata) in RFC_4592_ZONE {
            zone.add(
                &name(owner_str),
                rr_type,
                Class::IN,
                Ttl::from(3600),
                rdata.try_into().unwrap(),
            )
            .unwrap();
        }
        zone
    }

    #[test]
    fn rfc_4592_examples() {
        let zone = rfc_4592_zone();

        // The following are synthesized from a wildcard. The owner of
        // the synthesized RRset must be the query name.
        match zone.lookup(&name("host3.example."), Type::MX) {
            SetResponse::Successful(rrsets) => {
                check_rrset(&rrsets[0], Type::MX, &[RFC_4592_MX]);
                assert_eq!(rrsets[0].owner, name("host3.example."));
            }
            other => panic!("host3.example. MX: unexpected {}", other),
        }
        assert!(matches!(
            zone.lookup(&name("host3.example."), Type::A),
            SetResponse::NxRrset(_),
        ));
        match zone.lookup(&name("foo.bar.example."), Type::TXT) {
            SetResponse::Successful(rrsets) => {
                check_rrset(&rrsets[0], Type::TXT, &[RFC_4592_WILDCARD_TXT]);
                assert_eq!(rrsets[0].owner, name("foo.bar.example."));
            }
            other => panic!("foo.bar.example. TXT: unexpected {}", other),
        }

        // The following do not trigger wildcard synthesis. (See RFC
        // 4592 § 2.2.1 for the reasons why!)
        assert!(matches!(
            zone.lookup(&name("host1.example."), Type::MX),
            SetResponse::NxRrset(_),
        ));
        assert!(matches!(
            zone.lookup(&name("sub.*.example."), Type::MX),
            SetResponse::NxRrset(_),
        ));
        assert!(zone
            .lookup(&name("_telnet._tcp.host1.example."), Type::SRV)
            .is_nxdomain());
        match zone.lookup(&name("host.subdel.example."), Type::A) {
            SetResponse::Delegation(ns_rrset) => {
                assert_eq!(ns_rrset.owner, name("subdel.example."));
                check_rrset(&ns_rrset, Type::NS, &[RFC_4592_NS1, RFC_4592_NS2]);
            }
            other => panic!("host.subdel.example. A: unexpected {}", other),
        }
        assert!(zone
            .lookup(&name("ghost.*.example."), Type::MX)
            .is_nxdomain());
    }
}
