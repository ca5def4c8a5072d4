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

//! Implementation of a credibility-ranked DNS cache.
//!
//! The [`Cache`] stores RRsets keyed by owner name and type, each
//! tagged with a [`Credibility`] rank derived from where the data was
//! seen and an absolute expiration derived from its TTL. Negative
//! results (NXDOMAIN and "no data of this type") are cached too, with
//! a TTL taken from the SOA MINIMUM field of the response's authority
//! section per [RFC 2308].
//!
//! Insertion follows the credibility rule: data of equal or higher
//! credibility replaces what is cached; lower-credibility data is
//! ignored. Expired entries are treated as absent and purged lazily.
//!
//! The cache is the one structure in this crate designed to be shared
//! between threads; all access is serialized by an internal lock.
//!
//! [RFC 2308]: https://datatracker.ietf.org/doc/html/rfc2308

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::debug;

use crate::class::Class;
use crate::message::{Message, Rcode, Section};
use crate::name::Name;
use crate::rr::{Rrset, Ttl, Type};
use crate::zone::{Lookup, SetResponse};

////////////////////////////////////////////////////////////////////////
// CREDIBILITY                                                        //
////////////////////////////////////////////////////////////////////////

/// The credibility of cached data, based on the data's source.
///
/// Ranks are ordered: higher values are more trustworthy. Several
/// sources share a rank (glue and other additional data; the answer
/// and authority sections of a non-authoritative response; the answer
/// and authority sections of an authoritative response). The
/// [`NORMAL`](Credibility::NORMAL) and [`ANY`](Credibility::ANY)
/// constants are the usual lower bounds passed to lookups.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Credibility(u8);

impl Credibility {
    /// A hint, such as a root-server list compiled into a program.
    pub const HINT: Self = Self(0);

    /// Glue from the additional section of a response.
    pub const GLUE: Self = Self(1);

    /// Other data from the additional section of a response.
    pub const ADDITIONAL: Self = Self(1);

    /// Data not required to be credible.
    pub const ANY: Self = Self(1);

    /// The answer section of a non-authoritative response.
    pub const NONAUTH_ANSWER: Self = Self(3);

    /// The authority section of a non-authoritative response.
    pub const NONAUTH_AUTHORITY: Self = Self(3);

    /// Credible data.
    pub const NORMAL: Self = Self(3);

    /// The answer section of an authoritative response.
    pub const AUTH_ANSWER: Self = Self(4);

    /// The authority section of an authoritative response.
    pub const AUTH_AUTHORITY: Self = Self(4);

    /// An authoritative zone.
    pub const ZONE: Self = Self(5);
}

impl fmt::Debug for Credibility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

////////////////////////////////////////////////////////////////////////
// CACHE STRUCTURE                                                    //
////////////////////////////////////////////////////////////////////////

/// An in-memory DNS cache for a single class.
///
/// See the [module documentation](self) for semantics.
pub struct Cache {
    class: Class,
    max_cache_ttl: u32,
    max_ncache_ttl: u32,
    data: Mutex<HashMap<Name, Vec<Entry>>>,
}

/// One cached fact about a name: either an RRset of some type, or a
/// negative marker. A name-level negative marker (NXDOMAIN) uses the
/// reserved type 0.
struct Entry {
    rr_type: Type,
    credibility: Credibility,
    expires: Instant,
    data: Option<Rrset>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires
    }

    fn is_negative(&self) -> bool {
        self.data.is_none()
    }
}

impl Cache {
    /// Creates a new, empty `Cache` for the given class with default
    /// TTL bounds (24 hours for positive data, 3 hours for negative
    /// data).
    pub fn new(class: Class) -> Self {
        Self {
            class,
            max_cache_ttl: 24 * 60 * 60,
            max_ncache_ttl: 3 * 60 * 60,
            data: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cache's class.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Sets the maximum time, in seconds, that positive data may be
    /// cached regardless of its TTL.
    pub fn set_max_cache_ttl(&mut self, seconds: u32) {
        self.max_cache_ttl = seconds;
    }

    /// Sets the maximum time, in seconds, that negative results may be
    /// cached regardless of the SOA MINIMUM.
    pub fn set_max_ncache_ttl(&mut self, seconds: u32) {
        self.max_ncache_ttl = seconds;
    }

    /// Returns the number of names with live cache entries.
    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    /// Returns whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all cached data for a name.
    pub fn flush_name(&self, name: &Name) {
        self.data.lock().unwrap().remove(name);
    }

    ////////////////////////////////////////////////////////////////////
    // INSERTION                                                      //
    ////////////////////////////////////////////////////////////////////

    /// Adds an RRset to the cache with the given credibility. Existing
    /// data of higher credibility is left in place; data of equal or
    /// lower credibility is replaced.
    pub fn add_rrset(&self, rrset: &Rrset, credibility: Credibility) {
        if rrset.class != self.class || rrset.is_empty() {
            return;
        }
        let ttl = u32::from(rrset.ttl).min(self.max_cache_ttl);
        let expires = Instant::now() + Duration::from_secs(ttl as u64);
        self.insert(
            rrset.owner.clone(),
            Entry {
                rr_type: rrset.rr_type,
                credibility,
                expires,
                data: Some(rrset.clone()),
            },
        );
    }

    /// Adds a negative result to the cache. `rr_type` identifies the
    /// type proven absent; pass [`Type::from`]`(0)` (or use
    /// [`Cache::add_nxdomain`]) for a name-level negative. `ttl` is
    /// the negative TTL from the authority SOA's MINIMUM field, which
    /// is bounded by the configured maximum.
    pub fn add_negative(&self, name: Name, rr_type: Type, ttl: Ttl, credibility: Credibility) {
        let ttl = u32::from(ttl).min(self.max_ncache_ttl);
        let expires = Instant::now() + Duration::from_secs(ttl as u64);
        self.insert(
            name,
            Entry {
                rr_type,
                credibility,
                expires,
                data: None,
            },
        );
    }

    /// Adds a name-level negative (NXDOMAIN) to the cache.
    pub fn add_nxdomain(&self, name: Name, ttl: Ttl, credibility: Credibility) {
        self.add_negative(name, Type::from(0), ttl, credibility);
    }

    /// The common insertion path, applying the credibility rule.
    fn insert(&self, name: Name, entry: Entry) {
        let mut data = self.data.lock().unwrap();
        let now = Instant::now();
        let entries = data.entry(name).or_default();
        entries.retain(|existing| !existing.is_expired(now));
        match entries
            .iter_mut()
            .find(|existing| existing.rr_type == entry.rr_type)
        {
            Some(existing) => {
                // Equal or higher credibility replaces; lower is
                // ignored.
                if entry.credibility >= existing.credibility {
                    *existing = entry;
                }
            }
            None => entries.push(entry),
        }
    }

    /// Ingests a response message into the cache, assigning
    /// credibility by section and the AA bit, and caching a negative
    /// result derived from the authority SOA when the answer section
    /// does not answer the question ([RFC 2308 § 3]).
    ///
    /// [RFC 2308 § 3]: https://datatracker.ietf.org/doc/html/rfc2308#section-3
    pub fn add_message(&self, message: &Message) {
        let rcode = message.header.rcode;
        if rcode != Rcode::NoError && rcode != Rcode::NxDomain {
            debug!("not caching response with rcode {}", rcode);
            return;
        }
        let question = match message.question() {
            Some(question) => question.clone(),
            None => return,
        };
        if Class::from(question.qclass) != self.class {
            return;
        }
        let aa = message.header.aa;

        let answer_credibility = if aa {
            Credibility::AUTH_ANSWER
        } else {
            Credibility::NONAUTH_ANSWER
        };
        let authority_credibility = if aa {
            Credibility::AUTH_AUTHORITY
        } else {
            Credibility::NONAUTH_AUTHORITY
        };

        let mut answered = false;
        for rrset in message.section_rrsets(Section::Answer) {
            if rrset.owner == question.qname {
                answered = true;
            }
            self.add_rrset(&rrset, answer_credibility);
        }
        for rrset in message.section_rrsets(Section::Authority) {
            self.add_rrset(&rrset, authority_credibility);
        }
        for rrset in message.section_rrsets(Section::Additional) {
            self.add_rrset(&rrset, Credibility::ADDITIONAL);
        }

        // RFC 2308: an empty (or CNAME-only) answer with an SOA in the
        // authority section is a cacheable negative result, with the
        // SOA MINIMUM as its TTL.
        if !answered || rcode == Rcode::NxDomain {
            let soa_minimum = message
                .records(Section::Authority)
                .iter()
                .find(|record| record.rr_type == Type::SOA)
                .and_then(|record| record.rdata.soa_minimum());
            if let Some(minimum) = soa_minimum {
                let ttl = Ttl::from(minimum);
                if rcode == Rcode::NxDomain {
                    self.add_nxdomain(question.qname.clone(), ttl, authority_credibility);
                } else {
                    self.add_negative(
                        question.qname.clone(),
                        Type::from(question.qtype),
                        ttl,
                        authority_credibility,
                    );
                }
            }
        }
    }

    ////////////////////////////////////////////////////////////////////
    // LOOKUP                                                         //
    ////////////////////////////////////////////////////////////////////

    /// Looks up records for the given name and RR type among cache
    /// entries of at least `min_credibility`.
    ///
    /// The target name is considered first, so a cached answer is
    /// preferred; then successively shorter ancestors are consulted
    /// for DNAME redirections and NS delegations. (A zone walks from
    /// its origin downward instead; the outcome algebra is the same.)
    pub fn lookup(&self, name: &Name, rr_type: Type, min_credibility: Credibility) -> SetResponse {
        let mut data = self.data.lock().unwrap();
        let now = Instant::now();

        // The exact name first.
        if let Some(entries) = data.get_mut(name) {
            entries.retain(|entry| !entry.is_expired(now));
            if let Some(response) = resolve_exact(entries, name, rr_type, min_credibility) {
                return response;
            }
        }

        // Then the ancestors, nearest first, for redirections and
        // cuts.
        for skip in 1..name.len() {
            let ancestor = name.superdomain(skip).unwrap();
            let entries = match data.get_mut(&ancestor) {
                Some(entries) => entries,
                None => continue,
            };
            entries.retain(|entry| !entry.is_expired(now));
            for entry in entries.iter() {
                if entry.credibility < min_credibility || entry.is_negative() {
                    continue;
                }
                let rrset = entry.data.as_ref().unwrap();
                if entry.rr_type == Type::DNAME {
                    if let Some(record) = rrset.first() {
                        return SetResponse::Dname(record);
                    }
                } else if entry.rr_type == Type::NS {
                    return SetResponse::Delegation(rrset.clone());
                }
            }
        }

        SetResponse::Unknown
    }
}

/// Resolves a lookup against the entries cached for the target name
/// itself. Returns `None` when nothing credible was found, letting the
/// caller continue to the ancestors.
fn resolve_exact(
    entries: &[Entry],
    name: &Name,
    rr_type: Type,
    min_credibility: Credibility,
) -> Option<SetResponse> {
    let credible = entries
        .iter()
        .filter(|entry| entry.credibility >= min_credibility);

    let mut rrsets = Vec::new();
    let mut cname = None;
    let mut nxrrset = false;
    for entry in credible {
        if entry.is_negative() {
            if u16::from(entry.rr_type) == 0 {
                return Some(SetResponse::NxDomain);
            }
            if entry.rr_type == rr_type {
                nxrrset = true;
            }
        } else {
            let rrset = entry.data.as_ref().unwrap();
            if rr_type == Type::ANY || entry.rr_type == rr_type {
                rrsets.push(rrset.clone());
            } else if entry.rr_type == Type::CNAME && rr_type != Type::CNAME {
                cname = rrset.first();
            }
        }
    }

    if !rrsets.is_empty() {
        Some(SetResponse::Successful(rrsets))
    } else if let Some(record) = cname {
        Some(SetResponse::Cname(record))
    } else if nxrrset {
        Some(SetResponse::NxRrset(name.clone()))
    } else {
        None
    }
}

impl Lookup for Cache {
    fn lookup(&self, name: &Name, rr_type: Type, min_credibility: Credibility) -> SetResponse {
        Cache::lookup(self, name, rr_type, min_credibility)
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cache")
            .field("class", &self.class)
            .field("names", &self.len())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::{Rdata, Record};

    fn name(from: &str) -> Name {
        from.parse().unwrap()
    }

    fn a_rrset(owner: &str, ttl: u32, address: &str) -> Rrset {
        let mut rrset = Rrset::new(name(owner), Type::A, Class::IN, Ttl::from(ttl));
        rrset.push_rdata(&Rdata::new_a(address.parse().unwrap()));
        rrset
    }

    #[test]
    fn lookup_finds_cached_rrsets() {
        let cache = Cache::new(Class::IN);
        cache.add_rrset(&a_rrset("www.example.test.", 3600, "192.0.2.1"), Credibility::AUTH_ANSWER);
        match cache.lookup(&name("www.example.test."), Type::A, Credibility::NORMAL) {
            SetResponse::Successful(rrsets) => {
                assert_eq!(rrsets.len(), 1);
                assert_eq!(rrsets[0].owner, name("www.example.test."));
            }
            other => panic!("expected a hit, got {}", other),
        }
    }

    #[test]
    fn lookup_misses_are_unknown() {
        let cache = Cache::new(Class::IN);
        assert!(cache
            .lookup(&name("www.example.test."), Type::A, Credibility::NORMAL)
            .is_unknown());
    }

    #[test]
    fn lower_credibility_data_does_not_replace_higher() {
        let cache = Cache::new(Class::IN);
        let authoritative = a_rrset("www.example.test.", 3600, "192.0.2.1");
        let hearsay = a_rrset("www.example.test.", 3600, "203.0.113.66");
        cache.add_rrset(&authoritative, Credibility::AUTH_ANSWER);
        cache.add_rrset(&hearsay, Credibility::ADDITIONAL);
        match cache.lookup(&name("www.example.test."), Type::A, Credibility::ANY) {
            SetResponse::Successful(rrsets) => {
                assert_eq!(
                    rrsets[0].rdatas().next().unwrap().octets(),
                    b"\xc0\x00\x02\x01"
                );
            }
            other => panic!("expected a hit, got {}", other),
        }
    }

    #[test]
    fn equal_credibility_data_replaces() {
        let cache = Cache::new(Class::IN);
        let first = a_rrset("www.example.test.", 3600, "192.0.2.1");
        let second = a_rrset("www.example.test.", 3600, "192.0.2.2");
        cache.add_rrset(&first, Credibility::AUTH_ANSWER);
        cache.add_rrset(&second, Credibility::AUTH_ANSWER);
        match cache.lookup(&name("www.example.test."), Type::A, Credibility::NORMAL) {
            SetResponse::Successful(rrsets) => {
                assert_eq!(
                    rrsets[0].rdatas().next().unwrap().octets(),
                    b"\xc0\x00\x02\x02"
                );
            }
            other => panic!("expected a hit, got {}", other),
        }
    }

    #[test]
    fn min_credibility_filters_entries() {
        let cache = Cache::new(Class::IN);
        cache.add_rrset(
            &a_rrset("www.example.test.", 3600, "192.0.2.1"),
            Credibility::GLUE,
        );
        assert!(cache
            .lookup(&name("www.example.test."), Type::A, Credibility::NORMAL)
            .is_unknown());
        assert!(cache
            .lookup(&name("www.example.test."), Type::A, Credibility::ANY)
            .is_successful());
    }

    #[test]
    fn expired_entries_are_absent() {
        let cache = Cache::new(Class::IN);
        cache.add_rrset(
            &a_rrset("www.example.test.", 0, "192.0.2.1"),
            Credibility::AUTH_ANSWER,
        );
        // A zero TTL expires immediately.
        assert!(cache
            .lookup(&name("www.example.test."), Type::A, Credibility::NORMAL)
            .is_unknown());
    }

    #[test]
    fn negative_entries_produce_nxdomain_and_nxrrset() {
        let cache = Cache::new(Class::IN);
        cache.add_nxdomain(
            name("gone.example.test."),
            Ttl::from(300),
            Credibility::AUTH_AUTHORITY,
        );
        assert!(cache
            .lookup(&name("gone.example.test."), Type::A, Credibility::NORMAL)
            .is_nxdomain());

        cache.add_negative(
            name("www.example.test."),
            Type::AAAA,
            Ttl::from(300),
            Credibility::AUTH_AUTHORITY,
        );
        assert!(cache
            .lookup(&name("www.example.test."), Type::AAAA, Credibility::NORMAL)
            .is_nxrrset());
        // Other types at the same name are still unknown.
        assert!(cache
            .lookup(&name("www.example.test."), Type::A, Credibility::NORMAL)
            .is_unknown());
    }

    #[test]
    fn cached_delegations_are_reported_for_subdomains() {
        let cache = Cache::new(Class::IN);
        let mut ns = Rrset::new(name("example.test."), Type::NS, Class::IN, Ttl::from(3600));
        ns.push_rdata(&Rdata::new_name(&name("ns1.example.test.")));
        cache.add_rrset(&ns, Credibility::NONAUTH_AUTHORITY);
        match cache.lookup(&name("deep.www.example.test."), Type::A, Credibility::NORMAL) {
            SetResponse::Delegation(rrset) => assert_eq!(rrset.owner, name("example.test.")),
            other => panic!("expected a delegation, got {}", other),
        }
    }

    #[test]
    fn cached_answers_beat_cached_delegations() {
        let cache = Cache::new(Class::IN);
        let mut ns = Rrset::new(name("example.test."), Type::NS, Class::IN, Ttl::from(3600));
        ns.push_rdata(&Rdata::new_name(&name("ns1.example.test.")));
        cache.add_rrset(&ns, Credibility::NONAUTH_AUTHORITY);
        cache.add_rrset(
            &a_rrset("www.example.test.", 3600, "192.0.2.1"),
            Credibility::NONAUTH_ANSWER,
        );
        assert!(cache
            .lookup(&name("www.example.test."), Type::A, Credibility::NORMAL)
            .is_successful());
    }

    #[test]
    fn cached_dnames_redirect() {
        let cache = Cache::new(Class::IN);
        let mut dname = Rrset::new(name("old.example.test."), Type::DNAME, Class::IN, Ttl::from(3600));
        dname.push_rdata(&Rdata::new_dname(&name("new.example.test.")));
        cache.add_rrset(&dname, Credibility::AUTH_ANSWER);
        match cache.lookup(&name("www.old.example.test."), Type::A, Credibility::NORMAL) {
            SetResponse::Dname(record) => {
                assert_eq!(record.owner, name("old.example.test."));
            }
            other => panic!("expected a DNAME, got {}", other),
        }
    }

    #[test]
    fn add_message_caches_answers_and_negatives() {
        use crate::message::{Qclass, Qtype, Question};

        let cache = Cache::new(Class::IN);

        // An authoritative answer.
        let mut message = Message::new();
        message.header.qr = true;
        message.header.aa = true;
        message.add_question(Question {
            qname: name("www.example.test."),
            qtype: Qtype::from(Type::A),
            qclass: Qclass::from(Class::IN),
        });
        message.add_record(
            Record::new(
                name("www.example.test."),
                Type::A,
                Class::IN,
                Ttl::from(3600),
                Rdata::new_a("192.0.2.1".parse().unwrap()),
            ),
            Section::Answer,
        );
        cache.add_message(&message);
        assert!(cache
            .lookup(&name("www.example.test."), Type::A, Credibility::NORMAL)
            .is_successful());

        // A negative answer (NXDOMAIN with an SOA in authority).
        let mut negative = Message::new();
        negative.header.qr = true;
        negative.header.aa = true;
        negative.header.rcode = Rcode::NxDomain;
        negative.add_question(Question {
            qname: name("gone.example.test."),
            qtype: Qtype::from(Type::A),
            qclass: Qclass::from(Class::IN),
        });
        negative.add_record(
            Record::new(
                name("example.test."),
                Type::SOA,
                Class::IN,
                Ttl::from(3600),
                Rdata::new_soa(
                    &name("ns1.example.test."),
                    &name("admin.example.test."),
                    1,
                    3600,
                    900,
                    86400,
                    300,
                ),
            ),
            Section::Authority,
        );
        cache.add_message(&negative);
        assert!(cache
            .lookup(&name("gone.example.test."), Type::A, Credibility::NORMAL)
            .is_nxdomain());
    }
}
