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

//! Implementation of data structures related to domain names.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::ops::Index;
use std::str::FromStr;

use lazy_static::lazy_static;

mod builder;
mod error;
mod label;
mod wire;
pub use builder::NameBuilder;
pub use error::Error;
pub use label::{Label, LabelBuf};

/// The maximum number of labels in a domain name.
const MAX_N_LABELS: usize = 128;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

/// The maximum number of compression pointers that will be followed
/// when decompressing a single name. The backward-pointing rule already
/// prevents loops; this additionally bounds the total work an
/// adversarially compressed message can demand.
const MAX_POINTER_CHASES: usize = 128;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// A domain name.
///
/// A `Name` is an immutable, owned, fully qualified domain name. It
/// stores the uncompressed on-the-wire representation defined in
/// [RFC 1035 § 3.1] together with the offset of each label, so label
/// access is O(1).
///
/// `Name`s can be constructed in several ways:
///
/// * through the [`FromStr`] implementation;
/// * through a [`NameBuilder`];
/// * from uncompressed on-the-wire names through
///   [`Name::try_from_uncompressed`] and
///   [`Name::try_from_uncompressed_all`]; and
/// * from compressed on-the-wire names through
///   [`Name::try_from_compressed`].
///
/// Comparisons ([`PartialEq`], [`Ord`], [`Hash`]) treat ASCII letters
/// case-insensitively, while the internal representation preserves
/// case (see [RFC 4343]).
///
/// [RFC 1035 § 3.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.1
/// [RFC 4343]: https://datatracker.ietf.org/doc/html/rfc4343
#[derive(Clone)]
pub struct Name {
    wire: Box<[u8]>,
    offsets: Box<[u8]>,
}

lazy_static! {
    static ref ROOT: Name = Name::from_parts_unchecked(&[0], &[0]);
}

impl Name {
    /// Constructs a `Name` from a validated wire representation and
    /// label offsets. For use within this module only; callers must
    /// have validated both.
    pub(self) fn from_parts_unchecked(wire: &[u8], offsets: &[u8]) -> Self {
        Self {
            wire: wire.into(),
            offsets: offsets.into(),
        }
    }

    /// Returns the offset of label `n` in the `Name`'s on-the-wire
    /// representation.
    fn label_offset(&self, n: usize) -> usize {
        self.offsets[n] as usize
    }

    /// Returns a reference to the `Name` representing the DNS root,
    /// `.`.
    pub fn root() -> &'static Name {
        &ROOT
    }

    /// Returns the number of labels in this `Name`, including the
    /// terminal null label.
    #[allow(clippy::len_without_is_empty)] // A domain name is never empty!
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns whether the `Name` is the DNS root `.`.
    pub fn is_root(&self) -> bool {
        self.len() == 1
    }

    /// Returns whether the `Name` is a wildcard domain name (i.e.,
    /// whether its first label is `*`).
    pub fn is_wildcard(&self) -> bool {
        self[0].is_asterisk()
    }

    /// Returns an iterator over labels in this `Name`.
    pub fn labels(&self) -> Labels {
        Labels {
            name: self,
            front: 0,
            back: self.len(),
        }
    }

    /// Returns whether this `Name` is equal to or a subdomain of
    /// `other`.
    pub fn eq_or_subdomain_of(&self, other: &Name) -> bool {
        self.len() >= other.len()
            && self
                .labels()
                .rev()
                .zip(other.labels().rev())
                .all(|(a, b)| a == b)
    }

    /// Returns the superdomain obtained by skipping the first `skip`
    /// labels of the `Name`, or `None` if there aren't enough labels.
    pub fn superdomain(&self, skip: usize) -> Option<Name> {
        if skip < self.len() {
            let start = self.label_offset(skip);
            let offsets: Vec<u8> = self.offsets[skip..]
                .iter()
                .map(|offset| offset - start as u8)
                .collect();
            Some(Self::from_parts_unchecked(&self.wire[start..], &offsets))
        } else {
            None
        }
    }

    /// Returns a new `Name` with `label` prepended, failing if the
    /// result would exceed the DNS name length limit.
    pub fn prepend(&self, label: &Label) -> Result<Name, Error> {
        if label.is_null() {
            return Err(Error::NullNonTerminal);
        }
        let added = label.len() + 1;
        if self.wire.len() + added > MAX_WIRE_LEN || self.len() + 1 > MAX_N_LABELS {
            return Err(Error::NameTooLong);
        }
        let mut wire = Vec::with_capacity(self.wire.len() + added);
        wire.push(label.len() as u8);
        wire.extend_from_slice(label.octets());
        wire.extend_from_slice(&self.wire);
        let mut offsets = Vec::with_capacity(self.len() + 1);
        offsets.push(0);
        offsets.extend(self.offsets.iter().map(|offset| offset + added as u8));
        Ok(Self::from_parts_unchecked(&wire, &offsets))
    }

    /// Replaces the suffix `old` of this `Name` with `new`. This is the
    /// substitution that DNAME redirection ([RFC 6672 § 2.2]) performs.
    ///
    /// Returns `None` if this `Name` is not a strict subdomain of
    /// `old`, and `Some(Err(Error::NameTooLong))` if the substituted
    /// name would not fit in 255 octets.
    ///
    /// [RFC 6672 § 2.2]: https://datatracker.ietf.org/doc/html/rfc6672#section-2.2
    pub fn rebase(&self, old: &Name, new: &Name) -> Option<Result<Name, Error>> {
        if self.len() <= old.len() || !self.eq_or_subdomain_of(old) {
            return None;
        }
        let kept = self.len() - old.len();
        let prefix = self.wire_repr_to(kept);
        if prefix.len() + new.wire_repr().len() > MAX_WIRE_LEN || kept + new.len() > MAX_N_LABELS {
            return Some(Err(Error::NameTooLong));
        }
        let mut wire = Vec::with_capacity(prefix.len() + new.wire_repr().len());
        wire.extend_from_slice(prefix);
        wire.extend_from_slice(new.wire_repr());
        let mut offsets = Vec::with_capacity(kept + new.len());
        offsets.extend_from_slice(&self.offsets[..kept]);
        offsets.extend(
            new.offsets
                .iter()
                .map(|offset| offset + prefix.len() as u8),
        );
        Some(Ok(Self::from_parts_unchecked(&wire, &offsets)))
    }

    /// Returns a copy of this `Name` with all ASCII letters lowercased.
    /// This is the canonical form of [RFC 4034 § 6.2], used for DNSSEC
    /// signing and TSIG digests.
    ///
    /// [RFC 4034 § 6.2]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.2
    pub fn to_lowercase(&self) -> Name {
        let mut wire = self.wire.clone();
        for n in 0..self.len() {
            let start = self.label_offset(n) + 1;
            let end = start + self.wire[start - 1] as usize;
            wire[start..end].make_ascii_lowercase();
        }
        Self {
            wire,
            offsets: self.offsets.clone(),
        }
    }

    /// Tries to parse a compressed name present at index `start` of the
    /// provided buffer. Pointers are followed; indices given in
    /// pointers are treated as equivalent to indices in `octets` (so
    /// generally one will pass an entire DNS message in `octets`). Two
    /// things are returned on success:
    ///
    /// * the parsed `Name`; and
    /// * the number of contiguous octets read at `start` (equivalently,
    ///   the number of octets to skip after `start` to read the next
    ///   field when parsing a DNS message).
    pub fn try_from_compressed(octets: &[u8], start: usize) -> Result<(Self, usize), Error> {
        wire::parse_compressed_name(octets, start)
    }

    /// Tries to parse an uncompressed name present at the start of the
    /// provided buffer. The name need not occupy the entire buffer;
    /// extra data is ignored. If the name is valid, the `Name` is
    /// returned along with its length in octets.
    pub fn try_from_uncompressed(octets: &[u8]) -> Result<(Self, usize), Error> {
        wire::parse_uncompressed_name(octets, false)
    }

    /// Like [`Name::try_from_uncompressed`], but in addition fails if
    /// there is extra data in the buffer after the name.
    pub fn try_from_uncompressed_all(octets: &[u8]) -> Result<Self, Error> {
        wire::parse_uncompressed_name(octets, true).map(|(name, _)| name)
    }

    /// Validates an uncompressed name present at the start of the
    /// provided buffer without allocating a `Name`. Extra data after
    /// the name is ignored. The length of the name in octets is
    /// returned.
    pub fn validate_uncompressed(octets: &[u8]) -> Result<usize, Error> {
        wire::validate_uncompressed_name(octets, false)
    }

    /// Like [`Name::validate_uncompressed`], but in addition fails if
    /// there is extra data in the buffer after the name.
    pub fn validate_uncompressed_all(octets: &[u8]) -> Result<(), Error> {
        wire::validate_uncompressed_name(octets, true).and(Ok(()))
    }

    /// Tries to skip a compressed name at the beginning of `octets`.
    /// This continues until the end of the name or the first pointer
    /// label, whichever comes first, and returns the number of octets
    /// read.
    pub fn skip_compressed(octets: &[u8]) -> Result<usize, Error> {
        wire::skip_compressed_name(octets)
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// `Name`.
    pub fn wire_repr(&self) -> &[u8] {
        &self.wire
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// first `n` labels of the `Name`. This will panic if
    /// `n > self.len()`.
    pub fn wire_repr_to(&self, n: usize) -> &[u8] {
        if n == self.len() {
            self.wire_repr()
        } else {
            &self.wire[..self.label_offset(n)]
        }
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// `Name` starting with the `n`-th label. If `n == self.len()`,
    /// this returns an empty slice; if `n > self.len()`, this panics.
    pub fn wire_repr_from(&self, n: usize) -> &[u8] {
        if n == self.len() {
            &[]
        } else {
            &self.wire[self.label_offset(n)..]
        }
    }
}

impl Index<usize> for Name {
    type Output = Label;

    fn index(&self, index: usize) -> &Self::Output {
        let offset = self.label_offset(index);
        let len = self.wire[offset] as usize;
        let start = offset + 1;
        Label::from_unchecked(&self.wire[start..start + len])
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.len() <= 1 {
            f.write_str(".")
        } else {
            for n in 0..self.len() - 1 {
                write!(f, "{}.", &self[n])?;
            }
            Ok(())
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.labels().zip(other.labels()).all(|(a, b)| a == b)
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The [`Ord`] implementation for `Name` employs DNSSEC's canonical
/// ordering of domain names. Per [RFC 4034 § 6.1], `Name`s are ordered
/// as strings of labels read from right to left.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.labels()
            .rev()
            .zip(other.labels().rev())
            .find_map(|(a, b)| Some(a.cmp(b)).filter(|ordering| ordering.is_ne()))
            .unwrap_or_else(|| self.len().cmp(&other.len()))
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels() {
            label.hash(state);
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATION OVER A NAME'S LABELS                                     //
////////////////////////////////////////////////////////////////////////

/// An iterator over the [`Label`]s in a [`Name`].
///
/// To use this iterator, construct one from a [`Name`] using
/// [`Name::labels`].
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    name: &'a Name,
    front: usize,
    back: usize,
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a Label;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            let this_one = self.front;
            self.front += 1;
            Some(&self.name[this_one])
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Labels<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back > self.front {
            self.back -= 1;
            Some(&self.name[self.back])
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Labels<'_> {}

impl FusedIterator for Labels<'_> {}

////////////////////////////////////////////////////////////////////////
// PARSING OF NAMES FROM RUST STRINGS                                 //
////////////////////////////////////////////////////////////////////////

/// Allows for conversion of a Rust [`str`] into a [`Name`]. The passed
/// string must be strictly ASCII and fully qualified. Escape sequences
/// as defined by [RFC 4343 § 2.1] are supported.
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::StrEmpty);
        } else if s == "." {
            return Ok(Name::root().clone());
        }

        let mut remaining_octets: &[u8] = s.as_ref();
        let mut builder = NameBuilder::new();

        // NOTE: to check that the string is ASCII, it suffices to check
        // that each octet is ASCII as we go, since all multi-byte
        // characters start with an octet that is not ASCII.
        while let Some(&octet) = remaining_octets.first() {
            if octet == b'\\' {
                let (value, consumed) = parse_escape(&remaining_octets[1..])?;
                builder.try_push(value)?;
                remaining_octets = &remaining_octets[consumed + 1..];
            } else if octet == b'.' {
                builder.next_label()?;
                remaining_octets = &remaining_octets[1..];
            } else if !octet.is_ascii() {
                return Err(Error::StrNotAscii);
            } else {
                builder.try_push(octet)?;
                remaining_octets = &remaining_octets[1..];
            }
        }
        builder.finish()
    }
}

/// Parses an escape sequence. We expect `remaining_octets` to start
/// with the octet immediately *after* the backslash that introduces the
/// escape sequence.
fn parse_escape(remaining_octets: &[u8]) -> Result<(u8, usize), Error> {
    if remaining_octets.is_empty() {
        Err(Error::InvalidEscape)
    } else if remaining_octets[0].is_ascii_digit() {
        if remaining_octets.len() < 3
            || !remaining_octets[1].is_ascii_digit()
            || !remaining_octets[2].is_ascii_digit()
        {
            Err(Error::InvalidEscape)
        } else {
            let hundreds = (remaining_octets[0] - b'0') as usize;
            let tens = (remaining_octets[1] - b'0') as usize;
            let ones = (remaining_octets[2] - b'0') as usize;
            let value = 100 * hundreds + 10 * tens + ones;
            if value > 255 {
                Err(Error::InvalidEscape)
            } else {
                Ok((value as u8, 3))
            }
        }
    } else {
        Ok((remaining_octets[0], 1))
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_expected_characteristics() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.len(), 1);
        assert_eq!(root.wire_repr(), &[0]);
    }

    #[test]
    fn is_wildcard_works() {
        let wildcard: Name = "*.quagmire.test.".parse().unwrap();
        let not_a_wildcard: Name = "quagmire.test.".parse().unwrap();
        let inner_asterisk: Name = "x.*.quagmire.test.".parse().unwrap();
        assert!(wildcard.is_wildcard());
        assert!(!not_a_wildcard.is_wildcard());
        assert!(!inner_asterisk.is_wildcard());
    }

    #[test]
    fn superdomain_works() {
        let subdomain: Name = "subdomain.example.test.".parse().unwrap();
        let domain: Name = "example.test.".parse().unwrap();
        let tld: Name = "test.".parse().unwrap();
        assert_eq!(subdomain.superdomain(0).as_ref(), Some(&subdomain));
        assert_eq!(subdomain.superdomain(1), Some(domain));
        assert_eq!(subdomain.superdomain(2), Some(tld));
        assert_eq!(subdomain.superdomain(3).as_ref(), Some(Name::root()));
        assert_eq!(subdomain.superdomain(4), None);
    }

    #[test]
    fn labels_iterator_works() {
        let name: Name = "a.b.example.test.".parse().unwrap();
        let mut labels = name.labels();
        assert_eq!(labels.next(), Some(b"a".into()));
        assert_eq!(labels.next(), Some(b"b".into()));
        assert_eq!(labels.next(), Some(b"example".into()));
        assert_eq!(labels.next(), Some(b"test".into()));
        assert_eq!(labels.next(), Some(Label::null()));
        assert_eq!(labels.next(), None);
    }

    #[test]
    fn eq_or_subdomain_of_works() {
        let subdomain: Name = "subdomain.example.test.".parse().unwrap();
        let domain: Name = "example.test.".parse().unwrap();
        let other: Name = "other.test.".parse().unwrap();
        let root = Name::root();
        assert!(subdomain.eq_or_subdomain_of(&subdomain));
        assert!(subdomain.eq_or_subdomain_of(&domain));
        assert!(subdomain.eq_or_subdomain_of(root));
        assert!(!domain.eq_or_subdomain_of(&subdomain));
        assert!(!domain.eq_or_subdomain_of(&other));
        assert!(!root.eq_or_subdomain_of(&domain));
    }

    #[test]
    fn prepend_works() {
        let domain: Name = "example.test.".parse().unwrap();
        let prepended = domain.prepend(Label::asterisk()).unwrap();
        assert_eq!(prepended.wire_repr(), b"\x01*\x07example\x04test\x00");
        assert!(prepended.is_wildcard());
    }

    #[test]
    fn prepend_rejects_overlong_results() {
        let mut name = Name::root().clone();
        let label: &Label = b"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx".into();
        loop {
            match name.prepend(label) {
                Ok(longer) => name = longer,
                Err(e) => {
                    assert_eq!(e, Error::NameTooLong);
                    break;
                }
            }
            assert!(name.wire_repr().len() <= 255);
        }
    }

    #[test]
    fn rebase_substitutes_suffixes() {
        let name: Name = "www.sub.example.test.".parse().unwrap();
        let old: Name = "example.test.".parse().unwrap();
        let new: Name = "example.invalid.".parse().unwrap();
        let rebased = name.rebase(&old, &new).unwrap().unwrap();
        assert_eq!(
            rebased.wire_repr(),
            b"\x03www\x03sub\x07example\x07invalid\x00"
        );
    }

    #[test]
    fn rebase_requires_strict_subdomains() {
        let name: Name = "example.test.".parse().unwrap();
        let other: Name = "other.test.".parse().unwrap();
        let new: Name = "example.invalid.".parse().unwrap();
        assert!(name.rebase(&name, &new).is_none());
        assert!(name.rebase(&other, &new).is_none());
    }

    #[test]
    fn rebase_rejects_overlong_results() {
        let long_label = "x".repeat(63);
        let long_name: Name = format!("{0}.{0}.{0}.test.", long_label).parse().unwrap();
        let old: Name = "test.".parse().unwrap();
        let target: Name = format!("{0}.quagmire.test.", long_label).parse().unwrap();
        assert_eq!(
            long_name.rebase(&old, &target),
            Some(Err(Error::NameTooLong))
        );
    }

    #[test]
    fn to_lowercase_works() {
        let name: Name = "UPPERCASE.Domain.Test.".parse().unwrap();
        assert_eq!(
            name.to_lowercase().wire_repr(),
            b"\x09uppercase\x06domain\x04test\x00"
        );
        // The original is unchanged.
        assert_eq!(name.wire_repr(), b"\x09UPPERCASE\x06Domain\x04Test\x00");
    }

    #[test]
    fn names_compare_case_insensitively() {
        let lower: Name = "example.test.".parse().unwrap();
        let upper: Name = "EXAMPLE.TEST.".parse().unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn ord_works() {
        // This ordered list is from RFC 4034 § 6.1, which defines the
        // canonical ordering of domain names.
        let names: Vec<Name> = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ]
        .into_iter()
        .map(|n| n.parse().unwrap())
        .collect();

        for (i, ni) in names.iter().enumerate() {
            for (j, nj) in names.iter().enumerate() {
                assert_eq!(i.cmp(&j), ni.cmp(nj));
            }
        }
    }

    #[test]
    fn fromstr_works() {
        let name: Name = "example.test.".parse().unwrap();
        assert_eq!(name.wire_repr(), b"\x07example\x04test\x00");
    }

    #[test]
    fn fromstr_works_for_root() {
        let name: Name = ".".parse().unwrap();
        assert_eq!(&name, Name::root());
    }

    #[test]
    fn fromstr_rejects_empty() {
        assert_eq!("".parse::<Name>(), Err(Error::StrEmpty));
    }

    #[test]
    fn fromstr_rejects_non_ascii() {
        assert_eq!("✈.aero.".parse::<Name>(), Err(Error::StrNotAscii));
    }

    #[test]
    fn fromstr_rejects_non_fqdn() {
        assert_eq!("non.fqdn".parse::<Name>(), Err(Error::NonNullTerminal));
    }

    #[test]
    fn fromstr_rejects_long_label() {
        assert_eq!(
            "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx.".parse::<Name>(),
            Err(Error::LabelTooLong)
        );
    }

    #[test]
    fn fromstr_rejects_long_name() {
        assert_eq!(
            "x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.\
             x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.\
             x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.\
             x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x."
                .parse::<Name>(),
            Err(Error::NameTooLong)
        );
    }

    #[test]
    fn fromstr_rejects_null_non_terminal() {
        assert_eq!("a.b..c.".parse::<Name>(), Err(Error::NullNonTerminal));
    }

    #[test]
    fn fromstr_escaping_works() {
        let escaped: Name = "\\000.\\\\\\..".parse().unwrap();
        assert_eq!(escaped.wire_repr(), b"\x01\x00\x02\\.\x00");
    }

    #[test]
    fn fromstr_rejects_invalid_escapes() {
        assert_eq!("\\00".parse::<Name>(), Err(Error::InvalidEscape));
        assert_eq!("\\00x.".parse::<Name>(), Err(Error::InvalidEscape));
        assert_eq!("\\256.".parse::<Name>(), Err(Error::InvalidEscape));
    }

    #[test]
    fn display_round_trips() {
        for text in ["example.test.", "*.example.test.", "."] {
            let name: Name = text.parse().unwrap();
            assert_eq!(name.to_string(), text);
        }
    }
}
