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

//! Implementation of the [`Label`] and [`LabelBuf`] types.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use arrayvec::ArrayVec;

use super::{Error, MAX_LABEL_LEN};

////////////////////////////////////////////////////////////////////////
// LABELS                                                             //
////////////////////////////////////////////////////////////////////////

/// The label given to a node in the Domain Name System's tree
/// structure.
///
/// `Label` is essentially a wrapper over `[u8]` that can only be
/// constructed if the slice is a valid DNS label (that is, if it is no
/// more than 63 octets long).
///
/// Note that in accordance with [RFC 1034 § 3.1]:
///
/// * comparisons between `Label`s are case-insensitive assuming ASCII,
///   but
/// * case is preserved in the internal representation.
///
/// [RFC 1034 § 3.1]: https://tools.ietf.org/html/rfc1034#section-3.1
#[repr(transparent)]
pub struct Label {
    octets: [u8],
}

#[allow(clippy::len_without_is_empty)] // Following DNS terminology, we have is_null().
impl Label {
    /// Returns the asterisk label `*`, which has a special meaning in
    /// the DNS lookup process.
    pub fn asterisk() -> &'static Self {
        static ASTERISK_LABEL: &[u8; 1] = b"*";
        Self::from_unchecked(ASTERISK_LABEL)
    }

    /// Wraps up a `&[u8]` as a `Label` without checking its length for
    /// validity. To be used only within the parent module, and only
    /// after performing the length check manually.
    pub(super) fn from_unchecked(octets: &[u8]) -> &Self {
        unsafe { &*(octets as *const [u8] as *const Label) }
    }

    /// Returns whether this `Label` is the asterisk label.
    pub fn is_asterisk(&self) -> bool {
        self == Self::asterisk()
    }

    /// Returns whether this `Label` is the null (zero-length) label.
    pub fn is_null(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the number of octets in this `Label`.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns the null (zero-length) `Label`.
    pub fn null() -> &'static Self {
        Self::from_unchecked(&[])
    }

    /// Returns the octets of this `Label`.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }
}

impl<'a> TryFrom<&'a [u8]> for &'a Label {
    type Error = Error;

    fn try_from(octets: &'a [u8]) -> Result<Self, Self::Error> {
        if octets.len() > MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else {
            Ok(Label::from_unchecked(octets))
        }
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for &'a Label {
    fn from(octets: &'a [u8; N]) -> Self {
        // A compile-time length check would be nicer, but stable Rust
        // does not let us express it yet.
        assert!(N <= MAX_LABEL_LEN);
        Label::from_unchecked(octets)
    }
}

impl ToOwned for Label {
    type Owned = LabelBuf;

    fn to_owned(&self) -> Self::Owned {
        LabelBuf {
            octets: self.octets().iter().copied().collect(),
        }
    }
}

/// When a `Label` is displayed, periods, backslashes, and octets that
/// are not ASCII graphic characters are escaped in accordance with
/// RFC 1035 § 5.1 and RFC 4343 § 2.1:
/// * periods are escaped `\.`;
/// * backslashes are escaped `\\`;
/// * all other ASCII graphic characters are not escaped; and
/// * all other octets are escaped `\xyz`, where `xyz` is the
///   three-digit zero-padded decimal representation of the octet.
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for octet in self.octets() {
            if *octet == b'.' {
                f.write_str("\\.")?;
            } else if *octet == b'\\' {
                f.write_str("\\\\")?;
            } else if octet.is_ascii_graphic() {
                write!(f, "{}", *octet as char)?;
            } else {
                write!(f, "\\{:03}", *octet)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

/// In accordance with RFC 1034 § 3.1 (clarified by RFC 4343),
/// comparison of `Label`s is ASCII-case-insensitive.
impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.octets().eq_ignore_ascii_case(other.octets())
    }
}

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `Label`s are ordered per the DNSSEC canonical ordering of [RFC 4034
/// § 6.1]: as left-justified octet strings with uppercase ASCII letters
/// treated as lowercase.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        let self_lower = self.octets().iter().map(u8::to_ascii_lowercase);
        let other_lower = other.octets().iter().map(u8::to_ascii_lowercase);
        self_lower.cmp(other_lower)
    }
}

/// The [`Hash`] implementation lowercases octets so that it is
/// consistent with the case-insensitive [`PartialEq`] implementation.
impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for octet in self.octets() {
            state.write_u8(octet.to_ascii_lowercase());
        }
    }
}

////////////////////////////////////////////////////////////////////////
// OWNED LABELS                                                       //
////////////////////////////////////////////////////////////////////////

/// An owned DNS label.
///
/// This is the owned counterpart of [`Label`], analogous to how
/// [`String`] corresponds to [`str`]. It is backed by a fixed-size
/// inline buffer, since labels are at most 63 octets long.
#[derive(Clone)]
pub struct LabelBuf {
    octets: ArrayVec<u8, MAX_LABEL_LEN>,
}

impl LabelBuf {
    /// Returns a borrowed [`Label`] view of this `LabelBuf`.
    pub fn as_label(&self) -> &Label {
        Label::from_unchecked(&self.octets)
    }
}

impl TryFrom<&[u8]> for LabelBuf {
    type Error = Error;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        <&Label>::try_from(octets).map(Label::to_owned)
    }
}

impl Borrow<Label> for LabelBuf {
    fn borrow(&self) -> &Label {
        self.as_label()
    }
}

impl AsRef<Label> for LabelBuf {
    fn as_ref(&self) -> &Label {
        self.as_label()
    }
}

impl fmt::Display for LabelBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.as_label().fmt(f)
    }
}

impl fmt::Debug for LabelBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.as_label().fmt(f)
    }
}

impl PartialEq for LabelBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_label() == other.as_label()
    }
}

impl Eq for LabelBuf {}

impl PartialOrd for LabelBuf {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LabelBuf {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_label().cmp(other.as_label())
    }
}

impl Hash for LabelBuf {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_label().hash(state)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
