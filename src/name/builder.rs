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

//! Implementation of the [`NameBuilder`] type.

use arrayvec::ArrayVec;

use super::{Error, Label, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_WIRE_LEN};

/// A builder to construct a [`Name`] label by label and octet by octet.
///
/// Octets are added to the current label with
/// [`try_push`](NameBuilder::try_push); the current label is completed
/// with [`next_label`](NameBuilder::next_label). [`finish`]
/// (NameBuilder::finish) produces a fully qualified [`Name`], requiring
/// that the input ended on a label boundary (that is, for textual
/// input, with a dot). [`finish_with_origin`]
/// (NameBuilder::finish_with_origin) instead completes a partially
/// qualified name by appending an origin name.
///
/// All DNS size limits (63-octet labels, 255-octet names) are enforced
/// as the name is built.
pub struct NameBuilder {
    wire: ArrayVec<u8, MAX_WIRE_LEN>,
    offsets: ArrayVec<u8, MAX_N_LABELS>,
    current: ArrayVec<u8, MAX_LABEL_LEN>,
}

impl NameBuilder {
    /// Creates a new `NameBuilder` with no content.
    pub fn new() -> Self {
        Self {
            wire: ArrayVec::new(),
            offsets: ArrayVec::new(),
            current: ArrayVec::new(),
        }
    }

    /// Appends an octet to the current label.
    pub fn try_push(&mut self, octet: u8) -> Result<(), Error> {
        self.current.try_push(octet).or(Err(Error::LabelTooLong))
    }

    /// Completes the current label and starts a new one.
    pub fn next_label(&mut self) -> Result<(), Error> {
        if self.current.is_empty() {
            return Err(Error::NullNonTerminal);
        }
        self.commit_current()
    }

    /// Appends a whole label. The current label must be empty.
    pub fn try_push_label(&mut self, label: &Label) -> Result<(), Error> {
        for &octet in label.octets() {
            self.try_push(octet)?;
        }
        self.next_label()
    }

    /// Finishes the name, which must be fully qualified (the input must
    /// have ended on a label boundary).
    pub fn finish(mut self) -> Result<Name, Error> {
        if !self.current.is_empty() {
            return Err(Error::NonNullTerminal);
        }
        self.append_null_label()?;
        Ok(Name::from_parts_unchecked(&self.wire, &self.offsets))
    }

    /// Finishes a partially qualified name by appending `origin`.
    pub fn finish_with_origin(mut self, origin: &Name) -> Result<Name, Error> {
        if !self.current.is_empty() {
            self.commit_current()?;
        }
        let base = self.wire.len();
        if base + origin.wire_repr().len() > MAX_WIRE_LEN
            || self.offsets.len() + origin.len() > MAX_N_LABELS
        {
            return Err(Error::NameTooLong);
        }
        self.wire
            .try_extend_from_slice(origin.wire_repr())
            .or(Err(Error::NameTooLong))?;
        for n in 0..origin.len() {
            self.offsets.push((base + origin.label_offset(n)) as u8);
        }
        Ok(Name::from_parts_unchecked(&self.wire, &self.offsets))
    }

    /// Moves the current label into the wire representation. The length
    /// check reserves one octet for the null label that every complete
    /// name ends with.
    fn commit_current(&mut self) -> Result<(), Error> {
        if self.wire.len() + 1 + self.current.len() + 1 > MAX_WIRE_LEN
            || self.offsets.len() + 2 > MAX_N_LABELS
        {
            return Err(Error::NameTooLong);
        }
        self.offsets.push(self.wire.len() as u8);
        self.wire.push(self.current.len() as u8);
        self.wire
            .try_extend_from_slice(&self.current)
            .or(Err(Error::NameTooLong))?;
        self.current.clear();
        Ok(())
    }

    /// Appends the terminal null label.
    fn append_null_label(&mut self) -> Result<(), Error> {
        if self.wire.len() + 1 > MAX_WIRE_LEN || self.offsets.len() + 1 > MAX_N_LABELS {
            return Err(Error::NameTooLong);
        }
        self.offsets.push(self.wire.len() as u8);
        self.wire.push(0);
        Ok(())
    }
}

impl Default for NameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_builds_names() {
        let mut builder = NameBuilder::new();
        for &octet in b"example" {
            builder.try_push(octet).unwrap();
        }
        builder.next_label().unwrap();
        for &octet in b"test" {
            builder.try_push(octet).unwrap();
        }
        builder.next_label().unwrap();
        let name = builder.finish().unwrap();
        assert_eq!(name.wire_repr(), b"\x07example\x04test\x00");
    }

    #[test]
    fn builder_rejects_unqualified_names() {
        let mut builder = NameBuilder::new();
        builder.try_push(b'x').unwrap();
        assert_eq!(builder.finish().unwrap_err(), Error::NonNullTerminal);
    }

    #[test]
    fn builder_rejects_empty_interior_labels() {
        let mut builder = NameBuilder::new();
        builder.try_push(b'x').unwrap();
        builder.next_label().unwrap();
        assert_eq!(builder.next_label().unwrap_err(), Error::NullNonTerminal);
    }

    #[test]
    fn builder_applies_origins() {
        let origin: Name = "example.test.".parse().unwrap();
        let mut builder = NameBuilder::new();
        for &octet in b"www" {
            builder.try_push(octet).unwrap();
        }
        let name = builder.finish_with_origin(&origin).unwrap();
        assert_eq!(name.wire_repr(), b"\x03www\x07example\x04test\x00");
    }

    #[test]
    fn builder_enforces_length_limit_with_origin() {
        let origin: Name = "example.test.".parse().unwrap();
        let mut builder = NameBuilder::new();
        for _ in 0..4 {
            for _ in 0..MAX_LABEL_LEN {
                builder.try_push(b'x').unwrap();
            }
            builder.next_label().unwrap();
        }
        assert_eq!(
            builder.finish_with_origin(&origin).unwrap_err(),
            Error::NameTooLong
        );
    }
}
