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

//! Parsing and validation of on-the-wire domain names.

use arrayvec::ArrayVec;

use super::{Error, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_POINTER_CHASES, MAX_WIRE_LEN};

////////////////////////////////////////////////////////////////////////
// VALIDATION AND PARSING OF UNCOMPRESSED ON-THE-WIRE NAMES           //
////////////////////////////////////////////////////////////////////////

/// Parses an uncompressed name present at the beginning of `octets`.
/// The parameter `use_all` controls whether to expect the name to
/// occupy the entire buffer. This is the implementation of
/// [`Name::try_from_uncompressed`] and
/// [`Name::try_from_uncompressed_all`].
pub fn parse_uncompressed_name(octets: &[u8], use_all: bool) -> Result<(Name, usize), Error> {
    let wire_len = validate_uncompressed_name(octets, use_all)?;
    let mut offsets = ArrayVec::<u8, MAX_N_LABELS>::new();
    let mut offset = 0;
    while offset < wire_len {
        offsets.push(offset as u8);
        offset += octets[offset] as usize + 1;
    }
    Ok((
        Name::from_parts_unchecked(&octets[..wire_len], &offsets),
        wire_len,
    ))
}

/// Validates an uncompressed name present at the beginning of `octets`.
/// The parameter `use_all` controls whether to expect the name to
/// occupy the entire buffer. This is the implementation of
/// [`Name::validate_uncompressed`] and
/// [`Name::validate_uncompressed_all`].
pub fn validate_uncompressed_name(octets: &[u8], use_all: bool) -> Result<usize, Error> {
    let mut offset = 0;
    let mut finished = false;
    while !finished && offset < octets.len() {
        let label_len = octets[offset];
        if label_len > (MAX_LABEL_LEN as u8) {
            return Err(Error::LabelTooLong);
        } else if label_len == 0 {
            finished = true;
        }
        offset += label_len as usize + 1;
        if offset > MAX_WIRE_LEN {
            return Err(Error::NameTooLong);
        }
    }

    if !finished {
        Err(Error::UnexpectedEom)
    } else if use_all && offset < octets.len() {
        Err(Error::ExtraData)
    } else {
        Ok(offset)
    }
}

////////////////////////////////////////////////////////////////////////
// PARSING OF COMPRESSED ON-THE-WIRE NAMES                            //
////////////////////////////////////////////////////////////////////////

/// Parses a compressed name starting at index `start` of `octets`.
/// Pointers are followed. Indices given in pointers are treated as
/// indices of `octets`, so the intention is for an entire DNS message
/// to be passed in `octets`. This is the implementation of
/// [`Name::try_from_compressed`].
pub fn parse_compressed_name(octets: &[u8], start: usize) -> Result<(Name, usize), Error> {
    let mut next_chunk = Some(start);
    let mut wire_len_of_first_chunk = None;
    let mut pointers_followed = 0;

    let mut offsets = ArrayVec::<u8, MAX_N_LABELS>::new();
    let mut wire_repr = ArrayVec::<u8, MAX_WIRE_LEN>::new();

    while let Some(chunk_start) = next_chunk {
        let mut finished_with_chunk = false;
        let mut index = chunk_start;

        while !finished_with_chunk {
            let len = *octets.get(index).ok_or(Error::UnexpectedEom)?;
            if len & 0xc0 == 0xc0 {
                // The pointer-chase bound bounds the work done on
                // maliciously compressed messages; the backward-only
                // rule already rules out loops.
                pointers_followed += 1;
                if pointers_followed > MAX_POINTER_CHASES {
                    return Err(Error::TooManyPointers);
                }
                next_chunk = Some(parse_pointer(octets, chunk_start, index)? as usize);
                index += 2;
                finished_with_chunk = true;
            } else if len > (MAX_LABEL_LEN as u8) {
                return Err(Error::LabelTooLong);
            } else {
                offsets.push(wire_repr.len() as u8);
                let end_of_label = index + len as usize + 1;
                if len == 0 {
                    next_chunk = None;
                    finished_with_chunk = true;
                } else if end_of_label >= octets.len() {
                    return Err(Error::UnexpectedEom);
                }
                wire_repr
                    .try_extend_from_slice(
                        octets.get(index..end_of_label).ok_or(Error::UnexpectedEom)?,
                    )
                    .or(Err(Error::NameTooLong))?;
                index = end_of_label;
            }
        }

        wire_len_of_first_chunk.get_or_insert(index - chunk_start);
    }

    Ok((
        Name::from_parts_unchecked(&wire_repr, &offsets),
        wire_len_of_first_chunk.unwrap(),
    ))
}

/// Parses a pointer at `index` in `octets`. This also checks that the
/// pointer refers to an index *earlier* than the start of the chunk it
/// is in (`chunk_start`).
fn parse_pointer(octets: &[u8], chunk_start: usize, index: usize) -> Result<u16, Error> {
    if index + 1 < octets.len() {
        let pointer_bytes = [octets[index], octets[index + 1]];
        let pointer = u16::from_be_bytes(pointer_bytes) & (!0xc000);
        if (pointer as usize) >= chunk_start {
            // According to RFC 1035 § 4.1.4, pointers point to a
            // *prior* occurrence of the name. (Importantly, this
            // prevents loops!)
            Err(Error::InvalidPointer)
        } else {
            Ok(pointer)
        }
    } else {
        Err(Error::UnexpectedEom)
    }
}

////////////////////////////////////////////////////////////////////////
// SKIPPING OF COMPRESSED ON-THE-WIRE NAMES                           //
////////////////////////////////////////////////////////////////////////

/// Skips a compressed name starting at the beginning of `octets`; this
/// is the implementation of [`Name::skip_compressed`]. This continues
/// until the end of the name or the first pointer label, whichever
/// comes first, and returns the number of octets read. The pointer
/// itself, if present, is not checked for validity.
pub fn skip_compressed_name(octets: &[u8]) -> Result<usize, Error> {
    // When set, min_uncompressed_and_chunk_lens has two fields:
    //
    // 1. the lower bound for the on-the-wire length of the name when
    //    uncompressed, given what we saw in the first chunk; and
    // 2. the length of the first chunk.
    //
    // They differ by one when the first chunk ends with a pointer
    // label.
    let mut offset = 0;
    let mut min_uncompressed_and_chunk_lens = None;

    while offset < octets.len() {
        let label_len = octets[offset];
        if label_len & 0xc0 == 0xc0 {
            if offset + 2 > octets.len() {
                return Err(Error::UnexpectedEom);
            }
            min_uncompressed_and_chunk_lens = Some((offset + 1, offset + 2));
            break;
        } else if label_len > (MAX_LABEL_LEN as u8) {
            return Err(Error::LabelTooLong);
        } else if label_len == 0 {
            min_uncompressed_and_chunk_lens = Some((offset + 1, offset + 1));
            break;
        } else {
            offset += 1 + label_len as usize;
        }
        if offset > MAX_WIRE_LEN {
            return Err(Error::NameTooLong);
        }
    }

    if let Some((min_uncompressed_len, chunk_len)) = min_uncompressed_and_chunk_lens {
        if min_uncompressed_len > MAX_WIRE_LEN {
            Err(Error::NameTooLong)
        } else {
            Ok(chunk_len)
        }
    } else {
        Err(Error::UnexpectedEom)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
