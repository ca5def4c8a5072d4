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

//! Handling of the `$GENERATE` directive.
//!
//! `$GENERATE range lhs [ttl] [class] type rhs` expands into one
//! record per value of the range, with `$` in the owner (lhs) and
//! RDATA (rhs) templates replaced by the value. The BIND-style
//! modifier `${offset,width,radix}` is supported, with radix `d`, `o`,
//! `x`, or `X`; `\$` produces a literal dollar sign.

use std::fmt::Write;

use super::error::{Error, ErrorKind, Position, Result};

/// A parsed `$GENERATE` range: `start-stop[/step]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct GenerateRange {
    pub start: u32,
    pub stop: u32,
    pub step: u32,
}

/// The largest number of records one `$GENERATE` may expand to. This
/// bounds memory use on hostile input; it is far above what real zone
/// files do.
const MAX_GENERATED: u64 = 1 << 16;

impl GenerateRange {
    /// Parses `start-stop[/step]`.
    pub fn parse(text: &str, position: Position) -> Result<Self> {
        let malformed = || Error::new(position, ErrorKind::BadGenerate("malformed range"));
        let (bounds, step) = match text.split_once('/') {
            Some((bounds, step)) => (bounds, step.parse().or_else(|_| Err(malformed()))?),
            None => (text, 1),
        };
        let (start, stop) = bounds.split_once('-').ok_or_else(malformed)?;
        let range = Self {
            start: start.parse().or_else(|_| Err(malformed()))?,
            stop: stop.parse().or_else(|_| Err(malformed()))?,
            step,
        };
        if range.step == 0 || range.stop < range.start {
            return Err(malformed());
        }
        let count = (range.stop - range.start) as u64 / range.step as u64 + 1;
        if count > MAX_GENERATED {
            return Err(Error::new(
                position,
                ErrorKind::BadGenerate("range expands to too many records"),
            ));
        }
        Ok(range)
    }

    /// Returns an iterator over the range's values.
    pub fn values(self) -> impl Iterator<Item = u32> {
        (self.start..=self.stop).step_by(self.step as usize)
    }
}

/// Substitutes a `$GENERATE` template for one value of the range.
pub(super) fn substitute(template: &str, value: u32, position: Position) -> Result<String> {
    let malformed =
        |detail: &'static str| Error::new(position, ErrorKind::BadGenerate(detail));
    let mut output = String::with_capacity(template.len() + 8);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => output.push('$'),
                Some(other) => {
                    output.push('\\');
                    output.push(other);
                }
                None => return Err(malformed("dangling backslash")),
            },
            '$' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut modifier = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => modifier.push(c),
                            None => return Err(malformed("unterminated modifier")),
                        }
                    }
                    substitute_with_modifier(&modifier, value, &mut output)
                        .ok_or_else(|| malformed("malformed modifier"))?;
                } else {
                    write!(output, "{}", value).unwrap();
                }
            }
            _ => output.push(c),
        }
    }
    Ok(output)
}

/// Applies a `${offset,width,radix}` modifier. The offset is a signed
/// delta, the width a zero-padded minimum, and the radix one of `d`,
/// `o`, `x`, or `X` (default `d`).
fn substitute_with_modifier(modifier: &str, value: u32, output: &mut String) -> Option<()> {
    let mut parts = modifier.split(',');
    let offset: i64 = parts.next()?.parse().ok()?;
    let width: usize = match parts.next() {
        Some(width) => width.parse().ok()?,
        None => 0,
    };
    let radix = match parts.next() {
        Some("d") | None => b'd',
        Some("o") => b'o',
        Some("x") => b'x',
        Some("X") => b'X',
        Some(_) => return None,
    };
    if parts.next().is_some() {
        return None;
    }

    let adjusted = (value as i64 + offset).rem_euclid(1 << 32) as u64;
    match radix {
        b'd' => write!(output, "{:0width$}", adjusted, width = width).unwrap(),
        b'o' => write!(output, "{:0width$o}", adjusted, width = width).unwrap(),
        b'x' => write!(output, "{:0width$x}", adjusted, width = width).unwrap(),
        b'X' => write!(output, "{:0width$X}", adjusted, width = width).unwrap(),
        _ => unreachable!(),
    }
    Some(())
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    const POSITION: Position = Position { line: 1 };

    #[test]
    fn ranges_parse() {
        let range = GenerateRange::parse("1-100", POSITION).unwrap();
        assert_eq!((range.start, range.stop, range.step), (1, 100, 1));
        let range = GenerateRange::parse("0-254/2", POSITION).unwrap();
        assert_eq!(range.values().count(), 128);
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        for text in ["1", "5-1", "1-10/0", "x-y"] {
            assert!(GenerateRange::parse(text, POSITION).is_err(), "{}", text);
        }
    }

    #[test]
    fn oversized_ranges_are_rejected() {
        assert!(GenerateRange::parse("0-4294967295", POSITION).is_err());
    }

    #[test]
    fn dollar_substitutes_the_value() {
        assert_eq!(substitute("host-$", 17, POSITION).unwrap(), "host-17");
        assert_eq!(
            substitute("$.10.0.192.in-addr.arpa.", 3, POSITION).unwrap(),
            "3.10.0.192.in-addr.arpa."
        );
    }

    #[test]
    fn escaped_dollars_are_literal() {
        assert_eq!(substitute("\\$", 5, POSITION).unwrap(), "$");
    }

    #[test]
    fn modifiers_offset_pad_and_rebase() {
        assert_eq!(substitute("${0,3}", 5, POSITION).unwrap(), "005");
        assert_eq!(substitute("${10,0,d}", 5, POSITION).unwrap(), "15");
        assert_eq!(substitute("${0,2,x}", 30, POSITION).unwrap(), "1e");
        assert_eq!(substitute("${0,2,X}", 30, POSITION).unwrap(), "1E");
        assert_eq!(substitute("${0,4,o}", 8, POSITION).unwrap(), "0010");
        assert!(substitute("${0,2,q}", 30, POSITION).is_err());
        assert!(substitute("${", 1, POSITION).is_err());
    }
}
