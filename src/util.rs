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

//! Crate-private helpers for DNS mnemonics.
//!
//! RR types, classes, and QTYPEs/QCLASSes all follow the same
//! presentation-format conventions: a table of well-known mnemonics
//! matched without regard to ASCII case, with the [RFC 3597 § 5]
//! `TYPE12345`/`CLASS12345` generic form covering everything else.
//! The registry types share these two helpers for their [`FromStr`]
//! (std::str::FromStr) implementations.
//!
//! [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5

/// Looks up `text` in a table of `(mnemonic, value)` pairs, matching
/// the mnemonic ASCII-case-insensitively.
pub fn lookup_mnemonic<T: Copy>(table: &[(&str, T)], text: &str) -> Option<T> {
    table
        .iter()
        .find(|(mnemonic, _)| mnemonic.eq_ignore_ascii_case(text))
        .map(|&(_, value)| value)
}

/// Parses the [RFC 3597 § 5] generic mnemonic form `<prefix><value>`
/// (e.g. `TYPE64222` or `CLASS255`), matching the prefix
/// ASCII-case-insensitively. The value must be a decimal unsigned
/// 16-bit integer.
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
pub fn parse_generic_mnemonic(prefix: &str, text: &str) -> Option<u16> {
    let head = text.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    text[prefix.len()..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    static TABLE: &[(&str, u8)] = &[("IN", 1), ("CH", 3), ("*", 255)];

    #[test]
    fn lookup_mnemonic_ignores_case() {
        assert_eq!(lookup_mnemonic(TABLE, "IN"), Some(1));
        assert_eq!(lookup_mnemonic(TABLE, "in"), Some(1));
        assert_eq!(lookup_mnemonic(TABLE, "Ch"), Some(3));
        assert_eq!(lookup_mnemonic(TABLE, "*"), Some(255));
        assert_eq!(lookup_mnemonic(TABLE, "HS"), None);
    }

    #[test]
    fn parse_generic_mnemonic_works() {
        assert_eq!(parse_generic_mnemonic("TYPE", "TYPE1"), Some(1));
        assert_eq!(parse_generic_mnemonic("TYPE", "type65280"), Some(65280));
        assert_eq!(parse_generic_mnemonic("CLASS", "Class255"), Some(255));
    }

    #[test]
    fn parse_generic_mnemonic_rejects_bad_input() {
        assert_eq!(parse_generic_mnemonic("TYPE", "TYPE"), None);
        assert_eq!(parse_generic_mnemonic("TYPE", "TYPE65536"), None);
        assert_eq!(parse_generic_mnemonic("TYPE", "TYPE-1"), None);
        assert_eq!(parse_generic_mnemonic("TYPE", "CLASS1"), None);
        assert_eq!(parse_generic_mnemonic("TYPE", "TYP"), None);
    }
}
