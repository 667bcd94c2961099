// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Readable, Writeable};
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

/// 64-bit account name packed in the producer's 13-character base32
/// alphabet: five bits per character, four for the 13th.
///
/// The zero name renders as the empty string and acts as a "no account"
/// sentinel in permission rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(pub u64);

const ALPHABET: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

impl Name {
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars = [b'.'; 13];
        let mut v = self.0;
        for i in (0..13).rev() {
            if i == 12 {
                chars[i] = ALPHABET[(v & 0x0f) as usize];
                v >>= 4;
            } else {
                chars[i] = ALPHABET[(v & 0x1f) as usize];
                v >>= 5;
            }
        }
        let name = std::str::from_utf8(&chars).expect("alphabet is ASCII");
        f.write_str(name.trim_end_matches('.'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid account name {0:?}")]
pub struct ParseNameError(String);

impl FromStr for Name {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > 13 {
            return Err(ParseNameError(s.into()));
        }
        let mut value = 0u64;
        for (i, c) in s.bytes().enumerate() {
            let symbol = ALPHABET
                .iter()
                .position(|&a| a == c)
                .ok_or_else(|| ParseNameError(s.into()))? as u64;
            if i < 12 {
                value |= symbol << (64 - 5 * (i + 1));
            } else {
                // The 13th character only has four bits of room.
                if symbol > 0x0f {
                    return Err(ParseNameError(s.into()));
                }
                value |= symbol;
            }
        }
        Ok(Name(value))
    }
}

impl Readable for Name {
    fn read_from(reader: impl Read) -> io::Result<Self> {
        Ok(Name(u64::read_from(reader)?))
    }
}

impl Writeable for Name {
    fn write_to(&self, writer: impl Write) -> io::Result<()> {
        self.0.write_to(writer)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn known_names() {
        assert_eq!("eosio".parse::<Name>().unwrap(), Name(6138663577826885632));
        assert_eq!(Name(6138663577826885632).to_string(), "eosio");
        assert_eq!(Name(0).to_string(), "");
        assert_eq!("".parse::<Name>().unwrap(), Name(0));
    }

    #[test]
    fn dots_inside_names_survive() {
        let name: Name = "a.b.c".parse().unwrap();
        assert_eq!(name.to_string(), "a.b.c");
    }

    #[test]
    fn thirteen_character_names() {
        let name: Name = "aaaaaaaaaaaaa".parse().unwrap();
        assert_eq!(name.to_string(), "aaaaaaaaaaaaa");
        // 'z' does not fit in the 13th character's four bits.
        assert!("aaaaaaaaaaaaz".parse::<Name>().is_err());
    }

    #[test]
    fn junk_is_rejected() {
        assert!("UPPER".parse::<Name>().is_err());
        assert!("waytoolongname".parse::<Name>().is_err());
        assert!("sp ace".parse::<Name>().is_err());
    }

    #[quickcheck]
    fn display_parse_roundtrips(value: u64) -> bool {
        let name = Name(value);
        name.to_string().parse() == Ok(name)
    }
}