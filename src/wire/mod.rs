// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! Primitives of the snapshot producer's raw binary serialization.
//!
//! Integers are little-endian, counts are unsigned LEB128, byte strings are
//! length-prefixed. [`Readable`] decodes one value from a byte stream and
//! [`Writeable`] is its exact inverse. The pair must round-trip
//! byte-for-byte: chain-id derivation re-encodes the genesis row and hashes
//! the result.

mod name;
mod time;

pub use name::Name;
pub use time::{BlockTimestamp, TimePoint, TimePointSec};

use byteorder::{LittleEndian, ReadBytesExt as _, WriteBytesExt as _};
use integer_encoding::{VarIntReader as _, VarIntWriter as _};
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{self, Read, Write};

pub trait Readable {
    fn read_from(reader: impl Read) -> io::Result<Self>
    where
        Self: Sized;
}

pub trait Writeable {
    /// Must only return [`Err(_)`] if the underlying io fails.
    fn write_to(&self, writer: impl Write) -> io::Result<()>;
}

/// Declare a record struct whose wire encoding is its fields, in order.
macro_rules! raw_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($(#[$fmeta:meta])* pub $field:ident: $ty:ty,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $ty,)*
        }

        impl $crate::wire::Readable for $name {
            fn read_from(mut reader: impl std::io::Read) -> std::io::Result<Self> {
                Ok($name {
                    $($field: $crate::wire::Readable::read_from(&mut reader)?,)*
                })
            }
        }

        impl $crate::wire::Writeable for $name {
            fn write_to(&self, mut writer: impl std::io::Write) -> std::io::Result<()> {
                $($crate::wire::Writeable::write_to(&self.$field, &mut writer)?;)*
                Ok(())
            }
        }
    };
}
pub(crate) use raw_record;

/// Encode a value to a fresh buffer. Used for chain-id hashing and fixtures.
pub fn to_bytes(value: &impl Writeable) -> Vec<u8> {
    let mut bytes = Vec::new();
    value
        .write_to(&mut bytes)
        .expect("Vec<u8> has infallible IO");
    bytes
}

macro_rules! int_codec {
    ($($int:ty: $read:ident, $write:ident;)*) => {
        $(
            impl Readable for $int {
                fn read_from(mut reader: impl Read) -> io::Result<Self> {
                    reader.$read::<LittleEndian>()
                }
            }
            impl Writeable for $int {
                fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
                    writer.$write::<LittleEndian>(*self)
                }
            }
        )*
    };
}

int_codec! {
    u16: read_u16, write_u16;
    u32: read_u32, write_u32;
    u64: read_u64, write_u64;
    u128: read_u128, write_u128;
    i16: read_i16, write_i16;
    i32: read_i32, write_i32;
    i64: read_i64, write_i64;
    i128: read_i128, write_i128;
    f32: read_f32, write_f32;
    f64: read_f64, write_f64;
}

impl Readable for u8 {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        reader.read_u8()
    }
}

impl Writeable for u8 {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_u8(*self)
    }
}

impl Readable for i8 {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        reader.read_i8()
    }
}

impl Writeable for i8 {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_i8(*self)
    }
}

impl Readable for bool {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid bool byte {other:#04x}"),
            )),
        }
    }
}

impl Writeable for bool {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_u8(u8::from(*self))
    }
}

/// Unsigned LEB128 count, at most 32 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Varuint32(pub u32);

impl Readable for Varuint32 {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        Ok(Varuint32(reader.read_varint()?))
    }
}

impl Writeable for Varuint32 {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_varint(self.0).map(drop)
    }
}

/// Zigzag LEB128 signed integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Varint32(pub i32);

impl Readable for Varint32 {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        Ok(Varint32(reader.read_varint()?))
    }
}

impl Writeable for Varint32 {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_varint(self.0).map(drop)
    }
}

impl Readable for String {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        let Bytes(bytes) = Bytes::read_from(&mut reader)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl Writeable for str {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        write_len(&mut writer, self.len())?;
        writer.write_all(self.as_bytes())
    }
}

impl Writeable for String {
    fn write_to(&self, writer: impl Write) -> io::Result<()> {
        self.as_str().write_to(writer)
    }
}

/// Length-prefixed blob. Shown in JSON as a lowercase hex string.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Bytes(bytes.to_vec())
    }
}

impl Readable for Bytes {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        let Varuint32(len) = Varuint32::read_from(&mut reader)?;
        // The length prefix is attacker-controlled; grow the buffer as bytes
        // actually arrive instead of trusting it for one big allocation.
        let mut remaining = len as usize;
        let mut bytes = Vec::with_capacity(remaining.min(64 * 1024));
        let mut chunk = [0u8; 8 * 1024];
        while remaining > 0 {
            let want = remaining.min(chunk.len());
            let got = reader.read(&mut chunk[..want])?;
            if got == 0 {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
            bytes.extend_from_slice(&chunk[..got]);
            remaining -= got;
        }
        Ok(Bytes(bytes))
    }
}

impl Writeable for Bytes {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        write_len(&mut writer, self.0.len())?;
        writer.write_all(&self.0)
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

fn write_len(mut writer: impl Write, len: usize) -> io::Result<()> {
    let len = u32::try_from(len)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "blob exceeds u32 length"))?;
    writer.write_varint(len).map(drop)
}

impl<T: Readable> Readable for Vec<T> {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        let Varuint32(len) = Varuint32::read_from(&mut reader)?;
        // Same caveat as `Bytes`: cap the preallocation.
        let mut items = Vec::with_capacity((len as usize).min(4096));
        for _ in 0..len {
            items.push(T::read_from(&mut reader)?);
        }
        Ok(items)
    }
}

impl<T: Writeable> Writeable for Vec<T> {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        write_len(&mut writer, self.len())?;
        for item in self {
            item.write_to(&mut writer)?;
        }
        Ok(())
    }
}

impl<const N: usize> Readable for [u8; N] {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        let mut buf = [0u8; N];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl<const N: usize> Writeable for [u8; N] {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_all(self)
    }
}

macro_rules! checksum_type {
    ($(#[$doc:meta])* $name:ident, $len:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub [u8; $len]);

        impl Readable for $name {
            fn read_from(reader: impl Read) -> io::Result<Self> {
                Ok($name(<[u8; $len]>::read_from(reader)?))
            }
        }

        impl Writeable for $name {
            fn write_to(&self, writer: impl Write) -> io::Result<()> {
                self.0.write_to(writer)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

checksum_type!(
    /// 20-byte digest.
    Checksum160,
    20
);
checksum_type!(
    /// 32-byte digest. Code hashes, block ids and the chain id use this.
    Checksum256,
    32
);
checksum_type!(
    /// 64-byte digest.
    Checksum512,
    64
);

/// Raw IEEE binary128 value. Kept as bits; shown as hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Float128(pub [u8; 16]);

impl Readable for Float128 {
    fn read_from(reader: impl Read) -> io::Result<Self> {
        Ok(Float128(<[u8; 16]>::read_from(reader)?))
    }
}

impl Writeable for Float128 {
    fn write_to(&self, writer: impl Write) -> io::Result<()> {
        self.0.write_to(writer)
    }
}

impl Serialize for Float128 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

/// Elliptic-curve flavor of a public key or signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    K1,
    R1,
}

impl KeyKind {
    fn from_discriminant(d: u32) -> io::Result<Self> {
        match d {
            0 => Ok(KeyKind::K1),
            1 => Ok(KeyKind::R1),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown key type discriminant {other}"),
            )),
        }
    }

    fn discriminant(self) -> u32 {
        match self {
            KeyKind::K1 => 0,
            KeyKind::R1 => 1,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            KeyKind::K1 => "K1",
            KeyKind::R1 => "R1",
        }
    }
}

/// 33-byte compressed public key behind a key-type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    pub kind: KeyKind,
    pub data: [u8; 33],
}

impl Readable for PublicKey {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        let Varuint32(d) = Varuint32::read_from(&mut reader)?;
        Ok(PublicKey {
            kind: KeyKind::from_discriminant(d)?,
            data: <[u8; 33]>::read_from(&mut reader)?,
        })
    }
}

impl Writeable for PublicKey {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        Varuint32(self.kind.discriminant()).write_to(&mut writer)?;
        self.data.write_to(&mut writer)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PUB_{}_{}", self.kind.tag(), hex::encode(self.data))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 65-byte recoverable signature behind a key-type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub kind: KeyKind,
    pub data: [u8; 65],
}

impl Readable for Signature {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        let Varuint32(d) = Varuint32::read_from(&mut reader)?;
        Ok(Signature {
            kind: KeyKind::from_discriminant(d)?,
            data: <[u8; 65]>::read_from(&mut reader)?,
        })
    }
}

impl Writeable for Signature {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        Varuint32(self.kind.discriminant()).write_to(&mut writer)?;
        self.data.write_to(&mut writer)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIG_{}_{}", self.kind.tag(), hex::encode(self.data))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Token symbol: low byte is the decimal precision, the remaining bytes are
/// up to seven uppercase characters, NUL padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol(pub u64);

impl Symbol {
    pub fn precision(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn code(self) -> SymbolCode {
        SymbolCode(self.0 >> 8)
    }
}

impl Readable for Symbol {
    fn read_from(reader: impl Read) -> io::Result<Self> {
        let symbol = Symbol(u64::read_from(reader)?);
        if symbol.precision() > 18 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("symbol precision {} out of range", symbol.precision()),
            ));
        }
        Ok(symbol)
    }
}

impl Writeable for Symbol {
    fn write_to(&self, writer: impl Write) -> io::Result<()> {
        self.0.write_to(writer)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision(), self.code())
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Symbol characters without a precision byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolCode(pub u64);

impl Readable for SymbolCode {
    fn read_from(reader: impl Read) -> io::Result<Self> {
        Ok(SymbolCode(u64::read_from(reader)?))
    }
}

impl Writeable for SymbolCode {
    fn write_to(&self, writer: impl Write) -> io::Result<()> {
        self.0.write_to(writer)
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut v = self.0;
        while v > 0 {
            write!(f, "{}", char::from((v & 0xff) as u8))?;
            v >>= 8;
        }
        Ok(())
    }
}

impl Serialize for SymbolCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Token amount with its symbol, shown as e.g. `1.0000 EOS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    pub amount: i64,
    pub symbol: Symbol,
}

impl Readable for Asset {
    fn read_from(mut reader: impl Read) -> io::Result<Self> {
        Ok(Asset {
            amount: i64::read_from(&mut reader)?,
            symbol: Symbol::read_from(&mut reader)?,
        })
    }
}

impl Writeable for Asset {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        self.amount.write_to(&mut writer)?;
        self.symbol.write_to(&mut writer)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Symbol::read_from guarantees precision <= 18, so the scale fits i128.
        let precision = u32::from(self.symbol.precision());
        let scale = 10i128.pow(precision);
        let amount = i128::from(self.amount);
        let sign = if amount < 0 { "-" } else { "" };
        let integral = amount.unsigned_abs() / scale.unsigned_abs();
        let fraction = amount.unsigned_abs() % scale.unsigned_abs();
        if precision > 0 {
            write!(
                f,
                "{sign}{integral}.{fraction:0width$} {}",
                self.symbol.code(),
                width = precision as usize
            )
        } else {
            write!(f, "{sign}{integral} {}", self.symbol.code())
        }
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn roundtrip<T: Readable + Writeable + PartialEq + fmt::Debug>(value: T) {
        let bytes = to_bytes(&value);
        let back = T::read_from(bytes.as_slice()).unwrap();
        assert_eq!(value, back);
    }

    #[quickcheck]
    fn varuint_roundtrips(n: u32) {
        roundtrip(Varuint32(n));
    }

    #[quickcheck]
    fn varint_roundtrips(n: i32) {
        roundtrip(Varint32(n));
    }

    #[quickcheck]
    fn bytes_roundtrip(data: Vec<u8>) {
        roundtrip(Bytes(data));
    }

    #[test]
    fn varuint_is_leb128() {
        assert_eq!(to_bytes(&Varuint32(0)), [0x00]);
        assert_eq!(to_bytes(&Varuint32(127)), [0x7f]);
        assert_eq!(to_bytes(&Varuint32(128)), [0x80, 0x01]);
        assert_eq!(to_bytes(&Varuint32(624_485)), [0xe5, 0x8e, 0x26]);
    }

    #[test]
    fn bool_rejects_junk() {
        assert!(bool::read_from([2u8].as_slice()).is_err());
        assert!(!bool::read_from([0u8].as_slice()).unwrap());
    }

    #[test]
    fn truncated_blob_is_an_error() {
        // Claims four bytes, delivers two.
        let bytes = [0x04, 0xaa, 0xbb];
        let err = Bytes::read_from(bytes.as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn key_renders_with_kind_tag() {
        let key = PublicKey {
            kind: KeyKind::K1,
            data: [0x02; 33],
        };
        assert!(key.to_string().starts_with("PUB_K1_0202"));
        let bytes = to_bytes(&key);
        assert_eq!(bytes.len(), 34);
        assert_eq!(PublicKey::read_from(bytes.as_slice()).unwrap(), key);
    }

    #[test]
    fn unknown_key_kind_is_rejected() {
        let mut bytes = vec![0x07];
        bytes.extend_from_slice(&[0u8; 33]);
        assert!(PublicKey::read_from(bytes.as_slice()).is_err());
    }

    #[test]
    fn asset_display() {
        let eos = Symbol(4 | (u64::from_le_bytes(*b"EOS\0\0\0\0\0") << 8));
        assert_eq!(eos.to_string(), "4,EOS");
        assert_eq!(
            Asset {
                amount: 10_000,
                symbol: eos
            }
            .to_string(),
            "1.0000 EOS"
        );
        assert_eq!(
            Asset {
                amount: -5,
                symbol: eos
            }
            .to_string(),
            "-0.0005 EOS"
        );
    }
}
