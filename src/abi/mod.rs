// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! Self-describing contract table schemas.
//!
//! Accounts may embed a packed ABI blob naming the struct types behind their
//! tables. [`AbiSchema::from_bytes`] parses one blob into an indexed schema;
//! [`AbiCache`] collects schemas per account during the accounts pass and
//! answers lookups during the contract-tables pass. Parse failures are
//! deliberately quiet: an account without a usable ABI simply has no schema,
//! and its table rows fall back to raw bytes.

mod decode;

pub use decode::{DecodeBudget, DecodeError};

use crate::wire::{Bytes, Name, Readable, Writeable, raw_record};
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::debug;

/// ABI revisions we understand. 1.0 lacks the trailing variant list, 1.1
/// carries it; both share this version prefix.
const VERSION_PREFIX: &str = "eosio::abi/1.";

raw_record! {
    /// Alias from a new type name to an existing type.
    pub struct TypeDef {
        pub new_type_name: String,
        pub source_type: String,
    }
}

raw_record! {
    pub struct FieldDef {
        pub name: String,
        pub type_name: String,
    }
}

raw_record! {
    pub struct StructDef {
        pub name: String,
        pub base: String,
        pub fields: Vec<FieldDef>,
    }
}

raw_record! {
    pub struct ActionDef {
        pub name: Name,
        pub type_name: String,
        pub ricardian_contract: String,
    }
}

raw_record! {
    /// Binds a table name to the struct type of its rows.
    pub struct TableDef {
        pub name: Name,
        pub index_type: String,
        pub key_names: Vec<String>,
        pub key_types: Vec<String>,
        pub type_name: String,
    }
}

raw_record! {
    pub struct ClausePair {
        pub id: String,
        pub body: String,
    }
}

raw_record! {
    pub struct ErrorMessage {
        pub error_code: u64,
        pub error_msg: String,
    }
}

raw_record! {
    pub struct AbiExtension {
        pub tag: u16,
        pub data: Bytes,
    }
}

raw_record! {
    /// A tagged union: the wire form is an alternative index plus payload.
    pub struct VariantDef {
        pub name: String,
        pub types: Vec<String>,
    }
}

/// A full ABI definition as packed into an account's `abi` blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbiDef {
    pub version: String,
    pub types: Vec<TypeDef>,
    pub structs: Vec<StructDef>,
    pub actions: Vec<ActionDef>,
    pub tables: Vec<TableDef>,
    pub ricardian_clauses: Vec<ClausePair>,
    pub error_messages: Vec<ErrorMessage>,
    pub abi_extensions: Vec<AbiExtension>,
    pub variants: Vec<VariantDef>,
}

impl AbiDef {
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        let mut input = bytes;
        let version = String::read_from(&mut input)?;
        if !version.starts_with(VERSION_PREFIX) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported ABI version {version:?}"),
            ));
        }
        let types = Vec::read_from(&mut input)?;
        let structs = Vec::read_from(&mut input)?;
        let actions = Vec::read_from(&mut input)?;
        let tables = Vec::read_from(&mut input)?;
        let ricardian_clauses = Vec::read_from(&mut input)?;
        let error_messages = Vec::read_from(&mut input)?;
        let abi_extensions = Vec::read_from(&mut input)?;
        // 1.1 appends variant definitions after the 1.0 layout.
        let variants = if input.is_empty() {
            Vec::new()
        } else {
            Vec::read_from(&mut input)?
        };
        if !input.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "trailing bytes after ABI definition",
            ));
        }
        Ok(AbiDef {
            version,
            types,
            structs,
            actions,
            tables,
            ricardian_clauses,
            error_messages,
            abi_extensions,
            variants,
        })
    }
}

impl Writeable for AbiDef {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        self.version.write_to(&mut writer)?;
        self.types.write_to(&mut writer)?;
        self.structs.write_to(&mut writer)?;
        self.actions.write_to(&mut writer)?;
        self.tables.write_to(&mut writer)?;
        self.ricardian_clauses.write_to(&mut writer)?;
        self.error_messages.write_to(&mut writer)?;
        self.abi_extensions.write_to(&mut writer)?;
        self.variants.write_to(&mut writer)
    }
}

/// One account's ABI, indexed for type resolution.
#[derive(Debug, Clone)]
pub struct AbiSchema {
    typedefs: BTreeMap<String, String>,
    structs: BTreeMap<String, StructDef>,
    variants: BTreeMap<String, VariantDef>,
    tables: BTreeMap<Name, String>,
}

impl AbiSchema {
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        if bytes.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "empty ABI blob",
            ));
        }
        Ok(Self::from_def(AbiDef::from_bytes(bytes)?))
    }

    pub fn from_def(def: AbiDef) -> Self {
        AbiSchema {
            typedefs: def
                .types
                .into_iter()
                .map(|t| (t.new_type_name, t.source_type))
                .collect(),
            structs: def.structs.into_iter().map(|s| (s.name.clone(), s)).collect(),
            variants: def
                .variants
                .into_iter()
                .map(|v| (v.name.clone(), v))
                .collect(),
            tables: def
                .tables
                .into_iter()
                .map(|t| (t.name, t.type_name))
                .collect(),
        }
    }

    /// The struct type bound to `table`, if this ABI declares the table.
    pub fn type_for_table(&self, table: Name) -> Option<&str> {
        self.tables.get(&table).map(String::as_str)
    }

    fn typedef(&self, name: &str) -> Option<&str> {
        self.typedefs.get(name).map(String::as_str)
    }

    fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.structs.get(name)
    }

    fn variant_def(&self, name: &str) -> Option<&VariantDef> {
        self.variants.get(name)
    }
}

/// Per-account schemas, built once during the accounts pass and read-only
/// afterwards.
#[derive(Debug, Default)]
pub struct AbiCache {
    schemas: BTreeMap<Name, AbiSchema>,
}

impl AbiCache {
    /// Offer an account's raw ABI bytes. A blob that does not parse leaves no
    /// entry and no visible error; one bad account must not disturb the rest.
    pub fn insert(&mut self, account: Name, abi: &Bytes) {
        if abi.is_empty() {
            // Most accounts carry no ABI at all.
            return;
        }
        match AbiSchema::from_bytes(&abi.0) {
            Ok(schema) => {
                self.schemas.insert(account, schema);
            }
            Err(err) => debug!(account = %account, %err, "ignoring unparseable ABI"),
        }
    }

    pub fn get(&self, account: Name) -> Option<&AbiSchema> {
        self.schemas.get(&account)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
