// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! One pass over the snapshot.
//!
//! The fixed-schema sections come first and in a fixed order; the accounts
//! pass populates the ABI cache as a side effect, and the contract-tables
//! pass consumes it. Every section handler writes its slice of the document
//! through the shared [`JsonEmitter`] before the next section is touched, so
//! memory stays bounded by the largest single row.

use crate::abi::{AbiCache, AbiSchema, DecodeBudget, DecodeError};
use crate::json::JsonEmitter;
use crate::snapshot::{Error, SnapshotReader};
use crate::state::{
    AccountRecord, BlockHeaderState, GenesisState, KeyValueRow, PermissionRecord,
    SecondaryIndexRow, SecondaryKeyKind, SequenceRecord, TableIdentifier,
};
use crate::wire::{Name, Varuint32};
use serde_json::Value;
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::debug;

pub const SECTION_HEADER: &str = "eosio::chain::chain_snapshot_header";
pub const SECTION_GENESIS: &str = "eosio::chain::genesis_state";
pub const SECTION_BLOCK_STATE: &str = "eosio::chain::block_state";
pub const SECTION_ACCOUNTS: &str = "eosio::chain::account_object";
pub const SECTION_PERMISSIONS: &str = "eosio::chain::permission_object";
pub const SECTION_ACCOUNT_SEQUENCE: &str = "eosio::chain::account_sequence_object";
pub const SECTION_CONTRACT_TABLES: &str = "contract_tables";

/// Decode the snapshot at `path`, streaming the JSON document into `out`.
pub fn dump(path: &Path, out: impl Write) -> Result<(), Error> {
    let mut reader = SnapshotReader::open(path)?;
    let file_label = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    };
    dump_snapshot(&mut reader, &file_label, out)
}

/// Snapshot → JSON against an already-open reader. Separate from [`dump`] so
/// tests can drive in-memory snapshots.
pub fn dump_snapshot<R: Read + Seek>(
    reader: &mut SnapshotReader<R>,
    file_label: &str,
    out: impl Write,
) -> Result<(), Error> {
    let mut json = JsonEmitter::new(out);
    json.begin_object()?;
    json.field(
        "____comment",
        &format!("generated from snapshot file {file_label}"),
    )?;

    reader.read_section(SECTION_HEADER, |s| {
        if s.is_empty() {
            return Err(Error::EmptySection(SECTION_HEADER));
        }
        let version: u32 = s.read_row()?;
        json.field("version", &version)?;
        Ok(())
    })?;

    reader.read_section(SECTION_GENESIS, |s| {
        if s.is_empty() {
            return Err(Error::EmptySection(SECTION_GENESIS));
        }
        let genesis: GenesisState = s.read_row()?;
        json.field("chain_id", &genesis.chain_id())?;
        json.field("genesis_state", &genesis)?;
        Ok(())
    })?;

    reader.read_section(SECTION_BLOCK_STATE, |s| {
        if s.is_empty() {
            return Err(Error::EmptySection(SECTION_BLOCK_STATE));
        }
        let head: BlockHeaderState = s.read_row()?;
        json.field("block_state", &head)?;
        Ok(())
    })?;

    let mut abis = AbiCache::default();
    reader.read_section(SECTION_ACCOUNTS, |s| {
        json.field_object("accounts")?;
        while s.has_more() {
            let account: AccountRecord = s.read_row()?;
            json.field(&account.name.to_string(), &account)?;
            abis.insert(account.name, &account.abi);
        }
        json.end_object()?;
        Ok(())
    })?;
    debug!(schemas = abis.len(), "accounts pass complete");

    reader.read_section(SECTION_PERMISSIONS, |s| {
        json.field_object("permissions")?;
        // Group by contiguous runs of the same owner. Rows arrive pre-sorted
        // from the producer; if an owner reappears later anyway, it opens a
        // fresh group rather than merging into the earlier one.
        let mut run: Option<Name> = None;
        let mut open = false;
        while s.has_more() {
            let perm: PermissionRecord = s.read_row()?;
            if run != Some(perm.owner) {
                if open {
                    json.end_object()?;
                    open = false;
                }
                run = Some(perm.owner);
                if !perm.owner.is_empty() {
                    json.field_object(&perm.owner.to_string())?;
                    open = true;
                }
            }
            // The zero owner marks malformed boundary rows: consumed, never
            // emitted.
            if !perm.owner.is_empty() {
                json.field(&perm.name.to_string(), &perm)?;
            }
        }
        if open {
            json.end_object()?;
        }
        json.end_object()?;
        Ok(())
    })?;

    reader.read_section(SECTION_ACCOUNT_SEQUENCE, |s| {
        json.field_object("account_sequence")?;
        while s.has_more() {
            let seq: SequenceRecord = s.read_row()?;
            json.field(&seq.name.to_string(), &seq)?;
        }
        json.end_object()?;
        Ok(())
    })?;

    reader.read_section(SECTION_CONTRACT_TABLES, |s| {
        json.field_array("tables")?;
        while s.has_more() {
            let tid: TableIdentifier = s.read_row()?;
            json.begin_element_object()?;
            json.field("tid", &tid)?;
            json.field_array("rows")?;
            let Varuint32(count) = s.read_row()?;
            let schema = abis.get(tid.code);
            for _ in 0..count {
                let row: KeyValueRow = s.read_row()?;
                match schema {
                    Some(schema) => json.element(&decode_row(schema, tid.table, &row))?,
                    // No ABI for this contract: raw value bytes as hex.
                    None => json.element(&row.value)?,
                }
            }
            json.end_array()?;
            // Five secondary-index blocks follow in fixed kind order. They
            // only exist to keep the row cursor aligned.
            for kind in SecondaryKeyKind::ALL {
                let Varuint32(skip) = s.read_row()?;
                for _ in 0..skip {
                    s.read_row_with(|r| SecondaryIndexRow::read_kind(r, kind))?;
                }
            }
            json.end_object()?;
        }
        json.end_array()?;
        Ok(())
    })?;

    json.end_object()?;
    json.finish()?;
    Ok(())
}

/// Structured decode of one key-value row, or the `{}` placeholder on any
/// failure. The placeholder shape is uniform across failure kinds; consumers
/// of the dump rely on it.
fn decode_row(schema: &AbiSchema, table: Name, row: &KeyValueRow) -> Value {
    let mut budget = DecodeBudget::default();
    let decoded = schema
        .type_for_table(table)
        .ok_or_else(|| DecodeError::UnknownType(table.to_string()))
        .and_then(|type_name| schema.binary_to_json(type_name, &row.value.0, &mut budget));
    match decoded {
        Ok(value) => value,
        Err(err) => {
            debug!(
                table = %table,
                primary_key = row.primary_key,
                %err,
                "table row did not decode; emitting placeholder",
            );
            Value::Object(serde_json::Map::new())
        }
    }
}
