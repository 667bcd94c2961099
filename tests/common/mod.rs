// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! Snapshot fixtures, written through the crate's own wire codec.

#![allow(dead_code)]

use snapdump::abi::{AbiDef, FieldDef, StructDef, TableDef};
use snapdump::dump::{
    self, SECTION_ACCOUNT_SEQUENCE, SECTION_ACCOUNTS, SECTION_BLOCK_STATE,
    SECTION_CONTRACT_TABLES, SECTION_GENESIS, SECTION_HEADER, SECTION_PERMISSIONS,
};
use snapdump::snapshot::{self, FORMAT_VERSION, MAGIC, SnapshotReader};
use snapdump::state::{
    AccountRecord, Authority, BlockHeader, BlockHeaderState, ChainConfig, GenesisState,
    KeyValueRow, PermissionRecord, SecondaryIndexRow, SecondaryKey, SecondaryKeyKind,
    SequenceRecord, TableIdentifier,
};
use snapdump::wire::{
    BlockTimestamp, Bytes, Checksum256, KeyKind, Name, PublicKey, Signature, TimePoint, Varuint32,
    Writeable, to_bytes,
};
use std::io::Cursor;

struct Section {
    name: String,
    rows: Vec<Vec<u8>>,
}

/// Builds syntactically valid snapshot files section by section.
pub struct SnapshotBuilder {
    sections: Vec<Section>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        SnapshotBuilder {
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, name: &str) -> Self {
        self.sections.push(Section {
            name: name.to_string(),
            rows: Vec::new(),
        });
        self
    }

    pub fn row(mut self, value: &impl Writeable) -> Self {
        self.sections
            .last_mut()
            .expect("row() before section()")
            .rows
            .push(to_bytes(value));
        self
    }

    /// A whole contract table block: identifier, key-value rows, and the
    /// five secondary-index blocks with the given row counts.
    pub fn table_block(
        mut self,
        tid: &TableIdentifier,
        rows: &[KeyValueRow],
        index_counts: [u32; 5],
    ) -> Self {
        self = self.row(tid).row(&Varuint32(rows.len() as u32));
        for row in rows {
            self = self.row(row);
        }
        for (kind, count) in SecondaryKeyKind::ALL.into_iter().zip(index_counts) {
            self = self.row(&Varuint32(count));
            for i in 0..count {
                self = self.row(&SecondaryIndexRow {
                    primary_key: u64::from(i),
                    payer: Name(0),
                    secondary_key: zero_key(kind),
                });
            }
        }
        self
    }

    /// Append empty entity sections for any not added explicitly, then build.
    /// The reader addresses sections by name, so append order is immaterial.
    pub fn finish(mut self) -> Vec<u8> {
        for name in [
            SECTION_ACCOUNTS,
            SECTION_PERMISSIONS,
            SECTION_ACCOUNT_SEQUENCE,
            SECTION_CONTRACT_TABLES,
        ] {
            if !self.sections.iter().any(|s| s.name == name) {
                self = self.section(name);
            }
        }
        self.build()
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = to_bytes(&MAGIC);
        FORMAT_VERSION.write_to(&mut out).unwrap();
        for section in &self.sections {
            let mut payload = to_bytes(&(section.rows.len() as u64));
            payload.extend_from_slice(section.name.as_bytes());
            payload.push(0);
            for row in &section.rows {
                payload.extend_from_slice(row);
            }
            (payload.len() as u64).write_to(&mut out).unwrap();
            out.extend_from_slice(&payload);
        }
        0u64.write_to(&mut out).unwrap();
        out
    }
}

fn zero_key(kind: SecondaryKeyKind) -> SecondaryKey {
    match kind {
        SecondaryKeyKind::U64 => SecondaryKey::U64(0),
        SecondaryKeyKind::U128 => SecondaryKey::U128(0),
        SecondaryKeyKind::U256 => SecondaryKey::U256([0; 32]),
        SecondaryKeyKind::Double => SecondaryKey::Double(0.0),
        SecondaryKeyKind::LongDouble => {
            SecondaryKey::LongDouble(snapdump::wire::Float128([0; 16]))
        }
    }
}

pub fn test_genesis() -> GenesisState {
    GenesisState {
        initial_timestamp: TimePoint(1_527_854_400_000_000),
        initial_key: PublicKey {
            kind: KeyKind::K1,
            data: [0x03; 33],
        },
        initial_configuration: ChainConfig {
            max_block_net_usage: 1_048_576,
            target_block_net_usage_pct: 1000,
            max_transaction_net_usage: 524_288,
            base_per_transaction_net_usage: 12,
            net_usage_leeway: 500,
            context_free_discount_net_usage_num: 20,
            context_free_discount_net_usage_den: 100,
            max_block_cpu_usage: 200_000,
            target_block_cpu_usage_pct: 1000,
            max_transaction_cpu_usage: 150_000,
            min_transaction_cpu_usage: 100,
            max_transaction_lifetime: 3600,
            deferred_trx_expiration_window: 600,
            max_transaction_delay: 3_888_000,
            max_inline_action_size: 4096,
            max_inline_action_depth: 4,
            max_authority_depth: 6,
        },
    }
}

pub fn test_block_state() -> BlockHeaderState {
    BlockHeaderState {
        block_num: 4242,
        dpos_proposed_irreversible_blocknum: 4200,
        dpos_irreversible_blocknum: 4100,
        block_id: Checksum256([0x1b; 32]),
        header: BlockHeader {
            timestamp: BlockTimestamp(1_000_000),
            producer: "produca".parse().unwrap(),
            confirmed: 0,
            previous: Checksum256([0x1a; 32]),
            transaction_mroot: Checksum256([0; 32]),
            action_mroot: Checksum256([0x77; 32]),
            schedule_version: 3,
            producer_signature: Signature {
                kind: KeyKind::K1,
                data: [0x42; 65],
            },
        },
    }
}

pub fn account_row(name: &str, abi: Vec<u8>) -> AccountRecord {
    AccountRecord {
        name: name.parse().unwrap(),
        vm_type: 0,
        vm_version: 0,
        privileged: false,
        last_code_update: TimePoint(0),
        code_version: Checksum256([0; 32]),
        creation_date: BlockTimestamp(0),
        code: Bytes(vec![]),
        abi: Bytes(abi),
    }
}

pub fn permission_row(owner: &str, name: &str) -> PermissionRecord {
    PermissionRecord {
        parent: Name(0),
        owner: owner.parse().unwrap(),
        name: name.parse().unwrap(),
        last_updated: TimePoint(0),
        auth: Authority {
            threshold: 1,
            keys: vec![],
            accounts: vec![],
            waits: vec![],
        },
    }
}

pub fn sequence_row(name: &str) -> SequenceRecord {
    SequenceRecord {
        name: name.parse().unwrap(),
        recv_sequence: 7,
        auth_sequence: 8,
        code_sequence: 1,
        abi_sequence: 1,
    }
}

pub fn table_id(code: &str, scope: &str, table: &str, count: u32) -> TableIdentifier {
    TableIdentifier {
        code: code.parse().unwrap(),
        scope: scope.parse().unwrap(),
        table: table.parse().unwrap(),
        payer: code.parse().unwrap(),
        count,
    }
}

pub fn kv_row(primary_key: u64, value: Vec<u8>) -> KeyValueRow {
    KeyValueRow {
        primary_key,
        payer: Name(0),
        value: Bytes(value),
    }
}

/// ABI declaring one table `entries` of struct `entry {id: uint64, note: string}`.
pub fn entry_abi() -> Vec<u8> {
    let def = AbiDef {
        version: "eosio::abi/1.1".to_string(),
        structs: vec![StructDef {
            name: "entry".to_string(),
            base: String::new(),
            fields: vec![
                FieldDef {
                    name: "id".to_string(),
                    type_name: "uint64".to_string(),
                },
                FieldDef {
                    name: "note".to_string(),
                    type_name: "string".to_string(),
                },
            ],
        }],
        tables: vec![TableDef {
            name: "entries".parse().unwrap(),
            index_type: "i64".to_string(),
            key_names: vec!["id".to_string()],
            key_types: vec!["uint64".to_string()],
            type_name: "entry".to_string(),
        }],
        ..Default::default()
    };
    to_bytes(&def)
}

/// Wire bytes of one valid `entry` row.
pub fn entry_row(id: u64, note: &str) -> Vec<u8> {
    let mut row = to_bytes(&id);
    note.write_to(&mut row).unwrap();
    row
}

/// The three required leading sections with valid single rows. Follow with
/// entity sections, or let [`SnapshotBuilder::finish`] add them empty.
pub fn base_snapshot() -> SnapshotBuilder {
    SnapshotBuilder::new()
        .section(SECTION_HEADER)
        .row(&1u32)
        .section(SECTION_GENESIS)
        .row(&test_genesis())
        .section(SECTION_BLOCK_STATE)
        .row(&test_block_state())
}

/// Run the dump over in-memory snapshot bytes.
pub fn dump_to_string(bytes: Vec<u8>) -> Result<String, snapshot::Error> {
    let mut reader = SnapshotReader::new(Cursor::new(bytes))?;
    let mut out = Vec::new();
    dump::dump_snapshot(&mut reader, "fixture.bin", &mut out)?;
    Ok(String::from_utf8(out).expect("dump output is UTF-8"))
}
