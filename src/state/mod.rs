// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! Statically shaped snapshot rows.
//!
//! These mirror the producer's in-database objects one to one. Field order is
//! wire order; the `raw_record!` macro derives the codec from it.

use crate::wire::{
    BlockTimestamp, Bytes, Checksum256, Float128, Name, PublicKey, Readable, Signature, TimePoint,
    Writeable, raw_record, to_bytes,
};
use sha2::{Digest as _, Sha256};
use std::io::{self, Read, Write};

raw_record! {
    /// Global resource limits carried in the genesis configuration.
    pub struct ChainConfig {
        pub max_block_net_usage: u64,
        pub target_block_net_usage_pct: u32,
        pub max_transaction_net_usage: u32,
        pub base_per_transaction_net_usage: u32,
        pub net_usage_leeway: u32,
        pub context_free_discount_net_usage_num: u32,
        pub context_free_discount_net_usage_den: u32,
        pub max_block_cpu_usage: u32,
        pub target_block_cpu_usage_pct: u32,
        pub max_transaction_cpu_usage: u32,
        pub min_transaction_cpu_usage: u32,
        pub max_transaction_lifetime: u32,
        pub deferred_trx_expiration_window: u32,
        pub max_transaction_delay: u32,
        pub max_inline_action_size: u32,
        pub max_inline_action_depth: u16,
        pub max_authority_depth: u16,
    }
}

raw_record! {
    pub struct GenesisState {
        pub initial_timestamp: TimePoint,
        pub initial_key: PublicKey,
        pub initial_configuration: ChainConfig,
    }
}

impl GenesisState {
    /// Deterministic chain identifier: SHA-256 over the packed genesis
    /// record, byte-identical to the row as stored in the snapshot.
    pub fn chain_id(&self) -> Checksum256 {
        Checksum256(Sha256::digest(to_bytes(self)).into())
    }
}

raw_record! {
    pub struct BlockHeader {
        pub timestamp: BlockTimestamp,
        pub producer: Name,
        pub confirmed: u16,
        pub previous: Checksum256,
        pub transaction_mroot: Checksum256,
        pub action_mroot: Checksum256,
        pub schedule_version: u32,
        pub producer_signature: Signature,
    }
}

raw_record! {
    /// Consensus position of the chain head at snapshot time.
    pub struct BlockHeaderState {
        pub block_num: u32,
        pub dpos_proposed_irreversible_blocknum: u32,
        pub dpos_irreversible_blocknum: u32,
        pub block_id: Checksum256,
        pub header: BlockHeader,
    }
}

raw_record! {
    /// One account row. `abi` doubles as the input to the ABI schema cache.
    pub struct AccountRecord {
        pub name: Name,
        pub vm_type: u8,
        pub vm_version: u8,
        pub privileged: bool,
        pub last_code_update: TimePoint,
        pub code_version: Checksum256,
        pub creation_date: BlockTimestamp,
        pub code: Bytes,
        pub abi: Bytes,
    }
}

raw_record! {
    pub struct KeyWeight {
        pub key: PublicKey,
        pub weight: u16,
    }
}

raw_record! {
    pub struct PermissionLevel {
        pub actor: Name,
        pub permission: Name,
    }
}

raw_record! {
    pub struct PermissionLevelWeight {
        pub permission: PermissionLevel,
        pub weight: u16,
    }
}

raw_record! {
    pub struct WaitWeight {
        pub wait_sec: u32,
        pub weight: u16,
    }
}

raw_record! {
    pub struct Authority {
        pub threshold: u32,
        pub keys: Vec<KeyWeight>,
        pub accounts: Vec<PermissionLevelWeight>,
        pub waits: Vec<WaitWeight>,
    }
}

raw_record! {
    /// Permission rows arrive pre-grouped: rows for one owner are contiguous.
    pub struct PermissionRecord {
        pub parent: Name,
        pub owner: Name,
        pub name: Name,
        pub last_updated: TimePoint,
        pub auth: Authority,
    }
}

raw_record! {
    pub struct SequenceRecord {
        pub name: Name,
        pub recv_sequence: u64,
        pub auth_sequence: u64,
        pub code_sequence: u64,
        pub abi_sequence: u64,
    }
}

raw_record! {
    /// Header of one contract table block inside `contract_tables`.
    pub struct TableIdentifier {
        pub code: Name,
        pub scope: Name,
        pub table: Name,
        pub payer: Name,
        pub count: u32,
    }
}

raw_record! {
    pub struct KeyValueRow {
        pub primary_key: u64,
        pub payer: Name,
        pub value: Bytes,
    }
}

/// The five supported secondary-index key kinds, in the order their blocks
/// appear after a table's key-value rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryKeyKind {
    U64,
    U128,
    U256,
    Double,
    LongDouble,
}

impl SecondaryKeyKind {
    pub const ALL: [SecondaryKeyKind; 5] = [
        SecondaryKeyKind::U64,
        SecondaryKeyKind::U128,
        SecondaryKeyKind::U256,
        SecondaryKeyKind::Double,
        SecondaryKeyKind::LongDouble,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SecondaryKey {
    U64(u64),
    U128(u128),
    U256([u8; 32]),
    Double(f64),
    LongDouble(Float128),
}

/// Secondary-index row. Read for cursor alignment, never emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryIndexRow {
    pub primary_key: u64,
    pub payer: Name,
    pub secondary_key: SecondaryKey,
}

impl SecondaryIndexRow {
    pub fn read_kind(mut reader: impl Read, kind: SecondaryKeyKind) -> io::Result<Self> {
        Ok(SecondaryIndexRow {
            primary_key: u64::read_from(&mut reader)?,
            payer: Name::read_from(&mut reader)?,
            secondary_key: match kind {
                SecondaryKeyKind::U64 => SecondaryKey::U64(u64::read_from(&mut reader)?),
                SecondaryKeyKind::U128 => SecondaryKey::U128(u128::read_from(&mut reader)?),
                SecondaryKeyKind::U256 => SecondaryKey::U256(<[u8; 32]>::read_from(&mut reader)?),
                SecondaryKeyKind::Double => SecondaryKey::Double(f64::read_from(&mut reader)?),
                SecondaryKeyKind::LongDouble => {
                    SecondaryKey::LongDouble(Float128::read_from(&mut reader)?)
                }
            },
        })
    }
}

impl Writeable for SecondaryIndexRow {
    fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        self.primary_key.write_to(&mut writer)?;
        self.payer.write_to(&mut writer)?;
        match &self.secondary_key {
            SecondaryKey::U64(k) => k.write_to(&mut writer),
            SecondaryKey::U128(k) => k.write_to(&mut writer),
            SecondaryKey::U256(k) => k.write_to(&mut writer),
            SecondaryKey::Double(k) => k.write_to(&mut writer),
            SecondaryKey::LongDouble(k) => k.write_to(&mut writer),
        }
    }
}
