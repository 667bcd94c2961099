// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! Offline decoder for Antelope chain state snapshots.
//!
//! A snapshot is a sectioned binary dump of a node's in-memory database.
//! This crate reads one without running a node and streams its contents as a
//! single JSON document: fixed-schema chain state first, then every contract
//! table row decoded against the owning account's embedded ABI.

pub mod abi;
pub mod cli;
pub mod dump;
pub mod json;
pub mod snapshot;
pub mod state;
pub mod wire;
