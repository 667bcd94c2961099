// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! Command-line surface: one positional snapshot path, JSON on stdout,
//! diagnostics on stderr.

use crate::dump;
use anyhow::Context as _;
use clap::Parser;
use std::ffi::OsString;
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

/// Command-line options for the `snapdump` binary
#[derive(Debug, Parser)]
#[command(name = env!("CARGO_PKG_NAME"), author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// Path to the state-snapshot file to dump
    pub snapshot: PathBuf,
}

pub fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    let Cli { snapshot } = Cli::parse_from(args);
    setup_minimal_logger();

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = dump::dump(&snapshot, &mut out);
    // The document is append-only streamed text: keep whatever was already
    // written even when the run aborts partway.
    out.flush()?;
    result.with_context(|| format!("failed to dump snapshot {}", snapshot.display()))
}

// Log warnings to stderr; `RUST_LOG` overrides.
fn setup_minimal_logger() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(LevelFilter::WARN.into())
                        .from_env_lossy(),
                ),
        )
        .init();
}
