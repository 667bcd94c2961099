// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! Sectioned snapshot container.
//!
//! A snapshot file is a magic/version header followed by named sections, each
//! carrying a logical row count and an opaque row stream. [`SnapshotReader`]
//! indexes the sections once, then hands out a [`SectionCursor`] per section.
//! The cursor advances exactly one logical row per read, whatever shape that
//! row has; sections such as `contract_tables` interleave count rows, table
//! rows and index rows in one stream.

use crate::wire::Readable;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAGIC: u32 = 0x30510550;
pub const FORMAT_VERSION: u32 = 1;

/// Fatal snapshot conditions. Everything here aborts the run; recoverable
/// per-row failures never surface through this type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("snapshot {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("snapshot {} is not a regular file", .0.display())]
    NotRegularFile(PathBuf),
    #[error("bad snapshot magic number {0:#010x}")]
    BadMagic(u32),
    #[error("unsupported snapshot format version {0}")]
    UnsupportedVersion(u32),
    #[error("{0} section does not exist")]
    MissingSection(String),
    #[error("empty {0} section")]
    EmptySection(&'static str),
    #[error("attempted to read past the last row of section {0}")]
    RowsExhausted(String),
    #[error("row data overruns the bounds of section {0}")]
    SectionOverrun(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
struct SectionInfo {
    name: String,
    rows: u64,
    payload: u64,
    end: u64,
}

/// Random-access reader over the section index of one snapshot file.
#[derive(Debug)]
pub struct SnapshotReader<R> {
    reader: R,
    sections: Vec<SectionInfo>,
}

impl SnapshotReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        if !meta.is_file() {
            return Err(Error::NotRegularFile(path.to_path_buf()));
        }
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> SnapshotReader<R> {
    /// Validate the file header and index every section, seeking over row
    /// data. Row bytes are only touched later, section by section.
    pub fn new(mut reader: R) -> Result<Self, Error> {
        let magic = u32::read_from(&mut reader)?;
        if magic != MAGIC {
            return Err(Error::BadMagic(magic));
        }
        let version = u32::read_from(&mut reader)?;
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let mut sections = Vec::new();
        loop {
            // The section list ends with a zero size marker or clean EOF.
            let size = match u64::read_from(&mut reader) {
                Ok(size) => size,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            };
            if size == 0 {
                break;
            }
            let start = reader.stream_position()?;
            let end = start.checked_add(size).ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "section size overflows file offset")
            })?;
            let rows = u64::read_from(&mut reader)?;
            let name = read_section_name(&mut reader)?;
            let payload = reader.stream_position()?;
            if payload > end {
                return Err(Error::SectionOverrun(name));
            }
            sections.push(SectionInfo {
                name,
                rows,
                payload,
                end,
            });
            reader.seek(SeekFrom::Start(end))?;
        }
        Ok(SnapshotReader { reader, sections })
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s.name == name)
    }

    /// Seek to `name` and run `handler` with a cursor over its rows.
    pub fn read_section<T>(
        &mut self,
        name: &str,
        handler: impl FnOnce(&mut SectionCursor<'_, R>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let section = self
            .sections
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::MissingSection(name.to_string()))?;
        let (rows, payload, end) = (section.rows, section.payload, section.end);
        self.reader.seek(SeekFrom::Start(payload))?;
        let mut cursor = SectionCursor {
            reader: &mut self.reader,
            name,
            remaining: rows,
            end,
        };
        handler(&mut cursor)
    }
}

fn read_section_name(mut reader: impl Read) -> io::Result<String> {
    let mut bytes = Vec::new();
    loop {
        let byte = u8::read_from(&mut reader)?;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
        if bytes.len() > 4096 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "unterminated section name",
            ));
        }
    }
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Ordered row stream of one section.
///
/// Row shapes may differ between successive reads; the only bookkeeping here
/// is that each read consumes exactly one logical row and stays inside the
/// section's byte range.
pub struct SectionCursor<'a, R> {
    reader: &'a mut R,
    name: &'a str,
    remaining: u64,
    end: u64,
}

impl<R: Read + Seek> SectionCursor<'_, R> {
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    pub fn has_more(&self) -> bool {
        self.remaining > 0
    }

    pub fn read_row<T: Readable>(&mut self) -> Result<T, Error> {
        self.read_row_with(|reader| T::read_from(reader))
    }

    /// Like [`Self::read_row`] for shapes that need runtime parameters, e.g.
    /// secondary-index rows whose width depends on the key kind.
    pub fn read_row_with<T>(
        &mut self,
        decode: impl FnOnce(&mut R) -> io::Result<T>,
    ) -> Result<T, Error> {
        if self.remaining == 0 {
            return Err(Error::RowsExhausted(self.name.to_string()));
        }
        let value = decode(&mut *self.reader)?;
        self.remaining -= 1;
        if self.reader.stream_position()? > self.end {
            return Err(Error::SectionOverrun(self.name.to_string()));
        }
        Ok(value)
    }
}
