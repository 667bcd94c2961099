// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! Forward-only streaming JSON writer.
//!
//! The document is emitted as it is decoded — the contract-tables section
//! alone can hold millions of rows, so nothing already written is buffered or
//! revisited. The emitter owns the structural tokens (braces, separators, key
//! quoting) and keeps one field per line; leaf values are serialized
//! compactly by serde_json onto the current line.

use serde::Serialize;
use std::io::{self, Write};

pub struct JsonEmitter<W> {
    out: W,
    /// One flag per open container: has it written an element yet?
    stack: Vec<bool>,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(out: W) -> Self {
        JsonEmitter {
            out,
            stack: Vec::new(),
        }
    }

    pub fn begin_object(&mut self) -> io::Result<()> {
        self.out.write_all(b"{")?;
        self.stack.push(false);
        Ok(())
    }

    pub fn end_object(&mut self) -> io::Result<()> {
        self.pop();
        self.out.write_all(b"\n}")
    }

    pub fn begin_array(&mut self) -> io::Result<()> {
        self.out.write_all(b"[")?;
        self.stack.push(false);
        Ok(())
    }

    pub fn end_array(&mut self) -> io::Result<()> {
        self.pop();
        self.out.write_all(b"\n]")
    }

    /// `"name":<value>` on its own line.
    pub fn field<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> io::Result<()> {
        self.write_key(name)?;
        self.write_value(value)
    }

    /// `"name":{`, leaving the object open for nested writes.
    pub fn field_object(&mut self, name: &str) -> io::Result<()> {
        self.write_key(name)?;
        self.begin_object()
    }

    /// `"name":[`, leaving the array open.
    pub fn field_array(&mut self, name: &str) -> io::Result<()> {
        self.write_key(name)?;
        self.begin_array()
    }

    /// One array element on its own line.
    pub fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        self.separator()?;
        self.write_value(value)
    }

    /// `{` as an array element, left open.
    pub fn begin_element_object(&mut self) -> io::Result<()> {
        self.separator()?;
        self.begin_object()
    }

    /// Terminate the document line and flush.
    pub fn finish(&mut self) -> io::Result<()> {
        debug_assert!(self.stack.is_empty(), "unclosed containers at finish");
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    fn separator(&mut self) -> io::Result<()> {
        match self.stack.last_mut() {
            Some(written) if *written => self.out.write_all(b",\n"),
            Some(written) => {
                *written = true;
                self.out.write_all(b"\n")
            }
            None => Ok(()),
        }
    }

    fn write_key(&mut self, name: &str) -> io::Result<()> {
        self.separator()?;
        serde_json::to_writer(&mut self.out, name).map_err(io::Error::from)?;
        self.out.write_all(b":")
    }

    fn write_value<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value).map_err(io::Error::from)
    }

    fn pop(&mut self) {
        let open = self.stack.pop();
        debug_assert!(open.is_some(), "closed a container that was never opened");
    }
}
