// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
//! Budgeted recursive decoding of table row bytes against an [`AbiSchema`].

use super::{AbiSchema, StructDef, VariantDef};
use crate::wire::{
    Asset, BlockTimestamp, Bytes, Checksum160, Checksum256, Checksum512, Float128, Name,
    PublicKey, Readable, Signature, Symbol, SymbolCode, TimePoint, TimePointSec, Varint32,
    Varuint32,
};
use serde_json::{Map, Number, Value};
use std::io;
use thiserror::Error;

/// Deepest type nesting followed for one row. Same cap as the producer's
/// decoder; self-referential struct or variant definitions hit this instead
/// of the call stack.
const MAX_RECURSION_DEPTH: u32 = 32;

/// Upper bound on the decode work spent on one table row.
///
/// The producer bounded row decoding with a 20 second wall-clock deadline; a
/// work-unit budget gives the same protection against pathological schemas
/// (typedef cycles, billion-element arrays) without being timing dependent.
#[derive(Debug, Clone, Copy)]
pub struct DecodeBudget {
    remaining: u64,
}

impl DecodeBudget {
    pub const DEFAULT_UNITS: u64 = 20_000_000;

    pub fn new(units: u64) -> Self {
        DecodeBudget { remaining: units }
    }

    fn consume(&mut self, units: u64) -> Result<(), DecodeError> {
        self.remaining = self
            .remaining
            .checked_sub(units)
            .ok_or(DecodeError::BudgetExceeded)?;
        Ok(())
    }
}

impl Default for DecodeBudget {
    fn default() -> Self {
        DecodeBudget::new(Self::DEFAULT_UNITS)
    }
}

/// Row-level decode failures. Always caught at the call site and replaced by
/// an empty placeholder object; never propagated across the section pass.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown type {0}")]
    UnknownType(String),
    #[error("decode budget exceeded")]
    BudgetExceeded,
    #[error("invalid optional flag {0:#04x}")]
    BadOptionalFlag(u8),
    #[error("variant index {index} out of range for {variant}")]
    BadVariantIndex { variant: String, index: u32 },
    #[error("type nesting deeper than {} levels", MAX_RECURSION_DEPTH)]
    DepthExceeded,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AbiSchema {
    /// Decode `bytes` as `type_name`, mirroring the schema's field names in
    /// the produced JSON. Trailing bytes after a complete value are
    /// tolerated, matching the producer's decoder.
    pub fn binary_to_json(
        &self,
        type_name: &str,
        bytes: &[u8],
        budget: &mut DecodeBudget,
    ) -> Result<Value, DecodeError> {
        let mut input = bytes;
        self.decode_type(type_name, &mut input, budget, 0)
    }

    /// Chase typedef links. Budget-guarded, so alias cycles terminate.
    fn resolve_alias<'a>(
        &'a self,
        mut type_name: &'a str,
        budget: &mut DecodeBudget,
    ) -> Result<&'a str, DecodeError> {
        while let Some(next) = self.typedef(type_name) {
            budget.consume(1)?;
            type_name = next;
        }
        Ok(type_name)
    }

    fn decode_type(
        &self,
        type_name: &str,
        input: &mut &[u8],
        budget: &mut DecodeBudget,
        depth: u32,
    ) -> Result<Value, DecodeError> {
        if depth > MAX_RECURSION_DEPTH {
            return Err(DecodeError::DepthExceeded);
        }
        budget.consume(1)?;
        let type_name = self.resolve_alias(type_name, budget)?;

        if let Some(inner) = type_name.strip_suffix('$') {
            // Binary extension: simply absent once the stream has run dry.
            if input.is_empty() {
                return Ok(Value::Null);
            }
            return self.decode_type(inner, input, budget, depth + 1);
        }
        if let Some(inner) = type_name.strip_suffix("[]") {
            let Varuint32(count) = Varuint32::read_from(&mut *input)?;
            budget.consume(u64::from(count))?;
            let mut items = Vec::with_capacity((count as usize).min(4096));
            for _ in 0..count {
                items.push(self.decode_type(inner, input, budget, depth + 1)?);
            }
            return Ok(Value::Array(items));
        }
        if let Some(inner) = type_name.strip_suffix('?') {
            return match u8::read_from(&mut *input)? {
                0 => Ok(Value::Null),
                1 => self.decode_type(inner, input, budget, depth + 1),
                other => Err(DecodeError::BadOptionalFlag(other)),
            };
        }

        if let Some(value) = decode_builtin(type_name, input, budget)? {
            return Ok(value);
        }
        if let Some(def) = self.struct_def(type_name) {
            return self.decode_struct(def, input, budget, depth);
        }
        if let Some(def) = self.variant_def(type_name) {
            return self.decode_variant(def, input, budget, depth);
        }
        Err(DecodeError::UnknownType(type_name.to_string()))
    }

    fn decode_struct(
        &self,
        def: &StructDef,
        input: &mut &[u8],
        budget: &mut DecodeBudget,
        depth: u32,
    ) -> Result<Value, DecodeError> {
        let mut object = Map::new();
        self.decode_struct_into(def, input, budget, &mut object, depth)?;
        Ok(Value::Object(object))
    }

    fn decode_struct_into(
        &self,
        def: &StructDef,
        input: &mut &[u8],
        budget: &mut DecodeBudget,
        object: &mut Map<String, Value>,
        depth: u32,
    ) -> Result<(), DecodeError> {
        // Base chains can be cyclic too; bound them like field recursion.
        if depth > MAX_RECURSION_DEPTH {
            return Err(DecodeError::DepthExceeded);
        }
        if !def.base.is_empty() {
            budget.consume(1)?;
            let base = self.resolve_alias(&def.base, budget)?;
            let base_def = self
                .struct_def(base)
                .ok_or_else(|| DecodeError::UnknownType(def.base.clone()))?;
            self.decode_struct_into(base_def, input, budget, object, depth + 1)?;
        }
        for field in &def.fields {
            // Binary-extension fields stop materializing at end of stream.
            // The `$` marker may hide behind a typedef alias, so resolve
            // before testing for it.
            let field_type = self.resolve_alias(&field.type_name, budget)?;
            if field_type.ends_with('$') && input.is_empty() {
                break;
            }
            let value = self.decode_type(field_type, input, budget, depth + 1)?;
            object.insert(field.name.clone(), value);
        }
        Ok(())
    }

    fn decode_variant(
        &self,
        def: &VariantDef,
        input: &mut &[u8],
        budget: &mut DecodeBudget,
        depth: u32,
    ) -> Result<Value, DecodeError> {
        let Varuint32(index) = Varuint32::read_from(&mut *input)?;
        let alternative =
            def.types
                .get(index as usize)
                .ok_or_else(|| DecodeError::BadVariantIndex {
                    variant: def.name.clone(),
                    index,
                })?;
        // The producer's JSON form for a variant is ["type", value].
        Ok(Value::Array(vec![
            Value::String(alternative.clone()),
            self.decode_type(alternative, input, budget, depth + 1)?,
        ]))
    }
}

fn float_json(value: f64) -> Value {
    // NaN and infinities have no JSON number form; fall back to a string.
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

fn decode_builtin(
    type_name: &str,
    input: &mut &[u8],
    budget: &mut DecodeBudget,
) -> Result<Option<Value>, DecodeError> {
    let value = match type_name {
        "bool" => Value::Bool(bool::read_from(&mut *input)?),
        "int8" => Value::from(i8::read_from(&mut *input)?),
        "uint8" => Value::from(u8::read_from(&mut *input)?),
        "int16" => Value::from(i16::read_from(&mut *input)?),
        "uint16" => Value::from(u16::read_from(&mut *input)?),
        "int32" => Value::from(i32::read_from(&mut *input)?),
        "uint32" => Value::from(u32::read_from(&mut *input)?),
        "int64" => Value::from(i64::read_from(&mut *input)?),
        "uint64" => Value::from(u64::read_from(&mut *input)?),
        // No JSON number holds 128 bits; decimal strings instead.
        "int128" => Value::String(i128::read_from(&mut *input)?.to_string()),
        "uint128" => Value::String(u128::read_from(&mut *input)?.to_string()),
        "varint32" => Value::from(Varint32::read_from(&mut *input)?.0),
        "varuint32" => Value::from(Varuint32::read_from(&mut *input)?.0),
        "float32" => float_json(f64::from(f32::read_from(&mut *input)?)),
        "float64" => float_json(f64::read_from(&mut *input)?),
        "float128" => Value::String(hex::encode(Float128::read_from(&mut *input)?.0)),
        "time_point" => Value::String(TimePoint::read_from(&mut *input)?.to_string()),
        "time_point_sec" => Value::String(TimePointSec::read_from(&mut *input)?.to_string()),
        "block_timestamp_type" => {
            Value::String(BlockTimestamp::read_from(&mut *input)?.to_string())
        }
        "name" => Value::String(Name::read_from(&mut *input)?.to_string()),
        "string" => {
            let s = String::read_from(&mut *input)?;
            budget.consume(s.len() as u64)?;
            Value::String(s)
        }
        "bytes" => {
            let bytes = Bytes::read_from(&mut *input)?;
            budget.consume(bytes.len() as u64)?;
            Value::String(hex::encode(&bytes.0))
        }
        "checksum160" => Value::String(Checksum160::read_from(&mut *input)?.to_string()),
        "checksum256" => Value::String(Checksum256::read_from(&mut *input)?.to_string()),
        "checksum512" => Value::String(Checksum512::read_from(&mut *input)?.to_string()),
        "public_key" => Value::String(PublicKey::read_from(&mut *input)?.to_string()),
        "signature" => Value::String(Signature::read_from(&mut *input)?.to_string()),
        "symbol" => Value::String(Symbol::read_from(&mut *input)?.to_string()),
        "symbol_code" => Value::String(SymbolCode::read_from(&mut *input)?.to_string()),
        "asset" => Value::String(Asset::read_from(&mut *input)?.to_string()),
        "extended_asset" => {
            let quantity = Asset::read_from(&mut *input)?;
            let contract = Name::read_from(&mut *input)?;
            let mut object = Map::new();
            object.insert("quantity".to_string(), Value::String(quantity.to_string()));
            object.insert("contract".to_string(), Value::String(contract.to_string()));
            Value::Object(object)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}
