//! Pluggable JSON encoders and decoders carried on a `Resource`.
//!
//! # Design
//! Typed values cross into the codec as `serde_json::Value`, which keeps the
//! traits object safe so a `Resource` can hold them behind `Arc<dyn _>`.
//! The stock `JsonEncoder` / `JsonDecoder` cover key-naming strategies and
//! output formatting; anything more specialised (custom date formats, an
//! envelope around every payload) is a caller-provided impl.

use std::fmt::Debug;

use heck::{ToLowerCamelCase, ToSnakeCase};
use serde::ser::{self, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure inside an encoder or decoder.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

/// Serializes an intermediate JSON value into request body bytes.
pub trait Encoder: Send + Sync + Debug {
    fn encode(&self, value: Value) -> Result<Vec<u8>, CodecError>;
}

/// Parses response body bytes into an intermediate JSON value.
pub trait Decoder: Send + Sync + Debug {
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;
}

/// How object keys are rewritten before encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyEncodingStrategy {
    #[default]
    UseDefaultKeys,
    /// `createdAt` becomes `created_at`.
    ConvertToSnakeCase,
}

/// How object keys are rewritten after decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyDecodingStrategy {
    #[default]
    UseDefaultKeys,
    /// `created_at` becomes `createdAt`.
    ConvertFromSnakeCase,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormatting {
    #[default]
    Compact,
    Pretty,
}

/// The default request encoder.
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    pub key_strategy: KeyEncodingStrategy,
    pub output: OutputFormatting,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_strategy(mut self, strategy: KeyEncodingStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    pub fn output(mut self, output: OutputFormatting) -> Self {
        self.output = output;
        self
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, value: Value) -> Result<Vec<u8>, CodecError> {
        let value = match self.key_strategy {
            KeyEncodingStrategy::UseDefaultKeys => value,
            KeyEncodingStrategy::ConvertToSnakeCase => rewrite_keys(value, &to_snake_case),
        };
        let bytes = match self.output {
            OutputFormatting::Compact => serde_json::to_vec(&value)?,
            OutputFormatting::Pretty => serde_json::to_vec_pretty(&value)?,
        };
        Ok(bytes)
    }
}

/// The default response decoder.
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    pub key_strategy: KeyDecodingStrategy,
}

impl JsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_strategy(mut self, strategy: KeyDecodingStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }
}

impl Decoder for JsonDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(match self.key_strategy {
            KeyDecodingStrategy::UseDefaultKeys => value,
            KeyDecodingStrategy::ConvertFromSnakeCase => rewrite_keys(value, &to_camel_case),
        })
    }
}

fn rewrite_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (rename(&k), rewrite_keys(v, rename)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| rewrite_keys(v, rename)).collect())
        }
        other => other,
    }
}

fn to_snake_case(key: &str) -> String {
    with_edge_underscores(key, |core| core.to_snake_case())
}

fn to_camel_case(key: &str) -> String {
    with_edge_underscores(key, |core| core.to_lower_camel_case())
}

/// Apply `convert` to the key with its leading and trailing underscores
/// set aside, then put them back.
fn with_edge_underscores(key: &str, convert: impl Fn(&str) -> String) -> String {
    let core = key.trim_matches('_');
    if core.is_empty() {
        return key.to_string();
    }
    let lead = &key[..key.len() - key.trim_start_matches('_').len()];
    let trail = &key[key.trim_end_matches('_').len()..];
    format!("{lead}{}{trail}", convert(core))
}

/// Walk `value`'s serialization and fail on NaN or infinite floats.
///
/// `serde_json` writes those as `null`, which would silently change the
/// payload, so callers run this before encoding.
pub(crate) fn ensure_finite<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    value.serialize(FiniteCheck)
}

struct FiniteCheck;

fn check_float(v: f64) -> Result<(), serde_json::Error> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ser::Error::custom(format!(
            "non-finite float {v} cannot be represented in JSON"
        )))
    }
}

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_i8(self, _: i8) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_i16(self, _: i16) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_i32(self, _: i32) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_i64(self, _: i64) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_i128(self, _: i128) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_u8(self, _: u8) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_u16(self, _: u16) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_u32(self, _: u32) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_u64(self, _: u64) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_u128(self, _: u128) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_f32(self, v: f32) -> Result<(), Self::Error> {
        check_float(f64::from(v))
    }
    fn serialize_f64(self, v: f64) -> Result<(), Self::Error> {
        check_float(v)
    }
    fn serialize_char(self, _: char) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_str(self, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_none(self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Self::Error> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_tuple(self, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Self::Error> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        key.serialize(FiniteCheck)
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(FiniteCheck)
    }
    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}
