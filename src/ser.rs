//! Serde serialization for values and containers.
//!
//! This module provides two directions:
//!
//! - `Serialize` for [`Value`] and [`Args`], so a container can be written with any serde
//!   format. A container serializes as a map in insertion order; an entry with several
//!   data slots serializes as a sequence of its slots.
//! - [`ValueSerializer`], a serde `Serializer` that turns any `T: Serialize` into a
//!   [`Value`], and the [`to_value`] / [`to_args`] helpers built on it.
//!
//! ## Type Mapping
//!
//! | Rust | Stored as |
//! |------|-----------|
//! | `bool` | `i` (0 or 1) |
//! | integers fitting `i32` | `i` |
//! | other integers, floats | `d` |
//! | `char` | `c` |
//! | `&str`, `String`, unit variants | `s` |
//! | sequences of scalars | `I`, `D`, `S` or `A` |
//! | maps, structs | `a` |
//!
//! `None` and unit values have no representation: fields holding them are left out of
//! the container.
//!
//! ## Examples
//!
//! ```rust
//! use dynargs::{to_args, ValueRef};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Axis { label: String, ticks: Vec<f64>, log: bool }
//!
//! let axis = Axis { label: "time".into(), ticks: vec![0.0, 0.5], log: false };
//! let args = to_args(&axis).unwrap();
//! assert_eq!(args.at("ticks").unwrap().format(), "nD");
//! assert_eq!(args.first_value("log", "i").unwrap().0, ValueRef::Int(0));
//! ```

use crate::value::collect_array;
use crate::{Args, Error, Result, Value};
use serde::ser::{self, Serialize, SerializeMap as _, Serializer};

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Int(i) => serializer.serialize_i32(*i),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::String(s) => serializer.serialize_str(s),
            Value::Args(args) => args.serialize(serializer),
            Value::IntArray(v) => v.serialize(serializer),
            Value::DoubleArray(v) => v.serialize(serializer),
            Value::StringArray(v) => v.serialize(serializer),
            Value::ArgsArray(v) => v.serialize(serializer),
        }
    }
}

impl Serialize for Args {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.count()))?;
        for arg in self {
            let key = arg.key();
            match (key, arg.values()) {
                (Some(key), [value]) => map.serialize_entry(key, value)?,
                (Some(key), values) => map.serialize_entry(key, values)?,
                (None, [value]) => map.serialize_entry(&key, value)?,
                (None, values) => map.serialize_entry(&key, values)?,
            }
        }
        map.end()
    }
}

/// Serializes any `T: Serialize` into a [`Value`].
///
/// # Errors
///
/// Returns an error for values without a representation (`None`, unit, variants with
/// data) and for sequences mixing types.
///
/// # Examples
///
/// ```rust
/// use dynargs::{to_value, Value};
///
/// assert_eq!(to_value(&7u8).unwrap(), Value::Int(7));
/// assert_eq!(to_value(&vec![1, 2]).unwrap(), Value::from(vec![1, 2]));
/// assert!(to_value(&()).is_err());
/// ```
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value
        .serialize(ValueSerializer)?
        .ok_or_else(|| Error::unsupported_shape("empty values cannot be stored"))
}

/// Serializes a struct or map into a container.
///
/// # Errors
///
/// Fails like [`to_value`], and if `value` does not serialize as a map.
pub fn to_args<T>(value: &T) -> Result<Args>
where
    T: ?Sized + Serialize,
{
    match to_value(value)? {
        Value::Args(args) => Ok(args),
        other => Err(Error::custom(format!(
            "expected a map or struct, found {}",
            other.canonical_format()
        ))),
    }
}

/// A serde `Serializer` producing [`Value`]s; `None` marks values to be left out.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeMap {
    args: Args,
    current_key: Option<String>,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = ser::Impossible<Option<Value>, Error>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = ser::Impossible<Option<Value>, Error>;

    fn serialize_bool(self, v: bool) -> Result<Option<Value>> {
        Ok(Some(Value::Int(i32::from(v))))
    }

    fn serialize_i8(self, v: i8) -> Result<Option<Value>> {
        Ok(Some(Value::Int(i32::from(v))))
    }

    fn serialize_i16(self, v: i16) -> Result<Option<Value>> {
        Ok(Some(Value::Int(i32::from(v))))
    }

    fn serialize_i32(self, v: i32) -> Result<Option<Value>> {
        Ok(Some(Value::Int(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Option<Value>> {
        Ok(Some(match i32::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Double(v as f64),
        }))
    }

    fn serialize_u8(self, v: u8) -> Result<Option<Value>> {
        Ok(Some(Value::Int(i32::from(v))))
    }

    fn serialize_u16(self, v: u16) -> Result<Option<Value>> {
        Ok(Some(Value::Int(i32::from(v))))
    }

    fn serialize_u32(self, v: u32) -> Result<Option<Value>> {
        Ok(Some(match i32::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Double(f64::from(v)),
        }))
    }

    fn serialize_u64(self, v: u64) -> Result<Option<Value>> {
        Ok(Some(match i32::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Double(v as f64),
        }))
    }

    fn serialize_f32(self, v: f32) -> Result<Option<Value>> {
        Ok(Some(Value::Double(f64::from(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Option<Value>> {
        Ok(Some(Value::Double(v)))
    }

    fn serialize_char(self, v: char) -> Result<Option<Value>> {
        Ok(Some(Value::Char(v)))
    }

    fn serialize_str(self, v: &str) -> Result<Option<Value>> {
        Ok(Some(Value::String(v.to_string())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Option<Value>> {
        Ok(Some(Value::IntArray(v.iter().map(|&b| i32::from(b)).collect())))
    }

    fn serialize_none(self) -> Result<Option<Value>> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Option<Value>> {
        Ok(None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Option<Value>> {
        Ok(None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Option<Value>> {
        Ok(Some(Value::String(variant.to_string())))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::custom(format!(
            "enum variant \"{}\" with data cannot be stored",
            variant
        )))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::custom(format!(
            "enum variant \"{}\" with data cannot be stored",
            variant
        )))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::custom(format!(
            "enum variant \"{}\" with data cannot be stored",
            variant
        )))
    }
}

impl SerializeVec {
    fn new(capacity: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Option<Value>> {
        collect_array(self.vec).map(Some)
    }
}

impl SerializeMap {
    fn new(capacity: usize) -> Self {
        SerializeMap {
            args: Args::with_capacity(capacity),
            current_key: None,
        }
    }

    fn insert<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        if let Some(value) = value.serialize(ValueSerializer)? {
            self.args.push_value(key, value);
        }
        Ok(())
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        self.finish()
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)? {
            Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            _ => Err(Error::invalid_key("map keys must be strings")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.insert(&key, value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(Some(Value::Args(self.args)))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key, value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(Some(Value::Args(self.args)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Param, ValueRef};
    use std::collections::BTreeMap;

    #[derive(serde::Serialize)]
    struct Legend {
        location: Option<String>,
        entries: Vec<String>,
    }

    #[derive(serde::Serialize)]
    enum Scale {
        Linear,
    }

    #[test]
    fn test_to_value_numbers() {
        assert_eq!(to_value(&true).unwrap(), Value::Int(1));
        assert_eq!(to_value(&-3i64).unwrap(), Value::Int(-3));
        assert_eq!(to_value(&u32::MAX).unwrap(), Value::Double(f64::from(u32::MAX)));
        assert_eq!(to_value(&1.5f32).unwrap(), Value::Double(1.5));
        assert_eq!(to_value(&Scale::Linear).unwrap(), Value::from("Linear"));
    }

    #[test]
    fn test_to_args_skips_none() {
        let legend = Legend {
            location: None,
            entries: vec!["a".into(), "b".into()],
        };
        let args = to_args(&legend).unwrap();
        assert!(!args.contains("location"));
        assert_eq!(args.at("entries").unwrap().format(), "nS");
    }

    #[test]
    fn test_to_args_rejects_scalars_and_mixed_sequences() {
        assert!(to_args(&5).is_err());

        let mut map = BTreeMap::new();
        map.insert("bad", (1, "one"));
        assert!(matches!(to_args(&map), Err(Error::UnsupportedShape(_))));
    }

    #[test]
    fn test_multi_slot_entry_is_a_nested_sequence() {
        let mut args = Args::new();
        args.push("k", "iI", [Param::Int(1), Param::Ints(&[2, 3])])
            .unwrap();
        assert!(matches!(to_value(&args), Err(Error::UnsupportedShape(_))));

        let mut args = Args::new();
        args.push("k", "s", [Param::Str("x")]).unwrap();
        let value = to_value(&args).unwrap();
        let copy = value.as_args().unwrap();
        assert_eq!(copy.first_value("k", "s").unwrap().0, ValueRef::Str("x"));
    }
}
