//! Serde deserialization for values and containers.
//!
//! - `Deserialize` for [`Value`] and [`Args`] loads a container from any self-describing
//!   serde format, for example a JSON configuration file.
//! - [`from_args`] reads a typed struct back out of a container, borrowing strings
//!   from it where the target type allows.
//!
//! Sequences must be homogeneous: integer sequences become `I`, sequences mixing
//! integers and floats become `D`, and nested sequences are rejected. Booleans are
//! stored as integers and read back from them.
//!
//! ## Examples
//!
//! ```rust
//! use dynargs::{from_args, Args};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Window<'a> { title: &'a str, size: Vec<i32>, visible: bool, opacity: Option<f64> }
//!
//! let args: Args = serde_json::from_str(
//!     r#"{"title": "plot", "size": [640, 480], "visible": true}"#,
//! ).unwrap();
//! assert_eq!(args.at("size").unwrap().format(), "nI");
//!
//! let window: Window = from_args(&args).unwrap();
//! assert_eq!(window, Window { title: "plot", size: vec![640, 480], visible: true, opacity: None });
//! ```

use crate::value::collect_array;
use crate::{Args, Error, Result, SharedArg, Value, ValueRef};
use serde::de::{self, Deserialize, Deserializer, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde::forward_to_deserialize_any;
use std::fmt;

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, string, homogeneous sequence or map")
    }

    fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
        Ok(Value::Int(i32::from(value)))
    }

    fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
        Ok(match i32::try_from(value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Double(value as f64),
        })
    }

    fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
        Ok(match i32::try_from(value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Double(value as f64),
        })
    }

    fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
        Ok(Value::Double(value))
    }

    fn visit_char<E>(self, value: char) -> std::result::Result<Value, E> {
        Ok(Value::Char(value))
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
        Ok(Value::String(value))
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        collect_array(items).map_err(de::Error::custom)
    }

    fn visit_map<A>(self, map: A) -> std::result::Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        ArgsVisitor.visit_map(map).map(Value::Args)
    }
}

struct ArgsVisitor;

impl<'de> Visitor<'de> for ArgsVisitor {
    type Value = Args;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with string keys")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Args, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut args = Args::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            args.push_value(&key, value);
        }
        Ok(args)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Args {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ArgsVisitor)
    }
}

/// Deserializes a `T` from the entries of a container.
///
/// Anonymous entries are skipped. Entries holding several data slots are read as
/// sequences.
///
/// # Errors
///
/// Returns an error if the stored values do not match the shape of `T`.
pub fn from_args<'a, T>(args: &'a Args) -> Result<T>
where
    T: Deserialize<'a>,
{
    T::deserialize(ValueRefDeserializer::new(ValueRef::Args(args)))
}

/// Deserializes a `T` from a single value.
///
/// # Examples
///
/// ```rust
/// use dynargs::{from_value, Value};
///
/// let ticks: Vec<f64> = from_value(&Value::from(vec![0.5, 1.0])).unwrap();
/// assert_eq!(ticks, vec![0.5, 1.0]);
/// ```
pub fn from_value<'a, T>(value: &'a Value) -> Result<T>
where
    T: Deserialize<'a>,
{
    T::deserialize(ValueRefDeserializer::new(value.as_view()))
}

/// A deserializer reading from a borrowed value.
struct ValueRefDeserializer<'a> {
    value: ValueRef<'a>,
}

impl<'a> ValueRefDeserializer<'a> {
    fn new(value: ValueRef<'a>) -> Self {
        ValueRefDeserializer { value }
    }
}

impl<'de> Deserializer<'de> for ValueRefDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            ValueRef::Int(i) => visitor.visit_i32(i),
            ValueRef::Double(d) => visitor.visit_f64(d),
            ValueRef::Char(c) => visitor.visit_char(c),
            ValueRef::Str(s) => visitor.visit_borrowed_str(s),
            ValueRef::Args(args) => visitor.visit_map(EntryAccess::new(args)),
            array => visitor.visit_seq(ElementAccess::new(array)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            ValueRef::Int(i) => visitor.visit_bool(i != 0),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            ValueRef::Str(variant) => visitor.visit_enum(variant.into_deserializer()),
            _ => Err(Error::custom("enums are stored as strings")),
        }
    }

    forward_to_deserialize_any! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

/// Walks the elements of an array value.
struct ElementAccess<'a> {
    array: ValueRef<'a>,
    index: usize,
}

impl<'a> ElementAccess<'a> {
    fn new(array: ValueRef<'a>) -> Self {
        ElementAccess { array, index: 0 }
    }

    fn len(&self) -> usize {
        match self.array {
            ValueRef::Ints(v) => v.len(),
            ValueRef::Doubles(v) => v.len(),
            ValueRef::Strs(v) => v.len(),
            ValueRef::ArgsArray(v) => v.len(),
            _ => 0,
        }
    }

    fn element(&self) -> Option<ValueRef<'a>> {
        match self.array {
            ValueRef::Ints(v) => v.get(self.index).map(|i| ValueRef::Int(*i)),
            ValueRef::Doubles(v) => v.get(self.index).map(|d| ValueRef::Double(*d)),
            ValueRef::Strs(v) => v.get(self.index).map(|s| ValueRef::Str(s)),
            ValueRef::ArgsArray(v) => v.get(self.index).map(ValueRef::Args),
            _ => None,
        }
    }
}

impl<'de> SeqAccess<'de> for ElementAccess<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.element() {
            Some(element) => {
                self.index += 1;
                seed.deserialize(ValueRefDeserializer::new(element)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len() - self.index)
    }
}

/// Walks the slots of an entry holding several values.
struct SlotAccess<'a> {
    slots: std::slice::Iter<'a, Value>,
}

impl<'de> SeqAccess<'de> for SlotAccess<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.slots.next() {
            Some(value) => seed
                .deserialize(ValueRefDeserializer::new(value.as_view()))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.slots.len())
    }
}

/// Walks the named entries of a container.
struct EntryAccess<'a> {
    entries: crate::args::Iter<'a>,
    current: Option<&'a SharedArg>,
}

impl<'a> EntryAccess<'a> {
    fn new(args: &'a Args) -> Self {
        EntryAccess {
            entries: args.iter(),
            current: None,
        }
    }
}

impl<'de> MapAccess<'de> for EntryAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        for arg in self.entries.by_ref() {
            if let Some(key) = arg.key() {
                self.current = Some(arg);
                return seed
                    .deserialize(ValueRefDeserializer::new(ValueRef::Str(key)))
                    .map(Some);
            }
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let arg = self
            .current
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        match arg.values() {
            [value] => seed.deserialize(ValueRefDeserializer::new(value.as_view())),
            values => seed.deserialize(SlotDeserializer(values)),
        }
    }
}

/// Presents the slots of a multi-slot entry as one sequence.
struct SlotDeserializer<'a>(&'a [Value]);

impl<'de> Deserializer<'de> for SlotDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(SlotAccess {
            slots: self.0.iter(),
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Param;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    enum Kind {
        Line,
        Scatter,
    }

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Series {
        kind: Kind,
        x: Vec<f64>,
        label: String,
    }

    #[test]
    fn test_value_from_json() {
        let value: Value = serde_json::from_str("[1, 2.5]").unwrap();
        assert_eq!(value, Value::DoubleArray(vec![1.0, 2.5]));

        let value: Value = serde_json::from_str("4000000000").unwrap();
        assert_eq!(value, Value::Double(4_000_000_000.0));

        assert!(serde_json::from_str::<Value>("[1, \"a\"]").is_err());
        assert!(serde_json::from_str::<Value>("[[1], [2]]").is_err());
        assert!(serde_json::from_str::<Value>("null").is_err());
    }

    #[test]
    fn test_args_from_json_keeps_order() {
        let args: Args = serde_json::from_str(r#"{"b": 1, "a": {"c": "x"}}"#).unwrap();
        let keys: Vec<_> = args.iter().filter_map(|arg| arg.key()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(args.at("a").unwrap().format(), "a");
    }

    #[test]
    fn test_from_args_struct() {
        let mut args = Args::new();
        args.push("kind", "s", [Param::Str("Scatter")]).unwrap();
        args.push("x", "dd", [Param::Double(1.0), Param::Double(2.0)])
            .unwrap();
        args.push("label", "C", [Param::Str("points")]).unwrap();
        args.push_anonymous("i", [Param::Int(0)]).unwrap();

        let series: Series = from_args(&args).unwrap();
        assert_eq!(
            series,
            Series {
                kind: Kind::Scatter,
                x: vec![1.0, 2.0],
                label: "points".to_string(),
            }
        );
        assert_ne!(series.kind, Kind::Line);
    }

    #[test]
    fn test_from_args_multi_slot_entry() {
        let mut args = Args::new();
        args.push("k", "iI", [Param::Int(1), Param::Ints(&[2, 3])])
            .unwrap();
        #[derive(serde::Deserialize)]
        struct Entry {
            k: (i32, Vec<i32>),
        }
        let entry: Entry = from_args(&args).unwrap();
        assert_eq!(entry.k, (1, vec![2, 3]));
    }

    #[test]
    fn test_from_args_type_mismatch() {
        let mut args = Args::new();
        args.push("kind", "i", [Param::Int(1)]).unwrap();
        args.push("x", "D", [Param::Doubles(&[])]).unwrap();
        args.push("label", "s", [Param::Str("l")]).unwrap();
        assert!(from_args::<Series>(&args).is_err());
    }
}
