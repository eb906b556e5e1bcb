//! Typed values stored inside an argument.
//!
//! This module provides the [`Value`] enum, one variant per data slot shape, and
//! [`ValueRef`], a borrowed view handed out by the extraction functions.
//!
//! ## Core Types
//!
//! - [`Value`]: an owned scalar or array of integers, doubles, strings or nested containers
//! - [`ValueRef`]: a cheap, copyable view into a stored value
//!
//! Character arrays do not exist as a separate shape: a `C` tag is stored as a
//! string, and a run of `c` scalars pushed in one call is stored as one string.
//!
//! ## Usage Patterns
//!
//! ```rust
//! use dynargs::{Value, ValueRef};
//! use std::convert::TryFrom;
//!
//! let value = Value::from(vec![1, 2, 3]);
//! assert_eq!(value.canonical_format(), "nI");
//! assert_eq!(value.len(), 3);
//!
//! let view = value.as_view();
//! let ints: &[i32] = <&[i32]>::try_from(view).unwrap();
//! assert_eq!(ints, &[1, 2, 3]);
//! ```

use crate::format::{DataType, Tag};
use crate::{Args, CopyOptions, Error, Result};
use std::fmt;

/// The contents of one data slot of an argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i32),
    Double(f64),
    Char(char),
    String(String),
    Args(Args),
    IntArray(Vec<i32>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
    ArgsArray(Vec<Args>),
}

impl Value {
    /// Returns the semantic type of this value.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) | Value::IntArray(_) => DataType::Int,
            Value::Double(_) | Value::DoubleArray(_) => DataType::Double,
            Value::Char(_) => DataType::Char,
            Value::String(_) | Value::StringArray(_) => DataType::String,
            Value::Args(_) | Value::ArgsArray(_) => DataType::Args,
        }
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(
            self,
            Value::IntArray(_) | Value::DoubleArray(_) | Value::StringArray(_) | Value::ArgsArray(_)
        )
    }

    /// Returns the format tag that describes this value.
    #[must_use]
    pub const fn tag(&self) -> Tag {
        if self.is_array() {
            Tag::Array(self.data_type())
        } else {
            Tag::Scalar(self.data_type())
        }
    }

    /// Returns the canonical format string of this single value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::Value;
    ///
    /// assert_eq!(Value::from(1.5).canonical_format(), "d");
    /// assert_eq!(Value::from(vec!["a", "b"]).canonical_format(), "nS");
    /// ```
    #[must_use]
    pub const fn canonical_format(&self) -> &'static str {
        match self {
            Value::Int(_) => "i",
            Value::Double(_) => "d",
            Value::Char(_) => "c",
            Value::String(_) => "s",
            Value::Args(_) => "a",
            Value::IntArray(_) => "nI",
            Value::DoubleArray(_) => "nD",
            Value::StringArray(_) => "nS",
            Value::ArgsArray(_) => "nA",
        }
    }

    /// Number of elements: the array length, or 1 for scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Value::IntArray(v) => v.len(),
            Value::DoubleArray(v) => v.len(),
            Value::StringArray(v) => v.len(),
            Value::ArgsArray(v) => v.len(),
            _ => 1,
        }
    }

    /// Returns `true` if this is an empty array.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_args(&self) -> Option<&Args> {
        match self {
            Value::Args(args) => Some(args),
            _ => None,
        }
    }

    /// Returns a view of the whole value: arrays as slices, scalars as themselves.
    #[must_use]
    pub fn as_view(&self) -> ValueRef<'_> {
        match self {
            Value::Int(i) => ValueRef::Int(*i),
            Value::Double(d) => ValueRef::Double(*d),
            Value::Char(c) => ValueRef::Char(*c),
            Value::String(s) => ValueRef::Str(s),
            Value::Args(args) => ValueRef::Args(args),
            Value::IntArray(v) => ValueRef::Ints(v),
            Value::DoubleArray(v) => ValueRef::Doubles(v),
            Value::StringArray(v) => ValueRef::Strs(v),
            Value::ArgsArray(v) => ValueRef::ArgsArray(v),
        }
    }

    /// Returns an array view; a scalar is viewed as an array of length one.
    #[must_use]
    pub fn as_array_view(&self) -> Option<ValueRef<'_>> {
        Some(match self {
            Value::Int(i) => ValueRef::Ints(std::slice::from_ref(i)),
            Value::Double(d) => ValueRef::Doubles(std::slice::from_ref(d)),
            Value::String(s) => ValueRef::Strs(std::slice::from_ref(s)),
            Value::Args(args) => ValueRef::ArgsArray(std::slice::from_ref(args)),
            Value::Char(_) => return None,
            array => array.as_view(),
        })
    }

    /// Returns the element at `index`; a scalar only has index 0.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<ValueRef<'_>> {
        match self {
            Value::IntArray(v) => v.get(index).map(|i| ValueRef::Int(*i)),
            Value::DoubleArray(v) => v.get(index).map(|d| ValueRef::Double(*d)),
            Value::StringArray(v) => v.get(index).map(|s| ValueRef::Str(s)),
            Value::ArgsArray(v) => v.get(index).map(ValueRef::Args),
            scalar if index == 0 => Some(scalar.as_view()),
            _ => None,
        }
    }

    /// Borrows nested containers as a slice; a scalar container is a slice of one.
    pub(crate) fn args_slice(&self) -> Option<&[Args]> {
        match self {
            Value::Args(args) => Some(std::slice::from_ref(args)),
            Value::ArgsArray(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn args_slice_mut(&mut self) -> Option<&mut [Args]> {
        match self {
            Value::Args(args) => Some(std::slice::from_mut(args)),
            Value::ArgsArray(v) => Some(v),
            _ => None,
        }
    }

    /// Appends `increment` empty elements to an array value.
    pub(crate) fn grow(&mut self, increment: usize) -> Result<()> {
        match self {
            Value::IntArray(v) => {
                v.try_reserve_exact(increment)?;
                v.resize(v.len() + increment, 0);
            }
            Value::DoubleArray(v) => {
                v.try_reserve_exact(increment)?;
                v.resize(v.len() + increment, 0.0);
            }
            Value::StringArray(v) => {
                v.try_reserve_exact(increment)?;
                v.resize_with(v.len() + increment, String::new);
            }
            Value::ArgsArray(v) => {
                v.try_reserve_exact(increment)?;
                v.resize_with(v.len() + increment, Args::new);
            }
            _ => return Err(Error::unsupported_shape("increasing a non-array value")),
        }
        Ok(())
    }
}

/// Packs a sequence of scalars into one array value.
///
/// Integers widen to doubles when both occur; characters join into a string.
/// An empty sequence becomes an empty integer array.
pub(crate) fn collect_array(items: Vec<Value>) -> Result<Value> {
    let ty = match items.first() {
        None => return Ok(Value::IntArray(Vec::new())),
        Some(first) => first.data_type(),
    };
    let mixed = || Error::unsupported_shape("sequences must hold scalars of a single type");
    if items.iter().any(Value::is_array) {
        return Err(mixed());
    }

    let numeric = items
        .iter()
        .all(|v| matches!(v, Value::Int(_) | Value::Double(_)));
    if numeric && items.iter().any(|v| matches!(v, Value::Double(_))) {
        return Ok(Value::DoubleArray(
            items
                .iter()
                .filter_map(|v| match *v {
                    Value::Int(i) => Some(f64::from(i)),
                    Value::Double(d) => Some(d),
                    _ => None,
                })
                .collect(),
        ));
    }
    if items.iter().any(|v| v.data_type() != ty) {
        return Err(mixed());
    }

    Ok(match ty {
        DataType::Int => Value::IntArray(items.iter().filter_map(Value::as_int).collect()),
        DataType::Double => Value::DoubleArray(items.iter().filter_map(Value::as_double).collect()),
        DataType::Char => Value::String(
            items
                .iter()
                .filter_map(|v| match v {
                    Value::Char(c) => Some(*c),
                    _ => None,
                })
                .collect(),
        ),
        DataType::String => Value::StringArray(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        DataType::Args => Value::ArgsArray(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::Args(args) => Some(args),
                    _ => None,
                })
                .collect(),
        ),
    })
}

/// Copies one scalar value slot described by `tag`.
///
/// Strings are duplicated and nested containers are deep-copied; plain
/// scalars are copied by value. Array tags are rejected.
///
/// # Examples
///
/// ```rust
/// use dynargs::{copy_value, Value};
///
/// let copy = copy_value('s', &Value::from("abc")).unwrap();
/// assert_eq!(copy, Value::from("abc"));
/// assert!(copy_value('S', &Value::from(vec!["abc"])).is_err());
/// ```
pub fn copy_value(tag: char, value: &Value) -> Result<Value> {
    match Tag::from_char(tag) {
        Some(Tag::Scalar(ty)) if ty == value.data_type() && !value.is_array() => match value {
            Value::Args(args) => Ok(Value::Args(args.deep_copy(&CopyOptions::default())?)),
            other => Ok(other.clone()),
        },
        Some(Tag::Scalar(ty)) => Err(Error::param_mismatch(
            0,
            ty.name(),
            value.data_type().name(),
        )),
        Some(Tag::Array(_)) => Err(Error::unsupported_shape(
            "array formats cannot be copied as a single value",
        )),
        _ => Err(Error::invalid_format(
            &tag.to_string(),
            "unsupported format for a value copy",
        )),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            write!(
                f,
                "[{}]",
                items
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }

        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Args(args) => write!(f, "{{{} entries}}", args.count()),
            Value::IntArray(v) => list(f, v),
            Value::DoubleArray(v) => list(f, v),
            Value::StringArray(v) => write!(
                f,
                "[{}]",
                v.iter()
                    .map(|s| format!("\"{}\"", s))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Value::ArgsArray(v) => write!(f, "[{} containers]", v.len()),
        }
    }
}

/// A borrowed view of a stored value, returned by the extraction functions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueRef<'a> {
    Int(i32),
    Double(f64),
    Char(char),
    Str(&'a str),
    Args(&'a Args),
    Ints(&'a [i32]),
    Doubles(&'a [f64]),
    Strs(&'a [String]),
    ArgsArray(&'a [Args]),
}

impl<'a> ValueRef<'a> {
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            ValueRef::Int(i) => Some(i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match *self {
            ValueRef::Double(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            ValueRef::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_args(&self) -> Option<&'a Args> {
        match *self {
            ValueRef::Args(args) => Some(args),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_ints(&self) -> Option<&'a [i32]> {
        match *self {
            ValueRef::Ints(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_doubles(&self) -> Option<&'a [f64]> {
        match *self {
            ValueRef::Doubles(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_strs(&self) -> Option<&'a [String]> {
        match *self {
            ValueRef::Strs(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_args_array(&self) -> Option<&'a [Args]> {
        match *self {
            ValueRef::ArgsArray(v) => Some(v),
            _ => None,
        }
    }

    /// Converts the view into an owned value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match *self {
            ValueRef::Int(i) => Value::Int(i),
            ValueRef::Double(d) => Value::Double(d),
            ValueRef::Char(c) => Value::Char(c),
            ValueRef::Str(s) => Value::String(s.to_string()),
            ValueRef::Args(args) => Value::Args(args.clone()),
            ValueRef::Ints(v) => Value::IntArray(v.to_vec()),
            ValueRef::Doubles(v) => Value::DoubleArray(v.to_vec()),
            ValueRef::Strs(v) => Value::StringArray(v.to_vec()),
            ValueRef::ArgsArray(v) => Value::ArgsArray(v.to_vec()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ValueRef::Int(_) => "integer",
            ValueRef::Double(_) => "double",
            ValueRef::Char(_) => "character",
            ValueRef::Str(_) => "string",
            ValueRef::Args(_) => "container",
            ValueRef::Ints(_) => "integer array",
            ValueRef::Doubles(_) => "double array",
            ValueRef::Strs(_) => "string array",
            ValueRef::ArgsArray(_) => "container array",
        }
    }
}

macro_rules! impl_try_from_view {
    ($lt:lifetime, $target:ty, $variant:ident, $expected:literal) => {
        impl<$lt> TryFrom<ValueRef<$lt>> for $target {
            type Error = Error;

            fn try_from(value: ValueRef<$lt>) -> Result<Self> {
                match value {
                    ValueRef::$variant(v) => Ok(v),
                    other => Err(Error::custom(format!(
                        "expected {}, found {}",
                        $expected,
                        other.kind()
                    ))),
                }
            }
        }
    };
}

impl_try_from_view!('a, i32, Int, "integer");
impl_try_from_view!('a, f64, Double, "double");
impl_try_from_view!('a, char, Char, "character");
impl_try_from_view!('a, &'a str, Str, "string");
impl_try_from_view!('a, &'a Args, Args, "container");
impl_try_from_view!('a, &'a [i32], Ints, "integer array");
impl_try_from_view!('a, &'a [f64], Doubles, "double array");
impl_try_from_view!('a, &'a [String], Strs, "string array");
impl_try_from_view!('a, &'a [Args], ArgsArray, "container array");

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Args> for Value {
    fn from(value: Args) -> Self {
        Value::Args(value)
    }
}

impl From<Vec<i32>> for Value {
    fn from(value: Vec<i32>) -> Self {
        Value::IntArray(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::DoubleArray(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::StringArray(value)
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::StringArray(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Args>> for Value {
    fn from(value: Vec<Args>) -> Self {
        Value::ArgsArray(value)
    }
}
