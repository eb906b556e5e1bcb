//! Single keyed entries of an argument container.
//!
//! An [`Arg`] owns an optional key, the canonical format of its value and one
//! [`Value`] per data slot of that format. Containers share entries through
//! [`SharedArg`]; a flat copy of a container therefore costs one reference count
//! increment per entry, and an entry is released when its last holder drops it.
//!
//! ## Canonical Formats
//!
//! The canonical format is derived from the format string the entry was created with:
//! options and user `n` markers are removed, `C` becomes `s`, every array tag gets an
//! internal `n` marker, and a run of several scalars is promoted to a single array.
//!
//! | Created with | Canonical |
//! |--------------|-----------|
//! | `"i"` | `"i"` |
//! | `"I"`, `"nI"`, `"I(3)"` | `"nI"` |
//! | `"ddd"` | `"nD"` |
//! | `"C"`, `"cc"` | `"s"` |
//!
//! ## Reading Values
//!
//! - [`Arg::value_iter`] walks the data slots in order
//! - [`Arg::first_value`] returns the first slot, optionally viewed as an array
//! - [`Arg::values_as`] reads every slot positionally with coercion

use crate::codec::{self, BufferSource, ParamSource};
use crate::compat::{check_compatibility, Compatibility};
use crate::format::{self, DataType};
use crate::{Error, Param, Result, Value, ValueRef};
use std::rc::Rc;

/// A reference-counted entry, shared by every container that lists it.
pub type SharedArg = Rc<Arg>;

/// One key with its typed value.
#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    key: Option<String>,
    format: String,
    values: Vec<Value>,
}

#[cfg(test)]
thread_local! {
    static RELEASED: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

#[cfg(test)]
pub(crate) fn released_count() -> usize {
    RELEASED.with(std::cell::Cell::get)
}

impl Arg {
    /// Creates an entry from a format string and positional parameters.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidFormat`] for malformed format strings, with a
    /// parameter error if `params` does not match the format and with
    /// [`Error::Allocation`] if an array cannot be stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Arg, Param};
    ///
    /// let arg = Arg::create(Some("color"), "ddd", [0.2.into(), 0.4.into(), 0.6.into()]).unwrap();
    /// assert_eq!(arg.format(), "nD");
    /// assert_eq!(arg.values()[0].len(), 3);
    /// ```
    pub fn create<'a, P>(key: Option<&str>, format: &str, params: P) -> Result<Self>
    where
        P: IntoIterator<Item = Param<'a>>,
    {
        let (format, values) = codec::encode(format, &mut ParamSource::new(params))?;
        Ok(Arg::from_parts(key.map(str::to_string), format, values))
    }

    /// Creates an entry by reading the values from a packed byte buffer.
    ///
    /// With `apply_padding`, every scalar is expected at an offset aligned to its own
    /// size, as a C compiler lays out a struct.
    pub fn from_buffer(
        key: Option<&str>,
        format: &str,
        buffer: &[u8],
        apply_padding: bool,
    ) -> Result<Self> {
        let (format, values) =
            codec::encode(format, &mut BufferSource::new(buffer, apply_padding))?;
        Ok(Arg::from_parts(key.map(str::to_string), format, values))
    }

    /// Creates an entry holding a single value.
    #[must_use]
    pub fn from_value(key: Option<&str>, value: Value) -> Self {
        let format = value.canonical_format().to_string();
        Arg::from_parts(key.map(str::to_string), format, vec![value])
    }

    pub(crate) fn from_parts(key: Option<String>, format: String, values: Vec<Value>) -> Self {
        Arg {
            key,
            format,
            values,
        }
    }

    /// The key, or `None` for anonymous entries.
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The canonical format of the stored value.
    #[inline]
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The data slots, in format order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    /// Returns an iterator over the data slots with their shape information.
    pub fn value_iter(&self) -> ValueIter<'_> {
        ValueIter {
            slots: self.values.iter(),
        }
    }

    /// Checks whether the entry can be read with `format`.
    #[must_use]
    pub fn check_format(&self, format: &str) -> Compatibility {
        check_compatibility(self, format)
    }

    /// Appends `increment` empty elements to a one-dimensional array.
    ///
    /// New elements are `0`, `0.0`, empty strings or empty containers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShape`] for scalars and multi-dimensional values and
    /// [`Error::Allocation`] if the array cannot grow; the entry is unchanged then.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Arg, Param, Value};
    ///
    /// let mut arg = Arg::create(Some("ticks"), "I", [Param::Ints(&[1, 2, 3])]).unwrap();
    /// arg.increase_array(2).unwrap();
    /// assert_eq!(arg.values()[0], Value::from(vec![1, 2, 3, 0, 0]));
    /// ```
    pub fn increase_array(&mut self, increment: usize) -> Result<()> {
        if !self.format.starts_with('n') {
            return Err(Error::unsupported_shape("increasing a non-array value"));
        }
        if self.format.len() != 2 || self.values.len() != 1 {
            return Err(Error::unsupported_shape(
                "increasing a multi-dimensional array",
            ));
        }
        self.values[0].grow(increment)
    }

    /// Returns the first value and its array length.
    ///
    /// `format` names the type of the first value: a scalar tag (`"i"`) reads the first
    /// slot as stored, an array tag (`"I"`) reads an array and also accepts a single
    /// stored scalar of the same type as an array of length one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleFormat`] if the stored format does not start with
    /// the requested one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Arg, Param, ValueRef};
    ///
    /// let arg = Arg::create(Some("width"), "i", [Param::Int(42)]).unwrap();
    /// assert_eq!(arg.first_value("i").unwrap(), (ValueRef::Int(42), 1));
    /// assert_eq!(arg.first_value("I").unwrap(), (ValueRef::Ints(&[42]), 1));
    /// assert!(arg.first_value("d").is_err());
    /// ```
    pub fn first_value(&self, format: &str) -> Result<(ValueRef<'_>, usize)> {
        let incompatible = || Error::incompatible(&self.format, format);
        if format.is_empty() {
            return Err(incompatible());
        }
        let requested = format::canonical(format)?;
        let array_requested = requested.len() == 2 && requested.starts_with('n');

        if !self.format.starts_with(requested.as_str()) {
            let scalar_as_array = array_requested
                && self.format.len() == 1
                && requested[1..].to_ascii_lowercase() == self.format;
            if !scalar_as_array {
                return Err(incompatible());
            }
        }

        let first = self.values.first().ok_or_else(incompatible)?;
        if first.is_array() {
            Ok((first.as_view(), first.len()))
        } else if array_requested {
            first
                .as_array_view()
                .map(|view| (view, 1))
                .ok_or_else(incompatible)
        } else {
            Ok((first.as_view(), 1))
        }
    }

    /// Reads the stored values positionally, one view per tag of `format`.
    ///
    /// Uppercase tags yield whole arrays. Lowercase tags yield single values: when the
    /// format matches the stored one exactly each tag reads the next slot, otherwise
    /// consecutive tags read consecutive elements of the single stored array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleFormat`] unless [`Arg::check_format`] accepts
    /// `format`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Arg, Param, ValueRef};
    ///
    /// let arg = Arg::create(Some("size"), "dd", [Param::Double(4.0), Param::Double(3.0)]).unwrap();
    /// let values = arg.values_as("dd").unwrap();
    /// assert_eq!(values, vec![ValueRef::Double(4.0), ValueRef::Double(3.0)]);
    /// ```
    pub fn values_as(&self, format: &str) -> Result<Vec<ValueRef<'_>>> {
        let incompatible = || Error::incompatible(&self.format, format);
        let same_type = match self.check_format(format) {
            Compatibility::Incompatible => return Err(incompatible()),
            compatibility => compatibility == Compatibility::SameType,
        };

        let mut slots = self.values.iter();
        let mut current = slots.next().ok_or_else(incompatible)?;
        let mut offset = 0;
        let mut out = Vec::with_capacity(format.len());
        for c in format.chars() {
            // `C` reads a whole string, like `s`
            let view = if c.is_ascii_uppercase() && c != 'C' {
                current.as_array_view()
            } else if current.is_array() {
                offset += 1;
                current.element(offset - 1)
            } else {
                Some(current.as_view())
            };
            out.push(view.ok_or_else(incompatible)?);

            if same_type {
                if let Some(next) = slots.next() {
                    current = next;
                }
                offset = 0;
            }
        }
        Ok(out)
    }

    /// Returns `true` if any slot holds a nested container.
    pub(crate) fn has_containers(&self) -> bool {
        self.values
            .iter()
            .any(|value| value.data_type().is_container())
    }
}

impl Drop for Arg {
    fn drop(&mut self) {
        tracing::trace!(
            "releasing argument {:?} with format \"{}\"",
            self.key,
            self.format
        );
        #[cfg(test)]
        RELEASED.with(|count| count.set(count.get() + 1));
    }
}

/// Shape information of one data slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueSlot<'a> {
    pub data_type: DataType,
    pub is_array: bool,
    /// 1 for scalars
    pub array_length: usize,
    pub value: &'a Value,
}

/// Iterator over the data slots of an [`Arg`].
///
/// # Examples
///
/// ```rust
/// use dynargs::{Arg, Param};
/// use dynargs::format::DataType;
///
/// let arg = Arg::create(Some("k"), "iI", [Param::Int(1), Param::Ints(&[2, 3])]).unwrap();
/// let slots: Vec<_> = arg.value_iter().collect();
/// assert_eq!(slots.len(), 2);
/// assert_eq!(slots[1].data_type, DataType::Int);
/// assert!(slots[1].is_array);
/// assert_eq!(slots[1].array_length, 2);
/// ```
#[derive(Clone, Debug)]
pub struct ValueIter<'a> {
    slots: std::slice::Iter<'a, Value>,
}

impl<'a> Iterator for ValueIter<'a> {
    type Item = ValueSlot<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.next().map(|value| ValueSlot {
            data_type: value.data_type(),
            is_array: value.is_array(),
            array_length: if value.is_array() { value.len() } else { 1 },
            value,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl ExactSizeIterator for ValueIter<'_> {}
