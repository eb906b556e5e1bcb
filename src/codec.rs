//! Encoding of format-driven values.
//!
//! [`encode`] walks a format string left to right and reads one value per tag from a
//! [`ValueSource`]. Two sources exist:
//!
//! - [`ParamSource`]: an ordered list of [`Param`]s, the counterpart of a variadic call
//! - [`BufferSource`]: a packed byte buffer produced by an external binary source
//!
//! ## Array Lengths
//!
//! The element count of an array tag is resolved in this order:
//!
//! 1. an explicit `(N)` option on the tag
//! 2. the last `n` value read in the same format string
//! 3. the source's own length (slice parameters), or 1 for byte buffers
//!
//! ## Scalar Promotion
//!
//! A format that yields more than one scalar of the same type is stored as a single
//! array: `"iii"` with three integers becomes one `nI` value of length 3, and a run of
//! `c` characters becomes one string.
//!
//! ## Byte Buffer Layout
//!
//! Scalars are stored in native byte order and, with padding enabled, aligned to their
//! own size. `n` is a native `usize`. Array elements follow inline. Strings are
//! NUL-terminated UTF-8, or exactly `N` bytes when the tag carries an option. Nested
//! containers cannot be read from a byte buffer.

use crate::format::{self, DataType, Tag};
use crate::{Error, Param, Result, Value};

/// A provider of raw values for [`encode`].
pub trait ValueSource {
    /// Reads the value of an `n` tag.
    fn read_size(&mut self) -> Result<usize>;

    /// Reads one scalar; `option` is the tag's `(N)` count.
    fn read_scalar(&mut self, ty: DataType, option: Option<usize>) -> Result<Value>;

    /// Reads an array of `length` elements, or of the source's own length if `None`.
    fn read_array(&mut self, ty: DataType, length: Option<usize>) -> Result<Value>;

    /// Called after the last tag; reports values that were never consumed.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Encodes the values described by `format` into the canonical format and one
/// [`Value`] per data slot.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] before reading anything if the format is malformed,
/// a parameter or buffer error if the source does not match the format, or
/// [`Error::Allocation`] if an array cannot be reserved.
pub fn encode<S: ValueSource>(format: &str, source: &mut S) -> Result<(String, Vec<Value>)> {
    let items = format::for_reading(&format::parse(format)?);

    let mut default_length: Option<usize> = None;
    let mut values = Vec::with_capacity(items.len());
    for item in &items {
        match item.tag {
            Tag::Length => default_length = Some(source.read_size()?),
            Tag::Scalar(ty) => values.push(source.read_scalar(ty, item.option)?),
            Tag::Array(ty) => {
                values.push(source.read_array(ty, item.option.or(default_length))?)
            }
        }
    }
    source.finish()?;

    let values = promote(values);
    let canonical = values.iter().map(Value::canonical_format).collect();
    Ok((canonical, values))
}

/// Repacks a run of more than one scalar into a single array value.
fn promote(values: Vec<Value>) -> Vec<Value> {
    let ty = match values.first() {
        Some(first) if values.len() > 1 => first.data_type(),
        _ => return values,
    };
    if values.iter().any(|v| v.is_array() || v.data_type() != ty) {
        return values;
    }
    let promoted = match ty {
        DataType::Int => Value::IntArray(values.iter().filter_map(Value::as_int).collect()),
        DataType::Double => {
            Value::DoubleArray(values.iter().filter_map(Value::as_double).collect())
        }
        DataType::Char => Value::String(
            values
                .iter()
                .filter_map(|v| match v {
                    Value::Char(c) => Some(*c),
                    _ => None,
                })
                .collect(),
        ),
        DataType::String => Value::StringArray(
            values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        DataType::Args => Value::ArgsArray(
            values
                .into_iter()
                .filter_map(|v| match v {
                    Value::Args(args) => Some(args),
                    _ => None,
                })
                .collect(),
        ),
    };
    vec![promoted]
}

/// Copies the first `length` elements of `items`, reporting allocation failure.
fn take_prefix<T: Clone>(items: &[T], length: usize) -> Result<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(length)?;
    out.extend_from_slice(&items[..length]);
    Ok(out)
}

/// Reads values from an ordered list of parameters.
pub struct ParamSource<'a, I>
where
    I: Iterator<Item = Param<'a>>,
{
    params: I,
    position: usize,
}

impl<'a, I> ParamSource<'a, I>
where
    I: Iterator<Item = Param<'a>>,
{
    pub fn new<P>(params: P) -> Self
    where
        P: IntoIterator<Item = Param<'a>, IntoIter = I>,
    {
        ParamSource {
            params: params.into_iter(),
            position: 0,
        }
    }

    fn next(&mut self, expected: &str) -> Result<Param<'a>> {
        let param = self
            .params
            .next()
            .ok_or_else(|| Error::missing_param(self.position, expected))?;
        self.position += 1;
        Ok(param)
    }

    fn mismatch(&self, expected: &str, found: &Param<'_>) -> Error {
        Error::param_mismatch(self.position - 1, expected, found.kind())
    }

    fn resolve_length(&self, available: usize, length: Option<usize>) -> Result<usize> {
        match length {
            Some(length) if length > available => Err(Error::param_mismatch(
                self.position - 1,
                &format!("array of at least {} elements", length),
                &format!("array of {} elements", available),
            )),
            Some(length) => Ok(length),
            None => Ok(available),
        }
    }
}

impl<'a, I> ValueSource for ParamSource<'a, I>
where
    I: Iterator<Item = Param<'a>>,
{
    fn read_size(&mut self) -> Result<usize> {
        match self.next("size")? {
            Param::Size(size) => Ok(size),
            Param::Int(size) if size >= 0 => Ok(size as usize),
            other => Err(self.mismatch("size", &other)),
        }
    }

    fn read_scalar(&mut self, ty: DataType, option: Option<usize>) -> Result<Value> {
        let param = self.next(ty.name())?;
        match (ty, param) {
            (DataType::Int, Param::Int(i)) => Ok(Value::Int(i)),
            (DataType::Double, Param::Double(d)) => Ok(Value::Double(d)),
            (DataType::Char, Param::Char(c)) => Ok(Value::Char(c)),
            (DataType::String, Param::Str(s)) => match option {
                None => Ok(Value::String(s.to_string())),
                Some(length) => {
                    let truncated: String = s.chars().take(length).collect();
                    let available = truncated.chars().count();
                    if available < length {
                        return Err(Error::param_mismatch(
                            self.position - 1,
                            &format!("string of at least {} characters", length),
                            &format!("string of {} characters", available),
                        ));
                    }
                    Ok(Value::String(truncated))
                }
            },
            (DataType::Args, Param::Args(args)) => Ok(Value::Args(args)),
            (ty, other) => Err(self.mismatch(ty.name(), &other)),
        }
    }

    fn read_array(&mut self, ty: DataType, length: Option<usize>) -> Result<Value> {
        let param = self.next(ty.name())?;
        match (ty, param) {
            (DataType::Int, Param::Ints(v)) => {
                let length = self.resolve_length(v.len(), length)?;
                Ok(Value::IntArray(take_prefix(v, length)?))
            }
            (DataType::Double, Param::Doubles(v)) => {
                let length = self.resolve_length(v.len(), length)?;
                Ok(Value::DoubleArray(take_prefix(v, length)?))
            }
            (DataType::String, Param::Strs(v)) => {
                let length = self.resolve_length(v.len(), length)?;
                let mut out = Vec::new();
                out.try_reserve_exact(length)?;
                out.extend(v[..length].iter().map(|s| s.to_string()));
                Ok(Value::StringArray(out))
            }
            (DataType::String, Param::Strings(v)) => {
                let length = self.resolve_length(v.len(), length)?;
                Ok(Value::StringArray(take_prefix(v, length)?))
            }
            (DataType::Args, Param::ArgsArray(mut v)) => {
                let length = self.resolve_length(v.len(), length)?;
                v.truncate(length);
                Ok(Value::ArgsArray(v))
            }
            (ty, other) => Err(self.mismatch(&format!("{} array", ty.name()), &other)),
        }
    }

    fn finish(&mut self) -> Result<()> {
        let unused = self.params.by_ref().count();
        if unused > 0 {
            return Err(Error::TrailingParams(unused));
        }
        Ok(())
    }
}

/// Reads values from a packed byte buffer.
pub struct BufferSource<'b> {
    buffer: &'b [u8],
    offset: usize,
    apply_padding: bool,
}

impl<'b> BufferSource<'b> {
    pub fn new(buffer: &'b [u8], apply_padding: bool) -> Self {
        BufferSource {
            buffer,
            offset: 0,
            apply_padding,
        }
    }

    /// Current read position in bytes.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn align(&mut self, size: usize) {
        if self.apply_padding && size > 1 {
            self.offset += (size - self.offset % size) % size;
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.align(N);
        let bytes = self
            .buffer
            .get(self.offset..self.offset + N)
            .ok_or_else(|| Error::buffer(self.offset, &format!("expected {} more bytes", N)))?;
        self.offset += N;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.take::<4>().map(i32::from_ne_bytes)
    }

    fn read_f64(&mut self) -> Result<f64> {
        self.take::<8>().map(f64::from_ne_bytes)
    }

    fn read_string(&mut self, length: Option<usize>) -> Result<String> {
        let start = self.offset;
        let rest = self.buffer.get(start..).unwrap_or_default();
        let (bytes, consumed) = match length {
            Some(length) if length <= rest.len() => (&rest[..length], length),
            Some(length) => {
                return Err(Error::buffer(
                    start,
                    &format!("expected a string of {} bytes", length),
                ))
            }
            None => {
                let end = rest
                    .iter()
                    .position(|b| *b == 0)
                    .ok_or_else(|| Error::buffer(start, "string is not NUL-terminated"))?;
                (&rest[..end], end + 1)
            }
        };
        let s = std::str::from_utf8(bytes)
            .map_err(|e| Error::buffer(start, &e.to_string()))?
            .to_string();
        self.offset += consumed;
        Ok(s)
    }
}

impl ValueSource for BufferSource<'_> {
    fn read_size(&mut self) -> Result<usize> {
        self.take::<{ std::mem::size_of::<usize>() }>()
            .map(usize::from_ne_bytes)
    }

    fn read_scalar(&mut self, ty: DataType, option: Option<usize>) -> Result<Value> {
        match ty {
            DataType::Int => self.read_i32().map(Value::Int),
            DataType::Double => self.read_f64().map(Value::Double),
            DataType::Char => self.take::<1>().map(|[b]| Value::Char(char::from(b))),
            DataType::String => self.read_string(option).map(Value::String),
            DataType::Args => Err(Error::unsupported_shape(
                "nested containers cannot be read from a byte buffer",
            )),
        }
    }

    fn read_array(&mut self, ty: DataType, length: Option<usize>) -> Result<Value> {
        let length = length.unwrap_or(1);
        // strings need at least their NUL byte
        let min_size = ty.size().max(1);
        if !ty.is_container() && length.saturating_mul(min_size) > self.remaining() {
            return Err(Error::buffer(
                self.offset,
                &format!("{} elements do not fit into the remaining buffer", length),
            ));
        }
        match ty {
            DataType::Int => {
                let mut out = Vec::new();
                out.try_reserve_exact(length)?;
                for _ in 0..length {
                    out.push(self.read_i32()?);
                }
                Ok(Value::IntArray(out))
            }
            DataType::Double => {
                let mut out = Vec::new();
                out.try_reserve_exact(length)?;
                for _ in 0..length {
                    out.push(self.read_f64()?);
                }
                Ok(Value::DoubleArray(out))
            }
            DataType::String => {
                let mut out = Vec::new();
                out.try_reserve_exact(length)?;
                for _ in 0..length {
                    out.push(self.read_string(None)?);
                }
                Ok(Value::StringArray(out))
            }
            DataType::Char => self.read_string(Some(length)).map(Value::String),
            DataType::Args => Err(Error::unsupported_shape(
                "nested containers cannot be read from a byte buffer",
            )),
        }
    }
}
