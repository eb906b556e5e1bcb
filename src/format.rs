//! Format string grammar.
//!
//! A format string describes the type and arity of the values stored under one key.
//! Each character is a tag; lowercase tags are scalars, uppercase tags are arrays.
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `i` / `I` | integer (`i32`) / array of integers |
//! | `d` / `D` | float (`f64`) / array of floats |
//! | `c` / `C` | character / character array (stored as a string) |
//! | `s` / `S` | string / array of strings |
//! | `a` / `A` | nested container / array of nested containers |
//! | `n` | explicit array length, consumes one size value |
//!
//! A data tag may be followed by `(N)` to pin the element count of that tag:
//!
//! ```text
//! i          one integer
//! iii        three integers, stored as one integer array
//! D          an array of floats
//! nD         an array of floats whose length is given by a preceding size value
//! D(4)       an array of exactly four floats
//! s(3)       a string truncated to three characters
//! ```
//!
//! All data tags of one format string must denote the same type; `"id"` is rejected.
//!
//! ## Canonical Form
//!
//! Entries store their format in canonical form: `n` markers and options are dropped,
//! `C` becomes `s`, and every array tag is prefixed with an internal `n`:
//!
//! ```rust
//! use dynargs::format::canonical;
//!
//! assert_eq!(canonical("nD").unwrap(), "nD");
//! assert_eq!(canonical("D(4)").unwrap(), "nD");
//! assert_eq!(canonical("C").unwrap(), "s");
//! assert_eq!(canonical("i").unwrap(), "i");
//! ```

use crate::{Error, Result};
use std::fmt;

/// Every tag of the format alphabet.
pub const VALID_TAGS: &str = "niIdDcCsSaA";

/// The data-carrying tags; each is also valid in upper case.
pub const DATA_TAGS: &str = "idcsa";

/// The semantic type carried by a data tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Double,
    Char,
    String,
    Args,
}

impl DataType {
    /// Returns the lowercase tag letter of this type.
    #[inline]
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            DataType::Int => 'i',
            DataType::Double => 'd',
            DataType::Char => 'c',
            DataType::String => 's',
            DataType::Args => 'a',
        }
    }

    /// Returns the type for a tag letter of either case.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'i' => Some(DataType::Int),
            'd' => Some(DataType::Double),
            'c' => Some(DataType::Char),
            's' => Some(DataType::String),
            'a' => Some(DataType::Args),
            _ => None,
        }
    }

    /// Storage size of one element of this type in a packed byte buffer.
    ///
    /// Strings and containers have no fixed inline size.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            DataType::Int => std::mem::size_of::<i32>(),
            DataType::Double => std::mem::size_of::<f64>(),
            DataType::Char => 1,
            DataType::String | DataType::Args => 0,
        }
    }

    /// Returns `true` for nested containers, the only type copied recursively.
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, DataType::Args)
    }

    /// Human readable name, used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Int => "integer",
            DataType::Double => "double",
            DataType::Char => "character",
            DataType::String => "string",
            DataType::Args => "container",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single tag of a format string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `n`: the next array length
    Length,
    /// A lowercase data tag
    Scalar(DataType),
    /// An uppercase data tag
    Array(DataType),
}

impl Tag {
    /// Parses one tag character.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::format::{DataType, Tag};
    ///
    /// assert_eq!(Tag::from_char('I'), Some(Tag::Array(DataType::Int)));
    /// assert_eq!(Tag::from_char('n'), Some(Tag::Length));
    /// assert_eq!(Tag::from_char('x'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        if c == 'n' {
            return Some(Tag::Length);
        }
        match DataType::from_letter(c) {
            Some(ty) if c.is_ascii_uppercase() => Some(Tag::Array(ty)),
            Some(ty) => Some(Tag::Scalar(ty)),
            None => None,
        }
    }

    /// Returns the tag character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Tag::Length => 'n',
            Tag::Scalar(ty) => ty.letter(),
            Tag::Array(ty) => ty.letter().to_ascii_uppercase(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn data_type(self) -> Option<DataType> {
        match self {
            Tag::Length => None,
            Tag::Scalar(ty) | Tag::Array(ty) => Some(ty),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(self, Tag::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_data(self) -> bool {
        !matches!(self, Tag::Length)
    }
}

/// A parsed tag with its optional `(N)` element count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatItem {
    pub tag: Tag,
    pub option: Option<usize>,
}

/// Returns `true` if `c` is a tag of the format alphabet.
#[inline]
#[must_use]
pub fn is_valid_tag(c: char) -> bool {
    VALID_TAGS.contains(c)
}

/// Parses and validates a format string.
///
/// Rejects unknown tags, options attached to `n` or at the start, unterminated and
/// non-numeric options, and data tags of different types.
///
/// # Examples
///
/// ```rust
/// use dynargs::format::{parse, DataType, Tag};
///
/// let items = parse("nD(3)").unwrap();
/// assert_eq!(items.len(), 2);
/// assert_eq!(items[1].tag, Tag::Array(DataType::Double));
/// assert_eq!(items[1].option, Some(3));
///
/// assert!(parse("id").is_err());
/// assert!(parse("n(2)").is_err());
/// ```
pub fn parse(format: &str) -> Result<Vec<FormatItem>> {
    let invalid = |msg: String| {
        tracing::debug!("invalid format string \"{}\": {}", format, msg);
        Error::invalid_format(format, &msg)
    };

    let mut items: Vec<FormatItem> = Vec::with_capacity(format.len());
    let mut first_type: Option<DataType> = None;
    let mut chars = format.char_indices();

    while let Some((pos, c)) = chars.next() {
        if c == '(' {
            let previous = match items.last_mut() {
                None => {
                    return Err(invalid(
                        "format strings must not start with an option".to_string(),
                    ))
                }
                Some(item) if item.option.is_some() => {
                    return Err(invalid(format!("duplicate option at position {}", pos)))
                }
                Some(item) => item,
            };
            if !previous.tag.is_data() {
                return Err(invalid(format!(
                    "specifier '{}' cannot have any options",
                    previous.tag.as_char()
                )));
            }
            let rest = &format[pos + 1..];
            let end = rest
                .find(')')
                .ok_or_else(|| invalid(format!("option \"{}\" is not terminated", rest)))?;
            let digits = &rest[..end];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(format!("option \"{}\" is no valid number", digits)));
            }
            let value = digits
                .parse::<usize>()
                .map_err(|e| invalid(format!("option \"{}\": {}", digits, e)))?;
            previous.option = Some(value);
            // skip the digits and the closing parenthesis
            for _ in 0..=digits.len() {
                chars.next();
            }
            continue;
        }

        let tag = Tag::from_char(c)
            .ok_or_else(|| invalid(format!("invalid specifier '{}'", c)))?;
        if let Some(ty) = tag.data_type() {
            match first_type {
                Some(first) if first != ty => {
                    return Err(invalid(format!(
                        "format consists of different types ({} and {})",
                        first, ty
                    )))
                }
                None => first_type = Some(ty),
                _ => {}
            }
        }
        items.push(FormatItem { tag, option: None });
    }

    Ok(items)
}

/// Returns `true` if `format` is a valid, homogeneous format string.
///
/// # Examples
///
/// ```rust
/// use dynargs::format::validate;
///
/// assert!(validate("nD"));
/// assert!(validate("iii"));
/// assert!(!validate("is"));
/// assert!(!validate("x"));
/// ```
#[must_use]
pub fn validate(format: &str) -> bool {
    parse(format).is_ok()
}

/// Normalizes parsed items for reading values: `C` is read as one whole string
/// and any option attached to it is dropped.
pub(crate) fn for_reading(items: &[FormatItem]) -> Vec<FormatItem> {
    items
        .iter()
        .map(|item| match item.tag {
            Tag::Array(DataType::Char) => FormatItem {
                tag: Tag::Scalar(DataType::String),
                option: None,
            },
            _ => *item,
        })
        .collect()
}

/// Canonical form of parsed items: no options, no user `n` markers, `C` as `s`,
/// and an internal `n` before every array tag.
pub(crate) fn canonicalize(items: &[FormatItem]) -> String {
    let mut out = String::with_capacity(2 * items.len());
    for item in items {
        match item.tag {
            Tag::Length => {}
            Tag::Array(DataType::Char) => out.push('s'),
            Tag::Array(ty) => {
                out.push('n');
                out.push(ty.letter().to_ascii_uppercase());
            }
            Tag::Scalar(ty) => out.push(ty.letter()),
        }
    }
    out
}

/// Validates `format` and returns its canonical form.
pub fn canonical(format: &str) -> Result<String> {
    parse(format).map(|items| canonicalize(&items))
}

/// Iterates the data tags of a canonical format, skipping `n` markers.
pub(crate) fn data_tags(canonical: &str) -> impl Iterator<Item = Tag> + '_ {
    canonical
        .chars()
        .filter_map(Tag::from_char)
        .filter(|tag| tag.is_data())
}
