//! Format compatibility between a stored argument and a requested format.
//!
//! A requested format must consist of one repeated data tag without options, for
//! example `"i"`, `"D"` or `"ss"`. It is compared against the canonical format of the
//! stored [`Arg`]:
//!
//! - identical canonical formats are [`Compatibility::SameType`]
//! - a single stored scalar can be read as an array of length one (`"I"` for `i`)
//! - a single stored array can be read as a shorter or equally long array, either with
//!   an uppercase tag or with a run of two or more lowercase tags (`"dd"` for `nD`)
//!
//! Everything else, including a single lowercase tag against a stored array, is
//! [`Compatibility::Incompatible`].

use crate::format::{self, DATA_TAGS};
use crate::{Arg, Value};

/// Result of comparing a stored argument with a requested format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compatibility {
    Incompatible,
    /// The canonical formats are identical
    SameType,
    /// The stored value can be read with the requested format
    Coercible,
}

impl Compatibility {
    #[inline]
    #[must_use]
    pub const fn is_compatible(self) -> bool {
        !matches!(self, Compatibility::Incompatible)
    }
}

/// Checks whether `arg` can be read with `requested`.
///
/// # Examples
///
/// ```rust
/// use dynargs::{check_compatibility, Arg, Compatibility, Param};
///
/// let arg = Arg::create(Some("ticks"), "I", [Param::Ints(&[1, 2, 3])]).unwrap();
/// assert_eq!(check_compatibility(&arg, "I"), Compatibility::SameType);
/// assert_eq!(check_compatibility(&arg, "ii"), Compatibility::Coercible);
/// assert_eq!(check_compatibility(&arg, "i"), Compatibility::Incompatible);
/// ```
#[must_use]
pub fn check_compatibility(arg: &Arg, requested: &str) -> Compatibility {
    let first = match requested.chars().next() {
        Some(c) => c,
        None => return Compatibility::Incompatible,
    };
    let letter = first.to_ascii_lowercase();
    if !DATA_TAGS.contains(letter) || requested.chars().any(|c| c != first) {
        return Compatibility::Incompatible;
    }

    match format::canonical(requested) {
        Ok(canonical) if canonical == arg.format() => return Compatibility::SameType,
        Ok(_) => {}
        Err(_) => return Compatibility::Incompatible,
    }

    // coercion needs exactly one data slot
    let mut tags = format::data_tags(arg.format());
    let stored = match (tags.next(), tags.next()) {
        (Some(tag), None) => tag,
        _ => return Compatibility::Incompatible,
    };
    if stored.data_type().map(|ty| ty.letter()) != Some(letter) {
        return Compatibility::Incompatible;
    }

    let requested_length = requested.chars().count();
    let coercible = if stored.is_array() {
        let array_request = first.is_ascii_uppercase() || requested_length > 1;
        let stored_length = arg.values().first().map_or(0, Value::len);
        array_request && requested_length <= stored_length
    } else {
        requested_length == 1
    };

    if coercible {
        Compatibility::Coercible
    } else {
        Compatibility::Incompatible
    }
}
