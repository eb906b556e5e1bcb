//! Positional parameters consumed by a format string.
//!
//! A push call pairs a format string with an ordered list of [`Param`]s. Each tag of
//! the format consumes the next parameter:
//!
//! | Tag | Parameter |
//! |-----|-----------|
//! | `n` | [`Param::Size`] (or a non-negative [`Param::Int`]) |
//! | `i` | [`Param::Int`] |
//! | `d` | [`Param::Double`] |
//! | `c` | [`Param::Char`] |
//! | `s`, `C` | [`Param::Str`] |
//! | `a` | [`Param::Args`] |
//! | `I` | [`Param::Ints`] |
//! | `D` | [`Param::Doubles`] |
//! | `S` | [`Param::Strs`] or [`Param::Strings`] |
//! | `A` | [`Param::ArgsArray`] |
//!
//! ```rust
//! use dynargs::{Args, Param};
//!
//! let mut args = Args::new();
//! args.push("range", "nD", [Param::Size(2), Param::Doubles(&[0.0, 1.0])]).unwrap();
//! args.push("title", "s", ["Plot".into()]).unwrap();
//! ```

use crate::Args;

/// One positional value for a push call.
#[derive(Clone, Debug, PartialEq)]
pub enum Param<'a> {
    Size(usize),
    Int(i32),
    Double(f64),
    Char(char),
    Str(&'a str),
    Args(Args),
    Ints(&'a [i32]),
    Doubles(&'a [f64]),
    Strs(&'a [&'a str]),
    Strings(&'a [String]),
    ArgsArray(Vec<Args>),
}

impl<'a> Param<'a> {
    /// Short description used in parameter mismatch errors.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Param::Size(_) => "size",
            Param::Int(_) => "integer",
            Param::Double(_) => "double",
            Param::Char(_) => "character",
            Param::Str(_) => "string",
            Param::Args(_) => "container",
            Param::Ints(_) => "integer array",
            Param::Doubles(_) => "double array",
            Param::Strs(_) | Param::Strings(_) => "string array",
            Param::ArgsArray(_) => "container array",
        }
    }
}

impl From<i32> for Param<'_> {
    fn from(value: i32) -> Self {
        Param::Int(value)
    }
}

impl From<f64> for Param<'_> {
    fn from(value: f64) -> Self {
        Param::Double(value)
    }
}

impl From<char> for Param<'_> {
    fn from(value: char) -> Self {
        Param::Char(value)
    }
}

impl<'a> From<&'a str> for Param<'a> {
    fn from(value: &'a str) -> Self {
        Param::Str(value)
    }
}

impl<'a> From<&'a String> for Param<'a> {
    fn from(value: &'a String) -> Self {
        Param::Str(value)
    }
}

impl From<Args> for Param<'_> {
    fn from(value: Args) -> Self {
        Param::Args(value)
    }
}

impl<'a> From<&'a [i32]> for Param<'a> {
    fn from(value: &'a [i32]) -> Self {
        Param::Ints(value)
    }
}

impl<'a> From<&'a [f64]> for Param<'a> {
    fn from(value: &'a [f64]) -> Self {
        Param::Doubles(value)
    }
}

impl<'a> From<&'a [&'a str]> for Param<'a> {
    fn from(value: &'a [&'a str]) -> Self {
        Param::Strs(value)
    }
}

impl<'a> From<&'a [String]> for Param<'a> {
    fn from(value: &'a [String]) -> Self {
        Param::Strings(value)
    }
}

impl From<Vec<Args>> for Param<'_> {
    fn from(value: Vec<Args>) -> Self {
        Param::ArgsArray(value)
    }
}
