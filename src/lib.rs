//! # dynargs
//!
//! A dynamically typed, insertion-ordered key/value container driven by compact format
//! strings.
//!
//! Values are pushed under a key together with a format string that names their types,
//! and read back by requesting a compatible format. Containers nest, share their
//! entries on copy, and merge recursively, which makes them a convenient carrier for
//! layered configuration that does not fit a fixed struct layout.
//!
//! ## Format Strings
//!
//! | Tag | Scalar | Tag | Array |
//! |-----|--------|-----|-------|
//! | `i` | `i32` | `I` | `[i32]` |
//! | `d` | `f64` | `D` | `[f64]` |
//! | `c` | `char` | `C` | read as one string |
//! | `s` | string | `S` | `[String]` |
//! | `a` | nested [`Args`] | `A` | `[Args]` |
//!
//! `n` consumes an array length that applies to the following array tags, and any data
//! tag may carry an explicit `(N)` element count. All data tags of one format string
//! must share a type. Pushing several scalars at once stores them as one array.
//!
//! ## Quick Start
//!
//! ```rust
//! use dynargs::{Args, Param, ValueRef};
//!
//! let mut args = Args::new();
//! args.push("x", "nD", [Param::Size(3), Param::Doubles(&[0.0, 0.5, 1.0])]).unwrap();
//! args.push("size", "ii", [Param::Int(640), Param::Int(480)]).unwrap();
//! args.push("title", "s", [Param::Str("Sine")]).unwrap();
//!
//! // the two integers were stored as one array
//! assert_eq!(args.at("size").unwrap().format(), "nI");
//! let size = args.values("size", "ii").unwrap();
//! assert_eq!(size, vec![ValueRef::Int(640), ValueRef::Int(480)]);
//!
//! // a scalar can be read as an array of length one
//! let (title, length) = args.first_value("title", "S").unwrap();
//! assert_eq!(length, 1);
//! let titles: &[String] = title.try_into().unwrap();
//! assert_eq!(titles, ["Sine"]);
//! ```
//!
//! ## Copying and Merging
//!
//! ```rust
//! use dynargs::{args, CopyOptions, MergeOptions, ValueRef};
//!
//! let defaults = args! {
//!     "axes" => args! { "grid" => 1, "label" => "x" },
//!     "token" => "secret",
//! };
//!
//! let mut config = defaults.copy().unwrap();
//! config
//!     .merge(&args! { "axes" => args! { "label" => "time" } }, &MergeOptions::new().with_merge_keys(["axes"]))
//!     .unwrap();
//!
//! let (axes, _) = config.first_value("axes", "a").unwrap();
//! let axes = axes.as_args().unwrap();
//! assert_eq!(axes.first_value("label", "s").unwrap().0, ValueRef::Str("time"));
//! assert_eq!(axes.first_value("grid", "i").unwrap().0, ValueRef::Int(1));
//!
//! let public = config.deep_copy(&CopyOptions::new().with_ignore_keys(["token"])).unwrap();
//! assert!(!public.contains("token"));
//! ```
//!
//! ## Serde
//!
//! [`Args`] and [`Value`] implement `Serialize` and `Deserialize`; [`to_args`] and
//! [`from_args`] convert between containers and typed structs.
//!
//! ## Threading
//!
//! Entries are shared through [`std::rc::Rc`], so containers are neither `Send` nor
//! `Sync`. Only the reset exclusion list ([`set_clear_exclude_keys`]) is process-wide.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: rejected format strings at `debug`, failed array
//! allocations at `warn`, released entries at `trace`. No subscriber is installed.

pub mod arg;
pub mod args;
pub mod codec;
pub mod compat;
pub mod de;
pub mod error;
pub mod format;
pub mod macros;
pub mod options;
pub mod param;
pub mod ser;
pub mod value;

pub use arg::{Arg, SharedArg, ValueIter, ValueSlot};
pub use args::Args;
pub use compat::{check_compatibility, Compatibility};
pub use de::{from_args, from_value};
pub use error::{Error, Result};
pub use format::{is_valid_tag, validate};
pub use options::{clear_exclude_keys, set_clear_exclude_keys, CopyOptions, MergeOptions};
pub use param::Param;
pub use ser::{to_args, to_value, ValueSerializer};
pub use value::{copy_value, Value, ValueRef};

/// Builds a length container `{value: d, unit: s}`.
///
/// # Examples
///
/// ```rust
/// use dynargs::{length, ValueRef};
///
/// let width = length(2.5, "cm");
/// assert_eq!(width.first_value("value", "d").unwrap().0, ValueRef::Double(2.5));
/// assert_eq!(width.first_value("unit", "s").unwrap().0, ValueRef::Str("cm"));
/// ```
#[must_use]
pub fn length(value: f64, unit: &str) -> Args {
    crate::args! {
        "value" => value,
        "unit" => unit,
    }
}
