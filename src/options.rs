//! Options for copying, merging and resetting containers.
//!
//! - [`CopyOptions`]: key lists for [`Args::deep_copy`](crate::Args::deep_copy)
//! - [`MergeOptions`]: key list for [`Args::merge`](crate::Args::merge)
//! - [`set_clear_exclude_keys`]: the process-wide list of keys that survive
//!   [`Args::reset`](crate::Args::reset)
//!
//! ## Examples
//!
//! ```rust
//! use dynargs::{CopyOptions, MergeOptions};
//!
//! let copy = CopyOptions::new()
//!     .with_ignore_keys(["callback"])
//!     .with_array_promote_keys(["series"]);
//! assert!(copy.ignores("callback"));
//!
//! let merge = MergeOptions::new().with_merge_keys(["series", "axes"]);
//! assert!(merge.merges("axes"));
//! ```

use std::sync::{PoisonError, RwLock};

static CLEAR_EXCLUDE_KEYS: RwLock<Vec<String>> = RwLock::new(Vec::new());

fn to_keys<I, S>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(Into::into).collect()
}

/// Key lists controlling a deep copy.
///
/// # Examples
///
/// ```rust
/// use dynargs::CopyOptions;
///
/// let options = CopyOptions::new();
/// assert!(options.ignore_keys.is_empty());
/// assert!(!options.promotes("series"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CopyOptions {
    /// Container values under these keys are copied as arrays of length one
    pub array_promote_keys: Vec<String>,
    /// Entries with these keys are left out of the copy
    pub ignore_keys: Vec<String>,
}

impl CopyOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the keys whose scalar container values become container arrays.
    #[must_use]
    pub fn with_array_promote_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.array_promote_keys = to_keys(keys);
        self
    }

    /// Sets the keys left out of the copy, at every nesting level.
    #[must_use]
    pub fn with_ignore_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_keys = to_keys(keys);
        self
    }

    #[inline]
    #[must_use]
    pub fn ignores(&self, key: &str) -> bool {
        self.ignore_keys.iter().any(|k| k == key)
    }

    #[inline]
    #[must_use]
    pub fn promotes(&self, key: &str) -> bool {
        self.array_promote_keys.iter().any(|k| k == key)
    }
}

/// Key list controlling a merge.
///
/// Entries whose key is listed are merged recursively when both sides hold nested
/// containers; all other entries of the update replace or extend the destination.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeOptions {
    pub merge_keys: Vec<String>,
}

impl MergeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_merge_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.merge_keys = to_keys(keys);
        self
    }

    #[inline]
    #[must_use]
    pub fn merges(&self, key: &str) -> bool {
        self.merge_keys.iter().any(|k| k == key)
    }
}

/// Replaces the process-wide list of keys kept by [`Args::reset`](crate::Args::reset).
///
/// # Examples
///
/// ```rust
/// use dynargs::{clear_exclude_keys, set_clear_exclude_keys};
///
/// set_clear_exclude_keys(["backend"]);
/// assert_eq!(clear_exclude_keys(), vec!["backend".to_string()]);
/// set_clear_exclude_keys(Vec::<String>::new());
/// ```
pub fn set_clear_exclude_keys<I, S>(keys: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys = to_keys(keys);
    tracing::debug!("clear exclude keys set to {:?}", keys);
    *CLEAR_EXCLUDE_KEYS
        .write()
        .unwrap_or_else(PoisonError::into_inner) = keys;
}

/// Returns a copy of the process-wide list of keys kept by a reset.
#[must_use]
pub fn clear_exclude_keys() -> Vec<String> {
    CLEAR_EXCLUDE_KEYS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
