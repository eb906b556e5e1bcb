//! Insertion-ordered argument container.
//!
//! [`Args`] maps unique keys to shared [`Arg`] entries and keeps them in the order the
//! keys were first introduced. Replacing the value of an existing key keeps its
//! position. Anonymous entries never collide, so every anonymous push appends.
//!
//! ## Sharing
//!
//! Entries are [`SharedArg`]s. [`Args::flat_copy`] (and `Clone`) produces a second
//! container listing the same entries, without copying any value. Mutating operations
//! on a shared entry ([`Args::increase_array`], nested [`Args::merge`]) copy that entry
//! first, so other containers never observe the change.
//!
//! ## Examples
//!
//! ```rust
//! use dynargs::{Args, Param, ValueRef};
//!
//! let mut args = Args::new();
//! args.push("x", "nD", [Param::Size(3), Param::Doubles(&[0.0, 0.5, 1.0])]).unwrap();
//! args.push("title", "s", [Param::Str("Sine")]).unwrap();
//! args.push("x", "D", [Param::Doubles(&[1.0, 2.0])]).unwrap();
//!
//! let keys: Vec<_> = args.iter().filter_map(|arg| arg.key()).collect();
//! assert_eq!(keys, vec!["x", "title"]);
//!
//! let (x, length) = args.first_value("x", "D").unwrap();
//! assert_eq!(x, ValueRef::Doubles(&[1.0, 2.0]));
//! assert_eq!(length, 2);
//! ```

use crate::options::{clear_exclude_keys, CopyOptions, MergeOptions};
use crate::{Arg, Error, Param, Result, SharedArg, Value, ValueRef};
use indexmap::{Equivalent, IndexMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Map key of an entry; anonymous entries get a container-unique number.
#[derive(Clone, Debug, PartialEq, Eq)]
enum EntryKey {
    Named(String),
    Anonymous(u64),
}

impl Hash for EntryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // named keys hash like `str` so that `NamedKey` lookups find them
        match self {
            EntryKey::Named(key) => key.as_str().hash(state),
            EntryKey::Anonymous(id) => id.hash(state),
        }
    }
}

/// Borrowed lookup key for named entries.
#[derive(Hash)]
struct NamedKey<'a>(&'a str);

impl Equivalent<EntryKey> for NamedKey<'_> {
    fn equivalent(&self, key: &EntryKey) -> bool {
        matches!(key, EntryKey::Named(name) if name == self.0)
    }
}

/// An ordered container of keyed, typed values.
#[derive(Clone, Default)]
pub struct Args {
    entries: IndexMap<EntryKey, SharedArg>,
    next_anonymous: u64,
}

impl Args {
    /// Creates an empty container.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::Args;
    ///
    /// let args = Args::new();
    /// assert!(args.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Args::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Args {
            entries: IndexMap::with_capacity(capacity),
            next_anonymous: 0,
        }
    }

    /// Stores the values described by `format` under `key`.
    ///
    /// An existing entry with the same key is released and replaced at its position.
    ///
    /// # Errors
    ///
    /// Fails if the format is invalid, the parameters do not match it or an array
    /// cannot be allocated. The container is unchanged on failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Args, Param};
    ///
    /// let mut args = Args::new();
    /// args.push("size", "dd", [Param::Double(640.0), Param::Double(480.0)]).unwrap();
    /// assert_eq!(args.at("size").unwrap().format(), "nD");
    /// ```
    pub fn push<'a, P>(&mut self, key: &str, format: &str, params: P) -> Result<()>
    where
        P: IntoIterator<Item = Param<'a>>,
    {
        let arg = Arg::create(Some(key), format, params)?;
        self.push_arg(Rc::new(arg));
        Ok(())
    }

    /// Appends an entry without a key.
    pub fn push_anonymous<'a, P>(&mut self, format: &str, params: P) -> Result<()>
    where
        P: IntoIterator<Item = Param<'a>>,
    {
        let arg = Arg::create(None, format, params)?;
        self.push_arg(Rc::new(arg));
        Ok(())
    }

    /// Stores values read from a packed byte buffer under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Args, ValueRef};
    ///
    /// let mut buffer = Vec::new();
    /// buffer.extend_from_slice(&2usize.to_ne_bytes());
    /// buffer.extend_from_slice(&0.5f64.to_ne_bytes());
    /// buffer.extend_from_slice(&1.5f64.to_ne_bytes());
    ///
    /// let mut args = Args::new();
    /// args.push_buf("y", "nD", &buffer, true).unwrap();
    /// assert_eq!(args.first_value("y", "D").unwrap(), (ValueRef::Doubles(&[0.5, 1.5]), 2));
    /// ```
    pub fn push_buf(
        &mut self,
        key: &str,
        format: &str,
        buffer: &[u8],
        apply_padding: bool,
    ) -> Result<()> {
        let arg = Arg::from_buffer(Some(key), format, buffer, apply_padding)?;
        self.push_arg(Rc::new(arg));
        Ok(())
    }

    /// Stores a single value under `key`; its format follows from the value.
    pub fn push_value(&mut self, key: &str, value: Value) {
        self.push_arg(Rc::new(Arg::from_value(Some(key), value)));
    }

    /// Inserts a shared entry, replacing an entry with the same key in place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Args, Param};
    /// use std::rc::Rc;
    ///
    /// let mut source = Args::new();
    /// source.push("color", "i", [Param::Int(3)]).unwrap();
    ///
    /// let mut target = Args::new();
    /// target.push_arg(Rc::clone(source.at("color").unwrap()));
    /// assert_eq!(Rc::strong_count(source.at("color").unwrap()), 2);
    /// ```
    pub fn push_arg(&mut self, arg: SharedArg) {
        let key = match arg.key() {
            Some(key) => EntryKey::Named(key.to_string()),
            None => {
                self.next_anonymous += 1;
                EntryKey::Anonymous(self.next_anonymous)
            }
        };
        self.entries.insert(key, arg);
    }

    /// Pushes only if `key` is not present yet.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Args, Param, ValueRef};
    ///
    /// let mut args = Args::new();
    /// args.push("kind", "s", [Param::Str("line")]).unwrap();
    /// args.set_default("kind", "s", [Param::Str("scatter")]).unwrap();
    /// args.set_default("alpha", "d", [Param::Double(1.0)]).unwrap();
    ///
    /// assert_eq!(args.first_value("kind", "s").unwrap().0, ValueRef::Str("line"));
    /// assert!(args.contains("alpha"));
    /// ```
    pub fn set_default<'a, P>(&mut self, key: &str, format: &str, params: P) -> Result<()>
    where
        P: IntoIterator<Item = Param<'a>>,
    {
        if self.contains(key) {
            return Ok(());
        }
        self.push(key, format, params)
    }

    /// Buffer variant of [`Args::set_default`].
    pub fn set_default_buf(
        &mut self,
        key: &str,
        format: &str,
        buffer: &[u8],
        apply_padding: bool,
    ) -> Result<()> {
        if self.contains(key) {
            return Ok(());
        }
        self.push_buf(key, format, buffer, apply_padding)
    }

    /// Returns the entry stored under `key`.
    #[must_use]
    pub fn at(&self, key: &str) -> Option<&SharedArg> {
        self.entries.get(&NamedKey(key))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&NamedKey(key))
    }

    /// Number of entries, anonymous ones included.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and releases the entry stored under `key`, if any.
    pub fn remove(&mut self, key: &str) {
        self.entries.shift_remove(&NamedKey(key));
    }

    /// Releases every entry whose key is not in `exclude_keys`.
    ///
    /// Kept entries stay in their relative order. Anonymous entries are always removed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Args, Param};
    ///
    /// let mut args = Args::new();
    /// for key in ["a", "b", "c"] {
    ///     args.push(key, "i", [Param::Int(0)]).unwrap();
    /// }
    /// args.clear(&["c", "a"]);
    ///
    /// let keys: Vec<_> = args.iter().filter_map(|arg| arg.key()).collect();
    /// assert_eq!(keys, vec!["a", "c"]);
    /// ```
    pub fn clear<S: AsRef<str>>(&mut self, exclude_keys: &[S]) {
        self.entries.retain(|key, _| match key {
            EntryKey::Named(name) => exclude_keys.iter().any(|k| k.as_ref() == name),
            EntryKey::Anonymous(_) => false,
        });
    }

    /// Clears the container, keeping the keys registered with
    /// [`set_clear_exclude_keys`](crate::set_clear_exclude_keys).
    pub fn reset(&mut self) {
        let keys = clear_exclude_keys();
        self.clear(keys.as_slice());
    }

    /// Appends `increment` empty elements to the array stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for a missing key and the errors of
    /// [`Arg::increase_array`] otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Args, Param, ValueRef};
    ///
    /// let mut args = Args::new();
    /// args.push("ticks", "I", [Param::Ints(&[1, 2, 3])]).unwrap();
    /// args.increase_array("ticks", 2).unwrap();
    /// assert_eq!(args.first_value("ticks", "I").unwrap(), (ValueRef::Ints(&[1, 2, 3, 0, 0]), 5));
    /// ```
    pub fn increase_array(&mut self, key: &str, increment: usize) -> Result<()> {
        let arg = self
            .entries
            .get_mut(&NamedKey(key))
            .ok_or_else(|| Error::invalid_key(key))?;
        Rc::make_mut(arg).increase_array(increment)
    }

    /// Returns a container sharing every entry of this one.
    #[must_use]
    pub fn flat_copy(&self) -> Args {
        self.clone()
    }

    /// Deep copy without any ignored or promoted keys.
    pub fn copy(&self) -> Result<Args> {
        self.deep_copy(&CopyOptions::default())
    }

    /// Copies the container, duplicating nested containers recursively.
    ///
    /// Entries without nested containers are shared. Entries whose key is ignored
    /// are left out, and scalar containers under a promoted key become container
    /// arrays of length one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShape`] for entries holding more than one container
    /// slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{args, CopyOptions};
    ///
    /// let source = args! { "name" => "plot", "secret" => 42 };
    /// let copy = source
    ///     .deep_copy(&CopyOptions::new().with_ignore_keys(["secret"]))
    ///     .unwrap();
    /// assert!(copy.contains("name"));
    /// assert!(!copy.contains("secret"));
    /// ```
    pub fn deep_copy(&self, options: &CopyOptions) -> Result<Args> {
        let mut copy = Args::with_capacity(self.count());
        for arg in self.entries.values() {
            if arg.key().map_or(false, |key| options.ignores(key)) {
                continue;
            }
            if !arg.has_containers() {
                copy.push_arg(Rc::clone(arg));
                continue;
            }
            let value = match arg.values() {
                [Value::Args(nested)] => {
                    let nested = nested.deep_copy(options)?;
                    if arg.key().map_or(false, |key| options.promotes(key)) {
                        Value::ArgsArray(vec![nested])
                    } else {
                        Value::Args(nested)
                    }
                }
                [Value::ArgsArray(items)] => Value::ArgsArray(
                    items
                        .iter()
                        .map(|item| item.deep_copy(options))
                        .collect::<Result<_>>()?,
                ),
                _ => {
                    return Err(Error::unsupported_shape(
                        "copying two-dimensional container arrays",
                    ))
                }
            };
            copy.push_arg(Rc::new(Arg::from_value(arg.key(), value)));
        }
        Ok(copy)
    }

    /// Merges `update` into this container.
    ///
    /// For keys listed in `options`, nested containers present on both sides are
    /// merged recursively, element by element up to the shorter array. Every other
    /// entry of `update` replaces or extends this container as [`Args::push_arg`]
    /// does. On failure the container is left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{args, MergeOptions, ValueRef};
    ///
    /// let mut config = args! { "axes" => args! { "x" => 1, "grid" => 1 } };
    /// let update = args! { "axes" => args! { "x" => 2 } };
    ///
    /// config.merge(&update, &MergeOptions::new().with_merge_keys(["axes"])).unwrap();
    /// let (axes, _) = config.first_value("axes", "a").unwrap();
    /// let axes = axes.as_args().unwrap();
    /// assert_eq!(axes.first_value("x", "i").unwrap().0, ValueRef::Int(2));
    /// assert!(axes.contains("grid"));
    /// ```
    pub fn merge(&mut self, update: &Args, options: &MergeOptions) -> Result<()> {
        let mut staged = self.flat_copy();
        staged.merge_entries(update, options)?;
        *self = staged;
        Ok(())
    }

    /// Replaces or appends every entry of `update`, without nested merging.
    pub fn update_many(&mut self, update: &Args) -> Result<()> {
        self.merge(update, &MergeOptions::default())
    }

    fn merge_entries(&mut self, update: &Args, options: &MergeOptions) -> Result<()> {
        for (entry_key, update_arg) in &update.entries {
            let key = match entry_key {
                EntryKey::Named(key) if options.merges(key) => key,
                _ => {
                    self.push_arg(Rc::clone(update_arg));
                    continue;
                }
            };
            let mergeable = update_arg.has_containers()
                && self.at(key).map_or(false, |current| current.has_containers());
            if !mergeable {
                self.push_arg(Rc::clone(update_arg));
                continue;
            }
            let current = match self.entries.get_mut(&NamedKey(key)) {
                Some(current) => current,
                None => continue,
            };
            let update_items = match update_arg.values() {
                [value] => value.args_slice(),
                _ => None,
            };
            let (update_items, items) = match (update_items, Rc::make_mut(current).values_mut())
            {
                (Some(update_items), [value]) => match value.args_slice_mut() {
                    Some(items) => (update_items, items),
                    None => return Err(merge_shape_error()),
                },
                _ => return Err(merge_shape_error()),
            };
            if items.len() != update_items.len() {
                tracing::debug!(
                    "merging \"{}\": {} nested containers with {}, extra elements are ignored",
                    key,
                    items.len(),
                    update_items.len()
                );
            }
            for (item, update_item) in items.iter_mut().zip(update_items) {
                item.merge_entries(update_item, options)?;
            }
        }
        Ok(())
    }

    /// Returns the first value stored under `key`, see [`Arg::first_value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for a missing key and
    /// [`Error::IncompatibleFormat`] if the value cannot be read with `format`.
    pub fn first_value(&self, key: &str, format: &str) -> Result<(ValueRef<'_>, usize)> {
        self.at(key)
            .ok_or_else(|| Error::invalid_key(key))?
            .first_value(format)
    }

    /// Reads every value stored under `key`, see [`Arg::values_as`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::{Args, Param, ValueRef};
    ///
    /// let mut args = Args::new();
    /// args.push("ticks", "I", [Param::Ints(&[1, 2, 3])]).unwrap();
    /// assert_eq!(args.values("ticks", "I").unwrap(), vec![ValueRef::Ints(&[1, 2, 3])]);
    /// assert!(args.values("ticks", "i").is_err());
    /// ```
    pub fn values(&self, key: &str, format: &str) -> Result<Vec<ValueRef<'_>>> {
        self.at(key)
            .ok_or_else(|| Error::invalid_key(key))?
            .values_as(format)
    }

    /// Returns an iterator over the entries in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.values(),
        }
    }
}

fn merge_shape_error() -> Error {
    Error::unsupported_shape("merging two-dimensional container arrays")
}

/// Iterator over the entries of an [`Args`] container.
#[derive(Clone)]
pub struct Iter<'a> {
    inner: indexmap::map::Values<'a, EntryKey, SharedArg>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a SharedArg;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a SharedArg;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(String, Value)> for Args {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut args = Args::new();
        for (key, value) in iter {
            args.push_value(&key, value);
        }
        args
    }
}

impl PartialEq for Args {
    fn eq(&self, other: &Self) -> bool {
        self.count() == other.count() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|arg| (arg.key(), (arg.format(), arg.values()))),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::released_count;

    fn keys(args: &Args) -> Vec<Option<&str>> {
        args.iter().map(|arg| arg.key()).collect()
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut args = Args::new();
        args.push("a", "i", [Param::Int(1)]).unwrap();
        args.push("b", "i", [Param::Int(2)]).unwrap();
        args.push("a", "s", [Param::Str("one")]).unwrap();
        assert_eq!(keys(&args), vec![Some("a"), Some("b")]);
        assert_eq!(args.at("a").unwrap().format(), "s");
    }

    #[test]
    fn test_anonymous_entries_append() {
        let mut args = Args::new();
        args.push_anonymous("i", [Param::Int(1)]).unwrap();
        args.push_anonymous("i", [Param::Int(1)]).unwrap();
        args.push("k", "i", [Param::Int(2)]).unwrap();
        assert_eq!(args.count(), 3);
        assert_eq!(keys(&args), vec![None, None, Some("k")]);

        args.clear(&["k"]);
        assert_eq!(keys(&args), vec![Some("k")]);
    }

    #[test]
    fn test_failed_push_leaves_container_unchanged() {
        let mut args = Args::new();
        args.push("k", "i", [Param::Int(1)]).unwrap();
        assert!(args.push("k", "d(", [Param::Double(1.0)]).is_err());
        assert!(args.push("k", "i", [Param::Str("x")]).is_err());
        assert_eq!(args.first_value("k", "i").unwrap().0, ValueRef::Int(1));
    }

    #[test]
    fn test_remove() {
        let mut args = Args::new();
        for key in ["a", "b", "c"] {
            args.push(key, "i", [Param::Int(0)]).unwrap();
        }
        args.remove("b");
        args.remove("missing");
        assert_eq!(keys(&args), vec![Some("a"), Some("c")]);
    }

    #[test]
    fn test_increase_array_is_copy_on_write() {
        let mut args = Args::new();
        args.push("k", "I", [Param::Ints(&[1])]).unwrap();
        let copy = args.flat_copy();

        args.increase_array("k", 1).unwrap();
        assert_eq!(args.at("k").unwrap().values()[0].len(), 2);
        assert_eq!(copy.at("k").unwrap().values()[0].len(), 1);

        assert!(matches!(
            args.increase_array("missing", 1),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_entries_released_once() {
        let before = released_count();
        let mut args = Args::new();
        args.push("a", "i", [Param::Int(1)]).unwrap();
        args.push("b", "i", [Param::Int(2)]).unwrap();
        let copy = args.flat_copy();

        drop(args);
        assert_eq!(released_count(), before);
        assert_eq!(Rc::strong_count(copy.at("a").unwrap()), 1);
        drop(copy);
        assert_eq!(released_count(), before + 2);
    }

    #[test]
    fn test_deep_copy_shares_leaves() {
        let mut nested = Args::new();
        nested.push("x", "i", [Param::Int(1)]).unwrap();
        let mut args = Args::new();
        args.push("n", "i", [Param::Int(1)]).unwrap();
        args.push("sub", "a", [Param::Args(nested)]).unwrap();

        let copy = args.copy().unwrap();
        assert!(Rc::ptr_eq(copy.at("n").unwrap(), args.at("n").unwrap()));
        assert!(!Rc::ptr_eq(copy.at("sub").unwrap(), args.at("sub").unwrap()));
        assert_eq!(copy, args);
    }

    #[test]
    fn test_deep_copy_shares_string_entries() {
        let mut nested = Args::new();
        nested.push("label", "s", [Param::Str("time")]).unwrap();
        let mut args = Args::new();
        args.push("title", "s", [Param::Str("plot")]).unwrap();
        args.push("labels", "S", [Param::Strs(&["a", "b"])]).unwrap();
        args.push("secret", "s", [Param::Str("token")]).unwrap();
        args.push("axis", "a", [Param::Args(nested)]).unwrap();

        let copy = args
            .deep_copy(&CopyOptions::new().with_ignore_keys(["secret"]))
            .unwrap();
        assert_eq!(keys(&copy), vec![Some("title"), Some("labels"), Some("axis")]);
        assert!(Rc::ptr_eq(copy.at("title").unwrap(), args.at("title").unwrap()));
        assert!(Rc::ptr_eq(copy.at("labels").unwrap(), args.at("labels").unwrap()));
        assert!(!Rc::ptr_eq(copy.at("axis").unwrap(), args.at("axis").unwrap()));

        let (axis, _) = copy.first_value("axis", "a").unwrap();
        let axis = axis.as_args().unwrap();
        assert_eq!(axis.first_value("label", "s").unwrap().0, ValueRef::Str("time"));
    }

    #[test]
    fn test_merge_key_on_strings_replaces() {
        let mut args = Args::new();
        args.push("title", "s", [Param::Str("old")]).unwrap();
        args.push("labels", "S", [Param::Strs(&["a", "b"])]).unwrap();
        let mut update = Args::new();
        update.push("title", "s", [Param::Str("new")]).unwrap();
        update.push("labels", "S", [Param::Strs(&["c"])]).unwrap();

        args.merge(
            &update,
            &MergeOptions::new().with_merge_keys(["title", "labels"]),
        )
        .unwrap();
        assert_eq!(args.first_value("title", "s").unwrap().0, ValueRef::Str("new"));
        assert!(Rc::ptr_eq(args.at("labels").unwrap(), update.at("labels").unwrap()));
    }

    #[test]
    fn test_deep_copy_promotes_keys() {
        let mut args = Args::new();
        args.push("series", "a", [Param::Args(Args::new())]).unwrap();
        let copy = args
            .deep_copy(&CopyOptions::new().with_array_promote_keys(["series"]))
            .unwrap();
        assert_eq!(copy.at("series").unwrap().format(), "nA");
        assert_eq!(args.at("series").unwrap().format(), "a");
    }

    #[test]
    fn test_deep_copy_rejects_two_dimensional_arrays() {
        let mut args = Args::new();
        args.push(
            "grid",
            "nAA",
            [
                Param::Size(1),
                Param::ArgsArray(vec![Args::new()]),
                Param::ArgsArray(vec![Args::new()]),
            ],
        )
        .unwrap();
        assert!(matches!(args.copy(), Err(Error::UnsupportedShape(_))));
    }

    #[test]
    fn test_merge_truncates_to_shorter_array() {
        let mut first = Args::new();
        first.push("x", "i", [Param::Int(1)]).unwrap();
        let mut args = Args::new();
        args.push("plots", "A", [Param::ArgsArray(vec![first, Args::new()])])
            .unwrap();

        let mut update_first = Args::new();
        update_first.push("x", "i", [Param::Int(5)]).unwrap();
        let mut update = Args::new();
        update
            .push("plots", "A", [Param::ArgsArray(vec![update_first])])
            .unwrap();

        args.merge(&update, &MergeOptions::new().with_merge_keys(["plots"]))
            .unwrap();
        let (plots, length) = args.first_value("plots", "A").unwrap();
        assert_eq!(length, 2);
        let plots: &[Args] = plots.try_into().unwrap();
        assert_eq!(plots[0].first_value("x", "i").unwrap().0, ValueRef::Int(5));
        assert!(plots[1].is_empty());
    }

    #[test]
    fn test_failed_merge_rolls_back() {
        let mut args = Args::new();
        args.push("k", "i", [Param::Int(1)]).unwrap();
        args.push(
            "grid",
            "nAA",
            [
                Param::Size(1),
                Param::ArgsArray(vec![Args::new()]),
                Param::ArgsArray(vec![Args::new()]),
            ],
        )
        .unwrap();
        let before = args.flat_copy();

        let mut update = Args::new();
        update.push("k", "i", [Param::Int(2)]).unwrap();
        update.push("grid", "a", [Param::Args(Args::new())]).unwrap();
        let result = args.merge(&update, &MergeOptions::new().with_merge_keys(["grid"]));

        assert!(matches!(result, Err(Error::UnsupportedShape(_))));
        assert_eq!(args, before);
        assert_eq!(args.first_value("k", "i").unwrap().0, ValueRef::Int(1));
    }

    #[test]
    fn test_reset_keeps_excluded_keys() {
        let mut args = Args::new();
        args.push("backend", "s", [Param::Str("svg")]).unwrap();
        args.push("x", "i", [Param::Int(1)]).unwrap();

        crate::set_clear_exclude_keys(["backend"]);
        args.reset();
        crate::set_clear_exclude_keys(Vec::<String>::new());

        assert_eq!(keys(&args), vec![Some("backend")]);
    }
}
