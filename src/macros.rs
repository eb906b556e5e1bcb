/// Builds an [`Args`](crate::Args) container from `key => value` pairs.
///
/// Each value is converted with [`Value::from`](crate::Value), so its format follows
/// from its Rust type: `i32` is stored as `i`, `Vec<f64>` as `nD`, a nested `args!`
/// as `a`, and so on.
///
/// # Examples
///
/// ```rust
/// use dynargs::{args, ValueRef};
///
/// let plot = args! {
///     "kind" => "line",
///     "x" => vec![0.0, 0.5, 1.0],
///     "axes" => args! { "grid" => 1 },
/// };
/// assert_eq!(plot.count(), 3);
/// assert_eq!(plot.at("x").unwrap().format(), "nD");
/// assert_eq!(plot.first_value("kind", "s").unwrap().0, ValueRef::Str("line"));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };

    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut args = $crate::Args::new();
        $(
            args.push_value($key, $crate::Value::from($value));
        )+
        args
    }};
}
