use dynargs::{
    args, set_clear_exclude_keys, validate, Args, Compatibility, CopyOptions, Error,
    MergeOptions, Param, Value, ValueRef,
};
use std::rc::Rc;

fn keys(args: &Args) -> Vec<&str> {
    args.iter().filter_map(|arg| arg.key()).collect()
}

fn nested<'a>(args: &'a Args, key: &str) -> &'a Args {
    args.first_value(key, "a").unwrap().0.as_args().unwrap()
}

#[test]
fn test_validate_formats() {
    for format in ["i", "ddd", "nI", "I(3)", "s(10)", "C", "nS", "aa", "nA"] {
        assert!(validate(format), "{} should be valid", format);
    }
    for format in ["id", "sI", "x", "i(", "d(x)", "(2)i"] {
        assert!(!validate(format), "{} should be invalid", format);
    }
}

#[test]
fn test_push_and_read_scalar() {
    let mut args = Args::new();
    args.push("width", "i", [Param::Int(42)]).unwrap();

    assert_eq!(args.first_value("width", "i").unwrap(), (ValueRef::Int(42), 1));
    assert_eq!(args.values("width", "i").unwrap(), vec![ValueRef::Int(42)]);
    assert!(matches!(
        args.first_value("width", "d"),
        Err(Error::IncompatibleFormat { .. })
    ));
    assert!(matches!(
        args.first_value("height", "i"),
        Err(Error::InvalidKey(_))
    ));
}

#[test]
fn test_push_and_read_array() {
    let mut args = Args::new();
    args.push("ticks", "I", [Param::Ints(&[1, 2, 3])]).unwrap();

    let (ticks, length) = args.first_value("ticks", "I").unwrap();
    assert_eq!(length, 3);
    assert_eq!(ticks, ValueRef::Ints(&[1, 2, 3]));
    assert!(matches!(
        args.first_value("ticks", "i"),
        Err(Error::IncompatibleFormat { .. })
    ));

    let prefix = args.values("ticks", "ii").unwrap();
    assert_eq!(prefix, vec![ValueRef::Int(1), ValueRef::Int(2)]);
    assert!(args.values("ticks", "iiii").is_err());
}

#[test]
fn test_explicit_length_marker() {
    let mut args = Args::new();
    let x = [0.0, 0.25, 0.5, 0.75];
    args.push("x", "nD", [Param::Size(2), Param::Doubles(&x)])
        .unwrap();

    assert_eq!(args.first_value("x", "D").unwrap(), (ValueRef::Doubles(&[0.0, 0.25]), 2));
}

#[test]
fn test_param_errors_leave_container_unchanged() {
    let mut args = Args::new();
    args.push("a", "i", [Param::Int(1)]).unwrap();

    assert!(matches!(
        args.push("a", "d", [Param::Int(2)]),
        Err(Error::ParamMismatch { .. })
    ));
    assert!(matches!(
        args.push("b", "ii", [Param::Int(2)]),
        Err(Error::MissingParam { .. })
    ));
    assert!(matches!(
        args.push("c", "i", [Param::Int(2), Param::Int(3)]),
        Err(Error::TrailingParams(1))
    ));
    assert!(matches!(
        args.push("d", "id", [Param::Int(1), Param::Double(2.0)]),
        Err(Error::InvalidFormat { .. })
    ));

    assert_eq!(keys(&args), vec!["a"]);
    assert_eq!(args.first_value("a", "i").unwrap().0, ValueRef::Int(1));
}

#[test]
fn test_scalar_promotion() {
    let mut args = Args::new();
    args.push("rgb", "ddd", [0.1.into(), 0.2.into(), 0.3.into()])
        .unwrap();
    args.push("name", "cccc", ['l'.into(), 'i'.into(), 'n'.into(), 'e'.into()])
        .unwrap();

    let rgb = args.at("rgb").unwrap();
    assert_eq!(rgb.format(), "nD");
    assert_eq!(rgb.values(), &[Value::DoubleArray(vec![0.1, 0.2, 0.3])]);
    assert_eq!(args.first_value("name", "s").unwrap().0, ValueRef::Str("line"));
}

#[test]
fn test_string_options() {
    let mut args = Args::new();
    args.push("short", "s(3)", [Param::Str("abcdef")]).unwrap();
    args.push("label", "C", [Param::Str("axis")]).unwrap();

    assert_eq!(args.first_value("short", "s").unwrap().0, ValueRef::Str("abc"));
    assert_eq!(args.at("label").unwrap().format(), "s");
    assert_eq!(args.first_value("label", "s").unwrap().0, ValueRef::Str("axis"));
}

#[test]
fn test_increase_array() {
    let mut args = Args::new();
    args.push("ticks", "I", [Param::Ints(&[1, 2, 3])]).unwrap();
    args.push("labels", "S", [Param::Strs(&["a"])]).unwrap();
    args.push("width", "i", [Param::Int(1)]).unwrap();

    args.increase_array("ticks", 2).unwrap();
    assert_eq!(
        args.first_value("ticks", "I").unwrap(),
        (ValueRef::Ints(&[1, 2, 3, 0, 0]), 5)
    );

    args.increase_array("labels", 1).unwrap();
    let (labels, length) = args.first_value("labels", "S").unwrap();
    assert_eq!(length, 2);
    assert_eq!(labels.as_strs().unwrap(), ["a".to_string(), String::new()]);

    assert!(matches!(
        args.increase_array("width", 2),
        Err(Error::UnsupportedShape(_))
    ));
    assert!(matches!(
        args.increase_array("missing", 2),
        Err(Error::InvalidKey(_))
    ));
}

#[test]
fn test_increase_array_does_not_touch_copies() {
    let mut args = Args::new();
    args.push("ticks", "I", [Param::Ints(&[1])]).unwrap();
    let copy = args.flat_copy();

    args.increase_array("ticks", 1).unwrap();
    assert_eq!(copy.first_value("ticks", "I").unwrap().1, 1);
    assert_eq!(args.first_value("ticks", "I").unwrap().1, 2);
}

#[test]
fn test_flat_copy_releases_entries_once() {
    let mut args = Args::new();
    args.push("title", "s", [Param::Str("plot")]).unwrap();

    let copy = args.flat_copy();
    let weak = Rc::downgrade(copy.at("title").unwrap());
    assert_eq!(weak.strong_count(), 2);

    drop(args);
    assert_eq!(Rc::strong_count(copy.at("title").unwrap()), 1);
    assert_eq!(copy.first_value("title", "s").unwrap().0, ValueRef::Str("plot"));

    drop(copy);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_insertion_order() {
    let mut args = Args::new();
    args.push("b", "i", [Param::Int(1)]).unwrap();
    args.push("a", "i", [Param::Int(2)]).unwrap();
    args.push("c", "i", [Param::Int(3)]).unwrap();
    assert_eq!(keys(&args), vec!["b", "a", "c"]);

    // replacing keeps the position but takes the new format
    args.push("a", "s", [Param::Str("two")]).unwrap();
    assert_eq!(keys(&args), vec!["b", "a", "c"]);
    assert_eq!(args.at("a").unwrap().format(), "s");
    assert_eq!(args.count(), 3);

    args.remove("b");
    args.push("b", "i", [Param::Int(4)]).unwrap();
    assert_eq!(keys(&args), vec!["a", "c", "b"]);
}

#[test]
fn test_anonymous_entries() {
    let mut args = Args::new();
    args.push_anonymous("i", [Param::Int(1)]).unwrap();
    args.push_anonymous("i", [Param::Int(2)]).unwrap();
    args.push("named", "i", [Param::Int(3)]).unwrap();

    assert_eq!(args.count(), 3);
    let values: Vec<_> = args
        .iter()
        .map(|arg| arg.first_value("i").unwrap().0)
        .collect();
    assert_eq!(values, vec![ValueRef::Int(1), ValueRef::Int(2), ValueRef::Int(3)]);

    args.clear(&["named"]);
    assert_eq!(keys(&args), vec!["named"]);
    assert_eq!(args.count(), 1);
}

#[test]
fn test_set_default() {
    let mut args = Args::new();
    args.push("kind", "s", [Param::Str("line")]).unwrap();

    args.set_default("kind", "s", [Param::Str("scatter")]).unwrap();
    args.set_default("alpha", "d", [Param::Double(0.5)]).unwrap();

    assert_eq!(args.first_value("kind", "s").unwrap().0, ValueRef::Str("line"));
    assert_eq!(args.first_value("alpha", "d").unwrap().0, ValueRef::Double(0.5));
    assert_eq!(keys(&args), vec!["kind", "alpha"]);
}

#[test]
fn test_clear_and_reset() {
    let mut args = args! { "a" => 1, "b" => 2, "c" => 3 };
    args.clear::<&str>(&[]);
    assert!(args.is_empty());

    set_clear_exclude_keys(["keep"]);
    let mut args = args! { "drop" => 1, "keep" => 2 };
    args.reset();
    assert_eq!(keys(&args), vec!["keep"]);
    set_clear_exclude_keys(Vec::<String>::new());
}

#[test]
fn test_buffer_pushes() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&3i32.to_ne_bytes());
    buffer.extend_from_slice(&4i32.to_ne_bytes());

    let mut args = Args::new();
    args.push_buf("size", "ii", &buffer, true).unwrap();
    assert_eq!(args.at("size").unwrap().format(), "nI");
    assert_eq!(args.first_value("size", "I").unwrap(), (ValueRef::Ints(&[3, 4]), 2));

    args.push_buf("name", "s", b"grid\0ignored", false).unwrap();
    assert_eq!(args.first_value("name", "s").unwrap().0, ValueRef::Str("grid"));

    args.set_default_buf("name", "s", b"other\0", false).unwrap();
    assert_eq!(args.first_value("name", "s").unwrap().0, ValueRef::Str("grid"));

    assert!(matches!(
        args.push_buf("short", "d", &[0u8; 4], false),
        Err(Error::Buffer { .. })
    ));
    assert!(!args.contains("short"));
}

#[test]
fn test_check_format() {
    let mut args = Args::new();
    args.push("ticks", "I", [Param::Ints(&[1, 2, 3])]).unwrap();
    let ticks = args.at("ticks").unwrap();

    assert_eq!(ticks.check_format("I"), Compatibility::SameType);
    assert_eq!(ticks.check_format("iii"), Compatibility::Coercible);
    assert_eq!(ticks.check_format("i"), Compatibility::Incompatible);
    assert_eq!(ticks.check_format("D"), Compatibility::Incompatible);
}

#[test]
fn test_merge_with_merge_keys() {
    let mut config = args! { "a" => args! { "x" => 1, "z" => 9 } };
    let update = args! { "a" => args! { "x" => 2, "y" => 3 } };

    config
        .merge(&update, &MergeOptions::new().with_merge_keys(["a"]))
        .unwrap();

    let a = nested(&config, "a");
    assert_eq!(keys(a), vec!["x", "z", "y"]);
    assert_eq!(a.first_value("x", "i").unwrap().0, ValueRef::Int(2));
    assert_eq!(a.first_value("y", "i").unwrap().0, ValueRef::Int(3));
    assert_eq!(a.first_value("z", "i").unwrap().0, ValueRef::Int(9));
}

#[test]
fn test_merge_without_merge_keys_replaces() {
    let mut config = args! { "a" => args! { "x" => 1, "z" => 9 } };
    let update = args! { "a" => args! { "x" => 2, "y" => 3 } };

    config.merge(&update, &MergeOptions::new()).unwrap();

    let a = nested(&config, "a");
    assert_eq!(keys(a), vec!["x", "y"]);
    assert!(Rc::ptr_eq(config.at("a").unwrap(), update.at("a").unwrap()));
}

#[test]
fn test_merge_does_not_modify_shared_nested_containers() {
    let defaults = args! { "axes" => args! { "grid" => 0 } };
    let mut config = defaults.flat_copy();

    config
        .merge(
            &args! { "axes" => args! { "grid" => 1 } },
            &MergeOptions::new().with_merge_keys(["axes"]),
        )
        .unwrap();

    fn grid(args: &Args) -> ValueRef<'_> {
        nested(args, "axes").first_value("grid", "i").unwrap().0
    }
    assert_eq!(grid(&config), ValueRef::Int(1));
    assert_eq!(grid(&defaults), ValueRef::Int(0));
}

#[test]
fn test_update_many() {
    let mut args = args! { "a" => 1, "b" => 2 };
    let update = args! { "b" => "two", "c" => 3.0 };

    args.update_many(&update).unwrap();
    assert_eq!(keys(&args), vec!["a", "b", "c"]);
    assert_eq!(args.first_value("b", "s").unwrap().0, ValueRef::Str("two"));
    assert!(Rc::ptr_eq(args.at("c").unwrap(), update.at("c").unwrap()));
}

#[test]
fn test_deep_copy_ignores_keys() {
    let source = args! {
        "name" => "plot",
        "secret" => "token",
        "nested" => args! { "secret" => 1, "visible" => 2 },
    };

    let copy = source
        .deep_copy(&CopyOptions::new().with_ignore_keys(["secret"]))
        .unwrap();

    assert_eq!(keys(&copy), vec!["name", "nested"]);
    assert_eq!(keys(nested(&copy, "nested")), vec!["visible"]);
    assert!(Rc::ptr_eq(copy.at("name").unwrap(), source.at("name").unwrap()));
    assert!(!Rc::ptr_eq(copy.at("nested").unwrap(), source.at("nested").unwrap()));
}

#[test]
fn test_deep_copy_promotes_keys() {
    let source = args! { "series" => args! { "x" => 1 } };

    let copy = source
        .deep_copy(&CopyOptions::new().with_array_promote_keys(["series"]))
        .unwrap();

    let series = copy.at("series").unwrap();
    assert_eq!(series.format(), "nA");
    let (items, length) = copy.first_value("series", "A").unwrap();
    assert_eq!(length, 1);
    assert_eq!(items.as_args_array().unwrap()[0], args! { "x" => 1 });
}

#[test]
fn test_deep_copy_is_independent() {
    let source = args! { "axes" => args! { "ticks" => vec![1, 2] } };
    let mut copy = source.copy().unwrap();

    copy.merge(
        &args! { "axes" => args! { "ticks" => vec![3] } },
        &MergeOptions::new().with_merge_keys(["axes"]),
    )
    .unwrap();

    fn ticks(args: &Args) -> usize {
        nested(args, "axes").first_value("ticks", "I").unwrap().1
    }
    assert_eq!(ticks(&source), 2);
    assert_eq!(ticks(&copy), 1);
}
