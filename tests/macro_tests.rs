use dynargs::{args, Args, Value, ValueRef};

#[test]
fn test_args_macro_empty() {
    let args = args!();
    assert!(args.is_empty());
    assert_eq!(args, Args::new());
}

#[test]
fn test_args_macro_scalars() {
    let args = args! {
        "width" => 640,
        "alpha" => 0.5,
        "marker" => 'o',
        "title" => "Sine",
    };

    assert_eq!(args.count(), 4);
    assert_eq!(args.first_value("width", "i").unwrap().0, ValueRef::Int(640));
    assert_eq!(args.first_value("alpha", "d").unwrap().0, ValueRef::Double(0.5));
    assert_eq!(args.first_value("marker", "c").unwrap().0, ValueRef::Char('o'));
    assert_eq!(args.first_value("title", "s").unwrap().0, ValueRef::Str("Sine"));
}

#[test]
fn test_args_macro_arrays() {
    let args = args! {
        "ticks" => vec![1, 2, 3],
        "x" => vec![0.0, 1.0],
        "labels" => vec!["a".to_string(), "b".to_string()],
    };

    assert_eq!(args.at("ticks").unwrap().format(), "nI");
    assert_eq!(args.first_value("x", "D").unwrap(), (ValueRef::Doubles(&[0.0, 1.0]), 2));
    let (labels, length) = args.first_value("labels", "S").unwrap();
    assert_eq!(length, 2);
    assert_eq!(labels.to_value(), Value::from(vec!["a", "b"]));
}

#[test]
fn test_args_macro_nested() {
    let args = args! {
        "subplots" => vec![args! { "kind" => "line" }, args! { "kind" => "bar" }],
        "axes" => args! {
            "x" => args! { "label" => "time" },
        },
    };

    let (subplots, length) = args.first_value("subplots", "A").unwrap();
    assert_eq!(length, 2);
    let kinds: Vec<_> = subplots
        .as_args_array()
        .unwrap()
        .iter()
        .map(|subplot| subplot.first_value("kind", "s").unwrap().0)
        .collect();
    assert_eq!(kinds, vec![ValueRef::Str("line"), ValueRef::Str("bar")]);

    let axes = args.first_value("axes", "a").unwrap().0.as_args().unwrap();
    let x = axes.first_value("x", "a").unwrap().0.as_args().unwrap();
    assert_eq!(x.first_value("label", "s").unwrap().0, ValueRef::Str("time"));
}

#[test]
fn test_args_macro_expressions() {
    let width = 4;
    let name = String::from("grid");
    let args = args! {
        "width" => width * 2,
        "name" => name.as_str(),
        "values" => (0..3).collect::<Vec<i32>>(),
    };

    assert_eq!(args.first_value("width", "i").unwrap().0, ValueRef::Int(8));
    assert_eq!(args.first_value("name", "s").unwrap().0, ValueRef::Str("grid"));
    assert_eq!(args.first_value("values", "I").unwrap().1, 3);
}

#[test]
fn test_args_macro_duplicate_keys() {
    let args = args! {
        "a" => 1,
        "b" => 2,
        "a" => "replaced",
    };

    let keys: Vec<_> = args.iter().filter_map(|arg| arg.key()).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(args.first_value("a", "s").unwrap().0, ValueRef::Str("replaced"));
}
