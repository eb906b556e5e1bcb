//! Layered plot configuration with dynamically typed containers.
//!
//! Run with: RUST_LOG=dynargs=trace cargo run --example dynamic_values

use dynargs::{args, from_args, Args, CopyOptions, MergeOptions, Param, ValueRef};
use serde::Deserialize;
use std::error::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Axis<'a> {
    label: &'a str,
    log: bool,
}

fn print_args(args: &Args, indent: usize) {
    for arg in args {
        let key = arg.key().unwrap_or("<anonymous>");
        for slot in arg.value_iter() {
            match slot.value.as_view() {
                ValueRef::Args(nested) => {
                    println!("{:indent$}{} ({}):", "", key, arg.format(), indent = indent);
                    print_args(nested, indent + 2);
                }
                _ => println!(
                    "{:indent$}{} ({}) = {}",
                    "",
                    key,
                    arg.format(),
                    slot.value,
                    indent = indent
                ),
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Defaults shared by every plot
    let defaults = args! {
        "size" => vec![640, 480],
        "axes" => args! {
            "x" => args! { "label" => "x", "log" => 0 },
            "y" => args! { "label" => "y", "log" => 0 },
        },
        "token" => "do-not-export",
    };

    // A plot built from format strings and positional parameters
    let x: Vec<f64> = (0..5).map(|i| f64::from(i) * 0.25).collect();
    let y: Vec<f64> = x.iter().map(|v| (-v).exp()).collect();
    let mut plot = defaults.copy()?;
    plot.push("x", "nD", [Param::Size(x.len()), Param::Doubles(&x)])?;
    plot.push("y", "D", [Param::Doubles(&y)])?;
    plot.push("color", "ddd", [0.1.into(), 0.4.into(), 0.8.into()])?;
    plot.set_default("title", "s", [Param::Str("untitled")])?;

    // Override a single nested value, keeping the other axis settings
    let update = args! {
        "axes" => args! { "y" => args! { "log" => 1 } },
        "title" => "Decay",
    };
    plot.merge(&update, &MergeOptions::new().with_merge_keys(["axes", "y"]))?;

    println!("Plot configuration:");
    print_args(&plot, 2);
    println!();

    // Typed and coerced reads
    let (color, length) = plot.first_value("color", "D")?;
    println!("color has {} components: {:?}", length, color.as_doubles());
    let size = plot.values("size", "ii")?;
    println!("size read element-wise: {:?}", size);

    let axes = plot.first_value("axes", "a")?.0.as_args().ok_or("axes is not a container")?;
    let y_axis: Axis<'_> = from_args(axes.first_value("y", "a")?.0.as_args().ok_or("y is not a container")?)?;
    println!("y axis: {:?}", y_axis);
    println!();

    // Growing an array in place leaves the defaults untouched
    plot.increase_array("size", 1)?;
    println!("size after growing: {:?}", plot.first_value("size", "I")?.0);
    println!("default size:       {:?}", defaults.first_value("size", "I")?.0);
    println!();

    // Export without secrets
    let export = plot.deep_copy(&CopyOptions::new().with_ignore_keys(["token"]))?;
    println!("Exported as JSON:\n{}", serde_json::to_string_pretty(&export)?);

    Ok(())
}
