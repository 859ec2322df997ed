#![forbid(unsafe_code)]

//! Gate-composition demo: derive one watchable's value from change events
//! on others.
//!
//! Builds a watchable with three initial bindings, then wires AND and OR
//! gates whose `value` is recomputed by watchers on each dependency's
//! `value`, printing every transition. Set `RUST_LOG=watchtree=trace` to
//! watch the registry and notification events underneath.

use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use watchtree::{
    Binding, ObservableView, Value, WatchError, watch, watchable, watchable_with, watcher,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("demo failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), WatchError> {
    simple_watch_demo()?;
    gate_demo()
}

/// The three-route binding scenario: watch `a`, `b.c`, and `d.0`, write
/// through each route, and snapshot the result.
fn simple_watch_demo() -> Result<(), WatchError> {
    let print_transition =
        |new: &Value, old: &Value| println!("watcher: {new:?} (was {old:?})");

    let w1 = watchable_with(
        json!({"a": "a", "b": {"c": "c"}, "d": [1, 2, 3]}),
        [
            Binding::new("a", print_transition),
            Binding::new("b.c", print_transition),
            Binding::new("d.0", print_transition),
        ],
    )?;

    w1.set("a", "new-a")?;
    w1.set("b.c", "new-c")?;
    w1.set("d.0", 10)?;
    println!("w1 = {}", w1.to_json());
    Ok(())
}

/// Wire `gate.value` to recompute from every dependency's `value` on change.
/// `init` seeds the fold; `combine` is `&&` for AND, `||` for OR.
fn wire_gate(
    gate: &ObservableView,
    deps: &[ObservableView],
    init: bool,
    combine: fn(bool, bool) -> bool,
) -> Result<(), WatchError> {
    for dep in deps {
        let gate = gate.clone();
        let deps: Vec<ObservableView> = deps.to_vec();
        let this = dep.clone();
        let w = watcher(move |new: &Value, _old: &Value| {
            let folded = deps.iter().fold(init, |acc, d| {
                // The triggering write has not committed yet; its
                // contribution is the incoming value.
                let contribution = if *d == this {
                    new.as_bool().unwrap_or(false)
                } else {
                    d.get("value").ok().and_then(|v| v.as_bool()).unwrap_or(false)
                };
                combine(acc, contribution)
            });
            debug!(folded, "gate recomputed");
            let _ = gate.set("value", folded);
        });
        watch(dep, "value", &w)?;
    }
    Ok(())
}

fn gate_over(
    deps: &[ObservableView],
    init: bool,
    combine: fn(bool, bool) -> bool,
) -> Result<ObservableView, WatchError> {
    let seed = deps
        .iter()
        .map(|d| d.get("value").ok().and_then(|v| v.as_bool()).unwrap_or(false))
        .fold(init, combine);
    let gate = watchable(json!({"dependencies": [], "value": seed}))?;
    for (i, dep) in deps.iter().enumerate() {
        gate.set(&format!("dependencies.{i}"), dep.clone())?;
    }
    wire_gate(&gate, deps, init, combine)?;
    Ok(gate)
}

fn gate_demo() -> Result<(), WatchError> {
    let v1 = watchable(json!({"id": 1, "value": true}))?;
    let v2 = watchable(json!({"id": 2, "value": true}))?;
    let deps = [v1.clone(), v2.clone()];

    let and_gate = gate_over(&deps, true, |a, b| a && b)?;
    let or_gate = gate_over(&deps, false, |a, b| a || b)?;

    let report = |label: &str| -> Result<(), WatchError> {
        println!(
            "{label}: and={:?} or={:?}",
            and_gate.get("value")?,
            or_gate.get("value")?
        );
        Ok(())
    };

    report("initial   ")?;
    for (dep, name, val) in [
        (&v1, "v1", false),
        (&v2, "v2", false),
        (&v1, "v1", true),
        (&v2, "v2", true),
    ] {
        dep.set("value", val)?;
        report(&format!("{name}={val:<5}"))?;
    }
    Ok(())
}
