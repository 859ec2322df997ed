#![forbid(unsafe_code)]

//! Watchable views over nested structured data.
//!
//! `watchtree` wraps a plain structured value (a JSON object or array) into
//! an observable view whose reads and writes go through explicit
//! interception, and lets callers register watcher functions that fire —
//! synchronously, with `(new, old)` — whenever a specific dot-addressed
//! property is written. It is a minimal reactive-binding primitive, not a
//! framework: no scheduling, no batching, no dependency graph. Consumers
//! build those on top, like the AND/OR gate composition in
//! `watchtree-demo-gates`.
//!
//! # Primary responsibilities
//! - **[`watchable`] / [`watchable_with`]**: recursively wrap structured
//!   data into observable views (idempotent on already-wrapped input).
//! - **[`ObservableView::get`] / [`ObservableView::set`]**: read/write
//!   interception with dotted-route resolution (`"b.c"`, `"d.0"`).
//! - **[`watch`] / [`unwatch`]**: register watchers at an observation point
//!   (the resolved ancestor view plus the leaf property name).
//!
//! Everything is single-threaded and synchronous: watchers run on the
//! writing call's stack, in registration order, before the value is
//! committed.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use watchtree::{watch, watchable, watcher};
//!
//! let view = watchable(json!({"b": {"c": 1}})).unwrap();
//!
//! let seen = Rc::new(Cell::new(0));
//! let seen_in = Rc::clone(&seen);
//! let w = watcher(move |new, _old| {
//!     if let Some(n) = new.as_int() {
//!         seen_in.set(n);
//!     }
//! });
//! watch(&view, "b.c", &w).unwrap();
//!
//! view.set("b.c", 9).unwrap();
//! assert_eq!(seen.get(), 9);
//! assert_eq!(view.to_json(), json!({"b": {"c": 9}}));
//! ```

pub mod error;
pub mod value;
pub mod view;
pub mod watch;

mod path;
mod registry;

pub use error::WatchError;
pub use registry::Watcher;
pub use value::Value;
pub use view::{Binding, ObservableView, watchable, watchable_with};
pub use watch::{reset_watchers, unwatch, watch, watcher, watcher_count};
