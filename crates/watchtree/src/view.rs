#![forbid(unsafe_code)]

//! Observable views: transparent change-observation over structured data.
//!
//! # Design
//!
//! An [`ObservableView`] is a shared handle (`Rc`) to a map or list body
//! behind a `RefCell`. Cloning a handle clones the identity, not the data;
//! the handle's pointer identity *is* the view's identity for observation
//! points. Property interception is explicit: callers read through
//! [`get`](ObservableView::get) and write through
//! [`set`](ObservableView::set), both of which accept dotted routes.
//!
//! # Invariants
//!
//! 1. Every structured value reachable from a view is itself a view
//!    (established by [`Value::from_json`] when plain data enters a tree).
//! 2. Wrapping is idempotent: [`watchable`] on an existing view returns
//!    that same view.
//! 3. A write notifies the matching watchers with `(new, old)` *before* the
//!    commit; watchers always observe pre-write state, and a panicking
//!    watcher leaves the old value intact.
//! 4. No `RefCell` borrow is held across watcher invocation, so a watcher
//!    may itself read and write any view, including the one being written.
//!
//! # Failure Modes
//!
//! - **Cyclic trees**: building a cycle through `set` and then snapshotting
//!   or dropping it recurses without bound. Cycle protection is out of
//!   scope.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::error::WatchError;
use crate::path;
use crate::registry::{self, ObservationPoint, Watcher};
use crate::value::Value;

/// Map or list storage behind a view.
pub(crate) enum Body {
    Map(BTreeMap<String, Value>),
    List(Vec<Value>),
}

/// Shared interior for [`ObservableView`]. The `Rc<ViewInner>` allocation
/// is the view's identity.
pub(crate) struct ViewInner {
    body: RefCell<Body>,
}

/// A watchable view over a map or list.
///
/// Cloning creates a new handle to the **same** underlying data; two
/// handles compare equal iff they share it.
pub struct ObservableView {
    inner: Rc<ViewInner>,
}

// Manual Clone: shares the same Rc.
impl Clone for ObservableView {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl PartialEq for ObservableView {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ObservableView {}

impl fmt::Debug for ObservableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner.body.borrow() {
            Body::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Body::List(list) => f.debug_list().entries(list.iter()).finish(),
        }
    }
}

impl ObservableView {
    pub(crate) fn from_body(body: Body) -> Self {
        Self {
            inner: Rc::new(ViewInner {
                body: RefCell::new(body),
            }),
        }
    }

    /// Weak identity handle, used as the ancestor half of an observation
    /// point.
    pub(crate) fn weak_inner(&self) -> Weak<ViewInner> {
        Rc::downgrade(&self.inner)
    }

    /// Read the value at `route`, resolving dotted routes through
    /// intermediate views.
    ///
    /// A missing leaf reads as [`Value::Null`]; a missing or scalar
    /// *intermediate* segment is [`WatchError::PathNotFound`]. Structured
    /// values come back as view handles (shared, not copied).
    pub fn get(&self, route: &str) -> Result<Value, WatchError> {
        let (ancestor, leaf) = path::resolve(self, route)?;
        Ok(ancestor.read_prop(&leaf))
    }

    /// Write `value` at `route`.
    ///
    /// Resolution and notification happen in the order the observation
    /// contract requires: resolve `(ancestor, leaf)`, look up the watchers
    /// registered at that point, invoke each in registration order with
    /// `(new, old)`, then commit. The old value is re-read per invocation,
    /// so an earlier watcher's re-entrant write is visible to later ones.
    /// Watchers fire on every write, including writes of an equal value.
    ///
    /// Map commits always succeed and insert absent keys. List commits
    /// require a numeric leaf ([`WatchError::InvalidIndex`]); an index equal
    /// to the length appends, past it is [`WatchError::IndexOutOfBounds`].
    pub fn set(&self, route: &str, value: impl Into<Value>) -> Result<(), WatchError> {
        let value = value.into();
        let (ancestor, leaf) = path::resolve(self, route)?;
        let point = ObservationPoint::new(&ancestor, &leaf);
        let watchers = registry::with_registry(|r| r.lookup(&point));
        if !watchers.is_empty() {
            trace!(route, count = watchers.len(), "notifying watchers before commit");
            for watcher in &watchers {
                let old = ancestor.read_prop(&leaf);
                watcher(&value, &old);
            }
        }
        ancestor.commit(&leaf, value)
    }

    /// Read a direct property. Missing keys, out-of-range indices, and
    /// non-numeric list lookups all read as null.
    pub(crate) fn read_prop(&self, name: &str) -> Value {
        match &*self.inner.body.borrow() {
            Body::Map(map) => map.get(name).cloned().unwrap_or(Value::Null),
            Body::List(list) => name
                .parse::<usize>()
                .ok()
                .and_then(|index| list.get(index))
                .cloned()
                .unwrap_or(Value::Null),
        }
    }

    /// Commit a value into a direct property of the underlying body.
    pub(crate) fn commit(&self, leaf: &str, value: Value) -> Result<(), WatchError> {
        match &mut *self.inner.body.borrow_mut() {
            Body::Map(map) => {
                map.insert(leaf.to_string(), value);
                Ok(())
            }
            Body::List(list) => {
                let Ok(index) = leaf.parse::<usize>() else {
                    return Err(WatchError::InvalidIndex {
                        segment: leaf.to_string(),
                    });
                };
                if index < list.len() {
                    list[index] = value;
                    Ok(())
                } else if index == list.len() {
                    list.push(value);
                    Ok(())
                } else {
                    Err(WatchError::IndexOutOfBounds {
                        index,
                        len: list.len(),
                    })
                }
            }
        }
    }

    /// Snapshot the whole tree into plain JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match &*self.inner.body.borrow() {
            Body::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Body::List(list) => {
                serde_json::Value::Array(list.iter().map(Value::to_json).collect())
            }
        }
    }

    /// Number of direct properties (map entries or list elements).
    #[must_use]
    pub fn len(&self) -> usize {
        match &*self.inner.body.borrow() {
            Body::Map(map) => map.len(),
            Body::List(list) => list.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the view wraps a list.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(&*self.inner.body.borrow(), Body::List(_))
    }
}

/// An initial watch binding for [`watchable_with`]: a route relative to the
/// new view, and the watcher to register there.
pub struct Binding {
    pub route: String,
    pub watcher: Watcher,
}

impl Binding {
    pub fn new(route: impl Into<String>, watcher: impl Fn(&Value, &Value) + 'static) -> Self {
        Self {
            route: route.into(),
            watcher: Rc::new(watcher),
        }
    }

    /// Bind an existing watcher handle, keeping its identity so the caller
    /// can `unwatch` it later.
    pub fn from_watcher(route: impl Into<String>, watcher: &Watcher) -> Self {
        Self {
            route: route.into(),
            watcher: Rc::clone(watcher),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

/// Wrap a structured value into an observable view.
///
/// Accepts anything convertible to [`Value`]: a `serde_json::Value` object
/// or array (recursively wrapped), or an existing view (returned unchanged,
/// wrapping is idempotent). Scalars are rejected with
/// [`WatchError::NotAnObject`].
pub fn watchable(value: impl Into<Value>) -> Result<ObservableView, WatchError> {
    match value.into() {
        Value::View(view) => Ok(view),
        other => Err(WatchError::NotAnObject { kind: other.kind() }),
    }
}

/// Wrap a structured value and apply an ordered sequence of initial watch
/// bindings before returning the view.
///
/// Bindings are all-or-nothing: every route is validated and resolved before
/// any watcher is registered, so a failing entry ([`WatchError::InvalidBinding`]
/// for an empty route, [`WatchError::PathNotFound`] for an unresolvable one)
/// leaves nothing half-applied.
pub fn watchable_with(
    value: impl Into<Value>,
    bindings: impl IntoIterator<Item = Binding>,
) -> Result<ObservableView, WatchError> {
    let view = watchable(value)?;
    let mut resolved = Vec::new();
    for binding in bindings {
        if binding.route.is_empty() {
            return Err(WatchError::InvalidBinding {
                route: binding.route,
                reason: "route must not be empty".into(),
            });
        }
        let (ancestor, leaf) = path::resolve(&view, &binding.route)?;
        resolved.push((ancestor, leaf, binding.watcher));
    }
    if !resolved.is_empty() {
        trace!(count = resolved.len(), "applying initial watch bindings");
        registry::with_registry(|r| {
            for (ancestor, leaf, watcher) in resolved {
                r.register(ObservationPoint::new(&ancestor, &leaf), watcher);
            }
        });
    }
    Ok(view)
}
