#![forbid(unsafe_code)]

//! Listener registry: observation points mapped to ordered watcher lists.
//!
//! # Design
//!
//! An observation point is the pair (ancestor view, leaf property name).
//! Points are constructed fresh on every call, so the registry matches them
//! by *equivalence*: pointer identity on the ancestor, string equality on
//! the name. Lookup is a linear scan over an insertion-ordered entry list.
//!
//! # Invariants
//!
//! 1. Watchers fire in registration order.
//! 2. The same watcher may be registered more than once and fires once per
//!    registration; `unregister` removes exactly one occurrence, matched by
//!    `Rc` identity.
//! 3. Entries are removed only by explicit `unregister` (an emptied entry
//!    stays in place). Entries whose ancestor view has been dropped are
//!    swept on the next `register` call; that sweep is memory hygiene, not
//!    a correctness requirement.
//! 4. `lookup` returns a snapshot, so re-entrant register/unregister during
//!    watcher invocation cannot corrupt iteration.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::value::Value;
use crate::view::{ObservableView, ViewInner};

/// A watcher callback, invoked with `(new value, old value)` on every write
/// to its observation point. Held by `Rc` so callers can remove it again by
/// identity with `unwatch`.
pub type Watcher = Rc<dyn Fn(&Value, &Value)>;

/// The unit of subscription: an ancestor view plus a leaf property name.
///
/// Holds the ancestor weakly: the registry is a non-owning association and
/// must not keep views alive.
pub(crate) struct ObservationPoint {
    ancestor: Weak<ViewInner>,
    name: String,
}

impl ObservationPoint {
    pub(crate) fn new(ancestor: &ObservableView, name: &str) -> Self {
        Self {
            ancestor: ancestor.weak_inner(),
            name: name.to_string(),
        }
    }

    fn matches(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.ancestor, &other.ancestor) && self.name == other.name
    }

    fn is_dead(&self) -> bool {
        self.ancestor.strong_count() == 0
    }
}

/// Ordered table of observation points and their watcher sequences.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: Vec<(ObservationPoint, Vec<Watcher>)>,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `watcher` at `point`, creating the entry on first use.
    /// No duplicate suppression.
    pub(crate) fn register(&mut self, point: ObservationPoint, watcher: Watcher) {
        self.entries.retain(|(p, _)| !p.is_dead());
        if let Some((_, watchers)) = self.entries.iter_mut().find(|(p, _)| p.matches(&point)) {
            watchers.push(watcher);
        } else {
            self.entries.push((point, vec![watcher]));
        }
    }

    /// Remove the first `Rc`-identical occurrence of `watcher` at `point`.
    /// No-op when the point or the watcher is absent.
    pub(crate) fn unregister(&mut self, point: &ObservationPoint, watcher: &Watcher) {
        if let Some((_, watchers)) = self.entries.iter_mut().find(|(p, _)| p.matches(point)) {
            if let Some(i) = watchers.iter().position(|w| Rc::ptr_eq(w, watcher)) {
                watchers.remove(i);
            }
        }
    }

    /// Snapshot of the watcher sequence at the equivalent point, in
    /// registration order. Empty when nothing is registered there.
    pub(crate) fn lookup(&self, point: &ObservationPoint) -> Vec<Watcher> {
        self.entries
            .iter()
            .find(|(p, _)| p.matches(point))
            .map(|(_, watchers)| watchers.clone())
            .unwrap_or_default()
    }

    /// Drop every registration.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Total number of registered watchers across all points.
    pub(crate) fn watcher_count(&self) -> usize {
        self.entries.iter().map(|(_, watchers)| watchers.len()).sum()
    }
}

thread_local! {
    /// The process-wide registry consulted by `watch`/`unwatch` and by write
    /// interception. Single-threaded by construction (views are `!Send`).
    static REGISTRY: RefCell<ListenerRegistry> = RefCell::new(ListenerRegistry::new());
}

/// Run `f` against the process-wide registry.
///
/// Callers must not invoke watchers while inside `f`; write interception
/// snapshots the watcher list here and invokes it after the borrow ends.
pub(crate) fn with_registry<R>(f: impl FnOnce(&mut ListenerRegistry) -> R) -> R {
    REGISTRY.with(|registry| f(&mut registry.borrow_mut()))
}
