#![forbid(unsafe_code)]

//! Public watch API: register and remove watchers on dot-addressed routes.
//!
//! Registrations live in a process-wide (thread-local) registry that grows
//! until the caller removes them with [`unwatch`] or [`reset_watchers`];
//! there is no automatic teardown. A watcher stays live as long as the
//! program wants it, not as long as some guard object happens to be held.

use std::rc::Rc;

use tracing::trace;

use crate::error::WatchError;
use crate::path;
use crate::registry::{self, ObservationPoint, Watcher};
use crate::value::Value;
use crate::view::ObservableView;

/// Build a [`Watcher`] handle from a closure.
///
/// The handle's identity is what [`unwatch`] matches on, so keep a clone of
/// it if the watcher should ever be removed again.
pub fn watcher(f: impl Fn(&Value, &Value) + 'static) -> Watcher {
    Rc::new(f)
}

/// Register `watcher` on `route` relative to `target`.
///
/// `target` may be any view in a tree, not only the root; the route is
/// resolved against it and the watcher keys to the resolved ancestor view's
/// identity plus the leaf name. Repeated calls with the same watcher
/// register it repeatedly; deduplication is the caller's business.
pub fn watch(target: &ObservableView, route: &str, watcher: &Watcher) -> Result<(), WatchError> {
    let (ancestor, leaf) = path::resolve(target, route)?;
    trace!(route, leaf = leaf.as_str(), "registering watcher");
    registry::with_registry(|r| {
        r.register(ObservationPoint::new(&ancestor, &leaf), Rc::clone(watcher));
    });
    Ok(())
}

/// Remove one occurrence of `watcher` from `route` relative to `target`.
///
/// Matching is by `Rc` identity of the watcher handle. A no-op when nothing
/// matches.
pub fn unwatch(target: &ObservableView, route: &str, watcher: &Watcher) -> Result<(), WatchError> {
    let (ancestor, leaf) = path::resolve(target, route)?;
    trace!(route, leaf = leaf.as_str(), "removing watcher");
    registry::with_registry(|r| {
        r.unregister(&ObservationPoint::new(&ancestor, &leaf), watcher);
    });
    Ok(())
}

/// Drop every watcher registration in the process-wide registry.
pub fn reset_watchers() {
    trace!("clearing watcher registry");
    registry::with_registry(registry::ListenerRegistry::clear);
}

/// Number of registered watchers across all observation points. Dropped
/// views' registrations still count until the registry sweeps them.
#[must_use]
pub fn watcher_count() -> usize {
    registry::with_registry(|r| r.watcher_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::watchable;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn watch_twice_fires_twice_unwatch_removes_one() {
        let view = watchable(json!({"p": 1})).expect("wraps");
        let count = Rc::new(Cell::new(0u32));
        let count_in = Rc::clone(&count);
        let w = watcher(move |_, _| count_in.set(count_in.get() + 1));

        watch(&view, "p", &w).expect("watch");
        watch(&view, "p", &w).expect("watch again");

        view.set("p", 2).expect("set");
        assert_eq!(count.get(), 2);

        unwatch(&view, "p", &w).expect("unwatch");
        view.set("p", 3).expect("set");
        assert_eq!(count.get(), 3); // One registration left.

        unwatch(&view, "p", &w).expect("unwatch last");
        view.set("p", 4).expect("set");
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn unwatch_without_watch_is_noop() {
        let view = watchable(json!({"p": 1})).expect("wraps");
        let w = watcher(|_, _| {});
        unwatch(&view, "p", &w).expect("unwatch");
    }

    #[test]
    fn unwatch_unresolvable_route_errors() {
        let view = watchable(json!({"p": 1})).expect("wraps");
        let w = watcher(|_, _| {});
        assert!(matches!(
            unwatch(&view, "missing.leaf", &w),
            Err(WatchError::PathNotFound { .. })
        ));
    }

    #[test]
    fn watch_relative_to_inner_view() {
        let root = watchable(json!({"outer": {"inner": {"p": 1}}})).expect("wraps");
        let outer = root.get("outer").expect("get outer");
        let outer = outer.as_view().expect("outer is a view");

        let count = Rc::new(Cell::new(0u32));
        let count_in = Rc::clone(&count);
        let w = watcher(move |_, _| count_in.set(count_in.get() + 1));
        watch(outer, "inner.p", &w).expect("watch from inner target");

        // Writes through the root resolve to the same observation point.
        root.set("outer.inner.p", 2).expect("set");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn watchers_key_to_resolved_identity_across_aliases() {
        // One view reachable through two parents: both routes resolve to the
        // same ancestor identity, so a watcher registered through either
        // alias fires for writes through both.
        let shared = watchable(json!({"p": 1})).expect("wraps");
        let parent_a = watchable(json!({})).expect("wraps");
        let parent_b = watchable(json!({})).expect("wraps");
        parent_a.set("child", shared.clone()).expect("set");
        parent_b.set("child", shared.clone()).expect("set");

        let count = Rc::new(Cell::new(0u32));
        let count_in = Rc::clone(&count);
        let w = watcher(move |_, _| count_in.set(count_in.get() + 1));
        watch(&parent_a, "child.p", &w).expect("watch via a");

        parent_b.set("child.p", 2).expect("set via b");
        shared.set("p", 3).expect("set directly");
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn reset_watchers_clears_everything() {
        let view = watchable(json!({"p": 1})).expect("wraps");
        let count = Rc::new(Cell::new(0u32));
        let count_in = Rc::clone(&count);
        let w = watcher(move |_, _| count_in.set(count_in.get() + 1));
        watch(&view, "p", &w).expect("watch");
        assert_eq!(watcher_count(), 1);

        reset_watchers();
        assert_eq!(watcher_count(), 0);
        view.set("p", 2).expect("set");
        assert_eq!(count.get(), 0);
    }
}
