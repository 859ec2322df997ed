#![forbid(unsafe_code)]

//! Dotted-path resolution.
//!
//! A route like `"b.c"` or `"d.0"` is resolved against a root view by
//! walking every segment except the last through view reads, yielding the
//! nearest ancestor view and the unresolved leaf segment. Numeric segments
//! address list indices; maps and lists are uniform property containers.

use crate::error::WatchError;
use crate::value::Value;
use crate::view::ObservableView;

/// Resolve `route` against `root` into `(ancestor view, leaf segment)`.
///
/// A single-segment route is the identity case: the ancestor is `root`
/// itself. For multi-segment routes every intermediate segment must read as
/// a view; a missing key, an out-of-range index, or a scalar in an
/// intermediate position is [`WatchError::PathNotFound`]. The leaf segment
/// is returned unresolved; it may name a property that does not exist yet.
pub(crate) fn resolve(
    root: &ObservableView,
    route: &str,
) -> Result<(ObservableView, String), WatchError> {
    if !route.contains('.') {
        if route.is_empty() {
            return Err(WatchError::PathNotFound {
                route: String::new(),
                segment: String::new(),
            });
        }
        return Ok((root.clone(), route.to_string()));
    }

    let segments: Vec<&str> = route.split('.').collect();
    let Some((leaf, walk)) = segments.split_last() else {
        return Err(WatchError::PathNotFound {
            route: route.to_string(),
            segment: String::new(),
        });
    };

    let mut current = root.clone();
    for segment in walk {
        match current.read_prop(segment) {
            Value::View(next) => current = next,
            _ => {
                return Err(WatchError::PathNotFound {
                    route: route.to_string(),
                    segment: (*segment).to_string(),
                });
            }
        }
    }
    Ok((current, (*leaf).to_string()))
}
