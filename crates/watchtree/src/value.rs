#![forbid(unsafe_code)]

//! Dynamic value model for watchable trees.
//!
//! A [`Value`] is one slot in a tree: a scalar, or a handle to a nested
//! [`ObservableView`]. Structured data never appears bare inside a tree:
//! maps and lists are always carried as [`Value::View`], so every structured
//! value reachable from a view is itself observable. [`Value::from_json`]
//! establishes that invariant whenever plain data enters a tree.

use std::fmt;

use crate::view::{Body, ObservableView};

/// A single value slot in a watchable tree.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A nested map or list, wrapped as an observable view.
    View(ObservableView),
}

impl Value {
    /// Convert plain JSON into a tree value, recursively wrapping every
    /// object and array into a fresh observable view.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::Null
                }
            }
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => Self::View(ObservableView::from_body(Body::List(
                items.into_iter().map(Self::from_json).collect(),
            ))),
            serde_json::Value::Object(map) => Self::View(ObservableView::from_body(Body::Map(
                map.into_iter().map(|(k, v)| (k, Self::from_json(v))).collect(),
            ))),
        }
    }

    /// Snapshot back into plain JSON. Watcher registrations are not part of
    /// the snapshot.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::View(view) => view.to_json(),
        }
    }

    /// Whether this value is a wrapped map or list.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::View(_))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_view(&self) -> Option<&ObservableView> {
        match self {
            Self::View(view) => Some(view),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Kind name for diagnostics and error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::View(_) => "view",
        }
    }
}

/// Scalars compare structurally; views compare by identity (two `View`
/// values are equal iff they are handles to the same view).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::View(a), Self::View(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::View(view) => view.fmt(f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<ObservableView> for Value {
    fn from(view: ObservableView) -> Self {
        Self::View(view)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_map_directly() {
        assert_eq!(Value::from_json(json!(null)), Value::Null);
        assert_eq!(Value::from_json(json!(true)), Value::Bool(true));
        assert_eq!(Value::from_json(json!(42)), Value::Int(42));
        assert_eq!(Value::from_json(json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from_json(json!("hi")), Value::Str("hi".into()));
    }

    #[test]
    fn structured_values_become_views() {
        let v = Value::from_json(json!({"a": 1}));
        assert!(v.is_structured());
        let v = Value::from_json(json!([1, 2, 3]));
        assert!(v.is_structured());
    }

    #[test]
    fn wrap_is_recursive() {
        let v = Value::from_json(json!({"outer": {"inner": [true]}}));
        let outer = v.as_view().expect("root view");
        let inner = outer.get("outer").expect("get outer");
        assert!(inner.is_structured());
        let list = inner.as_view().expect("inner view").get("inner").expect("get inner");
        assert!(list.is_structured());
    }

    #[test]
    fn json_round_trip() {
        let source = json!({"a": "a", "b": {"c": "c"}, "d": [1, 2, 3]});
        let v = Value::from_json(source.clone());
        assert_eq!(v.to_json(), source);
    }

    #[test]
    fn large_u64_degrades_to_float() {
        let v = Value::from_json(json!(u64::MAX));
        assert!(matches!(v, Value::Float(_)));
    }

    #[test]
    fn view_equality_is_identity() {
        let a = Value::from_json(json!({"x": 1}));
        let b = Value::from_json(json!({"x": 1}));
        assert_ne!(a, b); // Same shape, different views.
        assert_eq!(a, a.clone());
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from(3).kind(), "int");
        assert_eq!(Value::from("s").kind(), "string");
        assert_eq!(Value::from_json(json!([])).kind(), "view");
    }

    #[test]
    fn scalar_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(7).as_int(), Some(7));
        assert_eq!(Value::from(0.5).as_float(), Some(0.5));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        // Accessors do not coerce across kinds.
        assert_eq!(Value::from(7).as_bool(), None);
        assert_eq!(Value::from(7).as_float(), None);
    }
}
