//! Style descriptor data model.
//!
//! A [`StyleDescriptor`] maps style names to [`StyleValue`]s. Values are either
//! a single [`Scalar`], a per-zone sequence of scalars, or, under keys starting
//! with [`SELECTOR_SENTINEL`], a nested descriptor scoped to a selector suffix.
//!
//! Descriptors keep insertion order: handlers are scheduled and nested blocks
//! are emitted in the order their keys were added.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Leading character of a nested selector key (`"&:hover"`, `"& > li"`).
pub const SELECTOR_SENTINEL: char = '&';

/// Returns true if `name` denotes a nested selector block rather than a property.
pub fn is_selector_key(name: &str) -> bool {
    name.starts_with(SELECTOR_SENTINEL)
}

/// A single style value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Values that never produce a declaration on their own: null, `false`, `""`.
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Null | Scalar::Bool(false) => true,
            Scalar::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            // 1.0 renders as "1", matching how the value was most likely written
            Scalar::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(f64::from(n))
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// The value stored under a descriptor key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// The same value in every zone.
    Scalar(Scalar),
    /// One value per responsive zone, widest zone first.
    Responsive(Vec<Scalar>),
    /// A selector-scoped sub-block; only meaningful under a `&` key.
    Nested(StyleDescriptor),
}

impl StyleValue {
    pub fn is_responsive(&self) -> bool {
        matches!(self, StyleValue::Responsive(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            StyleValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&StyleDescriptor> {
        match self {
            StyleValue::Nested(d) => Some(d),
            _ => None,
        }
    }
}

macro_rules! impl_scalar_style_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for StyleValue {
                fn from(value: $ty) -> Self {
                    StyleValue::Scalar(value.into())
                }
            }
        )*
    };
}

impl_scalar_style_value!(Scalar, &str, String, bool, f64, i32);

impl<T: Into<Scalar>> From<Vec<T>> for StyleValue {
    fn from(values: Vec<T>) -> Self {
        StyleValue::Responsive(values.into_iter().map(Into::into).collect())
    }
}

impl From<StyleDescriptor> for StyleValue {
    fn from(descriptor: StyleDescriptor) -> Self {
        StyleValue::Nested(descriptor)
    }
}

/// An ordered mapping of style names to values.
///
/// # Example
///
/// ```rust
/// use tastycss::StyleDescriptor;
///
/// let styles = StyleDescriptor::new()
///     .set("color", "red")
///     .set("padding", vec!["2x", "1x"])
///     .set("&:hover", StyleDescriptor::new().set("color", "blue"));
///
/// assert_eq!(styles.properties().count(), 2);
/// assert_eq!(styles.selectors().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleDescriptor(IndexMap<String, StyleValue>);

impl StyleDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, replacing any previous value under the same name.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<StyleValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Plain style properties, in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.iter().filter(|(name, _)| !is_selector_key(name))
    }

    /// Nested selector blocks as `(suffix, value)`, sentinel stripped.
    pub fn selectors(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.iter()
            .filter_map(|(name, value)| name.strip_prefix(SELECTOR_SENTINEL).map(|s| (s, value)))
    }

    /// Parses a descriptor from a JSON object.
    pub fn from_json(source: &str) -> Result<Self, RenderError> {
        serde_json::from_str(source).map_err(|e| RenderError::Descriptor(e.to_string()))
    }

    /// Parses a descriptor from a YAML mapping.
    pub fn from_yaml(source: &str) -> Result<Self, RenderError> {
        serde_yaml::from_str(source).map_err(|e| RenderError::Descriptor(e.to_string()))
    }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for StyleDescriptor {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from("1x").to_string(), "1x");
        assert_eq!(Scalar::from(2).to_string(), "2");
        assert_eq!(Scalar::from(0.5).to_string(), "0.5");
        assert_eq!(Scalar::from(true).to_string(), "true");
        assert_eq!(Scalar::Null.to_string(), "");
    }

    #[test]
    fn test_scalar_blank() {
        assert!(Scalar::Null.is_blank());
        assert!(Scalar::from(false).is_blank());
        assert!(Scalar::from("").is_blank());
        assert!(!Scalar::from(0).is_blank());
        assert!(!Scalar::from(true).is_blank());
    }

    #[test]
    fn test_descriptor_preserves_insertion_order() {
        let d = StyleDescriptor::new()
            .set("width", "10px")
            .set("color", "red")
            .set("fill", "#dark");
        let names: Vec<_> = d.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["width", "color", "fill"]);
    }

    #[test]
    fn test_descriptor_splits_selectors() {
        let d = StyleDescriptor::new()
            .set("color", "red")
            .set("&:hover", StyleDescriptor::new().set("color", "blue"))
            .set("& > li", StyleDescriptor::new());

        let props: Vec<_> = d.properties().map(|(k, _)| k).collect();
        let suffixes: Vec<_> = d.selectors().map(|(k, _)| k).collect();
        assert_eq!(props, ["color"]);
        assert_eq!(suffixes, [":hover", " > li"]);
    }

    #[test]
    fn test_descriptor_from_json() {
        let d = StyleDescriptor::from_json(
            r##"{"color": "red", "padding": [2, "1x", null], "&:hover": {"hide": true}}"##,
        )
        .unwrap();

        assert_eq!(d.get("color"), Some(&StyleValue::from("red")));
        assert_eq!(
            d.get("padding"),
            Some(&StyleValue::Responsive(vec![
                Scalar::Number(2.0),
                Scalar::from("1x"),
                Scalar::Null
            ]))
        );
        let hover = d.get("&:hover").and_then(StyleValue::as_nested).unwrap();
        assert_eq!(hover.get("hide"), Some(&StyleValue::from(true)));
    }

    #[test]
    fn test_descriptor_from_yaml() {
        let d = StyleDescriptor::from_yaml(
            "display: flex\nflow: [row, column]\n'&:focus':\n  fill: '#purple'\n",
        )
        .unwrap();
        assert_eq!(d.len(), 3);
        assert!(d.get("flow").unwrap().is_responsive());
        assert_eq!(d.selectors().count(), 1);
    }

    #[test]
    fn test_descriptor_from_json_rejects_non_object() {
        let err = StyleDescriptor::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, RenderError::Descriptor(_)));
    }
}
