//! Style handlers.
//!
//! A [`StyleHandler`] turns a subset of a descriptor's values into CSS text.
//! Each handler declares the property names it reads (its lookup set); the
//! engine builds a [`StyleMap`] view containing just those values and calls
//! the handler at most once per render pass, or once per zone when any of its
//! inputs vary by breakpoint.
//!
//! - [`HandlerRegistry`]: maps property names to handlers
//! - [`FnHandler`]: adapts a closure into a handler
//! - [`builtin`]: the default per-property handler and grouped built-ins

pub mod builtin;
mod registry;

use std::fmt;

use indexmap::IndexMap;

use crate::value::Scalar;

pub use registry::{DefaultHandlerFactory, HandlerRegistry};

/// The values a handler receives, keyed by property name.
///
/// Properties from the lookup set that the descriptor does not define are
/// absent from the map.
pub type StyleMap = IndexMap<String, Scalar>;

/// Computes CSS for a fixed set of style properties.
pub trait StyleHandler: Send + Sync {
    /// Property names this handler reads.
    fn lookup_styles(&self) -> &[String];

    /// Renders CSS for `styles`. `suffix` is the selector suffix of the block
    /// being rendered (`":hover"` for an `"&:hover"` block), if any.
    ///
    /// `None` and empty strings both mean "no output".
    fn render(&self, styles: &StyleMap, suffix: Option<&str>) -> Option<String>;
}

/// Stable identity of a handler inside a [`HandlerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub(crate) usize);

impl HandlerId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A handler backed by a closure.
///
/// # Example
///
/// ```rust
/// use tastycss::{FnHandler, Scalar, StyleHandler, StyleMap};
///
/// let radius = FnHandler::new(["radius"], |styles: &StyleMap, _suffix: Option<&str>| {
///     styles
///         .get("radius")
///         .map(|value| format!("border-radius: {};\n", value))
/// });
///
/// let mut view = StyleMap::new();
/// view.insert("radius".into(), Scalar::from("4px"));
/// assert_eq!(radius.render(&view, None).as_deref(), Some("border-radius: 4px;\n"));
/// ```
pub struct FnHandler<F> {
    lookup: Vec<String>,
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&StyleMap, Option<&str>) -> Option<String> + Send + Sync,
{
    pub fn new<I, S>(lookup: I, func: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lookup: lookup.into_iter().map(Into::into).collect(),
            func,
        }
    }
}

impl<F> StyleHandler for FnHandler<F>
where
    F: Fn(&StyleMap, Option<&str>) -> Option<String> + Send + Sync,
{
    fn lookup_styles(&self) -> &[String] {
        &self.lookup
    }

    fn render(&self, styles: &StyleMap, suffix: Option<&str>) -> Option<String> {
        (self.func)(styles, suffix)
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("lookup", &self.lookup)
            .finish_non_exhaustive()
    }
}

/// Wraps a declaration in a nested selector block when rendering under a suffix.
pub fn with_suffix(css: String, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("&{}{{{}}}\n", suffix, css.trim_end()),
        None => css,
    }
}
