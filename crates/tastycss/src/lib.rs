//! # tastycss - style descriptors to CSS
//!
//! `tastycss` compiles a declarative style description into CSS text. A
//! [`StyleDescriptor`] maps style names to values; values may vary per
//! responsive zone, and keys starting with `&` hold nested selector blocks.
//!
//! ## Quick Start
//!
//! ```rust
//! use tastycss::{render_styles, StyleDescriptor};
//!
//! let styles = StyleDescriptor::new()
//!     .set("display", "flex")
//!     .set("flow", vec!["row", "column"])
//!     .set("fill", "#surface")
//!     .set("&:hover", StyleDescriptor::new().set("fill", "#hover"));
//!
//! let css = render_styles(&styles, &[640, 0], None).unwrap();
//! assert!(css.starts_with("outline: none;\nbackground-color: var(--surface-color);\n"));
//! assert!(css.contains("@media (max-width: 639px) {\ndisplay: flex;\nflex-flow: column;\n}\n"));
//! assert!(css.ends_with("&:hover{background-color: var(--hover-color);}\n"));
//! ```
//!
//! ## Concepts
//!
//! - **Handlers** ([`StyleHandler`]): compute CSS from the properties in their
//!   lookup set. Several properties can share one handler, which then runs
//!   once per render with all of them. Unregistered properties get a default
//!   handler emitting `kebab-name: value;`.
//! - **Zones**: breakpoints are descending pixel thresholds. Sequence values
//!   are spread over the zones and each zone's CSS is wrapped in a media query
//!   (see [`responsive`]).
//! - **Nesting**: `"&:hover": {...}` renders the inner block with the suffix
//!   `:hover`, after the outer block's own CSS.
//! - **Memoization**: rendered bodies are cached per descriptor, breakpoints
//!   and suffix. The cache is flushed whole once it fills up.
//!
//! [`render_styles`] uses a process-wide [`StyleEngine`]; construct your own
//! engine for an isolated registry and cache.

pub mod cache;
pub mod config;
mod engine;
mod error;
pub mod handler;
pub mod key;
pub mod responsive;
mod value;

use once_cell::sync::Lazy;

pub use cache::{RenderCache, DEFAULT_CACHE_CAPACITY};
pub use config::{EngineConfig, DEFAULT_PREFIX};
pub use engine::StyleEngine;
pub use error::RenderError;
pub use handler::{FnHandler, HandlerId, HandlerRegistry, StyleHandler, StyleMap};
pub use value::{is_selector_key, Scalar, StyleDescriptor, StyleValue, SELECTOR_SENTINEL};

static DEFAULT_ENGINE: Lazy<StyleEngine> = Lazy::new(StyleEngine::new);

/// The process-wide engine used by [`render_styles`].
pub fn default_engine() -> &'static StyleEngine {
    &DEFAULT_ENGINE
}

/// Renders `styles` with the process-wide engine.
///
/// # Errors
///
/// Returns [`RenderError::Serialization`] if the descriptor holds a value that
/// cannot be canonicalized (NaN or infinite numbers).
pub fn render_styles(
    styles: &StyleDescriptor,
    breakpoints: &[u32],
    suffix: Option<&str>,
) -> Result<String, RenderError> {
    DEFAULT_ENGINE.render(styles, breakpoints, suffix)
}
