//! Built-in handlers.
//!
//! [`create_style`] is the fallback for any property without a registration:
//! it emits a single declaration named after the property. The grouped
//! handlers here read several related properties at once.

use std::sync::Arc;

use super::{with_suffix, HandlerRegistry, StyleHandler, StyleMap};
use crate::value::Scalar;

/// Converts a style name into a CSS property name.
///
/// `camelCase` becomes `kebab-case` and a leading `@` marks a custom property.
///
/// ```rust
/// use tastycss::handler::builtin::css_property_name;
///
/// assert_eq!(css_property_name("borderTopWidth"), "border-top-width");
/// assert_eq!(css_property_name("@accentColor"), "--accent-color");
/// ```
pub fn css_property_name(style_name: &str) -> String {
    let (prefix, name) = match style_name.strip_prefix('@') {
        Some(rest) => ("--", rest),
        None => ("", style_name),
    };

    let mut out = String::with_capacity(prefix.len() + name.len() + 4);
    out.push_str(prefix);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Handler emitting one declaration for one property.
#[derive(Debug, Clone)]
pub struct PropertyHandler {
    lookup: [String; 1],
    css_name: String,
}

impl PropertyHandler {
    pub fn new(style_name: &str) -> Self {
        Self {
            lookup: [style_name.to_string()],
            css_name: css_property_name(style_name),
        }
    }
}

impl StyleHandler for PropertyHandler {
    fn lookup_styles(&self) -> &[String] {
        &self.lookup
    }

    fn render(&self, styles: &StyleMap, suffix: Option<&str>) -> Option<String> {
        let value = styles.get(&self.lookup[0])?;
        if value.is_blank() {
            return None;
        }
        let value = match value {
            Scalar::Bool(true) => "initial".to_string(),
            other => other.to_string(),
        };
        Some(with_suffix(
            format!("{}: {};\n", self.css_name, value),
            suffix,
        ))
    }
}

/// Default handler factory: a [`PropertyHandler`] for `style_name`.
pub fn create_style(style_name: &str) -> Arc<dyn StyleHandler> {
    Arc::new(PropertyHandler::new(style_name))
}

/// Reads `display`, `hide` and `flow`.
///
/// `hide: true` wins over any display value. `flow` maps to `flex-flow` or
/// `grid-auto-flow` depending on the display; for other displays it is ignored.
#[derive(Debug, Clone)]
pub struct DisplayHandler {
    lookup: [String; 3],
}

impl DisplayHandler {
    pub fn new() -> Self {
        Self {
            lookup: ["display".into(), "hide".into(), "flow".into()],
        }
    }
}

impl Default for DisplayHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleHandler for DisplayHandler {
    fn lookup_styles(&self) -> &[String] {
        &self.lookup
    }

    fn render(&self, styles: &StyleMap, suffix: Option<&str>) -> Option<String> {
        if styles.get("hide").and_then(Scalar::as_bool) == Some(true) {
            return Some(with_suffix("display: none;\n".to_string(), suffix));
        }

        let display = styles.get("display").filter(|v| !v.is_blank());
        let flow = styles.get("flow").filter(|v| !v.is_blank());

        let mut css = String::new();
        if let Some(display) = display {
            css.push_str(&format!("display: {};\n", display));
        }
        if let (Some(display), Some(flow)) = (display.and_then(Scalar::as_str), flow) {
            if display.ends_with("flex") {
                css.push_str(&format!("flex-flow: {};\n", flow));
            } else if display.ends_with("grid") {
                css.push_str(&format!("grid-auto-flow: {};\n", flow));
            }
        }

        if css.is_empty() {
            None
        } else {
            Some(with_suffix(css, suffix))
        }
    }
}

/// Reads `fill` and emits `background-color`.
///
/// Color tokens written as `#name` resolve to the `--name-color` custom property.
#[derive(Debug, Clone)]
pub struct FillHandler {
    lookup: [String; 1],
}

impl FillHandler {
    pub fn new() -> Self {
        Self {
            lookup: ["fill".into()],
        }
    }
}

impl Default for FillHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleHandler for FillHandler {
    fn lookup_styles(&self) -> &[String] {
        &self.lookup
    }

    fn render(&self, styles: &StyleMap, suffix: Option<&str>) -> Option<String> {
        let fill = styles.get("fill").filter(|v| !v.is_blank())?;
        let color = match fill.as_str() {
            Some(token) if is_color_token(token) => format!("var(--{}-color)", &token[1..]),
            _ => fill.to_string(),
        };
        Some(with_suffix(
            format!("background-color: {};\n", color),
            suffix,
        ))
    }
}

// `#purple` is a token, `#fff` and `#a0b1c2` are hex literals.
fn is_color_token(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(name) if !name.is_empty() => {
            let is_hex = matches!(name.len(), 3 | 4 | 6 | 8)
                && name.chars().all(|c| c.is_ascii_hexdigit());
            !is_hex
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    }
}

/// Registers the grouped built-in handlers.
pub fn register_builtins(registry: &mut HandlerRegistry) {
    registry.register_handler(Arc::new(DisplayHandler::new()));
    registry.register_handler(Arc::new(FillHandler::new()));
}
