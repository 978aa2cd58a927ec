//! Style descriptor rendering.
//!
//! A render pass runs in three steps:
//!
//! 1. **Scheduling**: every plain property resolves to its handlers. A handler
//!    shared by several properties is queued once, with a view built from its
//!    whole lookup set.
//! 2. **Emission**: handlers whose inputs are all scalars run once and append
//!    to the flat output. Handlers with a per-zone input run once per zone and
//!    append to that zone's bucket; the buckets are then wrapped in media
//!    queries.
//! 3. **Nesting**: every `&` block renders recursively with its selector
//!    suffix and is appended last.
//!
//! Bodies are memoized per (descriptor, breakpoints, suffix); the configured
//! prefix is added on every call, hits included.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::cache::RenderCache;
use crate::config::EngineConfig;
use crate::error::RenderError;
use crate::handler::{DefaultHandlerFactory, HandlerId, HandlerRegistry, StyleHandler, StyleMap};
use crate::key::cache_key;
use crate::responsive::{media_wrapper, normalize_style_zones, MediaWrapper, ZoneNormalizer};
use crate::value::{StyleDescriptor, StyleValue};

/// A handler scheduled for one render pass, with the raw values it reads.
struct QueueItem<'a> {
    handler: Arc<dyn StyleHandler>,
    styles: IndexMap<String, &'a StyleValue>,
    is_responsive: bool,
}

/// Renders style descriptors to CSS, owning its handler registry and cache.
///
/// The engine is `Send + Sync`; both stores sit behind mutexes that are never
/// held while a handler runs.
///
/// # Example
///
/// ```rust
/// use tastycss::{StyleDescriptor, StyleEngine};
///
/// let engine = StyleEngine::new();
/// let styles = StyleDescriptor::new()
///     .set("color", "red")
///     .set("&:hover", StyleDescriptor::new().set("color", "blue"));
///
/// let css = engine.render(&styles, &[], None).unwrap();
/// assert_eq!(
///     css,
///     "outline: none;\ncolor: red;\noutline: none;\n&:hover{color: blue;}\n"
/// );
/// ```
pub struct StyleEngine {
    registry: Mutex<HandlerRegistry>,
    cache: Mutex<RenderCache>,
    prefix: String,
    normalizer: ZoneNormalizer,
    media_wrapper: MediaWrapper,
}

impl StyleEngine {
    /// Creates an engine with the built-in handlers and default settings.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: Mutex::new(HandlerRegistry::new()),
            cache: Mutex::new(RenderCache::new(config.cache_capacity)),
            prefix: config.prefix,
            normalizer: normalize_style_zones,
            media_wrapper,
        }
    }

    /// Replaces the handler registry, default factory included.
    ///
    /// Call [`with_default_handler`](Self::with_default_handler) after this
    /// to override the new registry's factory.
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        *self.registry.get_mut().unwrap_or_else(PoisonError::into_inner) = registry;
        self
    }

    /// Sets the factory used for properties without a registered handler.
    pub fn with_default_handler(mut self, factory: DefaultHandlerFactory) -> Self {
        self.registry
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .set_default_factory(factory);
        self
    }

    pub fn with_zone_normalizer(mut self, normalizer: ZoneNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_media_wrapper(mut self, wrapper: MediaWrapper) -> Self {
        self.media_wrapper = wrapper;
        self
    }

    /// Registers `handler` for each of `names`. See [`HandlerRegistry::register`].
    ///
    /// Clears the render cache, since cached bodies were rendered with the
    /// previous handler set.
    pub fn register<I, S>(&self, names: I, handler: Arc<dyn StyleHandler>) -> HandlerId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.registry().register(names, handler);
        self.clear_cache();
        id
    }

    /// Registers `handler` under each name of its lookup set.
    ///
    /// Clears the render cache like [`register`](Self::register).
    pub fn register_handler(&self, handler: Arc<dyn StyleHandler>) -> HandlerId {
        let id = self.registry().register_handler(handler);
        self.clear_cache();
        id
    }

    /// Number of bodies currently memoized.
    pub fn cached_entries(&self) -> usize {
        self.cache().len()
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Renders `descriptor` for the given breakpoints.
    ///
    /// `breakpoints` are pixel thresholds in strictly descending order, one per
    /// zone (see [`responsive`](crate::responsive)). `suffix` is the selector
    /// suffix of the block being rendered; nested `&` blocks pass their own
    /// suffix down.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Serialization`] if the descriptor cannot be
    /// turned into a cache key.
    pub fn render(
        &self,
        descriptor: &StyleDescriptor,
        breakpoints: &[u32],
        suffix: Option<&str>,
    ) -> Result<String, RenderError> {
        let key = cache_key(descriptor, breakpoints, suffix)?;

        let cached = self.cache().get(&key).map(str::to_string);
        let body = match cached {
            Some(body) => body,
            None => {
                let body = self.render_body(descriptor, breakpoints, suffix)?;
                self.cache().insert(key, body.clone());
                body
            }
        };

        Ok(format!("{}{}", self.prefix, body))
    }

    fn render_body(
        &self,
        descriptor: &StyleDescriptor,
        breakpoints: &[u32],
        suffix: Option<&str>,
    ) -> Result<String, RenderError> {
        let mut nested = String::new();
        for (selector, value) in descriptor.selectors() {
            if let Some(inner) = value.as_nested() {
                nested.push_str(&self.render(inner, breakpoints, Some(selector))?);
            }
        }

        let queue = self.schedule(descriptor);

        let mut flat = String::new();
        let mut zones = vec![String::new(); breakpoints.len()];

        for item in &queue {
            if item.is_responsive {
                self.emit_responsive(item, suffix, &mut zones);
            } else {
                let view: StyleMap = item
                    .styles
                    .iter()
                    .filter_map(|(name, value)| {
                        value.as_scalar().map(|scalar| (name.clone(), scalar.clone()))
                    })
                    .collect();
                flat.push_str(&item.handler.render(&view, suffix).unwrap_or_default());
            }
        }

        let mut body = flat;
        if !breakpoints.is_empty() {
            body.push_str(&(self.media_wrapper)(&zones, breakpoints));
        }
        body.push_str(&nested);
        Ok(body)
    }

    fn schedule<'a>(&self, descriptor: &'a StyleDescriptor) -> Vec<QueueItem<'a>> {
        let mut registry = self.registry();
        let mut scheduled = HashSet::new();
        let mut queue = Vec::new();

        for (name, _) in descriptor.properties() {
            for (id, handler) in registry.resolve(name) {
                if !scheduled.insert(id) {
                    continue;
                }

                let mut is_responsive = false;
                let mut styles = IndexMap::new();
                for lookup in handler.lookup_styles() {
                    if let Some(value) = descriptor.get(lookup) {
                        is_responsive |= value.is_responsive();
                        styles.insert(lookup.clone(), value);
                    }
                }

                queue.push(QueueItem {
                    handler,
                    styles,
                    is_responsive,
                });
            }
        }
        queue
    }

    fn emit_responsive(&self, item: &QueueItem<'_>, suffix: Option<&str>, zones: &mut [String]) {
        let normalized: Vec<(&str, Vec<_>)> = item
            .handler
            .lookup_styles()
            .iter()
            .filter_map(|name| {
                (self.normalizer)(item.styles.get(name).copied(), zones.len())
                    .map(|values| (name.as_str(), values))
            })
            .collect();

        for (i, zone) in zones.iter_mut().enumerate() {
            let view: StyleMap = normalized
                .iter()
                .filter_map(|(name, values)| values.get(i).map(|v| (name.to_string(), v.clone())))
                .collect();
            zone.push_str(&item.handler.render(&view, suffix).unwrap_or_default());
        }
    }

    fn registry(&self) -> MutexGuard<'_, HandlerRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache(&self) -> MutexGuard<'_, RenderCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;
    use crate::value::Scalar;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn engine() -> StyleEngine {
        StyleEngine::with_config(EngineConfig::new().prefix(""))
    }

    #[test]
    fn test_render_flat_declarations_in_order() {
        let styles = StyleDescriptor::new()
            .set("color", "red")
            .set("fontSize", "14px");
        let css = engine().render(&styles, &[], None).unwrap();
        assert_eq!(css, "color: red;\nfont-size: 14px;\n");
    }

    #[test]
    fn test_render_empty_descriptor() {
        let engine = StyleEngine::new();
        let css = engine.render(&StyleDescriptor::new(), &[1200, 640], None).unwrap();
        assert_eq!(css, "outline: none;\n");
    }

    #[test]
    fn test_render_scalar_values_with_breakpoints_stay_flat() {
        let styles = StyleDescriptor::new().set("color", "red");
        let css = engine().render(&styles, &[1200, 640, 0], None).unwrap();
        assert_eq!(css, "color: red;\n");
    }

    #[test]
    fn test_render_responsive_value() {
        let styles = StyleDescriptor::new().set("gap", vec!["2x", "1x"]);
        let css = engine().render(&styles, &[640, 0], None).unwrap();
        assert_eq!(
            css,
            "@media (min-width: 640px) {\ngap: 2x;\n}\n@media (max-width: 639px) {\ngap: 1x;\n}\n"
        );
    }

    #[test]
    fn test_render_flat_before_responsive_before_nested() {
        let styles = StyleDescriptor::new()
            .set("&:hover", StyleDescriptor::new().set("color", "blue"))
            .set("gap", vec!["2x", "1x"])
            .set("color", "red");
        let css = engine().render(&styles, &[640, 0], None).unwrap();
        assert_eq!(
            css,
            "color: red;\n\
             @media (min-width: 640px) {\ngap: 2x;\n}\n\
             @media (max-width: 639px) {\ngap: 1x;\n}\n\
             &:hover{color: blue;}\n"
        );
    }

    #[test]
    fn test_responsive_view_is_broadcast_across_lookup_set() {
        let registry = HandlerRegistry::empty(crate::handler::builtin::create_style);
        let engine = engine().with_registry(registry);
        engine.register_handler(Arc::new(FnHandler::new(
            ["display", "flow"],
            |styles: &StyleMap, _| {
                Some(format!(
                    "{}/{}\n",
                    styles.get("display").map(Scalar::to_string).unwrap_or_default(),
                    styles.get("flow").map(Scalar::to_string).unwrap_or_default()
                ))
            },
        )));

        let styles = StyleDescriptor::new()
            .set("display", "flex")
            .set("flow", vec!["row", "column"]);
        let css = engine.render(&styles, &[640, 0], None).unwrap();
        assert_eq!(
            css,
            "@media (min-width: 640px) {\nflex/row\n}\n@media (max-width: 639px) {\nflex/column\n}\n"
        );
    }

    #[test]
    fn test_responsive_with_no_breakpoints_emits_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let engine = engine();
        engine.register(
            ["gap"],
            Arc::new(FnHandler::new(["gap"], move |_: &StyleMap, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Some("gap;\n".to_string())
            })),
        );

        let styles = StyleDescriptor::new().set("gap", vec!["2x", "1x"]);
        assert_eq!(engine.render(&styles, &[], None).unwrap(), "");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_none_contributes_nothing() {
        let engine = engine();
        engine.register(["ghost"], Arc::new(FnHandler::new(["ghost"], |_: &StyleMap, _| None)));
        let styles = StyleDescriptor::new().set("ghost", "x").set("color", "red");
        assert_eq!(engine.render(&styles, &[], None).unwrap(), "color: red;\n");
    }

    #[test]
    fn test_partial_view_omits_absent_properties() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let engine = engine();
        engine.register_handler(Arc::new(FnHandler::new(
            ["width", "minWidth", "maxWidth"],
            move |styles: &StyleMap, _| {
                sink.lock().unwrap().push(styles.keys().cloned().collect::<Vec<_>>());
                None
            },
        )));

        let styles = StyleDescriptor::new().set("maxWidth", "20rem");
        engine.render(&styles, &[], None).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![vec!["maxWidth".to_string()]]);
    }

    #[test]
    fn test_nested_selector_keeps_breakpoints() {
        let styles = StyleDescriptor::new()
            .set("&:hover", StyleDescriptor::new().set("color", vec!["red", "blue"]));
        let css = engine().render(&styles, &[640, 0], None).unwrap();
        assert_eq!(
            css,
            "@media (min-width: 640px) {\n&:hover{color: red;}\n}\n\
             @media (max-width: 639px) {\n&:hover{color: blue;}\n}\n"
        );
    }

    #[test]
    fn test_non_descriptor_selector_value_is_ignored() {
        let styles = StyleDescriptor::new()
            .set("&:hover", "blue")
            .set("color", "red");
        assert_eq!(engine().render(&styles, &[], None).unwrap(), "color: red;\n");
    }

    #[test]
    fn test_nested_blocks_in_key_order() {
        let styles = StyleDescriptor::new()
            .set("&:focus", StyleDescriptor::new().set("fill", "#focus"))
            .set("&:hover", StyleDescriptor::new().set("fill", "#hover"));
        let css = engine().render(&styles, &[], None).unwrap();
        assert_eq!(
            css,
            "&:focus{background-color: var(--focus-color);}\n\
             &:hover{background-color: var(--hover-color);}\n"
        );
    }

    #[test]
    fn test_non_finite_number_is_an_error() {
        let styles = StyleDescriptor::new().set("opacity", f64::INFINITY);
        let err = engine().render(&styles, &[], None).unwrap_err();
        assert!(matches!(err, RenderError::Serialization(_)));
    }

    #[test]
    fn test_nested_error_propagates() {
        let styles = StyleDescriptor::new()
            .set("&:hover", StyleDescriptor::new().set("opacity", f64::NAN));
        assert!(engine().render(&styles, &[], None).is_err());
    }

    #[test]
    fn test_custom_media_wrapper() {
        fn bracketed(rules: &[String], _: &[u32]) -> String {
            rules.iter().map(|r| format!("[{}]", r.trim_end())).collect()
        }
        let engine = engine().with_media_wrapper(bracketed);
        let styles = StyleDescriptor::new().set("gap", vec![1, 2]);
        assert_eq!(engine.render(&styles, &[1, 0], None).unwrap(), "[gap: 1;][gap: 2;]");
    }

    #[test]
    fn test_custom_zone_normalizer() {
        fn first_only(value: Option<&StyleValue>, zones: usize) -> Option<Vec<Scalar>> {
            match value? {
                StyleValue::Responsive(values) => {
                    Some(vec![values.first().cloned().unwrap_or_default(); zones])
                }
                other => normalize_style_zones(Some(other), zones),
            }
        }
        let engine = engine().with_zone_normalizer(first_only);
        let styles = StyleDescriptor::new().set("gap", vec!["a", "b"]);
        assert_eq!(
            engine.render(&styles, &[640, 0], None).unwrap(),
            "@media (min-width: 640px) {\ngap: a;\n}\n@media (max-width: 639px) {\ngap: a;\n}\n"
        );
    }

    #[test]
    fn test_custom_default_handler() {
        fn upper(name: &str) -> Arc<dyn StyleHandler> {
            let name = name.to_string();
            Arc::new(FnHandler::new([name.clone()], move |styles: &StyleMap, _| {
                styles.get(&name).map(|v| format!("{}={}\n", name.to_uppercase(), v))
            }))
        }
        let engine = engine().with_default_handler(upper);
        let styles = StyleDescriptor::new().set("color", "red");
        assert_eq!(engine.render(&styles, &[], None).unwrap(), "COLOR=red\n");
    }

    #[test]
    fn test_default_handler_after_registry_replacement() {
        fn upper(name: &str) -> Arc<dyn StyleHandler> {
            let name = name.to_string();
            Arc::new(FnHandler::new([name.clone()], move |styles: &StyleMap, _| {
                styles.get(&name).map(|v| format!("{}={}\n", name.to_uppercase(), v))
            }))
        }
        let styles = StyleDescriptor::new().set("color", "red");

        let factory_last = engine()
            .with_registry(HandlerRegistry::empty(crate::handler::builtin::create_style))
            .with_default_handler(upper);
        assert_eq!(factory_last.render(&styles, &[], None).unwrap(), "COLOR=red\n");

        // the replacement registry brings its own factory
        let registry_last = engine()
            .with_default_handler(upper)
            .with_registry(HandlerRegistry::empty(crate::handler::builtin::create_style));
        assert_eq!(registry_last.render(&styles, &[], None).unwrap(), "color: red;\n");
    }

    #[test]
    fn test_clear_cache() {
        let engine = engine();
        engine
            .render(&StyleDescriptor::new().set("color", "red"), &[], None)
            .unwrap();
        assert_eq!(engine.cached_entries(), 1);
        engine.clear_cache();
        assert_eq!(engine.cached_entries(), 0);
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StyleEngine>();
    }
}
