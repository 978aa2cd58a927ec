//! Property name to handler registry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::trace;

use super::builtin;
use super::{HandlerId, StyleHandler};

/// Creates the handler used for a property nobody registered.
pub type DefaultHandlerFactory = fn(&str) -> Arc<dyn StyleHandler>;

/// Resolves style property names to the handlers that render them.
///
/// Handlers live in a table and are referred to by [`HandlerId`]; several
/// property names may share one handler. Names without a registration get a
/// handler from the default factory on first lookup, and keep it until an
/// explicit registration for that name replaces it.
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn StyleHandler>>,
    by_name: HashMap<String, Vec<HandlerId>>,
    // names whose only entry came from the default factory
    defaulted: HashSet<String>,
    default_factory: DefaultHandlerFactory,
}

impl HandlerRegistry {
    /// Creates a registry with the built-in handlers registered.
    pub fn new() -> Self {
        let mut registry = Self::empty(builtin::create_style);
        builtin::register_builtins(&mut registry);
        registry
    }

    /// Creates a registry with no handlers and the given default factory.
    pub fn empty(default_factory: DefaultHandlerFactory) -> Self {
        Self {
            handlers: Vec::new(),
            by_name: HashMap::new(),
            defaulted: HashSet::new(),
            default_factory,
        }
    }

    pub fn set_default_factory(&mut self, factory: DefaultHandlerFactory) {
        self.default_factory = factory;
    }

    /// Registers `handler` for every name in `names`.
    ///
    /// A name that already has registered handlers gets this one appended, so
    /// it runs after the earlier registrations. A name that only had a default
    /// handler drops it in favor of this one.
    pub fn register<I, S>(&mut self, names: I, handler: Arc<dyn StyleHandler>) -> HandlerId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = HandlerId(self.handlers.len());
        self.handlers.push(handler);
        for name in names {
            let name = name.into();
            if self.defaulted.remove(&name) {
                self.by_name.insert(name, vec![id]);
            } else {
                self.by_name.entry(name).or_default().push(id);
            }
        }
        id
    }

    /// Registers `handler` under each name of its own lookup set.
    pub fn register_handler(&mut self, handler: Arc<dyn StyleHandler>) -> HandlerId {
        let names = handler.lookup_styles().to_vec();
        self.register(names, handler)
    }

    /// Returns the handlers for `name`, creating the default entry if needed.
    pub fn resolve(&mut self, name: &str) -> Vec<(HandlerId, Arc<dyn StyleHandler>)> {
        if !self.by_name.contains_key(name) {
            trace!("no handler for style '{}', creating default", name);
            let handler = (self.default_factory)(name);
            self.register([name], handler);
            self.defaulted.insert(name.to_string());
        }
        self.by_name
            .get(name)
            .map(|ids| {
                ids.iter()
                    .map(|&id| (id, Arc::clone(&self.handlers[id.0])))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, id: HandlerId) -> Option<&Arc<dyn StyleHandler>> {
        self.handlers.get(id.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of distinct handlers in the table.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
