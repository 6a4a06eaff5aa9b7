//! Callable methods exposed to the host

use rustc_hash::FxHashMap;

use crate::accessor::Accessor;
use crate::binder::Binder;
use crate::convert::DefaultValue;
use crate::error::CallResult;
use crate::names::Names;

/// A named method with an optional handler and parameter defaults.
///
/// ```ignore
/// let ping = Method::new("Ping", "Пинг")
///     .with_handler(bind!(|s: WideString| -> WideString { s }))
///     .with_defaults([(0, WideString::from("pong"))]);
/// ```
#[derive(Debug)]
pub struct Method {
    names: Names,
    binder: Option<Binder>,
    defaults: FxHashMap<usize, DefaultValue>,
}

impl Method {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Method {
            names: Names::new(name, alias),
            binder: None,
            defaults: FxHashMap::default(),
        }
    }

    /// Attach the handler, replacing any previous one
    pub fn with_handler(mut self, binder: Binder) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Add defaults by parameter ordinal
    pub fn with_defaults<I, V>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (usize, V)>,
        V: Into<DefaultValue>,
    {
        self.defaults
            .extend(defaults.into_iter().map(|(idx, v)| (idx, v.into())));
        self
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    /// Declared arity, zero without a handler
    pub fn param_count(&self) -> usize {
        self.binder
            .as_ref()
            .map_or(0, |b| b.signature().arity())
    }

    /// Whether the handler returns a value
    pub fn is_function(&self) -> bool {
        self.binder
            .as_ref()
            .is_some_and(|b| b.signature().is_function())
    }

    pub fn has_default(&self, index: usize) -> bool {
        self.defaults.contains_key(&index)
    }

    /// Write the default for parameter `index` into `slot`.
    ///
    /// Returns `Ok(false)` without touching the slot if no default is set.
    pub fn default_value(&self, index: usize, slot: &mut Accessor<'_>) -> CallResult<bool> {
        let Some(value) = self.defaults.get(&index) else {
            return Ok(false);
        };
        slot.write(value)?;
        Ok(true)
    }

    /// Dispatch to the handler. Returns `Ok(false)` if there is none.
    pub fn invoke(
        &mut self,
        return_slot: Option<&mut Accessor<'_>>,
        params: &mut [Accessor<'_>],
    ) -> CallResult<bool> {
        match self.binder.as_mut() {
            Some(binder) => binder.bind_and_call(return_slot, params),
            None => Ok(false),
        }
    }
}
