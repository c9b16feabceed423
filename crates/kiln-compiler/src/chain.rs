//! Ordered plugin chain.
//!
//! Rolldown runs plugins in registration order, and the server pipeline
//! leans on that: the deprecation warner must see import specifiers
//! before resolution plugins rewrite them, and the bare-import
//! externalizer must come last so every scheme-tagged specifier has
//! already been claimed. [`PluginChain`] keeps the order explicit and
//! auditable: the chain is built once, its names can be inspected in
//! tests, and the conditional platform entries are prepends rather than
//! scattered inserts.

use std::sync::Arc;

use rolldown_plugin::{__inner::SharedPluginable, Plugin};

/// An ordered list of bundler plugins.
#[derive(Default)]
pub struct PluginChain {
    entries: Vec<(String, SharedPluginable)>,
}

impl PluginChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin at the end of the chain.
    pub fn push<P: Plugin + 'static>(&mut self, plugin: P) {
        let name = plugin.name().into_owned();
        self.entries.push((name, Arc::new(plugin)));
    }

    /// Insert a plugin ahead of everything currently in the chain.
    pub fn prepend<P: Plugin + 'static>(&mut self, plugin: P) {
        let name = plugin.name().into_owned();
        self.entries.insert(0, (name, Arc::new(plugin)));
    }

    /// Plugin names in execution order. This is what order tests assert
    /// against.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into the plugin list handed to Rolldown.
    pub fn into_plugins(self) -> Vec<SharedPluginable> {
        self.entries.into_iter().map(|(_, plugin)| plugin).collect()
    }
}

impl std::fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
