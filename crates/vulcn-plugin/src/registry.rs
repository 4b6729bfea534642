//! Ordered plugin registry (spec.md §4.3: "Ordering: insertion order. The
//! report plugin sits last."). Grounded on `l7-plugin/src/registry.rs`'s
//! `Arc<RwLock<HashMap<...>>>` concurrency choice, adapted to preserve
//! registration order (a plain `HashMap` would not) since the pipe hooks'
//! correctness depends on it.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::{PluginError, PluginResult};
use crate::plugin::Plugin;

#[derive(Default)]
pub struct PluginRegistry {
    inner: RwLock<Vec<Arc<dyn Plugin>>>,
    names: RwLock<HashSet<String>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, plugin: Arc<dyn Plugin>) -> PluginResult<()> {
        plugin.manifest().validate()?;
        let name = plugin.manifest().name.clone();
        let mut names = self.names.write();
        if !names.insert(name.clone()) {
            return Err(PluginError::Duplicate(name));
        }
        self.inner.write().push(plugin);
        Ok(())
    }

    /// Plugins in registration order — the order every lifecycle and pipe
    /// hook dispatches in.
    pub fn ordered(&self) -> Vec<Arc<dyn Plugin>> {
        self.inner.read().clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.inner
            .read()
            .iter()
            .find(|p| p.manifest().name == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DetectCtx, RunCtx, ScanCtx};
    use crate::manifest::PluginManifest;
    use async_trait::async_trait;

    struct Noop(PluginManifest);

    #[async_trait]
    impl Plugin for Noop {
        fn manifest(&self) -> &PluginManifest {
            &self.0
        }
    }

    #[test]
    fn preserves_insertion_order() {
        let registry = PluginRegistry::new();
        registry.register(Arc::new(Noop(PluginManifest::new("a", "1.0")))).unwrap();
        registry.register(Arc::new(Noop(PluginManifest::new("b", "1.0")))).unwrap();
        registry.register(Arc::new(Noop(PluginManifest::new("c", "1.0")))).unwrap();
        let names: Vec<_> = registry.ordered().iter().map(|p| p.manifest().name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn rejects_duplicate_name() {
        let registry = PluginRegistry::new();
        registry.register(Arc::new(Noop(PluginManifest::new("dup", "1.0")))).unwrap();
        let err = registry
            .register(Arc::new(Noop(PluginManifest::new("dup", "2.0"))))
            .unwrap_err();
        assert!(matches!(err, PluginError::Duplicate(_)));
    }

    #[allow(dead_code)]
    fn type_check(_s: &ScanCtx, _r: &RunCtx, _d: &DetectCtx) {}
}
