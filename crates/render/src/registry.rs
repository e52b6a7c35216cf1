//! Factory registry: renderable type tag → view-node constructor.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use sceneview_object::TypeTag;

use crate::error::RegistryError;
use crate::node::NodeBehavior;

/// Builds the behavior of a fresh view node.
pub type NodeConstructor = Arc<dyn Fn() -> Box<dyn NodeBehavior> + Send + Sync>;

static GLOBAL: OnceLock<Arc<FactoryRegistry>> = OnceLock::new();

/// Mapping from renderable type tag to view-node constructor.
///
/// Mutable while a backend sets it up, shared read-only (`Arc`) once view
/// trees are built from it.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    constructors: HashMap<TypeTag, NodeConstructor>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` for `tag`, replacing any previous one.
    ///
    /// Returns true when an existing constructor was replaced.
    pub fn register<F>(&mut self, tag: TypeTag, constructor: F) -> bool
    where
        F: Fn() -> Box<dyn NodeBehavior> + Send + Sync + 'static,
    {
        let replaced = self
            .constructors
            .insert(tag, Arc::new(constructor))
            .is_some();
        if replaced {
            tracing::debug!(%tag, "view node constructor overridden");
        }
        replaced
    }

    pub fn unregister(&mut self, tag: TypeTag) -> bool {
        self.constructors.remove(&tag).is_some()
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.constructors.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// First tag of `tags`, most-derived first, that has a constructor.
    pub fn resolve(&self, tags: &[TypeTag]) -> Option<TypeTag> {
        tags.iter()
            .rev()
            .find(|tag| self.constructors.contains_key(*tag))
            .copied()
    }

    pub fn resolves(&self, tags: &[TypeTag]) -> bool {
        self.resolve(tags).is_some()
    }

    /// Build a behavior for an object carrying `tags` (least- to
    /// most-derived), along with the tag that matched. `None` means the kind
    /// is unsupported by this registry.
    pub fn create(&self, tags: &[TypeTag]) -> Option<(TypeTag, Box<dyn NodeBehavior>)> {
        let tag = self.resolve(tags)?;
        let constructor = self.constructors.get(&tag)?;
        Some((tag, constructor()))
    }

    /// Install `self` as the process-wide registry. Succeeds once per
    /// process.
    pub fn install(self) -> Result<Arc<Self>, RegistryError> {
        let registry = Arc::new(self);
        GLOBAL
            .set(registry.clone())
            .map_err(|_| RegistryError::AlreadyInstalled)?;
        tracing::debug!(constructors = registry.len(), "factory registry installed");
        Ok(registry)
    }

    /// The installed process-wide registry, if any.
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.get().cloned()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.constructors.keys().map(|t| t.as_str()).collect();
        tags.sort_unstable();
        f.debug_struct("FactoryRegistry").field("tags", &tags).finish()
    }
}
