//! Name → method lookup for programmatic invocation.
//!
//! # Design Decisions
//! - Snapshot keyed by the registry generation; a stale snapshot is rebuilt
//!   on the next lookup
//! - A miss rebuilds once more before it is reported
//! - Enabled state is checked live on every hit, never cached
//! - Rebuilds only read the registry, so racing rebuilds are harmless

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::registry::method::SharedMethod;
use crate::registry::objects::RemoteObjects;

struct Snapshot {
    generation: u64,
    methods: HashMap<String, Arc<SharedMethod>>,
}

/// Cached index of methods by qualified name.
pub struct MethodIndex {
    objects: Arc<RemoteObjects>,
    snapshot: ArcSwap<Snapshot>,
}

impl MethodIndex {
    pub fn new(objects: Arc<RemoteObjects>) -> Self {
        let snapshot = ArcSwap::from_pointee(Self::build(&objects));
        Self { objects, snapshot }
    }

    /// Resolve `Class.method` or `Class.prototype.method`.
    ///
    /// Disabled methods resolve as `None`.
    pub fn resolve(&self, full_name: &str) -> Option<Arc<SharedMethod>> {
        let mut snapshot = self.snapshot.load_full();
        let mut rebuilt = false;
        if snapshot.generation != self.objects.generation() {
            snapshot = self.rebuild();
            rebuilt = true;
        }

        let method = match snapshot.methods.get(full_name) {
            Some(m) => Some(m.clone()),
            None if !rebuilt => self.rebuild().methods.get(full_name).cloned(),
            None => None,
        };

        method.filter(|m| {
            let enabled = m.is_enabled();
            if !enabled {
                tracing::debug!(method = %full_name, "Method is disabled");
            }
            enabled
        })
    }

    /// Drop the cached snapshot and rebuild it from the registry.
    pub fn invalidate(&self) {
        self.rebuild();
    }

    fn rebuild(&self) -> Arc<Snapshot> {
        let snapshot = Arc::new(Self::build(&self.objects));
        self.snapshot.store(snapshot.clone());
        snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build(objects: &RemoteObjects) -> Snapshot {
        // Read the generation first so a concurrent mutation leaves the
        // snapshot stale rather than silently current.
        let generation = objects.generation();
        let methods = objects
            .methods()
            .into_iter()
            .map(|m| (m.full_name(), m))
            .collect();
        Snapshot {
            generation,
            methods,
        }
    }
}
