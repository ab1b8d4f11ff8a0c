//! The remote objects registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::registry::class::SharedClass;
use crate::registry::hooks::HookSet;
use crate::registry::method::{Hook, SharedMethod};

/// Registry of classes exposed over HTTP.
///
/// Reads are lock-free snapshots. Every mutation of the class set or the hook
/// set bumps [`generation`](Self::generation), which lets caches built from
/// the registry notice they are stale.
#[derive(Default)]
pub struct RemoteObjects {
    classes: ArcSwap<Vec<Arc<SharedClass>>>,
    before: ArcSwap<HookSet>,
    after: ArcSwap<HookSet>,
    generation: AtomicU64,
}

impl RemoteObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class. A class with the same name is replaced in place.
    pub fn add_class(&self, class: Arc<SharedClass>) {
        tracing::debug!(class = %class.name(), methods = class.methods().len(), "Registering class");
        self.classes.rcu(|current| {
            let mut next = Vec::clone(current);
            match next.iter().position(|c| c.name() == class.name()) {
                Some(i) => next[i] = class.clone(),
                None => next.push(class.clone()),
            }
            next
        });
        self.bump();
    }

    /// Remove a class by name. Returns whether it was registered.
    pub fn remove_class(&self, name: &str) -> bool {
        let previous = self.classes.rcu(|current| {
            current
                .iter()
                .filter(|c| c.name() != name)
                .cloned()
                .collect::<Vec<_>>()
        });
        let removed = previous.iter().any(|c| c.name() == name);
        if removed {
            self.bump();
        }
        removed
    }

    /// Snapshot of the registered classes in registration order.
    pub fn classes(&self) -> Arc<Vec<Arc<SharedClass>>> {
        self.classes.load_full()
    }

    pub fn find_class(&self, name: &str) -> Option<Arc<SharedClass>> {
        self.classes.load().iter().find(|c| c.name() == name).cloned()
    }

    /// Every method of every class, shared constructors excluded.
    pub fn methods(&self) -> Vec<Arc<SharedMethod>> {
        self.classes
            .load()
            .iter()
            .flat_map(|c| c.methods().iter().cloned())
            .collect()
    }

    /// Register a hook run before every method whose name matches `pattern`.
    pub fn before(&self, pattern: &str, hook: impl Hook + 'static) {
        let hook: Arc<dyn Hook> = Arc::new(hook);
        self.before.rcu(|set| {
            let mut next = HookSet::clone(set);
            next.push(pattern, hook.clone());
            next
        });
        self.bump();
    }

    /// Register a hook run after every method whose name matches `pattern`.
    pub fn after(&self, pattern: &str, hook: impl Hook + 'static) {
        let hook: Arc<dyn Hook> = Arc::new(hook);
        self.after.rcu(|set| {
            let mut next = HookSet::clone(set);
            next.push(pattern, hook.clone());
            next
        });
        self.bump();
    }

    pub fn before_hooks(&self, full_name: &str) -> Vec<Arc<dyn Hook>> {
        self.before.load().matching(full_name)
    }

    pub fn after_hooks(&self, full_name: &str) -> Vec<Arc<dyn Hook>> {
        self.after.load().matching(full_name)
    }

    /// Counter bumped on every mutation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}
