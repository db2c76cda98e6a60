use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::value::Instance;

#[derive(Default)]
struct Singletons {
    objects: HashMap<String, Instance>,
    names: Vec<String>,
}

/// Fully constructed beans, by name.
///
/// Entries are never evicted while the owning factory lives. The factory is responsible for
/// calling [SingletonCache::add_singleton] at most once per name.
#[derive(Default)]
pub struct SingletonCache {
    singletons: RwLock<Singletons>,
}

impl SingletonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_singleton(&self, name: &str) -> Option<Instance> {
        self.singletons.read().objects.get(name).cloned()
    }

    /// Insert or replace the instance stored under a name
    pub fn add_singleton(&self, name: &str, instance: Instance) {
        let mut singletons = self.singletons.write();
        if singletons.objects.insert(name.to_string(), instance).is_none() {
            singletons.names.push(name.to_string());
        }
        debug!("Cached singleton '{}'", name);
    }

    pub fn contains_singleton(&self, name: &str) -> bool {
        self.singletons.read().objects.contains_key(name)
    }

    /// Names of the cached singletons, in insertion order
    pub fn singleton_names(&self) -> Vec<String> {
        self.singletons.read().names.clone()
    }

    pub fn singleton_count(&self) -> usize {
        self.singletons.read().names.len()
    }

    /// Drop every cached instance, most recently created first
    pub(crate) fn clear(&mut self) {
        let singletons = self.singletons.get_mut();
        while let Some(name) = singletons.names.pop() {
            singletons.objects.remove(&name);
            debug!("Destroyed singleton '{}'", name);
        }
    }
}
