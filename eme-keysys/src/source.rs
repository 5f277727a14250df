//! Providers of the supported key system set.

use crate::KeySystemDescriptor;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

/// Supplies the key systems a registry should expose.
///
/// The registry asks [`needs_update`](Self::needs_update) before serving a
/// query. When it returns `true`, the list from
/// [`collect_supported_key_systems`](Self::collect_supported_key_systems)
/// replaces every previously collected descriptor.
pub trait KeySystemSource: Send + Sync {
    fn needs_update(&self) -> bool;
    fn collect_supported_key_systems(&self) -> Vec<KeySystemDescriptor>;
}

/// Source without any key systems of its own.
pub struct EmptySource;

impl KeySystemSource for EmptySource {
    fn needs_update(&self) -> bool {
        false
    }

    fn collect_supported_key_systems(&self) -> Vec<KeySystemDescriptor> {
        Vec::new()
    }
}

/// Source holding a fixed list that can be swapped at runtime.
pub struct StaticSource {
    key_systems: Mutex<Vec<KeySystemDescriptor>>,
    update_needed: AtomicBool,
}

impl StaticSource {
    pub fn new(key_systems: Vec<KeySystemDescriptor>) -> Self {
        Self {
            key_systems: Mutex::new(key_systems),
            update_needed: AtomicBool::new(true),
        }
    }

    /// Swap the list and flag the registry for a rebuild.
    pub fn replace(&self, key_systems: Vec<KeySystemDescriptor>) {
        *self.key_systems.lock().unwrap_or_else(|x| x.into_inner()) = key_systems;
        self.update_needed.store(true, Ordering::SeqCst);
    }
}

impl KeySystemSource for StaticSource {
    fn needs_update(&self) -> bool {
        self.update_needed.load(Ordering::SeqCst)
    }

    fn collect_supported_key_systems(&self) -> Vec<KeySystemDescriptor> {
        self.update_needed.store(false, Ordering::SeqCst);
        self.key_systems
            .lock()
            .unwrap_or_else(|x| x.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_updates_once() {
        let source = StaticSource::new(vec![
            KeySystemDescriptor::builder("org.example.clear").build(),
        ]);

        assert!(source.needs_update());
        assert_eq!(source.collect_supported_key_systems().len(), 1);
        assert!(!source.needs_update());

        source.replace(Vec::new());
        assert!(source.needs_update());
        assert!(source.collect_supported_key_systems().is_empty());
        assert!(!source.needs_update());
    }
}
