use crate::{KeySystemDescriptor, KeySystems, error::Result};

/// View of a [`KeySystems`] registry that treats decryptor queries on
/// non-concrete key systems as bugs.
///
/// The plain registry methods fall back to `false` or an empty string.
/// Callers that must only ever see concrete key systems (tests, debug
/// builds of embedders) go through this wrapper so a violation surfaces
/// as `"<name> is not a known concrete system"`.
pub struct Checked<'a> {
    registry: &'a KeySystems,
}

impl<'a> Checked<'a> {
    pub(crate) fn new(registry: &'a KeySystems) -> Self {
        Self { registry }
    }

    pub fn concrete(&self, key_system: &str) -> Result<KeySystemDescriptor> {
        self.registry
            .descriptor(key_system)
            .ok_or_else(|| crate::KeySystemError::NotConcrete(key_system.to_owned()))
    }

    /// # Panics
    ///
    /// Panics if `key_system` is not a concrete key system.
    pub fn can_use_aes_decryptor(&self, key_system: &str) -> bool {
        match self.concrete(key_system) {
            Ok(descriptor) => descriptor.use_aes_decryptor,
            Err(e) => panic!("{}", e),
        }
    }

    /// # Panics
    ///
    /// Panics if `key_system` is not a concrete key system.
    pub fn external_decryptor_type(&self, key_system: &str) -> String {
        match self.concrete(key_system) {
            Ok(descriptor) => descriptor.external_type.unwrap_or_default(),
            Err(e) => panic!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{CLEAR_KEY, KeySystemError, KeySystems};

    #[test]
    fn test_concrete_error_message() {
        let key_systems = KeySystems::new();
        let err = key_systems.checked().concrete("org.example").unwrap_err();
        assert_eq!(err, KeySystemError::NotConcrete("org.example".to_owned()));
        assert_eq!(err.to_string(), "org.example is not a known concrete system");
    }

    #[test]
    fn test_clear_key_passes_checks() {
        let key_systems = KeySystems::new();
        assert!(key_systems.checked().can_use_aes_decryptor(CLEAR_KEY));
        assert!(key_systems.checked().external_decryptor_type(CLEAR_KEY).is_empty());
    }

    #[test]
    #[should_panic(expected = "webkit-org.w3.clearkey is not a known concrete system")]
    fn test_prefixed_clear_key_panics() {
        KeySystems::new()
            .checked()
            .can_use_aes_decryptor("webkit-org.w3.clearkey");
    }
}
