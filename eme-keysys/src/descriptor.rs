use crate::{
    codecs::InitDataType,
    error::{KeySystemError, Result},
};

/// Capabilities of a single key system.
///
/// # Example
///
/// ```
/// use eme_keysys::{KeySystemDescriptor, codecs};
///
/// let descriptor = KeySystemDescriptor::builder("com.example.test")
///     .codecs(codecs::CODEC_WEBM_ALL)
///     .init_data_type(codecs::InitDataType::WebM)
///     .parent("com.example")
///     .external_type("application/x-ppapi-external-cdm")
///     .build();
///
/// assert!(descriptor.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySystemDescriptor {
    pub name: String,
    pub supported_codecs: u32,
    pub supported_init_data_types: u32,
    pub use_aes_decryptor: bool,
    /// Name under which this key system is also reachable for type queries.
    pub parent_key_system: Option<String>,
    /// External CDM type, empty when the AES decryptor is used.
    pub external_type: Option<String>,
    pub uma_name: Option<String>,
}

impl KeySystemDescriptor {
    pub fn builder<T: Into<String>>(name: T) -> KeySystemDescriptorBuilder {
        KeySystemDescriptorBuilder {
            descriptor: Self {
                name: name.into(),
                ..Default::default()
            },
        }
    }

    pub fn supports_init_data_type(&self, init_data_type: InitDataType) -> bool {
        self.supported_init_data_types & init_data_type.mask() != 0
    }

    /// Checks that do not depend on other registered key systems.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(KeySystemError::EmptyName);
        }

        if self.use_aes_decryptor && self.external_type.as_ref().is_some_and(|x| !x.is_empty()) {
            return Err(KeySystemError::AesWithExternalType(self.name.clone()));
        }

        Ok(())
    }
}

/// Builder for [`KeySystemDescriptor`].
pub struct KeySystemDescriptorBuilder {
    descriptor: KeySystemDescriptor,
}

impl KeySystemDescriptorBuilder {
    /// Add codec bits to the supported codec mask.
    pub fn codecs(mut self, mask: u32) -> Self {
        self.descriptor.supported_codecs |= mask;
        self
    }

    pub fn init_data_type(mut self, init_data_type: InitDataType) -> Self {
        self.descriptor.supported_init_data_types |= init_data_type.mask();
        self
    }

    pub fn aes_decryptor(mut self) -> Self {
        self.descriptor.use_aes_decryptor = true;
        self
    }

    pub fn parent<T: Into<String>>(mut self, parent: T) -> Self {
        self.descriptor.parent_key_system = Some(parent.into());
        self
    }

    pub fn external_type<T: Into<String>>(mut self, external_type: T) -> Self {
        self.descriptor.external_type = Some(external_type.into());
        self
    }

    pub fn uma_name<T: Into<String>>(mut self, uma_name: T) -> Self {
        self.descriptor.uma_name = Some(uma_name.into());
        self
    }

    pub fn build(self) -> KeySystemDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::{CODEC_WEBM_VORBIS, CODEC_WEBM_VP8};

    #[test]
    fn test_builder_accumulates_masks() {
        let descriptor = KeySystemDescriptor::builder("org.example.clear")
            .codecs(CODEC_WEBM_VP8)
            .codecs(CODEC_WEBM_VORBIS)
            .init_data_type(InitDataType::WebM)
            .init_data_type(InitDataType::KeyIds)
            .aes_decryptor()
            .build();

        assert_eq!(descriptor.supported_codecs, CODEC_WEBM_VP8 | CODEC_WEBM_VORBIS);
        assert!(descriptor.supports_init_data_type(InitDataType::KeyIds));
        assert!(!descriptor.supports_init_data_type(InitDataType::Cenc));
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let descriptor = KeySystemDescriptor::builder("").build();
        assert_eq!(descriptor.validate(), Err(KeySystemError::EmptyName));
    }

    #[test]
    fn test_validate_rejects_aes_with_external_type() {
        let descriptor = KeySystemDescriptor::builder("org.example.clear")
            .aes_decryptor()
            .external_type("application/x-ppapi-clear-key-cdm")
            .build();

        assert_eq!(
            descriptor.validate(),
            Err(KeySystemError::AesWithExternalType(
                "org.example.clear".to_owned()
            ))
        );
    }
}
