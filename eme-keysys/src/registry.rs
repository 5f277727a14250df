use crate::{
    Checked, KeySystemDescriptor,
    codecs::{CODEC_WEBM_ALL, CodecTable, InitDataType},
    error::{KeySystemError, Result},
    source::{EmptySource, KeySystemSource},
    telemetry::{SupportQuery, UmaReporter},
};
use log::{debug, warn};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

pub const CLEAR_KEY: &str = "org.w3.clearkey";
pub const PREFIXED_CLEAR_KEY: &str = "webkit-org.w3.clearkey";
pub const UNKNOWN_NAME_FOR_UMA: &str = "Unknown";
const CLEAR_KEY_NAME_FOR_UMA: &str = "ClearKey";

/// Maps the legacy prefixed Clear Key name to its standard name.
pub fn unprefixed_key_system_name(key_system: &str) -> &str {
    if key_system == PREFIXED_CLEAR_KEY {
        CLEAR_KEY
    } else {
        key_system
    }
}

/// Maps the standard Clear Key name to its legacy prefixed name.
pub fn prefixed_key_system_name(key_system: &str) -> &str {
    if key_system == CLEAR_KEY {
        PREFIXED_CLEAR_KEY
    } else {
        key_system
    }
}

fn clear_key() -> KeySystemDescriptor {
    let builder = KeySystemDescriptor::builder(CLEAR_KEY)
        .codecs(CODEC_WEBM_ALL)
        .init_data_type(InitDataType::WebM)
        .init_data_type(InitDataType::KeyIds)
        .aes_decryptor()
        .uma_name(CLEAR_KEY_NAME_FOR_UMA);

    #[cfg(feature = "proprietary-codecs")]
    let builder = builder
        .codecs(crate::codecs::CODEC_MP4_ALL)
        .init_data_type(InitDataType::Cenc);

    builder.build()
}

struct State {
    table: CodecTable,
    concrete: HashMap<String, KeySystemDescriptor>,
    /// Parent name to the concrete key system that claimed it.
    parents: HashMap<String, String>,
}

impl State {
    fn rebuild(&mut self, key_systems: Vec<KeySystemDescriptor>) {
        self.concrete.clear();
        self.parents.clear();

        for descriptor in std::iter::once(clear_key()).chain(key_systems) {
            if let Err(e) = self.add_concrete(descriptor) {
                warn!("Skipping key system: {}", e);
            }
        }

        debug!(
            "Registered {} concrete key systems and {} parents.",
            self.concrete.len(),
            self.parents.len()
        );
    }

    fn add_concrete(&mut self, descriptor: KeySystemDescriptor) -> Result<()> {
        descriptor.validate()?;

        let name = &descriptor.name;

        if self.concrete.contains_key(name) || self.parents.contains_key(name) {
            return Err(KeySystemError::AlreadyRegistered(name.to_owned()));
        }

        let parent = descriptor
            .parent_key_system
            .as_ref()
            .filter(|x| !x.is_empty());

        if let Some(parent) = parent {
            if parent == name || self.concrete.contains_key(parent) {
                return Err(KeySystemError::ParentIsConcrete {
                    key_system: name.to_owned(),
                    parent: parent.to_owned(),
                });
            }

            if let Some(claimed_by) = self.parents.get(parent) {
                return Err(KeySystemError::ParentAlreadyClaimed {
                    key_system: name.to_owned(),
                    parent: parent.to_owned(),
                    claimed_by: claimed_by.to_owned(),
                });
            }

            self.parents.insert(parent.to_owned(), name.to_owned());
        }

        self.concrete.insert(name.to_owned(), descriptor);
        Ok(())
    }

    /// Concrete descriptor for `key_system`, following a parent to its child.
    fn resolve(&self, key_system: &str) -> Option<&KeySystemDescriptor> {
        self.concrete.get(key_system).or_else(|| {
            self.parents
                .get(key_system)
                .and_then(|child| self.concrete.get(child))
        })
    }
}

/// Registry of supported key systems.
///
/// Queries are total: unknown names, containers and codecs simply answer
/// `false` (or `"Unknown"` / an empty string). Before each query the
/// registry asks its [`KeySystemSource`] whether the key system set changed
/// and, if so, replaces its descriptors with the freshly collected ones.
///
/// # Example
///
/// ```
/// use eme_keysys::KeySystems;
///
/// let key_systems = KeySystems::new();
/// assert!(key_systems.is_concrete_supported_key_system("org.w3.clearkey"));
/// assert!(key_systems.is_supported_key_system_with_media_mime_type(
///     "video/webm",
///     &["vp8", "vorbis"],
///     "org.w3.clearkey",
/// ));
/// assert_eq!(key_systems.key_system_name_for_uma("org.w3.clearkey"), "ClearKey");
/// ```
pub struct KeySystems {
    state: Mutex<State>,
    source: Arc<dyn KeySystemSource>,
    reporter: Option<Arc<dyn UmaReporter>>,
}

impl Default for KeySystems {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySystems {
    /// Registry exposing only the built-in Clear Key system.
    pub fn new() -> Self {
        Self::with_source(Arc::new(EmptySource))
    }

    /// Registry whose key systems come from `source`.
    pub fn with_source(source: Arc<dyn KeySystemSource>) -> Self {
        let mut state = State {
            table: CodecTable::new(),
            concrete: HashMap::new(),
            parents: HashMap::new(),
        };
        state.rebuild(source.collect_supported_key_systems());

        Self {
            state: Mutex::new(state),
            source,
            reporter: None,
        }
    }

    /// Report media type queries to `reporter`.
    pub fn with_reporter(mut self, reporter: Arc<dyn UmaReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap_or_else(|x| x.into_inner());

        if self.source.needs_update() {
            debug!("Key system source changed, rebuilding registry.");
            state.rebuild(self.source.collect_supported_key_systems());
        }

        state
    }

    /// Contract-checking view of this registry.
    pub fn checked(&self) -> Checked<'_> {
        Checked::new(self)
    }

    pub fn add_container_mask(&self, container: &str, mask: u32) -> Result<()> {
        self.state().table.add_container_mask(container, mask)
    }

    pub fn add_codec_mask(&self, codec: &str, mask: u32) -> Result<()> {
        self.state().table.add_codec_mask(codec, mask)
    }

    pub fn add_codec_alias(&self, alias: &str, codec: &str) -> Result<()> {
        self.state().table.add_codec_alias(alias, codec)
    }

    pub fn codec_mask(&self, codec: &str) -> Option<u32> {
        self.state().table.codec_mask(codec)
    }

    /// `true` only for directly registered key systems.
    pub fn is_concrete_supported_key_system(&self, key_system: &str) -> bool {
        self.state().concrete.contains_key(key_system)
    }

    /// `true` for concrete key systems and registered parents.
    pub fn is_supported_key_system(&self, key_system: &str) -> bool {
        self.state().resolve(key_system).is_some()
    }

    /// Whether `key_system` can decrypt content of `mime_type` encoded with
    /// every codec in `codecs`.
    ///
    /// An empty `mime_type` only checks that the key system is known. An
    /// empty codec list only checks the container.
    pub fn is_supported_key_system_with_media_mime_type<S: AsRef<str>>(
        &self,
        mime_type: &str,
        codecs: &[S],
        key_system: &str,
    ) -> bool {
        let state = self.state();

        let Some(descriptor) = state.resolve(key_system) else {
            return false;
        };

        let supported = mime_type.is_empty()
            || state.table.is_supported_container_and_codecs(
                mime_type,
                codecs,
                descriptor.supported_codecs,
            );

        let uma = state
            .concrete
            .get(key_system)
            .and_then(|x| Some((x.uma_name.clone()?, !x.use_aes_decryptor)));
        drop(state);

        if let (Some(reporter), Some((uma_name, is_external))) = (&self.reporter, uma) {
            reporter.report(&SupportQuery {
                key_system,
                uma_name: &uma_name,
                is_external,
                with_type: !mime_type.is_empty(),
                supported,
            });
        }

        supported
    }

    /// Whether `key_system` accepts initialization data of the named type
    /// (`webm`, `cenc` or `keyids`).
    pub fn is_supported_key_system_with_init_data_type(
        &self,
        key_system: &str,
        init_data_type: &str,
    ) -> bool {
        let Ok(init_data_type) = init_data_type.parse::<InitDataType>() else {
            return false;
        };

        self.state()
            .resolve(key_system)
            .is_some_and(|x| x.supports_init_data_type(init_data_type))
    }

    pub fn key_system_name_for_uma(&self, key_system: &str) -> String {
        self.state()
            .concrete
            .get(key_system)
            .and_then(|x| x.uma_name.clone())
            .unwrap_or_else(|| UNKNOWN_NAME_FOR_UMA.to_owned())
    }

    /// Returns `false` for names that are not concrete key systems. Use
    /// [`Checked::can_use_aes_decryptor`] to treat that as a bug instead.
    pub fn can_use_aes_decryptor(&self, key_system: &str) -> bool {
        self.state()
            .concrete
            .get(key_system)
            .is_some_and(|x| x.use_aes_decryptor)
    }

    /// Returns an empty string for names that are not concrete key systems.
    /// Use [`Checked::external_decryptor_type`] to treat that as a bug instead.
    pub fn external_decryptor_type(&self, key_system: &str) -> String {
        self.state()
            .concrete
            .get(key_system)
            .and_then(|x| x.external_type.clone())
            .unwrap_or_default()
    }

    /// Copy of the concrete descriptor registered under `key_system`.
    ///
    /// `supported_codecs` only keeps bits of registered codecs; bits a source
    /// set for codecs the table does not know are dropped.
    pub fn descriptor(&self, key_system: &str) -> Option<KeySystemDescriptor> {
        let state = self.state();
        let mut descriptor = state.concrete.get(key_system).cloned()?;
        descriptor.supported_codecs &= state.table.registered_codecs();
        Some(descriptor)
    }

    /// Name of the concrete key system serving `key_system`, which is the
    /// name itself for concrete key systems and the child for parents.
    pub fn concrete_key_system_name(&self, key_system: &str) -> Option<String> {
        self.state().resolve(key_system).map(|x| x.name.clone())
    }

    /// Registered codec tokens usable with `key_system`, sorted.
    pub fn codec_names(&self, key_system: &str) -> Vec<String> {
        let state = self.state();

        match state.resolve(key_system) {
            Some(descriptor) => state
                .table
                .codec_names(descriptor.supported_codecs)
                .into_iter()
                .map(|x| x.to_owned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Concrete key system names, sorted.
    pub fn key_system_names(&self) -> Vec<String> {
        let mut names = self.state().concrete.keys().cloned().collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;

    fn descriptor(name: &str, parent: Option<&str>) -> KeySystemDescriptor {
        let builder = KeySystemDescriptor::builder(name).codecs(CODEC_WEBM_ALL);

        match parent {
            Some(parent) => builder.parent(parent).build(),
            None => builder.build(),
        }
    }

    #[test]
    fn test_clear_key_builtin() {
        let key_systems = KeySystems::new();
        assert_eq!(key_systems.key_system_names(), vec![CLEAR_KEY.to_owned()]);
        assert!(key_systems.can_use_aes_decryptor(CLEAR_KEY));
        assert!(key_systems.external_decryptor_type(CLEAR_KEY).is_empty());
        assert!(key_systems.is_supported_key_system_with_init_data_type(CLEAR_KEY, "keyids"));
        assert!(!key_systems.is_supported_key_system_with_init_data_type(CLEAR_KEY, "KEYIDS"));
    }

    #[test]
    fn test_prefixed_names() {
        assert_eq!(unprefixed_key_system_name(PREFIXED_CLEAR_KEY), CLEAR_KEY);
        assert_eq!(prefixed_key_system_name(CLEAR_KEY), PREFIXED_CLEAR_KEY);
        assert_eq!(unprefixed_key_system_name("com.example"), "com.example");
        assert_eq!(prefixed_key_system_name("com.example"), "com.example");
    }

    #[test]
    fn test_invalid_descriptors_are_skipped() {
        let source = Arc::new(StaticSource::new(vec![
            descriptor("com.example.a", Some("com.example")),
            // Parent already claimed.
            descriptor("com.example.b", Some("com.example")),
            // Duplicate of a parent name.
            descriptor("com.example", None),
            // Parent is a concrete key system.
            descriptor("com.example.a.child", Some("com.example.a")),
            // Duplicate of the built-in.
            descriptor(CLEAR_KEY, None),
            descriptor("", None),
            descriptor("org.example.self", Some("org.example.self")),
            descriptor("org.example.ok", Some("")),
        ]));
        let key_systems = KeySystems::with_source(source);

        assert_eq!(
            key_systems.key_system_names(),
            vec!["com.example.a", "org.example.ok", CLEAR_KEY]
        );
        assert_eq!(
            key_systems.concrete_key_system_name("com.example").as_deref(),
            Some("com.example.a")
        );
        assert!(!key_systems.is_supported_key_system(""));
        assert!(!key_systems.is_supported_key_system("org.example.self"));
        // The built-in Clear Key is not replaced by the duplicate.
        assert!(key_systems.can_use_aes_decryptor(CLEAR_KEY));
    }

    #[test]
    fn test_descriptor_drops_unregistered_codec_bits() {
        let source = Arc::new(StaticSource::new(vec![
            KeySystemDescriptor::builder("org.example.clear")
                .codecs(CODEC_WEBM_ALL | 1 << 20)
                .build(),
        ]));
        let key_systems = KeySystems::with_source(source);

        let descriptor = key_systems.descriptor("org.example.clear").unwrap();
        assert_eq!(descriptor.supported_codecs, CODEC_WEBM_ALL);

        // Bits become visible once their codec is registered.
        key_systems.add_codec_mask("barvideo", 1 << 20).unwrap();
        let descriptor = key_systems.descriptor("org.example.clear").unwrap();
        assert_eq!(descriptor.supported_codecs, CODEC_WEBM_ALL | 1 << 20);
    }

    #[test]
    fn test_codec_names_follow_parent() {
        let source = Arc::new(StaticSource::new(vec![
            KeySystemDescriptor::builder("com.example.test")
                .codecs(crate::codecs::CODEC_WEBM_VORBIS)
                .parent("com.example")
                .build(),
        ]));
        let key_systems = KeySystems::with_source(source);

        assert_eq!(key_systems.codec_names("com.example"), vec!["vorbis"]);
        assert!(key_systems.codec_names("com.example.unknown").is_empty());
    }
}
