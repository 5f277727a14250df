use anyhow::{Context, Result, anyhow, bail};
use eme_keysys::{
    KeySystemDescriptor, KeySystems,
    codecs::{CODEC_NONE, InitDataType},
    source::StaticSource,
};
use log::info;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path, sync::Arc};

/// Extra containers, codecs and key systems loaded from a JSON file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Codec token to bit position.
    #[serde(default)]
    pub codecs: BTreeMap<String, u8>,
    /// Alias token to the codec whose bit it shares.
    #[serde(default)]
    pub codec_aliases: BTreeMap<String, String>,
    /// Container MIME type to codec tokens.
    #[serde(default)]
    pub containers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub key_systems: Vec<KeySystemEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeySystemEntry {
    pub name: String,
    #[serde(default)]
    pub codecs: Vec<String>,
    #[serde(default)]
    pub init_data_types: Vec<String>,
    #[serde(default)]
    pub aes_decryptor: bool,
    pub parent: Option<String>,
    pub external_type: Option<String>,
    pub uma_name: Option<String>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}.", path.display()))?;
        Self::from_json(&data).with_context(|| format!("Cannot parse {}.", path.display()))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Build a registry holding the built-in tables plus everything in this
    /// config. Key systems are handed over through a [`StaticSource`], so
    /// they are applied on the first query.
    pub fn into_key_systems(self) -> Result<KeySystems> {
        let source = Arc::new(StaticSource::new(Vec::new()));
        let key_systems = KeySystems::with_source(source.clone());

        for (codec, bit) in &self.codecs {
            if *bit >= 32 {
                bail!("Codec {} bit {} is out of range (0-31).", codec, bit);
            }

            key_systems
                .add_codec_mask(codec, 1 << bit)
                .with_context(|| format!("Cannot register codec {}.", codec))?;
        }

        for (alias, codec) in &self.codec_aliases {
            key_systems
                .add_codec_alias(alias, codec)
                .with_context(|| format!("Cannot register codec alias {}.", alias))?;
        }

        for (container, codecs) in &self.containers {
            let mask = codec_mask(&key_systems, codecs)
                .with_context(|| format!("Cannot register container {}.", container))?;
            key_systems.add_container_mask(container, mask)?;
        }

        let mut descriptors = Vec::with_capacity(self.key_systems.len());

        for entry in self.key_systems {
            let name = entry.name.clone();
            descriptors.push(
                entry
                    .into_descriptor(&key_systems)
                    .with_context(|| format!("Invalid key system {}.", name))?,
            );
        }

        info!(
            "Loaded {} codecs, {} containers and {} key systems from config.",
            self.codecs.len(),
            self.containers.len(),
            descriptors.len()
        );

        source.replace(descriptors);
        Ok(key_systems)
    }
}

impl KeySystemEntry {
    fn into_descriptor(self, key_systems: &KeySystems) -> Result<KeySystemDescriptor> {
        let mut builder =
            KeySystemDescriptor::builder(self.name).codecs(codec_mask(key_systems, &self.codecs)?);

        for init_data_type in &self.init_data_types {
            builder = builder.init_data_type(init_data_type.parse::<InitDataType>()?);
        }

        if self.aes_decryptor {
            builder = builder.aes_decryptor();
        }

        if let Some(parent) = self.parent {
            builder = builder.parent(parent);
        }

        if let Some(external_type) = self.external_type {
            builder = builder.external_type(external_type);
        }

        if let Some(uma_name) = self.uma_name {
            builder = builder.uma_name(uma_name);
        }

        let descriptor = builder.build();
        descriptor.validate()?;
        Ok(descriptor)
    }
}

fn codec_mask(key_systems: &KeySystems, codecs: &[String]) -> Result<u32> {
    codecs.iter().try_fold(CODEC_NONE, |mask, codec| {
        key_systems
            .codec_mask(codec)
            .map(|bit| mask | bit)
            .ok_or_else(|| anyhow!("Unknown codec {}.", codec))
    })
}
