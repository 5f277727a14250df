use anyhow::Result;
use clap::Args;
use colored::Colorize;
use eme_keysys::KeySystems;

/// Check whether a key system supports a container, codecs and init data type.
#[derive(Debug, Clone, Args)]
pub struct Query {
    /// Key system name, e.g. org.w3.clearkey.
    #[arg(required = true)]
    key_system: String,

    /// Container MIME type, e.g. video/webm.
    /// When omitted only the key system itself is checked.
    #[arg(short = 't', long = "type", value_name = "MIME", default_value = "")]
    mime_type: String,

    /// Comma separated codec list, e.g. vp8,vorbis.
    #[arg(long, value_delimiter = ',')]
    codecs: Vec<String>,

    /// Initialization data type (webm, cenc or keyids).
    #[arg(long, value_name = "TYPE")]
    init_data_type: Option<String>,
}

impl Query {
    pub fn execute(self, key_systems: &KeySystems) -> Result<bool> {
        let mut supported = key_systems.is_supported_key_system_with_media_mime_type(
            &self.mime_type,
            self.codecs.as_slice(),
            &self.key_system,
        );

        if let Some(init_data_type) = &self.init_data_type {
            supported &= key_systems
                .is_supported_key_system_with_init_data_type(&self.key_system, init_data_type);
        }

        println!(
            "{} {}",
            self.key_system.bold(),
            if supported {
                "supported".green()
            } else {
                "not supported".red()
            }
        );

        Ok(supported)
    }
}
