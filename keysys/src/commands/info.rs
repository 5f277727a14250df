use anyhow::Result;
use clap::Args;
use colored::Colorize;
use eme_keysys::{KeySystems, codecs::InitDataType};

/// Show what is known about a key system.
#[derive(Debug, Clone, Args)]
pub struct Info {
    /// Key system name, e.g. org.w3.clearkey.
    #[arg(required = true)]
    key_system: String,
}

impl Info {
    pub fn execute(self, key_systems: &KeySystems) -> Result<bool> {
        let name = &self.key_system;

        let Some(concrete) = key_systems.concrete_key_system_name(name) else {
            println!("{} is {}", name.bold(), "not supported".red());
            return Ok(false);
        };

        if &concrete == name {
            println!("{} is a {} key system", name.bold(), "concrete".green());
        } else {
            println!(
                "{} is a {} of {}",
                name.bold(),
                "parent".yellow(),
                concrete.bold()
            );
        }

        println!("  uma name      : {}", key_systems.key_system_name_for_uma(name));

        if &concrete == name {
            let decryptor = if key_systems.can_use_aes_decryptor(name) {
                "aes".to_owned()
            } else {
                format!("external ({})", key_systems.external_decryptor_type(name))
            };
            println!("  decryptor     : {}", decryptor);
        }

        println!("  codecs        : {}", key_systems.codec_names(name).join(", "));
        println!(
            "  init data     : {}",
            InitDataType::ALL
                .iter()
                .filter(|x| key_systems.is_supported_key_system_with_init_data_type(name, x.as_str()))
                .map(|x| x.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(true)
    }
}
