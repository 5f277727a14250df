use anyhow::Result;
use clap::Args;
use colored::Colorize;
use eme_keysys::KeySystems;

/// List concrete key systems.
#[derive(Debug, Clone, Args)]
pub struct List {
    /// Print key system descriptors in json format.
    #[arg(long)]
    json: bool,
}

impl List {
    pub fn execute(self, key_systems: &KeySystems) -> Result<()> {
        let descriptors = key_systems
            .key_system_names()
            .iter()
            .filter_map(|x| key_systems.descriptor(x))
            .collect::<Vec<_>>();

        if self.json {
            serde_json::to_writer_pretty(std::io::stdout(), &descriptors)?;
            println!();
            return Ok(());
        }

        for descriptor in descriptors {
            let decryptor = if descriptor.use_aes_decryptor {
                "aes".to_owned()
            } else {
                format!(
                    "external ({})",
                    descriptor.external_type.as_deref().unwrap_or("unspecified")
                )
            };

            println!(
                "{} {} {}",
                descriptor.name.bold().green(),
                decryptor,
                descriptor
                    .uma_name
                    .as_deref()
                    .map(|x| format!("[{}]", x))
                    .unwrap_or_default()
                    .dimmed()
            );
        }

        Ok(())
    }
}
