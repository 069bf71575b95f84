//! Init command implementation.

use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the init command: write a default configuration file and create the
/// knowledge directory if they do not exist yet.
pub fn run_init(settings: &Settings) -> Result<()> {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!(
            "Configuration already exists at {}",
            config_path.display()
        ));
    } else {
        settings.save()?;
        Output::success(&format!("Wrote configuration to {}", config_path.display()));
    }

    let knowledge_dir = settings.knowledge_dir();
    if !knowledge_dir.is_dir() {
        std::fs::create_dir_all(&knowledge_dir)?;
        Output::success(&format!(
            "Created knowledge directory {}",
            knowledge_dir.display()
        ));
    }

    Output::info("Drop markdown documents into the knowledge directory, then run `hente build`.");
    Ok(())
}
