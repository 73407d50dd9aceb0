//! Print the effective configuration, including environment overrides.

use anyhow::{Context, Result};
use std::path::Path;

use super::load;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}
