//! `hearth config`: configuration inspection commands.

use hearth_config::AppConfig;
use hearth_config::proposal::{self, ConfigProposal};
use std::path::Path;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.similarity.api_key.is_some() {
        config.similarity.api_key = Some("[REDACTED]".into());
    }
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

pub async fn triage(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let proposals: Vec<ConfigProposal> = serde_json::from_str(&text)?;
    let triaged = proposal::triage(proposals);

    println!("🗂️  {} proposal(s)", triaged.len());
    print_group("Auto-apply", &triaged.auto_apply);
    print_group("Needs approval", &triaged.pending_approval);
    print_group("Rejected", &triaged.rejected);
    Ok(())
}

fn print_group(title: &str, items: &[ConfigProposal]) {
    println!();
    println!("  {title} ({})", items.len());
    for p in items {
        println!("    {}.{} = {}", p.target, p.field, p.value);
    }
}
