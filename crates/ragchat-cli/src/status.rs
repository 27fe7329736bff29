//! `ragchat status` — show configuration and store reachability.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use ragchat_core::config::{get_config_path, Config};
use ragchat_core::store::SessionStore;
use ragchat_store::HttpSessionStore;

/// Run the status command.
pub async fn run(config: &Config, config_path: Option<&Path>) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "💬 ragchat Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );
    println!("  {:<18} {}", "Store:".bold(), config.store.base_url);
    println!(
        "  {:<18} {}",
        "Timeout:".bold(),
        format!("{}s", config.store.timeout_secs).dimmed()
    );
    println!("  {:<18} {}", "Locale:".bold(), config.chat.locale.code());

    let reachability = match HttpSessionStore::from_config(&config.store) {
        Ok(store) => match store.list_sessions().await {
            Ok(ids) => format!("{} ({} sessions)", "✓ reachable".green(), ids.len()),
            Err(e) => format!("{} {}", "✗".red(), e.to_string().dimmed()),
        },
        Err(e) => format!("{} {}", "✗".red(), e.to_string().dimmed()),
    };
    println!("  {:<18} {}", "Reachable:".bold(), reachability);
    println!();

    Ok(())
}
