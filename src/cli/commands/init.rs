//! Init command handler

use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings.");
        println!();
        println!("Before going live:");
        println!("  - log in with admin / admin123 and rotate the credentials");
        println!("  - set server.cors_allowed_origins to your storefront origin");
    } else {
        println!("config.toml already exists, leaving it untouched.");
    }
    Ok(())
}
