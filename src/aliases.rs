use anyhow::{Context, Result};

use crate::git;

const BINARY: &str = "bushy";
const COMMANDS: [&str; 4] = ["feature", "bug", "chore", "finish"];

/// `alias.<command>` entries that route `git <command>` through bushy.
pub fn alias_entries() -> Vec<(String, String)> {
    COMMANDS
        .iter()
        .map(|command| (format!("alias.{command}"), format!("!{BINARY} {command}")))
        .collect()
}

pub fn install(global: bool) -> Result<()> {
    for (key, value) in alias_entries() {
        git::config_set(global, &key, &value)
            .with_context(|| format!("failed to install {key}"))?;
        println!("Installed {key} = {value}");
    }
    if global {
        println!("Aliases written to the global git config");
    } else {
        println!("Aliases written to this repository's git config (use --global for all repositories)");
    }
    Ok(())
}
