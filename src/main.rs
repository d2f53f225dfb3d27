mod args;

use anyhow::{Context, Result};
use clap::Parser;
use keyed_container::logging::{init_logging, LoggingConfig};
use keyed_container::{Container, ManifestLoader};
use serde_json::json;
use std::path::Path;

use crate::args::{Args, Command};

fn main() -> Result<()> {
    let args = Args::parse();

    let logging = if args.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::production()
    };
    init_logging(logging).map_err(|e| anyhow::anyhow!(e))?;

    match args.command {
        Command::Inspect { manifest, json } => handle_inspect(&manifest, json),
        Command::Get { manifest, key } => handle_get(&manifest, &key),
    }
}

fn load_container(manifest: &Path) -> Result<Container> {
    let path = manifest.to_string_lossy();
    let manifest = ManifestLoader::new()
        .load(&path)
        .with_context(|| format!("Failed to load manifest {}", path))?;

    Container::with_config(manifest.into_config())
        .with_context(|| format!("Failed to configure container from {}", path))
}

fn handle_inspect(manifest: &Path, as_json: bool) -> Result<()> {
    let container = load_container(manifest)?;
    let keys = container.keys();
    let aliases = container.aliases();

    if as_json {
        let aliases: serde_json::Map<String, serde_json::Value> = aliases
            .into_iter()
            .map(|(alias, terminal)| (alias, json!(terminal)))
            .collect();
        let output = json!({
            "shared_by_default": container.shared_by_default(),
            "keys": keys,
            "aliases": aliases,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("shared_by_default: {}", container.shared_by_default());
    println!("keys:");
    for key in &keys {
        let shared = if container.is_shared(key) { "shared" } else { "not shared" };
        println!("  {} ({})", key, shared);
    }
    println!("aliases:");
    for (alias, terminal) in &aliases {
        let status = if container.has(alias) { "" } else { " [missing]" };
        println!("  {} -> {}{}", alias, terminal, status);
    }
    Ok(())
}

fn handle_get(manifest: &Path, key: &str) -> Result<()> {
    let container = load_container(manifest)?;
    let value = container.get_as::<toml::Value>(key).map_err(|e| {
        let message = if e.key() == key {
            format!("Failed to resolve '{}'", key)
        } else {
            format!("Failed to resolve '{}' (at '{}')", key, e.key())
        };
        anyhow::Error::new(e).context(message)
    })?;

    match value.as_ref() {
        toml::Value::String(s) => println!("{}", s),
        other => println!("{}", other),
    }
    Ok(())
}
