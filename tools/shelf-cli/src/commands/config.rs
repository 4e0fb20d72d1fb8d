//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force, base_url } => init_config(force, &base_url, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let config = &ctx.config;

    println!();
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &config.api.base_url);
    ctx.output.kv("search_path", &config.api.search_path);
    ctx.output.kv("timeout_ms", &config.api.timeout_ms.to_string());
    ctx.output.kv("connect_timeout_ms", &config.api.connect_timeout_ms.to_string());

    println!();
    ctx.output.info("[log]");
    ctx.output.kv("level", &config.log.level);
    ctx.output.kv("format", &format!("{:?}", config.log.format).to_lowercase());

    println!();
    ctx.output.info("[shop]");
    ctx.output.kv("fresh_secs", &config.shop.fresh_secs.to_string());
    ctx.output.kv("keep_secs", &config.shop.keep_secs.to_string());

    Ok(())
}

fn init_config(force: bool, base_url: &str, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config(base_url))
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
