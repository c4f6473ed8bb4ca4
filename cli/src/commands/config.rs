// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use enactor_cortex::domain::AgentConfigManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the resolved manifest as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./enactor-config.yaml)
        #[arg(short, long, default_value = "./enactor-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = AgentConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. ENACTOR_CONFIG_PATH: {}",
            std::env::var("ENACTOR_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./enactor-config.yaml");
        println!("  4. ~/.enactor/config.yaml");
        println!("  5. /etc/enactor/config.yaml");
        println!();
    }

    if as_yaml {
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        print!("{}", yaml);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Agent:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    println!("{}", "Innate repertoire:".bold());
    for primitive in &config.spec.repertoire {
        println!(
            "  {}{}  {:>4}",
            primitive.action.bold(),
            primitive.result,
            primitive.satisfaction
        );
    }
    println!();

    let learning = &config.spec.learning;
    println!("{}", "Learning:".bold());
    println!("  Activation threshold: {}", learning.activation_threshold);
    println!("  Primitive weight: {}", learning.primitive_weight);
    println!("  Reinforcement increment: {}", learning.reinforcement_increment);
    println!("  Max pattern length: {}", learning.max_pattern_length);
    println!();

    println!("{}", "Selection:".bold());
    match config.spec.selection.seed {
        Some(seed) => println!("  Seed: {}", seed),
        None => println!("  Seed: {}", "(random)".dimmed()),
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = AgentConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = template(with_examples);

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

fn template(with_examples: bool) -> &'static str {
    if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_valid_manifests() {
        for with_examples in [false, true] {
            let manifest = AgentConfigManifest::from_yaml_str(template(with_examples)).unwrap();
            manifest.validate().unwrap();
            assert_eq!(manifest.spec.repertoire.len(), 10);
        }
    }

    #[test]
    fn test_example_template_sets_seed() {
        let manifest = AgentConfigManifest::from_yaml_str(template(true)).unwrap();
        assert_eq!(manifest.spec.selection.seed, Some(42));
        assert_eq!(manifest.metadata.name, "small-loop-agent");
    }

    #[tokio::test]
    async fn test_generate_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("enactor-config.yaml");

        generate(output.clone(), false).await.unwrap();

        let manifest = AgentConfigManifest::from_yaml_file(&output).unwrap();
        assert_eq!(manifest.spec.repertoire[0].action, ">");
    }
}
