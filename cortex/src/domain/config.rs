// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent Configuration Types
//
// Defines the configuration schema for an enactive agent, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - The innate repertoire of primitive interactions
// - Learning parameters (activation threshold, weights, pattern length bound)
// - Selection parameters (tie-break seed)

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::registry::{validate_symbol, DEFAULT_PRIMITIVE_WEIGHT};

pub const API_VERSION: &str = "enactor/v1";
pub const KIND: &str = "AgentConfig";

/// Top-level Kubernetes-style agent configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfigManifest {
    /// API version (must be "enactor/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "AgentConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: AgentConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable agent name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Agent configuration specification (content under spec:)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfigSpec {
    /// Primitive interactions the agent is born with
    #[serde(default = "default_repertoire")]
    pub repertoire: Vec<PrimitiveInteraction>,

    #[serde(default)]
    pub learning: LearningConfig,

    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveInteraction {
    pub action: String,
    pub result: String,
    pub satisfaction: i64,
}

impl PrimitiveInteraction {
    pub fn new(action: &str, result: &str, satisfaction: i64) -> Self {
        Self {
            action: action.to_string(),
            result: result.to_string(),
            satisfaction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningConfig {
    /// A schema must weigh strictly more than this to propose its intention
    /// or to stream into the base-context pass
    #[serde(default = "default_activation_threshold")]
    pub activation_threshold: i64,

    /// Initial weight of primitive patterns
    #[serde(default = "default_primitive_weight")]
    pub primitive_weight: i64,

    /// Weight added to a composite each time it is reinforced
    #[serde(default = "default_reinforcement_increment")]
    pub reinforcement_increment: i64,

    /// Composites longer than this are never learned
    #[serde(default = "default_max_pattern_length")]
    pub max_pattern_length: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            activation_threshold: default_activation_threshold(),
            primitive_weight: default_primitive_weight(),
            reinforcement_increment: default_reinforcement_increment(),
            max_pattern_length: default_max_pattern_length(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Seed of the tie-break generator; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_activation_threshold() -> i64 {
    1
}

fn default_primitive_weight() -> i64 {
    DEFAULT_PRIMITIVE_WEIGHT
}

fn default_reinforcement_increment() -> i64 {
    1
}

fn default_max_pattern_length() -> usize {
    6
}

/// The "small loop" repertoire: step forward, turn, and feel around.
pub fn default_repertoire() -> Vec<PrimitiveInteraction> {
    vec![
        PrimitiveInteraction::new(">", "t", 5),
        PrimitiveInteraction::new(">", "f", -10),
        PrimitiveInteraction::new("^", "t", -3),
        PrimitiveInteraction::new("v", "t", -3),
        PrimitiveInteraction::new("-", "t", -1),
        PrimitiveInteraction::new("-", "f", -1),
        PrimitiveInteraction::new("/", "t", -1),
        PrimitiveInteraction::new("/", "f", -1),
        PrimitiveInteraction::new("\\", "t", -1),
        PrimitiveInteraction::new("\\", "f", -1),
    ]
}

impl Default for AgentConfigSpec {
    fn default() -> Self {
        Self {
            repertoire: default_repertoire(),
            learning: LearningConfig::default(),
            selection: SelectionConfig::default(),
        }
    }
}

impl Default for AgentConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "enactor-agent".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: AgentConfigSpec::default(),
        }
    }
}

impl AgentConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. ENACTOR_CONFIG_PATH environment variable
    /// 2. ./enactor-config.yaml (working directory)
    /// 3. ~/.enactor/config.yaml (user home)
    /// 4. /etc/enactor/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("ENACTOR_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./enactor-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".enactor").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/enactor/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load from an explicit path (failing if missing or invalid), else from
    /// the discovered path, else built-in defaults.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ENACTOR_SEED") {
            match val.parse::<u64>() {
                Ok(seed) => {
                    tracing::info!("Environment override: ENACTOR_SEED={}", seed);
                    self.spec.selection.seed = Some(seed);
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for ENACTOR_SEED: '{}'. Expected u64. Ignoring.",
                        val
                    );
                }
            }
        }

        if let Ok(val) = std::env::var("ENACTOR_ACTIVATION_THRESHOLD") {
            match val.parse::<i64>() {
                Ok(threshold) => {
                    tracing::info!(
                        "Environment override: ENACTOR_ACTIVATION_THRESHOLD={}",
                        threshold
                    );
                    self.spec.learning.activation_threshold = threshold;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for ENACTOR_ACTIVATION_THRESHOLD: '{}'. Expected integer. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.repertoire.is_empty() {
            anyhow::bail!("spec.repertoire must define at least one primitive interaction");
        }

        for primitive in &self.spec.repertoire {
            for symbol in [&primitive.action, &primitive.result] {
                validate_symbol(symbol).context("spec.repertoire")?;
            }
        }

        if self.spec.learning.reinforcement_increment <= 0 {
            anyhow::bail!("spec.learning.reinforcement_increment must be positive");
        }

        if self.spec.learning.max_pattern_length < 2 {
            anyhow::bail!("spec.learning.max_pattern_length must be at least 2");
        }

        Ok(())
    }
}
