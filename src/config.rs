use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{GmailError, Result};
use crate::rules::{
    KeywordRule, RuleSet, SpamRule, DEFAULT_LABEL_KEYWORDS, DEFAULT_SPAM_KEYWORDS,
    DEFAULT_SPAM_LABEL, DEFAULT_SPAM_SENDERS,
};

/// Gmail's upper bound for `messages.list` page size
pub const MAX_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub spam: SpamConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Content rules, evaluated in this order
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            spam: SpamConfig::default(),
            labels: LabelConfig::default(),
            execution: ExecutionConfig::default(),
            rules: default_rules(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Gmail search query; empty means no filter
    #[serde(default)]
    pub query: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            query: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_spam_label")]
    pub label: String,
    #[serde(default = "default_spam_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_spam_senders")]
    pub senders: Vec<String>,
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: default_spam_label(),
            keywords: default_spam_keywords(),
            senders: default_spam_senders(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub label: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Keep a label-name → id map for the duration of a run
    #[serde(default = "default_true")]
    pub cache: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self { cache: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub dry_run: bool,
    /// Abort the whole run on the first per-message failure
    #[serde(default)]
    pub abort_on_error: bool,
}

fn default_max_results() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_spam_label() -> String {
    DEFAULT_SPAM_LABEL.to_string()
}

fn default_spam_keywords() -> Vec<String> {
    DEFAULT_SPAM_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

fn default_spam_senders() -> Vec<String> {
    DEFAULT_SPAM_SENDERS.iter().map(|s| s.to_string()).collect()
}

fn default_rules() -> Vec<RuleConfig> {
    DEFAULT_LABEL_KEYWORDS
        .iter()
        .map(|(label, keywords)| RuleConfig {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GmailError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| GmailError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    GmailError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| GmailError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| GmailError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scan.max_results == 0 {
            return Err(GmailError::ConfigError(
                "scan.max_results must be at least 1".to_string(),
            ));
        }
        if self.scan.max_results > MAX_PAGE_SIZE {
            return Err(GmailError::ConfigError(format!(
                "scan.max_results cannot exceed {}",
                MAX_PAGE_SIZE
            )));
        }

        let mut seen = HashSet::new();

        if self.spam.enabled {
            if self.spam.label.trim().is_empty() {
                return Err(GmailError::ConfigError(
                    "spam.label cannot be empty".to_string(),
                ));
            }
            if self.spam.keywords.is_empty() && self.spam.senders.is_empty() {
                return Err(GmailError::ConfigError(
                    "spam filter is enabled but has neither keywords nor senders".to_string(),
                ));
            }
            if self.spam.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(GmailError::ConfigError(
                    "spam.keywords cannot contain empty strings".to_string(),
                ));
            }
            if self.spam.senders.iter().any(|s| s.trim().is_empty()) {
                return Err(GmailError::ConfigError(
                    "spam.senders cannot contain empty strings".to_string(),
                ));
            }
            seen.insert(self.spam.label.trim().to_lowercase());
        }

        for (index, rule) in self.rules.iter().enumerate() {
            let label = rule.label.trim();
            if label.is_empty() {
                return Err(GmailError::ConfigError(format!(
                    "rules[{}].label cannot be empty",
                    index
                )));
            }
            if rule.keywords.is_empty() {
                return Err(GmailError::ConfigError(format!(
                    "rule '{}' must have at least one keyword",
                    label
                )));
            }
            if rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(GmailError::ConfigError(format!(
                    "rule '{}' cannot contain empty keywords",
                    label
                )));
            }
            if !seen.insert(label.to_lowercase()) {
                return Err(GmailError::ConfigError(format!(
                    "duplicate label '{}' (label names are case-insensitive)",
                    label
                )));
            }
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Build the immutable rule table injected into the classifier
    pub fn rule_set(&self) -> RuleSet {
        let rules = self
            .rules
            .iter()
            .map(|rule| KeywordRule::new(rule.label.trim(), &rule.keywords))
            .collect();

        let spam = self.spam.enabled.then(|| {
            SpamRule::new(self.spam.label.trim(), &self.spam.keywords, &self.spam.senders)
        });

        RuleSet::new(rules, spam)
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}
