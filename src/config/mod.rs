//! Configuration: a RuboCop-shaped YAML file plus environment overrides
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Path of the configuration file
pub const CONFIG_ENV: &str = "FACTORY_LINT_CONFIG";
/// Overrides `AllCops.TargetFactoryBotVersion`
pub const TARGET_VERSION_ENV: &str = "FACTORY_LINT_TARGET_VERSION";
pub const DEFAULT_CONFIG_FILE: &str = ".factory-lint.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{rule}: unsupported EnforcedStyle `{style}` (expected one of: {expected})")]
    InvalidStyle {
        rule: String,
        style: String,
        expected: String,
    },

    #[error("invalid exclude pattern `{pattern}`: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Prefix of the sections this crate reads; other sections are ignored
pub const RULE_PREFIX: &str = "FactoryBot/";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub all_cops: AllCops,
    /// Per-rule sections keyed by `FactoryBot/<Rule>`
    pub rules: BTreeMap<String, RuleConfig>,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(rename = "AllCops", default)]
    all_cops: AllCops,
    #[serde(flatten)]
    sections: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllCops {
    #[serde(default)]
    pub target_factory_bot_version: Option<VersionSetting>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `TargetFactoryBotVersion` may be written as a string or a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VersionSetting {
    Text(String),
    Number(serde_yaml::Number),
}

impl VersionSetting {
    pub fn as_string(&self) -> String {
        match self {
            VersionSetting::Text(s) => s.clone(),
            VersionSetting::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleConfig {
    pub enabled: Option<bool>,
    pub enforced_style: Option<String>,
    #[serde(default)]
    pub non_implicit_association_method_names: Vec<String>,
    #[serde(default)]
    pub explicit_only: bool,
    pub max_amount: Option<i64>,
    pub reserved_methods: Option<Vec<String>>,
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawConfig = serde_yaml::from_str(text)?;
        let mut rules = BTreeMap::new();
        for (name, section) in raw.sections {
            if !name.starts_with(RULE_PREFIX) {
                continue;
            }
            let rule = if section.is_null() {
                RuleConfig::default()
            } else {
                serde_yaml::from_value(section)?
            };
            rules.insert(name, rule);
        }
        Ok(Self {
            all_cops: raw.all_cops,
            rules,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Settings of one rule; absent sections read as defaults
    pub fn rule(&self, name: &str) -> RuleConfig {
        self.rules.get(name).cloned().unwrap_or_default()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.rules
            .get(name)
            .and_then(|r| r.enabled)
            .unwrap_or(true)
    }

    pub fn target_version(&self) -> Option<String> {
        self.all_cops
            .target_factory_bot_version
            .as_ref()
            .map(VersionSetting::as_string)
    }

    pub fn exclude_set(&self) -> Result<Option<GlobSet>, ConfigError> {
        if self.all_cops.exclude.is_empty() {
            return Ok(None);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.all_cops.exclude {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: self.all_cops.exclude.join(", "),
            source,
        })?;
        Ok(Some(set))
    }

    /// Resolve the style of `rule` against its supported styles; the first one is the default
    pub fn enforced_style<'a>(&self, rule: &str, supported: &[&'a str]) -> Result<&'a str, ConfigError> {
        let default = supported.first().copied().unwrap_or_default();
        let Some(configured) = self.rule(rule).enforced_style else {
            return Ok(default);
        };
        supported
            .iter()
            .copied()
            .find(|s| *s == configured)
            .ok_or_else(|| ConfigError::InvalidStyle {
                rule: rule.to_string(),
                style: configured,
                expected: supported.join(", "),
            })
    }
}

/// Load configuration: explicit path, else `FACTORY_LINT_CONFIG`, else
/// `.factory-lint.yml` when present. Environment overrides apply last.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let from_env = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
    let mut cfg = match explicit.map(Path::to_path_buf).or(from_env) {
        Some(path) => Config::from_file(&path)?,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                Config::from_file(fallback)?
            } else {
                Config::default()
            }
        }
    };

    if let Ok(val) = std::env::var(TARGET_VERSION_ENV) {
        let val = val.trim();
        if !val.is_empty() {
            cfg.all_cops.target_factory_bot_version = Some(VersionSetting::Text(val.to_string()));
        }
    }

    Ok(cfg)
}

pub fn should_ignore_path(set: Option<&GlobSet>, path: &Path) -> bool {
    set.map(|s| s.is_match(path)).unwrap_or(false)
}
