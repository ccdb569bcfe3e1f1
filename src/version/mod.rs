//! Resolution of the targeted FactoryBot version.
//!
//! Priority: explicit configuration, then the resolved `specs:` entry of the
//! project's lock file, then [`EffectiveVersion::DEFAULT`]. Resolution happens
//! at most once per [`TargetFactoryBotVersion`] instance.

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Lock file names searched in the project root, first found wins
pub const LOCK_FILE_NAMES: &[&str] = &["Gemfile.lock", "gems.locked"];

pub const GEM_NAME: &str = "factory_bot";

static VERSION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)(?:\.(\d+))?").expect("valid regex"));

static SPEC_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {4}(\S+) \(([^)]+)\)\s*$").expect("valid regex"));

/// A `major.minor` version, compared numerically (`6.10 > 6.9`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EffectiveVersion {
    pub major: u32,
    pub minor: u32,
}

impl EffectiveVersion {
    pub const DEFAULT: EffectiveVersion = EffectiveVersion { major: 6, minor: 0 };

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Reduce a version string to its first two components: `"6.2.1"` is 6.2
    ///
    /// Components are integers, not a decimal fraction: `"6.05"` is 6.5 and
    /// `"6.10"` sorts after `"6.9"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = VERSION_PREFIX.captures(raw)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        Some(Self { major, minor })
    }

    pub fn as_f64(&self) -> f64 {
        format!("{}.{}", self.major, self.minor)
            .parse()
            .unwrap_or(self.major as f64)
    }
}

impl fmt::Display for EffectiveVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Capability injected into version-sensitive rules
pub trait VersionGate: Send + Sync {
    fn resolve(&self) -> EffectiveVersion;

    fn supports(&self, threshold: EffectiveVersion) -> bool {
        self.resolve() >= threshold
    }
}

/// A gate pinned to one version
#[derive(Debug, Clone, Copy)]
pub struct FixedVersion(pub EffectiveVersion);

impl VersionGate for FixedVersion {
    fn resolve(&self) -> EffectiveVersion {
        self.0
    }
}

/// Effective FactoryBot version for one project root
#[derive(Debug)]
pub struct TargetFactoryBotVersion {
    configured: Option<String>,
    root: PathBuf,
    resolved: OnceCell<EffectiveVersion>,
}

impl TargetFactoryBotVersion {
    pub fn new(configured: Option<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            configured,
            root: root.into(),
            resolved: OnceCell::new(),
        }
    }

    fn compute(&self) -> EffectiveVersion {
        if let Some(raw) = self.configured.as_deref() {
            match EffectiveVersion::parse(raw) {
                Some(v) => {
                    tracing::debug!(version = %v, "using configured TargetFactoryBotVersion");
                    return v;
                }
                None => tracing::debug!(raw, "configured TargetFactoryBotVersion is not a version"),
            }
        }
        if let Some(v) = version_from_lock_files(&self.root) {
            tracing::debug!(version = %v, root = %self.root.display(), "resolved version from lock file");
            return v;
        }
        tracing::debug!(version = %EffectiveVersion::DEFAULT, "falling back to default version");
        EffectiveVersion::DEFAULT
    }
}

impl VersionGate for TargetFactoryBotVersion {
    fn resolve(&self) -> EffectiveVersion {
        *self.resolved.get_or_init(|| self.compute())
    }
}

fn version_from_lock_files(root: &Path) -> Option<EffectiveVersion> {
    let path = LOCK_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())?;
    match std::fs::read_to_string(&path) {
        Ok(text) => locked_version(&text, GEM_NAME),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read lock file");
            None
        }
    }
}

/// Version of `gem` among the resolved `specs:` entries of a lock file.
///
/// Only 4-space indented `name (version)` lines inside a `specs:` section
/// count; requirement lines under `DEPENDENCIES` are ignored.
pub fn locked_version(lock_text: &str, gem: &str) -> Option<EffectiveVersion> {
    let mut in_specs = false;
    for line in lock_text.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with(' ') {
            // section header such as GEM, PATH, DEPENDENCIES
            in_specs = false;
            continue;
        }
        if trimmed.trim() == "specs:" {
            in_specs = true;
            continue;
        }
        if !in_specs {
            continue;
        }
        if let Some(caps) = SPEC_ENTRY.captures(trimmed) {
            if &caps[1] == gem {
                return EffectiveVersion::parse(&caps[2]);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = "GEM
  remote: https://rubygems.org/
  specs:
    activesupport (7.1.3)
      concurrent-ruby (~> 1.0)
    factory_bot (6.2.0)
      activesupport (>= 5.0.0)
    factory_bot_rails (6.4.3)
      factory_bot (~> 6.4)

PLATFORMS
  ruby

DEPENDENCIES
  factory_bot (~> 6.4)
";

    #[test]
    fn parses_first_two_components() {
        assert_eq!(EffectiveVersion::parse("6.2.1"), Some(EffectiveVersion::new(6, 2)));
        assert_eq!(EffectiveVersion::parse("100.22.33"), Some(EffectiveVersion::new(100, 22)));
        assert_eq!(EffectiveVersion::parse("7"), Some(EffectiveVersion::new(7, 0)));
        assert_eq!(EffectiveVersion::parse("6.05"), Some(EffectiveVersion::new(6, 5)));
        assert_eq!(EffectiveVersion::parse("latest"), None);
    }

    #[test]
    fn comparison_is_numeric() {
        assert!(EffectiveVersion::new(6, 10) > EffectiveVersion::new(6, 9));
        assert_eq!(EffectiveVersion::new(6, 1).to_string(), "6.1");
        assert!((EffectiveVersion::new(6, 1).as_f64() - 6.1).abs() < f64::EPSILON);
    }

    #[test]
    fn lock_file_uses_specs_entry_only() {
        assert_eq!(locked_version(LOCK, GEM_NAME), Some(EffectiveVersion::new(6, 2)));
    }

    #[test]
    fn dependencies_section_is_ignored() {
        let text = "GEM\n  specs:\n    rails (7.1.0)\n\nDEPENDENCIES\n  factory_bot (6.4.0)\n";
        assert_eq!(locked_version(text, GEM_NAME), None);
    }

    #[test]
    fn fixed_gate_supports_threshold() {
        let gate = FixedVersion(EffectiveVersion::new(6, 1));
        assert!(gate.supports(EffectiveVersion::new(6, 1)));
        assert!(!gate.supports(EffectiveVersion::new(6, 2)));
    }
}
