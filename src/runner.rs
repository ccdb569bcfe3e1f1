//! Per-file inspection and the autocorrect loop
use anyhow::{Context, Result};
use globset::GlobSet;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::ast::languages::parse_ruby;
use crate::analysis::ast::visitor::RuleVisitor;
use crate::config::{should_ignore_path, Config};
use crate::correction::{apply_corrections, Correction};
use crate::rules::{build_rules, Offense, Rule, RuleContext};
use crate::version::{TargetFactoryBotVersion, VersionGate};

/// Upper bound on inspect/apply rounds in one autocorrect run
pub const MAX_CORRECTION_PASSES: usize = 10;

const RUBY_EXTENSIONS: &[&str] = &["rb", "rake", "gemspec"];

/// Outcome of [`Linter::autocorrect`]
#[derive(Debug, Clone)]
pub struct Corrected {
    pub output: String,
    /// Inspect/apply rounds that changed the buffer
    pub passes: usize,
    /// Offenses left in `output`
    pub remaining: Vec<Offense>,
}

/// Result for one file on disk
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub offenses: Vec<Offense>,
    pub corrected: bool,
}

/// The configured rule set
pub struct Linter {
    rules: Vec<Box<dyn Rule>>,
}

impl Linter {
    pub fn new(config: &Config, gate: Arc<dyn VersionGate>) -> Result<Self> {
        let rules = build_rules(config, gate)?;
        tracing::debug!(rules = rules.len(), "linter ready");
        Ok(Self { rules })
    }

    /// Linter whose version gate resolves against the lock files under `project_root`
    pub fn for_project(config: &Config, project_root: &Path) -> Result<Self> {
        let gate = TargetFactoryBotVersion::new(config.target_version(), project_root);
        Self::new(config, Arc::new(gate))
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Offenses of every enabled rule, ordered by position
    pub fn inspect(&self, source: &str) -> Result<Vec<Offense>> {
        if source.trim().is_empty() {
            return Ok(Vec::new());
        }
        let parsed = parse_ruby(source)?;
        let mut ctx = RuleContext::new(parsed.source);
        RuleVisitor::new(&self.rules).visit(parsed.root(), &mut ctx);
        Ok(ctx.into_offenses())
    }

    /// Apply corrections until none applies or [`MAX_CORRECTION_PASSES`] is reached
    pub fn autocorrect(&self, source: &str) -> Result<Corrected> {
        let mut current = source.to_string();
        let mut passes = 0;

        while passes < MAX_CORRECTION_PASSES {
            let offenses = self.inspect(&current)?;
            let corrections: Vec<Correction> = offenses.into_iter().filter_map(|o| o.correction).collect();
            if corrections.is_empty() {
                break;
            }
            let applied = apply_corrections(&current, &corrections)?;
            if applied.applied.is_empty() || applied.output == current {
                break;
            }
            tracing::debug!(
                pass = passes + 1,
                applied = applied.applied.len(),
                conflicts = applied.conflicts.len(),
                "correction pass"
            );
            current = applied.output;
            passes += 1;
        }

        let remaining = self.inspect(&current)?;
        Ok(Corrected {
            output: current,
            passes,
            remaining,
        })
    }

    /// Inspect one file, rewriting it in place when `autocorrect` is set
    pub fn lint_file(&self, path: &Path, autocorrect: bool) -> Result<FileReport> {
        let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        if !autocorrect {
            let offenses = self.inspect(&source).with_context(|| format!("failed to analyze {}", path.display()))?;
            return Ok(FileReport {
                path: path.to_path_buf(),
                offenses,
                corrected: false,
            });
        }

        let result = self
            .autocorrect(&source)
            .with_context(|| format!("failed to correct {}", path.display()))?;
        let corrected = result.output != source;
        if corrected {
            std::fs::write(path, &result.output).with_context(|| format!("failed to write {}", path.display()))?;
        }
        Ok(FileReport {
            path: path.to_path_buf(),
            offenses: result.remaining,
            corrected,
        })
    }

    /// Lint files in parallel; every file is analyzed independently
    pub fn lint_files(&self, files: &[PathBuf], autocorrect: bool) -> Vec<(PathBuf, Result<FileReport>)> {
        use rayon::prelude::*;

        files
            .par_iter()
            .map(|path| (path.clone(), self.lint_file(path, autocorrect)))
            .collect()
    }
}

/// Ruby files under `paths`, directories walked recursively, excluded globs skipped
pub fn collect_ruby_files(paths: &[PathBuf], exclude: Option<&GlobSet>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_files_recursive(path, &mut files, exclude)?;
        } else if !should_ignore_path(exclude, path) {
            files.push(path.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>, exclude: Option<&GlobSet>) -> Result<()> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;

    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read directory entry in {}", dir.display()))?
            .path();
        if should_ignore_path(exclude, &path) {
            tracing::debug!(path = %path.display(), "excluded by configuration");
            continue;
        }
        if path.is_dir() {
            collect_files_recursive(&path, files, exclude)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| RUBY_EXTENSIONS.contains(&ext))
        {
            files.push(path);
        }
    }

    Ok(())
}
