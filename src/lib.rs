//! Static analysis and autocorrection for FactoryBot definitions in Ruby code.
//!
//! Source is parsed with Tree-sitter, every enabled rule inspects the nodes it
//! subscribes to, and corrections are staged as text edits that are applied
//! in one pass per round.

/// Ruby syntax tree access: parsing, node helpers, matchers and traversal
pub mod analysis;

/// Configuration file model and loading
pub mod config;

/// Edit lists and their application
pub mod correction;

/// The lint rules and their registry
pub mod rules;

/// Inspection and autocorrect entry points
pub mod runner;

/// Target FactoryBot version resolution
pub mod version;

// Re-export commonly used types for convenience
pub use analysis::ast::AstError;
pub use config::{load_config, Config, ConfigError};
pub use correction::{apply_corrections, Correction, CorrectionError, Corrector, Span};
pub use rules::{Offense, Rule};
pub use runner::{collect_ruby_files, Corrected, FileReport, Linter};
pub use version::{EffectiveVersion, FixedVersion, TargetFactoryBotVersion, VersionGate};
