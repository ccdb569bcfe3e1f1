//! Rule framework: the [`Rule`] trait, offense records and the rule registry
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tree_sitter::Node;

use crate::config::{Config, ConfigError};
use crate::correction::{Correction, Span};
use crate::version::VersionGate;

pub mod language;

pub mod association_style;
pub mod consistent_parentheses_style;
pub mod create_list;
pub mod excessive_create_list;
pub mod exclusive_traits;
pub mod factory_association_with_strategy;
pub mod id_sequence;
pub mod redundant_enum_trait;
pub mod redundant_factory_option;

pub use association_style::AssociationStyle;
pub use consistent_parentheses_style::ConsistentParenthesesStyle;
pub use create_list::CreateList;
pub use excessive_create_list::ExcessiveCreateList;
pub use exclusive_traits::ExclusiveTraits;
pub use factory_association_with_strategy::FactoryAssociationWithStrategy;
pub use id_sequence::IdSequence;
pub use redundant_enum_trait::RedundantEnumTrait;
pub use redundant_factory_option::RedundantFactoryOption;

/// One analyzer. Rules are shared across files and must not keep per-node state.
pub trait Rule: Send + Sync {
    /// Qualified name, `FactoryBot/...`
    fn name(&self) -> &'static str;

    /// Node kinds this rule is dispatched on
    fn triggers(&self) -> &'static [&'static str];

    fn check(&self, node: Node<'_>, ctx: &mut RuleContext<'_>);
}

/// One detected violation
#[derive(Debug, Clone, Serialize)]
pub struct Offense {
    pub rule: &'static str,
    pub message: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
    pub correctable: bool,
    #[serde(skip)]
    pub correction: Option<Correction>,
}

/// Offense sink handed to rules while one file is visited
pub struct RuleContext<'s> {
    source: &'s str,
    rule: &'static str,
    seen: HashSet<(&'static str, Span)>,
    offenses: Vec<Offense>,
}

impl<'s> RuleContext<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            rule: "",
            seen: HashSet::new(),
            offenses: Vec::new(),
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Attribute following offenses to `rule`
    pub fn enter_rule(&mut self, rule: &'static str) {
        self.rule = rule;
    }

    /// Record an offense; a second offense of the same rule at the same span is dropped
    pub fn add_offense(&mut self, span: Span, message: impl Into<String>, correction: Option<Correction>) {
        if !self.seen.insert((self.rule, span)) {
            return;
        }
        let (line, column) = line_column_at(self.source, span.start);
        let correction = correction.filter(|c| !c.is_empty());
        self.offenses.push(Offense {
            rule: self.rule,
            message: message.into(),
            span,
            line,
            column,
            correctable: correction.is_some(),
            correction,
        });
    }

    /// Offenses ordered by position, then rule name
    pub fn into_offenses(self) -> Vec<Offense> {
        let mut offenses = self.offenses;
        offenses.sort_by(|a, b| a.span.start.cmp(&b.span.start).then(a.rule.cmp(b.rule)));
        offenses
    }
}

/// 1-based line and character column of a byte offset
pub fn line_column_at(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or("");
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Every enabled rule, configured from `config`
pub fn build_rules(config: &Config, gate: Arc<dyn VersionGate>) -> Result<Vec<Box<dyn Rule>>, ConfigError> {
    let candidates: Vec<Box<dyn Rule>> = vec![
        Box::new(AssociationStyle::from_config(config)?),
        Box::new(RedundantFactoryOption::new()),
        Box::new(FactoryAssociationWithStrategy::new()),
        Box::new(ExclusiveTraits::from_config(config)),
        Box::new(RedundantEnumTrait::new(gate)),
        Box::new(CreateList::from_config(config)?),
        Box::new(ExcessiveCreateList::from_config(config)),
        Box::new(IdSequence::new()),
        Box::new(ConsistentParenthesesStyle::from_config(config)?),
    ];

    Ok(candidates
        .into_iter()
        .filter(|rule| {
            let enabled = config.is_enabled(rule.name());
            if !enabled {
                tracing::debug!(rule = rule.name(), "rule disabled by configuration");
            }
            enabled
        })
        .collect())
}
