//! `FactoryBot/AssociationStyle`: implicit (`user`) vs explicit (`association :user`) associations
use std::collections::HashSet;
use tree_sitter::Node;

use super::language::{is_definition_block, outermost_factory, DEFAULT_RESERVED_METHODS};
use super::{Rule, RuleContext};
use crate::analysis::ast::kinds;
use crate::analysis::ast::matcher::{send, sym_capture, sym_eq, sym_or_sym_array, Matcher, SendPattern};
use crate::analysis::ast::node::{
    block_statements, descendants, pair_key, pair_key_name, pair_value, span, text, SendNode,
};
use crate::config::{Config, ConfigError};
use crate::correction::Corrector;

pub const NAME: &str = "FactoryBot/AssociationStyle";

const STYLES: &[&str] = &["implicit", "explicit"];

/// Bare calls that never stand for an association
pub const DEFAULT_NON_IMPLICIT_ASSOCIATION_METHOD_NAMES: &[&str] =
    &["association", "sequence", "skip_create", "traits_for_enum"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Implicit,
    Explicit,
}

impl Style {
    fn as_str(self) -> &'static str {
        match self {
            Style::Implicit => "implicit",
            Style::Explicit => "explicit",
        }
    }
}

pub struct AssociationStyle {
    style: Style,
    /// `association :name, :trait...`
    explicit_association: SendPattern,
    /// `association ..., factory: :x` or `factory: %i[x y]`
    factory_option: SendPattern,
    /// `association ..., strategy: :build`
    build_strategy: SendPattern,
    /// A bare call that is not a DSL method
    implicit_association: SendPattern,
    trait_definition: SendPattern,
}

impl AssociationStyle {
    pub fn new(style: Style, non_implicit: Vec<String>) -> Self {
        Self {
            style,
            explicit_association: send()
                .without_receiver()
                .method("association")
                .arg(sym_capture("name"))
                .trailing_symbols("traits"),
            factory_option: send()
                .without_receiver()
                .method("association")
                .keyword("factory", sym_or_sym_array("factories")),
            build_strategy: send()
                .without_receiver()
                .method("association")
                .keyword("strategy", sym_eq("build")),
            implicit_association: send()
                .without_receiver()
                .method_not_in(non_implicit)
                .without_block(),
            trait_definition: send()
                .without_receiver()
                .method("trait")
                .arg(sym_capture("trait"))
                .exact_arguments()
                .with_block(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let style = match config.enforced_style(NAME, STYLES)? {
            "explicit" => Style::Explicit,
            _ => Style::Implicit,
        };
        let rule_cfg = config.rule(NAME);
        let mut non_implicit: Vec<String> = DEFAULT_NON_IMPLICIT_ASSOCIATION_METHOD_NAMES
            .iter()
            .map(|s| s.to_string())
            .collect();
        non_implicit.extend(rule_cfg.non_implicit_association_method_names);
        match rule_cfg.reserved_methods {
            Some(reserved) => non_implicit.extend(reserved),
            None => non_implicit.extend(DEFAULT_RESERVED_METHODS.iter().map(|s| s.to_string())),
        }
        Ok(Self::new(style, non_implicit))
    }

    fn is_bad_explicit(&self, node: Node<'_>, src: &str) -> bool {
        let Some(caps) = self.explicit_association.captures(node, src) else {
            return false;
        };
        if self.build_strategy.matches(node, src) {
            return false;
        }
        // a bare keyword would not parse back as a call or inside %i[]
        let name = caps.name("name").unwrap_or_default();
        if kinds::RUBY_KEYWORDS.contains(&name) {
            return false;
        }
        !caps
            .names("traits")
            .iter()
            .any(|t| kinds::RUBY_KEYWORDS.contains(&t.as_str()))
    }

    fn is_bad_implicit(&self, node: Node<'_>, src: &str, traits: &HashSet<String>) -> bool {
        let Some(call) = SendNode::from_node(node) else {
            return false;
        };
        self.implicit_association.matches(node, src) && !traits.contains(call.method_name(src))
    }

    /// Names of every trait defined inside the outermost enclosing factory
    fn traits_in_scope(&self, definition: Node<'_>, src: &str) -> HashSet<String> {
        let scope = outermost_factory(definition, src).unwrap_or(definition);
        let mut names = HashSet::new();
        for n in std::iter::once(scope).chain(descendants(scope)) {
            if n.kind() != kinds::CALL {
                continue;
            }
            if let Some(caps) = self.trait_definition.captures(n, src) {
                if let Some(name) = caps.name("trait") {
                    names.insert(name.to_string());
                }
            }
        }
        names
    }

    fn to_explicit(&self, node: Node<'_>, src: &str) -> Option<String> {
        let call = SendNode::from_node(node)?;
        let mut parts = vec![format!(":{}", call.method_name(src))];
        parts.extend(call.arguments().iter().map(|a| text(*a, src).to_string()));
        Some(format!("association {}", parts.join(", ")))
    }

    fn to_implicit(&self, node: Node<'_>, src: &str) -> Option<String> {
        let call = SendNode::from_node(node)?;
        let caps = self.explicit_association.captures(node, src)?;
        let name = caps.name("name")?.to_string();

        let mut options: Vec<(String, String)> = Vec::new();
        let (_, pairs) = call.split_arguments();
        for pair in pairs {
            let key = pair_key_name(pair, src)
                .or_else(|| pair_key(pair).map(|k| text(k, src).to_string()))?;
            let value = match pair_value(pair) {
                Some(v) => text(v, src).to_string(),
                None => key.clone(),
            };
            upsert(&mut options, key, value);
        }

        let factory_names = self
            .factory_option
            .captures(node, src)
            .map(|c| c.names("factories"))
            .unwrap_or_default();
        let trait_names = caps.names("traits");
        let mut merged = factory_names.clone();
        merged.extend(trait_names.iter().cloned());
        if factory_names.is_empty() && !trait_names.is_empty() {
            merged.insert(0, name.clone());
        }
        if !merged.is_empty() {
            upsert(&mut options, "factory".to_string(), format!("%i[{}]", merged.join(" ")));
        }

        if options.is_empty() {
            return Some(name);
        }
        let rest: Vec<String> = options.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        Some(format!("{} {}", name, rest.join(", ")))
    }
}

/// Insert keeping the position of an existing key
fn upsert(options: &mut Vec<(String, String)>, key: String, value: String) {
    match options.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => options.push((key, value)),
    }
}

impl Rule for AssociationStyle {
    fn name(&self) -> &'static str {
        NAME
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[kinds::CALL]
    }

    fn check(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        if !is_definition_block(node, src, &["factory", "trait"]) {
            return;
        }
        let Some(block) = SendNode::from_node(node).and_then(|c| c.block()) else {
            return;
        };

        let traits = match self.style {
            Style::Explicit => self.traits_in_scope(node, src),
            Style::Implicit => HashSet::new(),
        };
        let message = format!("Use {} style to define associations.", self.style.as_str());

        for child in block_statements(block) {
            let replacement = match self.style {
                Style::Implicit if self.is_bad_explicit(child, src) => self.to_implicit(child, src),
                Style::Explicit if self.is_bad_implicit(child, src, &traits) => self.to_explicit(child, src),
                _ => continue,
            };
            let correction = replacement.map(|text| {
                let mut corrector = Corrector::new();
                corrector.replace(span(child), text);
                corrector.finish()
            });
            ctx.add_offense(span(child), message.clone(), correction);
        }
    }
}
