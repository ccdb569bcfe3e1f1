//! `FactoryBot/ExclusiveTraits`: traits of one factory assigning the same attribute differently
use std::collections::HashSet;
use tree_sitter::Node;

use super::language::{is_definition_block, DEFAULT_RESERVED_METHODS};
use super::{Rule, RuleContext};
use crate::analysis::ast::kinds;
use crate::analysis::ast::matcher::{send, sym_capture, Matcher, SendPattern};
use crate::analysis::ast::node::{block_body, block_statements, text, SendNode};
use crate::config::Config;

pub const NAME: &str = "FactoryBot/ExclusiveTraits";

struct TraitDefinition<'t> {
    name: String,
    call: SendNode<'t>,
    /// attribute name -> value source, in definition order
    attributes: Vec<(String, String)>,
}

/// attribute -> [(trait, value source)], both in first-seen order
type TraitAttributeMap = Vec<(String, Vec<(String, String)>)>;

pub struct ExclusiveTraits {
    reserved: HashSet<String>,
    trait_definition: SendPattern,
}

impl ExclusiveTraits {
    pub fn new(reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            reserved: reserved.into_iter().collect(),
            trait_definition: send()
                .without_receiver()
                .method("trait")
                .arg(sym_capture("name"))
                .exact_arguments()
                .with_block(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match config.rule(NAME).reserved_methods {
            Some(reserved) => Self::new(reserved),
            None => Self::new(DEFAULT_RESERVED_METHODS.iter().map(|s| s.to_string())),
        }
    }

    fn extract_traits<'t>(&self, factory_block: Node<'t>, src: &str) -> Vec<TraitDefinition<'t>> {
        let mut traits: Vec<TraitDefinition<'t>> = Vec::new();
        for statement in block_statements(factory_block) {
            let Some(caps) = self.trait_definition.captures(statement, src) else {
                continue;
            };
            let (Some(name), Some(call)) = (caps.name("name"), SendNode::from_node(statement)) else {
                continue;
            };
            let attributes = call
                .block()
                .map(|b| self.extract_attributes(b, src))
                .unwrap_or_default();
            let definition = TraitDefinition {
                name: name.to_string(),
                call,
                attributes,
            };
            // a redefinition replaces the earlier trait in place
            match traits.iter_mut().find(|t| t.name == definition.name) {
                Some(slot) => *slot = definition,
                None => traits.push(definition),
            }
        }
        traits
    }

    fn extract_attributes(&self, trait_block: Node<'_>, src: &str) -> Vec<(String, String)> {
        let mut attributes: Vec<(String, String)> = Vec::new();
        for statement in block_statements(trait_block) {
            let Some(call) = SendNode::from_node(statement) else {
                continue;
            };
            let Some(block) = call.block() else {
                continue;
            };
            if call.receiver().is_some() {
                continue;
            }
            let method = call.method_name(src);
            if self.reserved.contains(method) {
                continue;
            }
            let value = block_body(block)
                .map(|b| text(b, src).trim().to_string())
                .unwrap_or_default();
            match attributes.iter_mut().find(|(k, _)| *k == method) {
                Some(slot) => slot.1 = value,
                None => attributes.push((method.to_string(), value)),
            }
        }
        attributes
    }
}

fn build_attribute_map(traits: &[TraitDefinition<'_>]) -> TraitAttributeMap {
    let mut map: TraitAttributeMap = Vec::new();
    for t in traits {
        for (attr, value) in &t.attributes {
            let idx = match map.iter().position(|(a, _)| a == attr) {
                Some(i) => i,
                None => {
                    map.push((attr.clone(), Vec::new()));
                    map.len() - 1
                }
            };
            map[idx].1.push((t.name.clone(), value.clone()));
        }
    }
    map
}

fn format_names(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{}`", n))
        .collect::<Vec<_>>()
        .join(" and ")
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

impl Rule for ExclusiveTraits {
    fn name(&self) -> &'static str {
        NAME
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[kinds::CALL]
    }

    fn check(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        if !is_definition_block(node, src, &["factory"]) {
            return;
        }
        let Some(block) = SendNode::from_node(node).and_then(|c| c.block()) else {
            return;
        };

        let traits = self.extract_traits(block, src);
        if traits.len() < 2 {
            return;
        }

        let conflicts: Vec<_> = build_attribute_map(&traits)
            .into_iter()
            .filter(|(_, values)| {
                let distinct: HashSet<&str> = values.iter().map(|(_, v)| v.as_str()).collect();
                values.len() >= 2 && distinct.len() >= 2
            })
            .collect();
        if conflicts.is_empty() {
            return;
        }

        // trait -> (peers, attributes), in order of first conflict
        let mut per_trait: Vec<(String, Vec<String>, Vec<String>)> = Vec::new();
        for (attr, values) in &conflicts {
            for (trait_name, _) in values {
                let idx = match per_trait.iter().position(|(t, _, _)| t == trait_name) {
                    Some(i) => i,
                    None => {
                        per_trait.push((trait_name.clone(), Vec::new(), Vec::new()));
                        per_trait.len() - 1
                    }
                };
                let (_, peers, attrs) = &mut per_trait[idx];
                for (peer, _) in values.iter().filter(|(p, _)| p != trait_name) {
                    push_unique(peers, peer);
                }
                push_unique(attrs, attr);
            }
        }

        for (trait_name, peers, attrs) in per_trait {
            let Some(definition) = traits.iter().find(|t| t.name == trait_name) else {
                continue;
            };
            let mut names = vec![trait_name.clone()];
            names.extend(peers);
            let message = format!(
                "Traits {} define the same attribute {} with different values. Consider using sub-factories instead.",
                format_names(&names),
                format_names(&attrs)
            );
            ctx.add_offense(definition.call.send_span(), message, None);
        }
    }
}
