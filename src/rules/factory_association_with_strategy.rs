//! `FactoryBot/FactoryAssociationWithStrategy`: `profile { create(:profile) }` inside a factory
use tree_sitter::Node;

use super::language::{is_definition_block, STRATEGY_METHODS};
use super::{Rule, RuleContext};
use crate::analysis::ast::kinds;
use crate::analysis::ast::matcher::{send, Matcher, SendPattern};
use crate::analysis::ast::node::{block_statements, descendants, span, SendNode};
use crate::correction::Corrector;

pub const NAME: &str = "FactoryBot/FactoryAssociationWithStrategy";

const MSG: &str = "Use an implicit, explicit or inline definition instead of hard coding a strategy for setting association within factory.";

pub struct FactoryAssociationWithStrategy {
    /// `name { ... }`: an attribute with a parameterless block
    attribute: SendPattern,
    strategy_call: SendPattern,
}

impl Default for FactoryAssociationWithStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryAssociationWithStrategy {
    pub fn new() -> Self {
        Self {
            attribute: send()
                .without_receiver()
                .no_arguments()
                .with_parameterless_block(),
            strategy_call: send()
                .without_receiver()
                .method_in(STRATEGY_METHODS.iter().copied()),
        }
    }

    /// The strategy call a hard-coded association block evaluates to
    fn hardcoded_strategy<'t>(&self, node: Node<'t>, src: &str) -> Option<Node<'t>> {
        if !self.attribute.matches(node, src) {
            return None;
        }
        let block = SendNode::from_node(node)?.block()?;
        let last = block_statements(block).pop()?;
        self.strategy_call.matches(last, src).then_some(last)
    }
}

impl Rule for FactoryAssociationWithStrategy {
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
        for descendant in descendants(node) {
            if descendant.kind() != kinds::CALL {
                continue;
            }
            let Some(strategy) = self.hardcoded_strategy(descendant, src) else {
                continue;
            };
            let Some(call) = SendNode::from_node(strategy) else {
                continue;
            };
            let mut corrector = Corrector::new();
            corrector.replace(span(call.selector()), "association");
            ctx.add_offense(span(strategy), MSG, Some(corrector.finish()));
        }
    }
}
