//! `FactoryBot/IdSequence`: `sequence :id` inside a factory
use tree_sitter::Node;

use super::{Rule, RuleContext};
use crate::analysis::ast::kinds;
use crate::analysis::ast::matcher::{send, sym_eq, Matcher, SendPattern};
use crate::analysis::ast::node::span;
use crate::correction::Corrector;

pub const NAME: &str = "FactoryBot/IdSequence";

const MSG: &str = "Do not create a sequence for an id attribute";

pub struct IdSequence {
    id_sequence: SendPattern,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSequence {
    pub fn new() -> Self {
        Self {
            id_sequence: send().without_receiver().method("sequence").arg(sym_eq("id")),
        }
    }
}

impl Rule for IdSequence {
    fn name(&self) -> &'static str {
        NAME
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[kinds::CALL]
    }

    fn check(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        if !self.id_sequence.matches(node, src) {
            return;
        }
        let mut corrector = Corrector::new();
        corrector.remove_whole_lines(src, span(node));
        ctx.add_offense(span(node), MSG, Some(corrector.finish()));
    }
}
