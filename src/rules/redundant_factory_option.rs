//! `FactoryBot/RedundantFactoryOption`: `association :user, factory: :user`
use tree_sitter::Node;

use super::{Rule, RuleContext};
use crate::analysis::ast::kinds;
use crate::analysis::ast::matcher::{send, sym_capture, sym_or_sym_array, Matcher, SendPattern};
use crate::analysis::ast::node::{named_children, pair_key_name, span, SendNode};
use crate::correction::{Correction, Corrector, Span};

pub const NAME: &str = "FactoryBot/RedundantFactoryOption";

const MSG: &str = "Remove redundant `factory` option.";

pub struct RedundantFactoryOption {
    pattern: SendPattern,
}

impl Default for RedundantFactoryOption {
    fn default() -> Self {
        Self::new()
    }
}

impl RedundantFactoryOption {
    pub fn new() -> Self {
        Self {
            pattern: send()
                .without_receiver()
                .method("association")
                .arg(sym_capture("name"))
                .keyword("factory", sym_or_sym_array("factories")),
        }
    }
}

/// Remove `pair` together with the separator that joins it to its neighbours
fn removal(pair: Node<'_>, call: &SendNode<'_>) -> Option<Correction> {
    let parent = pair.parent()?;
    let (target, siblings) = if parent.kind() == kinds::HASH {
        let pairs = named_children(parent);
        if pairs.len() == 1 {
            (parent, call.arguments())
        } else {
            (pair, pairs)
        }
    } else {
        (pair, call.arguments())
    };

    let idx = siblings.iter().position(|n| n.id() == target.id())?;
    let range = match (idx.checked_sub(1).map(|i| siblings[i]), siblings.get(idx + 1)) {
        (Some(prev), _) => Span::new(prev.end_byte(), target.end_byte()),
        (None, Some(next)) => Span::new(target.start_byte(), next.start_byte()),
        (None, None) => span(target),
    };
    let mut corrector = Corrector::new();
    corrector.remove(range);
    Some(corrector.finish())
}

impl Rule for RedundantFactoryOption {
    fn name(&self) -> &'static str {
        NAME
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[kinds::CALL]
    }

    fn check(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        let Some(caps) = self.pattern.captures(node, src) else {
            return;
        };
        let Some(name) = caps.name("name") else {
            return;
        };
        if caps.names("factories") != [name] {
            return;
        }
        let Some(call) = SendNode::from_node(node) else {
            return;
        };
        let (_, pairs) = call.split_arguments();
        let Some(pair) = pairs
            .into_iter()
            .find(|p| pair_key_name(*p, src).as_deref() == Some("factory"))
        else {
            return;
        };
        ctx.add_offense(span(pair), MSG, removal(pair, &call));
    }
}
