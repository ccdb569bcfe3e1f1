//! `FactoryBot/ConsistentParenthesesStyle`: one parenthesization style for factory calls
use tree_sitter::Node;

use super::language::{factory_call_receiver_ok, FACTORY_CALLS};
use super::{Rule, RuleContext};
use crate::analysis::ast::kinds;
use crate::analysis::ast::node::{pair_value, span, SendNode};
use crate::config::{Config, ConfigError};
use crate::correction::{Corrector, Span};

pub const NAME: &str = "FactoryBot/ConsistentParenthesesStyle";

const STYLES: &[&str] = &["require_parentheses", "omit_parentheses"];

const MSG_REQUIRE: &str = "Prefer method call with parentheses";
const MSG_OMIT: &str = "Prefer method call without parentheses";

/// Parents under which dropping or adding parentheses changes how the call binds
const AMBIGUOUS_PARENTS: &[&str] = &[
    kinds::ARGUMENT_LIST,
    kinds::PAIR,
    kinds::ARRAY,
    kinds::CONDITIONAL,
    kinds::IF_MODIFIER,
    kinds::UNLESS_MODIFIER,
];

const BOOLEAN_OPERATORS: &[&str] = &["&&", "||", "and", "or"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    RequireParentheses,
    OmitParentheses,
}

pub struct ConsistentParenthesesStyle {
    style: Style,
    explicit_only: bool,
}

impl ConsistentParenthesesStyle {
    pub fn new(style: Style, explicit_only: bool) -> Self {
        Self { style, explicit_only }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let style = match config.enforced_style(NAME, STYLES)? {
            "omit_parentheses" => Style::OmitParentheses,
            _ => Style::RequireParentheses,
        };
        Ok(Self::new(style, config.rule(NAME).explicit_only))
    }

    fn is_candidate(&self, call: &SendNode<'_>, src: &str) -> bool {
        let method = call.method_name(src);
        if !FACTORY_CALLS.contains(&method) || !factory_call_receiver_ok(call, src, self.explicit_only) {
            return false;
        }
        let Some(first) = call.first_argument() else {
            return false;
        };
        if matches!(first.kind(), kinds::PAIR | kinds::HASH) {
            return false;
        }
        if method == "generate" && call.arguments().len() > 1 {
            return false;
        }
        !in_ambiguous_position(call.node(), src)
    }

    fn require_parentheses(&self, call: &SendNode<'_>, ctx: &mut RuleContext<'_>) {
        if call.is_parenthesized() {
            return;
        }
        let (Some(first), Some(last)) = (call.first_argument(), call.last_argument()) else {
            return;
        };
        let selector = call.selector();
        let mut corrector = Corrector::new();
        corrector.replace(Span::new(selector.end_byte(), first.start_byte()), "(");
        corrector.insert_after(span(last), ")");
        ctx.add_offense(span(selector), MSG_REQUIRE, Some(corrector.finish()));
    }

    fn omit_parentheses(&self, call: &SendNode<'_>, ctx: &mut RuleContext<'_>) {
        if !call.is_parenthesized() {
            return;
        }
        let (Some(list), Some(first)) = (call.argument_list(), call.first_argument()) else {
            return;
        };
        let selector = call.selector();
        if first.start_position().row > selector.start_position().row {
            return;
        }
        let omits_hash_value = call
            .arguments()
            .iter()
            .any(|a| a.kind() == kinds::PAIR && pair_value(*a).is_none());
        if omits_hash_value {
            return;
        }
        // a brace block would bind to the last argument once the parentheses are gone
        if call.block().is_some_and(|b| b.kind() == kinds::BLOCK) {
            return;
        }
        let mut corrector = Corrector::new();
        corrector.replace(Span::new(list.start_byte(), list.start_byte() + 1), " ");
        corrector.remove(Span::new(list.end_byte() - 1, list.end_byte()));
        ctx.add_offense(span(selector), MSG_OMIT, Some(corrector.finish()));
    }
}

fn in_ambiguous_position(node: Node<'_>, src: &str) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    if AMBIGUOUS_PARENTS.contains(&parent.kind()) {
        return true;
    }
    match parent.kind() {
        kinds::CALL => parent.child_by_field_name("receiver") == Some(node),
        kinds::BINARY => parent
            .child_by_field_name("operator")
            .is_some_and(|op| BOOLEAN_OPERATORS.contains(&op.utf8_text(src.as_bytes()).unwrap_or(""))),
        _ => false,
    }
}

impl Rule for ConsistentParenthesesStyle {
    fn name(&self) -> &'static str {
        NAME
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[kinds::CALL]
    }

    fn check(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        let Some(call) = SendNode::from_node(node) else {
            return;
        };
        if !self.is_candidate(&call, src) {
            return;
        }
        match self.style {
            Style::RequireParentheses => self.require_parentheses(&call, ctx),
            Style::OmitParentheses => self.omit_parentheses(&call, ctx),
        }
    }
}
