//! `FactoryBot/ExcessiveCreateList`: `create_list` asking for too many records
use tree_sitter::Node;

use super::language::factory_call_receiver_ok;
use super::{Rule, RuleContext};
use crate::analysis::ast::kinds;
use crate::analysis::ast::matcher::{capture, int, one_of, send, str_lit, sym, Matcher, SendPattern};
use crate::analysis::ast::node::{integer_value, span, SendNode};
use crate::config::Config;

pub const NAME: &str = "FactoryBot/ExcessiveCreateList";

pub const DEFAULT_MAX_AMOUNT: i64 = 10;

pub struct ExcessiveCreateList {
    max_amount: i64,
    explicit_only: bool,
    create_list: SendPattern,
}

impl ExcessiveCreateList {
    pub fn new(max_amount: i64, explicit_only: bool) -> Self {
        Self {
            max_amount,
            explicit_only,
            create_list: send()
                .method("create_list")
                .arg(one_of(vec![sym(), str_lit()]))
                .arg(capture("count", int())),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let rule = config.rule(NAME);
        Self::new(rule.max_amount.unwrap_or(DEFAULT_MAX_AMOUNT), rule.explicit_only)
    }
}

impl Rule for ExcessiveCreateList {
    fn name(&self) -> &'static str {
        NAME
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[kinds::CALL]
    }

    fn check(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        let Some(caps) = self.create_list.captures(node, src) else {
            return;
        };
        let Some(call) = SendNode::from_node(node) else {
            return;
        };
        if !factory_call_receiver_ok(&call, src, self.explicit_only) {
            return;
        }
        let Some(count) = caps.node("count") else {
            return;
        };
        if integer_value(count, src).is_some_and(|n| n > self.max_amount) {
            ctx.add_offense(
                span(count),
                format!("Avoid using `create_list` with more than {} items.", self.max_amount),
                None,
            );
        }
    }
}
