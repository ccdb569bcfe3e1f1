/// Tree-sitter visitor dispatching Ruby nodes to the rules that subscribe to their kind
use std::collections::HashMap;
use tree_sitter::Node;

use crate::rules::{Rule, RuleContext};

/// Pre-order rule dispatcher for one parsed file
pub struct RuleVisitor<'r> {
    /// node kind -> indexes into `rules`, in registration order
    by_kind: HashMap<&'static str, Vec<usize>>,
    rules: &'r [Box<dyn Rule>],
}

impl<'r> RuleVisitor<'r> {
    pub fn new(rules: &'r [Box<dyn Rule>]) -> Self {
        let mut by_kind: HashMap<&'static str, Vec<usize>> = HashMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            for &kind in rule.triggers() {
                by_kind.entry(kind).or_default().push(idx);
            }
        }
        Self { by_kind, rules }
    }

    /// Visit AST nodes iteratively to prevent stack overflow on deep trees
    pub fn visit(&self, root: Node<'_>, ctx: &mut RuleContext<'_>) {
        let mut stack: Vec<Node<'_>> = vec![root];

        while let Some(node) = stack.pop() {
            if node.is_named() {
                self.dispatch(node, ctx);
            }

            // Reverse to maintain left-to-right traversal order
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    fn dispatch(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let Some(indexes) = self.by_kind.get(node.kind()) else {
            return;
        };
        for &idx in indexes {
            let rule = &self.rules[idx];
            ctx.enter_rule(rule.name());
            rule.check(node, ctx);
        }
    }
}
