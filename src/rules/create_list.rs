//! `FactoryBot/CreateList`: bulk creation with `create_list` vs repeated `create`
//!
//! In `create_list` style, `3.times { create :user }`, `3.times.map { ... }`,
//! `Array.new(3) { ... }`, `(1..3).map { ... }` and `[create(:user), create(:user)]`
//! collapse into one `create_list` call. In `n_times` style, `create_list :user, 3`
//! expands into `3.times.map { create :user }`.
use std::fmt;
use tree_sitter::Node;

use super::language::factory_call_receiver_ok;
use super::{Rule, RuleContext};
use crate::analysis::ast::kinds;
use crate::analysis::ast::matcher::{
    capture, const_named, int_capture, kind, send, sym, Matcher, SendPattern,
};
use crate::analysis::ast::node::{
    block_parameter_names, block_parameters, block_statements, descendants, is_local_variable,
    named_children, numeric_value, span, text, unwrap_parentheses, SendNode,
};
use crate::config::{Config, ConfigError};
use crate::correction::Corrector;

pub const NAME: &str = "FactoryBot/CreateList";

const STYLES: &[&str] = &["create_list", "n_times"];

const MSG_CREATE_LIST: &str = "Prefer create_list.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    CreateList,
    NTimes,
}

/// Number of iterations of a loop
#[derive(Debug, Clone, PartialEq)]
enum Count {
    Literal(i64),
    /// `(9 - n + 1)` when one range bound is a variable
    Expression(String),
}

impl Count {
    fn is_repetition(&self) -> bool {
        match self {
            Count::Literal(n) => *n > 1,
            Count::Expression(_) => true,
        }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Literal(n) => write!(f, "{}", n),
            Count::Expression(e) => f.write_str(e),
        }
    }
}

pub struct CreateList {
    style: Style,
    explicit_only: bool,
    create_call: SendPattern,
    create_list_call: SendPattern,
    times: SendPattern,
    times_map: SendPattern,
    array_new: SendPattern,
    range_map: SendPattern,
}

impl CreateList {
    pub fn new(style: Style, explicit_only: bool) -> Self {
        Self {
            style,
            explicit_only,
            create_call: send().method("create").arg(sym()),
            create_list_call: send()
                .method("create_list")
                .arg(sym())
                .arg(int_capture("count")),
            times: send()
                .receiver(int_capture("count"))
                .method("times")
                .no_arguments()
                .with_block(),
            times_map: send()
                .receiver(
                    send()
                        .receiver(int_capture("count"))
                        .method("times")
                        .no_arguments()
                        .without_block()
                        .boxed(),
                )
                .method("map")
                .no_arguments()
                .with_block(),
            array_new: send()
                .receiver(const_named(&["Array"]))
                .method("new")
                .arg(int_capture("count"))
                .exact_arguments()
                .with_block(),
            range_map: send()
                .receiver(capture("range", kind(kinds::PARENTHESIZED_STATEMENTS)))
                .method("map")
                .no_arguments()
                .with_block(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let style = match config.enforced_style(NAME, STYLES)? {
            "n_times" => Style::NTimes,
            _ => Style::CreateList,
        };
        Ok(Self::new(style, config.rule(NAME).explicit_only))
    }

    /// Iteration count of a repetition loop, and whether it is the range form
    fn loop_count(&self, node: Node<'_>, src: &str) -> Option<(Count, bool)> {
        for pattern in [&self.times, &self.times_map, &self.array_new] {
            if let Some(caps) = pattern.captures(node, src) {
                return caps.int("count").map(|n| (Count::Literal(n), false));
            }
        }
        let caps = self.range_map.captures(node, src)?;
        range_count(caps.node("range")?, src).map(|c| (c, true))
    }

    /// The single `create` call a repetition block evaluates
    fn repeated_create<'t>(&self, block: Node<'t>, src: &str) -> Option<SendNode<'t>> {
        let [statement] = block_statements(block)[..] else {
            return None;
        };
        let create = SendNode::from_node(statement)?;
        if !self.create_call.matches(statement, src) {
            return None;
        }
        factory_call_receiver_ok(&create, src, self.explicit_only).then_some(create)
    }

    fn check_loop(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        let Some(call) = SendNode::from_node(node) else {
            return;
        };
        let Some(block) = call.block() else {
            return;
        };
        let Some((count, range_form)) = self.loop_count(node, src) else {
            return;
        };
        if !count.is_repetition() {
            return;
        }
        let Some(create) = self.repeated_create(block, src) else {
            return;
        };
        if uses_block_parameters(block, create.node(), src) || arguments_include_method_call(&create, src) {
            return;
        }
        let end_column = node.start_position().column;
        let correction = create_list_source(&create, &count.to_string(), range_form, src, end_column).map(|text| {
            let mut corrector = Corrector::new();
            corrector.replace(span(node), text);
            corrector.finish()
        });
        ctx.add_offense(call.send_span(), MSG_CREATE_LIST, correction);
    }

    fn check_array(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        let elements = named_children(node);
        if elements.len() < 2 {
            return;
        }
        let first = elements[0];
        let Some(create) = SendNode::from_node(first) else {
            return;
        };
        if !self.create_call.matches(first, src) || !factory_call_receiver_ok(&create, src, self.explicit_only) {
            return;
        }
        let source = text(first, src);
        if elements.iter().any(|e| text(*e, src) != source) {
            return;
        }

        let count = elements.len().to_string();
        let bulk = match self.style {
            Style::CreateList if !arguments_include_method_call(&create, src) => {
                create_list_source(&create, &count, true, src, node.start_position().column)
            }
            _ => None,
        };
        let (message, replacement) = match bulk {
            Some(text) => (MSG_CREATE_LIST.to_string(), text),
            None => (
                format!("Prefer {}.times.map.", count),
                format!("{}.times.map {{ {} }}", count, source),
            ),
        };
        let mut corrector = Corrector::new();
        corrector.replace(span(node), replacement);
        ctx.add_offense(span(node), message, Some(corrector.finish()));
    }

    fn check_create_list(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        let Some(caps) = self.create_list_call.captures(node, src) else {
            return;
        };
        let Some(call) = SendNode::from_node(node) else {
            return;
        };
        if !factory_call_receiver_ok(&call, src, self.explicit_only) {
            return;
        }
        let Some(count) = caps.int("count").filter(|n| *n > 1) else {
            return;
        };

        let args = call.arguments();
        let mut arguments: Vec<&str> = vec![text(args[0], src)];
        arguments.extend(args.iter().skip(2).map(|a| text(*a, src)));
        let arguments = arguments.join(", ");

        let mut create = receiver_prefix(&call, src);
        if call.is_parenthesized() || call.block().is_some() {
            create.push_str(&format!("create({})", arguments));
        } else {
            create.push_str(&format!("create {}", arguments));
        }
        if let Some(block) = call.block() {
            create.push(' ');
            create.push_str(text(block, src));
        }

        let mut corrector = Corrector::new();
        corrector.replace(span(node), format!("{}.times.map {{ {} }}", count, create));
        ctx.add_offense(
            span(call.selector()),
            format!("Prefer {}.times.map.", count),
            Some(corrector.finish()),
        );
    }
}

/// Count of a parenthesized numeric range; `None` for open or fully variable ranges
fn range_count(node: Node<'_>, src: &str) -> Option<Count> {
    let range = unwrap_parentheses(node);
    if range.kind() != kinds::RANGE {
        return None;
    }
    let low = range.child_by_field_name("begin")?;
    let high = range.child_by_field_name("end")?;
    let mut cursor = range.walk();
    let exclusive = range.children(&mut cursor).any(|c| c.kind() == "...");

    let variable = |n: Node<'_>| kinds::VARIABLE_LIKE.contains(&n.kind());
    match (numeric_value(low, src), numeric_value(high, src)) {
        (Some(lo), Some(hi)) => {
            let lo = lo.ceil();
            let hi = if exclusive { hi.ceil() - 1.0 } else { hi.floor() };
            let count = hi - lo + 1.0;
            // i64::MAX as f64 rounds up to 2^63, which is already out of range
            if !count.is_finite() || count < i64::MIN as f64 || count >= i64::MAX as f64 {
                return None;
            }
            Some(Count::Literal(count as i64))
        }
        (None, Some(_)) if variable(low) => Some(variable_count(low, high, exclusive, src)),
        (Some(_), None) if variable(high) => Some(variable_count(low, high, exclusive, src)),
        _ => None,
    }
}

fn variable_count(low: Node<'_>, high: Node<'_>, exclusive: bool, src: &str) -> Count {
    let (lo, hi) = (text(low, src), text(high, src));
    if exclusive {
        Count::Expression(format!("({} - {})", hi, lo))
    } else {
        Count::Expression(format!("({} - {} + 1)", hi, lo))
    }
}

fn uses_block_parameters(block: Node<'_>, body: Node<'_>, src: &str) -> bool {
    let names = block_parameter_names(block, src);
    if names.is_empty() {
        return false;
    }
    std::iter::once(body)
        .chain(descendants(body))
        .any(|n| n.kind() == kinds::IDENTIFIER && names.iter().any(|p| p == text(n, src)))
}

/// Whether any argument after the factory name is evaluated by calling a method
fn arguments_include_method_call(call: &SendNode<'_>, src: &str) -> bool {
    call.arguments().iter().skip(1).any(|arg| {
        std::iter::once(*arg).chain(descendants(*arg)).any(|n| match n.kind() {
            kinds::CALL => true,
            kinds::IDENTIFIER => !is_local_variable(n, src),
            _ => false,
        })
    })
}

fn receiver_prefix(call: &SendNode<'_>, src: &str) -> String {
    call.receiver()
        .map(|r| format!("{}.", text(r, src)))
        .unwrap_or_default()
}

/// `create_list(:user, 3, ...)` built from a single `create` call
fn create_list_source(
    create: &SendNode<'_>,
    count: &str,
    force_parentheses: bool,
    src: &str,
    end_column: usize,
) -> Option<String> {
    let args = create.arguments();
    let (factory, options) = args.split_first()?;
    let mut arguments = format!("{}, {}", text(*factory, src), count);
    for option in options {
        arguments.push_str(", ");
        arguments.push_str(text(*option, src));
    }

    let mut out = receiver_prefix(create, src);
    if force_parentheses || create.is_parenthesized() || create.block().is_some() {
        out.push_str(&format!("create_list({})", arguments));
    } else {
        out.push_str(&format!("create_list {}", arguments));
    }
    if let Some(block) = create.block() {
        out.push_str(&format_block(block, src, end_column));
    }
    Some(out)
}

fn format_block(block: Node<'_>, src: &str, end_column: usize) -> String {
    let params = block_parameters(block).map(|p| text(p, src)).unwrap_or("");
    let statements = block_statements(block);
    let body = match (statements.first(), statements.last()) {
        (Some(first), Some(last)) => src.get(first.start_byte()..last.end_byte()).unwrap_or(""),
        _ => "",
    };

    if statements.len() <= 1 && !body.contains('\n') {
        let head = if params.is_empty() { String::new() } else { format!("{} ", params) };
        return format!(" {{ {}{} }}", head, body);
    }

    let indent = statements
        .first()
        .map(|s| " ".repeat(s.start_position().column))
        .unwrap_or_default();
    let head = if params.is_empty() { " do".to_string() } else { format!(" do {}", params) };
    format!("{}\n{}{}\n{}end", head, indent, body, " ".repeat(end_column))
}

impl Rule for CreateList {
    fn name(&self) -> &'static str {
        NAME
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[kinds::CALL, kinds::ARRAY]
    }

    fn check(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        match (node.kind(), self.style) {
            (kinds::ARRAY, _) => self.check_array(node, ctx),
            (_, Style::CreateList) => self.check_loop(node, ctx),
            (_, Style::NTimes) => self.check_create_list(node, ctx),
        }
    }
}
