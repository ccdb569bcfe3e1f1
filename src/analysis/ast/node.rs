//! Read-only helpers over tree-sitter Ruby nodes.
//!
//! The grammar represents a receiver-less call without arguments (`user`) as a
//! bare `identifier`, and every other method call as a `call` node with the
//! fields `receiver`, `method`, `arguments` and `block`. [`SendNode`] gives both
//! shapes one interface so rules can reason about "a call" uniformly.

use tree_sitter::Node;

use crate::analysis::ast::kinds;
use crate::correction::Span;

/// Source text covered by `node`
pub fn text<'s>(node: Node<'_>, src: &'s str) -> &'s str {
    src.get(node.byte_range()).unwrap_or("")
}

pub fn span(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// 1-based line and column of the node start
pub fn line_column(node: Node<'_>) -> (usize, usize) {
    let p = node.start_position();
    (p.row + 1, p.column + 1)
}

/// Named children, comments excluded
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != kinds::COMMENT)
        .collect()
}

/// All named descendants of `node` (excluding `node`), pre-order
pub fn descendants<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut stack: Vec<Node<'t>> = named_children(node).into_iter().rev().collect();
    while let Some(n) = stack.pop() {
        out.push(n);
        for ch in named_children(n).into_iter().rev() {
            stack.push(ch);
        }
    }
    out
}

/// Parent chain, nearest first
pub fn ancestors<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut cur = node.parent();
    while let Some(p) = cur {
        out.push(p);
        cur = p.parent();
    }
    out
}

const STATEMENT_CONTAINERS: &[&str] = &[
    kinds::PROGRAM,
    kinds::BLOCK_BODY,
    kinds::BODY_STATEMENT,
    kinds::PARENTHESIZED_STATEMENTS,
    kinds::BLOCK,
    kinds::DO_BLOCK,
    "then",
    "else",
    "begin",
];

/// A method call seen the way the DSL rules care about it
#[derive(Debug, Clone, Copy)]
pub struct SendNode<'t> {
    node: Node<'t>,
}

impl<'t> SendNode<'t> {
    pub fn from_node(node: Node<'t>) -> Option<Self> {
        match node.kind() {
            kinds::CALL if node.child_by_field_name("method").is_some() => Some(Self { node }),
            kinds::IDENTIFIER => {
                let parent = node.parent()?;
                STATEMENT_CONTAINERS
                    .contains(&parent.kind())
                    .then_some(Self { node })
            }
            _ => None,
        }
    }

    pub fn node(&self) -> Node<'t> {
        self.node
    }

    pub fn receiver(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("receiver")
    }

    /// The method-name token
    pub fn selector(&self) -> Node<'t> {
        self.node.child_by_field_name("method").unwrap_or(self.node)
    }

    pub fn method_name<'s>(&self, src: &'s str) -> &'s str {
        text(self.selector(), src)
    }

    pub fn argument_list(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("arguments")
    }

    pub fn arguments(&self) -> Vec<Node<'t>> {
        self.argument_list().map(named_children).unwrap_or_default()
    }

    pub fn first_argument(&self) -> Option<Node<'t>> {
        self.arguments().into_iter().next()
    }

    pub fn last_argument(&self) -> Option<Node<'t>> {
        self.arguments().pop()
    }

    pub fn block(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("block")
    }

    pub fn is_parenthesized(&self) -> bool {
        let Some(args) = self.argument_list() else {
            return false;
        };
        let mut cursor = args.walk();
        let opens_with_paren = args.children(&mut cursor).next().is_some_and(|open| open.kind() == "(");
        opens_with_paren
    }

    /// The call without its attached block (`3.times` in `3.times { ... }`)
    pub fn send_span(&self) -> Span {
        let end = self
            .argument_list()
            .map(|a| a.end_byte())
            .unwrap_or_else(|| self.selector().end_byte());
        Span::new(self.node.start_byte(), end)
    }

    /// Positional arguments and keyword pairs, split like an implicit trailing hash
    pub fn split_arguments(&self) -> (Vec<Node<'t>>, Vec<Node<'t>>) {
        split_keyword_arguments(&self.arguments())
    }
}

/// Split an argument list into positional arguments and the pairs of its
/// trailing hash, whether written as bare `key: value` pairs or as `{ ... }`
pub fn split_keyword_arguments<'t>(args: &[Node<'t>]) -> (Vec<Node<'t>>, Vec<Node<'t>>) {
    if let Some(last) = args.last() {
        if last.kind() == kinds::HASH {
            let pairs = named_children(*last)
                .into_iter()
                .filter(|n| n.kind() == kinds::PAIR)
                .collect();
            return (args[..args.len() - 1].to_vec(), pairs);
        }
    }
    let split = args
        .iter()
        .rposition(|n| n.kind() != kinds::PAIR)
        .map(|i| i + 1)
        .unwrap_or(0);
    (args[..split].to_vec(), args[split..].to_vec())
}

pub fn pair_key<'t>(pair: Node<'t>) -> Option<Node<'t>> {
    pair.child_by_field_name("key")
}

/// Value of a pair; `None` for hash-value omission (`name:`)
pub fn pair_value<'t>(pair: Node<'t>) -> Option<Node<'t>> {
    pair.child_by_field_name("value")
}

/// Decoded key of a pair when it is a symbol (`factory:` or `:factory =>`)
pub fn pair_key_name(pair: Node<'_>, src: &str) -> Option<String> {
    pair_key(pair).and_then(|k| symbol_value(k, src))
}

pub fn is_block(node: Node<'_>) -> bool {
    matches!(node.kind(), kinds::BLOCK | kinds::DO_BLOCK)
}

/// Body container of a block, when the block has one
pub fn block_body<'t>(block: Node<'t>) -> Option<Node<'t>> {
    block.child_by_field_name("body")
}

pub fn block_parameters<'t>(block: Node<'t>) -> Option<Node<'t>> {
    block
        .child_by_field_name("parameters")
        .or_else(|| named_children(block).into_iter().find(|n| n.kind() == kinds::BLOCK_PARAMETERS))
}

/// Names declared in a block's `|...|` list
pub fn block_parameter_names(block: Node<'_>, src: &str) -> Vec<String> {
    let Some(params) = block_parameters(block) else {
        return Vec::new();
    };
    let mut names = Vec::new();
    for n in descendants(params) {
        if n.kind() == kinds::IDENTIFIER {
            names.push(text(n, src).to_string());
        }
    }
    names
}

/// Direct statements of a block body; a single expression body yields one statement
pub fn block_statements<'t>(block: Node<'t>) -> Vec<Node<'t>> {
    if let Some(body) = block_body(block) {
        return statements_of(body);
    }
    named_children(block)
        .into_iter()
        .filter(|n| n.kind() != kinds::BLOCK_PARAMETERS && n.kind() != kinds::EMPTY_STATEMENT)
        .collect()
}

fn statements_of<'t>(body: Node<'t>) -> Vec<Node<'t>> {
    named_children(body)
        .into_iter()
        .filter(|n| n.kind() != kinds::EMPTY_STATEMENT)
        .collect()
}

/// Decode a symbol literal to its name. Interpolated symbols do not decode.
pub fn symbol_value(node: Node<'_>, src: &str) -> Option<String> {
    let raw = text(node, src);
    match node.kind() {
        kinds::SIMPLE_SYMBOL => Some(raw.trim_start_matches(':').to_string()),
        kinds::HASH_KEY_SYMBOL | kinds::BARE_SYMBOL => Some(raw.to_string()),
        kinds::DELIMITED_SYMBOL => {
            if named_children(node).iter().any(|n| n.kind() != kinds::STRING_CONTENT) {
                return None;
            }
            let inner = raw.strip_prefix(':')?;
            Some(inner.get(1..inner.len().saturating_sub(1))?.to_string())
        }
        _ => None,
    }
}

pub fn is_symbol(node: Node<'_>) -> bool {
    kinds::SYMBOL_LIKE.contains(&node.kind())
}

/// Names held by a symbol, a `%i[...]` literal, or an array of symbols
pub fn symbol_names(node: Node<'_>, src: &str) -> Option<Vec<String>> {
    match node.kind() {
        kinds::SYMBOL_ARRAY | kinds::ARRAY => named_children(node)
            .into_iter()
            .map(|el| symbol_value(el, src))
            .collect(),
        _ => symbol_value(node, src).map(|name| vec![name]),
    }
}

/// Value of an integer literal (`1_000`, `0x10`, `-3`)
pub fn integer_value(node: Node<'_>, src: &str) -> Option<i64> {
    match node.kind() {
        kinds::INTEGER => parse_integer(text(node, src)),
        kinds::UNARY => {
            let operand = node.child_by_field_name("operand")?;
            let op = node.child_by_field_name("operator").map(|o| text(o, src));
            let v = integer_value(operand, src)?;
            match op {
                Some("-") => Some(-v),
                Some("+") => Some(v),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else {
        lower.parse().ok()
    }
}

/// Value of a float literal, or of an integer literal widened to f64
pub fn numeric_value(node: Node<'_>, src: &str) -> Option<f64> {
    match node.kind() {
        kinds::FLOAT => text(node, src).replace('_', "").parse().ok(),
        kinds::UNARY => {
            let operand = node.child_by_field_name("operand")?;
            let op = node.child_by_field_name("operator").map(|o| text(o, src));
            let v = numeric_value(operand, src)?;
            match op {
                Some("-") => Some(-v),
                Some("+") => Some(v),
                _ => None,
            }
        }
        _ => integer_value(node, src).map(|v| v as f64),
    }
}

/// Content of a plain string literal without interpolation
pub fn string_value(node: Node<'_>, src: &str) -> Option<String> {
    if node.kind() != kinds::STRING {
        return None;
    }
    let parts = named_children(node);
    if parts.iter().any(|p| p.kind() != kinds::STRING_CONTENT) {
        return None;
    }
    Some(parts.iter().map(|p| text(*p, src)).collect())
}

/// Strip wrapping parentheses: `(2..9)` is `parenthesized_statements(range)`
pub fn unwrap_parentheses(node: Node<'_>) -> Node<'_> {
    let mut cur = node;
    while cur.kind() == kinds::PARENTHESIZED_STATEMENTS {
        let inner = named_children(cur);
        if inner.len() != 1 {
            break;
        }
        cur = inner[0];
    }
    cur
}

/// `FactoryBot`, `FactoryGirl`, or their top-level `::` forms
pub fn is_const_named(node: Node<'_>, src: &str, names: &[&str]) -> bool {
    match node.kind() {
        kinds::CONSTANT => names.contains(&text(node, src)),
        kinds::SCOPE_RESOLUTION => {
            if node.child_by_field_name("scope").is_some() {
                return false;
            }
            node.child_by_field_name("name")
                .map(|n| n.kind() == kinds::CONSTANT && names.contains(&text(n, src)))
                .unwrap_or(false)
        }
        _ => false,
    }
}

/// Whether a bare identifier reads a local variable rather than calling a method:
/// a parameter of an enclosing block or method, or a name assigned before it
pub fn is_local_variable(node: Node<'_>, src: &str) -> bool {
    if node.kind() != kinds::IDENTIFIER {
        return false;
    }
    let name = text(node, src);
    let parents = ancestors(node);
    for a in &parents {
        match a.kind() {
            kinds::BLOCK | kinds::DO_BLOCK => {
                if block_parameter_names(*a, src).iter().any(|p| p == name) {
                    return true;
                }
            }
            kinds::METHOD => {
                let declared = a
                    .child_by_field_name("parameters")
                    .map(|params| {
                        descendants(params)
                            .into_iter()
                            .any(|p| p.kind() == kinds::IDENTIFIER && text(p, src) == name)
                    })
                    .unwrap_or(false);
                if declared {
                    return true;
                }
            }
            _ => {}
        }
    }
    let Some(root) = parents.last() else {
        return false;
    };
    descendants(*root).into_iter().any(|n| {
        n.kind() == kinds::ASSIGNMENT
            && n.end_byte() <= node.start_byte()
            && n.child_by_field_name("left")
                .map(|l| l.kind() == kinds::IDENTIFIER && text(l, src) == name)
                .unwrap_or(false)
    })
}
