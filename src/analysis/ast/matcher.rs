//! Structural matchers over Ruby syntax nodes.
//!
//! A matcher is built once (usually when a rule is constructed) and evaluated
//! per node. A mismatch is an ordinary `false`, never an error. Matchers may
//! bind named captures; bindings made inside a failed alternative are rolled
//! back before the next alternative is tried.
//!
//! ```ignore
//! // association :name, ..., factory: :x | factory: %i[x y]
//! let m = send()
//!     .without_receiver()
//!     .method("association")
//!     .arg(sym_capture("name"))
//!     .keyword("factory", sym_or_sym_array("factories"));
//! ```

use tree_sitter::Node;

use crate::analysis::ast::kinds;
use crate::analysis::ast::node::{
    integer_value, is_symbol, named_children, pair_key_name, pair_value, string_value, symbol_names,
    symbol_value, SendNode,
};

/// A value bound by a matcher
#[derive(Debug, Clone, PartialEq)]
pub enum Captured<'t> {
    Node(Node<'t>),
    Name(String),
    Names(Vec<String>),
    Int(i64),
}

#[derive(Debug, Default, Clone)]
pub struct Captures<'t> {
    entries: Vec<(&'static str, Captured<'t>)>,
}

impl<'t> Captures<'t> {
    fn bind(&mut self, name: &'static str, value: Captured<'t>) {
        self.entries.push((name, value));
    }

    fn mark(&self) -> usize {
        self.entries.len()
    }

    fn rollback(&mut self, mark: usize) {
        self.entries.truncate(mark);
    }

    fn get(&self, name: &str) -> Option<&Captured<'t>> {
        self.entries.iter().rev().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn node(&self, name: &str) -> Option<Node<'t>> {
        match self.get(name)? {
            Captured::Node(n) => Some(*n),
            _ => None,
        }
    }

    pub fn name(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Captured::Name(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// A `Names` binding, or a single `Name` seen as a one-element list
    pub fn names(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(Captured::Names(v)) => v.clone(),
            Some(Captured::Name(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Captured::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// A structural predicate over one node
pub trait Matcher: Send + Sync {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, caps: &mut Captures<'t>) -> bool;

    fn matches(&self, node: Node<'_>, src: &str) -> bool {
        let mut caps = Captures::default();
        self.match_node(node, src, &mut caps)
    }

    fn captures<'t>(&self, node: Node<'t>, src: &str) -> Option<Captures<'t>> {
        let mut caps = Captures::default();
        self.match_node(node, src, &mut caps).then_some(caps)
    }
}

pub type BoxedMatcher = Box<dyn Matcher>;

// ---------------------------------------------------------------------------
// Leaf matchers
// ---------------------------------------------------------------------------

struct AnyNode;

impl Matcher for AnyNode {
    fn match_node<'t>(&self, _node: Node<'t>, _src: &str, _caps: &mut Captures<'t>) -> bool {
        true
    }
}

/// `_`
pub fn any() -> BoxedMatcher {
    Box::new(AnyNode)
}

struct Kind(&'static str);

impl Matcher for Kind {
    fn match_node<'t>(&self, node: Node<'t>, _src: &str, _caps: &mut Captures<'t>) -> bool {
        node.kind() == self.0
    }
}

pub fn kind(kind: &'static str) -> BoxedMatcher {
    Box::new(Kind(kind))
}

enum SymbolConstraint {
    Any,
    Equals(&'static str),
    Capture(&'static str),
}

struct Symbol(SymbolConstraint);

impl Matcher for Symbol {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        if !is_symbol(node) {
            return false;
        }
        let Some(value) = symbol_value(node, src) else {
            return false;
        };
        match &self.0 {
            SymbolConstraint::Any => true,
            SymbolConstraint::Equals(expected) => value == *expected,
            SymbolConstraint::Capture(name) => {
                caps.bind(name, Captured::Name(value));
                true
            }
        }
    }
}

/// `sym`
pub fn sym() -> BoxedMatcher {
    Box::new(Symbol(SymbolConstraint::Any))
}

/// `(sym :value)`
pub fn sym_eq(value: &'static str) -> BoxedMatcher {
    Box::new(Symbol(SymbolConstraint::Equals(value)))
}

/// `(sym $_)`
pub fn sym_capture(name: &'static str) -> BoxedMatcher {
    Box::new(Symbol(SymbolConstraint::Capture(name)))
}

struct SymbolOrSymbolArray(&'static str);

impl Matcher for SymbolOrSymbolArray {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        let names = match node.kind() {
            kinds::SYMBOL_ARRAY | kinds::ARRAY => symbol_names(node, src),
            _ if is_symbol(node) => symbol_value(node, src).map(|n| vec![n]),
            _ => None,
        };
        match names {
            Some(names) => {
                caps.bind(self.0, Captured::Names(names));
                true
            }
            None => false,
        }
    }
}

/// `{(sym $_) | (array (sym $_)*)}`, capturing the decoded names in both cases
pub fn sym_or_sym_array(name: &'static str) -> BoxedMatcher {
    Box::new(SymbolOrSymbolArray(name))
}

struct Integer(Option<&'static str>);

impl Matcher for Integer {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        let Some(value) = integer_value(node, src) else {
            return false;
        };
        if let Some(name) = self.0 {
            caps.bind(name, Captured::Int(value));
        }
        true
    }
}

/// `int`
pub fn int() -> BoxedMatcher {
    Box::new(Integer(None))
}

/// `(int $_)`
pub fn int_capture(name: &'static str) -> BoxedMatcher {
    Box::new(Integer(Some(name)))
}

struct StringLiteral;

impl Matcher for StringLiteral {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, _caps: &mut Captures<'t>) -> bool {
        string_value(node, src).is_some()
    }
}

/// `str`
pub fn str_lit() -> BoxedMatcher {
    Box::new(StringLiteral)
}

struct ConstNamed(Vec<&'static str>);

impl Matcher for ConstNamed {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, _caps: &mut Captures<'t>) -> bool {
        if self.0.is_empty() {
            return matches!(node.kind(), kinds::CONSTANT | kinds::SCOPE_RESOLUTION);
        }
        crate::analysis::ast::node::is_const_named(node, src, &self.0)
    }
}

/// `(const ...)`
pub fn constant() -> BoxedMatcher {
    Box::new(ConstNamed(Vec::new()))
}

/// `(const {nil? cbase} {:A :B})`
pub fn const_named(names: &[&'static str]) -> BoxedMatcher {
    Box::new(ConstNamed(names.to_vec()))
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

struct Capture(&'static str, BoxedMatcher);

impl Matcher for Capture {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        let mark = caps.mark();
        if self.1.match_node(node, src, caps) {
            caps.bind(self.0, Captured::Node(node));
            true
        } else {
            caps.rollback(mark);
            false
        }
    }
}

/// `$pattern`: bind the matched node under `name`
pub fn capture(name: &'static str, inner: BoxedMatcher) -> BoxedMatcher {
    Box::new(Capture(name, inner))
}

struct Alternatives(Vec<BoxedMatcher>);

impl Matcher for Alternatives {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        for alt in &self.0 {
            let mark = caps.mark();
            if alt.match_node(node, src, caps) {
                return true;
            }
            caps.rollback(mark);
        }
        false
    }
}

/// `{a b c}`: first matching alternative wins
pub fn one_of(alternatives: Vec<BoxedMatcher>) -> BoxedMatcher {
    Box::new(Alternatives(alternatives))
}

struct Conjunction(Vec<BoxedMatcher>);

impl Matcher for Conjunction {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        let mark = caps.mark();
        for m in &self.0 {
            if !m.match_node(node, src, caps) {
                caps.rollback(mark);
                return false;
            }
        }
        true
    }
}

/// `[a b c]`: every matcher must hold
pub fn all_of(matchers: Vec<BoxedMatcher>) -> BoxedMatcher {
    Box::new(Conjunction(matchers))
}

struct Negation(BoxedMatcher);

impl Matcher for Negation {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, _caps: &mut Captures<'t>) -> bool {
        let mut scratch = Captures::default();
        !self.0.match_node(node, src, &mut scratch)
    }
}

/// `!pattern`
pub fn not(inner: BoxedMatcher) -> BoxedMatcher {
    Box::new(Negation(inner))
}

// ---------------------------------------------------------------------------
// Element reference: `receiver[index]`
// ---------------------------------------------------------------------------

struct ElementReference {
    object: BoxedMatcher,
    index: BoxedMatcher,
}

impl Matcher for ElementReference {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        if node.kind() != kinds::ELEMENT_REFERENCE {
            return false;
        }
        let Some(object) = node.child_by_field_name("object") else {
            return false;
        };
        let indexes: Vec<Node<'t>> = named_children(node)
            .into_iter()
            .filter(|n| n.id() != object.id())
            .collect();
        if indexes.len() != 1 {
            return false;
        }
        let mark = caps.mark();
        if self.object.match_node(object, src, caps) && self.index.match_node(indexes[0], src, caps) {
            return true;
        }
        caps.rollback(mark);
        false
    }
}

/// `(send object :[] index)`
pub fn element_reference(object: BoxedMatcher, index: BoxedMatcher) -> BoxedMatcher {
    Box::new(ElementReference { object, index })
}

// ---------------------------------------------------------------------------
// Method calls
// ---------------------------------------------------------------------------

enum ReceiverPattern {
    Any,
    Absent,
    Present(BoxedMatcher),
    AbsentOr(BoxedMatcher),
}

enum MethodPattern {
    Any,
    Exact(&'static str),
    OneOf(Vec<String>),
    NoneOf(Vec<String>),
}

enum RestPattern {
    /// `...`
    Any,
    /// no arguments beyond the leading ones, no keyword pairs
    Exact,
    /// `(sym $_)* ...`
    SymbolsThenAny(&'static str),
}

enum BlockPattern {
    Any,
    Absent,
    Present,
    WithoutParameters,
}

/// Matcher for a method call: receiver, method name, arguments and block
pub struct SendPattern {
    receiver: ReceiverPattern,
    method: MethodPattern,
    method_capture: Option<&'static str>,
    leading: Vec<BoxedMatcher>,
    rest: RestPattern,
    keywords: Vec<(&'static str, BoxedMatcher)>,
    block: BlockPattern,
}

/// `(send _ _ ...)`
pub fn send() -> SendPattern {
    SendPattern {
        receiver: ReceiverPattern::Any,
        method: MethodPattern::Any,
        method_capture: None,
        leading: Vec::new(),
        rest: RestPattern::Any,
        keywords: Vec::new(),
        block: BlockPattern::Any,
    }
}

impl SendPattern {
    /// `nil?` receiver
    pub fn without_receiver(mut self) -> Self {
        self.receiver = ReceiverPattern::Absent;
        self
    }

    pub fn receiver(mut self, m: BoxedMatcher) -> Self {
        self.receiver = ReceiverPattern::Present(m);
        self
    }

    /// `{nil? pattern}`
    pub fn receiver_absent_or(mut self, m: BoxedMatcher) -> Self {
        self.receiver = ReceiverPattern::AbsentOr(m);
        self
    }

    pub fn method(mut self, name: &'static str) -> Self {
        self.method = MethodPattern::Exact(name);
        self
    }

    pub fn method_in<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method = MethodPattern::OneOf(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn method_not_in<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method = MethodPattern::NoneOf(names.into_iter().map(Into::into).collect());
        self
    }

    /// Bind the method name under `name`
    pub fn capture_method(mut self, name: &'static str) -> Self {
        self.method_capture = Some(name);
        self
    }

    /// Next positional argument must match `m`
    pub fn arg(mut self, m: BoxedMatcher) -> Self {
        self.leading.push(m);
        self
    }

    /// No arguments at all
    pub fn no_arguments(mut self) -> Self {
        self.leading.clear();
        self.rest = RestPattern::Exact;
        self
    }

    /// Nothing beyond the leading arguments
    pub fn exact_arguments(mut self) -> Self {
        self.rest = RestPattern::Exact;
        self
    }

    /// Collect the run of symbol arguments after the leading ones
    pub fn trailing_symbols(mut self, name: &'static str) -> Self {
        self.rest = RestPattern::SymbolsThenAny(name);
        self
    }

    /// The trailing hash must contain `key:` with a value matching `value`, in any position
    pub fn keyword(mut self, key: &'static str, value: BoxedMatcher) -> Self {
        self.keywords.push((key, value));
        self
    }

    pub fn with_block(mut self) -> Self {
        self.block = BlockPattern::Present;
        self
    }

    pub fn without_block(mut self) -> Self {
        self.block = BlockPattern::Absent;
        self
    }

    /// `(block (send ...) (args) ...)`
    pub fn with_parameterless_block(mut self) -> Self {
        self.block = BlockPattern::WithoutParameters;
        self
    }

    pub fn boxed(self) -> BoxedMatcher {
        Box::new(self)
    }

    fn match_receiver<'t>(&self, call: &SendNode<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        match (&self.receiver, call.receiver()) {
            (ReceiverPattern::Any, _) => true,
            (ReceiverPattern::Absent, r) => r.is_none(),
            (ReceiverPattern::Present(_), None) => false,
            (ReceiverPattern::Present(m), Some(r)) => m.match_node(r, src, caps),
            (ReceiverPattern::AbsentOr(_), None) => true,
            (ReceiverPattern::AbsentOr(m), Some(r)) => m.match_node(r, src, caps),
        }
    }

    fn match_method(&self, name: &str) -> bool {
        match &self.method {
            MethodPattern::Any => true,
            MethodPattern::Exact(expected) => name == *expected,
            MethodPattern::OneOf(set) => set.iter().any(|n| n == name),
            MethodPattern::NoneOf(set) => !set.iter().any(|n| n == name),
        }
    }

    fn match_block(&self, call: &SendNode<'_>) -> bool {
        match (&self.block, call.block()) {
            (BlockPattern::Any, _) => true,
            (BlockPattern::Absent, b) => b.is_none(),
            (BlockPattern::Present, b) => b.is_some(),
            (BlockPattern::WithoutParameters, Some(b)) => {
                crate::analysis::ast::node::block_parameters(b).is_none()
            }
            (BlockPattern::WithoutParameters, None) => false,
        }
    }

    fn match_arguments<'t>(&self, call: &SendNode<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        let (positional, pairs) = call.split_arguments();
        if positional.len() < self.leading.len() {
            return false;
        }
        for (m, arg) in self.leading.iter().zip(positional.iter()) {
            if !m.match_node(*arg, src, caps) {
                return false;
            }
        }
        let remaining = &positional[self.leading.len()..];
        match self.rest {
            RestPattern::Any => {}
            RestPattern::Exact => {
                if !remaining.is_empty() || !pairs.is_empty() {
                    return false;
                }
            }
            RestPattern::SymbolsThenAny(name) => {
                let names: Vec<String> = remaining
                    .iter()
                    .map_while(|n| if is_symbol(*n) { symbol_value(*n, src) } else { None })
                    .collect();
                caps.bind(name, Captured::Names(names));
            }
        }
        for (key, value) in &self.keywords {
            let found = pairs.iter().any(|pair| {
                if pair_key_name(*pair, src).as_deref() != Some(*key) {
                    return false;
                }
                let Some(v) = pair_value(*pair) else {
                    return false;
                };
                let mark = caps.mark();
                if value.match_node(v, src, caps) {
                    true
                } else {
                    caps.rollback(mark);
                    false
                }
            });
            if !found {
                return false;
            }
        }
        true
    }
}

impl Matcher for SendPattern {
    fn match_node<'t>(&self, node: Node<'t>, src: &str, caps: &mut Captures<'t>) -> bool {
        let Some(call) = SendNode::from_node(node) else {
            return false;
        };
        let name = call.method_name(src);
        if !self.match_method(name) || !self.match_block(&call) {
            return false;
        }
        let mark = caps.mark();
        let ok = self.match_receiver(&call, src, caps) && self.match_arguments(&call, src, caps);
        if !ok {
            caps.rollback(mark);
            return false;
        }
        if let Some(cap) = self.method_capture {
            caps.bind(cap, Captured::Name(name.to_string()));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ast::languages::parse_ruby;
    use crate::analysis::ast::node::descendants;

    fn first_call<'t>(root: Node<'t>) -> Node<'t> {
        descendants(root)
            .into_iter()
            .find(|n| n.kind() == kinds::CALL)
            .expect("call node")
    }

    #[test]
    fn association_with_factory_keyword_captures_names() {
        let src = "association :author, :admin, factory: %i[user admin]";
        let parsed = parse_ruby(src).unwrap();
        let call = first_call(parsed.root());
        let m = send()
            .without_receiver()
            .method("association")
            .arg(sym_capture("name"))
            .trailing_symbols("traits")
            .keyword("factory", sym_or_sym_array("factories"));
        let caps = m.captures(call, src).expect("match");
        assert_eq!(caps.name("name"), Some("author"));
        assert_eq!(caps.names("traits"), vec!["admin".to_string()]);
        assert_eq!(caps.names("factories"), vec!["user".to_string(), "admin".to_string()]);
    }

    #[test]
    fn single_symbol_factory_is_a_one_element_list() {
        let src = "association :author, factory: :user";
        let parsed = parse_ruby(src).unwrap();
        let call = first_call(parsed.root());
        let m = send().method("association").keyword("factory", sym_or_sym_array("f"));
        let caps = m.captures(call, src).expect("match");
        assert_eq!(caps.names("f"), vec!["user".to_string()]);
    }

    #[test]
    fn mismatch_is_false_not_error() {
        let src = "FactoryBot.create(:user)";
        let parsed = parse_ruby(src).unwrap();
        let call = first_call(parsed.root());
        assert!(!send().without_receiver().matches(call, src));
        assert!(send()
            .receiver(const_named(&["FactoryBot", "FactoryGirl"]))
            .method_in(["create", "build"])
            .arg(sym())
            .matches(call, src));
        assert!(!send().method_not_in(["create"]).matches(call, src));
    }

    #[test]
    fn alternatives_roll_back_captures() {
        let src = "create_list(:user, 3)";
        let parsed = parse_ruby(src).unwrap();
        let call = first_call(parsed.root());
        let m = one_of(vec![
            send().arg(sym_capture("first")).arg(str_lit()).boxed(),
            send().arg(sym()).arg(int_capture("count")).boxed(),
        ]);
        let caps = m.captures(call, src).expect("match");
        assert_eq!(caps.name("first"), None);
        assert_eq!(caps.int("count"), Some(3));
    }

    #[test]
    fn no_arguments_rejects_keywords() {
        let src = "author factory: :user";
        let parsed = parse_ruby(src).unwrap();
        let call = first_call(parsed.root());
        assert!(!send().no_arguments().matches(call, src));
        assert!(send().without_block().matches(call, src));
    }
}
