//! FactoryBot DSL vocabulary shared by the rules
use tree_sitter::Node;

use crate::analysis::ast::kinds;
use crate::analysis::ast::node::{ancestors, is_const_named, SendNode};

/// Receivers that address the library explicitly
pub const LIBRARY_CONSTANTS: &[&str] = &["FactoryBot", "FactoryGirl"];

/// Strategy methods that hard-code how an association is built
pub const STRATEGY_METHODS: &[&str] = &["build", "build_stubbed", "create"];

/// Methods of the definition proxy, callbacks and attribute helpers.
/// A call to one of these inside a factory body is never an attribute.
pub const DEFAULT_RESERVED_METHODS: &[&str] = &[
    "add_attribute",
    "after",
    "association",
    "before",
    "callback",
    "factory",
    "ignore",
    "initialize_with",
    "method_missing",
    "sequence",
    "skip_create",
    "to_create",
    "trait",
    "traits_for_enum",
    "transient",
];

/// Factory strategy entry points and their list/pair variants
pub const FACTORY_CALLS: &[&str] = &[
    "attributes_for",
    "attributes_for_list",
    "attributes_for_pair",
    "build",
    "build_list",
    "build_pair",
    "build_stubbed",
    "build_stubbed_list",
    "build_stubbed_pair",
    "create",
    "create_list",
    "create_pair",
    "generate",
    "generate_list",
    "null",
    "null_list",
    "null_pair",
];

/// `FactoryBot`, `FactoryGirl`, `::FactoryBot`
pub fn is_library_receiver(node: Node<'_>, src: &str) -> bool {
    is_const_named(node, src, LIBRARY_CONSTANTS)
}

/// Receiver absent, or the library constant. With `explicit_only`, the receiver is required.
pub fn factory_call_receiver_ok(call: &SendNode<'_>, src: &str, explicit_only: bool) -> bool {
    match call.receiver() {
        None => !explicit_only,
        Some(r) => is_library_receiver(r, src),
    }
}

/// `factory ... do ... end` or `trait ... do ... end` without a receiver
pub fn is_definition_block(node: Node<'_>, src: &str, methods: &[&str]) -> bool {
    let Some(call) = SendNode::from_node(node) else {
        return false;
    };
    call.receiver().is_none() && call.block().is_some() && methods.contains(&call.method_name(src))
}

/// The `factory` call with a block that encloses `node` from the farthest distance
pub fn outermost_factory<'t>(node: Node<'t>, src: &str) -> Option<Node<'t>> {
    ancestors(node)
        .into_iter()
        .filter(|a| a.kind() == kinds::CALL && is_definition_block(*a, src, &["factory"]))
        .last()
}

