//! `FactoryBot/RedundantEnumTrait`: traits that FactoryBot 6.1+ derives from enums on its own
use std::sync::Arc;
use tree_sitter::Node;

use super::{Rule, RuleContext};
use crate::analysis::ast::kinds;
use crate::analysis::ast::matcher::{
    constant, element_reference, send, sym_capture, BoxedMatcher, Matcher, SendPattern,
};
use crate::analysis::ast::node::{block_statements, span, SendNode};
use crate::correction::Corrector;
use crate::version::{EffectiveVersion, VersionGate};

pub const NAME: &str = "FactoryBot/RedundantEnumTrait";

pub const MINIMUM_VERSION: EffectiveVersion = EffectiveVersion::new(6, 1);

const MSG: &str =
    "This trait is redundant because enum traits are automatically defined in FactoryBot 6.1 and later.";

pub struct RedundantEnumTrait {
    gate: Arc<dyn VersionGate>,
    trait_definition: SendPattern,
    /// `status { ... }`
    attribute: SendPattern,
    /// `Task.statuses[:queued]`
    enum_lookup: BoxedMatcher,
}

impl RedundantEnumTrait {
    pub fn new(gate: Arc<dyn VersionGate>) -> Self {
        Self {
            gate,
            trait_definition: send()
                .without_receiver()
                .method("trait")
                .arg(sym_capture("trait"))
                .exact_arguments()
                .with_block(),
            attribute: send()
                .without_receiver()
                .capture_method("attribute")
                .no_arguments()
                .with_parameterless_block(),
            enum_lookup: element_reference(
                send()
                    .receiver(constant())
                    .capture_method("plural")
                    .no_arguments()
                    .without_block()
                    .boxed(),
                sym_capture("key"),
            ),
        }
    }

    fn is_redundant(&self, node: Node<'_>, src: &str) -> bool {
        let Some(trait_caps) = self.trait_definition.captures(node, src) else {
            return false;
        };
        let Some(trait_name) = trait_caps.name("trait") else {
            return false;
        };
        let Some(block) = SendNode::from_node(node).and_then(|c| c.block()) else {
            return false;
        };
        let [attribute_node] = block_statements(block)[..] else {
            return false;
        };
        let Some(attr_caps) = self.attribute.captures(attribute_node, src) else {
            return false;
        };
        let Some(attr_block) = SendNode::from_node(attribute_node).and_then(|c| c.block()) else {
            return false;
        };
        let [value] = block_statements(attr_block)[..] else {
            return false;
        };
        let Some(lookup) = self.enum_lookup.captures(value, src) else {
            return false;
        };
        let (Some(attribute), Some(plural), Some(key)) =
            (attr_caps.name("attribute"), lookup.name("plural"), lookup.name("key"))
        else {
            return false;
        };
        key == trait_name && is_plural_of(plural, attribute)
    }
}

/// `statuses` names the enum of `status`, `states` the enum of `state`
fn is_plural_of(plural: &str, singular: &str) -> bool {
    plural.strip_suffix("es") == Some(singular) || plural.strip_suffix('s') == Some(singular)
}

impl Rule for RedundantEnumTrait {
    fn name(&self) -> &'static str {
        NAME
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[kinds::CALL]
    }

    fn check(&self, node: Node<'_>, ctx: &mut RuleContext<'_>) {
        let src = ctx.source();
        if !self.is_redundant(node, src) {
            return;
        }
        if !self.gate.supports(MINIMUM_VERSION) {
            tracing::debug!(version = %self.gate.resolve(), "enum traits are not generated before 6.1");
            return;
        }
        let Some(call) = SendNode::from_node(node) else {
            return;
        };
        let mut corrector = Corrector::new();
        corrector.remove_whole_lines(src, span(node));
        ctx.add_offense(call.send_span(), MSG, Some(corrector.finish()));
    }
}
