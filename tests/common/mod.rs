#![allow(dead_code)]

use std::sync::Arc;

use factory_lint::rules::{
    association_style, consistent_parentheses_style, create_list, excessive_create_list, exclusive_traits,
    factory_association_with_strategy, id_sequence, redundant_enum_trait, redundant_factory_option,
};
use factory_lint::{Config, EffectiveVersion, FixedVersion, Linter, Offense};

pub const ALL_RULES: &[&str] = &[
    association_style::NAME,
    consistent_parentheses_style::NAME,
    create_list::NAME,
    excessive_create_list::NAME,
    exclusive_traits::NAME,
    factory_association_with_strategy::NAME,
    id_sequence::NAME,
    redundant_enum_trait::NAME,
    redundant_factory_option::NAME,
];

/// Configuration enabling only `rule`; `options` are two-space indented YAML lines for its section
pub fn config_for(rule: &str, options: &str) -> Config {
    let mut yaml = String::new();
    for name in ALL_RULES.iter().filter(|n| **n != rule) {
        yaml.push_str(&format!("{}:\n  Enabled: false\n", name));
    }
    yaml.push_str(&format!("{}:\n{}", rule, options));
    Config::from_yaml_str(&yaml).expect("valid test configuration")
}

pub fn linter_for(rule: &str, options: &str) -> Linter {
    linter_with_version(rule, options, EffectiveVersion::new(6, 1))
}

pub fn linter_with_version(rule: &str, options: &str, version: EffectiveVersion) -> Linter {
    Linter::new(&config_for(rule, options), Arc::new(FixedVersion(version))).expect("linter")
}

pub fn offenses(linter: &Linter, source: &str) -> Vec<Offense> {
    linter.inspect(source).expect("inspect")
}

/// Source text an offense points at
pub fn highlighted<'s>(source: &'s str, offense: &Offense) -> &'s str {
    &source[offense.span.start..offense.span.end]
}

pub fn corrected(linter: &Linter, source: &str) -> String {
    linter.autocorrect(source).expect("autocorrect").output
}

pub fn assert_no_offenses(linter: &Linter, source: &str) {
    let found = offenses(linter, source);
    assert!(found.is_empty(), "expected no offenses in {:?}, got {:?}", source, found);
}

/// One offense with `message` at `expected_highlight`, corrected to `expected_output`
pub fn assert_corrects(linter: &Linter, source: &str, message: &str, expected_highlight: &str, expected_output: &str) {
    let found = offenses(linter, source);
    assert_eq!(found.len(), 1, "expected one offense in {:?}, got {:?}", source, found);
    assert_eq!(found[0].message, message);
    assert_eq!(highlighted(source, &found[0]), expected_highlight);
    assert!(found[0].correctable);
    assert_eq!(corrected(linter, source), expected_output);
}
