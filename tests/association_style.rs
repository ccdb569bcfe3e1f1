mod common;

use common::*;
use factory_lint::rules::association_style::NAME;

const IMPLICIT_MSG: &str = "Use implicit style to define associations.";
const EXPLICIT_MSG: &str = "Use explicit style to define associations.";

#[test]
fn implicit_style_flags_explicit_association() {
    let linter = linter_for(NAME, "");
    assert_corrects(
        &linter,
        "factory :article do\n  association :user\nend\n",
        IMPLICIT_MSG,
        "association :user",
        "factory :article do\n  user\nend\n",
    );
}

#[test]
fn implicit_style_moves_traits_into_factory_option() {
    let linter = linter_for(NAME, "");
    assert_corrects(
        &linter,
        "factory :article do\n  association :user, :admin\nend\n",
        IMPLICIT_MSG,
        "association :user, :admin",
        "factory :article do\n  user factory: %i[user admin]\nend\n",
    );
}

#[test]
fn implicit_style_keeps_factory_option() {
    let linter = linter_for(NAME, "");
    assert_eq!(
        corrected(&linter, "factory :article do\n  association :author, factory: :user\nend\n"),
        "factory :article do\n  author factory: %i[user]\nend\n"
    );
}

#[test]
fn implicit_style_inside_trait() {
    let linter = linter_for(NAME, "");
    let source = "factory :article do\n  trait :with_user do\n    association :user\n  end\nend\n";
    let found = offenses(&linter, source);
    assert_eq!(found.len(), 1);
    assert_eq!(highlighted(source, &found[0]), "association :user");
}

#[test]
fn implicit_style_ignores_build_strategy_and_keywords() {
    let linter = linter_for(NAME, "");
    assert_no_offenses(&linter, "factory :article do\n  association :user, strategy: :build\nend\n");
    assert_no_offenses(&linter, "factory :article do\n  association :alias\nend\n");
}

#[test]
fn implicit_style_ignores_keyword_trait_names() {
    let linter = linter_for(NAME, "");
    assert_no_offenses(
        &linter,
        "factory :article do\n  trait :with_class do\n    association :foo, :__FILE__\n  end\nend\n",
    );
}

#[test]
fn implicit_style_still_flags_keyword_factory_option() {
    let linter = linter_for(NAME, "");
    assert_corrects(
        &linter,
        "factory :article do\n  association :foo, factory: :alias\nend\n",
        IMPLICIT_MSG,
        "association :foo, factory: :alias",
        "factory :article do\n  foo factory: %i[alias]\nend\n",
    );
}

#[test]
fn styles_round_trip_a_plain_association() {
    let implicit = linter_for(NAME, "");
    let explicit = linter_for(NAME, "  EnforcedStyle: explicit\n");
    let original = "factory :article do\n  user\nend\n";
    let as_explicit = corrected(&explicit, original);
    assert_eq!(as_explicit, "factory :article do\n  association :user\nend\n");
    assert_eq!(corrected(&implicit, &as_explicit), original);
}

#[test]
fn styles_round_trip_a_factory_option() {
    let implicit = linter_for(NAME, "");
    let explicit = linter_for(NAME, "  EnforcedStyle: explicit\n");
    let as_implicit = corrected(&implicit, "factory :article do\n  association :author, factory: :user\nend\n");
    assert_eq!(as_implicit, "factory :article do\n  author factory: %i[user]\nend\n");
    assert_eq!(
        corrected(&explicit, &as_implicit),
        "factory :article do\n  association :author, factory: %i[user]\nend\n"
    );
}

#[test]
fn implicit_style_ignores_associations_outside_factories() {
    let linter = linter_for(NAME, "");
    assert_no_offenses(&linter, "association :user\n");
}

#[test]
fn explicit_style_flags_implicit_association() {
    let linter = linter_for(NAME, "  EnforcedStyle: explicit\n");
    assert_corrects(
        &linter,
        "factory :article do\n  user\nend\n",
        EXPLICIT_MSG,
        "user",
        "factory :article do\n  association :user\nend\n",
    );
}

#[test]
fn explicit_style_keeps_arguments() {
    let linter = linter_for(NAME, "  EnforcedStyle: explicit\n");
    assert_eq!(
        corrected(&linter, "factory :article do\n  author factory: :user\nend\n"),
        "factory :article do\n  association :author, factory: :user\nend\n"
    );
}

#[test]
fn explicit_style_ignores_attributes_and_dsl_methods() {
    let linter = linter_for(NAME, "  EnforcedStyle: explicit\n");
    let source = "factory :user do\n  name { 'Jane' }\n  skip_create\n  sequence(:email) { |n| \"u#{n}@example.com\" }\nend\n";
    assert_no_offenses(&linter, source);
}

#[test]
fn explicit_style_ignores_traits_of_the_outermost_factory() {
    let linter = linter_for(NAME, "  EnforcedStyle: explicit\n");
    let source = "factory :user do\n  trait :admin do\n    role { 'admin' }\n  end\n\n  factory :admin_user do\n    admin\n  end\nend\n";
    assert_no_offenses(&linter, source);
}

#[test]
fn explicit_style_honours_configured_method_names() {
    let linter = linter_for(
        NAME,
        "  EnforcedStyle: explicit\n  NonImplicitAssociationMethodNames:\n    - email\n",
    );
    assert_no_offenses(&linter, "factory :user do\n  email\nend\n");
}

#[test]
fn unknown_style_is_a_configuration_error() {
    let config = config_for(NAME, "  EnforcedStyle: sideways\n");
    let gate = std::sync::Arc::new(factory_lint::FixedVersion(factory_lint::EffectiveVersion::DEFAULT));
    let err = match factory_lint::Linter::new(&config, gate) {
        Ok(_) => panic!("expected a configuration error"),
        Err(e) => e,
    };
    match err.downcast_ref::<factory_lint::ConfigError>() {
        Some(factory_lint::ConfigError::InvalidStyle { style, .. }) => assert_eq!(style, "sideways"),
        other => panic!("unexpected error: {other:?}"),
    }
}
