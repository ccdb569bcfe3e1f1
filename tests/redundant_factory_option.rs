mod common;

use common::*;
use factory_lint::rules::redundant_factory_option::NAME;

const MSG: &str = "Remove redundant `factory` option.";

#[test]
fn flags_factory_option_naming_the_association() {
    let linter = linter_for(NAME, "");
    assert_corrects(
        &linter,
        "association :user, factory: :user\n",
        MSG,
        "factory: :user",
        "association :user\n",
    );
}

#[test]
fn keeps_other_options() {
    let linter = linter_for(NAME, "");
    assert_corrects(
        &linter,
        "association :user, factory: :user, strategy: :build\n",
        MSG,
        "factory: :user",
        "association :user, strategy: :build\n",
    );
    assert_eq!(
        corrected(&linter, "association :user, strategy: :build, factory: :user\n"),
        "association :user, strategy: :build\n"
    );
}

#[test]
fn flags_single_element_symbol_array() {
    let linter = linter_for(NAME, "");
    let source = "association :user, factory: %i[user]\n";
    let found = offenses(&linter, source);
    assert_eq!(found.len(), 1);
    assert_eq!(highlighted(source, &found[0]), "factory: %i[user]");
}

#[test]
fn ignores_meaningful_factory_option() {
    let linter = linter_for(NAME, "");
    assert_no_offenses(&linter, "association :author, factory: :user\n");
    assert_no_offenses(&linter, "association :user, factory: %i[user admin]\n");
    assert_no_offenses(&linter, "association :user\n");
}
