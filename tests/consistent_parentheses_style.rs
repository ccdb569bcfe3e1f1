mod common;

use common::*;
use factory_lint::rules::consistent_parentheses_style::NAME;

const REQUIRE_MSG: &str = "Prefer method call with parentheses";
const OMIT_MSG: &str = "Prefer method call without parentheses";
const OMIT: &str = "  EnforcedStyle: omit_parentheses\n";

#[test]
fn require_style_adds_parentheses() {
    let linter = linter_for(NAME, "");
    assert_corrects(&linter, "create :user\n", REQUIRE_MSG, "create", "create(:user)\n");
    assert_corrects(
        &linter,
        "user = build :user, name: 'Jane'\n",
        REQUIRE_MSG,
        "build",
        "user = build(:user, name: 'Jane')\n",
    );
}

#[test]
fn require_style_keeps_the_block_outside() {
    let linter = linter_for(NAME, "");
    assert_eq!(
        corrected(&linter, "create :user do |u|\n  u.touch\nend\n"),
        "create(:user) do |u|\n  u.touch\nend\n"
    );
}

#[test]
fn require_style_ignores_parenthesized_and_ambiguous_calls() {
    let linter = linter_for(NAME, "");
    assert_no_offenses(&linter, "create(:user)\n");
    assert_no_offenses(&linter, "create\n");
    assert_no_offenses(&linter, "generate :email, 2\n");
    assert_no_offenses(&linter, "build(:user) or create :user\n");
    assert_no_offenses(&linter, "other :user\n");
}

#[test]
fn omit_style_removes_parentheses() {
    let linter = linter_for(NAME, OMIT);
    assert_corrects(&linter, "create(:user)\n", OMIT_MSG, "create", "create :user\n");
    assert_corrects(
        &linter,
        "FactoryBot.build_list(:user, 2)\n",
        OMIT_MSG,
        "build_list",
        "FactoryBot.build_list :user, 2\n",
    );
}

#[test]
fn omit_style_ignores_multiline_and_brace_blocks() {
    let linter = linter_for(NAME, OMIT);
    assert_no_offenses(&linter, "create(\n  :user\n)\n");
    assert_no_offenses(&linter, "create(:user) { |u| u.touch }\n");
    assert_no_offenses(&linter, "create :user\n");
}

#[test]
fn explicit_only_checks_library_calls() {
    let linter = linter_for(NAME, "  ExplicitOnly: true\n");
    assert_no_offenses(&linter, "create :user\n");
    assert_eq!(corrected(&linter, "FactoryBot.create :user\n"), "FactoryBot.create(:user)\n");
}
