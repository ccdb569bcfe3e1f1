mod common;

use common::*;
use factory_lint::rules::redundant_enum_trait::NAME;
use factory_lint::EffectiveVersion;

const MSG: &str =
    "This trait is redundant because enum traits are automatically defined in FactoryBot 6.1 and later.";

const SOURCE: &str = "factory :task do\n  trait :queued do\n    status { Task.statuses[:queued] }\n  end\nend\n";

#[test]
fn flags_enum_trait_and_removes_it() {
    let linter = linter_with_version(NAME, "", EffectiveVersion::new(6, 1));
    assert_corrects(&linter, SOURCE, MSG, "trait :queued", "factory :task do\nend\n");
}

#[test]
fn older_versions_keep_the_trait() {
    let linter = linter_with_version(NAME, "", EffectiveVersion::new(6, 0));
    assert_no_offenses(&linter, SOURCE);
}

#[test]
fn newer_versions_flag_the_trait() {
    let linter = linter_with_version(NAME, "", EffectiveVersion::new(6, 10));
    assert_eq!(offenses(&linter, SOURCE).len(), 1);
}

#[test]
fn ignores_traits_that_do_more() {
    let linter = linter_for(NAME, "");
    let other_key = "factory :task do\n  trait :queued do\n    status { Task.statuses[:done] }\n  end\nend\n";
    assert_no_offenses(&linter, other_key);

    let two_statements = "factory :task do\n  trait :queued do\n    status { Task.statuses[:queued] }\n    priority { 1 }\n  end\nend\n";
    assert_no_offenses(&linter, two_statements);

    let other_attribute = "factory :task do\n  trait :queued do\n    state { Task.statuses[:queued] }\n  end\nend\n";
    assert_no_offenses(&linter, other_attribute);
}

#[test]
fn ignores_traits_with_extra_arguments() {
    let linter = linter_for(NAME, "");
    let source = "factory :task do\n  trait :queued, :extra do\n    status { Task.statuses[:queued] }\n  end\nend\n";
    assert_no_offenses(&linter, source);
}
