use std::fs;

use factory_lint::rules::redundant_enum_trait::MINIMUM_VERSION;
use factory_lint::{Config, EffectiveVersion, Linter, TargetFactoryBotVersion, VersionGate};

const LOCK: &str = "GEM
  remote: https://rubygems.org/
  specs:
    factory_bot (6.4.5)
      activesupport (>= 5.0.0)

PLATFORMS
  ruby

DEPENDENCIES
  factory_bot (~> 5.0)
";

const ENUM_TRAIT: &str = "factory :task do\n  trait :queued do\n    status { Task.statuses[:queued] }\n  end\nend\n";

#[test]
fn configured_version_wins() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Gemfile.lock"), LOCK).unwrap();
    let gate = TargetFactoryBotVersion::new(Some("5.2".to_string()), dir.path());
    assert_eq!(gate.resolve(), EffectiveVersion::new(5, 2));
    assert!(!gate.supports(MINIMUM_VERSION));
}

#[test]
fn lock_file_is_used_when_not_configured() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Gemfile.lock"), LOCK).unwrap();
    let gate = TargetFactoryBotVersion::new(None, dir.path());
    assert_eq!(gate.resolve(), EffectiveVersion::new(6, 4));
}

#[test]
fn gems_locked_is_the_second_candidate() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("gems.locked"), LOCK).unwrap();
    let gate = TargetFactoryBotVersion::new(None, dir.path());
    assert_eq!(gate.resolve(), EffectiveVersion::new(6, 4));
}

#[test]
fn unparseable_configuration_falls_through() {
    let dir = tempfile::tempdir().unwrap();
    let gate = TargetFactoryBotVersion::new(Some("latest".to_string()), dir.path());
    assert_eq!(gate.resolve(), EffectiveVersion::DEFAULT);
}

#[test]
fn resolution_is_memoised() {
    let dir = tempfile::tempdir().unwrap();
    let lock = dir.path().join("Gemfile.lock");
    fs::write(&lock, LOCK).unwrap();
    let gate = TargetFactoryBotVersion::new(None, dir.path());
    assert_eq!(gate.resolve(), EffectiveVersion::new(6, 4));
    fs::remove_file(&lock).unwrap();
    assert_eq!(gate.resolve(), EffectiveVersion::new(6, 4));
}

#[test]
fn project_linter_follows_the_lock_file() {
    let config = Config::default();

    let new_project = tempfile::tempdir().unwrap();
    fs::write(new_project.path().join("Gemfile.lock"), LOCK).unwrap();
    let linter = Linter::for_project(&config, new_project.path()).unwrap();
    let found = linter.inspect(ENUM_TRAIT).unwrap();
    assert!(found.iter().any(|o| o.rule == "FactoryBot/RedundantEnumTrait"));

    let old_project = tempfile::tempdir().unwrap();
    let linter = Linter::for_project(&config, old_project.path()).unwrap();
    let found = linter.inspect(ENUM_TRAIT).unwrap();
    assert!(found.iter().all(|o| o.rule != "FactoryBot/RedundantEnumTrait"));
}
