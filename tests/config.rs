use std::path::Path;

use factory_lint::config::{self, Config, ConfigError};

const YAML: &str = r#"
require:
  - rubocop-factory_bot

AllCops:
  TargetFactoryBotVersion: 6.1
  Exclude:
    - "**/vendor/**"

Style/StringLiterals:
  Enabled: false

FactoryBot/CreateList:
  EnforcedStyle: n_times
  ExplicitOnly: true

FactoryBot/IdSequence:
  Enabled: false

FactoryBot/ExcessiveCreateList:
  MaxAmount: 25

FactoryBot/RedundantFactoryOption:
"#;

#[test]
fn reads_rule_sections_and_ignores_foreign_ones() {
    let cfg = Config::from_yaml_str(YAML).unwrap();
    assert_eq!(cfg.target_version().as_deref(), Some("6.1"));
    assert!(!cfg.is_enabled("FactoryBot/IdSequence"));
    assert!(cfg.is_enabled("FactoryBot/CreateList"));
    assert!(cfg.is_enabled("FactoryBot/RedundantFactoryOption"));
    assert!(cfg.is_enabled("FactoryBot/AssociationStyle"));
    assert!(!cfg.rules.contains_key("Style/StringLiterals"));

    let create_list = cfg.rule("FactoryBot/CreateList");
    assert!(create_list.explicit_only);
    assert_eq!(
        cfg.enforced_style("FactoryBot/CreateList", &["create_list", "n_times"]).unwrap(),
        "n_times"
    );
    assert_eq!(cfg.rule("FactoryBot/ExcessiveCreateList").max_amount, Some(25));
}

#[test]
fn missing_style_falls_back_to_the_first_supported_one() {
    let cfg = Config::default();
    assert_eq!(
        cfg.enforced_style("FactoryBot/AssociationStyle", &["implicit", "explicit"]).unwrap(),
        "implicit"
    );
}

#[test]
fn unknown_style_is_rejected() {
    let cfg = Config::from_yaml_str("FactoryBot/AssociationStyle:\n  EnforcedStyle: both\n").unwrap();
    match cfg.enforced_style("FactoryBot/AssociationStyle", &["implicit", "explicit"]) {
        Err(ConfigError::InvalidStyle { rule, style, expected }) => {
            assert_eq!(rule, "FactoryBot/AssociationStyle");
            assert_eq!(style, "both");
            assert_eq!(expected, "implicit, explicit");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn version_may_be_written_as_a_string() {
    let cfg = Config::from_yaml_str("AllCops:\n  TargetFactoryBotVersion: '6.10'\n").unwrap();
    assert_eq!(cfg.target_version().as_deref(), Some("6.10"));
}

#[test]
fn exclude_patterns_match_paths() {
    let cfg = Config::from_yaml_str(YAML).unwrap();
    let set = cfg.exclude_set().unwrap();
    assert!(config::should_ignore_path(set.as_ref(), Path::new("vendor/bundle/factories.rb")));
    assert!(!config::should_ignore_path(set.as_ref(), Path::new("spec/factories/users.rb")));
    assert!(!config::should_ignore_path(None, Path::new("vendor/x.rb")));
}

#[test]
fn invalid_glob_is_a_typed_error() {
    let cfg = Config::from_yaml_str("AllCops:\n  Exclude:\n    - \"a/[\"\n").unwrap();
    assert!(matches!(cfg.exclude_set(), Err(ConfigError::InvalidGlob { .. })));
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let res = Config::from_yaml_str("FactoryBot/CreateList:\n  Enabled: [\n");
    assert!(matches!(res, Err(ConfigError::Parse(_))));
}

#[test]
fn loads_an_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lint.yml");
    std::fs::write(&path, YAML).unwrap();
    let cfg = config::load_config(Some(&path)).unwrap();
    assert!(!cfg.is_enabled("FactoryBot/IdSequence"));

    let missing = dir.path().join("missing.yml");
    assert!(matches!(config::load_config(Some(&missing)), Err(ConfigError::Read { .. })));
}
