use std::sync::Arc;

use factory_lint::analysis::ast::error::AstError;
use factory_lint::analysis::ast::languages::{parse_ruby, MAX_SOURCE_BYTES};
use factory_lint::{apply_corrections, Config, CorrectionError, Corrector, EffectiveVersion, FixedVersion, Linter, Span};

fn linter() -> Linter {
    Linter::new(&Config::default(), Arc::new(FixedVersion(EffectiveVersion::DEFAULT))).expect("linter")
}

#[test]
fn syntax_error_reports_its_line() {
    let res = linter().inspect("factory :user do\n  name { 'x' }\n  trait :a do\nend\n");
    let err = res.unwrap_err();
    match err.downcast_ref::<AstError>() {
        Some(AstError::SyntaxError { line }) => assert!(*line >= 1),
        _ => panic!("expected AstError::SyntaxError, got: {err}"),
    }
}

#[test]
fn oversized_source_is_rejected() {
    let big = "a\n".repeat(MAX_SOURCE_BYTES / 2 + 1);
    let err = match parse_ruby(&big) {
        Ok(_) => panic!("expected an error"),
        Err(e) => e,
    };
    let ast = err.downcast_ref::<AstError>().expect("AstError expected");
    match ast {
        AstError::SourceTooLarge(len) => assert_eq!(*len, big.len()),
        _ => panic!("unexpected error: {ast:?}"),
    }
}

#[test]
fn autocorrect_surfaces_parse_errors() {
    let err = linter().autocorrect("create(:user\n").unwrap_err();
    assert!(err.downcast_ref::<AstError>().is_some(), "expected AstError, got: {err}");
}

#[test]
fn out_of_bounds_edit_is_a_correction_error() {
    let mut corrector = Corrector::new();
    corrector.replace(Span::new(2, 10), "x");
    let res = apply_corrections("abc", &[corrector.finish()]);
    assert_eq!(
        res.unwrap_err(),
        CorrectionError::OutOfBounds {
            span: Span::new(2, 10),
            len: 3
        }
    );
}

#[test]
fn split_character_is_a_correction_error() {
    let mut corrector = Corrector::new();
    corrector.remove(Span::new(1, 2));
    let res = apply_corrections("é", &[corrector.finish()]);
    assert!(matches!(res, Err(CorrectionError::NotCharBoundary { .. })));
}
