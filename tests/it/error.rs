use color_eyre::{Result, eyre::Context};
use miette::Diagnostic;
use simple_test_case::test_case;

use semrange::{Error, Version, parse_constraint, parse_version};

#[test]
fn error_wrappable_context() -> Result<()> {
    const INPUT: &str = "1.2.3";

    let version = parse_version(INPUT).context("can wrap")?;
    pretty_assertions::assert_eq!(version, Version::new(1, 2, 3));

    let constraint = parse_constraint(INPUT).with_context(|| "can wrap")?;
    assert!(constraint.matches(&version));

    constraint.validate(&version).context("can wrap")?;

    Ok(())
}

#[test]
fn error_converts_to_crate_error() {
    fn run(version: &str, constraint: &str) -> Result<bool, Error> {
        let version = parse_version(version)?;
        let constraint = parse_constraint(constraint)?;
        constraint.validate(&version)?;
        Ok(true)
    }

    assert!(matches!(run("1.x", "*"), Err(Error::Version(_))));
    assert!(matches!(run("1.0.0", ">>1"), Err(Error::Constraint(_))));
    assert!(matches!(run("1.0.0", ">1"), Err(Error::Unsatisfied(_))));
    assert_eq!(run("1.0.0", "^1"), Ok(true));
}

#[test_case("1.2.03", "invalid patch '03' in version '1.2.03': must not have leading zeros"; "leading_zero")]
#[test_case("1.0.0-be_ta", "invalid pre-release identifier 'be_ta' in version '1.0.0-be_ta': must only contain ASCII alphanumerics and hyphens"; "prerelease")]
#[test_case("1.2.3.4", "input '1.2.3.4' did not match required syntax MAJOR[.MINOR[.PATCH]][-PRERELEASE][+BUILD]"; "syntax")]
#[test_case(" ", "version input was empty"; "empty")]
#[test]
fn error_messages_name_field(input: &str, expected: &str) {
    let err = parse_version(input).expect_err("must not parse");
    assert_eq!(err.to_string(), expected);
}

#[test]
fn unknown_operator_lists_aliases() {
    let err = parse_constraint("1.0 >>2").expect_err("must not parse");
    pretty_assertions::assert_eq!(
        err.to_string(),
        "unknown operator '>>' in constraint '1.0 >>2', \
         expected one of '=', '!=', '<', '<=', '=<', '>', '>=', '=>', '~', '~>', '^'"
    );
}

#[test_case(">=1.0.0 <2.0.0 || ^1.02", 19, 4; "version")]
#[test_case("1.0 || ", 6, 1; "empty_group")]
#[test_case("1.0 >>2", 4, 2; "operator")]
#[test]
fn diagnostic_labels_point_into_input(input: &str, offset: usize, len: usize) {
    let err = parse_constraint(input).expect_err("must not parse");
    let labels = err.labels().expect("must have labels").collect::<Vec<_>>();
    assert_eq!(labels.len(), 1);
    assert_eq!((labels[0].offset(), labels[0].len()), (offset, len));
    assert!(err.source_code().is_some());
}

#[test]
fn report_chain_includes_cause() {
    let err = parse_constraint("~1.x.3").expect_err("must not parse");
    let report = color_eyre::Report::new(err);
    let chain = report.chain().map(ToString::to_string).collect::<Vec<_>>();
    pretty_assertions::assert_eq!(
        chain,
        vec![
            "invalid version '1.x.3' in constraint '~1.x.3': invalid patch '3' in version '1.x.3': must be a wildcard when a preceding component is a wildcard",
            "invalid patch '3' in version '1.x.3': must be a wildcard when a preceding component is a wildcard",
            "must be a wildcard when a preceding component is a wildcard",
        ]
    );
}
