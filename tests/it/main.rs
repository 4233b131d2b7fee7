//! Tests for the crate.

use simple_test_case::test_case;
use static_assertions::assert_impl_all;

use semrange::*;

mod error;
mod satisfies;

assert_impl_all!(Version: Send, Sync, Clone, Ord, std::hash::Hash);
assert_impl_all!(WildcardVersion: Send, Sync, Clone, Eq, std::hash::Hash);
assert_impl_all!(Clause: Send, Sync, Clone, Eq);
assert_impl_all!(Group: Send, Sync, Clone, Eq);
assert_impl_all!(Constraint: Send, Sync, Clone, Eq, std::str::FromStr);
assert_impl_all!(Error: Send, Sync, std::error::Error, miette::Diagnostic);
assert_impl_all!(VersionParseError: Send, Sync, std::error::Error);
assert_impl_all!(ConstraintParseError: Send, Sync, std::error::Error);
assert_impl_all!(Unsatisfied: Send, Sync, std::error::Error);

#[test_case(r#""1.0.0""#, version!(1, 0, 0); "release")]
#[test_case(r#""v1.2""#, version!(1, 2, 0); "partial")]
#[test_case(r#""1.0.0-rc.10+r1234""#, version!(parse => "1.0.0-rc.10+r1234"); "labels")]
#[test]
fn deserializes_version(input: &str, expected: Version) {
    let deserialized = serde_json::from_str::<Version>(input).expect("must deserialize");
    assert_eq!(expected, deserialized);
}

#[test_case(version!(1, 0, 0); "release")]
#[test_case(version!(parse => "1.0.0-alpha.1"); "prerelease")]
#[test_case(version!(parse => "1.0.0-rc.10+r1234"); "build")]
#[test]
fn version_roundtrip(version: Version) {
    let serialized = serde_json::to_string(&version).expect("must serialize");
    let deserialized: Version = serde_json::from_str(&serialized).expect("must deserialize");
    assert_eq!(version.to_string(), deserialized.to_string());
}

#[test_case(""; "empty")]
#[test_case("1.2.x"; "wildcard")]
#[test_case(">=1.2.7 <1.3.0 || ^2.0.0-rc.1"; "groups")]
#[test]
fn constraint_roundtrip(input: &str) {
    let constraint = Constraint::parse(input).expect("must parse");
    let serialized = serde_json::to_string(&constraint).expect("must serialize");
    let deserialized: Constraint = serde_json::from_str(&serialized).expect("must deserialize");
    assert_eq!(constraint, deserialized);
}

#[test]
fn deserialize_reports_parse_error() {
    let err = serde_json::from_str::<Constraint>(r#"">>1.0""#).expect_err("must not deserialize");
    assert!(err.to_string().contains("unknown operator"), "{err}");
}
