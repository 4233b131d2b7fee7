//! Tests for evaluating versions against constraints.

use assert_matches::assert_matches;
use proptest::prelude::*;
use simple_test_case::test_case;

use semrange::*;

fn check(version: &str, constraint: &str) -> bool {
    let version = parse_version(version).expect("must parse version");
    let constraint = parse_constraint(constraint).expect("must parse constraint");
    satisfies(&version, &constraint)
}

#[test_case("1.2.3", ">1.0.0"; "greater")]
#[test_case("1.2.9", "1.2.x"; "wildcard_patch")]
#[test_case("1.0.1", "<2.0.0 || >3.0.0"; "first_group")]
#[test_case("3.0.1", "<2.0.0 || >3.0.0"; "second_group")]
#[test_case("1.3.0", "^1.2.3"; "caret")]
#[test_case("0.2.5", "^0.2.3"; "caret_zero_major")]
#[test_case("0.0.3", "^0.0.3"; "caret_zero_minor")]
#[test_case("1.9.9", "^1.2"; "caret_partial")]
#[test_case("0.0.9", "^0.0"; "caret_zero_zero")]
#[test_case("0.9.0", "^0"; "caret_zero")]
#[test_case("1.2.9", "~1.2.3"; "tilde")]
#[test_case("1.2.0", "~1.2"; "tilde_minor")]
#[test_case("1.9.0", "~1"; "tilde_major")]
#[test_case("1.2.3", "1.2.3"; "bare")]
#[test_case("1.2.3+build.7", "=1.2.3"; "equal_ignores_build")]
#[test_case("1.2.4", "!=1.2.3"; "not_equal")]
#[test_case("1.2.3", "<=1.2.3"; "less_or_equal")]
#[test_case("1.2.0", "<=1.2"; "less_or_equal_wildcard")]
#[test_case("1.2.9", "<1.3"; "less_wildcard")]
#[test_case("2.1.9", ">2.1.x"; "greater_wildcard_floor")]
#[test_case("1.2.3", ">=1.2.3, <1.3.0"; "comma")]
#[test_case("2.3.4", "1.2.3 - 2.3.4"; "hyphen_upper")]
#[test_case("2.3.0", "1.2.3 - 2.3"; "hyphen_partial_upper")]
#[test_case("5.0.0", "*"; "any")]
#[test_case("5.0.0", "x"; "any_x")]
#[test_case("5.0.0", ""; "empty")]
#[test_case("1.2.3", "=>1.2.3"; "greater_or_equal_alias")]
#[test_case("1.2.3", "=<1.2.3"; "less_or_equal_alias")]
#[test_case("1.2.9", "~>1.2.3"; "tilde_alias")]
#[test]
fn satisfied(version: &str, constraint: &str) {
    assert!(
        check(version, constraint),
        "version '{version}' should satisfy '{constraint}'"
    );
}

#[test_case("1.0.0", ">1.0.0"; "greater")]
#[test_case("1.3.0", "1.2.x"; "wildcard_patch")]
#[test_case("2.5.0", "<2.0.0 || >3.0.0"; "between_groups")]
#[test_case("2.0.0", "^1.2.3"; "caret")]
#[test_case("0.3.0", "^0.2.3"; "caret_zero_major")]
#[test_case("0.0.4", "^0.0.3"; "caret_zero_minor")]
#[test_case("0.1.0", "^0.0"; "caret_zero_zero")]
#[test_case("1.2.2", "^1.2.3"; "caret_below")]
#[test_case("1.3.0", "~1.2.3"; "tilde")]
#[test_case("2.0.0", "~1"; "tilde_major")]
#[test_case("1.2.3", "!=1.2.3"; "not_equal")]
#[test_case("1.2.1", "<=1.2"; "less_or_equal_wildcard")]
#[test_case("2.1.0", ">2.1.x"; "greater_wildcard_floor")]
#[test_case("2.3.5", "1.2.3 - 2.3.4"; "hyphen_upper")]
#[test_case("1.2.2", "1.2.3 - 2.3.4"; "hyphen_lower")]
#[test_case("2.3.1", "1.2.3 - 2.3"; "hyphen_partial_upper")]
#[test_case("1.3.0", ">=1.2.3, <1.3.0"; "comma")]
#[test]
fn unsatisfied(version: &str, constraint: &str) {
    assert!(
        !check(version, constraint),
        "version '{version}' should not satisfy '{constraint}'"
    );
}

#[test_case("1.2.3-beta", ">1.0.0", false; "unnamed")]
#[test_case("1.2.3-beta", ">=1.2.3-alpha <1.3.0", true; "named_same_release")]
#[test_case("1.2.4-beta", ">=1.2.3-alpha <1.3.0", false; "named_other_release")]
#[test_case("1.2.3-alpha", ">=1.2.3-beta", false; "named_but_lower")]
#[test_case("1.2.3-beta", "1.2.3-beta", true; "exact")]
#[test_case("1.2.3-beta", "<1.2.3", false; "below_release")]
#[test_case("1.2.3-beta", ">=1.2.3-alpha <1.2.3", true; "below_release_named")]
#[test_case("1.2.3-beta", "1.2.x", false; "wildcard")]
#[test_case("1.2.3-beta", "*", false; "any")]
#[test_case("1.2.3-beta", "", true; "empty")]
#[test_case("1.2.3-beta", "^1.2.3-alpha", true; "caret_named")]
#[test_case("1.3.0-beta", "^1.2.3-alpha", false; "caret_other_release")]
#[test_case("1.2.3-beta", ">2.0.0 || ~1.2.3-alpha", true; "named_in_second_group")]
#[test_case("1.2.3-beta", ">=1.2.3-alpha || >1.0.0", true; "named_in_first_group")]
#[test_case("1.2.3-beta", "<2.0.0 || >=1.2.3-alpha <1.0.0", false; "named_in_failing_group")]
#[test_case("1.2.3-beta", "=1.2.3", false; "equal_release")]
#[test_case("1.2.3-beta", "!=1.2.3", true; "not_equal_release")]
#[test_case("2.0.0-rc.1", "!=1.0.0", true; "not_equal_other_release")]
#[test_case("1.2.3-beta", "!=1.x", false; "not_equal_wildcard")]
#[test_case("2.0.0-rc.1", "!=1.0.0 >1.0.0", false; "not_equal_with_range")]
#[test_case("1.2.0-beta", "<=1.2.x", false; "less_or_equal_wildcard")]
#[test]
fn prerelease_rule(version: &str, constraint: &str, expected: bool) {
    assert_eq!(
        check(version, constraint),
        expected,
        "version '{version}' against '{constraint}'"
    );
}

#[test]
fn validate_explains_each_group() {
    let constraint = parse_constraint("^1.2.3 || >=3.0.0 <4.0.0").expect("must parse");
    let err = constraint
        .validate(&version!(parse => "3.1.0-beta"))
        .expect_err("must not satisfy");

    pretty_assertions::assert_eq!(
        err.violations,
        vec![
            Violation::Clause(clause!(Caret => wildcard!("1.2.3"))),
            Violation::Prerelease(version!(3, 1, 0)),
        ]
    );
    pretty_assertions::assert_eq!(
        err.to_string(),
        "version '3.1.0-beta' does not satisfy constraint '^1.2.3 || >=3.0.0 <4.0.0': \
         '^1.2.3' did not match; no clause names a pre-release of 3.1.0"
    );
}

#[test]
fn validate_accepts() {
    let constraint = parse_constraint("~1.2").expect("must parse");
    pretty_assertions::assert_eq!(constraint.validate(&version!(1, 2, 7)), Ok(()));
    assert_matches!(constraint.validate(&version!(1, 3, 0)), Err(Unsatisfied { .. }));
}

#[test]
fn upper_bound_overflow_is_unbounded() {
    let max = u64::MAX;
    let constraint = parse_constraint(&format!("~{max}.{max}")).expect("must parse");
    assert!(satisfies(&version!(max, max, 0), &constraint));
    assert!(satisfies(&version!(max, max, max), &constraint));

    let constraint = parse_constraint(&format!("^{max}")).expect("must parse");
    assert!(satisfies(&version!(max, 9, 9), &constraint));
}

/// Generate a release version as `(major, minor, patch)`.
fn release() -> impl Strategy<Value = (u64, u64, u64)> {
    (0..4u64, 0..4u64, 0..4u64)
}

/// Generate a concrete version, possibly with a pre-release.
fn concrete() -> impl Strategy<Value = String> {
    (release(), proptest::option::of(prop_oneof![Just("alpha"), Just("beta"), Just("rc.1")]))
        .prop_map(|((a, b, c), pre)| match pre {
            Some(pre) => format!("{a}.{b}.{c}-{pre}"),
            None => format!("{a}.{b}.{c}"),
        })
}

proptest! {
    /// `!=` is always the negation of `=` for concrete versions, pre-releases included.
    #[test]
    fn not_equal_negates_equal(clause in concrete(), target in concrete()) {
        let version = parse_version(&target).expect("must parse");
        let equal = parse_constraint(&format!("={clause}")).expect("must parse");
        let not_equal = parse_constraint(&format!("!={clause}")).expect("must parse");
        prop_assert_ne!(satisfies(&version, &equal), satisfies(&version, &not_equal));
    }
}

proptest! {
    /// Caret and tilde agree with the reference `semver` implementation for releases.
    #[test]
    fn caret_and_tilde_match_semver((a, b, c) in release(), (x, y, z) in release()) {
        let version = version!(x, y, z);
        let reference = semver::Version::new(x, y, z);
        for op in ["^", "~"] {
            let input = format!("{op}{a}.{b}.{c}");
            let ours = parse_constraint(&input).expect("must parse");
            let theirs = semver::VersionReq::parse(&input).expect("semver must parse");
            prop_assert_eq!(satisfies(&version, &ours), theirs.matches(&reference), "{} against {}", version, input);
        }
    }
}

proptest! {
    /// An OR of two constraints matches exactly when either side does.
    #[test]
    fn or_is_union((a, b, c) in release(), (d, e, f) in release(), (x, y, z) in release()) {
        let version = version!(x, y, z);
        let left = format!(">{a}.{b}.{c}");
        let right = format!("<{d}.{e}.{f}");
        let either = parse_constraint(&format!("{left} || {right}")).expect("must parse");
        let expected = check(&version.to_string(), &left) || check(&version.to_string(), &right);
        prop_assert_eq!(satisfies(&version, &either), expected);
    }
}
