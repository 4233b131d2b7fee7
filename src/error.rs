use miette::{Diagnostic, SourceSpan};
use strum::Display;
use thiserror::Error;

/// Records all errors reported by this library.
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Errors encountered while parsing a [`Version`](crate::Version).
    #[error(transparent)]
    #[diagnostic(transparent)]
    Version(#[from] VersionParseError),

    /// Errors encountered while parsing a [`Constraint`](crate::Constraint).
    #[error(transparent)]
    #[diagnostic(transparent)]
    Constraint(#[from] ConstraintParseError),

    /// A version did not satisfy a [`Constraint`](crate::Constraint).
    #[error(transparent)]
    #[diagnostic(transparent)]
    Unsatisfied(#[from] Unsatisfied),
}

/// Errors encountered when parsing a version, either concrete
/// ([`Version`](crate::Version)) or wildcarded ([`WildcardVersion`](crate::WildcardVersion)).
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum VersionParseError {
    /// The provided value was empty.
    #[error("version input was empty")]
    Empty,

    /// The input did not match the overall version shape.
    #[error("input '{input}' did not match required syntax {expected}")]
    Syntax {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// A description of the expected grammar.
        expected: &'static str,

        /// The location of the error.
        #[label("unexpected")]
        span: SourceSpan,
    },

    /// A single field of the version failed to parse.
    #[error("invalid {field} '{found}' in version '{input}': {reason}")]
    Field {
        /// The field that failed.
        field: Field,

        /// The text of the field that failed.
        found: String,

        /// The input originally provided.
        #[source_code]
        input: String,

        /// Why the field was rejected.
        #[source]
        reason: Malformed,

        /// The location of the error.
        #[label("invalid field")]
        span: SourceSpan,
    },
}

/// Errors encountered when parsing a [`Constraint`](crate::Constraint) from a string.
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ConstraintParseError {
    /// An OR-group between `||` separators was blank.
    #[error("empty OR-group in constraint '{input}'")]
    EmptyGroup {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// The location of the blank group.
        #[label("expected at least one clause")]
        span: SourceSpan,
    },

    /// The clause began with an operator that isn't supported.
    #[error("unknown operator '{operator}' in constraint '{input}', expected one of {}", crate::Operator::EXPECTED)]
    UnknownOperator {
        /// The operator text.
        operator: String,

        /// The input originally provided.
        #[source_code]
        input: String,

        /// The error returned by the operator parser.
        #[source]
        error: strum::ParseError,

        /// The location of the operator.
        #[label("operator")]
        span: SourceSpan,
    },

    /// An operator was not followed by a version.
    #[error("operator '{operator}' is missing a version in constraint '{input}'")]
    MissingVersion {
        /// The operator text.
        operator: String,

        /// The input originally provided.
        #[source_code]
        input: String,

        /// The location of the operator.
        #[label("expected a version after this")]
        span: SourceSpan,
    },

    /// The version part of a clause failed to parse.
    #[error("invalid version '{version}' in constraint '{input}': {error}")]
    Version {
        /// The version text.
        version: String,

        /// The input originally provided.
        #[source_code]
        input: String,

        /// The error encountered while parsing the version.
        #[source]
        error: VersionParseError,

        /// The location of the version.
        #[label("version")]
        span: SourceSpan,
    },

    /// The clause list did not match the required syntax.
    #[error("input '{input}' did not match required constraint syntax")]
    Syntax {
        /// The input originally provided.
        #[source_code]
        input: String,

        /// The location of the error.
        #[label("unexpected")]
        span: SourceSpan,
    },
}

/// Reported by [`Constraint::validate`](crate::Constraint::validate)
/// when no group of the constraint matches the version.
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[error("version '{version}' does not satisfy constraint '{constraint}': {}", explain(.violations))]
#[non_exhaustive]
pub struct Unsatisfied {
    /// The version that was evaluated.
    pub version: crate::Version,

    /// The constraint it was evaluated against.
    pub constraint: crate::Constraint,

    /// The first reason each group rejected the version, in group order.
    pub violations: Vec<crate::Violation>,
}

fn explain(violations: &[crate::Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Names the part of a version that failed to parse.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum Field {
    /// The major component.
    Major,

    /// The minor component.
    Minor,

    /// The patch component.
    Patch,

    /// A pre-release identifier.
    #[strum(to_string = "pre-release identifier")]
    Prerelease,

    /// A build metadata identifier.
    #[strum(to_string = "build identifier")]
    Build,
}

/// Reasons a version field is rejected.
#[derive(Error, Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum Malformed {
    /// The field was present but empty, as in `1..2` or `1.0.0-`.
    #[error("must not be empty")]
    Empty,

    /// The field must consist of ASCII digits.
    #[error("must be numeric")]
    NotNumeric,

    /// Numeric fields other than `0` must not start with `0`.
    #[error("must not have leading zeros")]
    LeadingZero,

    /// The number doesn't fit in 64 bits.
    #[error("must fit in an unsigned 64 bit integer")]
    Overflow,

    /// Identifiers are restricted to `[0-9A-Za-z-]`.
    #[error("must only contain ASCII alphanumerics and hyphens")]
    InvalidCharacter,

    /// A literal component followed a wildcard, as in `1.x.3`.
    #[error("must be a wildcard when a preceding component is a wildcard")]
    LiteralAfterWildcard,

    /// Labels were attached to a wildcarded version, as in `1.x-beta`.
    #[error("is only allowed on fully specified versions")]
    LabelOnWildcard,
}

/// Return the span of `fragment` inside `text`.
///
/// Fragments are normally sub-slices of `text`, so their position is
/// recovered from the pointers; otherwise this falls back to a search.
pub(crate) fn span(text: &str, fragment: &str) -> SourceSpan {
    let start = (fragment.as_ptr() as usize)
        .checked_sub(text.as_ptr() as usize)
        .filter(|start| start + fragment.len() <= text.len())
        .or_else(|| text.find(fragment));
    match start {
        Some(start) => (start, fragment.len()).into(),
        None => (0, text.len()).into(),
    }
}

/// Construct a [`VersionParseError::Field`].
///
/// Provide the input, the field and its text, and the reason it was rejected.
///
/// ```ignore
/// error::field!(input, Field::Major => part, Malformed::LeadingZero);
/// ```
macro_rules! field {
    ($input:expr, $field:expr => $found:expr, $reason:expr) => {
        $crate::error::VersionParseError::Field {
            field: $field,
            found: $found.to_string(),
            input: $input.to_string(),
            reason: $reason,
            span: $crate::error::span($input, $found),
        }
    };
}
pub(crate) use field;

/// Construct a [`VersionParseError::Syntax`].
///
/// ```ignore
/// error::syntax!(input => fragment, "MAJOR[.MINOR[.PATCH]]");
/// ```
macro_rules! syntax {
    ($input:expr => $fragment:expr, $expected:expr) => {
        $crate::error::VersionParseError::Syntax {
            input: $input.to_string(),
            expected: $expected,
            span: $crate::error::span($input, $fragment),
        }
    };
}
pub(crate) use syntax;
