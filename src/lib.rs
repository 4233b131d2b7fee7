#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod constraint;
mod error;
mod version;
mod wildcard;

pub use constraint::*;
pub use error::*;
pub use version::*;
pub use wildcard::*;

/// Parse the input string as a [`Version`].
///
/// ```
/// # use semrange::Version;
/// let version = semrange::parse_version("v1.2").unwrap();
/// assert_eq!(version, Version::new(1, 2, 0));
/// ```
#[tracing::instrument]
pub fn parse_version(input: &str) -> Result<Version, VersionParseError> {
    Version::parse(input)
}

/// Parse the input string as a [`Constraint`].
///
/// ```
/// # use semrange::Version;
/// let constraint = semrange::parse_constraint("^1.2.3 || 2.x").unwrap();
/// assert!(constraint.matches(&Version::new(2, 7, 0)));
/// ```
#[tracing::instrument]
pub fn parse_constraint(input: &str) -> Result<Constraint, ConstraintParseError> {
    Constraint::parse(input)
}

/// Report whether the version satisfies the constraint.
///
/// ```
/// let version = semrange::parse_version("1.2.3-beta").unwrap();
/// let constraint = semrange::parse_constraint(">1.0.0").unwrap();
/// assert!(!semrange::satisfies(&version, &constraint));
/// ```
#[tracing::instrument(skip_all, fields(%version, %constraint), ret)]
pub fn satisfies(version: &Version, constraint: &Constraint) -> bool {
    constraint.matches(version)
}
