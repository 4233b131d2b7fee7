//! # Version Constraints
//!
//! A constraint is a set of OR-groups, each of which is a set of AND-ed clauses:
//!
//! ```text
//! >=1.2.7 <1.3.0 || ^2.0.0-rc.1 || 3.x
//! ```
//!
//! ## Core Components
//!
//! - [`Clause<V>`]: A single comparison (equal, greater than, caret, etc.) where `V` is the clause's version type
//! - [`Group`]: Clauses combined with AND logic, plus the pre-release rule
//! - [`Constraint`]: Groups combined with OR logic
//! - [`Comparable<T>`]: Trait implementing the comparison rules for each operator
//!
//! ## Pre-release versions
//!
//! A version with a pre-release (`1.2.3-beta`) only satisfies a group with a range in it
//! (an ordering operator, `~`, `^`, or a wildcard) if every clause passes _and_ at least
//! one clause in the group names a pre-release of the same `major.minor.patch`.
//! This keeps unstable versions out of ranges that never asked for them.
//! Exact clauses like `!=1.0.0` are unaffected:
//!
//! ```
//! # use semrange::{Constraint, Version};
//! let beta = Version::parse("1.2.3-beta").unwrap();
//! assert!(!Constraint::parse(">1.0.0").unwrap().matches(&beta));
//! assert!(Constraint::parse(">=1.2.3-alpha <1.3.0").unwrap().matches(&beta));
//! assert!(Constraint::parse("!=1.0.0").unwrap().matches(&beta));
//! ```

use std::{borrow::Cow, fmt, str::FromStr};

use derive_more::Display;
use documented::Documented;
use duplicate::duplicate;
use enum_assoc::Assoc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::EnumString;
use utoipa::{
    PartialSchema, ToSchema,
    openapi::{ObjectBuilder, Type},
};

use crate::{ConstraintParseError, Unsatisfied, Version, WildcardVersion};

mod parse;

/// Enables comparison between clause versions and target versions.
///
/// - `Self` is the clause's version (e.g. the `1.2.x` in `<1.2.x`)
/// - Type parameter `V` is the target version being evaluated
/// - Methods like `less()` check if `V` is less than `Self`, not the other way around
///
/// So for a clause like `<2.0.0`, `less` reports whether the target is less than `2.0.0`.
pub trait Comparable<V> {
    /// Implements the "equal to" clause (`=` operator, or no operator at all).
    fn equal(&self, v: &V) -> bool;

    /// Implements the "less than" clause (`<` operator).
    fn less(&self, v: &V) -> bool;

    /// Implements the "greater than" clause (`>` operator).
    fn greater(&self, v: &V) -> bool;

    /// Implements the tilde clause (`~` operator): patch-level changes
    /// if a minor version is specified, minor-level changes if not.
    fn tilde(&self, v: &V) -> bool;

    /// Implements the caret clause (`^` operator): changes that do not modify
    /// the left-most non-zero component.
    fn caret(&self, v: &V) -> bool;

    /// Implements the "not equal to" clause (`!=` operator).
    ///
    /// Default implementation uses the negation of `equal`.
    fn not_equal(&self, v: &V) -> bool {
        !self.equal(v)
    }

    /// Implements the "less than or equal to" clause (`<=` operator).
    ///
    /// Default implementation combines `equal` and `less`.
    fn less_or_equal(&self, v: &V) -> bool {
        self.equal(v) || self.less(v)
    }

    /// Implements the "greater than or equal to" clause (`>=` operator).
    ///
    /// Default implementation combines `equal` and `greater`.
    fn greater_or_equal(&self, v: &V) -> bool {
        self.equal(v) || self.greater(v)
    }
}

impl Comparable<Version> for WildcardVersion {
    fn equal(&self, v: &Version) -> bool {
        self.prefix_matches(v) && (self.is_wildcard() || self.pre() == &v.pre)
    }

    fn less(&self, v: &Version) -> bool {
        if self.is_wildcard() {
            self.ceiling().is_none_or(|ceiling| v < &ceiling)
        } else {
            v < &self.floor()
        }
    }

    fn greater(&self, v: &Version) -> bool {
        v > &self.floor()
    }

    fn less_or_equal(&self, v: &Version) -> bool {
        // Wildcards resolve to their floor: `<=1.2.x` is `<=1.2.0`.
        v <= &self.floor()
    }

    fn greater_or_equal(&self, v: &Version) -> bool {
        // Wildcards prefix-match pre-releases of the floor, which are below it.
        v >= &self.floor()
    }

    fn tilde(&self, v: &Version) -> bool {
        let (lower, upper) = self.tilde_bounds();
        within(v, &lower, upper.as_ref())
    }

    fn caret(&self, v: &Version) -> bool {
        let (lower, upper) = self.caret_bounds();
        within(v, &lower, upper.as_ref())
    }
}

impl Comparable<Version> for Version {
    fn equal(&self, v: &Version) -> bool {
        self == v
    }

    fn less(&self, v: &Version) -> bool {
        v < self
    }

    fn greater(&self, v: &Version) -> bool {
        v > self
    }

    fn tilde(&self, v: &Version) -> bool {
        WildcardVersion::from(self).tilde(v)
    }

    fn caret(&self, v: &Version) -> bool {
        WildcardVersion::from(self).caret(v)
    }
}

/// Report whether `version` lies in `[lower, upper)`; `None` means unbounded.
fn within(version: &Version, lower: &Version, upper: Option<&Version>) -> bool {
    version >= lower && upper.is_none_or(|upper| version < upper)
}

/// The comparison operators that may prefix a clause.
///
/// ```
/// # use semrange::Operator;
/// assert_eq!("=>".parse::<Operator>(), Ok(Operator::GreaterOrEqual));
/// assert_eq!(Operator::GreaterOrEqual.to_string(), ">=");
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, EnumString, strum::Display, Assoc)]
#[func(const fn is_range(&self) -> bool)]
#[non_exhaustive]
pub enum Operator {
    /// `=`
    #[strum(to_string = "=")]
    #[assoc(is_range = false)]
    Equal,

    /// `!=`
    #[strum(to_string = "!=")]
    #[assoc(is_range = false)]
    NotEqual,

    /// `<`
    #[strum(to_string = "<")]
    #[assoc(is_range = true)]
    Less,

    /// `<=`, also written `=<`
    #[strum(to_string = "<=", serialize = "=<")]
    #[assoc(is_range = true)]
    LessOrEqual,

    /// `>`
    #[strum(to_string = ">")]
    #[assoc(is_range = true)]
    Greater,

    /// `>=`, also written `=>`
    #[strum(to_string = ">=", serialize = "=>")]
    #[assoc(is_range = true)]
    GreaterOrEqual,

    /// `~`, also written `~>`
    #[strum(to_string = "~", serialize = "~>")]
    #[assoc(is_range = true)]
    Tilde,

    /// `^`
    #[strum(to_string = "^")]
    #[assoc(is_range = true)]
    Caret,
}

impl Operator {
    /// The operators accepted by the parser, for error messages.
    pub const EXPECTED: &'static str = "'=', '!=', '<', '<=', '=<', '>', '>=', '=>', '~', '~>', '^'";
}

/// A single comparison against a version.
///
/// The generic parameter `V` is the clause's version type.
/// Parsed clauses always use [`WildcardVersion`],
/// but clauses over concrete [`Version`]s are also supported:
///
/// ```
/// # use semrange::{Clause, Version, WildcardVersion};
/// let concrete = Clause::Less(Version::new(2, 0, 0));
/// let partial = Clause::Less(WildcardVersion::parse("1.x").unwrap());
/// assert!(concrete.matches(&Version::new(1, 9, 9)));
/// assert!(partial.matches(&Version::new(1, 9, 9)));
/// assert!(!partial.matches(&Version::new(2, 0, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Clause<V = WildcardVersion> {
    /// A version written without an operator; equivalent to [`Clause::Equal`].
    Bare(V),

    /// `=`
    Equal(V),

    /// `!=`
    NotEqual(V),

    /// `<`
    Less(V),

    /// `<=`
    LessOrEqual(V),

    /// `>`
    Greater(V),

    /// `>=`
    GreaterOrEqual(V),

    /// `~`
    Tilde(V),

    /// `^`
    Caret(V),
}

impl<V> Clause<V> {
    /// The version the clause compares against.
    pub const fn version(&self) -> &V {
        match self {
            Clause::Bare(v)
            | Clause::Equal(v)
            | Clause::NotEqual(v)
            | Clause::Less(v)
            | Clause::LessOrEqual(v)
            | Clause::Greater(v)
            | Clause::GreaterOrEqual(v)
            | Clause::Tilde(v)
            | Clause::Caret(v) => v,
        }
    }

    /// The operator of the clause, or `None` for a bare version.
    pub const fn operator(&self) -> Option<Operator> {
        match self {
            Clause::Bare(_) => None,
            Clause::Equal(_) => Some(Operator::Equal),
            Clause::NotEqual(_) => Some(Operator::NotEqual),
            Clause::Less(_) => Some(Operator::Less),
            Clause::LessOrEqual(_) => Some(Operator::LessOrEqual),
            Clause::Greater(_) => Some(Operator::Greater),
            Clause::GreaterOrEqual(_) => Some(Operator::GreaterOrEqual),
            Clause::Tilde(_) => Some(Operator::Tilde),
            Clause::Caret(_) => Some(Operator::Caret),
        }
    }

    /// Create a clause from an optional operator and a version.
    pub fn new(operator: Option<Operator>, version: V) -> Self {
        match operator {
            None => Clause::Bare(version),
            Some(Operator::Equal) => Clause::Equal(version),
            Some(Operator::NotEqual) => Clause::NotEqual(version),
            Some(Operator::Less) => Clause::Less(version),
            Some(Operator::LessOrEqual) => Clause::LessOrEqual(version),
            Some(Operator::Greater) => Clause::Greater(version),
            Some(Operator::GreaterOrEqual) => Clause::GreaterOrEqual(version),
            Some(Operator::Tilde) => Clause::Tilde(version),
            Some(Operator::Caret) => Clause::Caret(version),
        }
    }

    /// Evaluates whether a version satisfies this clause.
    ///
    /// This does not apply the pre-release rule, which needs the whole [`Group`].
    pub fn matches<T>(&self, version: &T) -> bool
    where
        V: Comparable<T>,
    {
        match self {
            Clause::Bare(s) | Clause::Equal(s) => s.equal(version),
            Clause::NotEqual(s) => s.not_equal(version),
            Clause::Less(s) => s.less(version),
            Clause::LessOrEqual(s) => s.less_or_equal(version),
            Clause::Greater(s) => s.greater(version),
            Clause::GreaterOrEqual(s) => s.greater_or_equal(version),
            Clause::Tilde(s) => s.tilde(version),
            Clause::Caret(s) => s.caret(version),
        }
    }

    /// Transforms the clause's inner version by reference, preserving the operator.
    pub fn map_ref<'a, R, F: Fn(&'a V) -> R>(&'a self, closure: F) -> Clause<R> {
        Clause::new(self.operator(), closure(self.version()))
    }

    /// Transforms the clause's inner version by consuming it, preserving the operator.
    pub fn map<R>(self, closure: impl Fn(V) -> R) -> Clause<R> {
        let operator = self.operator();
        let version = match self {
            Clause::Bare(v)
            | Clause::Equal(v)
            | Clause::NotEqual(v)
            | Clause::Less(v)
            | Clause::LessOrEqual(v)
            | Clause::Greater(v)
            | Clause::GreaterOrEqual(v)
            | Clause::Tilde(v)
            | Clause::Caret(v) => v,
        };
        Clause::new(operator, closure(version))
    }
}

impl<V: fmt::Display> fmt::Display for Clause<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator() {
            Some(operator) => write!(f, "{operator}{}", self.version()),
            None => write!(f, "{}", self.version()),
        }
    }
}

impl Clause {
    /// Report whether the clause covers a range of versions rather than naming exactly one.
    ///
    /// Ordering operators and wildcards are ranges; `=1.2.3` and `!=1.2.3` are not.
    fn is_range(&self) -> bool {
        self.operator().is_some_and(|operator| operator.is_range())
            || self.version().is_wildcard()
    }
}

impl From<Clause<Version>> for Clause {
    fn from(clause: Clause<Version>) -> Self {
        clause.map(WildcardVersion::from)
    }
}

/// Clauses combined with AND logic.
///
/// ```
/// # use semrange::{Group, Version};
/// let range = semrange::group!(
///     { GreaterOrEqual => semrange::wildcard!("1.0.0") },
///     { Less => semrange::wildcard!("2.0.0") },
/// );
/// assert!(range.matches(&Version::new(1, 5, 0)));
/// assert!(!range.matches(&Version::new(2, 5, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Group(Vec<Clause>);

impl Group {
    /// Iterate over clauses in the group.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.0.iter()
    }

    /// The number of clauses in the group.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Report whether the group has no clauses.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Evaluates if a version satisfies every clause in the group,
    /// without applying the pre-release rule.
    pub fn all_match<T>(&self, version: &T) -> bool
    where
        WildcardVersion: Comparable<T>,
    {
        self.iter().all(|clause| clause.matches(version))
    }

    /// Evaluates if a version satisfies the group.
    ///
    /// Every clause must match. If the version is a pre-release and the group holds a range
    /// (an ordering operator or a wildcard), at least one clause must also name
    /// a pre-release of the same `major.minor.patch`.
    pub fn matches(&self, version: &Version) -> bool {
        self.all_match(version) && self.admits(version)
    }

    /// Report the first reason the group rejects the version, if any.
    pub fn violation(&self, version: &Version) -> Option<Violation> {
        if let Some(clause) = self.iter().find(|clause| !clause.matches(version)) {
            return Some(Violation::Clause(clause.clone()));
        }
        if !self.admits(version) {
            return Some(Violation::Prerelease(version.release()));
        }
        None
    }

    fn admits(&self, version: &Version) -> bool {
        if !version.is_prerelease() || !self.iter().any(|clause| clause.is_range()) {
            return true;
        }
        let admitted = self
            .iter()
            .any(|clause| clause.version().names_prerelease_of(version));
        if !admitted {
            tracing::trace!(%version, group = %self, "pre-release not named by any clause");
        }
        admitted
    }
}

impl From<Vec<Clause>> for Group {
    fn from(clauses: Vec<Clause>) -> Self {
        Self(clauses)
    }
}

impl From<Clause> for Group {
    fn from(clause: Clause) -> Self {
        Self(vec![clause])
    }
}

impl FromIterator<Clause> for Group {
    fn from_iter<I: IntoIterator<Item = Clause>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Group {
    type Item = Clause;
    type IntoIter = std::vec::IntoIter<Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Group {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

/// A version range: OR-groups of AND-ed clauses.
///
/// The empty constraint (parsed from blank input) matches every version,
/// including pre-releases. Note that `*` is different: it is a clause,
/// so it follows the pre-release rule and only matches releases.
///
/// ```
/// # use semrange::{Constraint, Version};
/// let constraint = Constraint::parse("<2.0.0 || >3.0.0").unwrap();
/// assert!(constraint.matches(&Version::new(1, 0, 1)));
/// assert!(!constraint.matches(&Version::new(2, 5, 0)));
/// assert_eq!(constraint.to_string(), "<2.0.0 || >3.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Documented)]
pub struct Constraint(Vec<Group>);

impl Constraint {
    /// Parse the input string as a constraint.
    ///
    /// Groups are separated by `||`; clauses within a group by whitespace or commas.
    /// Hyphen ranges (`1.2.3 - 2.3.4`) expand to `>=1.2.3 <=2.3.4`.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, ConstraintParseError> {
        parse::constraint(input.as_ref())
    }

    /// Iterate over the OR-groups.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.0.iter()
    }

    /// Report whether the constraint has no groups, and therefore matches everything.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Evaluates if a version satisfies at least one group.
    pub fn matches(&self, version: &Version) -> bool {
        self.is_empty() || self.groups().any(|group| group.matches(version))
    }

    /// Like [`Constraint::matches`], but explains a failure:
    /// the returned error holds the first reason each group rejected the version.
    ///
    /// ```
    /// # use semrange::{Constraint, Version, Violation};
    /// let constraint = Constraint::parse(">=1.0.0 <2.0.0").unwrap();
    /// let err = constraint.validate(&Version::new(2, 1, 0)).unwrap_err();
    /// let expected = semrange::clause!(Less => semrange::wildcard!("2.0.0"));
    /// assert_eq!(err.violations, vec![Violation::Clause(expected)]);
    /// ```
    pub fn validate(&self, version: &Version) -> Result<(), Unsatisfied> {
        if self.matches(version) {
            return Ok(());
        }
        Err(Unsatisfied {
            version: version.clone(),
            constraint: self.clone(),
            violations: self
                .groups()
                .filter_map(|group| group.violation(version))
                .collect(),
        })
    }
}

impl From<Vec<Group>> for Constraint {
    fn from(groups: Vec<Group>) -> Self {
        Self(groups)
    }
}

impl From<Group> for Constraint {
    fn from(group: Group) -> Self {
        Self(vec![group])
    }
}

impl FromIterator<Group> for Constraint {
    fn from_iter<I: IntoIterator<Item = Group>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            write!(f, "{group}")?;
        }
        Ok(())
    }
}

impl FromStr for Constraint {
    type Err = ConstraintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

duplicate! {
    [
        ty;
        [ &str ];
        [ &String ];
        [ String ];
    ]
    impl TryFrom<ty> for Constraint {
        type Error = ConstraintParseError;
        fn try_from(s: ty) -> Result<Self, Self::Error> {
            Self::parse(s)
        }
    }
}

impl Serialize for Constraint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Constraint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

impl PartialSchema for Constraint {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ObjectBuilder::new()
            .description(Some(Self::DOCS))
            .examples([json!(">=1.2.7 <1.3.0"), json!("^2.0.0 || ~1.4"), json!("1.x")])
            .schema_type(Type::String)
            .build()
            .into()
    }
}

impl ToSchema for Constraint {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Constraint")
    }
}

/// The reason a [`Group`] rejected a version.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[non_exhaustive]
pub enum Violation {
    /// The clause did not match the version.
    #[display("'{_0}' did not match")]
    Clause(Clause),

    /// Every clause matched, but the version is a pre-release
    /// and no clause names a pre-release of this `major.minor.patch`.
    #[display("no clause names a pre-release of {_0}")]
    Prerelease(Version),
}

/// Construct a [`Clause`], guaranteed to be valid at compile time.
///
/// ```
/// # use semrange::{Clause, Component, WildcardVersion};
/// let clause = semrange::clause!(Caret => semrange::wildcard!("1.2"));
/// assert_eq!(clause.version().patch(), Component::Wildcard);
/// assert_eq!(clause.to_string(), "^1.2.x");
/// ```
#[macro_export]
macro_rules! clause {
    ($variant:ident => $($tail:tt)*) => {
        $crate::Clause::$variant($($tail)*)
    };
}

/// Construct a [`Group`] of clauses, guaranteed to be valid at compile time.
///
/// ```
/// # use semrange::{Clause, Group};
/// let group = semrange::group!(
///     { GreaterOrEqual => semrange::wildcard!("1.0.0") },
///     { Less => semrange::wildcard!("2") },
/// );
/// assert_eq!(group.to_string(), ">=1.0.0 <2.x");
/// ```
#[macro_export]
macro_rules! group {
    ($({ $variant:ident => $($version:tt)* }),* $(,)?) => {
        $crate::Group::from(vec![
            $(
                $crate::Clause::$variant($($version)*)
            ),*
        ])
    };
}
