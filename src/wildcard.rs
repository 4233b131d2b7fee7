use std::fmt;

use derive_more::Display;

use crate::{
    Version,
    error::{self, Field, Malformed, VersionParseError},
    version::{BuildMetadata, Prerelease, lex, numeric},
};

/// A single `major`, `minor`, or `patch` component of a [`WildcardVersion`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum Component {
    /// A concrete number.
    #[display("{_0}")]
    Literal(u64),

    /// Any number at all: written `x`, `X`, `*`, or left out.
    #[display("x")]
    Wildcard,
}

impl Component {
    /// The literal value, if any.
    pub const fn literal(self) -> Option<u64> {
        match self {
            Component::Literal(n) => Some(n),
            Component::Wildcard => None,
        }
    }

    /// Report whether the component is a wildcard.
    pub const fn is_wildcard(self) -> bool {
        matches!(self, Component::Wildcard)
    }
}

/// A version as written in a constraint clause,
/// where any suffix of `major.minor.patch` may be left unconstrained.
///
/// Wildcards are written as `x`, `X`, `*`, or by leaving the component out:
/// `1.2.x`, `1.2.*` and `1.2` all mean "any patch of 1.2".
/// Once a component is a wildcard, every later component is too.
///
/// Pre-release and build labels are only permitted when no component is a wildcard.
///
/// ```
/// # use semrange::{Component, Version, WildcardVersion};
/// let version = WildcardVersion::parse("1.2.x").unwrap();
/// assert_eq!(version.minor(), Component::Literal(2));
/// assert!(version.patch().is_wildcard());
/// assert_eq!(version.floor(), Version::new(1, 2, 0));
/// assert_eq!(version.ceiling(), Some(Version::new(1, 3, 0)));
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct WildcardVersion {
    major: Component,
    minor: Component,
    patch: Component,
    pre: Prerelease,
    build: BuildMetadata,
}

impl WildcardVersion {
    /// The version that matches anything, written `*`.
    pub const ANY: Self = Self {
        major: Component::Wildcard,
        minor: Component::Wildcard,
        patch: Component::Wildcard,
        pre: Prerelease::EMPTY,
        build: BuildMetadata::EMPTY,
    };

    /// Parse the input string as a possibly partial or wildcarded version.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, VersionParseError> {
        let input = input.as_ref();
        let lexed = lex(input)?;

        let mut components = [Component::Wildcard; 3];
        let fields = [Field::Major, Field::Minor, Field::Patch];
        let mut wildcarded = false;
        for ((slot, field), part) in components.iter_mut().zip(fields).zip(lexed.core) {
            match part {
                None | Some("x" | "X" | "*") => wildcarded = true,
                Some(part) if wildcarded => {
                    return Err(error::field!(input, field => part, Malformed::LiteralAfterWildcard));
                }
                Some(part) => *slot = Component::Literal(numeric(input, field, part)?),
            }
        }
        let [major, minor, patch] = components;

        // Labels only mean something when attached to a concrete version.
        if wildcarded {
            if let Some(pre) = lexed.pre {
                return Err(error::field!(input, Field::Prerelease => pre, Malformed::LabelOnWildcard));
            }
            if let Some(build) = lexed.build {
                return Err(error::field!(input, Field::Build => build, Malformed::LabelOnWildcard));
            }
            return Ok(Self {
                major,
                minor,
                patch,
                ..Self::ANY
            });
        }

        // Parse the labels with the same rules as a concrete version.
        let Version { pre, build, .. } = Version::parse(input)?;
        Ok(Self {
            major,
            minor,
            patch,
            pre,
            build,
        })
    }

    /// The major component.
    pub const fn major(&self) -> Component {
        self.major
    }

    /// The minor component.
    pub const fn minor(&self) -> Component {
        self.minor
    }

    /// The patch component.
    pub const fn patch(&self) -> Component {
        self.patch
    }

    /// The pre-release identifiers; always empty when wildcarded.
    pub const fn pre(&self) -> &Prerelease {
        &self.pre
    }

    /// The build metadata; always empty when wildcarded.
    pub const fn build(&self) -> &BuildMetadata {
        &self.build
    }

    /// Report whether any component is a wildcard.
    pub const fn is_wildcard(&self) -> bool {
        // Wildcards are always a suffix, so the patch is enough.
        self.patch.is_wildcard()
    }

    /// The lowest version consistent with the literal components:
    /// wildcards resolve to zero, as in `1.2.x` to `1.2.0`.
    pub fn floor(&self) -> Version {
        Version {
            pre: self.pre.clone(),
            build: self.build.clone(),
            ..Version::new(
                self.major.literal().unwrap_or_default(),
                self.minor.literal().unwrap_or_default(),
                self.patch.literal().unwrap_or_default(),
            )
        }
    }

    /// The exclusive upper bound of the versions this matches by wildcard,
    /// as in `1.2.x` to `1.3.0` or `1.x` to `2.0.0`.
    ///
    /// Returns `None` if the range is unbounded (`*`), if the bound overflows,
    /// or if there is no wildcard at all.
    pub fn ceiling(&self) -> Option<Version> {
        match (self.major, self.minor, self.patch) {
            (Component::Literal(major), Component::Literal(minor), Component::Wildcard) => {
                Some(Version::new(major, minor.checked_add(1)?, 0))
            }
            (Component::Literal(major), Component::Wildcard, _) => {
                Some(Version::new(major.checked_add(1)?, 0, 0))
            }
            _ => None,
        }
    }

    /// The half-open range allowed by the tilde operator:
    /// patch-level changes if the minor is given, minor-level changes otherwise.
    ///
    /// - `~1.2.3` is `>=1.2.3, <1.3.0`
    /// - `~1.2` is `>=1.2.0, <1.3.0`
    /// - `~1` is `>=1.0.0, <2.0.0`
    pub fn tilde_bounds(&self) -> (Version, Option<Version>) {
        let upper = match (self.major, self.minor) {
            (Component::Literal(major), Component::Literal(minor)) => {
                minor.checked_add(1).map(|minor| Version::new(major, minor, 0))
            }
            (Component::Literal(major), Component::Wildcard) => {
                major.checked_add(1).map(|major| Version::new(major, 0, 0))
            }
            (Component::Wildcard, _) => None,
        };
        (self.floor(), upper)
    }

    /// The half-open range allowed by the caret operator:
    /// changes that do not modify the left-most non-zero component.
    ///
    /// - `^1.2.3` is `>=1.2.3, <2.0.0`
    /// - `^0.2.3` is `>=0.2.3, <0.3.0`
    /// - `^0.0.3` is `>=0.0.3, <0.0.4`
    /// - `^0.0` is `>=0.0.0, <0.1.0`
    /// - `^0` is `>=0.0.0, <1.0.0`
    pub fn caret_bounds(&self) -> (Version, Option<Version>) {
        use Component::*;
        let bump = |n: u64| n.checked_add(1);
        let upper = match (self.major, self.minor, self.patch) {
            (Wildcard, _, _) => None,
            (Literal(0), Literal(0), Literal(patch)) => bump(patch).map(|p| Version::new(0, 0, p)),
            (Literal(0), Literal(0), Wildcard) => Some(Version::new(0, 1, 0)),
            (Literal(0), Literal(minor), _) => bump(minor).map(|m| Version::new(0, m, 0)),
            (Literal(major), _, _) => bump(major).map(|m| Version::new(m, 0, 0)),
        };
        (self.floor(), upper)
    }

    /// Report whether the literal components equal those of `version`,
    /// ignoring wildcarded components along with any pre-release or build labels.
    pub fn prefix_matches(&self, version: &Version) -> bool {
        [
            (self.major, version.major),
            (self.minor, version.minor),
            (self.patch, version.patch),
        ]
        .into_iter()
        .all(|(expected, actual)| match expected {
            Component::Literal(expected) => expected == actual,
            Component::Wildcard => true,
        })
    }

    /// Report whether this names a pre-release of the same `major.minor.patch` as `version`.
    ///
    /// This is what allows a pre-release version to satisfy a group of clauses;
    /// see [`Group::matches`](crate::Group::matches).
    pub fn names_prerelease_of(&self, version: &Version) -> bool {
        !self.pre.is_empty() && !self.is_wildcard() && self.floor().same_release(version)
    }
}

impl From<Version> for WildcardVersion {
    fn from(version: Version) -> Self {
        Self {
            major: Component::Literal(version.major),
            minor: Component::Literal(version.minor),
            patch: Component::Literal(version.patch),
            pre: version.pre,
            build: version.build,
        }
    }
}

impl From<&Version> for WildcardVersion {
    fn from(version: &Version) -> Self {
        version.clone().into()
    }
}

impl fmt::Display for WildcardVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Render the shortest form that parses back to the same value:
        // `*`, `1.x`, `1.2.x`, or the full version.
        match (self.major, self.minor, self.patch) {
            (Component::Wildcard, _, _) => f.write_str("*"),
            (major, minor @ Component::Wildcard, _) => write!(f, "{major}.{minor}"),
            (major, minor, patch @ Component::Wildcard) => write!(f, "{major}.{minor}.{patch}"),
            _ => write!(f, "{}", self.floor()),
        }
    }
}

impl std::str::FromStr for WildcardVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Create a [`WildcardVersion`] from a string, panicking if it doesn't parse.
///
/// ```
/// # use semrange::{Version, WildcardVersion};
/// let version = semrange::wildcard!("1.x");
/// assert_eq!(version.ceiling(), Some(Version::new(2, 0, 0)));
/// ```
#[macro_export]
macro_rules! wildcard {
    ($value:expr) => {
        $crate::WildcardVersion::parse($value).expect("parse wildcard version")
    };
}
