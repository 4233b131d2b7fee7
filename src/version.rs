use std::{borrow::Cow, cmp::Ordering, fmt, str::FromStr};

use bon::Builder;
use compact_str::{CompactString, ToCompactString};
use derivative::Derivative;
use documented::Documented;
use duplicate::duplicate;
use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{
    PartialSchema, ToSchema,
    openapi::{ObjectBuilder, Type},
};

use crate::error::{self, Field, Malformed, VersionParseError};

/// The grammar reported when a version has the wrong overall shape.
pub(crate) const VERSION_GRAMMAR: &str = "MAJOR[.MINOR[.PATCH]][-PRERELEASE][+BUILD]";

/// A parsed semantic version.
///
/// Versions are written `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
/// Parsing is lenient in two ways:
/// - A leading `v` or `V` is stripped, so `v1.2.3` parses as `1.2.3`.
/// - Missing minor or patch components default to zero, so `1.2` parses as `1.2.0`.
///
/// ## Ordering
///
/// Versions order by precedence as defined by semver:
/// `major`, `minor`, and `patch` numerically, then a release outranks any pre-release,
/// then pre-release identifiers are compared pairwise (see [`Prerelease`]).
///
/// Build metadata is carried for display only:
/// it is ignored for ordering, equality, and hashing.
///
/// ```
/// # use semrange::Version;
/// let alpha = Version::parse("1.0.0-alpha").unwrap();
/// let release = Version::parse("v1.0.0+build.5").unwrap();
/// assert!(alpha < release);
/// assert_eq!(release, Version::new(1, 0, 0));
/// assert_eq!(release.to_string(), "1.0.0+build.5");
/// ```
#[derive(Clone, Debug, Builder, Derivative, Documented)]
#[builder(finish_fn = finish)]
#[derivative(Eq, PartialEq, Ord, PartialOrd, Hash)]
#[non_exhaustive]
pub struct Version {
    /// The major version.
    pub major: u64,

    /// The minor version.
    #[builder(default)]
    pub minor: u64,

    /// The patch version.
    #[builder(default)]
    pub patch: u64,

    /// The pre-release identifiers, empty for a release.
    #[builder(default)]
    pub pre: Prerelease,

    /// The build metadata.
    // Per semver, build metadata is not considered for equality or ordering.
    #[builder(default)]
    #[derivative(PartialEq = "ignore", PartialOrd = "ignore", Ord = "ignore", Hash = "ignore")]
    pub build: BuildMetadata,
}

impl Version {
    /// Create a release version with no pre-release or build metadata.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Prerelease::EMPTY,
            build: BuildMetadata::EMPTY,
        }
    }

    /// Parse the input string as a version.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, VersionParseError> {
        let input = input.as_ref();
        let lexed = lex(input)?;
        let [major, minor, patch] = lexed.core;

        // `lex` always yields a major component, even if it's empty.
        let major = numeric(input, Field::Major, major.unwrap_or_default())?;
        let minor = minor
            .map(|part| numeric(input, Field::Minor, part))
            .transpose()?;
        let patch = patch
            .map(|part| numeric(input, Field::Patch, part))
            .transpose()?;

        Ok(Self {
            major,
            minor: minor.unwrap_or_default(),
            patch: patch.unwrap_or_default(),
            pre: lexed
                .pre
                .map(|pre| Prerelease::parse(input, pre))
                .transpose()?
                .unwrap_or_default(),
            build: lexed
                .build
                .map(|build| BuildMetadata::parse(input, build))
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// Report whether the version has pre-release identifiers.
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Report whether `major.minor.patch` is identical between the two versions,
    /// ignoring pre-release and build metadata.
    pub fn same_release(&self, other: &Version) -> bool {
        (self.major, self.minor, self.patch) == (other.major, other.minor, other.patch)
    }

    /// The same `major.minor.patch` without any pre-release or build metadata.
    pub fn release(&self) -> Self {
        Self::new(self.major, self.minor, self.patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

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
    impl TryFrom<ty> for Version {
        type Error = VersionParseError;
        fn try_from(s: ty) -> Result<Self, Self::Error> {
            Self::parse(s)
        }
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

impl PartialSchema for Version {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ObjectBuilder::new()
            .description(Some(Self::DOCS))
            .examples([json!("1.0.0"), json!("v1.2"), json!("1.0.0-rc.1+build.5")])
            .min_length(Some(1))
            .schema_type(Type::String)
            .build()
            .into()
    }
}

impl ToSchema for Version {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Version")
    }
}

/// A single dot-separated pre-release identifier.
///
/// The variant order matters: numeric identifiers always have lower
/// precedence than alphanumeric ones.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Identifier {
    /// An identifier made up only of digits, compared numerically.
    Numeric(u64),

    /// Any other identifier, compared lexically in ASCII order.
    AlphaNumeric(CompactString),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{n}"),
            Identifier::AlphaNumeric(s) => write!(f, "{s}"),
        }
    }
}

/// The pre-release identifiers of a version, as in `alpha.1` for `1.0.0-alpha.1`.
///
/// ## Ordering
///
/// An empty pre-release (a release) sorts above every non-empty one.
/// Otherwise identifiers are compared left to right; if one list is a strict
/// prefix of the other, the shorter list sorts lower:
///
/// `1.0.0-alpha < 1.0.0-alpha.1 < 1.0.0-alpha.beta < 1.0.0-beta < 1.0.0-beta.2 < 1.0.0`
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Prerelease(Vec<Identifier>);

impl Prerelease {
    /// The empty pre-release, used by releases.
    pub const EMPTY: Self = Self(Vec::new());

    /// Report whether there are no identifiers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the identifiers.
    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.0.iter()
    }

    /// Parse the text after the `-` of `input`.
    fn parse(input: &str, pre: &str) -> Result<Self, VersionParseError> {
        identifiers(input, Field::Prerelease, pre)?
            .map(|identifier| {
                if !identifier.bytes().all(|b| b.is_ascii_digit()) {
                    return Ok(Identifier::AlphaNumeric(identifier.to_compact_string()));
                }
                numeric(input, Field::Prerelease, identifier).map(Identifier::Numeric)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl Ord for Prerelease {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            // `Vec` ordering is lexicographic, and a strict prefix sorts lower.
            (false, false) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Prerelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, identifier) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{identifier}")?;
        }
        Ok(())
    }
}

/// The build metadata of a version, as in `build.5` for `1.0.0+build.5`.
///
/// Identifiers are kept verbatim; they never affect precedence.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct BuildMetadata(Vec<CompactString>);

impl BuildMetadata {
    /// The empty build metadata.
    pub const EMPTY: Self = Self(Vec::new());

    /// Report whether there are no identifiers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the identifiers.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(CompactString::as_str)
    }

    /// Parse the text after the `+` of `input`.
    fn parse(input: &str, build: &str) -> Result<Self, VersionParseError> {
        Ok(Self(
            identifiers(input, Field::Build, build)?
                .map(CompactString::from)
                .collect(),
        ))
    }
}

impl fmt::Display for BuildMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, identifier) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(identifier)?;
        }
        Ok(())
    }
}

/// The sections of a version string, split apart but not yet validated.
///
/// Every slice borrows from the original input so errors can point into it.
#[derive(Debug)]
pub(crate) struct Lexed<'a> {
    /// `major`, `minor`, `patch`; `major` is always present.
    pub(crate) core: [Option<&'a str>; 3],
    pub(crate) pre: Option<&'a str>,
    pub(crate) build: Option<&'a str>,
}

/// Split a version string into its core components, pre-release, and build metadata.
pub(crate) fn lex(input: &str) -> Result<Lexed<'_>, VersionParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(VersionParseError::Empty);
    }
    let version = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);

    // In semver:
    // Build metadata MAY be denoted by appending a plus sign and a series of dot separated identifiers
    // immediately following the patch or pre-release version.
    let (version, build) = match version.split_once('+') {
        None => (version, None),
        Some((version, build)) => (version, Some(build)),
    };

    // In semver:
    // A pre-release version MAY be denoted by appending a hyphen and a series of dot separated identifiers
    // immediately following the patch version.
    let (version, pre) = match version.split_once('-') {
        None => (version, None),
        Some((version, pre)) => (version, Some(pre)),
    };

    let mut parts = version.split('.');
    let core = [parts.next(), parts.next(), parts.next()];
    if let Some(extra) = parts.next() {
        return Err(error::syntax!(input => extra, VERSION_GRAMMAR));
    }

    Ok(Lexed { core, pre, build })
}

/// Parse a single numeric field: ASCII digits without leading zeros.
pub(crate) fn numeric(input: &str, field: Field, part: &str) -> Result<u64, VersionParseError> {
    if part.is_empty() {
        return Err(error::field!(input, field => part, Malformed::Empty));
    }
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(error::field!(input, field => part, Malformed::NotNumeric));
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(error::field!(input, field => part, Malformed::LeadingZero));
    }
    part.parse()
        .map_err(|_| error::field!(input, field => part, Malformed::Overflow))
}

/// Split dot-separated identifiers, validating each against `[0-9A-Za-z-]+`.
fn identifiers<'a>(
    input: &str,
    field: Field,
    text: &'a str,
) -> Result<impl Iterator<Item = &'a str>, VersionParseError> {
    for identifier in text.split('.') {
        if identifier.is_empty() {
            return Err(error::field!(input, field => identifier, Malformed::Empty));
        }
        if !regex_is_match!(r"^[0-9A-Za-z-]+$", identifier) {
            return Err(error::field!(input, field => identifier, Malformed::InvalidCharacter));
        }
    }
    Ok(text.split('.'))
}

/// Create a [`Version`] in a manner that is known to not fail at compile time.
///
/// ```
/// # use semrange::Version;
/// let version = semrange::version!(1, 2, 3);
/// assert_eq!(version, Version::new(1, 2, 3));
/// ```
#[macro_export]
macro_rules! version {
    ($major:expr, $minor:expr, $patch:expr) => {
        $crate::Version::new($major, $minor, $patch)
    };

    // This is only meant for use internally, so it's undocumented.
    // Panics if the provided value fails to parse.
    (parse => $value:expr) => {
        $crate::Version::parse($value).expect("parse version")
    };
}
