use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use semver::Version;

use crate::version::error::VersionError;

/// A parsed version token that keeps the text it was read from.
///
/// Equality, ordering and hashing use the parsed value only, so `"1.1"` and
/// `"1.1.0"` are the same version while `Display` still shows what the
/// repository or profile published.
///
/// A bundle qualifier (`1.2.3.qualifier`) orders after the bare release, and
/// qualifiers compare as plain strings, so `"10"` sorts before `"9"`.
#[derive(Debug, Clone)]
pub struct VersionString {
    raw: String,
    parsed: Version,
    qualifier: Option<String>,
}

impl VersionString {
    /// The version exactly as it was written (trimmed)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn version(&self) -> &Version {
        &self.parsed
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl FromStr for VersionString {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_version(s)
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for VersionString {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed && self.qualifier == other.qualifier
    }
}

impl Eq for VersionString {}

impl PartialOrd for VersionString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed
            .cmp(&other.parsed)
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl Hash for VersionString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parsed.hash(state);
        self.qualifier.hash(state);
    }
}

/// Parse a version string, normalizing partial and bundle-style versions.
///
/// Handles a leading 'v', partial versions padded with zeros, and
/// four-segment versions whose last segment is a qualifier.
///
/// Examples:
/// - "1" -> 1.0.0
/// - "v1.2" -> 1.2.0
/// - "1.2.3-rc.1" -> 1.2.3-rc.1
/// - "1.2.3.v20120601_1200" -> 1.2.3 with qualifier "v20120601_1200"
pub fn parse_version(version: &str) -> Result<VersionString, VersionError> {
    let trimmed = version.trim();
    let invalid = || VersionError::InvalidVersion(version.to_string());

    let unprefixed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    if unprefixed.is_empty() {
        return Err(invalid());
    }

    let (parsed, qualifier) = match split_qualifier(unprefixed) {
        Some((core, qualifier)) => (Version::parse(core), Some(qualifier.to_string())),
        None => (Version::parse(&pad(unprefixed)), None),
    };

    Ok(VersionString {
        raw: trimmed.to_string(),
        parsed: parsed.map_err(|_| invalid())?,
        qualifier,
    })
}

/// Split `MAJOR.MINOR.PATCH.QUALIFIER` into core and qualifier
fn split_qualifier(version: &str) -> Option<(&str, &str)> {
    let (core, qualifier) = version.rsplit_once('.')?;
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let is_core = core.split('.').count() == 3 && core.split('.').all(numeric);
    let is_qualifier = !qualifier.is_empty()
        && qualifier
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

    (is_core && is_qualifier).then_some((core, qualifier))
}

fn pad(version: &str) -> String {
    let split_at = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split_at);
    match core.matches('.').count() {
        0 => format!("{core}.0.0{suffix}"),
        1 => format!("{core}.0{suffix}"),
        _ => version.to_string(),
    }
}

/// Compare two version strings.
///
/// Fails if either side is not a valid version.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(parse_version(a)?.cmp(&parse_version(b)?))
}

/// Returns true if `candidate` is strictly newer than `installed`
pub fn is_newer(candidate: &str, installed: &str) -> Result<bool, VersionError> {
    Ok(compare(candidate, installed)? == Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", "1.0.0")]
    #[case("1.2", "1.2.0")]
    #[case("1.2.3", "1.2.3")]
    #[case("v1.2.3", "1.2.3")]
    #[case(" 2.0.0 ", "2.0.0")]
    #[case("1.2-rc.1", "1.2.0-rc.1")]
    #[case("1.2.3-alpha.1", "1.2.3-alpha.1")]
    #[case("1.2.3+build.5", "1.2.3+build.5")]
    fn parse_version_normalizes(#[case] input: &str, #[case] expected: &str) {
        let parsed = parse_version(input).unwrap();
        assert_eq!(parsed.version(), &Version::parse(expected).unwrap());
        assert_eq!(parsed.qualifier(), None);
        assert_eq!(parsed.as_str(), input.trim());
    }

    #[rstest]
    #[case("1.2.3.201206011200", "201206011200")]
    #[case("1.2.3.v2012-06", "v2012-06")]
    #[case("1.0.0.v20120601_1200", "v20120601_1200")]
    #[case("v4.5.6.RELEASE", "RELEASE")]
    fn parse_version_splits_bundle_qualifier(#[case] input: &str, #[case] qualifier: &str) {
        let parsed = parse_version(input).unwrap();
        assert_eq!(parsed.version().build.as_str(), "");
        assert_eq!(parsed.qualifier(), Some(qualifier));
    }

    #[rstest]
    #[case("")]
    #[case("v")]
    #[case("abc")]
    #[case("1.x")]
    #[case("1..2")]
    #[case("1.2.3.4.5")]
    #[case("1.2.3.a.b")]
    #[case("1.2.3.4.5+x")]
    #[case("1.2.3.")]
    #[case("1.2.3.qual+ifier")]
    #[case("1.2.3.qual!")]
    #[case("-1.0.0")]
    fn parse_version_rejects_malformed(#[case] input: &str) {
        assert_eq!(
            parse_version(input),
            Err(VersionError::InvalidVersion(input.to_string()))
        );
    }

    #[rstest]
    #[case("1.0.0", "1.1.0", Ordering::Less)]
    #[case("2.0.0", "2.0.0", Ordering::Equal)]
    #[case("1.1", "1.1.0", Ordering::Equal)]
    #[case("1.10.0", "1.9.0", Ordering::Greater)]
    #[case("1.0.0-rc.1", "1.0.0", Ordering::Less)]
    #[case("1.0.0.20240101", "1.0.0", Ordering::Greater)]
    #[case("1.0.0.20240101", "1.0.0.20240102", Ordering::Less)]
    #[case("1.0.0.10", "1.0.0.9", Ordering::Less)]
    #[case("1.0.0.v2012_06", "1.0.0", Ordering::Greater)]
    #[case("1.0.0.zzz", "1.0.1", Ordering::Less)]
    #[case("1.0.0.20240101", "1.0.0+20240101", Ordering::Less)]
    #[case("v3", "2.9.9", Ordering::Greater)]
    fn compare_returns_expected_ordering(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare(a, b), Ok(expected));
        assert_eq!(compare(b, a), Ok(expected.reverse()));
        assert_eq!(compare(a, a), Ok(Ordering::Equal));
    }

    #[test]
    fn compare_fails_when_either_side_is_invalid() {
        assert!(matches!(
            compare("abc", "1.0.0"),
            Err(VersionError::InvalidVersion(v)) if v == "abc"
        ));
        assert!(matches!(
            compare("1.0.0", "abc"),
            Err(VersionError::InvalidVersion(v)) if v == "abc"
        ));
    }

    #[rstest]
    #[case("1.1.0", "1.0.0", true)]
    #[case("1.0.0", "1.0.0", false)]
    #[case("0.9.0", "1.0.0", false)]
    fn is_newer_only_for_greater(
        #[case] candidate: &str,
        #[case] installed: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_newer(candidate, installed), Ok(expected));
    }

    #[test]
    fn equal_versions_are_equal_values_with_original_text() {
        let short = parse_version("1.1").unwrap();
        let full = parse_version("1.1.0").unwrap();

        assert_eq!(short, full);
        assert_eq!(short.to_string(), "1.1");
        assert_eq!(full.to_string(), "1.1.0");
    }
}
