//! Version schemes, parsing, and comparison.
//!
//! The default [`Version`] is a loose, segment-based scheme suited to
//! Python-style release strings:
//! - Segments are split on `.`, `-`, `_`, `+` and on digit/letter boundaries
//! - Numeric segments compare as numbers of any length
//! - Known qualifiers have a fixed ordering:
//!   `dev` < `a` < `b` < `rc` < `""` (release) < `post`
//! - Trailing zero segments are insignificant, so `1.0 == 1.0.0`

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The capability the normalizer needs from a version type: a total order,
/// consistent equality and hashing, rendering, and parsing.
pub trait VersionScheme: Ord + Hash + Clone + fmt::Debug + fmt::Display {
    /// Parse a version string, returning `None` if it is not valid in this scheme.
    fn parse_version(text: &str) -> Option<Self>;
}

/// A parsed loose version with comparable segments.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    segments: Vec<Segment>,
}

/// One component of a version. Derived equality agrees with `Ord` because
/// numbers are kept without leading zeros and text is kept lowercased.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
enum Segment {
    /// Decimal digits, no leading zeros (`"0"` for zero).
    Numeric(String),
    Qualifier(QualifierKind),
    /// Unrecognized text, lowercased.
    Text(String),
}

/// Well-known qualifiers with defined ordering.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
enum QualifierKind {
    Dev,
    Alpha,
    Beta,
    Rc,
    Release,
    Post,
}

impl Version {
    /// Parse a version string.
    ///
    /// Valid versions start with a digit and contain only ASCII
    /// alphanumerics and the separators `.`, `-`, `_`, `+`.
    pub fn parse(version: &str) -> Option<Self> {
        let version = version.trim();
        let starts_with_digit = version.chars().next().is_some_and(|c| c.is_ascii_digit());
        let valid_chars = version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'));
        if !starts_with_digit || !valid_chars {
            return None;
        }
        Some(Self {
            original: version.to_string(),
            segments: parse_segments(version),
        })
    }

    /// The text this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Whether any segment is a `dev`, `a`, `b` or `rc` qualifier.
    pub fn is_prerelease(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Qualifier(q) if *q < QualifierKind::Release))
    }

    /// Segments with the insignificant tail removed.
    fn significant(&self) -> &[Segment] {
        let mut end = self.segments.len();
        while end > 0 && self.segments[end - 1].cmp_to_padding() == Ordering::Equal {
            end -= 1;
        }
        &self.segments[..end]
    }
}

impl VersionScheme for Version {
    fn parse_version(text: &str) -> Option<Self> {
        Self::parse(text)
    }
}

impl VersionScheme for semver::Version {
    fn parse_version(text: &str) -> Option<Self> {
        semver::Version::parse(text.trim()).ok()
    }
}

impl std::str::FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid version `{s}`"))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equal versions differ at most in their padding-equivalent tail.
        self.significant().hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| match (self.segments.get(i), other.segments.get(i)) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(a), None) => a.cmp_to_padding(),
                (None, Some(b)) => b.cmp_to_padding().reverse(),
                (None, None) => Ordering::Equal,
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Segment {
    /// Position in the cross-kind order:
    /// pre-release qualifiers < text < release < post < numbers.
    fn rank(&self) -> u8 {
        match self {
            Segment::Qualifier(QualifierKind::Dev) => 0,
            Segment::Qualifier(QualifierKind::Alpha) => 1,
            Segment::Qualifier(QualifierKind::Beta) => 2,
            Segment::Qualifier(QualifierKind::Rc) => 3,
            Segment::Text(_) => 4,
            Segment::Qualifier(QualifierKind::Release) => 5,
            Segment::Qualifier(QualifierKind::Post) => 6,
            Segment::Numeric(_) => 7,
        }
    }

    /// Compare against the implicit segment a shorter version is padded with.
    fn cmp_to_padding(&self) -> Ordering {
        match self {
            Segment::Numeric(digits) if digits == "0" => Ordering::Equal,
            Segment::Numeric(_) => Ordering::Greater,
            other => other.rank().cmp(&Segment::Qualifier(QualifierKind::Release).rank()),
        }
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
            (Segment::Numeric(a), Segment::Numeric(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        })
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn parse_segments(version: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for ch in version.chars() {
        if matches!(ch, '.' | '-' | '_' | '+') {
            if !current.is_empty() {
                segments.push(classify(&current));
                current.clear();
            }
            continue;
        }
        // `1.0rc2` splits into `1`, `0`, `rc`, `2`.
        let boundary = current
            .chars()
            .last()
            .is_some_and(|last| last.is_ascii_digit() != ch.is_ascii_digit());
        if boundary {
            segments.push(classify(&current));
            current.clear();
        }
        current.push(ch);
    }
    if !current.is_empty() {
        segments.push(classify(&current));
    }

    segments
}

fn classify(token: &str) -> Segment {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        let digits = token.trim_start_matches('0');
        let digits = if digits.is_empty() { "0" } else { digits };
        return Segment::Numeric(digits.to_string());
    }
    let lowered = token.to_lowercase();
    match lowered.as_str() {
        "dev" => Segment::Qualifier(QualifierKind::Dev),
        "alpha" | "a" => Segment::Qualifier(QualifierKind::Alpha),
        "beta" | "b" => Segment::Qualifier(QualifierKind::Beta),
        "rc" | "c" | "pre" | "preview" => Segment::Qualifier(QualifierKind::Rc),
        "ga" | "final" | "release" => Segment::Qualifier(QualifierKind::Release),
        "post" | "rev" | "r" => Segment::Qualifier(QualifierKind::Post),
        _ => Segment::Text(lowered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn hash_of(version: &Version) -> u64 {
        let mut hasher = DefaultHasher::new();
        version.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn digit_letter_boundaries_split() {
        assert_eq!(
            parse_segments("1.0rc2"),
            vec![
                Segment::Numeric("1".to_string()),
                Segment::Numeric("0".to_string()),
                Segment::Qualifier(QualifierKind::Rc),
                Segment::Numeric("2".to_string()),
            ]
        );
    }

    #[test]
    fn trailing_zeros_hash_equal() {
        assert_eq!(v("1.4"), v("1.4.0.0"));
        assert_eq!(hash_of(&v("1.4")), hash_of(&v("1.4.0.0")));
        assert_ne!(hash_of(&v("1.4")), hash_of(&v("1.4.1")));
    }

    #[test]
    fn release_qualifier_is_insignificant() {
        assert_eq!(v("2.0-final"), v("2.0"));
        assert_eq!(hash_of(&v("2.0-final")), hash_of(&v("2.0")));
    }

    #[test]
    fn leading_zeros_are_insignificant() {
        assert_eq!(v("1.01"), v("1.1"));
        assert_eq!(hash_of(&v("1.01")), hash_of(&v("1.1")));
        assert_eq!(parse_segments("007"), vec![Segment::Numeric("7".to_string())]);
        assert_eq!(parse_segments("000"), vec![Segment::Numeric("0".to_string())]);
    }

    #[test]
    fn text_segment_sorts_before_numbers() {
        assert!(v("1.0.foo") < v("1.0.0"));
        assert!(v("1.0.foo") < v("1.0.1"));
    }
}
