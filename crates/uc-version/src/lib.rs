//! Totally ordered version numbers for update center catalogs.
//!
//! A version is a sequence of numeric components plus an optional trailing
//! qualifier. Comparison pads the shorter component list with zeros, and a
//! qualified version sorts below the same numbers without one, so
//! `1.1-beta < 1.1 == 1.1.0 < 1.1.1`.

mod error;
mod parser;

pub use error::MalformedVersionError;
pub use parser::{parse_version, ParsedVersion};

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A parsed version string.
///
/// Equality and hashing follow the ordering, so `1.0` and `1.0.0` are the
/// same key in a map even though they render differently.
#[derive(Debug, Clone)]
pub struct VersionNumber {
    text: String,
    components: Vec<u64>,
    qualifier: Option<String>,
}

impl VersionNumber {
    /// Parse a version string.
    pub fn parse(input: &str) -> Result<Self, MalformedVersionError> {
        let ParsedVersion {
            components,
            qualifier,
        } = parse_version(input)?;
        Ok(Self {
            text: input.to_string(),
            components,
            qualifier,
        })
    }

    /// Numeric components as written (no zero padding).
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Number of numeric components as written.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// A qualified version is a pre-release.
    pub fn is_prerelease(&self) -> bool {
        self.qualifier.is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Components with trailing zeros removed; the canonical numeric part.
    fn significant_components(&self) -> &[u64] {
        let len = self
            .components
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..len]
    }
}

/// One run of a qualifier after splitting on separators and digit boundaries.
#[derive(Debug, PartialEq, Eq, Hash)]
enum QualifierToken {
    /// Digits with leading zeros stripped, compared by length then text.
    Number(String),
    /// Lowercased letters.
    Word(String),
}

impl QualifierToken {
    fn cmp_token(&self, other: &Self) -> Ordering {
        match (self, other) {
            (QualifierToken::Number(a), QualifierToken::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (QualifierToken::Word(a), QualifierToken::Word(b)) => a.cmp(b),
            (QualifierToken::Number(_), QualifierToken::Word(_)) => Ordering::Less,
            (QualifierToken::Word(_), QualifierToken::Number(_)) => Ordering::Greater,
        }
    }
}

fn flush_token(current: &mut String, is_digit: bool, tokens: &mut Vec<QualifierToken>) {
    if current.is_empty() {
        return;
    }
    if is_digit {
        let trimmed = current.trim_start_matches('0');
        tokens.push(QualifierToken::Number(trimmed.to_string()));
    } else {
        tokens.push(QualifierToken::Word(current.to_ascii_lowercase()));
    }
    current.clear();
}

fn tokenize_qualifier(qualifier: &str) -> Vec<QualifierToken> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for c in qualifier.chars() {
        if !c.is_ascii_alphanumeric() {
            flush_token(&mut current, current_is_digit, &mut tokens);
            continue;
        }
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            flush_token(&mut current, current_is_digit, &mut tokens);
        }
        current_is_digit = is_digit;
        current.push(c);
    }
    flush_token(&mut current, current_is_digit, &mut tokens);

    tokens
}

fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    let a_tokens = tokenize_qualifier(a);
    let b_tokens = tokenize_qualifier(b);

    for (at, bt) in a_tokens.iter().zip(b_tokens.iter()) {
        match at.cmp_token(bt) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    a_tokens.len().cmp(&b_tokens.len())
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }

        match (&self.qualifier, &other.qualifier) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => compare_qualifiers(a, b),
        }
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionNumber {}

impl Hash for VersionNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_components().hash(state);
        self.qualifier
            .as_deref()
            .map(tokenize_qualifier)
            .hash(state);
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for VersionNumber {
    type Err = MalformedVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for VersionNumber {
    type Error = MalformedVersionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for VersionNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for VersionNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        VersionNumber::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn v(s: &str) -> VersionNumber {
        VersionNumber::parse(s).unwrap()
    }

    fn hash_of(version: &VersionNumber) -> u64 {
        let mut hasher = DefaultHasher::new();
        version.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.0") < v("1.1"));
        assert!(v("1.9") < v("1.10"));
        assert!(v("1.600.1") < v("1.601"));
        assert!(v("2.0.1") > v("1.601"));
    }

    #[test]
    fn test_zero_padding() {
        assert_eq!(v("1.0").cmp(&v("1.0.0")), Ordering::Equal);
        assert_eq!(v("2"), v("2.0.0.0"));
        assert!(v("1.0") < v("1.0.1"));
        assert_eq!(hash_of(&v("1.0")), hash_of(&v("1.0.0")));
    }

    #[test]
    fn test_qualifier_sorts_below_release() {
        assert!(v("1.1-beta") < v("1.1"));
        assert!(v("1.1-beta") > v("1.0"));
        assert!(v("2.0-alpha-1") < v("2.0.0"));
    }

    #[test]
    fn test_qualifier_ordering() {
        assert!(v("1.0-alpha") < v("1.0-beta"));
        assert!(v("1.0-beta") < v("1.0-rc1"));
        assert!(v("1.0-beta-2") < v("1.0-beta-10"));
        assert!(v("1.0-beta") < v("1.0-beta-1"));
        assert_eq!(v("1.0-BETA"), v("1.0-beta"));
        assert_eq!(v("1.0-beta.2"), v("1.0-beta-02"));
        assert_eq!(hash_of(&v("1.0-BETA.2")), hash_of(&v("1.0-beta-2")));
    }

    #[test]
    fn test_antisymmetry_and_reflexivity() {
        let samples = [
            "1", "1.0", "1.0.0", "1.0-alpha", "1.0-beta", "1.0-beta-2", "1.1-beta", "1.1",
            "1.600.1", "1.601", "2.0-rc1", "2.0", "2.0.1", "10.0",
        ];
        for a in samples {
            assert_eq!(v(a).cmp(&v(a)), Ordering::Equal, "{a} vs itself");
            for b in samples {
                assert_eq!(v(a).cmp(&v(b)), v(b).cmp(&v(a)).reverse(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_transitivity_over_sorted_samples() {
        let mut samples: Vec<VersionNumber> = [
            "2.0", "1.0-beta", "1.1", "1.0", "2.0-rc1", "1.0-alpha", "1.600.1", "1.601",
        ]
        .iter()
        .map(|s| v(s))
        .collect();
        samples.sort();

        for i in 0..samples.len() {
            for j in i..samples.len() {
                assert!(samples[i] <= samples[j]);
            }
        }
        let rendered: Vec<&str> = samples.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            rendered,
            vec!["1.0-alpha", "1.0-beta", "1.0", "1.1", "1.600.1", "1.601", "2.0-rc1", "2.0"]
        );
    }

    #[test]
    fn test_accessors() {
        let version = v("1.600.1");
        assert_eq!(version.components(), &[1, 600, 1]);
        assert_eq!(version.component_count(), 3);
        assert!(!version.is_prerelease());

        let beta = v("1.1-beta");
        assert_eq!(beta.qualifier(), Some("beta"));
        assert!(beta.is_prerelease());
        assert_eq!(beta.to_string(), "1.1-beta");
    }

    #[test]
    fn test_serde_as_string() {
        let version = v("2.0.1-rc2");
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, r#""2.0.1-rc2""#);

        let parsed: VersionNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_str(), "2.0.1-rc2");

        let bad: Result<VersionNumber, _> = serde_json::from_str(r#""not-a-version""#);
        assert!(bad.is_err());
    }
}
