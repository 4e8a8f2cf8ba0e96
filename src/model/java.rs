//! Java specification versions.
//!
//! Legacy `1.x` names are folded onto their feature release, so `1.8` and
//! `8` are the same version and both sort below `11`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uc_version::{MalformedVersionError, VersionNumber};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JavaVersion {
    normalized: VersionNumber,
}

impl JavaVersion {
    pub fn parse(input: &str) -> Result<Self, MalformedVersionError> {
        let version = VersionNumber::parse(input)?;
        let components = version.components();

        let normalized = if components.len() >= 2 && components[0] == 1 {
            let rest: Vec<String> = components[1..].iter().map(|c| c.to_string()).collect();
            VersionNumber::parse(&rest.join("."))?
        } else {
            version
        };

        Ok(Self { normalized })
    }

    /// Feature release number (`8`, `11`, `17`, ...).
    pub fn feature(&self) -> u64 {
        self.normalized.components().first().copied().unwrap_or(0)
    }

    pub fn as_version(&self) -> &VersionNumber {
        &self.normalized
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

impl FromStr for JavaVersion {
    type Err = MalformedVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for JavaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.normalized.as_str())
    }
}

impl<'de> Deserialize<'de> for JavaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        JavaVersion::parse(&text).map_err(serde::de::Error::custom)
    }
}
