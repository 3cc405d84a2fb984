//! Semantic version bumping

use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VersionError};

/// Kind of version increment, using package-manager naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    /// Breaking changes
    Major,
    /// New features
    Minor,
    /// Bug fixes
    Patch,
    /// Next major as a prerelease
    Premajor,
    /// Next minor as a prerelease
    Preminor,
    /// Next patch as a prerelease
    Prepatch,
    /// Increment the prerelease counter
    Prerelease,
}

impl BumpType {
    /// Returns the string representation of the bump type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Premajor => "premajor",
            Self::Preminor => "preminor",
            Self::Prepatch => "prepatch",
            Self::Prerelease => "prerelease",
        }
    }

    /// Whether the result is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        matches!(
            self,
            Self::Premajor | Self::Preminor | Self::Prepatch | Self::Prerelease
        )
    }
}

impl Default for BumpType {
    fn default() -> Self {
        Self::Patch
    }
}

impl std::fmt::Display for BumpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BumpType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "premajor" => Ok(Self::Premajor),
            "preminor" => Ok(Self::Preminor),
            "prepatch" => Ok(Self::Prepatch),
            "prerelease" | "pre" => Ok(Self::Prerelease),
            _ => Err(format!("Unknown bump type: {}", s)),
        }
    }
}

/// Parse a version, accepting a leading `v`
pub fn parse_version(version: &str) -> Result<Version> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed)
        .map_err(|e| VersionError::ParseFailed(version.to_string(), e.to_string()).into())
}

/// Compute the version after applying `bump` to `current`.
///
/// `preid` names the prerelease channel (`alpha`, `beta`, ...). Without one
/// the prerelease is a bare counter, e.g. `1.2.4-0`.
pub fn next_version(current: &str, bump: BumpType, preid: Option<&str>) -> Result<String> {
    let mut v = parse_version(current)?;
    let was_pre = !v.pre.is_empty();
    v.build = BuildMetadata::EMPTY;

    match bump {
        BumpType::Major => {
            if !(was_pre && v.minor == 0 && v.patch == 0) {
                v.major += 1;
            }
            v.minor = 0;
            v.patch = 0;
            v.pre = Prerelease::EMPTY;
        }
        BumpType::Minor => {
            if !(was_pre && v.patch == 0) {
                v.minor += 1;
            }
            v.patch = 0;
            v.pre = Prerelease::EMPTY;
        }
        BumpType::Patch => {
            if !was_pre {
                v.patch += 1;
            }
            v.pre = Prerelease::EMPTY;
        }
        BumpType::Premajor => {
            v.major += 1;
            v.minor = 0;
            v.patch = 0;
            v.pre = first_prerelease(preid)?;
        }
        BumpType::Preminor => {
            v.minor += 1;
            v.patch = 0;
            v.pre = first_prerelease(preid)?;
        }
        BumpType::Prepatch => {
            v.patch += 1;
            v.pre = first_prerelease(preid)?;
        }
        BumpType::Prerelease => {
            if was_pre {
                v.pre = increment_prerelease(&v.pre, preid)?;
            } else {
                v.patch += 1;
                v.pre = first_prerelease(preid)?;
            }
        }
    }

    Ok(v.to_string())
}

fn first_prerelease(preid: Option<&str>) -> Result<Prerelease> {
    let text = match preid {
        Some(id) => format!("{}.0", id),
        None => "0".to_string(),
    };
    to_prerelease(&text)
}

fn increment_prerelease(current: &Prerelease, preid: Option<&str>) -> Result<Prerelease> {
    let text = current.as_str();

    if let Some(id) = preid {
        let same_channel = text == id || text.starts_with(&format!("{}.", id));
        if !same_channel {
            return first_prerelease(Some(id));
        }
    }

    let mut parts: Vec<String> = text.split('.').map(str::to_string).collect();
    match parts.iter().rposition(|p| p.parse::<u64>().is_ok()) {
        Some(pos) => {
            let n: u64 = parts[pos].parse().unwrap_or(0);
            parts[pos] = (n + 1).to_string();
        }
        None => parts.push("0".to_string()),
    }
    to_prerelease(&parts.join("."))
}

fn to_prerelease(text: &str) -> Result<Prerelease> {
    Prerelease::new(text)
        .map_err(|e| VersionError::ParseFailed(text.to_string(), e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump(current: &str, bump: BumpType) -> String {
        next_version(current, bump, None).unwrap()
    }

    #[test]
    fn test_release_bumps() {
        assert_eq!(bump("1.2.3", BumpType::Major), "2.0.0");
        assert_eq!(bump("1.2.3", BumpType::Minor), "1.3.0");
        assert_eq!(bump("1.2.3", BumpType::Patch), "1.2.4");
        assert_eq!(bump("v0.1.9", BumpType::Patch), "0.1.10");
    }

    #[test]
    fn test_release_from_prerelease() {
        assert_eq!(bump("2.0.0-rc.1", BumpType::Major), "2.0.0");
        assert_eq!(bump("1.3.0-beta.2", BumpType::Minor), "1.3.0");
        assert_eq!(bump("1.2.4-0", BumpType::Patch), "1.2.4");
        assert_eq!(bump("1.2.4-0", BumpType::Minor), "1.3.0");
    }

    #[test]
    fn test_pre_bumps() {
        assert_eq!(bump("1.2.3", BumpType::Premajor), "2.0.0-0");
        assert_eq!(bump("1.2.3", BumpType::Preminor), "1.3.0-0");
        assert_eq!(bump("1.2.3", BumpType::Prepatch), "1.2.4-0");
        assert_eq!(
            next_version("1.2.3", BumpType::Premajor, Some("alpha")).unwrap(),
            "2.0.0-alpha.0"
        );
    }

    #[test]
    fn test_prerelease_increment() {
        assert_eq!(bump("1.2.3", BumpType::Prerelease), "1.2.4-0");
        assert_eq!(bump("1.2.4-0", BumpType::Prerelease), "1.2.4-1");
        assert_eq!(bump("1.2.4-alpha.1", BumpType::Prerelease), "1.2.4-alpha.2");
        assert_eq!(bump("1.2.4-alpha", BumpType::Prerelease), "1.2.4-alpha.0");
    }

    #[test]
    fn test_prerelease_channel_switch() {
        assert_eq!(
            next_version("1.2.4-alpha.3", BumpType::Prerelease, Some("beta")).unwrap(),
            "1.2.4-beta.0"
        );
        assert_eq!(
            next_version("1.2.4-beta.3", BumpType::Prerelease, Some("beta")).unwrap(),
            "1.2.4-beta.4"
        );
    }

    #[test]
    fn test_build_metadata_dropped() {
        assert_eq!(bump("1.0.0+build.5", BumpType::Patch), "1.0.1");
    }

    #[test]
    fn test_invalid_version() {
        assert!(next_version("not-a-version", BumpType::Patch, None).is_err());
    }

    #[test]
    fn test_bump_type_from_str() {
        assert_eq!("MAJOR".parse::<BumpType>().unwrap(), BumpType::Major);
        assert_eq!("pre".parse::<BumpType>().unwrap(), BumpType::Prerelease);
        assert!("huge".parse::<BumpType>().is_err());
        assert!(BumpType::Prepatch.is_prerelease());
        assert!(!BumpType::Patch.is_prerelease());
    }
}
