//! Suggested next version
//!
//! The suggestion bumps exactly one component of `MAJOR.MINOR.PATCH` and
//! leaves the others untouched: `1.2.3` with a new feature becomes `1.3.3`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use jig_core::VersionError;

/// Version components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionComponents {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionComponents {
    /// Create new version components
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Increment the component selected by `bump`
    pub fn bump(self, bump: BumpType) -> Result<Self, VersionError> {
        let mut next = self;
        let component = match bump {
            BumpType::Major => &mut next.major,
            BumpType::Minor => &mut next.minor,
            BumpType::Patch => &mut next.patch,
            BumpType::None => return Ok(next),
        };
        *component = component
            .checked_add(1)
            .ok_or_else(|| VersionError::Overflow(self.to_string()))?;
        Ok(next)
    }
}

impl FromStr for VersionComponents {
    type Err = VersionError;

    /// Parse the first three dot-separated parts; anything after them is
    /// ignored
    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() < 3 {
            return Err(VersionError::InvalidFormat(version.to_string()));
        }

        let component = |part: &str| {
            part.parse::<u64>()
                .map_err(|e| VersionError::ParseFailed(version.to_string(), e.to_string()))
        };

        Ok(Self {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
        })
    }
}

impl fmt::Display for VersionComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Type of version bump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    /// Breaking changes
    Major,
    /// New features
    Minor,
    /// Bug fixes
    Patch,
    /// Nothing to release
    None,
}

impl BumpType {
    /// Highest-priority bump implied by the change flags
    pub fn from_flags(has_breaking: bool, has_new_feature: bool, has_bug_fixed: bool) -> Self {
        if has_breaking {
            Self::Major
        } else if has_new_feature {
            Self::Minor
        } else if has_bug_fixed {
            Self::Patch
        } else {
            Self::None
        }
    }
}

/// Next version for `current` given what changed since it
pub fn suggest_version(
    current: &str,
    has_breaking: bool,
    has_new_feature: bool,
    has_bug_fixed: bool,
) -> Result<String, VersionError> {
    let components: VersionComponents = current.parse()?;
    let bump = BumpType::from_flags(has_breaking, has_new_feature, has_bug_fixed);
    Ok(components.bump(bump)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let v: VersionComponents = "1.2.3".parse().unwrap();
        assert_eq!(v, VersionComponents::new(1, 2, 3));
    }

    #[test]
    fn test_parse_ignores_extra_parts() {
        let v: VersionComponents = "1.2.3.4".parse().unwrap();
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "1.2".parse::<VersionComponents>(),
            Err(VersionError::InvalidFormat(_))
        ));
        assert!(matches!(
            "".parse::<VersionComponents>(),
            Err(VersionError::InvalidFormat(_))
        ));
        assert!(matches!(
            "1.x.3".parse::<VersionComponents>(),
            Err(VersionError::ParseFailed(_, _))
        ));
        assert!("1.2.3-rc1".parse::<VersionComponents>().is_err());
    }

    #[test]
    fn test_bump_priority() {
        assert_eq!(BumpType::from_flags(true, true, true), BumpType::Major);
        assert_eq!(BumpType::from_flags(false, true, true), BumpType::Minor);
        assert_eq!(BumpType::from_flags(false, false, true), BumpType::Patch);
        assert_eq!(BumpType::from_flags(false, false, false), BumpType::None);
    }

    #[test]
    fn test_suggest_version_bumps_one_component() {
        assert_eq!(suggest_version("1.2.3", true, true, true).unwrap(), "2.2.3");
        assert_eq!(suggest_version("1.2.3", false, true, false).unwrap(), "1.3.3");
        assert_eq!(suggest_version("1.2.3", false, false, true).unwrap(), "1.2.4");
        assert_eq!(suggest_version("1.2.3", false, false, false).unwrap(), "1.2.3");
    }

    #[test]
    fn test_suggest_version_invalid() {
        assert!(suggest_version("main", false, true, false).is_err());
    }

    #[test]
    fn test_bump_overflow() {
        assert!(matches!(
            suggest_version("18446744073709551615.0.0", true, false, false),
            Err(VersionError::Overflow(_))
        ));
        assert!(matches!(
            VersionComponents::new(1, 2, u64::MAX).bump(BumpType::Patch),
            Err(VersionError::Overflow(_))
        ));
        assert_eq!(
            suggest_version("18446744073709551615.0.0", false, true, false).unwrap(),
            "18446744073709551615.1.0"
        );
    }
}
