use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ReleaseError;

/// Represents a four-component version number (major.minor.build.revision).
///
/// Ordering is lexicographic over the four components, so versions produced
/// within the same release period sort by build and then revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

/// Represents the scheme used to derive the minor component of a
/// generated version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VersionType {
    /// The minor component is the current ISO calendar week
    #[default]
    CalendarWeek,
    /// The minor component is the current day of the year
    DayOfYear,
    /// The caller supplies the version (explicit value or generator override)
    Custom,
}

impl Version {
    /// Creates a new Version with the specified components.
    pub fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Version {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    /// Parses a version from a dotted string.
    ///
    /// Accepts two to four numeric components; missing trailing components
    /// default to zero, so `"1.2"` parses as `1.2.0.0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(ReleaseError::version(format!(
                "expected 2 to 4 components, got '{}'",
                s
            )));
        }

        let mut components = [0u32; 4];
        for (index, part) in parts.iter().enumerate() {
            components[index] = part.trim().parse::<u32>().map_err(|_| {
                ReleaseError::version(format!("invalid component '{}' in '{}'", part, s))
            })?;
        }

        Ok(Version::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

/// Generates the next version number from the old one and the current
/// wall-clock time.
///
/// - major: last two digits of the current year
/// - minor: ISO calendar week or day of the year, depending on `version_type`
/// - build: incremented while (major, minor) match the old version, else 0
/// - revision: minutes since local midnight (0-1439)
///
/// Never fails.
pub fn generate_next(old: Version, version_type: VersionType) -> Version {
    generate_next_at(old, version_type, Local::now().naive_local())
}

/// Clock-injected variant of [`generate_next`].
pub fn generate_next_at(old: Version, version_type: VersionType, now: NaiveDateTime) -> Version {
    let major = (now.year() % 100) as u32;

    let minor = match version_type {
        VersionType::CalendarWeek => now.iso_week().week(),
        _ => now.ordinal(),
    };

    // The build counter is tied to the release period: it keeps counting
    // while (major, minor) match the previous version and resets otherwise.
    let build = if major == old.major && minor == old.minor {
        old.build + 1
    } else {
        0
    };

    let revision = now.hour() * 60 + now.minute();

    Version::new(major, minor, build, revision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_display_four_components() {
        assert_eq!(Version::new(25, 3, 1, 630).to_string(), "25.3.1.630");
    }

    #[test]
    fn test_parse_full_version() {
        let version: Version = "1.2.3.4".parse().unwrap();
        assert_eq!(version, Version::new(1, 2, 3, 4));
    }

    #[test]
    fn test_parse_short_version_defaults_to_zero() {
        let version: Version = "1.2".parse().unwrap();
        assert_eq!(version, Version::new(1, 2, 0, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("1".parse::<Version>().is_err());
        assert!("1.2.3.4.5".parse::<Version>().is_err());
        assert!("a.b.c".parse::<Version>().is_err());
        assert!("1.-2.3".parse::<Version>().is_err());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(Version::new(25, 3, 0, 100) < Version::new(25, 3, 0, 101));
        assert!(Version::new(25, 3, 1, 0) > Version::new(25, 3, 0, 1439));
        assert!(Version::new(25, 4, 0, 0) > Version::new(25, 3, 9, 9));
    }

    #[test]
    fn test_generate_calendar_week() {
        // 2025-01-15 is a Wednesday in ISO week 3
        let version = generate_next_at(
            Version::default(),
            VersionType::CalendarWeek,
            at(2025, 1, 15, 10, 30),
        );
        assert_eq!(version.major, 25);
        assert_eq!(version.minor, 3);
        assert_eq!(version.build, 0);
        assert_eq!(version.revision, 10 * 60 + 30);
    }

    #[test]
    fn test_generate_day_of_year() {
        let version = generate_next_at(
            Version::default(),
            VersionType::DayOfYear,
            at(2025, 2, 1, 0, 5),
        );
        assert_eq!(version.major, 25);
        assert_eq!(version.minor, 32);
        assert_eq!(version.revision, 5);
    }

    #[test]
    fn test_build_increments_within_same_period() {
        let old = Version::new(25, 3, 4, 100);
        let version = generate_next_at(old, VersionType::CalendarWeek, at(2025, 1, 15, 12, 0));
        assert_eq!(version.build, 5);
    }

    #[test]
    fn test_build_resets_when_period_changes() {
        let old = Version::new(25, 2, 7, 100);
        let version = generate_next_at(old, VersionType::CalendarWeek, at(2025, 1, 15, 12, 0));
        assert_eq!(version.build, 0);
    }

    #[test]
    fn test_revision_bounds() {
        let start = generate_next_at(
            Version::default(),
            VersionType::DayOfYear,
            at(2025, 6, 1, 0, 0),
        );
        let end = generate_next_at(
            Version::default(),
            VersionType::DayOfYear,
            at(2025, 6, 1, 23, 59),
        );
        assert_eq!(start.revision, 0);
        assert_eq!(end.revision, 1439);
    }

    #[test]
    fn test_year_boundary_uses_iso_week_of_next_year() {
        // 2024-12-30 is a Monday that already belongs to ISO week 1 of 2025,
        // while the major component still reflects the calendar year.
        let version = generate_next_at(
            Version::default(),
            VersionType::CalendarWeek,
            at(2024, 12, 30, 8, 0),
        );
        assert_eq!(version.major, 24);
        assert_eq!(version.minor, 1);
    }
}
