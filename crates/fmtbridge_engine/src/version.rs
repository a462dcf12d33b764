//! Engine version handling.

use std::fmt;

use semver::Version;

/// Version reported by an engine installation.
///
/// Declared versions come in many shapes (`2.0.2`, `v2.0.2`, `=2.0`, ...).
/// They are normalized before parsing. A version that still cannot be parsed
/// is kept as `Unknown`, which is not the same as being too old.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineVersion {
    /// A parsed semantic version.
    Known(Version),
    /// A version string that could not be understood.
    Unknown(String),
}

impl EngineVersion {
    /// Parses a raw version string.
    pub fn parse(raw: &str) -> Self {
        match normalize(raw) {
            Some(version) => Self::Known(version),
            None => Self::Unknown(raw.to_string()),
        }
    }

    /// Returns the parsed version, if known.
    pub fn as_semver(&self) -> Option<&Version> {
        match self {
            Self::Known(version) => Some(version),
            Self::Unknown(_) => None,
        }
    }

    /// Returns whether this version is at least `minimum`.
    ///
    /// Returns `None` for unknown versions.
    pub fn satisfies(&self, minimum: &Version) -> Option<bool> {
        self.as_semver().map(|version| version >= minimum)
    }

    /// Returns whether this version is known to be below `minimum`.
    pub fn is_outdated(&self, minimum: &Version) -> bool {
        self.satisfies(minimum) == Some(false)
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(version) => write!(f, "{}", version),
            Self::Unknown(raw) if raw.is_empty() => write!(f, "<unknown>"),
            Self::Unknown(raw) => write!(f, "{} (unrecognized)", raw),
        }
    }
}

impl From<Version> for EngineVersion {
    fn from(version: Version) -> Self {
        Self::Known(version)
    }
}

fn normalize(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    // Pad `2` and `2.0` out to a full triple, keeping any pre-release/build tail.
    let (core, tail) = match trimmed.find(|c| c == '-' || c == '+') {
        Some(index) => trimmed.split_at(index),
        None => (trimmed, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3
        || parts
            .iter()
            .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    padded.push_str(tail);
    Version::parse(&padded).ok()
}
