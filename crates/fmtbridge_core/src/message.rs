//! User-facing message identities.
//!
//! Notifications are deduplicated by these texts, so each failure class
//! reaches the user at most once per session.

pub const USING_BUNDLED_ENGINE: &str = "Using bundled version of prettier.";
pub const OUTDATED_ENGINE_INSTALLED: &str =
    "Outdated version of prettier installed. Please update to the latest version.";
pub const FAILED_TO_LOAD_MODULE: &str =
    "Failed to load the project's prettier module, falling back to the bundled version.";
pub const INVALID_ENGINE_PATH: &str =
    "Invalid prettier path in settings, the configured module could not be loaded.";
pub const ENGINE_UNAVAILABLE: &str = "Prettier could not be loaded, formatting is unavailable.";
pub const FAILED_TO_PARSE_CONFIG: &str = "Failed to parse the prettier configuration file.";
pub const FAILED_TO_PARSE_IGNORE_FILE: &str = "Failed to parse the prettier ignore file.";
pub const FORMAT_FAILED: &str = "Prettier failed to format the document. See the output log.";
