//! Default project config file.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::TemplateError;

/// Name of the file written by `create_config_file`.
pub const CONFIG_FILE_NAME: &str = ".prettierrc";

/// Content of a freshly created config file.
pub const CONFIG_TEMPLATE: &str = r#"{
  "printWidth": 80,
  "tabWidth": 2,
  "useTabs": false,
  "semi": true,
  "singleQuote": false,
  "trailingComma": "es5",
  "bracketSpacing": true,
  "arrowParens": "always",
  "endOfLine": "lf"
}
"#;

/// Writes the default config file into `root`.
///
/// An existing file is only replaced when `force` is set. Symlinks at the
/// target are never followed.
pub fn create_config_file(root: &Path, force: bool) -> Result<PathBuf, TemplateError> {
    let config_path = root.join(CONFIG_FILE_NAME);

    loop {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_NOFOLLOW);
        }

        match options.open(&config_path) {
            Ok(mut file) => {
                file.write_all(CONFIG_TEMPLATE.as_bytes())?;
                info!("Created {}", config_path.display());
                return Ok(config_path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !force {
                    return Err(TemplateError::AlreadyExists(config_path));
                }

                match std::fs::remove_file(&config_path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_template_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(CONFIG_TEMPLATE).unwrap();
        assert!(value.is_object());
    }

    #[test]
    fn test_create_and_refuse_overwrite() {
        let dir = tempfile::tempdir().unwrap();

        let path = create_config_file(dir.path(), false).unwrap();
        assert_eq!(path, dir.path().join(".prettierrc"));
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);

        fs::write(&path, "{}").unwrap();
        let err = create_config_file(dir.path(), false).unwrap_err();
        assert!(matches!(err, TemplateError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".prettierrc"), "semi: false\n").unwrap();

        let path = create_config_file(dir.path(), true).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), CONFIG_TEMPLATE);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_target_is_replaced_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside.json");
        fs::write(&outside, "keep").unwrap();
        std::os::unix::fs::symlink(&outside, dir.path().join(".prettierrc")).unwrap();

        create_config_file(dir.path(), true).unwrap();
        assert_eq!(fs::read_to_string(&outside).unwrap(), "keep");
    }
}
