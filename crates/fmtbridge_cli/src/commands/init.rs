//! Init command implementation

use miette::{IntoDiagnostic, Result};

use fmtbridge_core::{TemplateError, create_config_file};

pub fn run_init(force: bool) -> Result<()> {
    let root = std::env::current_dir().into_diagnostic()?;

    match create_config_file(&root, force) {
        Ok(_) => Ok(()),
        Err(TemplateError::AlreadyExists(_)) => Err(miette::miette!(
            "Config file already exists. Use --force to overwrite."
        )),
        Err(e) => Err(e).into_diagnostic(),
    }
}
