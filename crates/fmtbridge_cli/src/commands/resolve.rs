//! Resolve command implementation

use std::io::Write;
use std::path::Path;

use miette::{IntoDiagnostic, Result};

use fmtbridge_core::ResolveOptions;

use crate::cli::Cli;
use crate::utils::{absolute, create_session};

/// Prints what an editor would use to format `file`.
pub fn run_resolve(cli: &Cli, file: &Path) -> Result<()> {
    let session = create_session(cli)?;
    let path = absolute(file)?;
    let mut out = std::io::stdout().lock();

    let options = ResolveOptions {
        show_notifications: false,
    };
    let engine = match session.modules.engine_instance(&path, options) {
        Some(engine) => format!(
            "{} {} ({}) at {}",
            session.workspace.package().name,
            engine.version(),
            engine.origin(),
            engine.location().display()
        ),
        None => "none".to_string(),
    };
    writeln!(out, "engine: {}", engine).into_diagnostic()?;

    let resolved = session.configs.config_for(&path);
    let source = resolved
        .source
        .as_ref()
        .map_or_else(|| "none".to_string(), |source| source.display().to_string());
    writeln!(out, "config: {}", source).into_diagnostic()?;

    let options = serde_json::to_string_pretty(resolved.options.as_map()).into_diagnostic()?;
    writeln!(out, "options: {}", options).into_diagnostic()?;
    writeln!(out, "ignored: {}", session.ignores.should_ignore(&path)).into_diagnostic()?;
    Ok(())
}
