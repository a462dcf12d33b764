//! Format command implementation

use std::io::Write;
use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};
use tracing::{error, info};

use fmtbridge_core::{Document, FormatOutcome, TextEdit};

use crate::cli::Cli;
use crate::utils::{absolute, create_session};

/// Formats `files`, printing, writing or checking them.
///
/// Returns whether any file failed, or would change under `--check`.
pub fn run_format(cli: &Cli, files: &[PathBuf], write: bool, check: bool) -> Result<bool> {
    let session = create_session(cli)?;
    let mut stdout = std::io::stdout().lock();
    let mut has_errors = false;
    let mut changed = 0usize;

    for file in files {
        let path = absolute(file)?;
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to read {}: {}", file.display(), e);
                has_errors = true;
                continue;
            }
        };

        let document = Document::new(path.clone(), text);
        let formatted = match session.edit_provider.format_document(&document, None) {
            FormatOutcome::Edits(edits) => apply_edits(&document.text, &edits),
            FormatOutcome::Skipped(reason) => {
                info!("Skipped {} ({:?})", file.display(), reason);
                document.text.clone()
            }
            FormatOutcome::Failed(kind) => {
                error!("Failed to format {} ({:?})", file.display(), kind);
                has_errors = true;
                continue;
            }
        };

        let differs = formatted != document.text;
        if differs {
            changed += 1;
        }

        if check {
            if differs {
                writeln!(stdout, "{}", file.display()).into_diagnostic()?;
            }
        } else if write {
            if differs {
                std::fs::write(&path, &formatted).into_diagnostic()?;
                info!("Formatted {}", file.display());
            }
        } else {
            stdout.write_all(formatted.as_bytes()).into_diagnostic()?;
        }
    }

    if check {
        if changed > 0 {
            info!("{} file(s) would be reformatted", changed);
        }
        return Ok(has_errors || changed > 0);
    }
    Ok(has_errors)
}

/// Applies non-overlapping edits, last first so earlier offsets stay valid.
fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| std::cmp::Reverse(edit.range.start));
    sorted
        .into_iter()
        .fold(text.to_string(), |text, edit| edit.apply(&text))
}
