//! Process-backed engine for Node package installations.
//!
//! An installation directory is validated up front by reading its
//! `package.json`. Formatting runs the package's command script under
//! `node` with the document on stdin and options translated to flags.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::manifest::ManifestError;
use crate::{
    EngineError, EngineHandle, EngineLoader, EngineOrigin, EnginePackage, EngineVersion,
    FormatOptions, FormatRequest, LanguageInfo, LoadError, PackageManifest, SupportInfo,
};

/// Option keys that never become command line flags.
const SKIPPED_OPTIONS: &[&str] = &["overrides", "$schema", "filepath"];

/// Loads engines from Node package directories.
#[derive(Debug, Clone)]
pub struct NodeEngineLoader {
    package: EnginePackage,
    node_path: PathBuf,
}

impl NodeEngineLoader {
    /// Creates a loader that runs engines with the given `node` executable.
    pub fn new(package: EnginePackage, node_path: impl Into<PathBuf>) -> Self {
        Self {
            package,
            node_path: node_path.into(),
        }
    }

    /// Returns the engine package this loader expects.
    pub fn package(&self) -> &EnginePackage {
        &self.package
    }
}

impl EngineLoader for NodeEngineLoader {
    fn load(&self, module_dir: &Path, origin: EngineOrigin) -> Result<EngineHandle, LoadError> {
        if !module_dir.is_dir() {
            return Err(LoadError::NotFound(module_dir.to_path_buf()));
        }

        let manifest_path = module_dir.join("package.json");
        let manifest = PackageManifest::read(&manifest_path).map_err(|e| match e {
            ManifestError::Io { source, .. } if source.kind() == ErrorKind::NotFound => {
                LoadError::NotFound(module_dir.to_path_buf())
            }
            ManifestError::Io { source, .. } => LoadError::Io(source),
            ManifestError::Parse { path, message } => LoadError::InvalidManifest { path, message },
        })?;

        let found = manifest.name.clone().unwrap_or_default();
        if found != self.package.name {
            return Err(LoadError::WrongPackage {
                path: module_dir.to_path_buf(),
                expected: self.package.name.clone(),
                found,
            });
        }

        let script = manifest
            .bin_script(&self.package.name)
            .map(|script| module_dir.join(script))
            .filter(|script| script.is_file())
            .ok_or_else(|| LoadError::MissingEntryPoint(module_dir.to_path_buf()))?;

        let version = EngineVersion::parse(manifest.version.as_deref().unwrap_or(""));
        debug!(
            "Loaded {} {} from {}",
            self.package.name,
            version,
            module_dir.display()
        );

        let engine = NodeEngine::new(self.node_path.clone(), script);
        Ok(EngineHandle::new(
            Arc::new(engine),
            version,
            origin,
            module_dir,
        ))
    }
}

/// An engine run as a `node` child process per request.
#[derive(Debug)]
pub struct NodeEngine {
    node_path: PathBuf,
    script: PathBuf,
    languages: Mutex<Option<Vec<LanguageInfo>>>,
}

impl NodeEngine {
    /// Creates an engine that runs `script` with `node_path`.
    pub fn new(node_path: PathBuf, script: PathBuf) -> Self {
        Self {
            node_path,
            script,
            languages: Mutex::new(None),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.node_path);
        command.arg(&self.script);
        command
    }

    fn run(&self, mut command: Command, input: Option<&str>) -> Result<Output, EngineError> {
        command
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn()?;
        let Some(input) = input else {
            return Ok(child.wait_with_output()?);
        };

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::process("engine stdin is not available"))?;

        // The child may fill its stdout pipe before reading all of stdin, so
        // the input is written from a separate thread.
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin.write_all(input.as_bytes()) {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                other => other,
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let output = output?;
        written?;
        Ok(output)
    }
}

impl crate::Engine for NodeEngine {
    fn format(&self, text: &str, request: &FormatRequest<'_>) -> Result<String, EngineError> {
        let mut command = self.command();
        if let Some(path) = request.file_path {
            command.arg("--stdin-filepath").arg(path);
        }
        command.args(["--no-config", "--no-editorconfig"]);
        if let Some(parser) = request.parser
            && !request.options.contains_key("parser")
        {
            command.arg(format!("--parser={}", parser));
        }
        command.args(option_args(request.options));

        let output = self.run(command, Some(text))?;
        if !output.status.success() {
            return Err(classify_failure(&String::from_utf8_lossy(&output.stderr)));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| EngineError::InvalidOutput(format!("output is not UTF-8: {}", e)))
    }

    fn languages(&self) -> Result<Vec<LanguageInfo>, EngineError> {
        let mut cached = self.languages.lock();
        if let Some(languages) = cached.as_ref() {
            return Ok(languages.clone());
        }

        let mut command = self.command();
        command.arg("--support-info");
        let output = self.run(command, None)?;
        if !output.status.success() {
            return Err(classify_failure(&String::from_utf8_lossy(&output.stderr)));
        }

        let info: SupportInfo = serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::InvalidOutput(format!("invalid support info: {}", e)))?;
        *cached = Some(info.languages.clone());
        Ok(info.languages)
    }
}

/// Translates format options into command line flags.
fn option_args(options: &FormatOptions) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in options {
        if SKIPPED_OPTIONS.contains(&key.as_str()) {
            continue;
        }
        let flag = to_kebab_case(key);
        match value {
            Value::Bool(true) => args.push(format!("--{}", flag)),
            Value::Bool(false) => args.push(format!("--no-{}", flag)),
            Value::Number(n) => args.push(format!("--{}={}", flag, n)),
            Value::String(s) => args.push(format!("--{}={}", flag, s)),
            Value::Array(items) => {
                let flag = flag.strip_suffix('s').unwrap_or(&flag);
                for item in items {
                    match item {
                        Value::String(s) => args.push(format!("--{}={}", flag, s)),
                        Value::Number(n) => args.push(format!("--{}={}", flag, n)),
                        _ => {}
                    }
                }
            }
            Value::Null | Value::Object(_) => {}
        }
    }
    args
}

fn to_kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Turns engine stderr into an error, telling document errors apart.
fn classify_failure(stderr: &str) -> EngineError {
    let message = stderr
        .lines()
        .map(|line| line.strip_prefix("[error] ").unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    if message.contains("SyntaxError") {
        EngineError::syntax(message)
    } else if message.is_empty() {
        EngineError::process("engine exited with an error")
    } else {
        EngineError::process(message)
    }
}
