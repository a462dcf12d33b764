//! Engine loading capability.

use std::path::Path;

use crate::{EngineHandle, EngineOrigin, LoadError};

/// Loads an engine from an installation directory.
///
/// The module resolver only ever talks to the engine through this trait,
/// so tests can substitute an instrumented loader.
pub trait EngineLoader: Send + Sync {
    /// Loads the engine installed at `module_dir`.
    fn load(&self, module_dir: &Path, origin: EngineOrigin) -> Result<EngineHandle, LoadError>;
}
