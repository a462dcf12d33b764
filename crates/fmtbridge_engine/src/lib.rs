//! # fmtbridge_engine
//!
//! Boundary between fmtbridge and the external formatting engine.
//!
//! This crate provides:
//! - The `Engine` trait and the cheap-to-clone `EngineHandle` wrapper
//! - Structured engine versions with a distinct "unknown" state
//! - The `EngineLoader` capability used to load an engine from a directory
//! - A process-backed loader for Node package installations
//! - Package manifest (`package.json`) reading
//!
//! ## Example
//!
//! ```rust,ignore
//! use fmtbridge_engine::{EngineLoader, EngineOrigin, EnginePackage, NodeEngineLoader};
//!
//! let loader = NodeEngineLoader::new(EnginePackage::prettier(), "node");
//! let handle = loader.load("./node_modules/prettier".as_ref(), EngineOrigin::ProjectLocal)?;
//! println!("loaded engine {}", handle.version());
//! ```

mod error;
mod handle;
mod language;
mod loader;
mod manifest;
mod node;
mod package;
mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{EngineError, LoadError};
pub use handle::{Engine, EngineHandle, EngineOrigin, FormatOptions, FormatRequest};
pub use language::{LanguageInfo, SupportInfo, infer_parser};
pub use loader::EngineLoader;
pub use manifest::{BinField, ManifestError, PackageManifest};
pub use node::{NodeEngine, NodeEngineLoader};
pub use package::EnginePackage;
pub use version::EngineVersion;
