//! Elmbridge: an incremental Elm transform for a host JavaScript bundler.
//!
//! The bundler hands over a source file; this crate decides whether a prior
//! cached artifact is still valid, invokes the external Elm compiler as a
//! subprocess when it is not, reads back the emitted JavaScript, and
//! reconciles the file's dependency set with the real Elm import graph so
//! the bundler's incremental cache stays sound.

pub mod artifact;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod deps;
pub mod errors;
pub mod host;
pub mod minify;
pub mod transform;

pub use artifact::{ArtifactNamer, TempArtifactNamer};
pub use cache::CacheDecision;
pub use compiler::{CallingConvention, InvocationOutcome, LaunchFailure};
pub use config::PluginOptions;
pub use deps::{discover_dependencies, DiscoveryError};
pub use errors::{Result, TransformError};
pub use host::{BuildSession, CacheStore, HotReload, SourceFile};
pub use minify::{Minifier, MinifyError};
pub use transform::{ElmPlugin, ELM_EXTENSION};
