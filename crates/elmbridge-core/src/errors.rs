use std::path::PathBuf;
use thiserror::Error;

use crate::deps::DiscoveryError;

/// Everything that can make a single file's transform fail.
///
/// None of these are retried, and none are downgraded to a no-op: a failed
/// transform never marks its SourceFile as produced. Failure isolation is
/// per-file; sibling transforms are unaffected.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(
        "could not find the Elm compiler at \"{path}\"\n\
         have you installed Elm? see https://guide.elm-lang.org/install/elm.html"
    )]
    CompilerNotFound { path: PathBuf },

    #[error(
        "the Elm compiler at \"{path}\" did not have permission to run\n\
         you may need to give it executable permissions (chmod +x)"
    )]
    CompilerPermissionDenied { path: PathBuf },

    #[error("error attempting to run the Elm compiler at \"{path}\": {source}")]
    CompilerLaunch {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Elm compilation failed with exit code {code}")]
    CompilationFailed { code: i32 },

    #[error("failed to read source file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read compiled artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("dependency discovery failed: {0}")]
    DependencyDiscovery(#[from] DiscoveryError),

    #[error("post-processing failed: {0}")]
    PostProcess(String),

    #[error("could not generate a temp artifact path: {0}")]
    TempPath(std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransformError>;
