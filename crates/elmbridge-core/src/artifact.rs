use std::io;
use std::path::PathBuf;

/// Produces the path that receives one compiler invocation's output.
///
/// Injected into the plugin rather than reached for globally, so tests can
/// supply deterministic paths without touching the real temp directory.
pub trait ArtifactNamer {
    /// Return a fresh, collision-free path with a `.js` suffix. Paths are
    /// single-use: two concurrent invocations never share one.
    fn fresh_path(&self) -> io::Result<PathBuf>;
}

/// Default namer backed by the system temp directory.
#[derive(Debug, Default)]
pub struct TempArtifactNamer;

impl ArtifactNamer for TempArtifactNamer {
    fn fresh_path(&self) -> io::Result<PathBuf> {
        let file = tempfile::Builder::new()
            .prefix("elmbridge-")
            .suffix(".js")
            .tempfile()?;
        // Persist the name past this call; the compiler overwrites the file
        // and the bundler owns its contents from then on.
        let (_file, path) = file.keep()?;
        Ok(path)
    }
}
