//! Boundary with the host bundler
//!
//! The bundler owns the module graph, the cache store, and the hot-reload
//! channel. This module models the exact capabilities the transform core
//! consumes from it, each as its own trait so tests can mock them in
//! isolation rather than faking a monolithic context object.

use indexmap::IndexSet;
use std::path::{Path, PathBuf};

/// One module in the host bundler's graph.
///
/// Owned by the bundler; the core receives a mutable reference for the
/// duration of one transform call and leaves it either fully transformed or
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// Absolute filesystem path (the file's identity)
    pub abs_path: PathBuf,

    /// File contents: raw source once loaded, replaced by the produced
    /// JavaScript when a transform succeeds
    pub contents: Option<String>,

    /// Dependency set in the bundler's project-path convention.
    /// Duplicate-free with stable iteration order.
    pub dependencies: IndexSet<String>,

    /// Source map, opaque to the transform core
    pub source_map: Option<String>,
}

impl SourceFile {
    pub fn new(abs_path: impl Into<PathBuf>) -> Self {
        Self {
            abs_path: abs_path.into(),
            ..Self::default()
        }
    }

    /// Lazily load the raw contents from disk. Already-loaded contents are
    /// left alone.
    pub fn load_contents(&mut self) -> std::io::Result<()> {
        if self.contents.is_none() {
            self.contents = Some(std::fs::read_to_string(&self.abs_path)?);
        }
        Ok(())
    }
}

/// Snapshot of the bundler's build state for one transform call.
///
/// `last_changed_file` is captured once here and never re-read mid-flight,
/// so a file's invalidation decision cannot be based on a value that changed
/// underneath it while other transforms were interleaved.
#[derive(Debug, Clone)]
pub struct BuildSession {
    /// The build's home directory; also the compiler subprocess cwd
    pub home_dir: PathBuf,

    /// Whether the bundler's incremental cache participates in this build
    pub use_cache: bool,

    /// The most recently changed file in this build cycle, if known
    pub last_changed_file: Option<PathBuf>,
}

impl BuildSession {
    pub fn new(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            use_cache: false,
            last_changed_file: None,
        }
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_last_changed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.last_changed_file = Some(path.into());
        self
    }

    /// Rewrite a path into the bundler's dependency-graph key convention:
    /// relative to the home directory, forward-slash separated. A path not
    /// under the home directory passes through untouched.
    pub fn project_path(&self, path: &Path) -> String {
        let Ok(rel) = path.strip_prefix(&self.home_dir) else {
            return path.to_string_lossy().into_owned();
        };
        let mut key = String::new();
        for component in rel.components() {
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(&component.as_os_str().to_string_lossy());
        }
        key
    }
}

/// The bundler's cache of previously produced artifacts. Entry format is
/// owned by the host and opaque to the core.
pub trait CacheStore {
    /// Populate `file` (contents plus the dependency set recorded at the
    /// time of caching) from a prior entry. Returns false on a miss.
    fn load(&self, file: &mut SourceFile) -> bool;

    /// Persist a fresh entry for `file`, including its source map.
    fn write(&mut self, file: &SourceFile);
}

/// The bundler's hot-reload notification channel.
pub trait HotReload {
    fn notify(&mut self, file: &SourceFile);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_contents_reads_from_disk() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"module Main exposing (main)").unwrap();
        tmp.flush().unwrap();

        let mut file = SourceFile::new(tmp.path());
        file.load_contents().unwrap();

        assert_eq!(
            file.contents.as_deref(),
            Some("module Main exposing (main)")
        );
    }

    #[test]
    fn test_load_contents_is_lazy() {
        let mut file = SourceFile::new("/nonexistent/Main.elm");
        file.contents = Some("already loaded".to_string());

        // Must not touch the filesystem when contents are present
        file.load_contents().unwrap();
        assert_eq!(file.contents.as_deref(), Some("already loaded"));
    }

    #[test]
    fn test_project_path_is_relative_with_forward_slashes() {
        let session = BuildSession::new("/home/project");
        let key = session.project_path(Path::new("/home/project/src/App/Page.elm"));
        assert_eq!(key, "src/App/Page.elm");
    }

    #[test]
    fn test_project_path_outside_home_passes_through() {
        let session = BuildSession::new("/home/project");
        let key = session.project_path(Path::new("/elsewhere/Main.elm"));
        assert_eq!(key, "/elsewhere/Main.elm");
    }
}
