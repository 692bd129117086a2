//! Static Elm import-graph walk
//!
//! The compiler inlines every Elm dependency into the single emitted
//! artifact, so the bundler never sees them as modules of its own. The
//! bundler still needs the true dependency set to decide cache invalidation,
//! and the only safe way to get it is to rediscover it from the source after
//! each compile: a pure read-only walk of `import` statements, never
//! touching the compiler and never mutating a SourceFile.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const MODERN_MANIFEST: &str = "elm.json";
const LEGACY_MANIFEST: &str = "elm-package.json";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("entry module {path} does not exist")]
    MissingRoot { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed project manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// The slice of the Elm project manifest we care about. Both manifest
/// generations spell the field the same way.
#[derive(Debug, Deserialize)]
struct ProjectManifest {
    #[serde(rename = "source-directories", default = "default_source_directories")]
    source_directories: Vec<String>,
}

fn default_source_directories() -> Vec<String> {
    vec![".".to_string()]
}

/// Resolve the project's source directories from its manifest. A project
/// without a manifest searches from its root.
fn source_directories(home_dir: &Path) -> Result<Vec<PathBuf>> {
    for name in [MODERN_MANIFEST, LEGACY_MANIFEST] {
        let path = home_dir.join(name);
        if !path.is_file() {
            continue;
        }
        let text = std::fs::read_to_string(&path).map_err(|source| DiscoveryError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest: ProjectManifest =
            serde_json::from_str(&text).map_err(|source| DiscoveryError::Manifest { path, source })?;
        return Ok(manifest
            .source_directories
            .iter()
            .map(|dir| home_dir.join(dir))
            .collect());
    }
    Ok(vec![home_dir.to_path_buf()])
}

/// Extract the module names imported by one Elm source.
///
/// Elm imports are always top-level, so only column-zero `import` lines
/// count, and only outside block comments (`{- -}`, which nest).
pub fn parse_imports(source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut comment_depth: usize = 0;

    for line in source.lines() {
        if comment_depth == 0 {
            if let Some(module) = line
                .strip_prefix("import ")
                .and_then(|rest| rest.split_whitespace().next())
            {
                imports.push(module.to_string());
            }
        }
        comment_depth = comment_depth
            .saturating_add(line.matches("{-").count())
            .saturating_sub(line.matches("-}").count());
    }

    imports
}

/// Map a dotted module name onto a file under one of the source
/// directories. `None` means the module lives in a package, not this
/// project.
fn resolve_module(module: &str, source_dirs: &[PathBuf]) -> Option<PathBuf> {
    let rel: PathBuf = module.split('.').collect::<PathBuf>().with_extension("elm");
    source_dirs.iter().map(|dir| dir.join(&rel)).find(|p| p.is_file())
}

/// Walk the import graph transitively from `source` and return every
/// project-local module it reaches, deduplicated, as absolute paths.
///
/// Package imports are skipped; an I/O failure on a file that does exist is
/// fatal, because an incomplete dependency set would corrupt future
/// cache-invalidation decisions.
pub fn discover_dependencies(source: &Path, home_dir: &Path) -> Result<Vec<PathBuf>> {
    if !source.is_file() {
        return Err(DiscoveryError::MissingRoot {
            path: source.to_path_buf(),
        });
    }

    let source_dirs = source_directories(home_dir)?;

    let mut discovered: IndexSet<PathBuf> = IndexSet::new();
    let mut visited: FxHashSet<PathBuf> = FxHashSet::default();
    let mut pending = vec![source.to_path_buf()];
    visited.insert(source.to_path_buf());

    while let Some(current) = pending.pop() {
        let text = std::fs::read_to_string(&current).map_err(|source| DiscoveryError::Io {
            path: current.clone(),
            source,
        })?;

        for module in parse_imports(&text) {
            let Some(resolved) = resolve_module(&module, &source_dirs) else {
                // Not under any source directory: a package import
                continue;
            };
            if visited.insert(resolved.clone()) {
                discovered.insert(resolved.clone());
                pending.push(resolved);
            }
        }
    }

    debug!(
        entry = %source.display(),
        count = discovered.len(),
        "discovered Elm dependencies"
    );
    Ok(discovered.into_iter().collect())
}
