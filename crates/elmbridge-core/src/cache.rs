//! Cache gate
//!
//! The incremental decision layer, evaluated once and synchronously before
//! any subprocess is spawned. It is the only point where recompilation can
//! be avoided entirely.

use tracing::debug;

use crate::host::{BuildSession, CacheStore, SourceFile};

/// What the gate decided for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// No usable entry, or the entry was built from a file that changed
    Recompile,
    /// The cached artifact is still valid; the bundler keeps serving it
    SkipCached,
}

/// Evaluate the gate for `file`.
///
/// Three states:
/// - Cold: caching disabled, no changed-file snapshot for this build cycle,
///   or no usable cached entry. Recompile.
/// - Cached-Unaffected: an entry loaded and the changed file is not in its
///   recorded dependency set. Skip.
/// - Cached-Affected: the changed file is in the recorded set. Recompile.
///
/// Whenever an entry loads, the file's dependency set is cleared before
/// returning: the compiler inlined every Elm dependency into the artifact,
/// and the bundler must not walk into them as separate modules.
pub fn evaluate(
    file: &mut SourceFile,
    session: &BuildSession,
    store: &dyn CacheStore,
) -> CacheDecision {
    if !session.use_cache {
        return CacheDecision::Recompile;
    }

    // Cold full build: nothing changed "most recently", so the gate cannot
    // prove the entry safe. Compile.
    let Some(changed) = session.last_changed_file.as_deref() else {
        return CacheDecision::Recompile;
    };

    if !store.load(file) {
        debug!(file = %file.abs_path.display(), "no cached entry");
        return CacheDecision::Recompile;
    }

    let changed_key = session.project_path(changed);
    let affected = file.dependencies.contains(changed_key.as_str());

    file.dependencies.clear();

    if affected {
        debug!(
            file = %file.abs_path.display(),
            changed = %changed_key,
            "cached entry invalidated by dependency change"
        );
        CacheDecision::Recompile
    } else {
        debug!(file = %file.abs_path.display(), "serving cached artifact");
        CacheDecision::SkipCached
    }
}
