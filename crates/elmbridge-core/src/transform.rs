//! Transform orchestrator
//!
//! Sequences the whole pipeline for one file: cache gate, compiler
//! invocation, artifact read, dependency reconciliation, cache write-back
//! and the optional post-processing pass. The first failing step
//! short-circuits the rest and becomes the transform's error.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::artifact::{ArtifactNamer, TempArtifactNamer};
use crate::cache::{self, CacheDecision};
use crate::compiler::{self, CallingConvention, InvocationOutcome};
use crate::config::PluginOptions;
use crate::deps;
use crate::errors::{Result, TransformError};
use crate::host::{BuildSession, CacheStore, HotReload, SourceFile};
use crate::minify::Minifier;

/// The source extension this plugin claims with the host bundler.
pub const ELM_EXTENSION: &str = ".elm";

/// The Elm transform plugin.
///
/// Holds the immutable option snapshot plus the injected capabilities
/// (artifact naming, optional minification). The calling convention for the
/// project is probed once per plugin lifetime and memoized.
pub struct ElmPlugin {
    options: PluginOptions,
    namer: Box<dyn ArtifactNamer>,
    minifier: Option<Box<dyn Minifier>>,
    convention: OnceLock<CallingConvention>,
}

impl ElmPlugin {
    pub fn new(options: PluginOptions) -> Self {
        Self {
            options,
            namer: Box::new(TempArtifactNamer),
            minifier: None,
            convention: OnceLock::new(),
        }
    }

    /// Replace the temp artifact namer (tests supply deterministic paths).
    pub fn with_artifact_namer(mut self, namer: Box<dyn ArtifactNamer>) -> Self {
        self.namer = namer;
        self
    }

    /// Configure the post-processing pass run when `options.minify` is set.
    pub fn with_minifier(mut self, minifier: Box<dyn Minifier>) -> Self {
        self.minifier = Some(minifier);
        self
    }

    /// The extension to register with the host's `allow_extension`.
    pub fn extension(&self) -> &'static str {
        ELM_EXTENSION
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    fn convention_for(&self, home_dir: &Path) -> CallingConvention {
        *self
            .convention
            .get_or_init(|| CallingConvention::detect(home_dir))
    }

    fn compiler_binary(&self, convention: CallingConvention) -> PathBuf {
        match &self.options.compiler_path {
            Some(path) => path.clone(),
            None => PathBuf::from(convention.default_binary()),
        }
    }

    /// Transform one file.
    ///
    /// On success the file carries the compiled JavaScript; when caching is
    /// enabled its dependency set ends up empty (the artifact is
    /// self-contained). On error the file is never marked as produced.
    pub fn transform(
        &self,
        file: &mut SourceFile,
        session: &BuildSession,
        store: &mut dyn CacheStore,
        hot_reload: &mut dyn HotReload,
    ) -> Result<()> {
        if cache::evaluate(file, session, store) == CacheDecision::SkipCached {
            return Ok(());
        }

        file.load_contents()
            .map_err(|source| TransformError::SourceRead {
                path: file.abs_path.clone(),
                source,
            })?;

        let convention = self.convention_for(&session.home_dir);
        let binary = self.compiler_binary(convention);

        let artifact_path = self.namer.fresh_path().map_err(TransformError::TempPath)?;

        info!(file = %file.abs_path.display(), "compiling Elm module");
        match compiler::invoke(
            &binary,
            convention,
            &self.options,
            &file.abs_path,
            &artifact_path,
            &session.home_dir,
        ) {
            InvocationOutcome::Success(_) => {}
            InvocationOutcome::LaunchFailure(failure) => {
                return Err(failure.into_transform_error(binary));
            }
            InvocationOutcome::NonZeroExit(code) => {
                return Err(TransformError::CompilationFailed { code });
            }
        }

        // A read failure here is fatal even though the compiler reported
        // success; falling through would produce contents from nothing.
        let emitted = std::fs::read_to_string(&artifact_path).map_err(|source| {
            TransformError::ArtifactRead {
                path: artifact_path.clone(),
                source,
            }
        })?;
        file.contents = Some(emitted);

        let discovered = deps::discover_dependencies(&file.abs_path, &session.home_dir)?;
        file.dependencies = discovered
            .iter()
            .map(|path| session.project_path(path))
            .collect();

        if session.use_cache {
            hot_reload.notify(file);
            store.write(file);
            // From here on the bundler treats the file as dependency-free:
            // the artifact already contains everything it imports.
            file.dependencies.clear();
        }

        if self.options.minify {
            match &self.minifier {
                Some(minifier) => {
                    if let Some(contents) = file.contents.as_deref() {
                        debug!(file = %file.abs_path.display(), "running post-processing pass");
                        let processed = minifier
                            .minify(contents)
                            .map_err(|err| TransformError::PostProcess(err.to_string()))?;
                        file.contents = Some(processed);
                    }
                }
                None => {
                    warn!(
                        file = %file.abs_path.display(),
                        "minify is enabled but no post-processing pass is configured; emitting unprocessed output"
                    );
                }
            }
        }

        Ok(())
    }
}
