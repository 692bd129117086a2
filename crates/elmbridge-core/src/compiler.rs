//! External compiler invocation
//!
//! The Elm compiler is a black box spoken to over argv and exit codes. Its
//! diagnostics go straight to the user through inherited stdio; nothing here
//! buffers or parses them. Two incompatible CLI generations exist and the
//! project root tells us which one we are talking to.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::config::PluginOptions;
use crate::errors::TransformError;

/// Marker file whose presence in the project root selects the legacy
/// calling convention.
const LEGACY_MARKER: &str = "elm-package.json";

/// Which of the two incompatible compiler CLI conventions to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    /// `elm-make --yes --output <path> [--warn] [--debug] <source>`
    Legacy,
    /// `elm make --output=<path> [--optimize] [--debug] <source>`
    Modern,
}

impl CallingConvention {
    /// Probe the project root for the legacy version marker. Callers should
    /// memoize the result for the build session; the probe must be
    /// consistent for a given project.
    pub fn detect(home_dir: &Path) -> Self {
        if home_dir.join(LEGACY_MARKER).is_file() {
            CallingConvention::Legacy
        } else {
            CallingConvention::Modern
        }
    }

    /// Conventional binary name for this convention, used when no explicit
    /// compiler path is configured.
    pub fn default_binary(self) -> &'static str {
        match self {
            CallingConvention::Legacy => "elm-make",
            CallingConvention::Modern => "elm",
        }
    }
}

/// Outcome of one compiler invocation. Consumed once, never retried.
#[derive(Debug)]
pub enum InvocationOutcome {
    /// Exit code 0; the artifact was written to the carried path
    Success(PathBuf),
    /// The subprocess never started
    LaunchFailure(LaunchFailure),
    /// The subprocess ran and exited nonzero
    NonZeroExit(i32),
}

/// Why the compiler subprocess failed to start.
#[derive(Debug)]
pub enum LaunchFailure {
    NotFound,
    PermissionDenied,
    Other(io::Error),
}

impl LaunchFailure {
    /// Attach the resolved binary path and produce the user-facing error.
    pub fn into_transform_error(self, binary: PathBuf) -> TransformError {
        match self {
            LaunchFailure::NotFound => TransformError::CompilerNotFound { path: binary },
            LaunchFailure::PermissionDenied => {
                TransformError::CompilerPermissionDenied { path: binary }
            }
            LaunchFailure::Other(source) => TransformError::CompilerLaunch {
                path: binary,
                source,
            },
        }
    }
}

/// Build the argument vector for one invocation. Exactly one convention's
/// flag shape is produced; the two are never mixed.
pub fn build_args(
    convention: CallingConvention,
    options: &PluginOptions,
    output: &Path,
    source: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    match convention {
        CallingConvention::Legacy => {
            args.push("--yes".into());
            args.push("--output".into());
            args.push(output.into());
            if options.warn {
                args.push("--warn".into());
            }
            if options.debug {
                args.push("--debug".into());
            }
        }
        CallingConvention::Modern => {
            args.push("make".into());
            let mut output_flag = OsString::from("--output=");
            output_flag.push(output);
            args.push(output_flag);
            if options.optimize {
                args.push("--optimize".into());
            }
            if options.debug {
                args.push("--debug".into());
            }
        }
    }

    args.push(source.into());
    args
}

/// Launch the compiler and classify what happened.
///
/// The child runs with the build's home directory as cwd and inherits all
/// stdio so compiler diagnostics reach the user directly. Exactly one
/// subprocess per transform; no timeout, the child runs to its natural exit.
pub fn invoke(
    binary: &Path,
    convention: CallingConvention,
    options: &PluginOptions,
    source: &Path,
    output: &Path,
    home_dir: &Path,
) -> InvocationOutcome {
    let args = build_args(convention, options, output, source);
    debug!(binary = %binary.display(), ?args, "invoking Elm compiler");

    let status = Command::new(binary)
        .args(&args)
        .current_dir(home_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();

    match status {
        Ok(status) if status.success() => InvocationOutcome::Success(output.to_path_buf()),
        Ok(status) => InvocationOutcome::NonZeroExit(status.code().unwrap_or(-1)),
        Err(err) => InvocationOutcome::LaunchFailure(match err.kind() {
            io::ErrorKind::NotFound => LaunchFailure::NotFound,
            io::ErrorKind::PermissionDenied => LaunchFailure::PermissionDenied,
            _ => LaunchFailure::Other(err),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_detect_legacy_marker() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join("elm-package.json"), "{}").unwrap();

        assert_eq!(
            CallingConvention::detect(home.path()),
            CallingConvention::Legacy
        );
    }

    #[test]
    fn test_detect_defaults_to_modern() {
        let home = TempDir::new().unwrap();
        assert_eq!(
            CallingConvention::detect(home.path()),
            CallingConvention::Modern
        );
    }

    #[test]
    fn test_legacy_args_shape() {
        let options = PluginOptions {
            warn: true,
            debug: true,
            ..Default::default()
        };
        let args = build_args(
            CallingConvention::Legacy,
            &options,
            Path::new("/tmp/out.js"),
            Path::new("/proj/src/Main.elm"),
        );

        assert_eq!(
            args_as_strings(&args),
            vec![
                "--yes",
                "--output",
                "/tmp/out.js",
                "--warn",
                "--debug",
                "/proj/src/Main.elm",
            ]
        );
    }

    #[test]
    fn test_modern_args_shape() {
        let options = PluginOptions {
            optimize: true,
            ..Default::default()
        };
        let args = build_args(
            CallingConvention::Modern,
            &options,
            Path::new("/tmp/out.js"),
            Path::new("/proj/src/Main.elm"),
        );

        assert_eq!(
            args_as_strings(&args),
            vec![
                "make",
                "--output=/tmp/out.js",
                "--optimize",
                "/proj/src/Main.elm",
            ]
        );
    }

    #[test]
    fn test_conventions_never_mix() {
        // Every flag switched on: each convention must still only emit its
        // own flag shape.
        let options = PluginOptions {
            warn: true,
            debug: true,
            optimize: true,
            ..Default::default()
        };
        let out = Path::new("/tmp/out.js");
        let src = Path::new("/proj/src/Main.elm");

        let legacy = args_as_strings(&build_args(CallingConvention::Legacy, &options, out, src));
        assert!(!legacy.iter().any(|a| a == "make"));
        assert!(!legacy.iter().any(|a| a.starts_with("--output=")));
        assert!(!legacy.iter().any(|a| a == "--optimize"));

        let modern = args_as_strings(&build_args(CallingConvention::Modern, &options, out, src));
        assert!(!modern.iter().any(|a| a == "--yes"));
        assert!(!modern.iter().any(|a| a == "--warn"));
        assert!(!modern.iter().any(|a| a == "--output"));
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[test]
        fn test_invoke_success() {
            let home = TempDir::new().unwrap();
            let bin = write_script(home.path(), "fake-elm", "exit 0");
            let out = home.path().join("out.js");

            let outcome = invoke(
                &bin,
                CallingConvention::Modern,
                &PluginOptions::default(),
                Path::new("Main.elm"),
                &out,
                home.path(),
            );

            assert!(matches!(outcome, InvocationOutcome::Success(path) if path == out));
        }

        #[test]
        fn test_invoke_nonzero_exit() {
            let home = TempDir::new().unwrap();
            let bin = write_script(home.path(), "fake-elm", "exit 1");

            let outcome = invoke(
                &bin,
                CallingConvention::Modern,
                &PluginOptions::default(),
                Path::new("Main.elm"),
                &home.path().join("out.js"),
                home.path(),
            );

            assert!(matches!(outcome, InvocationOutcome::NonZeroExit(1)));
        }

        #[test]
        fn test_invoke_binary_not_found() {
            let home = TempDir::new().unwrap();

            let outcome = invoke(
                Path::new("/nonexistent/elm"),
                CallingConvention::Modern,
                &PluginOptions::default(),
                Path::new("Main.elm"),
                &home.path().join("out.js"),
                home.path(),
            );

            assert!(matches!(
                outcome,
                InvocationOutcome::LaunchFailure(LaunchFailure::NotFound)
            ));
        }

        #[test]
        fn test_invoke_permission_denied() {
            let home = TempDir::new().unwrap();
            let bin = home.path().join("fake-elm");
            std::fs::write(&bin, "#!/bin/sh\nexit 0\n").unwrap();
            // Deliberately not executable

            let outcome = invoke(
                &bin,
                CallingConvention::Modern,
                &PluginOptions::default(),
                Path::new("Main.elm"),
                &home.path().join("out.js"),
                home.path(),
            );

            assert!(matches!(
                outcome,
                InvocationOutcome::LaunchFailure(LaunchFailure::PermissionDenied)
            ));
        }
    }
}
