use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Plugin options controlling how the Elm compiler is invoked
///
/// Supplied once at plugin construction and read-only thereafter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    /// Pass `--warn` to the compiler (legacy convention only, default: false)
    #[serde(default)]
    pub warn: bool,

    /// Pass `--debug` to the compiler (default: false)
    #[serde(default)]
    pub debug: bool,

    /// Pass `--optimize` to the compiler (modern convention only, default: false)
    #[serde(default)]
    pub optimize: bool,

    /// Run the configured post-processing pass over the emitted JavaScript
    /// (default: false)
    #[serde(default)]
    pub minify: bool,

    /// Explicit path to the compiler binary. When unset, the conventional
    /// binary name for the detected calling convention is used.
    #[serde(default)]
    pub compiler_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PluginOptions::default();
        assert!(!options.warn);
        assert!(!options.debug);
        assert!(!options.optimize);
        assert!(!options.minify);
        assert!(options.compiler_path.is_none());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "debug": true,
            "compilerPath": "/usr/local/bin/elm"
        }"#;
        let options: PluginOptions = serde_json::from_str(json).unwrap();
        assert!(options.debug);
        assert!(!options.optimize);
        assert_eq!(
            options.compiler_path,
            Some(PathBuf::from("/usr/local/bin/elm"))
        );
    }

    #[test]
    fn test_deserialize_empty_object() {
        let options: PluginOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.minify);
    }
}
