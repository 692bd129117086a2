use thiserror::Error;

/// Failure reported by a [`Minifier`] implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MinifyError(pub String);

/// Optional post-processing pass over the emitted JavaScript.
///
/// The pass itself is an external collaborator; the transform only cares
/// about its pass/fail outcome and the processed text.
pub trait Minifier {
    fn minify(&self, source: &str) -> Result<String, MinifyError>;
}
