/// Alias for `Result<T, EcError>`.
pub type EcResult<T> = Result<T, EcError>;

/// Errors returned by checked lookups and value conversions.
///
/// Declaration problems found while loading (missing parents, cycles,
/// redefinitions) are never errors; they are recorded as
/// [`Diagnostic`](crate::diagnostic::Diagnostic)s on the registry.
#[derive(Debug, thiserror::Error)]
pub enum EcError {
    /// No entity class is registered under this name.
    #[error("entity class not found: \"{0}\"")]
    UnknownClass(String),

    /// No model def is registered under this name.
    #[error("model def not found: \"{0}\"")]
    UnknownModel(String),

    /// A spawnarg value could not be read as a whitespace-separated vector.
    #[error("invalid vector value \"{value}\" (expected {expected} numbers)")]
    InvalidVector {
        /// The offending text.
        value: String,
        /// Number of components that were expected.
        expected: usize,
    },
}
