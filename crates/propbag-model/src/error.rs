use thiserror::Error;

/// Boxed error returned by property calculate functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("type mismatch for property '{property}': expected {expected}, got {actual}")]
    TypeMismatch {
        property: String,
        expected: String,
        actual: String,
    },
    #[error("property '{property}' has non-nullable type {expected} and can not hold null")]
    NullNotAllowed { property: String, expected: String },
    #[error("property '{property}' can not store the NotDefined sentinel")]
    SentinelNotStorable { property: String },
    #[error("can not infer a type for property '{property}' from a null value")]
    AmbiguousType { property: String },
    #[error("cyclic container graph while resolving '{property}' (depth {depth})")]
    CyclicContainerGraph { property: String, depth: usize },
    #[error("failed to calculate value for property '{property}': {source}")]
    Calculation {
        property: String,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
