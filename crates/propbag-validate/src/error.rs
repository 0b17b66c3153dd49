use propbag_model::ModelError;
use thiserror::Error;

/// Hard failures raised while validating.
///
/// Rule failures are reported as [`crate::Message`]s, not errors. Only misuse
/// surfaced by the resolution engine ends up here.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ValidationError>;
