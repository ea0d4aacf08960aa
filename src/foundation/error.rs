/// Convenience result type used across strata.
pub type StrataResult<T> = Result<T, StrataError>;

/// Top-level error taxonomy used by compositor APIs.
#[derive(thiserror::Error, Debug)]
pub enum StrataError {
    /// Non-positive sizes/durations, malformed time ranges or geometry vectors.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A layer with the same name is already registered in the composition.
    #[error("duplicate layer name: {0}")]
    DuplicateName(String),

    /// Lookup or removal of a layer name that is not registered.
    #[error("layer not found: {0}")]
    NotFound(String),

    /// An external layer or effect broke the pixel/audio buffer contract.
    ///
    /// This is never recovered: the render call that observed it fails.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// Runtime failures while rendering, mixing or encoding.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing scene descriptions.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    /// Build a [`StrataError::InvalidArgument`] value.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`StrataError::DuplicateName`] value.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName(name.into())
    }

    /// Build a [`StrataError::NotFound`] value.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Build a [`StrataError::ContractViolation`] value.
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::ContractViolation(msg.into())
    }

    /// Build a [`StrataError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`StrataError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
