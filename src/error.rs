//! Error types for menurbac

use thiserror::Error;

/// The main error type for menurbac operations
#[derive(Debug, Clone, Error)]
pub enum RbacError {
    /// Requested record is absent
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// Duplicate code or name under the same parent
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rejected before any mutation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// Underlying persistence error, with the call site that hit it
    #[error("storage failure in {context}: {message}")]
    Storage { context: &'static str, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RbacError {
    /// Machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            RbacError::NotFound { .. } => "not_found",
            RbacError::Conflict(_) => "conflict",
            RbacError::InvalidInput(_) => "invalid_input",
            RbacError::PreconditionFailed(_) => "precondition_failed",
            RbacError::Storage { .. } => "storage_failure",
            RbacError::Config(_) => "invalid_config",
        }
    }

    /// HTTP-equivalent status class
    pub fn status(&self) -> u16 {
        match self {
            RbacError::NotFound { .. } => 404,
            RbacError::Conflict(_)
            | RbacError::InvalidInput(_)
            | RbacError::PreconditionFailed(_) => 400,
            RbacError::Storage { .. } | RbacError::Config(_) => 500,
        }
    }

    /// Message safe to hand to an external caller
    pub fn public_message(&self) -> String {
        match self {
            RbacError::Storage { .. } | RbacError::Config(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: u64) -> Self {
        RbacError::NotFound { entity, id }
    }
}

/// Form validation failures are the caller's fault
impl From<validator::ValidationErrors> for RbacError {
    fn from(e: validator::ValidationErrors) -> Self {
        RbacError::InvalidInput(e.to_string())
    }
}

/// Result type alias for menurbac operations
pub type Result<T> = std::result::Result<T, RbacError>;

/// Convert a storage error into `RbacError::Storage` tagged with `context`
pub fn err<E: std::error::Error>(context: &'static str) -> impl FnOnce(E) -> RbacError {
    move |e| RbacError::Storage {
        context,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_detail_is_not_public() {
        let e = err::<std::io::Error>("menu.get")(std::io::Error::other("disk on fire"));
        assert_eq!(e.reason(), "storage_failure");
        assert_eq!(e.status(), 500);
        assert!(e.to_string().contains("disk on fire"));
        assert!(!e.public_message().contains("disk"));
    }

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(RbacError::Conflict("x".into()).status(), 400);
        assert_eq!(RbacError::PreconditionFailed("x".into()).reason(), "precondition_failed");
        assert_eq!(RbacError::not_found("menu", 7).status(), 404);
        assert_eq!(RbacError::not_found("menu", 7).to_string(), "menu 7 not found");
    }
}
