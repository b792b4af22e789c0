//! Unified error type for registry operations.
//!
//! Every variant except [`RegistryError::Internal`] is an expected outcome
//! that the platform layer reports back to the invoking actor. `Internal`
//! failures are logged for operators and surfaced as a generic message.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A caller-supplied field violated a validation rule. The message
    /// names the rule so the actor can correct the input.
    #[error("{0}")]
    Validation(String),

    #[error("that user already has an identity record")]
    DuplicateOwner,

    #[error("that national id is already registered")]
    DuplicateNationalId,

    #[error("no matching record exists")]
    NotFound,

    /// A role-gated check failed. Deliberately does not say which role was
    /// missing.
    #[error("you do not have permission to use this command")]
    PermissionDenied,

    /// The wrong actor tried to drive someone else's interaction (a
    /// disclosure prompt or a page cursor).
    #[error("only the addressed user can do that")]
    NotAuthorized,

    #[error("this interaction has expired")]
    Expired,

    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    /// Text safe to show to the invoking actor. Internal faults collapse to
    /// a generic line; everything else is already actor-facing.
    pub fn user_message(&self) -> String {
        match self {
            RegistryError::Internal(_) => "something went wrong, try again later".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<docstore::DocumentError> for RegistryError {
    fn from(error: docstore::DocumentError) -> Self {
        tracing::error!("document store failure: {error}");
        RegistryError::Internal(error.to_string())
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_details_never_reach_the_actor() {
        let error = RegistryError::Internal("disk full at /var/data".to_string());
        assert!(!error.user_message().contains("/var/data"));
    }

    #[test]
    fn validation_message_names_the_rule() {
        let error = RegistryError::Validation("sex must be H or M".to_string());
        assert_eq!(error.user_message(), "sex must be H or M");
    }
}
