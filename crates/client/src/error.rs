//! Error type returned by every mutating operation in the core.

use persistence::store::StoreError;
use thiserror::Error;

/// The error taxonomy surfaced to the presentation layer.
///
/// `Validation` and `Authorization` are resolved before any write is
/// attempted; `Store` wraps the transient document-store failures
/// (unavailable, permission denied by the rule engine, transaction
/// conflict) and is generally retryable.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Whether retrying the operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Store(e) if e.is_transient())
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid {field}"))
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        CoreError::Validation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_is_transient() {
        let err = CoreError::Store(StoreError::Conflict("contention".into()));
        assert!(err.is_transient());
        assert!(!CoreError::Validation("bad".into()).is_transient());
    }

    #[test]
    fn test_validation_errors_flatten() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1, message = "Title must not be empty"))]
            title: String,
        }

        let errors = Probe { title: String::new() }.validate().unwrap_err();
        let core: CoreError = errors.into();
        assert!(core.to_string().contains("Title must not be empty"));
    }
}
