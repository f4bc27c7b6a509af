use std::time::Duration;

use super::Language;
use crate::store::StoreError;
use crate::translate::TranslationUnavailable;

/// Failures surfaced by query resolution. A degraded translation is not an error.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("at least one query is required")]
    NoQueries,

    #[error("a maximum of {max} queries is allowed, got {got}")]
    TooManyQueries { max: usize, got: usize },

    #[error("posting data unavailable: {0}")]
    DataUnavailable(#[source] StoreError),

    #[error("{0}")]
    TranslationUnavailable(#[from] TranslationUnavailable),

    #[error("{collaborator} did not respond within {}s", timeout.as_secs())]
    CollaboratorTimeout {
        collaborator: &'static str,
        timeout: Duration,
    },

    #[error("{failed} partition lookup failed, no partial result returned: {source}")]
    InternalAggregationFailure { failed: Language, source: StoreError },
}

impl QueryError {
    /// Caller mistakes, as opposed to collaborator failures.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            QueryError::EmptyQuery | QueryError::NoQueries | QueryError::TooManyQueries { .. }
        )
    }
}
