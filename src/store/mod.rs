//! Posting store: distinct occupation labels and per-language weekly counts.

mod postgres;

pub use postgres::PgStore;

use std::time::Duration;

use serde::Serialize;

use crate::search::Language;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("DATABASE_URL not set")]
    NotConfigured,

    #[error("database connection failed: {0}")]
    Connect(#[source] tokio_postgres::Error),

    #[error("database connection not established within {}s", .0.as_secs_f32())]
    ConnectTimeout(Duration),

    #[error("database query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("invalid row: {0}")]
    InvalidRow(String),
}

/// Publication count for one ISO week (`YYYY-WW`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyCount {
    pub week: String,
    pub count: u64,
}

impl WeeklyCount {
    pub fn new(week: impl Into<String>, count: u64) -> Self {
        Self {
            week: week.into(),
            count,
        }
    }
}

/// Read-only access to the posting store.
/// Implemented by `PgStore` for production; mock implementations used in tests.
pub trait PostingStore {
    async fn load_distinct_labels(&self) -> Result<Vec<String>, StoreError>;

    /// Weekly counts of postings in `language` whose search vector matches `term`.
    /// Weeks without postings are absent.
    async fn count_by_week(
        &self,
        language: Language,
        term: &str,
    ) -> Result<Vec<WeeklyCount>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;

    /// In-memory store; records every weekly-count lookup.
    #[derive(Default)]
    pub(crate) struct MockStore {
        pub(crate) labels: Vec<String>,
        pub(crate) labels_unavailable: bool,
        pub(crate) stalled_labels: bool,
        pub(crate) counts: HashMap<(Language, String), Vec<WeeklyCount>>,
        pub(crate) failing: HashSet<Language>,
        pub(crate) stalled: HashSet<Language>,
        pub(crate) lookups: Mutex<Vec<(Language, String)>>,
    }

    impl MockStore {
        pub(crate) fn with_labels(labels: &[&str]) -> Self {
            Self {
                labels: labels.iter().map(|l| l.to_string()).collect(),
                ..Default::default()
            }
        }

        pub(crate) fn counts(mut self, language: Language, term: &str, weeks: &[(&str, u64)]) -> Self {
            self.counts.insert(
                (language, term.to_string()),
                weeks.iter().map(|(w, c)| WeeklyCount::new(*w, *c)).collect(),
            );
            self
        }

        pub(crate) fn lookups(&self) -> Vec<(Language, String)> {
            self.lookups.lock().unwrap().clone()
        }
    }

    fn unavailable() -> StoreError {
        StoreError::InvalidRow("store offline".into())
    }

    impl PostingStore for MockStore {
        async fn load_distinct_labels(&self) -> Result<Vec<String>, StoreError> {
            if self.stalled_labels {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.labels_unavailable {
                return Err(unavailable());
            }
            Ok(self.labels.clone())
        }

        async fn count_by_week(
            &self,
            language: Language,
            term: &str,
        ) -> Result<Vec<WeeklyCount>, StoreError> {
            self.lookups.lock().unwrap().push((language, term.to_string()));
            if self.stalled.contains(&language) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.failing.contains(&language) {
                return Err(unavailable());
            }
            Ok(self
                .counts
                .get(&(language, term.to_string()))
                .cloned()
                .unwrap_or_default())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            if self.labels_unavailable {
                return Err(unavailable());
            }
            Ok(())
        }
    }
}
