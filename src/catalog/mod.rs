//! In-memory catalog of canonical Swedish occupation labels.
//!
//! A [`LabelCatalog`] is an immutable snapshot. [`Shared`] holds the current
//! snapshot and replaces it wholesale on reload, so readers see either the old
//! or the new catalog, never a partially filled one.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::store::{PostingStore, StoreError};

#[derive(Debug, Clone)]
struct Label {
    text: String,
    lower: String,
}

/// Decides whether a label matches a query fragment. Both sides arrive lower-cased.
pub trait LabelMatcher: Send + Sync {
    fn matches(&self, label: &str, fragment: &str) -> bool;
}

/// Plain substring containment, no word-boundary awareness ("art" matches "smart").
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl LabelMatcher for SubstringMatcher {
    fn matches(&self, label: &str, fragment: &str) -> bool {
        label.contains(fragment)
    }
}

/// Sorted, de-duplicated set of non-empty labels.
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    labels: Vec<Label>,
}

impl LabelCatalog {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = labels
            .into_iter()
            .map(Into::into)
            .filter(|l| !l.trim().is_empty())
            .collect();
        Self {
            labels: unique
                .into_iter()
                .map(|text| Label {
                    lower: text.to_lowercase(),
                    text,
                })
                .collect(),
        }
    }

    pub async fn load(store: &impl PostingStore) -> Result<Self, StoreError> {
        let labels = store.load_distinct_labels().await?;
        Ok(Self::from_labels(labels))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Case-insensitive exact membership.
    pub fn contains(&self, label: &str) -> bool {
        let lower = label.trim().to_lowercase();
        self.labels.iter().any(|l| l.lower == lower)
    }

    /// Labels accepted by `matcher` for `fragment`, in catalog order.
    pub fn scan<'a>(
        &'a self,
        fragment: &str,
        matcher: &'a dyn LabelMatcher,
    ) -> impl Iterator<Item = &'a str> + use<'a> {
        let fragment = fragment.to_lowercase();
        self.labels
            .iter()
            .filter(move |l| matcher.matches(&l.lower, &fragment))
            .map(|l| l.text.as_str())
    }
}

/// Process-wide handle to an immutable snapshot that is swapped whole.
#[derive(Debug, Default)]
pub struct Shared<T> {
    current: RwLock<Arc<T>>,
}

pub type SharedCatalog = Shared<LabelCatalog>;

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
        }
    }

    pub fn snapshot(&self) -> Arc<T> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swaps in `value`, returning the previous snapshot.
    pub fn replace(&self, value: T) -> Arc<T> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(value))
    }
}
