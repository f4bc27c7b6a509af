use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::catalog::{LabelCatalog, LabelMatcher};
use crate::translate::{COMMON_PROFESSIONS, TranslationGateway, Translator};

pub const DEFAULT_MAX_LABELS: usize = 10;

/// Decides whether a query is too broad to aggregate without disambiguation.
///
/// Heuristic: a query is too general when it is a common profession (English
/// or its Swedish translation), or when at least `max_labels` catalog labels
/// match it. Substring matching can over- and under-trigger.
pub struct GeneralityClassifier {
    max_labels: usize,
    common: HashSet<String>,
    matcher: Arc<dyn LabelMatcher>,
    missing_swedish: usize,
}

impl GeneralityClassifier {
    pub fn new<I, S>(max_labels: usize, common_terms: I, matcher: Arc<dyn LabelMatcher>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            max_labels,
            common: common_terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            matcher,
            missing_swedish: 0,
        }
    }

    /// Builds the common-term set: every English common profession plus its
    /// Swedish translation. A term whose translation is unavailable or degraded
    /// keeps only its English form and is counted in [`Self::missing_swedish`].
    pub async fn prepare<T: Translator>(
        max_labels: usize,
        gateway: &TranslationGateway<T>,
        matcher: Arc<dyn LabelMatcher>,
    ) -> Self {
        let translations = join_all(COMMON_PROFESSIONS.iter().map(|en| gateway.to_swedish(en))).await;

        let mut terms: Vec<String> = COMMON_PROFESSIONS.iter().map(|t| t.to_string()).collect();
        let mut missing = 0;
        for (en, translation) in COMMON_PROFESSIONS.iter().zip(translations) {
            match translation {
                Ok(sv) if !sv.is_degraded() => terms.push(sv.text),
                Ok(_) => {
                    missing += 1;
                    warn!(term = *en, "common profession kept without Swedish form (translator failed)");
                }
                Err(e) => {
                    missing += 1;
                    warn!(term = *en, error = %e, "common profession kept without Swedish form");
                }
            }
        }
        debug!(terms = terms.len(), missing, "common profession terms prepared");
        Self {
            missing_swedish: missing,
            ..Self::new(max_labels, terms, matcher)
        }
    }

    /// Common professions whose Swedish form could not be obtained.
    pub fn missing_swedish(&self) -> usize {
        self.missing_swedish
    }

    pub fn is_too_general(&self, query: &str, catalog: &LabelCatalog) -> bool {
        let query = query.trim().to_lowercase();
        if self.common.contains(&query) {
            debug!(query = %query, "query is a common profession");
            return true;
        }
        let matched = catalog
            .scan(&query, self.matcher.as_ref())
            .take(self.max_labels)
            .count();
        matched >= self.max_labels
    }
}
