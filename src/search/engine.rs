use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::bilingual::{self, STORE};
use super::classify::{DEFAULT_MAX_LABELS, GeneralityClassifier};
use super::suggest::{DEFAULT_SUGGESTION_LIMIT, SuggestionGenerator};
use super::types::{
    BatchOutcome, ComponentStatus, HealthReport, Refinement, RefinementOutcome, ResolvedSeries,
    Suggestion,
};
use super::QueryError;
use crate::catalog::{LabelCatalog, LabelMatcher, Shared, SharedCatalog, SubstringMatcher};
use crate::store::PostingStore;
use crate::translate::{Translation, TranslationGateway, Translator};

/// Maximum number of queries in one compare request.
pub const MAX_BATCH: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub max_labels: usize,
    pub suggestion_limit: usize,
    /// Upper bound for each store call.
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_labels: DEFAULT_MAX_LABELS,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            timeout: Duration::from_secs(20),
        }
    }
}

/// A query after normalization and Swedish term derivation.
struct SearchTarget {
    query: String,
    swedish: Translation,
    catalog_label: bool,
}

enum Plan {
    Refine(Refinement),
    Search(SearchTarget),
}

/// Entry point for query resolution: classification, suggestions, and the
/// bilingual search, over a catalog snapshot that can be reloaded atomically.
pub struct QueryEngine<S, T> {
    store: S,
    gateway: TranslationGateway<T>,
    catalog: SharedCatalog,
    classifier: Shared<GeneralityClassifier>,
    matcher: Arc<dyn LabelMatcher>,
    suggester: SuggestionGenerator,
    config: EngineConfig,
}

impl<S: PostingStore, T: Translator> QueryEngine<S, T> {
    /// Loads the label catalog and prepares the common-profession terms.
    /// Fails if the catalog cannot be loaded; the engine never starts empty-handed.
    pub async fn start(store: S, translator: T, config: EngineConfig) -> Result<Self, QueryError> {
        Self::start_with_matcher(store, translator, config, Arc::new(SubstringMatcher)).await
    }

    pub async fn start_with_matcher(
        store: S,
        translator: T,
        config: EngineConfig,
        matcher: Arc<dyn LabelMatcher>,
    ) -> Result<Self, QueryError> {
        let gateway = TranslationGateway::new(translator);
        let catalog = load_catalog(&store, config.timeout).await?;
        if catalog.is_empty() {
            warn!("label catalog is empty; no query will need refinement by label count");
        }
        info!(labels = catalog.len(), "label catalog loaded");

        let classifier =
            GeneralityClassifier::prepare(config.max_labels, &gateway, matcher.clone()).await;

        Ok(Self {
            store,
            gateway,
            catalog: SharedCatalog::new(catalog),
            classifier: Shared::new(classifier),
            suggester: SuggestionGenerator::new(matcher.clone()),
            matcher,
            config,
        })
    }

    pub fn catalog(&self) -> Arc<LabelCatalog> {
        self.catalog.snapshot()
    }

    /// Replaces the catalog with a fresh load and rebuilds the common-profession
    /// terms. On failure the current snapshots stay.
    pub async fn reload_catalog(&self) -> Result<usize, QueryError> {
        let catalog = load_catalog(&self.store, self.config.timeout).await?;
        let labels = catalog.len();
        let previous = self.catalog.replace(catalog);
        info!(labels, previous = previous.len(), "label catalog reloaded");

        let classifier =
            GeneralityClassifier::prepare(self.config.max_labels, &self.gateway, self.matcher.clone())
                .await;
        let missing = classifier.missing_swedish();
        self.classifier.replace(classifier);
        debug!(missing_swedish = missing, "common profession terms rebuilt");
        Ok(labels)
    }

    pub async fn resolve_query(
        &self,
        query: &str,
        refined: bool,
    ) -> Result<RefinementOutcome, QueryError> {
        info!(query, refined, "resolve_query");
        match self.plan(query, refined).await? {
            Plan::Refine(refinement) => Ok(RefinementOutcome::NeedsRefinement(refinement)),
            Plan::Search(target) => self.execute(target).await.map(RefinementOutcome::Resolved),
        }
    }

    /// Resolves up to [`MAX_BATCH`] queries. A `refined` slice whose length
    /// differs from `queries` is treated as all `false`.
    pub async fn resolve_many(
        &self,
        queries: &[String],
        refined: &[bool],
    ) -> Result<BatchOutcome, QueryError> {
        let started = Instant::now();
        info!(?queries, ?refined, "resolve_many");

        if queries.is_empty() {
            warn!("no queries provided");
            return Err(QueryError::NoQueries);
        }
        if queries.len() > MAX_BATCH {
            warn!(got = queries.len(), "too many queries");
            return Err(QueryError::TooManyQueries {
                max: MAX_BATCH,
                got: queries.len(),
            });
        }
        let refined = if refined.len() == queries.len() {
            refined.to_vec()
        } else {
            debug!("refined flags adjusted to match queries");
            vec![false; queries.len()]
        };

        let plans = join_all(
            queries
                .iter()
                .zip(&refined)
                .map(|(query, refined)| self.plan(query, *refined)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        if plans.iter().any(|p| matches!(p, Plan::Refine(_))) {
            let outcome = combine_refinements(queries, plans);
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "refinement required for batch"
            );
            return Ok(outcome);
        }

        let targets = plans.into_iter().filter_map(|p| match p {
            Plan::Search(target) => Some(target),
            Plan::Refine(_) => None,
        });
        let results = join_all(targets.map(|t| self.execute(t)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            queries = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch resolved"
        );
        Ok(BatchOutcome::Resolved { results })
    }

    /// Autocomplete over the Swedish catalog.
    pub async fn suggest(&self, fragment: &str, limit: Option<usize>) -> Vec<Suggestion> {
        let limit = limit.unwrap_or(self.config.suggestion_limit);
        let catalog = self.catalog.snapshot();
        self.suggester
            .suggest(fragment, limit, &catalog, &self.gateway)
            .await
    }

    pub async fn health(&self) -> HealthReport {
        let store = match tokio::time::timeout(self.config.timeout, self.store.ping()).await {
            Ok(Ok(())) => ComponentStatus::Ok,
            Ok(Err(e)) => ComponentStatus::Error {
                detail: e.to_string(),
            },
            Err(_) => ComponentStatus::Error {
                detail: format!("no response within {}s", self.config.timeout.as_secs()),
            },
        };
        HealthReport {
            store,
            catalog_labels: self.catalog().len(),
        }
    }

    async fn plan(&self, query: &str, refined: bool) -> Result<Plan, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            warn!("empty query");
            return Err(QueryError::EmptyQuery);
        }

        let swedish = self.gateway.swedish_profession(query).await?;
        if swedish.is_degraded() {
            warn!(query, "no Swedish translation, using the query as the Swedish term");
        }

        let catalog = self.catalog.snapshot();
        if !refined {
            if self.classifier.snapshot().is_too_general(query, &catalog) {
                let suggestions = self
                    .suggester
                    .suggest(
                        &swedish.text,
                        self.config.suggestion_limit,
                        &catalog,
                        &self.gateway,
                    )
                    .await;
                info!(query, suggestions = suggestions.len(), "query too general");
                return Ok(Plan::Refine(Refinement {
                    suggestions,
                    original_query: query.to_string(),
                    allow_raw_search: true,
                }));
            }
        }

        Ok(Plan::Search(SearchTarget {
            query: query.to_string(),
            catalog_label: catalog.contains(&swedish.text),
            swedish,
        }))
    }

    async fn execute(&self, target: SearchTarget) -> Result<ResolvedSeries, QueryError> {
        let series = bilingual::search(
            &self.store,
            self.config.timeout,
            &target.query,
            &target.swedish.text,
        )
        .await?;
        info!(query = %target.query, swedish = %target.swedish.text, weeks = series.len(), "search complete");
        Ok(ResolvedSeries {
            query: target.query,
            swedish_term: target.swedish.text,
            swedish_source: target.swedish.source,
            catalog_label: target.catalog_label,
            series,
        })
    }
}

async fn load_catalog(store: &impl PostingStore, timeout: Duration) -> Result<LabelCatalog, QueryError> {
    match tokio::time::timeout(timeout, LabelCatalog::load(store)).await {
        Ok(Ok(catalog)) => Ok(catalog),
        Ok(Err(e)) => {
            warn!(error = %e, "label catalog load failed");
            Err(QueryError::DataUnavailable(e))
        }
        Err(_) => Err(QueryError::CollaboratorTimeout {
            collaborator: STORE,
            timeout,
        }),
    }
}

fn combine_refinements(queries: &[String], plans: Vec<Plan>) -> BatchOutcome {
    let mut refine_which = Vec::new();
    let mut suggestions = Vec::with_capacity(plans.len());
    let mut original_queries = Vec::with_capacity(plans.len());
    let mut allow_raw_search = Vec::with_capacity(plans.len());

    for (idx, (query, plan)) in queries.iter().zip(plans).enumerate() {
        match plan {
            Plan::Refine(r) => {
                refine_which.push(idx);
                suggestions.push(r.suggestions);
                original_queries.push(r.original_query);
                allow_raw_search.push(r.allow_raw_search);
            }
            Plan::Search(_) => {
                suggestions.push(Vec::new());
                original_queries.push(query.trim().to_string());
                allow_raw_search.push(false);
            }
        }
    }

    BatchOutcome::NeedsRefinement {
        refine_which,
        suggestions,
        original_queries,
        allow_raw_search,
    }
}
