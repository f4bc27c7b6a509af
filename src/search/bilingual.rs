//! Two-partition weekly lookup and merge.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::{Language, QueryError};
use crate::store::{PostingStore, StoreError, WeeklyCount};

pub(crate) const STORE: &str = "posting store";

enum LookupFailure {
    Timeout,
    Store(StoreError),
}

/// Runs the English and Swedish lookups concurrently and merges them.
///
/// The partitions are disjoint by posting language, so identical terms are
/// still looked up and summed on both sides. If either side fails the whole
/// search fails; a one-language series would under-count.
pub async fn search(
    store: &impl PostingStore,
    timeout: Duration,
    english_term: &str,
    swedish_term: &str,
) -> Result<Vec<WeeklyCount>, QueryError> {
    let (en, sv) = tokio::join!(
        lookup(store, timeout, Language::English, english_term),
        lookup(store, timeout, Language::Swedish, swedish_term),
    );

    match (en, sv) {
        (Ok(en), Ok(sv)) => Ok(merge_weekly(en, sv)),
        (Err(LookupFailure::Timeout), _) | (_, Err(LookupFailure::Timeout)) => {
            Err(QueryError::CollaboratorTimeout {
                collaborator: STORE,
                timeout,
            })
        }
        (Err(LookupFailure::Store(e)), Ok(_)) => {
            warn!(error = %e, "english lookup failed, discarding swedish result");
            Err(QueryError::InternalAggregationFailure {
                failed: Language::English,
                source: e,
            })
        }
        (Ok(_), Err(LookupFailure::Store(e))) => {
            warn!(error = %e, "swedish lookup failed, discarding english result");
            Err(QueryError::InternalAggregationFailure {
                failed: Language::Swedish,
                source: e,
            })
        }
        (Err(LookupFailure::Store(e)), Err(LookupFailure::Store(_))) => {
            Err(QueryError::DataUnavailable(e))
        }
    }
}

async fn lookup(
    store: &impl PostingStore,
    timeout: Duration,
    language: Language,
    term: &str,
) -> Result<Vec<WeeklyCount>, LookupFailure> {
    let started = Instant::now();
    let result = tokio::time::timeout(timeout, store.count_by_week(language, term)).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(weeks)) => {
            info!(%language, term, elapsed_ms, rows = weeks.len(), "partition lookup");
            Ok(weeks)
        }
        Ok(Err(e)) => {
            warn!(%language, term, elapsed_ms, error = %e, "partition lookup failed");
            Err(LookupFailure::Store(e))
        }
        Err(_) => {
            warn!(%language, term, elapsed_ms, "partition lookup timed out");
            Err(LookupFailure::Timeout)
        }
    }
}

/// Sums counts per week and orders ascending by week key.
/// `YYYY-WW` keys sort chronologically as strings.
pub fn merge_weekly(en: Vec<WeeklyCount>, sv: Vec<WeeklyCount>) -> Vec<WeeklyCount> {
    let mut weeks: BTreeMap<String, u64> = BTreeMap::new();
    for WeeklyCount { week, count } in en.into_iter().chain(sv) {
        *weeks.entry(week).or_default() += count;
    }
    weeks
        .into_iter()
        .map(|(week, count)| WeeklyCount { week, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MockStore;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn weeks(pairs: &[(&str, u64)]) -> Vec<WeeklyCount> {
        pairs.iter().map(|(w, c)| WeeklyCount::new(*w, *c)).collect()
    }

    #[test]
    fn merge_sums_shared_weeks_and_sorts() {
        let merged = merge_weekly(
            weeks(&[("2021-05", 3)]),
            weeks(&[("2021-06", 1), ("2021-05", 2)]),
        );
        assert_eq!(merged, weeks(&[("2021-05", 5), ("2021-06", 1)]));
    }

    #[test]
    fn merge_keeps_single_side_weeks_unchanged() {
        let merged = merge_weekly(
            weeks(&[("2020-52", 7), ("2021-01", 1)]),
            weeks(&[("2021-01", 4), ("2021-02", 9)]),
        );
        assert_eq!(
            merged,
            weeks(&[("2020-52", 7), ("2021-01", 5), ("2021-02", 9)])
        );
    }

    #[test]
    fn merge_does_not_fill_missing_weeks() {
        let merged = merge_weekly(weeks(&[("2021-01", 1)]), weeks(&[("2021-10", 1)]));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_weekly(vec![], vec![]).is_empty());
    }

    #[tokio::test]
    async fn dentist_scenario_merges_both_partitions() {
        let store = MockStore::default()
            .counts(Language::English, "dentist", &[("2021-05", 3)])
            .counts(Language::Swedish, "tandläkare", &[("2021-05", 2), ("2021-06", 1)]);

        let series = search(&store, TIMEOUT, "dentist", "tandläkare").await.unwrap();
        assert_eq!(series, weeks(&[("2021-05", 5), ("2021-06", 1)]));
    }

    #[tokio::test]
    async fn identical_terms_still_query_both_partitions() {
        let store = MockStore::default()
            .counts(Language::English, "barista", &[("2022-10", 2)])
            .counts(Language::Swedish, "barista", &[("2022-10", 1)]);

        let series = search(&store, TIMEOUT, "barista", "barista").await.unwrap();
        assert_eq!(series, weeks(&[("2022-10", 3)]));
        let mut lookups = store.lookups();
        lookups.sort_by_key(|(l, _)| l.code());
        assert_eq!(
            lookups,
            vec![
                (Language::English, "barista".to_string()),
                (Language::Swedish, "barista".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn one_failed_partition_fails_the_search() {
        let mut store = MockStore::default().counts(Language::English, "dentist", &[("2021-05", 3)]);
        store.failing.insert(Language::Swedish);

        let err = search(&store, TIMEOUT, "dentist", "tandläkare").await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::InternalAggregationFailure {
                failed: Language::Swedish,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn both_partitions_failing_is_data_unavailable() {
        let mut store = MockStore::default();
        store.failing.insert(Language::English);
        store.failing.insert(Language::Swedish);

        let err = search(&store, TIMEOUT, "dentist", "tandläkare").await.unwrap_err();
        assert!(matches!(err, QueryError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn stalled_partition_times_out() {
        let mut store = MockStore::default();
        store.stalled.insert(Language::English);

        let err = search(&store, Duration::from_millis(50), "dentist", "tandläkare")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::CollaboratorTimeout {
                collaborator: STORE,
                ..
            }
        ));
    }
}
