use serde::Serialize;

use crate::store::WeeklyCount;
use crate::translate::TranslationSource;

/// A catalog label offered for disambiguation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub swedish_label: String,
    pub english_label: Option<String>,
    pub display: String,
}

impl Suggestion {
    /// `display` is "English (Svenska)" when the labels differ ignoring case,
    /// otherwise the Swedish label alone.
    pub fn new(swedish_label: impl Into<String>, english_label: Option<String>) -> Self {
        let swedish_label = swedish_label.into();
        let english_label = english_label.filter(|en| !en.trim().is_empty());
        let display = match &english_label {
            Some(en) if en.to_lowercase() != swedish_label.to_lowercase() => {
                format!("{en} ({swedish_label})")
            }
            _ => swedish_label.clone(),
        };
        Self {
            swedish_label,
            english_label,
            display,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Refinement {
    pub suggestions: Vec<Suggestion>,
    pub original_query: String,
    pub allow_raw_search: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSeries {
    pub query: String,
    pub swedish_term: String,
    pub swedish_source: TranslationSource,
    /// The Swedish term is itself a catalog label.
    pub catalog_label: bool,
    /// Ascending by week; weeks without postings are absent.
    pub series: Vec<WeeklyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefinementOutcome {
    NeedsRefinement(Refinement),
    Resolved(ResolvedSeries),
}

/// Result of a compare request. Refinement is all-or-nothing: if any query
/// needs it, nothing is searched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    NeedsRefinement {
        refine_which: Vec<usize>,
        suggestions: Vec<Vec<Suggestion>>,
        original_queries: Vec<String>,
        allow_raw_search: Vec<bool>,
    },
    Resolved {
        results: Vec<ResolvedSeries>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComponentStatus {
    Ok,
    Error { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub store: ComponentStatus,
    pub catalog_labels: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_combines_differing_labels() {
        let s = Suggestion::new("Rörmokare", Some("Plumber".into()));
        assert_eq!(s.display, "Plumber (Rörmokare)");
        assert_eq!(s.english_label.as_deref(), Some("Plumber"));
    }

    #[test]
    fn display_is_label_when_equal_ignoring_case() {
        let s = Suggestion::new("Barista", Some("barista".into()));
        assert_eq!(s.display, "Barista");
    }

    #[test]
    fn display_is_label_without_english() {
        let s = Suggestion::new("Kock", None);
        assert_eq!(s.display, "Kock");
        let blank = Suggestion::new("Kock", Some("  ".into()));
        assert_eq!(blank.display, "Kock");
        assert_eq!(blank.english_label, None);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = RefinementOutcome::Resolved(ResolvedSeries {
            query: "dentist".into(),
            swedish_term: "tandläkare".into(),
            swedish_source: TranslationSource::Override,
            catalog_label: true,
            series: vec![WeeklyCount::new("2021-05", 5)],
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["swedish_source"], "override");
        assert_eq!(json["series"][0]["week"], "2021-05");
        assert_eq!(json["series"][0]["count"], 5);
    }

    #[test]
    fn refinement_serializes_flat() {
        let outcome = RefinementOutcome::NeedsRefinement(Refinement {
            suggestions: vec![],
            original_query: "manager".into(),
            allow_raw_search: true,
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "needs_refinement");
        assert_eq!(json["allow_raw_search"], true);
    }

    #[test]
    fn health_error_carries_detail() {
        let report = HealthReport {
            store: ComponentStatus::Error {
                detail: "connection refused".into(),
            },
            catalog_labels: 0,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["store"]["status"], "error");
        assert_eq!(json["store"]["detail"], "connection refused");
    }
}
