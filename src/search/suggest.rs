use std::sync::Arc;

use futures::future::join_all;

use super::types::Suggestion;
use crate::catalog::{LabelCatalog, LabelMatcher};
use crate::translate::{TranslationGateway, Translator};

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Bounded, bilingual list of catalog labels matching a Swedish fragment.
///
/// Labels come back in catalog order, not ranked by relevance or popularity.
pub struct SuggestionGenerator {
    matcher: Arc<dyn LabelMatcher>,
}

impl SuggestionGenerator {
    pub fn new(matcher: Arc<dyn LabelMatcher>) -> Self {
        Self { matcher }
    }

    pub async fn suggest<T: Translator>(
        &self,
        fragment: &str,
        limit: usize,
        catalog: &LabelCatalog,
        gateway: &TranslationGateway<T>,
    ) -> Vec<Suggestion> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Vec::new();
        }

        let labels: Vec<&str> = catalog
            .scan(fragment, self.matcher.as_ref())
            .take(limit)
            .collect();

        let english = join_all(labels.iter().map(|label| gateway.to_english(label))).await;

        labels
            .into_iter()
            .zip(english)
            .map(|(label, en)| Suggestion::new(label, Some(en.text)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubstringMatcher;
    use crate::search::Language;
    use crate::translate::MockTranslator;

    fn catalog() -> LabelCatalog {
        LabelCatalog::from_labels([
            "Rörmokare",
            "Byggrörmokare",
            "Rörmokarlärling",
            "Servicerörmokare",
            "Kock",
        ])
    }

    fn gateway() -> TranslationGateway<MockTranslator> {
        TranslationGateway::new(MockTranslator::with(&[
            (Language::English, "Rörmokare", "Plumber"),
            (Language::English, "Byggrörmokare", "Construction plumber"),
            (Language::English, "Servicerörmokare", "servicerörmokare"),
        ]))
    }

    #[tokio::test]
    async fn matches_in_catalog_order_with_bilingual_display() {
        let generator = SuggestionGenerator::new(Arc::new(SubstringMatcher));
        let suggestions = generator
            .suggest("rörmokare", DEFAULT_SUGGESTION_LIMIT, &catalog(), &gateway())
            .await;

        let displays: Vec<_> = suggestions.iter().map(|s| s.display.as_str()).collect();
        assert_eq!(
            displays,
            vec![
                "Construction plumber (Byggrörmokare)",
                "Plumber (Rörmokare)",
                "Servicerörmokare",
            ]
        );
    }

    #[tokio::test]
    async fn never_exceeds_limit() {
        let generator = SuggestionGenerator::new(Arc::new(SubstringMatcher));
        let suggestions = generator.suggest("r", 2, &catalog(), &gateway()).await;
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.iter().all(|s| !s.swedish_label.is_empty()));
    }

    #[tokio::test]
    async fn empty_fragment_returns_nothing() {
        let generator = SuggestionGenerator::new(Arc::new(SubstringMatcher));
        let gw = gateway();
        assert!(generator.suggest("", 10, &catalog(), &gw).await.is_empty());
        assert!(generator.suggest("   ", 10, &catalog(), &gw).await.is_empty());
        assert!(gw_calls_empty(&gw));
    }

    #[tokio::test]
    async fn no_match_returns_nothing() {
        let generator = SuggestionGenerator::new(Arc::new(SubstringMatcher));
        let suggestions = generator.suggest("tandläkare", 10, &catalog(), &gateway()).await;
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn untranslatable_label_is_shown_alone() {
        let generator = SuggestionGenerator::new(Arc::new(SubstringMatcher));
        let gw = TranslationGateway::new(MockTranslator {
            failing: true,
            ..Default::default()
        });
        let suggestions = generator.suggest("kock", 10, &catalog(), &gw).await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].display, "Kock");
    }

    fn gw_calls_empty(gw: &TranslationGateway<MockTranslator>) -> bool {
        gw.translator().calls().is_empty()
    }
}
