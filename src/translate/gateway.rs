use serde::Serialize;
use tracing::{debug, error, warn};

use super::client::{TranslateError, Translator};
use super::tables::{manual_fix, manual_translation};
use crate::search::Language;

/// Where a translated term came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationSource {
    /// Curated table hit; the translator was not consulted.
    Override,
    Translated,
    /// The translator failed and the input is returned unchanged.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub source: TranslationSource,
}

impl Translation {
    fn new(text: impl Into<String>, source: TranslationSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.source == TranslationSource::Degraded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("translation pair {from}→{to} is unavailable")]
pub struct TranslationUnavailable {
    pub from: Language,
    pub to: Language,
}

/// The only component that talks to the translator.
///
/// Translation failures degrade to the input text; a missing English→Swedish
/// pair is the one condition reported to the caller.
#[derive(Debug)]
pub struct TranslationGateway<T> {
    translator: T,
}

impl<T: Translator> TranslationGateway<T> {
    pub fn new(translator: T) -> Self {
        Self { translator }
    }

    #[cfg(test)]
    pub(crate) fn translator(&self) -> &T {
        &self.translator
    }

    /// Swedish search term for a profession as typed by the user:
    /// `MANUAL_FIX` verbatim, then title-cased, then [`Self::to_swedish`].
    pub async fn swedish_profession(
        &self,
        query: &str,
    ) -> Result<Translation, TranslationUnavailable> {
        if let Some(sv) = manual_fix(query) {
            debug!(query, swedish = sv, "MANUAL_FIX exact match");
            return Ok(Translation::new(sv, TranslationSource::Override));
        }
        let titled = title_case(query);
        if let Some(sv) = manual_fix(&titled) {
            debug!(query, swedish = sv, "MANUAL_FIX title-case match");
            return Ok(Translation::new(sv, TranslationSource::Override));
        }
        let swedish = self.to_swedish(query).await?;
        debug!(query, swedish = %swedish.text, source = ?swedish.source, "swedish term generated");
        Ok(swedish)
    }

    pub async fn to_swedish(&self, text: &str) -> Result<Translation, TranslationUnavailable> {
        let lower = text.trim().to_lowercase();
        if let Some(sv) = manual_translation(&lower) {
            return Ok(Translation::new(sv, TranslationSource::Override));
        }

        match self
            .translator
            .translate(text, Language::English, Language::Swedish)
            .await
        {
            Ok(translated) => Ok(Translation::new(
                clean_translation(&translated),
                TranslationSource::Translated,
            )),
            Err(TranslateError::LanguagePairUnavailable { from, to }) => {
                error!(%from, %to, "translator has no en→sv pair installed");
                Err(TranslationUnavailable { from, to })
            }
            Err(e) => {
                error!(error = %e, text, "translation failed (en→sv), using original text");
                Ok(Translation::new(text, TranslationSource::Degraded))
            }
        }
    }

    /// Never fails; any translator problem returns `text` unchanged.
    pub async fn to_english(&self, text: &str) -> Translation {
        match self
            .translator
            .translate(text, Language::Swedish, Language::English)
            .await
        {
            Ok(translated) => Translation::new(translated, TranslationSource::Translated),
            Err(TranslateError::LanguagePairUnavailable { .. }) => {
                warn!(text, "no sv→en translation available, returning original");
                Translation::new(text, TranslationSource::Degraded)
            }
            Err(e) => {
                error!(error = %e, text, "translation failed (sv→en), using original text");
                Translation::new(text, TranslationSource::Degraded)
            }
        }
    }
}

/// Collapses consecutive repeated words, e.g. "rörmokare rörmokare" → "rörmokare".
pub(crate) fn clean_translation(text: &str) -> String {
    let mut words: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        match words.last() {
            Some(last) if last.to_lowercase() == word.to_lowercase() => {}
            _ => words.push(word),
        }
    }
    words.join(" ")
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
