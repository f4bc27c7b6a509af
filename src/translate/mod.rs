//! English/Swedish translation: the external translator and the gateway that
//! layers the curated override tables on top of it.

pub mod client;
mod gateway;
mod tables;
mod types;

pub use client::{LibreTranslateClient, Translator};
pub use gateway::{Translation, TranslationGateway, TranslationSource, TranslationUnavailable};
pub use tables::COMMON_PROFESSIONS;

#[cfg(test)]
pub(crate) use gateway::tests::MockTranslator;
