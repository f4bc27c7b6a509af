//! Query resolution: generality classification, refinement suggestions, and
//! the bilingual weekly search.

pub(crate) mod bilingual;
mod classify;
pub(crate) mod engine;
mod error;
mod lang;
mod suggest;
mod types;

pub use classify::DEFAULT_MAX_LABELS;
pub use engine::{EngineConfig, QueryEngine};
pub use error::QueryError;
pub use lang::Language;
pub use suggest::DEFAULT_SUGGESTION_LIMIT;
