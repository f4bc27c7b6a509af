use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Profession, usually in English (e.g. "dentist")
    pub query: String,
    /// Skip the too-general check and search the query as is (default: false)
    pub refined: Option<bool>,
}

#[derive(Deserialize, JsonSchema)]
pub struct CompareParams {
    /// One or two professions to compare
    pub queries: Vec<String>,
    /// Per-query refined flags; ignored unless one flag is given per query
    pub refined: Option<Vec<bool>>,
}

#[derive(Deserialize, JsonSchema)]
pub struct AutocompleteParams {
    /// Swedish fragment of an occupation label (e.g. "rörmok")
    pub fragment: String,
    /// Maximum number of suggestions (1-50, default: 10)
    pub limit: Option<usize>,
}
