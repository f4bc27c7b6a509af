mod errors;
mod params;

pub use params::{AutocompleteParams, CompareParams, SearchParams};

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use tracing::info;

use errors::{query_to_mcp_error, serialize_error};

use crate::search::{DEFAULT_SUGGESTION_LIMIT, QueryEngine};
use crate::store::PgStore;
use crate::translate::LibreTranslateClient;

const MAX_AUTOCOMPLETE: usize = 50;

type Engine = QueryEngine<PgStore, LibreTranslateClient>;

/// MCP server handler exposing profession search, comparison, and autocomplete.
///
/// Configuration comes from the command line or environment (see `config`).
#[derive(Clone)]
pub struct JobTrends {
    engine: Arc<Engine>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl JobTrends {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "search",
        description = "Weekly job-posting counts for one profession, merged across English and Swedish postings. If the query is too general, returns status 'needs_refinement' with suggested specific professions instead; call again with refined=true to search a chosen label or the original query as is."
    )]
    async fn search(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let refined = params.refined.unwrap_or(false);
        info!(query = %params.query, refined, "tool:search");

        let outcome = self
            .engine
            .resolve_query(&params.query, refined)
            .await
            .map_err(query_to_mcp_error)?;
        json_result(&outcome)
    }

    #[tool(
        name = "compare",
        description = "Weekly job-posting counts for up to two professions. If any query is too general, nothing is searched and suggestions are returned per query index (status 'needs_refinement')."
    )]
    async fn compare(
        &self,
        Parameters(params): Parameters<CompareParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(queries = ?params.queries, refined = ?params.refined, "tool:compare");

        let refined = params.refined.unwrap_or_default();
        let outcome = self
            .engine
            .resolve_many(&params.queries, &refined)
            .await
            .map_err(query_to_mcp_error)?;
        json_result(&outcome)
    }

    #[tool(
        name = "autocomplete",
        description = "Occupation labels from the Swedish catalog containing the given fragment, each with an English rendering."
    )]
    async fn autocomplete(
        &self,
        Parameters(params): Parameters<AutocompleteParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = clamp_limit(params.limit);
        info!(fragment = %params.fragment, limit, "tool:autocomplete");

        let suggestions = self.engine.suggest(&params.fragment, Some(limit)).await;
        json_result(&suggestions)
    }

    #[tool(
        name = "health",
        description = "Posting store connectivity and the number of labels in the loaded catalog."
    )]
    async fn health(&self) -> Result<CallToolResult, McpError> {
        let report = self.engine.health().await;
        json_result(&report)
    }

    #[tool(
        name = "reload_catalog",
        description = "Reload the occupation label catalog from the posting store. The previous catalog stays active if the reload fails."
    )]
    async fn reload_catalog(&self) -> Result<CallToolResult, McpError> {
        info!("tool:reload_catalog");
        let labels = self
            .engine
            .reload_catalog()
            .await
            .map_err(query_to_mcp_error)?;
        json_result(&serde_json::json!({ "labels": labels }))
    }
}

#[tool_handler]
impl ServerHandler for JobTrends {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "jobtrends".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "jobtrends reports weekly job-posting volumes by profession from English and Swedish postings (search, compare), with occupation label autocomplete."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
        .clamp(1, MAX_AUTOCOMPLETE)
}

fn json_result(value: &impl Serialize) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(serialize_error)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(7)), 7);
        assert_eq!(clamp_limit(Some(500)), MAX_AUTOCOMPLETE);
    }

    #[test]
    fn json_result_wraps_pretty_json() {
        let result = json_result(&serde_json::json!({"labels": 3})).unwrap();
        let text = &result.content[0].as_text().unwrap().text;
        assert!(text.contains("\"labels\": 3"), "got: {text}");
    }

    #[test]
    fn params_deserialize_with_optional_fields() {
        let search: SearchParams = serde_json::from_str(r#"{"query": "dentist"}"#).unwrap();
        assert_eq!(search.query, "dentist");
        assert!(search.refined.is_none());

        let compare: CompareParams =
            serde_json::from_str(r#"{"queries": ["plumber", "architect"], "refined": [true, false]}"#)
                .unwrap();
        assert_eq!(compare.queries.len(), 2);
        assert_eq!(compare.refined, Some(vec![true, false]));
    }
}
