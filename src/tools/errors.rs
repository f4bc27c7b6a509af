use rmcp::ErrorData as McpError;

use crate::search::QueryError;

pub(super) fn retriable_error(e: &impl std::fmt::Display) -> McpError {
    McpError::internal_error(format!("{e} (retriable)"), None)
}

pub(super) fn query_to_mcp_error(e: QueryError) -> McpError {
    match &e {
        e if e.is_invalid_input() => McpError::invalid_params(e.to_string(), None),
        QueryError::CollaboratorTimeout { .. } => retriable_error(&e),
        QueryError::TranslationUnavailable(_) => McpError::internal_error(
            format!("{e}. Install the English-Swedish package on the translator"),
            None,
        ),
        _ => McpError::internal_error(e.to_string(), None),
    }
}

pub(super) fn serialize_error(e: serde_json::Error) -> McpError {
    McpError::internal_error(format!("failed to serialize result: {e}"), None)
}
