//! MCP tool surface over the index.
//!
//! Exposes tool discovery and invocation as JSON endpoints so MCP
//! clients can run semantic searches against the index without going
//! through the CLI.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::embeddings::EmbeddingProvider;
use crate::storage::{search_by_embedding, Database};

/// Shared state for tool handlers.
pub struct McpState {
    /// Open index database.
    pub db: Database,
    /// Provider used to embed query text.
    pub provider: Box<dyn EmbeddingProvider>,
}

impl McpState {
    /// Bundle an open database with an embedding provider.
    #[must_use]
    pub fn new(db: Database, provider: Box<dyn EmbeddingProvider>) -> Self {
        Self { db, provider }
    }
}

/// Tool information with schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
}

/// Tool definitions for codesync.
#[must_use]
pub fn get_tools() -> Vec<ToolInfo> {
    vec![ToolInfo {
        name: "semantic_search".to_string(),
        description: Some(
            "Perform semantic search over the indexed codebase and return matching file paths \
             with similarity distances"
                .to_string(),
        ),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query text"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results (default: 10)",
                    "default": 10
                }
            },
            "required": ["query"]
        }),
    }]
}

/// Create the MCP router.
pub fn create_mcp_router(state: Arc<McpState>) -> Router {
    Router::new()
        .route("/mcp/tools", get(list_tools))
        .route("/mcp/invoke", post(invoke_tool))
        .with_state(state)
}

/// List available tools.
async fn list_tools() -> Json<Vec<ToolInfo>> {
    Json(get_tools())
}

/// Tool invocation request.
#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Tool invocation response.
#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub content: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Invoke a tool.
async fn invoke_tool(
    State(state): State<Arc<McpState>>,
    Json(request): Json<ToolRequest>,
) -> Json<ToolResponse> {
    tracing::debug!(tool = %request.name, "Invoking tool");

    let result = match request.name.as_str() {
        "semantic_search" => handle_semantic_search(&state, &request.arguments).await,
        _ => Err(format!("Unknown tool: {}", request.name)),
    };

    match result {
        Ok(content) => Json(ToolResponse {
            content,
            error: None,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Tool invocation failed");
            Json(ToolResponse {
                content: serde_json::Value::Null,
                error: Some(e),
            })
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
async fn handle_semantic_search(
    state: &McpState,
    args: &serde_json::Value,
) -> std::result::Result<serde_json::Value, String> {
    let query = args["query"].as_str().filter(|q| !q.is_empty());
    let Some(query) = query else {
        return Err("query is required".to_string());
    };
    let limit = args["limit"].as_u64().unwrap_or(10) as usize;

    let embedding = state
        .provider
        .encode(query)
        .await
        .map_err(|e| format!("Failed to embed query: {e}"))?;

    let hits = state
        .db
        .with_conn(|conn| search_by_embedding(conn, &embedding, limit))
        .map_err(|e| format!("Search failed: {e}"))?;

    let results: Vec<serde_json::Value> = hits
        .iter()
        .map(|hit| {
            serde_json::json!({
                "file_path": hit.path,
                "distance": hit.distance,
            })
        })
        .collect();

    Ok(serde_json::json!({
        "results": results,
        "query": query,
        "count": results.len(),
    }))
}
