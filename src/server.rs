//! HTTP server exposing the tools over REST and MCP.
//!
//! Routes:
//! - `GET /health` — liveness probe
//! - `GET /tools/list` — tool names, descriptions, and parameter schemas
//! - `POST /tools/{name}` — execute a tool with a JSON body of arguments
//! - `/mcp` — MCP Streamable HTTP endpoint (same tool set)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::mcp::McpBridge;
use crate::registry::DocsRegistry;
use crate::tools::{ToolContext, ToolRegistry};

#[derive(Clone)]
struct AppState {
    tools: Arc<ToolRegistry>,
    ctx: ToolContext,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: message.into(),
        }
    }

    fn tool_error(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "tool_error",
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({ "error": { "code": self.code, "message": self.message } });
        (self.status, Json(body)).into_response()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    let tools: Vec<Value> = state
        .tools
        .tools()
        .iter()
        .map(|t| {
            json!({
                "name": t.name(),
                "description": t.description(),
                "parameters": t.parameters_schema(),
            })
        })
        .collect();
    Json(json!({ "tools": tools }))
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, AppError> {
    let tool = state
        .tools
        .find(&name)
        .ok_or_else(|| AppError::not_found(format!("no tool named '{}'", name)))?;

    let params = match body {
        Some(Json(value)) if value.is_object() => value,
        Some(_) => return Err(AppError::bad_request("request body must be a JSON object")),
        None => Value::Object(serde_json::Map::new()),
    };

    let result = tool
        .execute(params, &state.ctx)
        .await
        .map_err(|e| classify_tool_error(&name, e))?;
    Ok(Json(result))
}

/// Map a tool failure onto an HTTP status by message shape.
fn classify_tool_error(tool_name: &str, err: anyhow::Error) -> AppError {
    let msg = err.to_string();

    if msg.contains("not found") {
        AppError::not_found(format!("{}: {}", tool_name, msg))
    } else if msg.contains("must not be empty") || msg.contains("invalid") {
        // Validation errors → 400
        AppError::bad_request(format!("{}: {}", tool_name, msg))
    } else {
        AppError::tool_error(format!("{}: {}", tool_name, msg))
    }
}

/// Build the application router with REST routes and the nested MCP
/// service.
pub fn build_router(config: Arc<Config>, docs: Arc<DocsRegistry>) -> Router {
    let tools = Arc::new(ToolRegistry::with_builtins());
    let ctx = ToolContext::new(config, docs);

    let bridge = McpBridge::new(tools.clone(), ctx.clone());
    let mcp_service = StreamableHttpService::new(
        move || Ok(bridge.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let state = AppState { tools, ctx };

    Router::new()
        .route("/health", get(health))
        .route("/tools/list", get(list_tools))
        .route("/tools/{name}", post(call_tool))
        .nest_service("/mcp", mcp_service)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind `config.server.bind` and serve until interrupted.
pub async fn serve(config: Arc<Config>, docs: Arc<DocsRegistry>) -> anyhow::Result<()> {
    let bind = config.server.bind.clone();
    let router = build_router(config, docs);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    println!("MCP server listening on http://{}", bind);
    println!("  REST:  http://{}/tools/list", bind);
    println!("  MCP:   http://{}/mcp", bind);

    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ArchiveFetcher;

    fn test_state() -> (tempfile::TempDir, Arc<Config>, Arc<DocsRegistry>) {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(Config::default());
        let fetcher = ArchiveFetcher::new(dir.path(), "http://127.0.0.1:1");
        let docs = Arc::new(DocsRegistry::new(fetcher));
        (dir, config, docs)
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (_dir, config, docs) = test_state();
        // Construction exercises route registration and the MCP nest.
        let _router = build_router(config, docs);
    }

    #[tokio::test]
    async fn unknown_tool_maps_to_not_found() {
        let (_dir, config, docs) = test_state();
        let tools = Arc::new(ToolRegistry::with_builtins());
        let ctx = ToolContext::new(config, docs);
        let state = AppState { tools, ctx };

        let result = call_tool(
            State(state),
            Path("does_not_exist".to_string()),
            Some(Json(json!({}))),
        )
        .await;
        let err = result.err().unwrap();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn validation_failure_maps_to_bad_request() {
        let (_dir, config, docs) = test_state();
        let tools = Arc::new(ToolRegistry::with_builtins());
        let ctx = ToolContext::new(config, docs);
        let state = AppState { tools, ctx };

        // Empty query fails validation before any network or index work.
        let result = call_tool(
            State(state),
            Path("search_docs".to_string()),
            Some(Json(json!({ "repository": "owner/repo", "query": "" }))),
        )
        .await;
        let err = result.err().unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "bad_request");
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let (_dir, config, docs) = test_state();
        let tools = Arc::new(ToolRegistry::with_builtins());
        let ctx = ToolContext::new(config, docs);
        let state = AppState { tools, ctx };

        let result = call_tool(
            State(state),
            Path("search_docs".to_string()),
            Some(Json(json!([1, 2, 3]))),
        )
        .await;
        let err = result.err().unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
