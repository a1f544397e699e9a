//! MCP JSON-RPC protocol bridge.
//!
//! Adapts the [`ToolRegistry`] into an MCP Streamable HTTP endpoint that
//! Cursor, Claude, and other MCP clients can connect to with the standard
//! JSON-RPC protocol. Every registered tool is exposed via
//! `list_tools` / `call_tool`.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler};

use crate::tools::{Tool as DocdexTool, ToolContext, ToolRegistry};

/// Bridges the tool registry to the MCP JSON-RPC protocol.
///
/// Each MCP session receives a clone of this struct (everything is
/// behind `Arc`), so all sessions share the same tool set and docs
/// registry.
#[derive(Clone)]
pub struct McpBridge {
    tools: Arc<ToolRegistry>,
    ctx: ToolContext,
}

impl McpBridge {
    pub fn new(tools: Arc<ToolRegistry>, ctx: ToolContext) -> Self {
        Self { tools, ctx }
    }

    /// Convert a docdex tool into an rmcp `Tool` descriptor.
    fn to_mcp_tool(tool: &dyn DocdexTool) -> Tool {
        let schema_value = tool.parameters_schema();
        let input_schema: Arc<serde_json::Map<String, serde_json::Value>> = match schema_value {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        };

        Tool {
            name: Cow::Owned(tool.name().to_string()),
            title: None,
            description: Some(Cow::Owned(tool.description().to_string())),
            input_schema,
            output_schema: None,
            annotations: Some(ToolAnnotations::new().read_only(true)),
            execution: None,
            icons: None,
            meta: None,
        }
    }
}

impl ServerHandler for McpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "docdex".to_string(),
                title: Some("Docdex".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Docdex — search the documentation of any GitHub repository. \
                 Use search_docs to find relevant markdown files in a repo, \
                 fetch_page to read a web page as markdown, and count_word \
                 to count occurrences of a word on a page."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = self
            .tools
            .tools()
            .iter()
            .map(|t| Self::to_mcp_tool(t.as_ref()))
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools.find(name).map(Self::to_mcp_tool)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.tools.find(&request.name).ok_or_else(|| {
            McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no tool registered with name: {}", request.name),
                None,
            )
        })?;

        let params = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        // Tool errors become error results for the client, never a crash
        // of the host process.
        match tool.execute(params, &self.ctx).await {
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result).unwrap_or_default();
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}
