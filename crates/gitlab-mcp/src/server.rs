//! MCP server implementation.
//!
//! The server handles the MCP protocol lifecycle:
//! 1. Initialize - exchange capabilities
//! 2. List and call the registered tools
//! 3. Shutdown on end of input
//!
//! Tools are registered through [`ToolSink`], normally by
//! [`ToolsetGroup::register_active`](crate::ToolsetGroup::register_active).

use std::collections::BTreeMap;

use gitlab_mcp_core::{Arguments, Result};
use serde_json::Value;

use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolCallResult, ToolDefinition,
    ToolsCapability, ToolsListResult, MCP_VERSION,
};
use crate::tool::{ServerTool, ToolSink};
use crate::transport::{IncomingMessage, StdioTransport};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "gitlab-mcp-server";

/// Prefix for tool errors caused by bad arguments.
const VALIDATION_ERROR_PREFIX: &str = "Validation Error: ";

/// MCP server exposing registered tools.
pub struct McpServer {
    tools: BTreeMap<String, ServerTool>,
    initialized: bool,
}

impl McpServer {
    /// Create a server with no tools.
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            initialized: false,
        }
    }

    /// Definitions of all registered tools, ordered by name.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition.clone()).collect()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Run the server over stdin/stdout until end of input.
    pub async fn run(&mut self) -> Result<()> {
        self.serve(StdioTransport::stdio()).await
    }

    /// Run the server over the given transport until end of input.
    pub async fn serve(&mut self, mut transport: StdioTransport) -> Result<()> {
        tracing::info!(tools = self.tools.len(), "Starting MCP server");

        loop {
            match transport.read_message() {
                Ok(Some(msg)) => {
                    if let Some(resp) = self.handle_message(msg).await {
                        if let Err(e) = transport.write_response(&resp) {
                            tracing::error!(error = %e, "Failed to write response");
                            break;
                        }
                    }
                }
                Ok(None) => {
                    tracing::info!("EOF received, shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Transport error");
                    let error_resp = JsonRpcResponse::error(
                        RequestId::Null,
                        JsonRpcError::parse_error(&e.to_string()),
                    );
                    if let Err(e) = transport.write_response(&error_resp) {
                        tracing::error!(error = %e, "Failed to write response");
                        break;
                    }
                }
            }
        }

        tracing::info!("MCP server stopped");
        Ok(())
    }

    /// Handle an incoming message.
    async fn handle_message(&mut self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(&notif.method);
                None // Notifications don't get responses
            }
        }
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&mut self, req: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %req.method, id = ?req.id, "Handling request");

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "tools/list" => self.handle_tools_list(req.id),
            "tools/call" => self.handle_tools_call(req.id, req.params).await,
            "ping" => JsonRpcResponse::success(req.id, serde_json::json!({})),
            method => {
                tracing::warn!(method, "Unknown method");
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    /// Handle notifications (no response).
    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                tracing::info!("Client initialized");
            }
            "notifications/cancelled" => {
                tracing::debug!("Request cancelled by client");
            }
            _ => {
                tracing::debug!(method, "Ignoring notification");
            }
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init_params) => {
                    tracing::info!(
                        client = %init_params.client_info.name,
                        version = %init_params.client_info.version,
                        protocol = %init_params.protocol_version,
                        "Client connected"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to parse initialize params");
                }
            }
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::from_serializable(id, &result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.tool_definitions(),
        };
        JsonRpcResponse::from_serializable(id, &result)
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(&e.to_string()),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        let args = match params.arguments {
            None | Some(Value::Null) => Arguments::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("arguments must be an object"),
                );
            }
        };

        let Some(tool) = self.tools.get(&params.name) else {
            tracing::warn!(tool = %params.name, "Unknown tool");
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params(&format!("Unknown tool: {}", params.name)),
            );
        };

        tracing::info!(tool = %params.name, "Calling tool");

        match tool.handler.call(args).await {
            Ok(result) => JsonRpcResponse::from_serializable(id, &result),
            Err(e) if e.is_validation() => {
                tracing::debug!(tool = %params.name, error = %e, "Invalid tool arguments");
                let result = ToolCallResult::error(format!("{}{}", VALIDATION_ERROR_PREFIX, e));
                JsonRpcResponse::from_serializable(id, &result)
            }
            Err(e) => {
                tracing::error!(tool = %params.name, error = %e, "Tool call failed");
                JsonRpcResponse::error(id, JsonRpcError::internal_error(&e.to_string()))
            }
        }
    }
}

impl ToolSink for McpServer {
    fn add_tool(&mut self, tool: ServerTool) {
        let name = tool.name().to_string();
        tracing::debug!(tool = %name, "Registering tool");
        if self.tools.insert(name, tool).is_some() {
            tracing::debug!("Replaced previously registered tool");
        }
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}
