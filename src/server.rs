//! MCP server implementation
//!
//! Handles the MCP protocol lifecycle and dispatches tool calls to the
//! scaffolding pipeline.

use crate::error::{McpError, McpResult};
use crate::exec::{CommandRunner, SystemRunner};
use crate::protocol::{
    InitializeParams, InitializeResult, ServerCapabilities, ServerInfo, Tool, ToolCallParams,
    ToolCallResult, ToolsCapability, ToolsListResult, MCP_PROTOCOL_VERSION,
    SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::scaffold::{self, ScaffoldRequest};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Name of the single registered tool
pub const INIT_TYPESCRIPT_TOOL: &str = "init-typescript";

/// MCP server state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Server created but not initialized
    Uninitialized,
    /// Server initialized and ready to handle requests
    Ready,
}

/// MCP server
pub struct McpServer {
    state: Arc<Mutex<ServerState>>,
    runner: Arc<dyn CommandRunner>,
}

impl McpServer {
    /// Create a server backed by real subprocesses
    pub fn new() -> Self {
        Self::with_runner(Arc::new(SystemRunner))
    }

    /// Create a server with an injected command runner (used by tests)
    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState::Uninitialized)),
            runner,
        }
    }

    /// Get current server state
    pub async fn state(&self) -> ServerState {
        *self.state.lock().await
    }

    /// Check if server is ready
    pub async fn is_ready(&self) -> bool {
        self.state().await == ServerState::Ready
    }

    async fn set_state(&self, new_state: ServerState) {
        *self.state.lock().await = new_state;
    }

    /// Handle MCP initialize request
    ///
    /// First method the client must call; negotiates protocol version and
    /// advertises the tool capability.
    pub async fn handle_initialize(&self, params: InitializeParams) -> McpResult<InitializeResult> {
        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&params.protocol_version.as_str()) {
            return Err(McpError::UnsupportedProtocol(params.protocol_version));
        }

        debug!(
            "🤝 Client {} v{} connected",
            params.client_info.name, params.client_info.version
        );

        self.set_state(ServerState::Ready).await;

        Ok(InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false), // Tool list is static
                }),
            },
            server_info: ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    /// Handle tools/list request
    pub async fn handle_tools_list(&self) -> McpResult<ToolsListResult> {
        if !self.is_ready().await {
            return Err(McpError::NotInitialized);
        }

        debug!("📋 Listing available tools");

        let tools = vec![Tool {
            name: INIT_TYPESCRIPT_TOOL.to_string(),
            description: "Initializes a new TypeScript project with basic structure \
                          (package.json, tsconfig.json, src/index.ts) and dependencies."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "projectName": {
                        "type": "string",
                        "description": "The name for the new TypeScript project directory."
                    },
                    "destinationFolder": {
                        "type": "string",
                        "description": "The absolute or relative path to the folder where the project directory should be created."
                    }
                },
                "required": ["projectName", "destinationFolder"],
                "additionalProperties": false
            }),
        }];

        Ok(ToolsListResult { tools })
    }

    /// Handle tools/call request
    ///
    /// Scaffolding failures are reported in-band as a normal response with
    /// `isError: true`; only unknown tools and malformed arguments surface
    /// as JSON-RPC errors.
    pub async fn handle_tools_call(&self, params: ToolCallParams) -> McpResult<ToolCallResult> {
        if !self.is_ready().await {
            return Err(McpError::NotInitialized);
        }

        debug!("🛠️  Calling tool: {}", params.name);

        if params.name != INIT_TYPESCRIPT_TOOL {
            return Err(McpError::MethodNotFound(format!(
                "Unknown tool: {}",
                params.name
            )));
        }

        let request: ScaffoldRequest = match params.arguments {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| McpError::InvalidParams(e.to_string()))?,
            None => {
                return Err(McpError::InvalidParams(
                    "Missing projectName and destinationFolder".into(),
                ))
            }
        };
        request.validate()?;

        match scaffold::scaffold(&request, self.runner.as_ref()).await {
            Ok(report) => Ok(ToolCallResult::text(report.message())),
            Err(e) => {
                warn!("❌ Scaffolding failed: {}", e);
                Ok(ToolCallResult::failure(format!(
                    "Failed to initialize TypeScript project: {e}"
                )))
            }
        }
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}
