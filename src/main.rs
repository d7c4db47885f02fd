//! tsinit-mcp server binary
//!
//! MCP server that scaffolds minimal TypeScript projects. Speaks JSON-RPC
//! 2.0 over stdio (NDJSON); all diagnostics go to stderr because stdout is
//! the protocol channel.

use serde_json::Value;
use tracing::{debug, error, info, warn};
use tsinit_mcp::protocol::{
    InitializeParams, JsonRpcError, JsonRpcErrorResponse, JsonRpcRequest, JsonRpcResponse,
    ToolCallParams,
};
use tsinit_mcp::{McpError, McpResult, McpServer, StdioTransport};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr) // Log to stderr, stdout is for JSON-RPC
        .init();

    info!("🚀 Starting tsinit-mcp server");
    info!("📡 Protocol: MCP 2025-06-18 over JSON-RPC 2.0");
    info!("🔌 Transport: stdio (NDJSON)");

    let server = McpServer::new();
    let mut transport = StdioTransport::new();

    info!("✅ Server ready, waiting for initialize request...");

    loop {
        let line = match transport.read_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("📪 EOF received, shutting down gracefully");
                break;
            }
            Err(e) => {
                error!("❌ Error reading from stdin: {}", e);
                break;
            }
        };

        if let Err(e) = process_request(&server, &mut transport, line).await {
            error!("❌ Error writing response: {}", e);
            break;
        }
    }

    info!("👋 tsinit-mcp server stopped");
}

/// Process a single JSON-RPC line and write the response, if any
async fn process_request(
    server: &McpServer,
    transport: &mut StdioTransport,
    line: String,
) -> McpResult<()> {
    debug!("📨 Received: {}", line);

    let request: JsonRpcRequest = match serde_json::from_str(&line) {
        Ok(request) => request,
        Err(e) => {
            error!("❌ Failed to parse JSON-RPC request: {}", e);
            let response = JsonRpcErrorResponse::new(
                Value::Null,
                JsonRpcError::new(-32700, "Parse error".to_string(), None),
            );
            return transport.send(&response).await;
        }
    };

    // Client-side notifications expect no response
    if request.is_notification() {
        debug!("🔔 Ignoring notification: {}", request.method);
        return Ok(());
    }

    let request_id = request.id.clone().unwrap_or(Value::Null);
    debug!("🎯 Method: {}, ID: {:?}", request.method, request_id);

    match dispatch(server, &request).await {
        Ok(result) => {
            transport
                .send(&JsonRpcResponse::new(request_id, result))
                .await
        }
        Err(e) => {
            warn!("⚠️  {} failed: {}", request.method, e);
            let response = JsonRpcErrorResponse::new(
                request_id,
                JsonRpcError::new(e.error_code(), e.message(), None),
            );
            transport.send(&response).await
        }
    }
}

/// Dispatch a request to the matching server handler
async fn dispatch(server: &McpServer, request: &JsonRpcRequest) -> McpResult<Value> {
    let params = request.params.clone().unwrap_or(Value::Null);

    match request.method.as_str() {
        "initialize" => {
            info!("🔌 Handling initialize request");
            let params: InitializeParams = serde_json::from_value(params)
                .map_err(|e| McpError::InvalidParams(format!("Invalid params: {e}")))?;
            let result = server.handle_initialize(params).await?;
            info!("✅ Server initialized successfully");
            Ok(serde_json::to_value(result)?)
        }
        "tools/list" => {
            debug!("🔧 Handling tools/list request");
            let result = server.handle_tools_list().await?;
            Ok(serde_json::to_value(result)?)
        }
        "tools/call" => {
            debug!("🛠️  Handling tools/call request");
            let params: ToolCallParams = serde_json::from_value(params)
                .map_err(|e| McpError::InvalidParams(format!("Invalid params: {e}")))?;
            let result = server.handle_tools_call(params).await?;
            Ok(serde_json::to_value(result)?)
        }
        "ping" => {
            debug!("🏓 Handling ping request");
            Ok(serde_json::json!({}))
        }
        method => Err(McpError::MethodNotFound(method.to_string())),
    }
}
