//! Protocol types for JSON-RPC 2.0 and MCP

pub mod jsonrpc;
pub mod mcp;

pub use jsonrpc::{JsonRpcError, JsonRpcErrorResponse, JsonRpcRequest, JsonRpcResponse};
pub use mcp::{
    ClientCapabilities, ClientInfo, InitializeParams, InitializeResult, ServerCapabilities,
    ServerInfo, Tool, ToolCallParams, ToolCallResult, ToolContent, ToolsCapability,
    ToolsListResult, MCP_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
};
