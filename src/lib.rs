//! tsinit-mcp
//!
//! Model Context Protocol (MCP) server that scaffolds minimal TypeScript
//! projects. Exposes a single tool, `init-typescript`, which creates a
//! project directory, runs `npm init`, installs the TypeScript compiler as
//! a dev dependency, generates a `tsconfig.json`, writes a placeholder
//! entry point, and patches the manifest with build/start scripts.
//!
//! # Architecture
//!
//! ```text
//! LLM Host (VS Code/Claude)
//!   ↓ stdio (JSON-RPC 2.0, NDJSON)
//! tsinit-mcp server
//!   ↓ tokio::process + tokio::fs
//! npm / npx / filesystem
//! ```
//!
//! # MCP Protocol
//!
//! - **Transport**: stdio with NDJSON
//! - **Protocol**: JSON-RPC 2.0
//! - **Version**: 2025-06-18
//! - **Capabilities**: Tools (1)

pub mod error;
pub mod exec;
pub mod protocol;
pub mod scaffold;
pub mod server;
pub mod transport;

pub use error::{McpError, McpResult};
pub use exec::{CommandInvocation, CommandOutput, CommandRunner, SystemRunner};
pub use server::McpServer;
pub use transport::StdioTransport;
