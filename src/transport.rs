//! stdio transport for JSON-RPC 2.0 over NDJSON
//!
//! Reads newline-delimited JSON-RPC messages from stdin and writes responses
//! to stdout. Each message is one line; blank lines are skipped.

use crate::error::McpResult;
use serde::Serialize;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Stdio transport for the MCP protocol
pub struct StdioTransport {
    reader: BufReader<io::Stdin>,
    writer: io::Stdout,
}

impl StdioTransport {
    /// Create a new stdio transport
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(io::stdin()),
            writer: io::stdout(),
        }
    }

    /// Read the next non-empty line from stdin, or `None` on EOF
    pub async fn read_line(&mut self) -> McpResult<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    /// Serialize a message and write it to stdout as a single line
    pub async fn send<T: Serialize>(&mut self, message: &T) -> McpResult<()> {
        let line = serde_json::to_string(message)?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}
