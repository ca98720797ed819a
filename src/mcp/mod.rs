//! Model Context Protocol (MCP) server implementation.
//!
//! This module implements the MCP stdio server: JSON-RPC 2.0 messages
//! over newline-delimited stdin/stdout, dispatched to the tool registry.
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::StdioTransport;
