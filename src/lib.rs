//! toolbox-mcp: a minimal Model Context Protocol server with demo tools
//!
//! This library implements a small stdio MCP server exposing three tools
//! (`get_current_time`, `calculate`, `echo`) over newline-delimited
//! JSON-RPC 2.0, plus a diagnostic module that locates and validates the
//! Claude Desktop configuration file.
//!
//! # Modules
//!
//! - [`calc`] — arithmetic expression parser and evaluator
//! - [`config`] — server configuration loading and validation
//! - [`doctor`] — Claude Desktop config discovery and repair
//! - [`error`] — error types
//! - [`mcp`] — MCP protocol implementation (transport, dispatch)
//! - [`tools`] — tool registry and built-in tool handlers

pub mod calc;
pub mod config;
pub mod doctor;
pub mod error;
pub mod mcp;
pub mod tools;
