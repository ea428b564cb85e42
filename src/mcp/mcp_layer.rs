// MCP layer - JSON-RPC over stdio, the tool catalog and tool dispatch.

pub mod arguments;
pub mod protocol;
pub mod stdio_server;
pub mod tool_catalog;
pub mod tool_handler;

pub use stdio_server::StdioServer;
pub use tool_handler::ToolHandler;
