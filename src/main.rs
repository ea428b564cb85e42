// This is the entry point of the docmcp MCP server.
//
// **Architecture Overview:**
// - `core/` = Business logic (the text-substitution engine and services)
// - `infra/` = Implementations of core traits (Google REST clients, token stores)
// - `mcp/` = MCP adapter (JSON-RPC over stdio, tool catalog and dispatch)
// - `config/` = Start-up configuration from the environment
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Serve MCP requests on stdin/stdout

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "config/app_config.rs"]
mod config;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "mcp/mcp_layer.rs"]
mod mcp;

use std::sync::Arc;

use anyhow::Context;

use crate::config::{AppConfig, AuthMode, ServiceAccountKey};
use crate::core::auth::AuthProvider;
use crate::core::documents::DocumentService;
use crate::core::scripts::ScriptService;
use crate::core::sheets::SheetService;
use crate::infra::google::{
    GoogleDocsClient, GoogleScriptsClient, GoogleSheetsClient, ServiceAccountAuth,
    StoredTokenAuth,
};
use crate::infra::tokens::JsonTokenStore;
use crate::mcp::{StdioServer, ToolHandler};

async fn build_auth(config: &AppConfig) -> anyhow::Result<Arc<dyn AuthProvider>> {
    match &config.auth {
        AuthMode::ServiceAccount(ServiceAccountKey::KeyFile(path)) => {
            let auth = ServiceAccountAuth::from_file(&path.to_string_lossy()).await?;
            tracing::info!(account = auth.client_email(), "Using service account credentials");
            Ok(Arc::new(auth))
        }
        AuthMode::ServiceAccount(ServiceAccountKey::Json(json)) => {
            let auth = ServiceAccountAuth::from_json(json)?;
            tracing::info!(account = auth.client_email(), "Using service account credentials");
            Ok(Arc::new(auth))
        }
        AuthMode::StoredToken {
            client_id,
            client_secret,
            token_file,
            user_id,
        } => {
            let store = JsonTokenStore::open(token_file.clone()).with_context(|| {
                format!("Failed to open token file {}", token_file.display())
            })?;
            tracing::info!(
                user_id = %user_id,
                token_file = %store.path().display(),
                "Using stored OAuth token"
            );
            Ok(Arc::new(StoredTokenAuth::new(
                store,
                user_id.clone(),
                client_id.clone(),
                client_secret.clone(),
            )))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs must go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let auth = build_auth(&config).await?;

    let handler = ToolHandler::new(
        auth,
        DocumentService::new(GoogleDocsClient::new()),
        SheetService::new(GoogleSheetsClient::new()),
        ScriptService::new(GoogleScriptsClient::new()),
    );
    let server = StdioServer::new(handler);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    server.serve(stdin, tokio::io::stdout()).await?;

    Ok(())
}
