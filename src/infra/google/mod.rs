// Google REST clients and credential providers.
//
// The clients implement the core API traits (content sources and appliers);
// they never decide what to edit. Credentials come in per call.

mod http;

pub mod docs_client;
pub mod scripts_client;
pub mod service_account;
pub mod sheets_client;
pub mod stored_token_auth;

pub use docs_client::GoogleDocsClient;
pub use scripts_client::GoogleScriptsClient;
pub use service_account::ServiceAccountAuth;
pub use sheets_client::GoogleSheetsClient;
pub use stored_token_auth::StoredTokenAuth;
