// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "editing/mod.rs"]
pub mod editing;

#[path = "auth/mod.rs"]
pub mod auth;

#[path = "documents/mod.rs"]
pub mod documents;

#[path = "sheets/mod.rs"]
pub mod sheets;

#[path = "scripts/mod.rs"]
pub mod scripts;
