// Token store implementations.

pub mod in_memory;
pub mod json_token_store;

pub use in_memory::InMemoryTokenStore;
pub use json_token_store::JsonTokenStore;
