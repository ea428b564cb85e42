pub mod script_service;

pub use script_service::{ScriptFile, ScriptFileType, ScriptProject, ScriptService, ScriptsApi};
