//! Newsflow editor core: the block model, editing with undo/redo, AI-assisted
//! layout and generation, debounced confidentiality scanning, approval and
//! newsletter persistence.

pub mod approval;
pub mod assistant;
pub mod config;
pub mod editing;
pub mod errors;
pub mod fixtures;
pub mod generation;
pub mod layout;
pub mod llm_client;
pub mod models;
pub mod scanner;
pub mod session;
pub mod sources;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use errors::AppError;
pub use session::EditingSession;
pub use state::EditorState;
