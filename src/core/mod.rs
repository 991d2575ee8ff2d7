pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::AiConfig;
pub use error::{AiError, Result};
pub use types::{CreatureId, GridCell, PackId};
