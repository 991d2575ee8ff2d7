use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Unknown creature type: {0}")]
    UnknownArchetype(String),

    #[error("Invalid archetype '{id}': {reason}")]
    InvalidArchetype { id: String, reason: String },

    #[error("Duplicate archetype id: {0}")]
    DuplicateArchetype(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Creature not found: {0}")]
    CreatureNotFound(crate::core::types::CreatureId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AiError>;
