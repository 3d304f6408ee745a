use thiserror::Error;

use super::config::ConfigError;
use super::session::SessionError;
use crate::core::io::error::StructureError;
use crate::core::selection::eval::SelectionError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Renderer session failed: {source}")]
    Session {
        #[from]
        source: SessionError,
    },

    #[error("Selection failed: {source}")]
    Selection {
        #[from]
        source: SelectionError,
    },

    #[error("Structure could not be read: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Selection '{name}' contains no atoms")]
    EmptySelection { name: String },

    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed { stage: &'static str, reason: String },
}
