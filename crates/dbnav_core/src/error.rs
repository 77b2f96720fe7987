use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("Unknown connection: {0}")]
    UnknownConnection(String),

    #[error("Unknown schema {schema} on connection {connection}")]
    UnknownSchema { connection: String, schema: String },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
