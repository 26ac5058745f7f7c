use crate::ir::GraphError;
use crate::resolve::ReferenceError;
use crate::schema::DecodeError;

/// Everything that can stop a schema from being ingested or rendered.
/// The message is what the surrounding tool reports; no partial output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
