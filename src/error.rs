use thiserror::Error;

use crate::DocumentError;

/// Unified error type covering document reconstruction and JSON text I/O.
///
/// Returned by convenience methods like
/// [`Expr::from_json_str()`](crate::Expr::from_json_str) and
/// [`Expr::to_json_string()`](crate::Expr::to_json_string).
#[derive(Debug, Error)]
pub enum GavelError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
