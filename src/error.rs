use thiserror::Error;

use crate::model::glacier::GlacierError;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error(transparent)]
    Client(#[from] GlacierError),

    #[error("job parameters are missing `{0}`")]
    MissingField(&'static str),

    #[error("invalid byte range {range:?}; expected bytes=<start>-<end>")]
    InvalidRange { range: String },

    #[error("job output is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("failed to parse inventory json")]
    InventoryJson(#[from] serde_json::Error),

    #[error("inventory archive #{index} is missing `{field}`")]
    MissingInventoryField { index: usize, field: &'static str },

    #[error("failed to write inventory csv")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
