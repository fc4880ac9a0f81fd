use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("serde_json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("cannot convert `{type_name}`: {message}")]
    Convert { type_name: String, message: String },

    #[error("conversion of `{type_name}` panicked: {message}")]
    Panicked { type_name: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = core::result::Result<T, Error>;
