use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeoError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Invalid record '{keyword}': {reason}")]
    InvalidRecord { keyword: String, reason: String },

    #[error("Duplicate keyword '{keyword}' in reconciled table")]
    DuplicateKeyword { keyword: String },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No matching keywords between search-console and keyword-metrics data")]
    NoMatchingKeywords,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SeoResult<T> = Result<T, SeoError>;
