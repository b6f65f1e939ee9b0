use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadgenError {
    #[error("Invalid search criteria: {0}")]
    InvalidCriteria(String),

    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LeadgenError>;
