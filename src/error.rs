use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayerForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Letter Codec Error: {0}")]
    Codec(String),

    #[error("Worker Pool Error: {0}")]
    ThreadPool(String),
}

pub type LfResult<T> = Result<T, LayerForgeError>;
