use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChordForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MIDI Error: {0}")]
    Midi(#[from] midly::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Error: {0}")]
    Data(String),
}

pub type CfResult<T> = Result<T, ChordForgeError>;
