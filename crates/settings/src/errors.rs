use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),

    #[error("ron parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    #[error("section value error: {0}")]
    Value(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(&'static str),

    #[error("section not registered")]
    NotRegistered,
}
