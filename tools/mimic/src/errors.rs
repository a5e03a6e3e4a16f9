use thiserror::Error;

#[derive(Debug, Error)]
pub enum MimicError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}
