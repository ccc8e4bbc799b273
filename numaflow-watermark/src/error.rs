use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Offset Error - {0}")]
    Offset(String),

    #[error("Config Error - {0}")]
    Config(String),

    #[error("Watermark Error - {0}")]
    Watermark(String),

    #[error("Processor Error - {0}")]
    Processor(String),
}
