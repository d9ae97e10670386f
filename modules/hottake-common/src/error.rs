use thiserror::Error;

#[derive(Error, Debug)]
pub enum HottakeError {
    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
