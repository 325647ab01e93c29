use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    // stdin is not a terminal, or termios refused the new settings
    #[error("terminal setup failed: {0}")]
    Terminal(String),

    #[error("input channel closed")]
    InputClosed,
}

pub type Result<T> = std::result::Result<T, SnakeError>;
