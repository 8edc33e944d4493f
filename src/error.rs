use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("There was a problem reading a file")]
    Io(#[from] std::io::Error),
    #[error("The config file could not be parsed: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("The config is invalid: {0}")]
    InvalidConfig(String),
}
